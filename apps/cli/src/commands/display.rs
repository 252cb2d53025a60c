//! 表情与灯光命令

use anyhow::Result;
use clap::Args;

use crate::session::Session;

/// 表情命令参数
#[derive(Args, Debug)]
pub struct ExpressionCommand {
    /// 表情编号
    #[arg(allow_negative_numbers = true)]
    pub code: i64,
}

impl ExpressionCommand {
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        println!("🙂 Setting display expression {}...", self.code);
        session.robot.set_display_expression(self.code)?;
        println!("✅ Done");
        Ok(())
    }
}

/// 灯光命令参数（每个通道 0 - 255）
#[derive(Args, Debug)]
pub struct LightCommand {
    #[arg(allow_negative_numbers = true)]
    pub r: i64,

    #[arg(allow_negative_numbers = true)]
    pub g: i64,

    #[arg(allow_negative_numbers = true)]
    pub b: i64,
}

impl LightCommand {
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        println!("💡 Setting RGB light to ({}, {}, {})...", self.r, self.g, self.b);
        session.robot.set_rgb_light(self.r, self.g, self.b)?;
        println!("✅ Done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct LightCli {
        #[command(flatten)]
        args: LightCommand,
    }

    #[test]
    fn test_light_positional_channels() {
        let cli = LightCli::try_parse_from(["light", "0", "255", "-1"]).unwrap();
        assert_eq!((cli.args.r, cli.args.g, cli.args.b), (0, 255, -1));
    }

    #[test]
    fn test_light_requires_three_channels() {
        assert!(LightCli::try_parse_from(["light", "0", "255"]).is_err());
    }
}
