//! 运动命令
//!
//! 前进、旋转和停止。命令阻塞直到机器人完成动作；
//! 期间收到 Ctrl+C 时，动作结束后立即补发 stop()。

use anyhow::Result;
use clap::Args;

use crate::session::Session;

/// 前进命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 持续时间（秒，>= 0）
    #[arg(short, long)]
    pub duration: f64,

    /// 速度比例（0.0 - 1.0）
    #[arg(short, long, default_value_t = 0.5)]
    pub speed: f64,
}

impl MoveCommand {
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        println!("🚗 Moving forward for {} s at speed {}...", self.duration, self.speed);
        session.robot.move_forward(self.duration, self.speed)?;
        if !session.stop_if_interrupted()? {
            println!("✅ Done");
        }
        Ok(())
    }
}

/// 旋转命令参数
#[derive(Args, Debug)]
pub struct RotateCommand {
    /// 角度（度，正负表示方向）
    #[arg(long, allow_negative_numbers = true)]
    pub angle: f64,

    /// 速度比例（0.0 - 1.0）
    #[arg(short, long, default_value_t = 0.5)]
    pub speed: f64,
}

impl RotateCommand {
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        println!("🔄 Rotating {}° at speed {}...", self.angle, self.speed);
        session.robot.rotate(self.angle, self.speed)?;
        if !session.stop_if_interrupted()? {
            println!("✅ Done");
        }
        Ok(())
    }
}

/// 停止所有运动
pub fn stop(session: &mut Session) -> Result<()> {
    println!("🛑 Stopping...");
    session.robot.stop()?;
    println!("✅ Stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct RotateCli {
        #[command(flatten)]
        args: RotateCommand,
    }

    #[derive(Parser)]
    struct MoveCli {
        #[command(flatten)]
        args: MoveCommand,
    }

    #[test]
    fn test_rotate_accepts_negative_angle() {
        let cli = RotateCli::try_parse_from(["rotate", "--angle", "-90", "--speed", "0.3"]).unwrap();
        assert_eq!(cli.args.angle, -90.0);
        assert_eq!(cli.args.speed, 0.3);
    }

    #[test]
    fn test_move_default_speed() {
        let cli = MoveCli::try_parse_from(["move", "--duration", "2"]).unwrap();
        assert_eq!(cli.args.duration, 2.0);
        assert_eq!(cli.args.speed, 0.5);
    }

    #[test]
    fn test_move_requires_duration() {
        assert!(MoveCli::try_parse_from(["move"]).is_err());
    }
}
