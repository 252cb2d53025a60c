//! 传感器查询命令

use anyhow::Result;
use clap::Args;

use crate::session::Session;

/// 传感器查询参数
#[derive(Args, Debug)]
pub struct SensorCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

impl SensorCommand {
    /// 读取电池电量
    pub fn battery(&self, session: &mut Session) -> Result<()> {
        let battery = session.robot.get_battery_level()?;
        if self.json {
            println!("{}", serde_json::json!({ "battery": battery.percent() }));
        } else {
            println!("Battery Level: {}%", battery);
        }
        Ok(())
    }

    /// 读取姿态
    pub fn tilt(&self, session: &mut Session) -> Result<()> {
        let tilt = session.robot.get_tilt_angle()?;
        if self.json {
            println!("{}", serde_json::to_string(&tilt)?);
        } else {
            println!("Tilt Angle: {}", tilt);
        }
        Ok(())
    }
}
