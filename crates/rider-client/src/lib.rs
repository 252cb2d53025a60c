//! 客户端接口模块
//!
//! 本模块提供 Rider-Pi 机器人的阻塞式控制门面，包括：
//! - 运动（前进、旋转、停止）
//! - 传感器读取（电量、姿态）
//! - 表情与 RGB 灯光
//! - TOML 配置
//!
//! 每个操作先做本地参数校验，失败时返回 [`RobotError::InvalidParameter`] 且不发出任何报文；
//! 校验通过后完成恰好一次请求/应答交换再返回。
//!
//! # 示例
//!
//! ```rust,no_run
//! use rider_client::RiderPiBuilder;
//!
//! # fn main() -> Result<(), rider_client::RobotError> {
//! let mut robot = RiderPiBuilder::new().address("192.168.4.1:18890").build()?;
//!
//! robot.move_forward(1.0, 0.5)?;
//! robot.rotate(90.0, 0.3)?;
//! robot.stop()?;
//!
//! println!("Battery Level: {}%", robot.get_battery_level()?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod robot;

pub use builder::RiderPiBuilder;
pub use config::{
    ConfigError, ConnectionConfig, DEFAULT_ADDRESS, DisplayConfig, MotionConfig, RiderConfig,
    RoutineConfig,
};
pub use error::{Result, RobotError};
pub use robot::RiderPi;

// 常用强类型单位
pub use rider_protocol::{
    Angle, BatteryLevel, ExpressionCode, MoveDuration, ParamError, Rgb, Speed, TiltReading,
};
