//! Rider SDK - Rider-Pi 机器人 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 强类型参数与报文编码/解码
//! - **传输层** (`transport`): UDP、Mock 传输与模拟机器人
//! - **客户端层** (`client`): 阻塞式控制门面 `RiderPi`
//! - **控制层** (`control`): 示例例程与 JSON 脚本
//!
//! # 快速开始
//!
//! ```rust
//! use rider_sdk::prelude::*;
//!
//! # fn main() -> Result<(), RobotError> {
//! let (transport, _handle) = MockTransport::new(SimulatedRobot::default());
//! let mut robot = RiderPiBuilder::new().with_transport(transport).build()?;
//!
//! robot.set_display_expression(1)?;
//! robot.set_rgb_light(0, 255, 0)?;
//! robot.move_forward(0.5, 0.3)?;
//! # Ok(())
//! # }
//! ```

pub use rider_client as client;
pub use rider_control as control;
pub use rider_protocol as protocol;
pub use rider_transport as transport;

pub mod logging;
pub mod prelude;

/// SDK 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 客户端层（推荐入口）
pub use client::{RiderConfig, RiderPi, RiderPiBuilder, RobotError};

// 传输层
pub use transport::{MockTransport, SimulatedRobot, Transport, TransportError, UdpTransport};

// 协议层错误
pub use protocol::ProtocolError;

// 控制层
pub use control::{Example, Script, ScriptExecutor};

pub use logging::{LoggerError, init_logger, init_logger_with_level};
