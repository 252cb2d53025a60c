//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use rider_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::{RiderConfig, RiderPi, RiderPiBuilder};

// 强类型单位
pub use crate::protocol::{
    Angle, BatteryLevel, ExpressionCode, MoveDuration, Rgb, Speed, TiltReading,
};

// 传输层（常用 Trait 与测试替身）
pub use crate::transport::{MockHandle, MockTransport, SimulatedRobot, Transport};

// 控制层
pub use crate::control::{Example, Script, ScriptCommand, ScriptExecutor};

// 错误类型
pub use crate::client::RobotError;
pub use crate::protocol::{ParamError, ProtocolError};
pub use crate::transport::TransportError;
