//! # Rider Control
//!
//! 建立在控制门面之上的工作流：
//!
//! - [`routines`]: 常用示例例程（基本运动、传感器读取、显示控制、条件行为、问候序列）
//! - [`script`]: JSON 脚本的加载与顺序执行

pub mod error;
pub mod routines;
pub mod script;

pub use error::{RoutineError, ScriptError};
pub use routines::{
    Example, basic_movement, conditional_behavior, display_control, greeting_sequence,
    sensor_reading,
};
pub use script::{Script, ScriptCommand, ScriptConfig, ScriptExecutor, ScriptReport};
