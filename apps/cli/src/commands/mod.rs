//! 命令定义和实现

pub mod config;
pub mod demo;
pub mod display;
pub mod motion;
pub mod run;
pub mod sensor;

pub use config::ConfigCommand;
pub use demo::DemoCommand;
pub use display::{ExpressionCommand, LightCommand};
pub use motion::{MoveCommand, RotateCommand};
pub use run::RunCommand;
pub use sensor::SensorCommand;
