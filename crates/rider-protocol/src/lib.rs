//! # Rider Protocol
//!
//! Rider-Pi 机器人的参数类型与主机↔机器人报文编解码（无 IO 依赖）
//!
//! ## 模块
//!
//! - `units`: 经过校验的参数类型（速度、时长、角度、电量、姿态、表情、RGB）
//! - `message`: 报文头与报文体的编码/解码
//!
//! ## 字节序
//!
//! 报文统一使用小端字节序（Little Endian），浮点数为 IEEE-754 `f32`。

pub mod message;
pub mod units;

// 重新导出常用类型
pub use message::*;
pub use units::*;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Message too short: need at least 8 bytes, got {actual}")]
    TooShort { actual: usize },

    #[error("Unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    #[error("Incomplete message: header declares {declared} payload bytes, got {actual}")]
    Incomplete { declared: usize, actual: usize },

    #[error("Invalid payload length for {msg_type:?}: expected {expected}, got {actual}")]
    InvalidLength {
        msg_type: MessageType,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    InvalidParameter(#[from] ParamError),
}
