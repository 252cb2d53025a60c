//! # Rider Transport Layer
//!
//! 主机与机器人之间的传输抽象层，提供统一的报文收发接口。
//!
//! - [`UdpTransport`]: 通过 UDP 与机器人（或 `rider-sim`）通信
//! - [`MockTransport`]: 进程内模拟，用于测试，记录所有请求
//! - [`SimulatedRobot`]: 按报文协议响应的模拟机器人

use std::time::Duration;
use thiserror::Error;

pub use rider_protocol::{Message, MessageBody, ProtocolError};

pub mod mock;
pub mod sim;
pub mod udp;

pub use mock::{MockHandle, MockTransport, RecordedCall};
pub use sim::{SimReply, SimulatedRobot};
pub use udp::UdpTransport;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] DeviceError),
    /// 截止前只收到无法解析的报文
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Receive timeout")]
    Timeout,
}

/// 设备/链路错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Unknown,
    InvalidAddress,
    Unreachable,
    /// 测试中主动注入的故障
    Injected,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            DeviceErrorKind::InvalidAddress | DeviceErrorKind::Unreachable
        )
    }
}

impl From<String> for DeviceError {
    fn from(message: String) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for DeviceError {
    fn from(message: &str) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

/// 报文传输接口
///
/// 实现方只负责收发完整报文；请求与应答的配对（序列号）由上层处理。
pub trait Transport {
    fn send(&mut self, msg: &Message) -> Result<(), TransportError>;

    /// 在 `timeout` 内接收一个报文，超时返回 `TransportError::Timeout`
    fn receive_timeout(&mut self, timeout: Duration) -> Result<Message, TransportError>;

    /// 非阻塞接收
    fn try_receive(&mut self) -> Result<Option<Message>, TransportError> {
        match self.receive_timeout(Duration::ZERO) {
            Ok(msg) => Ok(Some(msg)),
            Err(TransportError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 用于日志的链路描述
    fn describe(&self) -> String {
        String::from("transport")
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, msg: &Message) -> Result<(), TransportError> {
        (**self).send(msg)
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<Message, TransportError> {
        (**self).receive_timeout(timeout)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
