//! 错误类型体系
//!
//! 区分参数错误（调用方问题，未产生任何报文）、链路错误和机器人端拒绝。
//!
//! # 示例
//!
//! ```rust
//! use rider_client::RobotError;
//!
//! fn handle_error(err: RobotError) {
//!     if err.is_invalid_parameter() {
//!         eprintln!("参数错误: {}", err);
//!     } else if err.is_retryable() {
//!         eprintln!("可重试错误: {}", err);
//!     } else {
//!         eprintln!("错误: {}", err);
//!     }
//! }
//! ```

use crate::config::ConfigError;
use rider_protocol::{ErrorCode, MessageType, ParamError, ProtocolError};
use rider_transport::TransportError;
use thiserror::Error;

/// 机器人错误类型
#[derive(Debug, Error)]
pub enum RobotError {
    /// 参数无效（本地校验失败，或机器人以 `InvalidParameter` 拒绝）
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// 参数名
        param: String,
        /// 原因
        reason: String,
    },

    /// 传输层错误，原样向上传递，不做重试
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 协议错误（等待期间只收到无法解析的应答）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 等待应答超时
    #[error("{command:?} timed out after {timeout_ms}ms")]
    Timeout {
        command: MessageType,
        timeout_ms: u64,
    },

    /// 机器人拒绝执行
    #[error("Robot rejected {command:?}: {code:?}")]
    Rejected {
        command: MessageType,
        code: ErrorCode,
    },

    /// 应答类型不符或读数越界
    #[error("Invalid response to {command:?}: {reason}")]
    InvalidResponse {
        command: MessageType,
        reason: String,
    },

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RobotError {
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// 是否为参数错误
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// 是否可重试
    ///
    /// 可重试错误表示重新执行操作可能会成功。SDK 本身从不重试。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Rejected { code, .. } => *code == ErrorCode::Busy,
            Self::Transport(TransportError::Timeout | TransportError::Io(_)) => true,
            _ => false,
        }
    }

    /// 是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidParameter { .. })
    }
}

impl From<ParamError> for RobotError {
    fn from(err: ParamError) -> Self {
        Self::InvalidParameter {
            param: err.param.to_string(),
            reason: format!("{} (got {})", err.reason, err.value),
        }
    }
}

/// 客户端层 Result 类型
pub type Result<T> = std::result::Result<T, RobotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rider_protocol::Speed;

    #[test]
    fn test_from_param_error() {
        let err: RobotError = Speed::new(1.5).unwrap_err().into();
        assert!(err.is_invalid_parameter());
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'speed': must be within [0.0, 1.0] (got 1.5)"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(
            RobotError::Timeout {
                command: MessageType::MoveForward,
                timeout_ms: 500
            }
            .is_retryable()
        );
        assert!(
            RobotError::Rejected {
                command: MessageType::Rotate,
                code: ErrorCode::Busy
            }
            .is_retryable()
        );
        assert!(
            !RobotError::Rejected {
                command: MessageType::Rotate,
                code: ErrorCode::HardwareFault
            }
            .is_retryable()
        );
        assert!(RobotError::Transport(TransportError::Timeout).is_retryable());
        assert!(!RobotError::invalid_parameter("r", "bad").is_retryable());
    }

    #[test]
    fn test_config_classification() {
        let err = RobotError::Config(ConfigError::Invalid("x".into()));
        assert!(err.is_config_error());
        assert!(RobotError::invalid_parameter("g", "bad").is_config_error());
        assert!(!RobotError::Transport(TransportError::Timeout).is_config_error());
    }

    #[test]
    fn test_display() {
        let err = RobotError::Timeout {
            command: MessageType::MoveForward,
            timeout_ms: 2500,
        };
        assert_eq!(err.to_string(), "MoveForward timed out after 2500ms");

        let err = RobotError::Rejected {
            command: MessageType::SetRgb,
            code: ErrorCode::HardwareFault,
        };
        assert_eq!(err.to_string(), "Robot rejected SetRgb: HardwareFault");
    }
}
