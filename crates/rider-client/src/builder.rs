//! Rider-Pi Builder
//!
//! 提供链式 API 创建 `RiderPi` 实例，负责选择传输并做连通性检查。

use crate::config::RiderConfig;
use crate::error::Result;
use crate::robot::{RiderPi, duration_ms};
use rider_transport::{Transport, UdpTransport};
use std::time::Duration;
use tracing::info;

/// Rider-Pi Builder
///
/// # 示例
///
/// ```rust,no_run
/// use rider_client::RiderPiBuilder;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), rider_client::RobotError> {
/// // 使用默认配置（连接本机 rider-sim）
/// let robot = RiderPiBuilder::new().build()?;
///
/// // 指定地址和超时
/// let robot = RiderPiBuilder::new()
///     .address("192.168.4.1:18890")
///     .response_timeout(Duration::from_secs(1))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct RiderPiBuilder {
    config: RiderConfig,
    transport: Option<Box<dyn Transport + Send>>,
}

impl RiderPiBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用完整配置（覆盖之前设置的地址/超时）
    pub fn config(mut self, config: RiderConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置机器人地址（HOST:PORT）
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.connection.address = address.into();
        self
    }

    /// 设置应答超时（默认: 500ms）
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.response_timeout_ms = duration_ms(timeout);
        self
    }

    /// 跳过构建时的 Ping 检查
    pub fn skip_connect_check(mut self) -> Self {
        self.config.connection.connect_check = false;
        self
    }

    /// 使用自定义传输（如 `MockTransport`），忽略地址
    pub fn with_transport(mut self, transport: impl Transport + Send + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// 构建 `RiderPi` 实例
    ///
    /// # Errors
    /// - `RobotError::Config`: 配置取值不合理
    /// - `RobotError::Transport`: 地址无效或 Socket 创建失败
    /// - `RobotError::Timeout`: 连通性检查无应答
    pub fn build(self) -> Result<RiderPi> {
        self.config.validate()?;

        let transport: Box<dyn Transport + Send> = match self.transport {
            Some(transport) => transport,
            None => Box::new(UdpTransport::connect(&self.config.connection.address)?),
        };

        let connect_check = self.config.connection.connect_check;
        let mut robot = RiderPi::from_boxed(transport, self.config);

        if connect_check {
            robot.ping()?;
        }

        info!("Connected to Rider-Pi via {}", robot.describe());
        Ok(robot)
    }
}
