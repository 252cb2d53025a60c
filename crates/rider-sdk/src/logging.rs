//! 日志初始化
//!
//! 安装 `tracing` 订阅器，并把 `log` 生态的记录桥接到 `tracing`。
//! 过滤规则优先读取 `RUST_LOG`，未设置时使用给定的级别。

use log::LevelFilter;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// 日志初始化错误（通常是重复初始化）
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to install log bridge: {0}")]
    Bridge(#[from] log::SetLoggerError),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// 以 `info` 级别初始化日志
pub fn init_logger() -> Result<(), LoggerError> {
    init_logger_with_level(LevelFilter::Info)
}

/// 以指定级别初始化日志（`RUST_LOG` 优先）
pub fn init_logger_with_level(level: LevelFilter) -> Result<(), LoggerError> {
    LogTracer::builder().with_max_level(level).init()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn default_directive(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(LevelFilter::Off), "off");
        assert_eq!(default_directive(LevelFilter::Warn), "warn");
        assert_eq!(default_directive(LevelFilter::Trace), "trace");
    }

    #[test]
    fn test_second_init_fails() {
        init_logger_with_level(LevelFilter::Debug).unwrap();
        log::info!("bridged through tracing");
        assert!(init_logger().is_err());
    }
}
