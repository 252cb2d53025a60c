//! 连接会话
//!
//! 每个命令独立执行：
//! 1. 读取配置（命令行参数优先）
//! 2. 连接机器人（UDP 或进程内模拟）
//! 3. 安装 Ctrl+C 处理：置位中断标志，由命令在下一个时机发送 stop()

use anyhow::{Context, Result};
use rider_client::{RiderConfig, RiderPi, RiderPiBuilder};
use rider_transport::{MockTransport, SimulatedRobot};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// 所有命令共享的全局参数
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub address: Option<String>,
    pub mock: bool,
    pub mock_battery: f64,
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// 配置文件路径：`--config` 优先，否则为 `<config_dir>/rider-pi/config.toml`
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }

    /// 读取配置并应用命令行覆盖
    pub fn load_config(&self) -> Result<RiderConfig> {
        let mut config = match self.config_path() {
            Some(path) => RiderConfig::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => RiderConfig::default(),
        };

        if let Some(address) = &self.address {
            config.connection.address = address.clone();
        }
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("rider-pi");
    path.push("config.toml");
    Some(path)
}

/// 已连接的会话
pub struct Session {
    pub robot: RiderPi,
    interrupted: Arc<AtomicBool>,
}

impl Session {
    /// 连接机器人
    pub fn connect(args: &GlobalArgs) -> Result<Self> {
        let config = args.load_config()?;
        let builder = RiderPiBuilder::new().config(config.clone());

        let built = if args.mock {
            let sim = SimulatedRobot::default().with_battery(args.mock_battery);
            let (transport, _handle) = MockTransport::new(sim);
            builder.with_transport(transport).build()
        } else {
            info!("Connecting to {}", config.connection.address);
            builder.build()
        };
        let robot = built.with_context(|| {
            format!(
                "Could not reach Rider-Pi at {}. Make sure the robot (or rider-sim) is running and the address is correct",
                config.connection.address
            )
        })?;

        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl+C handler")?;

        Ok(Self { robot, interrupted })
    }

    /// 中断标志（供脚本执行器使用）
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// 若收到 Ctrl+C，发送 stop() 并返回 true
    pub fn stop_if_interrupted(&mut self) -> Result<bool> {
        if !self.is_interrupted() {
            return Ok(false);
        }
        warn!("Interrupted, sending stop");
        println!("⚠️  Interrupted, stopping robot...");
        self.robot.stop().context("Failed to stop robot after interrupt")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: Option<PathBuf>, address: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            address: address.map(String::from),
            mock: true,
            mock_battery: 100.0,
            config,
        }
    }

    #[test]
    fn test_address_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[connection]\naddress = \"10.0.0.2:18890\"\n").unwrap();

        let config = args(Some(path.clone()), None).load_config().unwrap();
        assert_eq!(config.connection.address, "10.0.0.2:18890");

        let config = args(Some(path), Some("10.0.0.3:18890")).load_config().unwrap();
        assert_eq!(config.connection.address, "10.0.0.3:18890");
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = args(Some(dir.path().join("none.toml")), None)
            .load_config()
            .unwrap();
        assert_eq!(config, RiderConfig::default());
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("rider-pi/config.toml"));
        }
    }
}
