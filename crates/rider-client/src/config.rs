//! # 客户端配置
//!
//! TOML 配置文件，所有字段均有默认值，缺省的段落或字段使用默认值。
//!
//! ```toml
//! [connection]
//! address = "192.168.4.1:18890"
//! response_timeout_ms = 500
//!
//! [motion]
//! turn_rate_dps = 180.0
//! normalize_rotation = false
//!
//! [display]
//! expressions = [1, 10]
//!
//! [routines]
//! low_battery_threshold = 20.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 默认机器人地址（本机 `rider-sim`）
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:18890";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Rider-Pi 客户端配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderConfig {
    /// 连接设置
    pub connection: ConnectionConfig,

    /// 运动设置
    pub motion: MotionConfig,

    /// 显示设置
    pub display: DisplayConfig,

    /// 例程设置
    pub routines: RoutineConfig,
}

/// 连接设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// 机器人地址（HOST:PORT）
    pub address: String,

    /// 应答超时（毫秒），运动类命令会在此基础上加上动作本身的时长
    pub response_timeout_ms: u64,

    /// 构建时是否发送 Ping 检查连通性
    pub connect_check: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            response_timeout_ms: 500,
            connect_check: true,
        }
    }
}

/// 运动设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// 全速时的角速度（度/秒），用于估算旋转耗时
    pub turn_rate_dps: f64,

    /// 是否把旋转角度归一化到 [-180, 180)
    pub normalize_rotation: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            turn_rate_dps: 180.0,
            normalize_rotation: false,
        }
    }
}

/// 显示设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 已知的表情编号，设置后不在列表中的编号在本地即被拒绝
    pub expressions: Option<Vec<u8>>,
}

/// 例程设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineConfig {
    /// 低电量阈值（百分比）
    pub low_battery_threshold: f64,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            low_battery_threshold: 20.0,
        }
    }
}

impl RiderConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RiderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 文件存在则加载，否则返回默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存配置到文件（自动创建父目录）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }

    /// 检查取值是否合理
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.address.trim().is_empty() {
            return Err(ConfigError::Invalid("connection.address is empty".into()));
        }
        if self.connection.response_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connection.response_timeout_ms must be > 0".into(),
            ));
        }
        let rate = self.motion.turn_rate_dps;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "motion.turn_rate_dps must be a positive number, got {}",
                rate
            )));
        }
        let threshold = self.routines.low_battery_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "routines.low_battery_threshold must be within [0, 100], got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.connection.response_timeout_ms)
    }
}
