//! 配置管理命令
//!
//! 查看、检查和初始化 TOML 配置文件

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use rider_client::RiderConfig;
use std::path::PathBuf;

use crate::session::GlobalArgs;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置（含命令行覆盖）
    Show,

    /// 检查配置文件
    Check,

    /// 写入默认配置文件
    Init {
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show_(global),
            ConfigCommand::Check => Self::check_(global),
            ConfigCommand::Init { force } => Self::init_(global, force),
        }
    }

    fn path(global: &GlobalArgs) -> Result<PathBuf> {
        global
            .config_path()
            .context("Could not determine the configuration directory; pass --config")
    }

    fn show_(global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        if let Some(path) = global.config_path() {
            let origin = if path.exists() { "" } else { " (not found, using defaults)" };
            println!("# {}{}", path.display(), origin);
        }
        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn check_(global: &GlobalArgs) -> Result<()> {
        let path = Self::path(global)?;
        println!("Config file: {}", path.display());

        if !path.exists() {
            println!("  (not found, defaults apply)");
            return Ok(());
        }

        let config = RiderConfig::load(&path)?;
        println!("  ✅ Valid");
        println!("  Address: {}", config.connection.address);
        println!("  Response timeout: {} ms", config.connection.response_timeout_ms);
        match &config.display.expressions {
            Some(codes) => println!("  Expressions: {:?}", codes),
            None => println!("  Expressions: (any)"),
        }
        Ok(())
    }

    fn init_(global: &GlobalArgs, force: bool) -> Result<()> {
        let path = Self::path(global)?;
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }

        let mut config = RiderConfig::default();
        if let Some(address) = &global.address {
            config.connection.address = address.clone();
        }
        config.validate()?;
        config.save(&path)?;
        println!("✅ Wrote {}", path.display());
        Ok(())
    }
}
