//! run 命令
//!
//! 执行 JSON 脚本文件

use anyhow::{Context, Result, bail};
use clap::Args;
use rider_control::{ScriptConfig, ScriptExecutor};
use std::io;
use std::path::PathBuf;

use crate::session::Session;

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    #[arg(short, long)]
    pub script: PathBuf,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,

    /// 命令之间的额外延迟（毫秒）
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

impl RunCommand {
    /// 执行脚本
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        println!("📜 Loading script: {}", self.script.display());
        let script = ScriptExecutor::load_script(&self.script)
            .with_context(|| format!("Failed to load script {}", self.script.display()))?;

        let executor = ScriptExecutor::new()
            .with_config(ScriptConfig {
                continue_on_error: self.continue_on_error,
                execution_delay_ms: self.delay_ms,
            })
            .with_interrupt(session.interrupt_flag());

        let report = executor.execute(&mut session.robot, &script, &mut io::stdout().lock())?;
        println!("  Elapsed: {:.2} s", report.elapsed.as_secs_f64());

        if !report.failed.is_empty() {
            println!();
            println!("❌ Failed commands:");
            for (idx, err) in &report.failed {
                println!("  Command {}: {}", idx + 1, err);
            }
        }

        if report.interrupted {
            bail!("Script '{}' interrupted", report.script_name);
        }
        if !report.is_success() {
            bail!(
                "Script '{}' did not complete: {} failed, {} skipped",
                report.script_name,
                report.failed.len(),
                report.skipped()
            );
        }
        Ok(())
    }
}
