//! 脚本系统
//!
//! JSON 脚本加载与顺序执行。
//!
//! ```json
//! {
//!   "name": "greeting",
//!   "description": "Wave and light up",
//!   "commands": [
//!     { "type": "Expression", "code": 1 },
//!     { "type": "Light", "r": 0, "g": 255, "b": 0 },
//!     { "type": "MoveForward", "duration": 0.5, "speed": 0.3 },
//!     { "type": "Wait", "duration_ms": 200 },
//!     { "type": "Stop" }
//!   ]
//! }
//! ```

use crate::error::ScriptError;
use rider_client::{RiderPi, RobotError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 等待命令检查中断标志的间隔
const WAIT_SLICE: Duration = Duration::from_millis(20);

/// 脚本命令序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 脚本命令，与门面操作一一对应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptCommand {
    MoveForward { duration: f64, speed: f64 },

    Rotate { angle: f64, speed: f64 },

    Stop,

    /// 读取并输出电量
    Battery,

    /// 读取并输出姿态
    Tilt,

    Expression { code: i64 },

    Light { r: i64, g: i64, b: i64 },

    /// 等待（不与机器人通信）
    Wait { duration_ms: u64 },
}

/// 脚本执行配置
#[derive(Debug, Clone, Default)]
pub struct ScriptConfig {
    /// 失败时是否继续
    pub continue_on_error: bool,

    /// 命令之间的额外延迟（毫秒）
    pub execution_delay_ms: u64,
}

/// 脚本执行器
#[derive(Debug, Default)]
pub struct ScriptExecutor {
    config: ScriptConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl ScriptExecutor {
    /// 创建新的脚本执行器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置配置
    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置中断标志
    ///
    /// 标志置位后，执行器在下一条命令之前发送 `stop()` 并结束执行。
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// 加载脚本文件
    pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Script, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存脚本文件
    pub fn save_script<P: AsRef<Path>>(path: P, script: &Script) -> Result<(), ScriptError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(script)?;
        fs::write(path, content).map_err(|source| ScriptError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn interrupted(&self) -> bool {
        self.interrupt.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// 执行脚本
    ///
    /// 命令严格按顺序执行。默认遇到第一个失败即停止；
    /// `continue_on_error` 时记录失败并继续。
    pub fn execute(
        &self,
        robot: &mut RiderPi,
        script: &Script,
        out: &mut impl Write,
    ) -> Result<ScriptReport, ScriptError> {
        info!(
            "Executing script '{}' ({} commands)",
            script.name,
            script.commands.len()
        );
        writeln!(out, "📜 Script: {}", script.name)?;
        if !script.description.is_empty() {
            writeln!(out, "📝 {}", script.description)?;
        }
        writeln!(out)?;

        let start = Instant::now();
        let mut report = ScriptReport {
            script_name: script.name.clone(),
            total_commands: script.commands.len(),
            ..Default::default()
        };

        for (i, cmd) in script.commands.iter().enumerate() {
            if self.interrupted() {
                self.abort(robot, out, &mut report, i)?;
                break;
            }

            writeln!(out, "Command {}/{}:", i + 1, report.total_commands)?;
            match self.execute_command(robot, cmd, out) {
                Ok(()) => {
                    writeln!(out, "  ✅ OK")?;
                    report.succeeded.push(i);
                },
                Err(CommandError::Interrupted) => {
                    self.abort(robot, out, &mut report, i)?;
                    break;
                },
                Err(CommandError::Output(e)) => return Err(e.into()),
                Err(CommandError::Robot(err)) => {
                    writeln!(out, "  ❌ Failed: {}", err)?;
                    warn!("Script command {} failed: {}", i + 1, err);
                    report.failed.push((i, err.to_string()));

                    if !self.config.continue_on_error {
                        writeln!(out)?;
                        writeln!(out, "❌ Script failed, stopping execution")?;
                        break;
                    }
                },
            }

            if self.config.execution_delay_ms > 0 && i + 1 < script.commands.len() {
                std::thread::sleep(Duration::from_millis(self.config.execution_delay_ms));
            }
        }

        report.elapsed = start.elapsed();

        writeln!(out)?;
        writeln!(out, "📊 Script result:")?;
        writeln!(out, "  Total commands: {}", report.total_commands)?;
        writeln!(out, "  Succeeded: {}", report.succeeded.len())?;
        writeln!(out, "  Failed: {}", report.failed.len())?;

        Ok(report)
    }

    fn abort(
        &self,
        robot: &mut RiderPi,
        out: &mut impl Write,
        report: &mut ScriptReport,
        index: usize,
    ) -> Result<(), ScriptError> {
        writeln!(out, "⚠️  Interrupted, stopping robot...")?;
        warn!("Script '{}' interrupted", report.script_name);
        report.interrupted = true;
        if let Err(err) = robot.stop() {
            writeln!(out, "  ❌ Stop failed: {}", err)?;
            report.failed.push((index, format!("stop after interrupt: {}", err)));
        }
        Ok(())
    }

    /// 执行单个命令
    fn execute_command(
        &self,
        robot: &mut RiderPi,
        cmd: &ScriptCommand,
        out: &mut impl Write,
    ) -> Result<(), CommandError> {
        match *cmd {
            ScriptCommand::MoveForward { duration, speed } => {
                writeln!(out, "  Move forward: {} s at {}", duration, speed)?;
                robot.move_forward(duration, speed)?;
            },
            ScriptCommand::Rotate { angle, speed } => {
                writeln!(out, "  Rotate: {}° at {}", angle, speed)?;
                robot.rotate(angle, speed)?;
            },
            ScriptCommand::Stop => {
                writeln!(out, "  Stop")?;
                robot.stop()?;
            },
            ScriptCommand::Battery => {
                let battery = robot.get_battery_level()?;
                writeln!(out, "  Battery Level: {}%", battery)?;
            },
            ScriptCommand::Tilt => {
                let tilt = robot.get_tilt_angle()?;
                writeln!(out, "  Tilt Angle: {}", tilt)?;
            },
            ScriptCommand::Expression { code } => {
                writeln!(out, "  Expression: {}", code)?;
                robot.set_display_expression(code)?;
            },
            ScriptCommand::Light { r, g, b } => {
                writeln!(out, "  Light: ({}, {}, {})", r, g, b)?;
                robot.set_rgb_light(r, g, b)?;
            },
            ScriptCommand::Wait { duration_ms } => {
                writeln!(out, "  Wait: {} ms", duration_ms)?;
                self.wait(Duration::from_millis(duration_ms))?;
            },
        }
        Ok(())
    }

    /// 分片等待，期间响应中断
    fn wait(&self, duration: Duration) -> Result<(), CommandError> {
        // 超出 Instant 表示范围时只能被中断结束
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.interrupted() {
                return Err(CommandError::Interrupted);
            }
            let remaining =
                deadline.map_or(WAIT_SLICE, |d| d.saturating_duration_since(Instant::now()));
            if remaining.is_zero() {
                return Ok(());
            }
            std::thread::sleep(remaining.min(WAIT_SLICE));
        }
    }
}

/// 单条命令的失败原因（执行器内部使用）
enum CommandError {
    Robot(RobotError),
    Output(std::io::Error),
    Interrupted,
}

impl From<RobotError> for CommandError {
    fn from(err: RobotError) -> Self {
        CommandError::Robot(err)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Output(err)
    }
}

/// 脚本执行结果
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    /// 脚本名称
    pub script_name: String,

    /// 总命令数
    pub total_commands: usize,

    /// 成功的命令索引
    pub succeeded: Vec<usize>,

    /// 失败的命令索引和错误
    pub failed: Vec<(usize, String)>,

    /// 是否被中断
    pub interrupted: bool,

    /// 执行时长
    pub elapsed: Duration,
}

impl ScriptReport {
    /// 全部命令成功且未被中断
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.interrupted && self.succeeded.len() == self.total_commands
    }

    /// 未执行的命令数
    pub fn skipped(&self) -> usize {
        self.total_commands
            .saturating_sub(self.succeeded.len() + self.failed.len())
    }
}
