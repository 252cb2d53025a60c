//! 例程与脚本的错误类型

use rider_client::RobotError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 例程执行错误
#[derive(Debug, Error)]
pub enum RoutineError {
    #[error(transparent)]
    Robot(#[from] RobotError),

    /// 进度输出写入失败
    #[error("Failed to write routine output: {0}")]
    Output(#[from] io::Error),

    /// 收到中断请求，剩余步骤未执行
    #[error("Routine interrupted")]
    Interrupted,
}

/// 脚本错误
///
/// 单条命令的失败记录在 [`ScriptReport`](crate::ScriptReport) 中，不作为错误返回。
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write script {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse script JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to write script output: {0}")]
    Output(#[from] io::Error),
}
