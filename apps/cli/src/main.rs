//! # Rider CLI
//!
//! Command-line interface for Rider-Pi robot control.
//!
//! 每个命令独立执行：读取配置，连接机器人，执行操作，退出。
//!
//! ```bash
//! # 启动本机模拟器
//! rider-sim --bind 127.0.0.1:18890
//!
//! # 运动与查询
//! rider-cli move --duration 2 --speed 0.5
//! rider-cli rotate --angle -90 --speed 0.3
//! rider-cli battery --json
//!
//! # 不连接任何机器人（进程内模拟）
//! rider-cli --mock demo all
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod session;

use commands::{
    ConfigCommand, DemoCommand, ExpressionCommand, LightCommand, MoveCommand, RotateCommand,
    RunCommand, SensorCommand,
};
use session::{GlobalArgs, Session};

/// Rider CLI - Rider-Pi 机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "rider-cli")]
#[command(about = "Command-line interface for Rider-Pi robot control", long_about = None)]
#[command(version)]
struct Cli {
    /// 机器人地址（HOST:PORT，覆盖配置文件）
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// 使用进程内模拟机器人，不建立网络连接
    #[arg(long, global = true)]
    mock: bool,

    /// 模拟机器人的电量（仅 --mock）
    #[arg(long, global = true, default_value_t = 100.0)]
    mock_battery: f64,

    /// 配置文件路径（默认: <config_dir>/rider-pi/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 前进
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 原地旋转
    Rotate {
        #[command(flatten)]
        args: RotateCommand,
    },

    /// 停止所有运动
    Stop,

    /// 读取电池电量
    Battery {
        #[command(flatten)]
        args: SensorCommand,
    },

    /// 读取姿态（Roll/Pitch/Yaw）
    Tilt {
        #[command(flatten)]
        args: SensorCommand,
    },

    /// 设置显示表情
    Expression {
        #[command(flatten)]
        args: ExpressionCommand,
    },

    /// 设置 RGB 指示灯
    Light {
        #[command(flatten)]
        args: LightCommand,
    },

    /// 运行示例例程
    Demo {
        #[command(flatten)]
        args: DemoCommand,
    },

    /// 执行 JSON 脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给命令结果）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rider_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = GlobalArgs {
        address: cli.address,
        mock: cli.mock,
        mock_battery: cli.mock_battery,
        config: cli.config,
    };

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&global),
        // 未选择示例时不连接机器人
        Commands::Demo { args } => args.execute(&global),

        Commands::Move { args } => args.execute(&mut Session::connect(&global)?),
        Commands::Rotate { args } => args.execute(&mut Session::connect(&global)?),
        Commands::Stop => commands::motion::stop(&mut Session::connect(&global)?),
        Commands::Battery { args } => args.battery(&mut Session::connect(&global)?),
        Commands::Tilt { args } => args.tilt(&mut Session::connect(&global)?),
        Commands::Expression { args } => args.execute(&mut Session::connect(&global)?),
        Commands::Light { args } => args.execute(&mut Session::connect(&global)?),
        Commands::Run { args } => args.execute(&mut Session::connect(&global)?),
    }
}
