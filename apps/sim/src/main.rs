//! Rider-Pi 模拟器主入口
//!
//! 在 UDP 上按报文协议响应请求，供 `rider-cli` 和集成测试在没有硬件时使用。

mod server;

use anyhow::{Context, Result};
use clap::Parser;
use rider_protocol::TiltReading;
use rider_transport::SimulatedRobot;
use server::SimServer;

/// Rider-Pi 模拟器
#[derive(Parser, Debug)]
#[command(name = "rider-sim")]
#[command(about = "Rider-Pi simulator - answers the robot wire protocol over UDP", long_about = None)]
#[command(version)]
struct Args {
    /// UDP 监听地址
    ///
    /// 格式: IP:PORT (例如: 127.0.0.1:18890)
    #[arg(long, default_value = "127.0.0.1:18890")]
    bind: String,

    /// 初始电量（百分比）
    #[arg(long, default_value_t = 100.0)]
    battery: f64,

    /// 初始姿态 Roll（度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    roll: f64,

    /// 初始姿态 Pitch（度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pitch: f64,

    /// 初始姿态 Yaw（度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f64,

    /// 动作耗时缩放（1.0 为真实时长，0 为立即应答）
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// 全速角速度（度/秒）
    #[arg(long, default_value_t = rider_transport::sim::DEFAULT_TURN_RATE_DPS)]
    turn_rate: f64,

    /// 允许的表情编号（逗号分隔，默认全部允许）
    #[arg(long, value_delimiter = ',')]
    expressions: Option<Vec<u8>>,
}

impl Args {
    fn robot(&self) -> SimulatedRobot {
        let mut robot = SimulatedRobot::default()
            .with_battery(self.battery)
            .with_tilt(TiltReading::new(self.roll, self.pitch, self.yaw));
        robot.turn_rate_dps = self.turn_rate;
        if let Some(codes) = &self.expressions {
            robot = robot.with_allowed_expressions(codes.iter().copied());
        }
        robot
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rider_sim=info".parse()?),
        )
        .init();

    let args = Args::parse();
    if !args.time_scale.is_finite() || args.time_scale < 0.0 {
        anyhow::bail!("--time-scale must be a non-negative number");
    }

    let server = SimServer::bind(&args.bind, args.robot(), args.time_scale)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        eprintln!("\nReceived interrupt signal. Shutting down...");
    };

    server.run(shutdown).await?;
    Ok(())
}
