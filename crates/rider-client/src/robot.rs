//! Rider-Pi 控制门面
//!
//! 每个操作先在本地校验参数，然后恰好完成一次请求/应答交换后返回。
//! 参数不合法时不会发出任何报文。
//!
//! 所有方法都接收 `&mut self`：同一台机器人上的命令天然串行，
//! 上一个命令返回（机器人应答）之前无法发出下一个。

use crate::config::RiderConfig;
use crate::error::{Result, RobotError};
use rider_protocol::{
    Angle, BatteryLevel, ErrorCode, ExpressionCode, MAX_SEQ, Message, MessageBody, MessageType,
    MoveDuration, Rgb, Speed, TiltReading,
};
use rider_transport::{Transport, TransportError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Rider-Pi 机器人
///
/// # 示例
///
/// ```rust
/// use rider_client::{RiderConfig, RiderPi};
/// use rider_transport::{MockTransport, SimulatedRobot};
///
/// let (transport, _handle) = MockTransport::new(SimulatedRobot::default().with_battery(80.0));
/// let mut robot = RiderPi::new(transport, RiderConfig::default());
///
/// robot.set_display_expression(1)?;
/// robot.set_rgb_light(0, 255, 0)?;
/// robot.move_forward(0.5, 0.3)?;
/// assert_eq!(robot.get_battery_level()?.percent(), 80.0);
/// # Ok::<(), rider_client::RobotError>(())
/// ```
pub struct RiderPi {
    transport: Box<dyn Transport + Send>,
    config: RiderConfig,
    next_seq: u32,
}

impl RiderPi {
    /// 使用已建立的传输创建实例（不做连通性检查）
    pub fn new(transport: impl Transport + Send + 'static, config: RiderConfig) -> Self {
        Self::from_boxed(Box::new(transport), config)
    }

    pub(crate) fn from_boxed(transport: Box<dyn Transport + Send>, config: RiderConfig) -> Self {
        Self {
            transport,
            config,
            next_seq: 1,
        }
    }

    pub fn config(&self) -> &RiderConfig {
        &self.config
    }

    /// 链路描述（如 `udp://192.168.4.1:18890`）
    pub fn describe(&self) -> String {
        self.transport.describe()
    }

    /// 连通性检查
    pub fn ping(&mut self) -> Result<()> {
        self.command(MessageBody::Ping, Duration::ZERO)
    }

    // ==================== 运动 ====================

    /// 以 `speed` 前进 `duration` 秒，阻塞直到机器人完成
    ///
    /// # 错误
    /// - `duration < 0` 或 `speed` 不在 `[0, 1]` 内：`RobotError::InvalidParameter`
    pub fn move_forward(&mut self, duration: f64, speed: f64) -> Result<()> {
        let duration = MoveDuration::new(duration)?;
        let speed = Speed::new(speed)?;
        self.move_for(duration, speed)
    }

    /// [`move_forward`](Self::move_forward) 的强类型版本
    pub fn move_for(&mut self, duration: MoveDuration, speed: Speed) -> Result<()> {
        info!("Moving forward for {} at {}", duration, speed);
        self.command(
            MessageBody::MoveForward { duration, speed },
            duration.as_duration(),
        )
    }

    /// 原地旋转 `angle_degrees` 度（正负表示方向），阻塞直到完成
    ///
    /// 角度不限幅；配置 `motion.normalize_rotation` 后先归一化到 [-180, 180)。
    pub fn rotate(&mut self, angle_degrees: f64, speed: f64) -> Result<()> {
        let angle = Angle::new(angle_degrees)?;
        let speed = Speed::new(speed)?;
        self.rotate_by(angle, speed)
    }

    /// [`rotate`](Self::rotate) 的强类型版本
    pub fn rotate_by(&mut self, angle: Angle, speed: Speed) -> Result<()> {
        let angle = if self.config.motion.normalize_rotation {
            angle.normalize()
        } else {
            angle
        };
        let expected = angle.rotation_time(speed, self.config.motion.turn_rate_dps);

        info!("Rotating {} at {}", angle, speed);
        self.command(MessageBody::Rotate { angle, speed }, expected)
    }

    /// 立即停止所有运动（幂等）
    pub fn stop(&mut self) -> Result<()> {
        info!("Stopping");
        self.command(MessageBody::Stop, Duration::ZERO)
    }

    // ==================== 传感器 ====================

    /// 读取电池电量（百分比）
    pub fn get_battery_level(&mut self) -> Result<BatteryLevel> {
        match self.request(MessageBody::GetBattery, Duration::ZERO)? {
            MessageBody::Battery { percent } => {
                BatteryLevel::new(percent).map_err(|e| RobotError::InvalidResponse {
                    command: MessageType::GetBattery,
                    reason: e.to_string(),
                })
            },
            other => Err(unexpected(MessageType::GetBattery, other)),
        }
    }

    /// 读取姿态（每次重新读取，无缓存）
    pub fn get_tilt_angle(&mut self) -> Result<TiltReading> {
        match self.request(MessageBody::GetTilt, Duration::ZERO)? {
            MessageBody::Tilt(tilt) if tilt.is_finite() => Ok(tilt),
            MessageBody::Tilt(tilt) => Err(RobotError::InvalidResponse {
                command: MessageType::GetTilt,
                reason: format!("non-finite tilt reading ({})", tilt),
            }),
            other => Err(unexpected(MessageType::GetTilt, other)),
        }
    }

    // ==================== 显示与灯光 ====================

    /// 设置表情
    ///
    /// 本地只校验编号能否编码（`0..=255`）以及是否在配置的表情列表中；
    /// 机器人拒绝的编号同样以 `RobotError::InvalidParameter` 返回。
    pub fn set_display_expression(&mut self, expression_code: i64) -> Result<()> {
        let code = ExpressionCode::new(expression_code)?;
        self.set_expression(code)
    }

    /// [`set_display_expression`](Self::set_display_expression) 的强类型版本
    pub fn set_expression(&mut self, code: ExpressionCode) -> Result<()> {
        if let Some(known) = &self.config.display.expressions
            && !known.contains(&code.value())
        {
            return Err(RobotError::invalid_parameter(
                "expression_code",
                format!("{} is not in the configured expression set {:?}", code, known),
            ));
        }

        info!("Setting display expression {}", code);
        self.command(MessageBody::SetExpression(code), Duration::ZERO)
    }

    /// 设置 RGB 指示灯，每个通道必须在 `[0, 255]`
    pub fn set_rgb_light(&mut self, r: i64, g: i64, b: i64) -> Result<()> {
        let rgb = Rgb::new(r, g, b)?;
        self.set_rgb(rgb)
    }

    /// [`set_rgb_light`](Self::set_rgb_light) 的强类型版本
    pub fn set_rgb(&mut self, rgb: Rgb) -> Result<()> {
        info!("Setting RGB light {}", rgb);
        self.command(MessageBody::SetRgb(rgb), Duration::ZERO)
    }

    // ==================== 请求/应答 ====================

    fn command(&mut self, body: MessageBody, expected: Duration) -> Result<()> {
        let command = body.msg_type();
        match self.request(body, expected)? {
            MessageBody::Ack => Ok(()),
            other => Err(unexpected(command, other)),
        }
    }

    /// 发送请求并等待序列号匹配的应答
    ///
    /// 等待时间为 `response_timeout + expected`，`expected` 是动作本身的预计时长。
    fn request(&mut self, body: MessageBody, expected: Duration) -> Result<MessageBody> {
        let command = body.msg_type();
        let seq = self.allocate_seq();
        let timeout = self.config.response_timeout().saturating_add(expected);

        debug!(seq, "-> {:?}", body);
        self.transport.send(&Message::new(seq, body))?;

        // 超出 Instant 表示范围时不设截止时间，每次等待完整的 timeout
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            let reply = match self.transport.receive_timeout(remaining) {
                Ok(reply) => reply,
                Err(TransportError::Timeout) => {
                    warn!(seq, "{:?} got no reply within {:?}", command, timeout);
                    return Err(RobotError::Timeout {
                        command,
                        timeout_ms: duration_ms(timeout),
                    });
                },
                Err(TransportError::Protocol(e)) => {
                    warn!(seq, "{:?} got only undecodable replies: {}", command, e);
                    return Err(RobotError::Protocol(e));
                },
                Err(e) => return Err(e.into()),
            };

            if reply.seq != seq {
                warn!(seq, "Dropping stale reply seq={} ({:?})", reply.seq, reply.body);
                continue;
            }

            debug!(seq, "<- {:?}", reply.body);
            return match reply.body {
                MessageBody::Error(ErrorCode::InvalidParameter) => Err(
                    RobotError::invalid_parameter(param_name(command), "rejected by robot"),
                ),
                MessageBody::Error(code) => {
                    warn!(seq, "{:?} rejected by robot: {:?}", command, code);
                    Err(RobotError::Rejected { command, code })
                },
                body => Ok(body),
            };
        }
    }

    fn allocate_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq = if seq >= MAX_SEQ { 1 } else { seq + 1 };
        seq
    }
}

/// 毫秒数，超出 `u64` 时饱和
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// 机器人拒绝参数时报告的参数名
fn param_name(command: MessageType) -> &'static str {
    match command {
        MessageType::MoveForward => "duration/speed",
        MessageType::Rotate => "angle/speed",
        MessageType::SetExpression => "expression_code",
        MessageType::SetRgb => "rgb",
        _ => "request",
    }
}

fn unexpected(command: MessageType, body: MessageBody) -> RobotError {
    RobotError::InvalidResponse {
        command,
        reason: format!("unexpected reply {:?}", body.msg_type()),
    }
}
