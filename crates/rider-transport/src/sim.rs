//! 模拟机器人
//!
//! 按报文协议响应请求，维护电量、姿态、表情、灯光和简单的运动里程。
//! 不做任何物理仿真：运动请求只返回其持续时间（`hold`），由调用方决定是否等待。

use rider_protocol::{
    Angle, ErrorCode, ExpressionCode, Message, MessageBody, MessageHeader, ProtocolError, Rgb,
    TiltReading,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

/// 默认最大角速度（度/秒）
pub const DEFAULT_TURN_RATE_DPS: f64 = 180.0;

/// 模拟应答
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimReply {
    pub message: Message,
    /// 该动作占用机器人的时间
    pub hold: Duration,
}

impl SimReply {
    /// 按比例缩放后的动作耗时，超出表示范围时饱和
    pub fn scaled_hold(&self, time_scale: f64) -> Duration {
        if time_scale <= 0.0 || self.hold.is_zero() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.hold.as_secs_f64() * time_scale).unwrap_or(Duration::MAX)
    }
}

/// 模拟机器人
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    pub battery: f64,
    pub tilt: TiltReading,
    pub expression: Option<ExpressionCode>,
    pub rgb: Rgb,
    /// 累计航向（度，不归一化）
    pub heading: f64,
    /// 累计前进量（秒 × 速度）
    pub travel: f64,
    /// 收到的停止命令数
    pub stop_count: u32,
    /// 最大角速度（度/秒）
    pub turn_rate_dps: f64,
    /// 允许的表情编号（`None` 表示全部允许）
    pub allowed_expressions: Option<BTreeSet<u8>>,
    /// 注入故障：所有运动/灯光/表情请求返回该错误码
    pub fault: Option<ErrorCode>,
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self {
            battery: 100.0,
            tilt: TiltReading::default(),
            expression: None,
            rgb: Rgb::OFF,
            heading: 0.0,
            travel: 0.0,
            stop_count: 0,
            turn_rate_dps: DEFAULT_TURN_RATE_DPS,
            allowed_expressions: None,
            fault: None,
        }
    }
}

impl SimulatedRobot {
    pub fn with_battery(mut self, percent: f64) -> Self {
        self.battery = percent;
        self
    }

    pub fn with_tilt(mut self, tilt: TiltReading) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_allowed_expressions(mut self, codes: impl IntoIterator<Item = u8>) -> Self {
        self.allowed_expressions = Some(codes.into_iter().collect());
        self
    }

    /// 处理一个请求报文
    pub fn handle(&mut self, request: &Message) -> SimReply {
        let (body, hold) = match request.body {
            MessageBody::Ping | MessageBody::GetBattery | MessageBody::GetTilt | MessageBody::Stop => {
                (self.handle_query(request.body), Duration::ZERO)
            },
            command => match self.fault {
                Some(code) => (MessageBody::Error(code), Duration::ZERO),
                None => self.handle_command(command),
            },
        };

        debug!(seq = request.seq, "sim: {:?} -> {:?}", request.body, body);
        SimReply {
            message: Message::reply_to(request, body),
            hold,
        }
    }

    fn handle_command(&mut self, command: MessageBody) -> (MessageBody, Duration) {
        match command {
            MessageBody::MoveForward { duration, speed } => {
                self.travel += duration.secs() * speed.value();
                (MessageBody::Ack, duration.as_duration())
            },
            MessageBody::Rotate { angle, speed } => {
                if !speed.is_zero() {
                    self.heading += angle.degrees();
                }
                (
                    MessageBody::Ack,
                    angle.rotation_time(speed, self.turn_rate_dps),
                )
            },
            MessageBody::SetExpression(code) => {
                let allowed = self
                    .allowed_expressions
                    .as_ref()
                    .is_none_or(|set| set.contains(&code.value()));
                if allowed {
                    self.expression = Some(code);
                    (MessageBody::Ack, Duration::ZERO)
                } else {
                    warn!("sim: rejecting unknown expression code {}", code);
                    (MessageBody::Error(ErrorCode::InvalidParameter), Duration::ZERO)
                }
            },
            MessageBody::SetRgb(rgb) => {
                self.rgb = rgb;
                (MessageBody::Ack, Duration::ZERO)
            },
            // 应答类报文不应由主机发出
            _ => (MessageBody::Error(ErrorCode::Unsupported), Duration::ZERO),
        }
    }

    fn handle_query(&mut self, body: MessageBody) -> MessageBody {
        match body {
            MessageBody::GetBattery => MessageBody::Battery {
                percent: self.battery,
            },
            MessageBody::GetTilt => MessageBody::Tilt(self.tilt),
            MessageBody::Stop => {
                self.stop_count += 1;
                MessageBody::Ack
            },
            _ => MessageBody::Ack,
        }
    }

    /// 处理原始数据报
    ///
    /// 报文头无法解析时无法回显序列号，返回 `None`（丢弃）。
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> Option<SimReply> {
        let header = match MessageHeader::decode(datagram) {
            Ok(header) => header,
            Err(e) => {
                warn!("sim: dropping datagram: {}", e);
                return None;
            },
        };

        match Message::decode(datagram) {
            Ok(request) => Some(self.handle(&request)),
            Err(e) => {
                warn!(seq = header.seq, "sim: rejecting request: {}", e);
                let code = match e {
                    ProtocolError::InvalidParameter(_) => ErrorCode::InvalidParameter,
                    _ => ErrorCode::Unknown,
                };
                Some(SimReply {
                    message: Message::new(header.seq, MessageBody::Error(code)),
                    hold: Duration::ZERO,
                })
            },
        }
    }

    /// 当前航向（归一化到 [-180, 180)）
    pub fn normalized_heading(&self) -> f64 {
        Angle::new(self.heading).map(|a| a.normalize().degrees()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rider_protocol::{MessageHeader, MessageType, MoveDuration, Speed};

    fn request(body: MessageBody) -> Message {
        Message::new(42, body)
    }

    #[test]
    fn test_move_forward_holds_for_duration() {
        let mut robot = SimulatedRobot::default();
        let reply = robot.handle(&request(MessageBody::MoveForward {
            duration: MoveDuration::new(2.0).unwrap(),
            speed: Speed::new(0.5).unwrap(),
        }));
        assert_eq!(reply.message, Message::new(42, MessageBody::Ack));
        assert_eq!(reply.hold, Duration::from_secs(2));
        assert_eq!(robot.travel, 1.0);
    }

    #[test]
    fn test_rotate_accumulates_heading() {
        let mut robot = SimulatedRobot::default();
        for deg in [45.0, -45.0, 0.0, 270.0] {
            robot.handle(&request(MessageBody::Rotate {
                angle: Angle::new(deg).unwrap(),
                speed: Speed::FULL,
            }));
        }
        assert_eq!(robot.heading, 270.0);
        assert_eq!(robot.normalized_heading(), -90.0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut robot = SimulatedRobot::default();
        let first = robot.handle(&request(MessageBody::Stop));
        let second = robot.handle(&request(MessageBody::Stop));
        assert_eq!(first.message.body, MessageBody::Ack);
        assert_eq!(second.message.body, MessageBody::Ack);
        assert_eq!(robot.stop_count, 2);
        assert_eq!(robot.travel, 0.0);
    }

    #[test]
    fn test_queries() {
        let mut robot = SimulatedRobot::default()
            .with_battery(42.0)
            .with_tilt(TiltReading::new(1.0, 2.0, 3.0));
        assert_eq!(
            robot.handle(&request(MessageBody::GetBattery)).message.body,
            MessageBody::Battery { percent: 42.0 }
        );
        assert_eq!(
            robot.handle(&request(MessageBody::GetTilt)).message.body,
            MessageBody::Tilt(TiltReading::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_expression_allow_list() {
        let mut robot = SimulatedRobot::default().with_allowed_expressions([1, 10]);
        let ok = robot.handle(&request(MessageBody::SetExpression(1.into())));
        assert_eq!(ok.message.body, MessageBody::Ack);
        let rejected = robot.handle(&request(MessageBody::SetExpression(7.into())));
        assert_eq!(
            rejected.message.body,
            MessageBody::Error(ErrorCode::InvalidParameter)
        );
        assert_eq!(robot.expression, Some(ExpressionCode::from_raw(1)));
    }

    #[test]
    fn test_fault_injection_spares_stop_and_queries() {
        let mut robot = SimulatedRobot {
            fault: Some(ErrorCode::HardwareFault),
            ..Default::default()
        };
        assert_eq!(
            robot.handle(&request(MessageBody::SetRgb(Rgb::RED))).message.body,
            MessageBody::Error(ErrorCode::HardwareFault)
        );
        assert_eq!(
            robot.handle(&request(MessageBody::Stop)).message.body,
            MessageBody::Ack
        );
        assert_eq!(robot.rgb, Rgb::OFF);
    }

    #[test]
    fn test_datagram_with_invalid_parameter_echoes_seq() {
        let mut robot = SimulatedRobot::default();
        let mut datagram = Vec::new();
        MessageHeader::new(MessageType::MoveForward, 8, 9).encode(&mut datagram);
        datagram.extend_from_slice(&(-1.0f32).to_le_bytes());
        datagram.extend_from_slice(&0.5f32.to_le_bytes());

        let reply = robot.handle_datagram(&datagram).unwrap();
        assert_eq!(
            reply.message,
            Message::new(9, MessageBody::Error(ErrorCode::InvalidParameter))
        );
    }

    fn move_datagram(duration: f32) -> Vec<u8> {
        let mut datagram = Vec::new();
        MessageHeader::new(MessageType::MoveForward, 8, 11).encode(&mut datagram);
        datagram.extend_from_slice(&duration.to_le_bytes());
        datagram.extend_from_slice(&0.5f32.to_le_bytes());
        datagram
    }

    #[test]
    fn test_datagram_with_huge_duration_saturates() {
        let mut robot = SimulatedRobot::default();
        for duration in [1.0e20f32, 1.0e30, f32::MAX] {
            let reply = robot.handle_datagram(&move_datagram(duration)).unwrap();
            assert_eq!(reply.message, Message::new(11, MessageBody::Ack));
            assert_eq!(reply.hold, Duration::MAX);
            assert_eq!(reply.scaled_hold(2.0), Duration::MAX);
        }
    }

    #[test]
    fn test_datagram_with_infinite_duration_rejected() {
        let mut robot = SimulatedRobot::default();
        let reply = robot.handle_datagram(&move_datagram(f32::INFINITY)).unwrap();
        assert_eq!(
            reply.message.body,
            MessageBody::Error(ErrorCode::InvalidParameter)
        );
    }

    #[test]
    fn test_scaled_hold() {
        let reply = SimReply {
            message: Message::new(1, MessageBody::Ack),
            hold: Duration::from_secs(2),
        };
        assert_eq!(reply.scaled_hold(0.5), Duration::from_secs(1));
        assert_eq!(reply.scaled_hold(0.0), Duration::ZERO);
        assert_eq!(reply.scaled_hold(-1.0), Duration::ZERO);
    }

    #[test]
    fn test_datagram_garbage_dropped() {
        let mut robot = SimulatedRobot::default();
        assert!(robot.handle_datagram(&[1, 2, 3]).is_none());
    }
}
