//! 主机↔机器人报文定义
//!
//! 每个数据报由 8 字节报文头和变长报文体组成：
//!
//! ```text
//! byte 0     消息类型
//! byte 1     flags（保留，0）
//! byte 2..4  报文体长度（u16 LE）
//! byte 4     status（保留，0）
//! byte 5..8  序列号（u24 LE）
//! ```
//!
//! 应答报文回显请求的序列号，客户端据此丢弃过期应答。

use crate::ProtocolError;
use crate::units::{Angle, ExpressionCode, MoveDuration, Rgb, Speed, TiltReading};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

/// 报文头长度
pub const HEADER_LEN: usize = 8;

/// 序列号最大值（24 位）
pub const MAX_SEQ: u32 = 0x00FF_FFFF;

// ============================================================================
// Message Types
// ============================================================================

/// 消息类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MessageType {
    // 主机 → 机器人
    Ping = 0x00,
    MoveForward = 0x01,
    Rotate = 0x02,
    Stop = 0x03,
    GetBattery = 0x04,
    GetTilt = 0x05,
    SetExpression = 0x06,
    SetRgb = 0x07,

    // 机器人 → 主机
    Ack = 0x81,
    Battery = 0x84,
    Tilt = 0x85,
    Error = 0xFF,
}

impl MessageType {
    /// 报文体的固定长度
    pub fn payload_len(self) -> usize {
        match self {
            MessageType::Ping
            | MessageType::Stop
            | MessageType::GetBattery
            | MessageType::GetTilt
            | MessageType::Ack => 0,
            MessageType::MoveForward | MessageType::Rotate => 8,
            MessageType::SetExpression | MessageType::Error => 1,
            MessageType::SetRgb => 3,
            MessageType::Battery => 4,
            MessageType::Tilt => 12,
        }
    }

    /// 是否为主机发出的请求
    pub fn is_request(self) -> bool {
        (u8::from(self) & 0x80) == 0
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// 机器人端错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum ErrorCode {
    #[num_enum(default)]
    Unknown = 0x00,
    InvalidParameter = 0x01,
    Busy = 0x02,
    HardwareFault = 0x03,
    Unsupported = 0x04,
}

// ============================================================================
// Message Header
// ============================================================================

/// 消息头（8 字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub msg_type: MessageType,
    pub flags: u8,
    pub length: u16,
    pub status: u8,
    pub seq: u32,
}

impl MessageHeader {
    pub fn new(msg_type: MessageType, length: u16, seq: u32) -> Self {
        Self {
            msg_type,
            flags: 0,
            length,
            status: 0,
            seq: seq & MAX_SEQ,
        }
    }

    /// 编码消息头（8 字节）
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.msg_type.into());
        buf.put_u8(self.flags);
        buf.put_u16_le(self.length);
        buf.put_u8(self.status);
        // 序列号只使用低 24 位
        buf.put_slice(&self.seq.to_le_bytes()[..3]);
    }

    /// 从缓冲区解码消息头
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < HEADER_LEN {
            return Err(ProtocolError::TooShort { actual: buf.len() });
        }

        let msg_type =
            MessageType::try_from(buf[0]).map_err(|e| ProtocolError::UnknownMessageType(e.number))?;
        let flags = buf[1];
        let length = u16::from_le_bytes([buf[2], buf[3]]);
        let status = buf[4];
        let seq = u32::from_le_bytes([buf[5], buf[6], buf[7], 0]);

        Ok(Self {
            msg_type,
            flags,
            length,
            status,
            seq,
        })
    }
}

// ============================================================================
// Message Body
// ============================================================================

/// 报文体
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageBody {
    /// 连通性检查
    Ping,
    /// 前进指定时长
    MoveForward { duration: MoveDuration, speed: Speed },
    /// 原地旋转指定角度
    Rotate { angle: Angle, speed: Speed },
    /// 停止所有运动
    Stop,
    /// 查询电量
    GetBattery,
    /// 查询姿态
    GetTilt,
    /// 设置表情
    SetExpression(ExpressionCode),
    /// 设置 RGB 指示灯
    SetRgb(Rgb),

    /// 请求已执行完成
    Ack,
    /// 电量百分比（未经校验的原始读数）
    Battery { percent: f64 },
    /// 姿态读数
    Tilt(TiltReading),
    /// 请求被拒绝
    Error(ErrorCode),
}

impl MessageBody {
    pub fn msg_type(&self) -> MessageType {
        match self {
            MessageBody::Ping => MessageType::Ping,
            MessageBody::MoveForward { .. } => MessageType::MoveForward,
            MessageBody::Rotate { .. } => MessageType::Rotate,
            MessageBody::Stop => MessageType::Stop,
            MessageBody::GetBattery => MessageType::GetBattery,
            MessageBody::GetTilt => MessageType::GetTilt,
            MessageBody::SetExpression(_) => MessageType::SetExpression,
            MessageBody::SetRgb(_) => MessageType::SetRgb,
            MessageBody::Ack => MessageType::Ack,
            MessageBody::Battery { .. } => MessageType::Battery,
            MessageBody::Tilt(_) => MessageType::Tilt,
            MessageBody::Error(_) => MessageType::Error,
        }
    }

    fn encode_payload(&self, buf: &mut impl BufMut) {
        match *self {
            MessageBody::Ping
            | MessageBody::Stop
            | MessageBody::GetBattery
            | MessageBody::GetTilt
            | MessageBody::Ack => {},
            MessageBody::MoveForward { duration, speed } => {
                buf.put_f32_le(duration.secs() as f32);
                buf.put_f32_le(speed.value() as f32);
            },
            MessageBody::Rotate { angle, speed } => {
                buf.put_f32_le(angle.degrees() as f32);
                buf.put_f32_le(speed.value() as f32);
            },
            MessageBody::SetExpression(code) => buf.put_u8(code.value()),
            MessageBody::SetRgb(rgb) => {
                buf.put_u8(rgb.r);
                buf.put_u8(rgb.g);
                buf.put_u8(rgb.b);
            },
            MessageBody::Battery { percent } => buf.put_f32_le(percent as f32),
            MessageBody::Tilt(tilt) => {
                buf.put_f32_le(tilt.roll as f32);
                buf.put_f32_le(tilt.pitch as f32);
                buf.put_f32_le(tilt.yaw as f32);
            },
            MessageBody::Error(code) => buf.put_u8(code.into()),
        }
    }

    /// 解析报文体（长度已由调用方校验）
    ///
    /// 请求中的参数会重新校验，越界值返回 `ProtocolError::InvalidParameter`。
    fn decode_payload(msg_type: MessageType, mut payload: &[u8]) -> Result<Self, ProtocolError> {
        let body = match msg_type {
            MessageType::Ping => MessageBody::Ping,
            MessageType::Stop => MessageBody::Stop,
            MessageType::GetBattery => MessageBody::GetBattery,
            MessageType::GetTilt => MessageBody::GetTilt,
            MessageType::Ack => MessageBody::Ack,
            MessageType::MoveForward => {
                let duration = MoveDuration::new(payload.get_f32_le() as f64)?;
                let speed = Speed::new(payload.get_f32_le() as f64)?;
                MessageBody::MoveForward { duration, speed }
            },
            MessageType::Rotate => {
                let angle = Angle::new(payload.get_f32_le() as f64)?;
                let speed = Speed::new(payload.get_f32_le() as f64)?;
                MessageBody::Rotate { angle, speed }
            },
            MessageType::SetExpression => {
                MessageBody::SetExpression(ExpressionCode::from_raw(payload.get_u8()))
            },
            MessageType::SetRgb => {
                let r = payload.get_u8();
                let g = payload.get_u8();
                let b = payload.get_u8();
                MessageBody::SetRgb(Rgb::from_raw(r, g, b))
            },
            MessageType::Battery => MessageBody::Battery {
                percent: payload.get_f32_le() as f64,
            },
            MessageType::Tilt => {
                let roll = payload.get_f32_le() as f64;
                let pitch = payload.get_f32_le() as f64;
                let yaw = payload.get_f32_le() as f64;
                MessageBody::Tilt(TiltReading::new(roll, pitch, yaw))
            },
            MessageType::Error => MessageBody::Error(ErrorCode::from(payload.get_u8())),
        };
        Ok(body)
    }
}

/// 完整报文（序列号 + 报文体）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Message {
    pub seq: u32,
    pub body: MessageBody,
}

impl Message {
    pub fn new(seq: u32, body: MessageBody) -> Self {
        Self {
            seq: seq & MAX_SEQ,
            body,
        }
    }

    /// 构造对 `request` 的应答（回显序列号）
    pub fn reply_to(request: &Message, body: MessageBody) -> Self {
        Self::new(request.seq, body)
    }

    pub fn msg_type(&self) -> MessageType {
        self.body.msg_type()
    }

    /// 编码为数据报
    pub fn encode(&self) -> Bytes {
        let msg_type = self.msg_type();
        let payload_len = msg_type.payload_len();
        let mut buf = BytesMut::with_capacity(HEADER_LEN + payload_len);

        MessageHeader::new(msg_type, payload_len as u16, self.seq).encode(&mut buf);
        self.body.encode_payload(&mut buf);

        debug_assert_eq!(buf.len(), HEADER_LEN + payload_len);
        buf.freeze()
    }

    /// 从数据报解码
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let header = MessageHeader::decode(buf)?;
        let payload = &buf[HEADER_LEN..];
        let declared = header.length as usize;

        if payload.len() < declared {
            return Err(ProtocolError::Incomplete {
                declared,
                actual: payload.len(),
            });
        }

        let expected = header.msg_type.payload_len();
        if declared != expected {
            return Err(ProtocolError::InvalidLength {
                msg_type: header.msg_type,
                expected,
                actual: declared,
            });
        }

        let body = MessageBody::decode_payload(header.msg_type, &payload[..declared])?;
        Ok(Self {
            seq: header.seq,
            body,
        })
    }
}
