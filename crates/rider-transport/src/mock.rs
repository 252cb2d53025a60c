//! Mock 传输
//!
//! 进程内传输，请求直接交给 [`SimulatedRobot`] 处理，应答进入接收队列。
//! 所有请求都记录在共享的调用日志中，测试通过 [`MockHandle`] 检查调用顺序、
//! 注入故障或修改模拟机器人的状态。

use crate::sim::SimulatedRobot;
use crate::{DeviceError, DeviceErrorKind, Message, MessageBody, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// 一次记录在案的请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub seq: u32,
    pub body: MessageBody,
    /// 请求发出时刻
    pub sent_at: Instant,
    /// 应答被取走时刻（`None` 表示尚未应答或应答被丢弃）
    pub answered_at: Option<Instant>,
}

#[derive(Debug)]
struct MockShared {
    robot: SimulatedRobot,
    calls: Vec<RecordedCall>,
    fail_next_send: bool,
    drop_replies: bool,
    /// 动作耗时的缩放比例（0 表示不等待）
    time_scale: f64,
}

/// Mock 传输
pub struct MockTransport {
    shared: Arc<Mutex<MockShared>>,
    rx_queue: VecDeque<Message>,
}

/// 共享句柄（可在传输被移入客户端后继续使用）
#[derive(Debug, Clone)]
pub struct MockHandle {
    shared: Arc<Mutex<MockShared>>,
}

impl MockTransport {
    /// 创建 Mock 传输及其句柄
    pub fn new(robot: SimulatedRobot) -> (Self, MockHandle) {
        let shared = Arc::new(Mutex::new(MockShared {
            robot,
            calls: Vec::new(),
            fail_next_send: false,
            drop_replies: false,
            time_scale: 0.0,
        }));
        let transport = Self {
            shared: Arc::clone(&shared),
            rx_queue: VecDeque::new(),
        };
        (transport, MockHandle { shared })
    }
}

impl Transport for MockTransport {
    fn send(&mut self, msg: &Message) -> Result<(), TransportError> {
        let (reply, wait) = {
            let mut shared = self.shared.lock();

            if shared.fail_next_send {
                shared.fail_next_send = false;
                return Err(DeviceError::new(DeviceErrorKind::Injected, "injected send failure").into());
            }

            shared.calls.push(RecordedCall {
                seq: msg.seq,
                body: msg.body,
                sent_at: Instant::now(),
                answered_at: None,
            });

            let reply = shared.robot.handle(msg);
            let wait = reply.scaled_hold(shared.time_scale);
            let reply = (!shared.drop_replies).then_some(reply.message);
            (reply, wait)
        };

        // 锁外等待，模拟机器人执行动作
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }

        if let Some(reply) = reply {
            trace!("mock: queued reply {:?}", reply);
            self.rx_queue.push_back(reply);
        }
        Ok(())
    }

    fn receive_timeout(&mut self, _timeout: Duration) -> Result<Message, TransportError> {
        let reply = self.rx_queue.pop_front().ok_or(TransportError::Timeout)?;

        let mut shared = self.shared.lock();
        if let Some(call) = shared.calls.iter_mut().rev().find(|c| c.seq == reply.seq) {
            call.answered_at.get_or_insert_with(Instant::now);
        }
        Ok(reply)
    }

    fn describe(&self) -> String {
        String::from("mock")
    }
}

impl MockHandle {
    /// 所有已记录的请求
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.shared.lock().calls.clone()
    }

    /// 已记录请求的报文体（按发送顺序）
    pub fn bodies(&self) -> Vec<MessageBody> {
        self.shared.lock().calls.iter().map(|c| c.body).collect()
    }

    pub fn call_count(&self) -> usize {
        self.shared.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().calls.clear();
    }

    /// 下一次发送失败
    pub fn fail_next_send(&self) {
        self.shared.lock().fail_next_send = true;
    }

    /// 丢弃所有应答（模拟链路单向中断）
    pub fn set_drop_replies(&self, drop: bool) {
        self.shared.lock().drop_replies = drop;
    }

    /// 设置动作耗时缩放比例，1.0 表示按真实时长阻塞
    pub fn set_time_scale(&self, scale: f64) {
        self.shared.lock().time_scale = scale.max(0.0);
    }

    /// 读取模拟机器人状态快照
    pub fn robot(&self) -> SimulatedRobot {
        self.shared.lock().robot.clone()
    }

    /// 修改模拟机器人状态
    pub fn with_robot<R>(&self, f: impl FnOnce(&mut SimulatedRobot) -> R) -> R {
        f(&mut self.shared.lock().robot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rider_protocol::{MoveDuration, Rgb, Speed};

    #[test]
    fn test_send_records_and_replies() {
        let (mut transport, handle) = MockTransport::new(SimulatedRobot::default());
        let request = Message::new(1, MessageBody::SetRgb(Rgb::GREEN));

        transport.send(&request).unwrap();
        assert_eq!(handle.call_count(), 1);
        assert!(handle.calls()[0].answered_at.is_none());

        let reply = transport.receive_timeout(Duration::from_millis(10)).unwrap();
        assert_eq!(reply, Message::new(1, MessageBody::Ack));
        assert!(handle.calls()[0].answered_at.is_some());
        assert_eq!(handle.robot().rgb, Rgb::GREEN);
    }

    #[test]
    fn test_fail_next_send_is_one_shot() {
        let (mut transport, handle) = MockTransport::new(SimulatedRobot::default());
        handle.fail_next_send();

        let request = Message::new(1, MessageBody::Stop);
        assert!(matches!(
            transport.send(&request),
            Err(TransportError::Device(ref e)) if e.kind == DeviceErrorKind::Injected
        ));
        assert_eq!(handle.call_count(), 0);
        assert!(transport.send(&request).is_ok());
    }

    #[test]
    fn test_drop_replies_times_out() {
        let (mut transport, handle) = MockTransport::new(SimulatedRobot::default());
        handle.set_drop_replies(true);

        transport.send(&Message::new(1, MessageBody::Ping)).unwrap();
        assert!(matches!(
            transport.receive_timeout(Duration::from_millis(1)),
            Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_time_scale_blocks_send() {
        let (mut transport, handle) = MockTransport::new(SimulatedRobot::default());
        handle.set_time_scale(0.1);

        let start = Instant::now();
        transport
            .send(&Message::new(
                1,
                MessageBody::MoveForward {
                    duration: MoveDuration::new(0.3).unwrap(),
                    speed: Speed::FULL,
                },
            ))
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_with_robot_mutates_state() {
        let (_transport, handle) = MockTransport::new(SimulatedRobot::default());
        handle.with_robot(|robot| robot.battery = 12.5);
        assert_eq!(handle.robot().battery, 12.5);
    }
}
