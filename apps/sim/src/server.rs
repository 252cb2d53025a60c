//! UDP 模拟服务
//!
//! 单个接收循环独占 [`SimulatedRobot`]：状态在收到请求时立即更新，
//! 应答在动作耗时（`hold × time_scale`）之后由独立任务发出。

use rider_transport::SimulatedRobot;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// 最大数据报长度
const MAX_DATAGRAM: usize = 512;

pub struct SimServer {
    socket: Arc<UdpSocket>,
    robot: SimulatedRobot,
    time_scale: f64,
}

impl SimServer {
    /// 绑定监听地址
    pub async fn bind(addr: &str, robot: SimulatedRobot, time_scale: f64) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
            robot,
            time_scale: time_scale.max(0.0),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// 运行直到 `shutdown` 完成，返回最终的机器人状态
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> io::Result<SimulatedRobot> {
        info!(
            "Rider-Pi simulator listening on {} (battery {}%, time scale {})",
            self.local_addr()?,
            self.robot.battery,
            self.time_scale
        );

        tokio::pin!(shutdown);
        let mut buf = [0u8; MAX_DATAGRAM];

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        "Simulator stopped (heading {:.1}°, travel {:.2}, stops {})",
                        self.robot.normalized_heading(),
                        self.robot.travel,
                        self.robot.stop_count
                    );
                    return Ok(self.robot);
                },
                received = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(received) => received,
                        // 对端不可达（ICMP）等错误只影响单个数据报
                        Err(e) => {
                            warn!("recv_from failed: {}", e);
                            continue;
                        },
                    };
                    self.dispatch(&buf[..len], peer);
                },
            }
        }
    }

    fn dispatch(&mut self, datagram: &[u8], peer: SocketAddr) {
        let Some(reply) = self.robot.handle_datagram(datagram) else {
            return;
        };

        let wait = reply.scaled_hold(self.time_scale);
        let bytes = reply.message.encode();
        let socket = Arc::clone(&self.socket);

        debug!(seq = reply.message.seq, "reply to {} in {:?}", peer, wait);
        tokio::spawn(async move {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            if let Err(e) = socket.send_to(&bytes, peer).await {
                warn!("send_to {} failed: {}", peer, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rider_client::{RiderConfig, RiderPiBuilder};
    use rider_protocol::{Message, MessageBody, MessageHeader, MessageType, Rgb, TiltReading};
    use std::time::{Duration, Instant};
    use tokio::sync::oneshot;

    async fn start(
        robot: SimulatedRobot,
        time_scale: f64,
    ) -> (
        SocketAddr,
        oneshot::Sender<()>,
        tokio::task::JoinHandle<io::Result<SimulatedRobot>>,
    ) {
        let server = SimServer::bind("127.0.0.1:0", robot, time_scale).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));
        (addr, tx, task)
    }

    #[tokio::test]
    async fn test_answers_raw_requests() {
        let (addr, tx, task) = start(SimulatedRobot::default().with_battery(73.0), 0.0).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();
        client
            .send(&Message::new(5, MessageBody::GetBattery).encode())
            .await
            .unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let len = tokio::time::timeout(Duration::from_secs(1), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            Message::decode(&buf[..len]).unwrap(),
            Message::new(5, MessageBody::Battery { percent: 73.0 })
        );

        tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_garbage_is_ignored() {
        let (addr, tx, task) = start(SimulatedRobot::default(), 0.0).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();
        client.send(&[0xde, 0xad]).await.unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let reply = tokio::time::timeout(Duration::from_millis(100), client.recv(&mut buf)).await;
        assert!(reply.is_err(), "no reply expected for garbage");

        tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_huge_move_duration_keeps_serving() {
        let (addr, tx, task) = start(SimulatedRobot::default().with_battery(64.0), 1.0).await;

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(addr).await.unwrap();

        let mut datagram = Vec::new();
        MessageHeader::new(MessageType::MoveForward, 8, 1).encode(&mut datagram);
        datagram.extend_from_slice(&1.0e30f32.to_le_bytes());
        datagram.extend_from_slice(&0.5f32.to_le_bytes());
        client.send(&datagram).await.unwrap();
        client
            .send(&Message::new(2, MessageBody::GetBattery).encode())
            .await
            .unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let len = tokio::time::timeout(Duration::from_secs(1), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            Message::decode(&buf[..len]).unwrap(),
            Message::new(2, MessageBody::Battery { percent: 64.0 })
        );

        tx.send(()).unwrap();
        let robot = task.await.unwrap().unwrap();
        assert!(robot.travel > 1.0e29);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_client_end_to_end() {
        let (addr, tx, task) = start(SimulatedRobot::default(), 0.1).await;

        let elapsed = tokio::task::spawn_blocking(move || {
            let mut robot = RiderPiBuilder::new()
                .config(RiderConfig::default())
                .address(addr.to_string())
                .build()
                .unwrap();

            let start = Instant::now();
            robot.set_display_expression(1).unwrap();
            robot.set_rgb_light(0, 255, 0).unwrap();
            robot.move_forward(0.5, 0.3).unwrap();
            robot.stop().unwrap();
            assert_eq!(robot.get_tilt_angle().unwrap(), TiltReading::default());
            start.elapsed()
        })
        .await
        .unwrap();

        // 0.5s × 0.1 的动作耗时
        assert!(elapsed >= Duration::from_millis(45));

        tx.send(()).unwrap();
        let robot = task.await.unwrap().unwrap();
        assert_eq!(robot.rgb, Rgb::GREEN);
        assert_eq!(robot.stop_count, 1);
        assert!((robot.travel - 0.15).abs() < 1e-6);
    }
}
