//! UDP 传输
//!
//! 每个报文对应一个数据报。Socket 绑定到临时端口并 `connect` 到机器人地址，
//! 因此只会收到来自该地址的数据报。

use crate::{DeviceError, DeviceErrorKind, Message, ProtocolError, Transport, TransportError};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 接收缓冲区大小（远大于最长报文）
const RECV_BUF_LEN: usize = 512;

/// `set_read_timeout` 不接受零时长，非阻塞读取使用该下限
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// UDP 传输
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    buf: [u8; RECV_BUF_LEN],
}

impl UdpTransport {
    /// 连接到机器人
    ///
    /// # 参数
    /// - `addr`: 机器人地址（如 "192.168.4.1:18890" 或 "rider.local:18890"）
    pub fn connect(addr: impl AsRef<str>) -> Result<Self, TransportError> {
        let addr = addr.as_ref();
        let peer = addr
            .to_socket_addrs()
            .map_err(|e| {
                DeviceError::new(
                    DeviceErrorKind::InvalidAddress,
                    format!("Invalid UDP address '{}': {}", addr, e),
                )
            })?
            .next()
            .ok_or_else(|| {
                DeviceError::new(
                    DeviceErrorKind::InvalidAddress,
                    format!("Address '{}' did not resolve", addr),
                )
            })?;

        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;

        debug!("UDP transport bound to {:?}, peer {}", socket.local_addr().ok(), peer);

        Ok(Self {
            socket,
            peer,
            buf: [0u8; RECV_BUF_LEN],
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, msg: &Message) -> Result<(), TransportError> {
        let bytes = msg.encode();
        match self.socket.send(&bytes) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => Err(DeviceError::new(
                DeviceErrorKind::Unreachable,
                format!("{} refused the datagram", self.peer),
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<Message, TransportError> {
        let deadline = Instant::now().checked_add(timeout);
        // 截止前只收到无法解析的数据报时，报告最后一个解析错误
        let mut malformed = None;

        loop {
            let remaining = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            self.socket.set_read_timeout(Some(remaining.max(MIN_READ_TIMEOUT)))?;

            match self.socket.recv(&mut self.buf) {
                Ok(len) => match Message::decode(&self.buf[..len]) {
                    Ok(msg) => return Ok(msg),
                    Err(e) => {
                        warn!("Dropping malformed datagram from {}: {}", self.peer, e);
                        malformed = Some(e);
                    },
                },
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(timed_out(malformed));
                },
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                    return Err(DeviceError::new(
                        DeviceErrorKind::Unreachable,
                        format!("no robot listening at {}", self.peer),
                    )
                    .into());
                },
                Err(e) => return Err(e.into()),
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(timed_out(malformed));
            }
        }
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.peer)
    }
}

fn timed_out(malformed: Option<ProtocolError>) -> TransportError {
    malformed.map_or(TransportError::Timeout, TransportError::Protocol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rider_protocol::{MessageBody, Rgb};

    #[test]
    fn test_invalid_address() {
        match UdpTransport::connect("not an address") {
            Err(TransportError::Device(e)) => assert_eq!(e.kind, DeviceErrorKind::InvalidAddress),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_request_reply_over_loopback() {
        let robot = UdpSocket::bind("127.0.0.1:0").unwrap();
        let robot_addr = robot.local_addr().unwrap();

        let mut transport = UdpTransport::connect(robot_addr.to_string()).unwrap();
        assert_eq!(transport.describe(), format!("udp://{}", robot_addr));

        let request = Message::new(5, MessageBody::SetRgb(Rgb::BLUE));
        transport.send(&request).unwrap();

        let mut buf = [0u8; 64];
        let (len, from) = robot.recv_from(&mut buf).unwrap();
        assert_eq!(Message::decode(&buf[..len]).unwrap(), request);

        // 先发一个垃圾数据报，应被丢弃
        robot.send_to(&[0xEE; 3], from).unwrap();
        let reply = Message::reply_to(&request, MessageBody::Ack);
        robot.send_to(&reply.encode(), from).unwrap();

        let received = transport.receive_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(received, reply);
    }

    #[test]
    fn test_receive_timeout() {
        let robot = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut transport = UdpTransport::connect(robot.local_addr().unwrap().to_string()).unwrap();

        let start = Instant::now();
        let result = transport.receive_timeout(Duration::from_millis(20));
        assert!(matches!(result, Err(TransportError::Timeout)));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_only_malformed_datagrams_is_protocol_error() {
        let robot = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut transport = UdpTransport::connect(robot.local_addr().unwrap().to_string()).unwrap();

        transport.send(&Message::new(1, MessageBody::Ping)).unwrap();
        let mut buf = [0u8; 64];
        let (_, from) = robot.recv_from(&mut buf).unwrap();
        robot.send_to(&[0xEE; 3], from).unwrap();

        let result = transport.receive_timeout(Duration::from_millis(50));
        assert!(matches!(result, Err(TransportError::Protocol(_))), "{result:?}");
    }
}
