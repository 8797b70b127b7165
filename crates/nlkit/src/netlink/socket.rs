//! Low-level async netlink socket operations.

use std::future::Future;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use super::error::Result;

/// Receive buffer size, large enough for any single dump datagram.
const RECV_BUF_SIZE: usize = 32768;

/// Process-wide sequence counter shared by every socket.
static SEQUENCE: AtomicU32 = AtomicU32::new(1);

/// Next transaction sequence number.
pub fn next_seq() -> u32 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Netlink protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Routing/device hook (ip link, bridge ports, statistics)
    Route,
    /// Generic netlink (control family, fou)
    Generic,
}

impl Protocol {
    fn as_isize(self) -> isize {
        match self {
            Protocol::Route => protocols::NETLINK_ROUTE,
            Protocol::Generic => protocols::NETLINK_GENERIC,
        }
    }
}

/// Datagram transport underneath a [`Connection`](super::Connection).
///
/// Implemented by [`NetlinkSocket`]; tests substitute a scripted transport.
pub trait Transport {
    /// Local port id, expected back in the `nlmsg_pid` of replies.
    fn port_id(&self) -> u32;

    /// Send one complete message.
    fn send(&mut self, msg: &[u8]) -> impl Future<Output = Result<()>>;

    /// Receive one datagram, which may hold several messages.
    fn recv(&mut self) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Async netlink socket.
pub struct NetlinkSocket {
    /// The underlying async file descriptor.
    fd: AsyncFd<Socket>,
    /// Local port ID (assigned by kernel).
    pid: u32,
    /// Protocol this socket uses.
    protocol: Protocol,
}

impl NetlinkSocket {
    /// Create a new netlink socket for the given protocol.
    pub fn new(protocol: Protocol) -> Result<Self> {
        let mut socket = Socket::new(protocol.as_isize())?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        // Extended ACK carries the kernel's error strings
        socket.set_ext_ack(true).ok();

        let fd = AsyncFd::new(socket)?;

        tracing::debug!(?protocol, pid, "opened netlink socket");
        Ok(Self { fd, pid, protocol })
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Send a message.
    pub async fn send_msg(&self, msg: &[u8]) -> Result<()> {
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;

            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(Ok(_)) => return Ok(()),
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(e.into()),
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive a datagram, allocating a buffer.
    pub async fn recv_msg(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                // recv advanced buf, so buf[..] holds the datagram
                Ok(Ok(_n)) => return Ok(buf.to_vec()),
                Ok(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    tracing::trace!("recv interrupted, retrying");
                    continue;
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_would_block) => continue,
            }
        }
    }
}

impl Transport for NetlinkSocket {
    fn port_id(&self) -> u32 {
        self.pid
    }

    async fn send(&mut self, msg: &[u8]) -> Result<()> {
        self.send_msg(msg).await
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        self.recv_msg().await
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = next_seq();
        let b = next_seq();
        let c = next_seq();
        assert!(a < b && b < c);
    }
}
