//! Request/response correlation over a netlink transport.
//!
//! [`Connection::talk`] sends one request and waits for its acknowledgement
//! or answer. [`Connection::dump`] streams a multi-part reply into a visitor.
//! Both take `&mut self`, so a connection never has more than one
//! transaction in flight.

use std::ops::ControlFlow;

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::message::{MessageIter, NLM_F_DUMP, NLM_F_REQUEST, NlMsgError, NlMsgHdr, NlMsgType};
use super::socket::{NetlinkSocket, Protocol, Transport, next_seq};

/// Matching reply to a [`talk`](Connection::talk) request.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Header of the reply message.
    pub header: NlMsgHdr,
    /// Reply payload. For an acknowledgement this is the `nlmsgerr` body.
    pub payload: Vec<u8>,
}

impl Reply {
    /// True when the kernel answered with a plain acknowledgement.
    pub fn is_ack(&self) -> bool {
        self.header.is_error()
    }
}

/// High-level netlink connection.
pub struct Connection<T: Transport = NetlinkSocket> {
    transport: T,
}

impl Connection<NetlinkSocket> {
    /// Create a new connection for the given protocol.
    pub fn new(protocol: Protocol) -> Result<Self> {
        Ok(Self {
            transport: NetlinkSocket::new(protocol)?,
        })
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an existing transport.
    pub fn from_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the underlying transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send `builder` and wait for the reply belonging to it.
    ///
    /// Messages carrying another sequence number or port id are discarded.
    /// A zero-code acknowledgement or a matching data message completes the
    /// transaction; a nonzero code becomes [`Error::Kernel`].
    pub async fn talk(&mut self, builder: MessageBuilder) -> Result<Reply> {
        let (seq, pid) = self.send(builder).await?;

        loop {
            let data = self.transport.recv().await?;
            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if !header.matches(seq, pid) {
                    tracing::trace!(
                        seq = header.nlmsg_seq,
                        pid = header.nlmsg_pid,
                        expected_seq = seq,
                        "discarding unrelated reply"
                    );
                    continue;
                }
                if header.nlmsg_type == NlMsgType::NOOP {
                    continue;
                }
                if header.is_error() {
                    NlMsgError::from_bytes(payload)?.into_result(header.nlmsg_flags, payload)?;
                }
                return Ok(Reply {
                    header,
                    payload: payload.to_vec(),
                });
            }
        }
    }

    /// Send `builder` as a dump request and feed each reply to `visitor`.
    ///
    /// Returns once the kernel signals DONE or the visitor breaks. A
    /// multi-part message from a foreign transaction means the stream can no
    /// longer be trusted and ends the dump with [`Error::DumpTerminated`].
    pub async fn dump<F>(&mut self, mut builder: MessageBuilder, mut visitor: F) -> Result<()>
    where
        F: FnMut(&NlMsgHdr, &[u8]) -> Result<ControlFlow<()>>,
    {
        builder.add_flags(NLM_F_REQUEST | NLM_F_DUMP);
        let (seq, pid) = self.send(builder).await?;
        let mut interrupted = false;

        loop {
            let data = self.transport.recv().await?;
            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if !header.matches(seq, pid) {
                    if header.is_multi() || header.is_done() {
                        return Err(Error::DumpTerminated(format!(
                            "unexpected sequence {} from port {} (expected {} from {})",
                            header.nlmsg_seq, header.nlmsg_pid, seq, pid
                        )));
                    }
                    tracing::trace!(
                        seq = header.nlmsg_seq,
                        pid = header.nlmsg_pid,
                        "discarding unrelated message during dump"
                    );
                    continue;
                }

                interrupted |= header.is_dump_interrupted();

                match header.nlmsg_type {
                    NlMsgType::NOOP => continue,
                    NlMsgType::DONE => {
                        if interrupted {
                            tracing::warn!("dump was interrupted and may be inconsistent");
                        }
                        return done_status(payload);
                    }
                    NlMsgType::ERROR => {
                        // A zero code closes the stream like DONE.
                        return NlMsgError::from_bytes(payload)?
                            .into_result(header.nlmsg_flags, payload);
                    }
                    _ => {}
                }

                if visitor(&header, payload)?.is_break() {
                    tracing::debug!(seq, "dump stopped by visitor");
                    return Ok(());
                }
            }
        }
    }

    async fn send(&mut self, mut builder: MessageBuilder) -> Result<(u32, u32)> {
        let seq = next_seq();
        let pid = self.transport.port_id();
        builder.set_seq(seq);
        builder.set_pid(pid);

        let msg = builder.finish();
        tracing::debug!(seq, len = msg.len(), "sending netlink request");
        self.transport.send(&msg).await?;
        Ok((seq, pid))
    }
}

/// DONE may carry the dump's final status as a native i32.
fn done_status(payload: &[u8]) -> Result<()> {
    match payload.first_chunk::<4>().map(|b| i32::from_ne_bytes(*b)) {
        Some(code) if code < 0 => Err(Error::from_errno(code)),
        _ => Ok(()),
    }
}
