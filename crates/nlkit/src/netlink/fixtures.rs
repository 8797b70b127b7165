//! Scripted transport and reply builders for unit tests.

use std::collections::VecDeque;
use std::io;

use super::error::{Error, Result};
use super::message::{NLM_F_MULTI, NLMSG_HDRLEN, NlMsgError, NlMsgHdr, NlMsgType, nlmsg_align};
use super::socket::Transport;
use zerocopy::IntoBytes;

type Script = Box<dyn FnMut(u32) -> Vec<Vec<u8>>>;

/// Transport that answers every send from a script.
///
/// The script receives the sequence number of the request and returns the
/// datagrams to deliver. Receiving with nothing queued is an I/O error, so a
/// transaction that never completes fails instead of hanging.
pub(crate) struct MockTransport {
    pid: u32,
    script: Option<Script>,
    queue: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

impl MockTransport {
    pub(crate) fn new(pid: u32) -> Self {
        Self {
            pid,
            script: None,
            queue: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub(crate) fn reply_with(&mut self, script: impl FnMut(u32) -> Vec<Vec<u8>> + 'static) {
        self.script = Some(Box::new(script));
    }

    /// Every message sent so far.
    pub(crate) fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl Transport for MockTransport {
    fn port_id(&self) -> u32 {
        self.pid
    }

    async fn send(&mut self, msg: &[u8]) -> Result<()> {
        let header = NlMsgHdr::from_bytes(msg)?;
        self.sent.push(msg.to_vec());
        if let Some(script) = self.script.as_mut() {
            self.queue.extend(script(header.nlmsg_seq));
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        self.queue.pop_front().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "mock transport has no more datagrams",
            ))
        })
    }
}

/// One encoded message.
pub(crate) fn message(msg_type: u16, flags: u16, seq: u32, pid: u32, payload: &[u8]) -> Vec<u8> {
    let header = NlMsgHdr {
        nlmsg_len: (NLMSG_HDRLEN + payload.len()) as u32,
        nlmsg_type: msg_type,
        nlmsg_flags: flags,
        nlmsg_seq: seq,
        nlmsg_pid: pid,
    };
    let mut buf = header.as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(buf.len()), 0);
    buf
}

/// NLMSG_ERROR with the given (negative) code.
pub(crate) fn error_reply(seq: u32, pid: u32, code: i32) -> Vec<u8> {
    let err = NlMsgError {
        error: code,
        msg: NlMsgHdr {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: 0,
            nlmsg_flags: 0,
            nlmsg_seq: seq,
            nlmsg_pid: pid,
        },
    };
    message(NlMsgType::ERROR, 0, seq, pid, err.as_bytes())
}

/// Zero-code acknowledgement.
pub(crate) fn ack(seq: u32, pid: u32) -> Vec<u8> {
    error_reply(seq, pid, 0)
}

/// End of a dump.
pub(crate) fn done(seq: u32, pid: u32) -> Vec<u8> {
    message(NlMsgType::DONE, NLM_F_MULTI, seq, pid, &0i32.to_ne_bytes())
}
