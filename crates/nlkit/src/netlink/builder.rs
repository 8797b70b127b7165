//! Message builder for constructing netlink messages.
//!
//! Every builder carries the capacity it was created with; an append that
//! would cross it fails with [`Error::Overflow`] and leaves the buffer as it
//! was.

use zerocopy::{Immutable, IntoBytes};

use super::attr::{self, NLA_F_NESTED, nla_align};
use super::error::{Error, Result};
use super::message::{NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

/// Capacity for ordinary requests.
pub const REQUEST_CAPACITY: usize = 1024;

/// Capacity for dump requests.
pub const DUMP_CAPACITY: usize = 4096;

/// Token returned when starting a nested attribute.
/// Used to finalize the nested attribute length.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct NestToken {
    /// Offset of the nested attribute header in the buffer.
    offset: usize,
}

/// Builder for constructing netlink messages.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
    capacity: usize,
}

impl MessageBuilder {
    /// Create an empty message of the given type and flags, sequence zero.
    ///
    /// The header always fits: a `capacity` below [`NLMSG_HDRLEN`] is raised
    /// to it, leaving no room for attributes.
    pub fn new(capacity: usize, msg_type: u16, flags: u16) -> Self {
        let capacity = capacity.max(NLMSG_HDRLEN);
        let header = NlMsgHdr::new(msg_type, flags);
        let mut buf = Vec::with_capacity(capacity.min(DUMP_CAPACITY));
        buf.extend_from_slice(header.as_bytes());
        Self { buf, capacity }
    }

    /// Declared capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current message length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the message is empty (header only).
    pub fn is_empty(&self) -> bool {
        self.buf.len() == NLMSG_HDRLEN
    }

    /// Current write position, for use with [`rollback`](Self::rollback).
    pub fn checkpoint(&self) -> usize {
        self.buf.len()
    }

    /// Drop everything written after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        self.buf.truncate(checkpoint.max(NLMSG_HDRLEN));
    }

    fn reserve(&self, extra: usize) -> Result<()> {
        let needed = self.buf.len() + extra;
        if needed > self.capacity {
            return Err(Error::Overflow {
                capacity: self.capacity,
                needed,
            });
        }
        Ok(())
    }

    /// Append raw bytes to the message (with alignment padding).
    pub fn append_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(nlmsg_align(data.len()))?;
        self.buf.extend_from_slice(data);
        self.buf.resize(nlmsg_align(self.buf.len()), 0);
        Ok(())
    }

    /// Append a fixed-size family header such as `ifinfomsg` or `genlmsghdr`.
    pub fn append<T: IntoBytes + Immutable>(&mut self, data: &T) -> Result<()> {
        self.append_bytes(data.as_bytes())
    }

    /// Append an attribute with the given type and data.
    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) -> Result<()> {
        attr::encode(&mut self.buf, self.capacity, attr_type, data)
    }

    /// Append a u8 attribute.
    pub fn append_attr_u8(&mut self, attr_type: u16, value: u8) -> Result<()> {
        self.append_attr(attr_type, &[value])
    }

    /// Append an empty (flag) attribute with no payload.
    pub fn append_attr_empty(&mut self, attr_type: u16) -> Result<()> {
        self.append_attr(attr_type, &[])
    }

    /// Append a u16 attribute (native endian).
    pub fn append_attr_u16(&mut self, attr_type: u16, value: u16) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a u32 attribute (native endian).
    pub fn append_attr_u32(&mut self, attr_type: u16, value: u32) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append an i32 attribute (native endian).
    pub fn append_attr_i32(&mut self, attr_type: u16, value: i32) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a u64 attribute (native endian).
    pub fn append_attr_u64(&mut self, attr_type: u16, value: u64) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a u16 attribute (big endian / network order).
    pub fn append_attr_u16_be(&mut self, attr_type: u16, value: u16) -> Result<()> {
        self.append_attr(attr_type, &value.to_be_bytes())
    }

    /// Append a u32 attribute (big endian / network order).
    pub fn append_attr_u32_be(&mut self, attr_type: u16, value: u32) -> Result<()> {
        self.append_attr(attr_type, &value.to_be_bytes())
    }

    /// Append a null-terminated string attribute.
    pub fn append_attr_str(&mut self, attr_type: u16, value: &str) -> Result<()> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        self.append_attr(attr_type, &data)
    }

    /// Start a nested attribute. Returns a token to finalize it.
    ///
    /// Prefer [`append_nested`](Self::append_nested), which cannot leave a
    /// nest open.
    pub fn nest_start(&mut self, attr_type: u16) -> Result<NestToken> {
        let offset = self.buf.len();
        attr::encode(&mut self.buf, self.capacity, attr_type | NLA_F_NESTED, &[])?;
        Ok(NestToken { offset })
    }

    /// End a nested attribute started with `nest_start`.
    pub fn nest_end(&mut self, token: NestToken) -> Result<()> {
        let len = self.buf.len() - token.offset;
        let len = u16::try_from(len).map_err(|_| Error::Overflow {
            capacity: u16::MAX as usize,
            needed: len,
        })?;
        self.buf[token.offset..token.offset + 2].copy_from_slice(&len.to_ne_bytes());
        self.buf.resize(nla_align(self.buf.len()), 0);
        Ok(())
    }

    /// Append a nested attribute whose children are written by `f`.
    ///
    /// The nest length is filled in once `f` returns. On any failure the
    /// message is restored to its state before the call.
    pub fn append_nested<F>(&mut self, attr_type: u16, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let checkpoint = self.checkpoint();
        let result = match self.nest_start(attr_type) {
            Ok(token) => f(self).and_then(|()| self.nest_end(token)),
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    /// Replace the message type, for requests parsed before the target
    /// family id is known.
    pub fn set_type(&mut self, msg_type: u16) {
        self.buf[4..6].copy_from_slice(&msg_type.to_ne_bytes());
    }

    /// OR additional flags into the header.
    pub fn add_flags(&mut self, flags: u16) {
        let current = u16::from_ne_bytes([self.buf[6], self.buf[7]]);
        self.buf[6..8].copy_from_slice(&(current | flags).to_ne_bytes());
    }

    /// Set the sequence number.
    pub fn set_seq(&mut self, seq: u32) {
        self.buf[8..12].copy_from_slice(&seq.to_ne_bytes());
    }

    /// Set the port ID.
    pub fn set_pid(&mut self, pid: u32) {
        self.buf[12..16].copy_from_slice(&pid.to_ne_bytes());
    }

    /// Finalize and return the message bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
        self.buf
    }

    /// Get the current buffer for inspection.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Attributes written after the family header of `header_len` bytes.
    pub fn attributes(&self, header_len: usize) -> &[u8] {
        self.buf
            .get(NLMSG_HDRLEN + nlmsg_align(header_len)..)
            .unwrap_or(&[])
    }
}

/// Request expecting an acknowledgement.
pub fn ack_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(REQUEST_CAPACITY, msg_type, NLM_F_REQUEST | NLM_F_ACK)
}

/// Request for a multi-part dump.
pub fn dump_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(DUMP_CAPACITY, msg_type, NLM_F_REQUEST | NLM_F_DUMP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::NLA_HDRLEN;
    use crate::netlink::table::AttrTable;

    #[test]
    fn test_simple_message() {
        let msg = MessageBuilder::new(64, 16, NLM_F_REQUEST).finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, NLMSG_HDRLEN);
        assert_eq!(header.nlmsg_type, 16);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);
        assert_eq!(header.nlmsg_seq, 0);
    }

    #[test]
    fn test_attribute() {
        let mut builder = MessageBuilder::new(64, 16, NLM_F_REQUEST);
        builder.append_attr_u32(1, 0x12345678).unwrap();
        let msg = builder.finish();

        assert_eq!(msg.len(), NLMSG_HDRLEN + NLA_HDRLEN + 4);
        let table = AttrTable::parse(&msg[NLMSG_HDRLEN..], 4).unwrap();
        assert_eq!(table.get(1).unwrap().u32().unwrap(), 0x12345678);
    }

    #[test]
    fn test_overflow_leaves_buffer_untouched() {
        let mut builder = MessageBuilder::new(NLMSG_HDRLEN + 8, 16, NLM_F_REQUEST);
        builder.append_attr_u32(1, 7).unwrap();
        let before = builder.as_bytes().to_vec();

        let err = builder.append_attr_u8(2, 1).unwrap_err();
        assert!(matches!(err, Error::Overflow { needed: 32, .. }));
        assert_eq!(builder.as_bytes(), &before[..]);
    }

    #[test]
    fn test_capacity_below_header() {
        let mut builder = MessageBuilder::new(4, 16, NLM_F_REQUEST);
        assert_eq!(builder.capacity(), NLMSG_HDRLEN);
        assert_eq!(builder.len(), NLMSG_HDRLEN);
        assert!(builder.is_empty());

        let err = builder.append_attr_u8(1, 0).unwrap_err();
        assert!(matches!(err, Error::Overflow { capacity: NLMSG_HDRLEN, .. }));
        assert!(builder.len() <= builder.capacity());
    }

    #[test]
    fn test_nested_attribute() {
        let mut builder = MessageBuilder::new(128, 16, NLM_F_REQUEST);
        builder
            .append_nested(1, |b| {
                b.append_attr_u32(2, 100)?;
                b.append_attr_str(3, "eth0")
            })
            .unwrap();
        let msg = builder.finish();

        let outer = AttrTable::parse(&msg[NLMSG_HDRLEN..], 4).unwrap();
        let nest = outer.get(1).unwrap();
        assert_eq!(nest.payload().len(), 8 + 12);
        let inner = nest.nested(4).unwrap();
        assert_eq!(inner.get(2).unwrap().u32().unwrap(), 100);
        assert_eq!(inner.get(3).unwrap().str().unwrap(), "eth0");
        // NLA_F_NESTED is set on the wire.
        assert_eq!(u16::from_ne_bytes([msg[18], msg[19]]), 1 | NLA_F_NESTED);
    }

    #[test]
    fn test_nested_overflow_rolls_back() {
        let mut builder = MessageBuilder::new(NLMSG_HDRLEN + 16, 16, NLM_F_REQUEST);
        builder.append_attr_u8(9, 1).unwrap();
        let before = builder.as_bytes().to_vec();

        let err = builder
            .append_nested(1, |b| {
                b.append_attr_u8(2, 1)?;
                b.append_attr_u64(3, 1)
            })
            .unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }));
        assert_eq!(builder.as_bytes(), &before[..]);

        // The parent is still usable.
        builder.append_attr_u8(4, 1).unwrap();
        assert_eq!(builder.len(), NLMSG_HDRLEN + 16);
    }

    #[test]
    fn test_nested_closure_error_rolls_back() {
        let mut builder = MessageBuilder::new(256, 16, NLM_F_REQUEST);
        let err = builder
            .append_nested(1, |b| {
                b.append_attr_u8(2, 1)?;
                Err(Error::Usage("stop".into()))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_header_fields() {
        let mut builder = dump_request(0);
        builder.set_type(0x1c);
        builder.add_flags(NLM_F_ACK);
        builder.set_seq(42);
        builder.set_pid(1234);
        assert_eq!(builder.capacity(), DUMP_CAPACITY);
        let msg = builder.finish();

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_type, 0x1c);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_DUMP | NLM_F_ACK);
        assert_eq!(header.nlmsg_seq, 42);
        assert_eq!(header.nlmsg_pid, 1234);
        assert_eq!(ack_request(16).capacity(), REQUEST_CAPACITY);
    }
}
