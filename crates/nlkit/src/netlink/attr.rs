//! Netlink attribute (rtattr/nlattr) handling.
//!
//! ```text
//! ┌──────────┬──────────┬───────────────────┬─────────┐
//! │ len: u16 │ type: u16│ payload (len - 4) │ pad → 4 │
//! └──────────┴──────────┴───────────────────┴─────────┘
//! ```
//!
//! `len` covers header and payload but not the trailing padding.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr / struct rtattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Create a new attribute header.
    ///
    /// Callers check `data_len` against `u16::MAX` first; see [`encode`].
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Read a header from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(attr, _)| attr)
            .map_err(|_| Error::Truncated {
                expected: NLA_HDRLEN,
                actual: data.len(),
            })
    }
}

/// Encoded size of an attribute carrying `payload_len` bytes, padding included.
#[inline]
pub const fn encoded_len(payload_len: usize) -> usize {
    nla_align(NLA_HDRLEN + payload_len)
}

/// Append one attribute record to `buf` without letting it grow past `capacity`.
///
/// Nothing is written when the record does not fit.
pub fn encode(buf: &mut Vec<u8>, capacity: usize, attr_type: u16, payload: &[u8]) -> Result<()> {
    let needed = buf.len() + encoded_len(payload.len());
    if needed > capacity || NLA_HDRLEN + payload.len() > u16::MAX as usize {
        return Err(Error::Overflow { capacity, needed });
    }
    buf.extend_from_slice(NlAttr::new(attr_type, payload.len()).as_bytes());
    buf.extend_from_slice(payload);
    buf.resize(nla_align(buf.len()), 0);
    Ok(())
}

/// One decoded attribute record.
#[derive(Debug, Clone, Copy)]
pub struct RawAttr<'a> {
    /// Header as found on the wire.
    pub header: NlAttr,
    /// Payload without header or padding.
    pub payload: &'a [u8],
}

/// Iterator over a run of netlink attributes.
///
/// Yields an error, then stops, on the first record whose header or declared
/// length does not fit in the remaining input.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn fail(&mut self, err: Error) -> Option<Result<RawAttr<'a>>> {
        self.data = &[];
        Some(Err(err))
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<RawAttr<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let header = match NlAttr::from_bytes(self.data) {
            Ok(h) => h,
            Err(e) => return self.fail(e),
        };

        let len = header.nla_len as usize;
        if len < NLA_HDRLEN {
            return self.fail(Error::InvalidAttribute(format!(
                "attribute {} declares length {}",
                header.kind(),
                len
            )));
        }
        if len > self.data.len() {
            return self.fail(Error::Truncated {
                expected: len,
                actual: self.data.len(),
            });
        }

        let payload = &self.data[NLA_HDRLEN..len];
        // The final record may arrive without its padding.
        let aligned_len = nla_align(len).min(self.data.len());
        self.data = &self.data[aligned_len..];

        Some(Ok(RawAttr { header, payload }))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
///
/// Fixed-width readers insist on an exact payload length.
pub mod get {
    use super::*;

    fn exact<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N]> {
        data.try_into().map_err(|_| {
            Error::InvalidAttribute(format!(
                "{what} attribute needs {N} bytes, got {}",
                data.len()
            ))
        })
    }

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        Ok(exact::<1>(data, "u8")?[0])
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        exact(data, "u16").map(u16::from_ne_bytes)
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        exact(data, "u32").map(u32::from_ne_bytes)
    }

    /// Extract a u64 value (native endian).
    pub fn u64_ne(data: &[u8]) -> Result<u64> {
        exact(data, "u64").map(u64::from_ne_bytes)
    }

    /// Extract a u16 value (big endian / network order).
    pub fn u16_be(data: &[u8]) -> Result<u16> {
        exact(data, "u16").map(u16::from_be_bytes)
    }

    /// Extract a u32 value (big endian / network order).
    pub fn u32_be(data: &[u8]) -> Result<u32> {
        exact(data, "u32").map(u32::from_be_bytes)
    }

    /// Extract an i32 value (native endian).
    pub fn i32_ne(data: &[u8]) -> Result<i32> {
        exact(data, "i32").map(i32::from_ne_bytes)
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }
}
