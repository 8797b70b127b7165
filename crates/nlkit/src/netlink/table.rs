//! Decoded attribute tables.
//!
//! An [`AttrTable`] indexes one run of attributes by type. Parsing is all or
//! nothing: a malformed run yields an error and no table. Types above the
//! table's maximum are dropped and a repeated type keeps its last value.

use std::collections::BTreeMap;
use std::fmt;

use super::attr::{AttrIter, get};
use super::error::Result;

/// One attribute out of a table.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    kind: u16,
    payload: &'a [u8],
}

impl<'a> Attr<'a> {
    /// Attribute type with flag bits removed.
    pub fn kind(&self) -> u16 {
        self.kind
    }

    /// Raw payload.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn u8(&self) -> Result<u8> {
        get::u8(self.payload)
    }

    pub fn u16(&self) -> Result<u16> {
        get::u16_ne(self.payload)
    }

    pub fn u32(&self) -> Result<u32> {
        get::u32_ne(self.payload)
    }

    pub fn u64(&self) -> Result<u64> {
        get::u64_ne(self.payload)
    }

    pub fn i32(&self) -> Result<i32> {
        get::i32_ne(self.payload)
    }

    /// Network byte order u16.
    pub fn u16_be(&self) -> Result<u16> {
        get::u16_be(self.payload)
    }

    /// Network byte order u32.
    pub fn u32_be(&self) -> Result<u32> {
        get::u32_be(self.payload)
    }

    pub fn str(&self) -> Result<&'a str> {
        get::string(self.payload)
    }

    /// Decode the payload as a nested attribute run.
    pub fn nested(&self, max: u16) -> Result<AttrTable<'a>> {
        AttrTable::parse(self.payload, max)
    }
}

impl fmt::Debug for Attr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attr")
            .field("kind", &self.kind)
            .field("len", &self.payload.len())
            .finish()
    }
}

/// Attributes of one run, indexed by type in `0..=max`.
#[derive(Debug, Clone, Default)]
pub struct AttrTable<'a> {
    max: u16,
    attrs: BTreeMap<u16, Attr<'a>>,
}

impl<'a> AttrTable<'a> {
    /// Decode `data` keeping attribute types up to `max`.
    pub fn parse(data: &'a [u8], max: u16) -> Result<Self> {
        let mut attrs = BTreeMap::new();
        for raw in AttrIter::new(data) {
            let raw = raw?;
            let kind = raw.header.kind();
            if kind > max {
                continue;
            }
            attrs.insert(
                kind,
                Attr {
                    kind,
                    payload: raw.payload,
                },
            );
        }
        Ok(Self { max, attrs })
    }

    /// Highest attribute type kept by this table.
    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn get(&self, kind: u16) -> Option<Attr<'a>> {
        self.attrs.get(&kind).copied()
    }

    pub fn contains(&self, kind: u16) -> bool {
        self.attrs.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Present attributes in ascending type order.
    pub fn iter(&self) -> impl Iterator<Item = Attr<'a>> + '_ {
        self.attrs.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{NLA_F_NESTED, encode};
    use crate::netlink::error::Error;

    fn run(records: &[(u16, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (kind, payload) in records {
            encode(&mut buf, 4096, *kind, payload).unwrap();
        }
        buf
    }

    #[test]
    fn test_lookup() {
        let data = run(&[(1, &[3]), (2, &8u16.to_ne_bytes()), (3, &100u32.to_ne_bytes())]);
        let table = AttrTable::parse(&data, 32).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1).unwrap().u8().unwrap(), 3);
        assert_eq!(table.get(2).unwrap().u16().unwrap(), 8);
        assert_eq!(table.get(3).unwrap().u32().unwrap(), 100);
        assert!(table.get(4).is_none());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let data = run(&[(4, &[0]), (4, &[1])]);
        let table = AttrTable::parse(&data, 8).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(4).unwrap().u8().unwrap(), 1);
    }

    #[test]
    fn test_types_above_max_dropped() {
        let data = run(&[(1, &[1]), (33, &[1]), (200, &[])]);
        let table = AttrTable::parse(&data, 32).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.contains(33));
        assert_eq!(table.max(), 32);
    }

    #[test]
    fn test_truncated_run_fails_as_a_unit() {
        let mut data = run(&[(1, &[1]), (2, &[2])]);
        data.extend_from_slice(&[16, 0, 3, 0, 1, 2]);
        assert!(matches!(
            AttrTable::parse(&data, 8),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_nested() {
        let inner = run(&[(1, b"bridge\0"), (5, &[])]);
        let data = run(&[(18 | NLA_F_NESTED, &inner)]);
        let table = AttrTable::parse(&data, 64).unwrap();
        let linkinfo = table.get(18).unwrap().nested(5).unwrap();
        assert_eq!(linkinfo.get(1).unwrap().str().unwrap(), "bridge");
        assert!(linkinfo.get(5).unwrap().payload().is_empty());
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let data = run(&[(1, &[1, 0])]);
        let table = AttrTable::parse(&data, 4).unwrap();
        assert!(table.get(1).unwrap().u8().is_err());
        assert!(table.get(1).unwrap().u32().is_err());
    }
}
