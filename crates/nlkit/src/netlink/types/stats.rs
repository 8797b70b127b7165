//! RTM_GETSTATS message types.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Statistics request/response header (struct if_stats_msg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfStatsMsg {
    pub family: u8,
    pub pad1: u8,
    pub pad2: u16,
    pub ifindex: u32,
    /// Bit `n - 1` selects IFLA_STATS attribute `n`.
    pub filter_mask: u32,
}

impl IfStatsMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Header requesting only the statistics attribute `attr`.
    pub fn filter(attr: u16) -> Self {
        Self {
            filter_mask: filter_bit(attr),
            ..Self::default()
        }
    }

    /// Split a stats message payload into header and attributes.
    pub fn split(payload: &[u8]) -> Result<(Self, &[u8])> {
        Self::read_from_prefix(payload).map_err(|_| Error::Truncated {
            expected: Self::SIZE,
            actual: payload.len(),
        })
    }
}

/// Filter mask bit for statistics attribute `attr`.
pub const fn filter_bit(attr: u16) -> u32 {
    1 << (attr - 1)
}

pub const IFLA_STATS_LINK_64: u16 = 1;
pub const IFLA_STATS_LINK_XSTATS: u16 = 2;
pub const IFLA_STATS_LINK_XSTATS_SLAVE: u16 = 3;
pub const IFLA_STATS_LINK_OFFLOAD_XSTATS: u16 = 4;
pub const IFLA_STATS_AF_SPEC: u16 = 5;
pub const IFLA_STATS_MAX: u16 = IFLA_STATS_AF_SPEC;

/// Per-kind containers inside the XSTATS attributes.
pub const LINK_XSTATS_TYPE_UNSPEC: u16 = 0;
pub const LINK_XSTATS_TYPE_BRIDGE: u16 = 1;
pub const LINK_XSTATS_TYPE_BOND: u16 = 2;
pub const LINK_XSTATS_TYPE_MAX: u16 = LINK_XSTATS_TYPE_BOND;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mask() {
        assert_eq!(IfStatsMsg::SIZE, 12);
        assert_eq!(IfStatsMsg::filter(IFLA_STATS_LINK_XSTATS_SLAVE).filter_mask, 0b100);
        assert_eq!(filter_bit(IFLA_STATS_LINK_64), 1);
    }
}
