//! Bridge port attributes and bridge extended statistics.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Per-port attributes carried in IFLA_INFO_SLAVE_DATA (IFLA_BRPORT_*).
pub const IFLA_BRPORT_STATE: u16 = 1;
pub const IFLA_BRPORT_PRIORITY: u16 = 2;
pub const IFLA_BRPORT_COST: u16 = 3;
/// Hairpin mode.
pub const IFLA_BRPORT_MODE: u16 = 4;
pub const IFLA_BRPORT_GUARD: u16 = 5;
/// Root block.
pub const IFLA_BRPORT_PROTECT: u16 = 6;
pub const IFLA_BRPORT_FAST_LEAVE: u16 = 7;
pub const IFLA_BRPORT_LEARNING: u16 = 8;
pub const IFLA_BRPORT_UNICAST_FLOOD: u16 = 9;
pub const IFLA_BRPORT_PROXYARP: u16 = 10;
pub const IFLA_BRPORT_LEARNING_SYNC: u16 = 11;
pub const IFLA_BRPORT_PROXYARP_WIFI: u16 = 12;
pub const IFLA_BRPORT_ROOT_ID: u16 = 13;
pub const IFLA_BRPORT_BRIDGE_ID: u16 = 14;
pub const IFLA_BRPORT_DESIGNATED_PORT: u16 = 15;
pub const IFLA_BRPORT_DESIGNATED_COST: u16 = 16;
pub const IFLA_BRPORT_ID: u16 = 17;
pub const IFLA_BRPORT_NO: u16 = 18;
pub const IFLA_BRPORT_TOPOLOGY_CHANGE_ACK: u16 = 19;
pub const IFLA_BRPORT_CONFIG_PENDING: u16 = 20;
pub const IFLA_BRPORT_MESSAGE_AGE_TIMER: u16 = 21;
pub const IFLA_BRPORT_FORWARD_DELAY_TIMER: u16 = 22;
pub const IFLA_BRPORT_HOLD_TIMER: u16 = 23;
pub const IFLA_BRPORT_FLUSH: u16 = 24;
pub const IFLA_BRPORT_MULTICAST_ROUTER: u16 = 25;
pub const IFLA_BRPORT_PAD: u16 = 26;
pub const IFLA_BRPORT_MCAST_FLOOD: u16 = 27;
pub const IFLA_BRPORT_MCAST_TO_UCAST: u16 = 28;
pub const IFLA_BRPORT_VLAN_TUNNEL: u16 = 29;
pub const IFLA_BRPORT_BCAST_FLOOD: u16 = 30;
pub const IFLA_BRPORT_GROUP_FWD_MASK: u16 = 31;
pub const IFLA_BRPORT_NEIGH_SUPPRESS: u16 = 32;
pub const IFLA_BRPORT_MAX: u16 = IFLA_BRPORT_NEIGH_SUPPRESS;

/// Highest STP port state (BR_STATE_BLOCKING).
pub const BR_STATE_MAX: u8 = 4;

/// Attributes inside LINK_XSTATS_TYPE_BRIDGE.
pub const BRIDGE_XSTATS_UNSPEC: u16 = 0;
pub const BRIDGE_XSTATS_VLAN: u16 = 1;
pub const BRIDGE_XSTATS_MCAST: u16 = 2;
pub const BRIDGE_XSTATS_PAD: u16 = 3;
pub const BRIDGE_XSTATS_STP: u16 = 4;
pub const BRIDGE_XSTATS_MAX: u16 = BRIDGE_XSTATS_STP;

fn read<T: FromBytes>(data: &[u8]) -> Result<T> {
    T::read_from_prefix(data)
        .map(|(value, _)| value)
        .map_err(|_| Error::Truncated {
            expected: std::mem::size_of::<T>(),
            actual: data.len(),
        })
}

/// Bridge identifier (struct ifla_bridge_id).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BridgeId {
    pub prio: [u8; 2],
    pub addr: [u8; 6],
}

impl BridgeId {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        read(data)
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}.", self.prio[0], self.prio[1])?;
        for byte in self.addr {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Per-port STP counters (struct bridge_stp_xstats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BridgeStpXstats {
    pub transition_blk: u64,
    pub transition_fwd: u64,
    pub rx_bpdu: u64,
    pub tx_bpdu: u64,
    pub rx_tcn: u64,
    pub tx_tcn: u64,
}

impl BridgeStpXstats {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        read(data)
    }
}

/// Received/transmitted counter pair.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RxTx {
    pub rx: u64,
    pub tx: u64,
}

/// Multicast snooping counters (struct br_mcast_stats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct BrMcastStats {
    pub igmp_v1queries: RxTx,
    pub igmp_v2queries: RxTx,
    pub igmp_v3queries: RxTx,
    pub igmp_leaves: RxTx,
    pub igmp_v1reports: RxTx,
    pub igmp_v2reports: RxTx,
    pub igmp_v3reports: RxTx,
    pub igmp_parse_errors: u64,
    pub mld_v1queries: RxTx,
    pub mld_v2queries: RxTx,
    pub mld_leaves: RxTx,
    pub mld_v1reports: RxTx,
    pub mld_v2reports: RxTx,
    pub mld_parse_errors: u64,
    pub mcast_bytes: RxTx,
    pub mcast_packets: RxTx,
}

impl BrMcastStats {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        read(data)
    }

    /// Directional counters in kernel order, by name.
    pub fn pairs(&self) -> [(&'static str, RxTx); 14] {
        [
            ("igmp_v1queries", self.igmp_v1queries),
            ("igmp_v2queries", self.igmp_v2queries),
            ("igmp_v3queries", self.igmp_v3queries),
            ("igmp_leaves", self.igmp_leaves),
            ("igmp_v1reports", self.igmp_v1reports),
            ("igmp_v2reports", self.igmp_v2reports),
            ("igmp_v3reports", self.igmp_v3reports),
            ("mld_v1queries", self.mld_v1queries),
            ("mld_v2queries", self.mld_v2queries),
            ("mld_leaves", self.mld_leaves),
            ("mld_v1reports", self.mld_v1reports),
            ("mld_v2reports", self.mld_v2reports),
            ("mcast_bytes", self.mcast_bytes),
            ("mcast_packets", self.mcast_packets),
        ]
    }
}
