//! Foo-over-UDP generic netlink family.
//!
//! The kernel registers this family as `"fou"`; receive ports are added and
//! removed with [`FOU_CMD_ADD`] / [`FOU_CMD_DEL`] and listed with a
//! [`FOU_CMD_GET`] dump. Option parsing and printing live in the `fou` kind
//! handler.

/// Family name registered by the kernel.
pub const FOU_GENL_NAME: &str = "fou";
/// Family version.
pub const FOU_GENL_VERSION: u8 = 1;

pub const FOU_CMD_UNSPEC: u8 = 0;
pub const FOU_CMD_ADD: u8 = 1;
pub const FOU_CMD_DEL: u8 = 2;
pub const FOU_CMD_GET: u8 = 3;

pub const FOU_ATTR_UNSPEC: u16 = 0;
/// u16, network byte order
pub const FOU_ATTR_PORT: u16 = 1;
/// u8
pub const FOU_ATTR_AF: u16 = 2;
/// u8
pub const FOU_ATTR_IPPROTO: u16 = 3;
/// u8
pub const FOU_ATTR_TYPE: u16 = 4;
/// flag
pub const FOU_ATTR_REMCSUM_NOPARTIAL: u16 = 5;
pub const FOU_ATTR_LOCAL_V4: u16 = 6;
pub const FOU_ATTR_LOCAL_V6: u16 = 7;
pub const FOU_ATTR_PEER_V4: u16 = 8;
pub const FOU_ATTR_PEER_V6: u16 = 9;
pub const FOU_ATTR_PEER_PORT: u16 = 10;
pub const FOU_ATTR_IFINDEX: u16 = 11;
pub const FOU_ATTR_MAX: u16 = FOU_ATTR_IFINDEX;

/// Encapsulation types carried in [`FOU_ATTR_TYPE`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FouEncap {
    Unspec = 0,
    /// Plain foo-over-UDP, inner protocol given by `ipproto`.
    Direct = 1,
    /// Generic UDP encapsulation.
    Gue = 2,
}

impl FouEncap {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Direct,
            2 => Self::Gue,
            _ => Self::Unspec,
        }
    }
}
