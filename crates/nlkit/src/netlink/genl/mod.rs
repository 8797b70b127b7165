//! Generic Netlink (GENL) support.
//!
//! Generic netlink families get their message type assigned at runtime. The
//! control family, which has the fixed id [`GENL_ID_CTRL`], maps family names
//! to ids; [`FamilyResolver`] asks it once per name and remembers the answer.
//!
//! # Example
//!
//! ```rust,no_run
//! use nlkit::netlink::genl::FamilyResolver;
//!
//! # async fn example() -> nlkit::Result<()> {
//! let mut resolver = FamilyResolver::new()?;
//! let fou = resolver.resolve("fou").await?;
//! println!("fou family id: {}", fou);
//! # Ok(())
//! # }
//! ```

mod header;
mod resolver;

pub mod fou;

pub use header::{GENL_HDRLEN, GenlMsgHdr};
pub use resolver::{FamilyInfo, FamilyResolver};

use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::Result;

// Control family constants (fixed, not dynamically assigned)
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
}

/// Control family attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    Ops = 6,
    McastGroups = 7,
}

/// Highest control attribute decoded by the resolver.
pub const CTRL_ATTR_MAX: u16 = CtrlAttr::McastGroups as u16;

/// Control family multicast group attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Unspec = 0,
    Name = 1,
    Id = 2,
}

/// Start a GENL request: netlink header followed by `genlmsghdr`.
pub fn request(
    capacity: usize,
    family: u16,
    cmd: u8,
    version: u8,
    flags: u16,
) -> Result<MessageBuilder> {
    let mut builder = MessageBuilder::new(capacity, family, flags);
    builder.append(&GenlMsgHdr::new(cmd, version))?;
    Ok(builder)
}
