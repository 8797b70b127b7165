//! Async netlink protocol implementation for Linux.
//!
//! The layers build on each other: [`attr`] and [`table`] encode and decode
//! attribute runs, [`builder`] assembles requests inside a fixed capacity,
//! [`message`] walks the datagrams coming back and [`connection`] ties a
//! request to its replies over a [`socket`] transport.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nlkit::netlink::{Connection, Protocol, link};
//!
//! # async fn example() -> nlkit::Result<()> {
//! let mut conn = Connection::new(Protocol::Route)?;
//! let reply = conn.talk(link::get_request(Some("lo"))?).await?;
//! let lo = link::LinkMessage::parse(&reply.payload)?;
//! println!("{}: mtu {:?}", lo.name_or("?"), lo.mtu);
//! # Ok(())
//! # }
//! ```

pub mod attr;
pub mod builder;
pub mod connection;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod genl;
pub mod link;
pub mod message;
pub mod socket;
pub mod table;
pub mod types;
pub mod xdp;

pub use attr::{AttrIter, NlAttr};
pub use builder::{MessageBuilder, NestToken};
pub use connection::{Connection, Reply};
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::{NetlinkSocket, Protocol, Transport};
pub use table::{Attr, AttrTable};
