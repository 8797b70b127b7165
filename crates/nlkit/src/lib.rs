//! Netlink attribute protocol and per-kind dispatch for Linux network tools.
//!
//! `nlkit` speaks the rtnetlink and generic netlink protocols over an async
//! socket and routes kind specific options (bridge ports, foo-over-UDP
//! ports) through a registry of handlers.
//!
//! - [`netlink`]: attribute codec, message builder, transactions, family
//!   resolution, link and XDP requests
//! - [`kind`]: handler traits and the [`KindRegistry`](kind::KindRegistry)
//! - [`output`]: text and JSON field sinks
//! - [`util`]: number parsing, protocol names, command execution
//!
//! # Example
//!
//! ```rust,no_run
//! use nlkit::kind::KindRegistry;
//! use nlkit::netlink::link::LinkRequest;
//! use nlkit::netlink::{Connection, Protocol};
//!
//! #[tokio::main]
//! async fn main() -> nlkit::Result<()> {
//!     let registry = KindRegistry::builtin();
//!     let args: Vec<String> = ["eth0", "type", "bridge_slave", "hairpin", "on"]
//!         .iter()
//!         .map(|s| s.to_string())
//!         .collect();
//!
//!     let request = LinkRequest::parse(&args, false)?.build(&registry)?;
//!     let mut conn = Connection::new(Protocol::Route)?;
//!     conn.talk(request).await?;
//!     Ok(())
//! }
//! ```

pub mod kind;
pub mod netlink;
pub mod output;
pub mod util;

pub use netlink::{Connection, Error, Protocol, Result};
