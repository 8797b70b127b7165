//! Integration test entry point.
//!
//! These tests talk to the running kernel. Most of them only read state and
//! work unprivileged; the ones that change something skip themselves
//! unless run as root.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nlkit --test integration --features integration
//!
//! # Including the tests that change link state
//! sudo cargo test -p nlkit --test integration --features integration
//! ```
//!
//! # Test Organization
//!
//! - `genl.rs` - Generic netlink family resolution
//! - `link.rs` - Link queries, link changes and extended statistics

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "integration/genl.rs"]
mod genl;

#[path = "integration/link.rs"]
mod link;
