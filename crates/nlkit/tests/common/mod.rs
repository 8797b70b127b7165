//! Common test utilities for integration tests.

use nlkit::Result;
use nlkit::kind::KindRegistry;
use nlkit::netlink::link::LinkMessage;
use nlkit::netlink::{Connection, Protocol, link};

/// Skip the current test unless running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if unsafe { libc::geteuid() } != 0 {
            eprintln!("skipping: requires root");
            return Ok(());
        }
    };
}

/// Tokens as the command line would pass them.
pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Fetch one link by name.
pub async fn get_link(conn: &mut Connection, name: &str) -> Result<LinkMessage> {
    let reply = conn.talk(link::get_request(Some(name))?).await?;
    LinkMessage::parse(&reply.payload)
}

pub fn route() -> Result<Connection> {
    Connection::new(Protocol::Route)
}

pub fn registry() -> KindRegistry {
    KindRegistry::builtin()
}
