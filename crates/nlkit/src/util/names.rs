//! Name resolution utilities for protocols, address families and port states.

use std::ffi::CString;

/// Look up an IP protocol number by name in the system protocol database
/// (`/etc/protocols`). Names are matched as the database spells them.
pub fn ip_protocol_id(name: &str) -> Option<u8> {
    let name = CString::new(name).ok()?;
    // SAFETY: getprotobyname reads a NUL terminated string and returns either
    // null or a pointer to static storage, read before any other lookup.
    let entry = unsafe { libc::getprotobyname(name.as_ptr()) };
    if entry.is_null() {
        return None;
    }
    // SAFETY: entry is non-null and points to a valid protoent.
    let proto = unsafe { (*entry).p_proto };
    u8::try_from(proto).ok()
}

/// Get the name of an address family.
pub fn family_name(family: u8) -> &'static str {
    match family as i32 {
        libc::AF_UNSPEC => "none",
        libc::AF_INET => "inet",
        libc::AF_INET6 => "inet6",
        libc::AF_PACKET => "link",
        libc::AF_BRIDGE => "bridge",
        libc::AF_MPLS => "mpls",
        _ => "???",
    }
}

/// STP port states, indexed by state number.
pub const PORT_STATES: [&str; 5] = ["disabled", "listening", "learning", "forwarding", "blocking"];

/// Get the name of a bridge port state.
pub fn port_state_name(state: u8) -> Option<&'static str> {
    PORT_STATES.get(state as usize).copied()
}

/// Get bridge port state number from name.
pub fn port_state_id(name: &str) -> Option<u8> {
    PORT_STATES
        .iter()
        .position(|s| *s == name)
        .map(|i| i as u8)
}
