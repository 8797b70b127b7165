//! Fixed-layout family headers and attribute numbering.

pub mod bridge;
pub mod link;
pub mod stats;
