//! Shared utilities for nlkit.

pub mod exec;
pub mod names;
pub mod parse;

pub use exec::cmd_exec;
pub use parse::{get_u8, get_u16, get_u32};
