//! IP command implementations.

pub mod fou;
pub mod link;

use std::io::Write;

use nlkit::kind::KindRegistry;
use nlkit::{Error, Result};

/// Topic prefix for extended statistics help, followed by the kind.
pub const XSTATS_TOPIC: &str = "xstats ";

/// Write the usage text for `topic`: `link`, a kind name, or
/// [`XSTATS_TOPIC`] plus a kind name.
pub fn print_usage(registry: &KindRegistry, topic: &str, out: &mut dyn Write) -> Result<()> {
    if topic == "link" {
        out.write_all(link::USAGE.as_bytes())?;
        return Ok(());
    }
    if let Some(kind) = topic.strip_prefix(XSTATS_TOPIC) {
        return registry.print_xstats_help(kind, out);
    }
    if !registry.print_help(topic, out)? {
        return Err(Error::Usage(format!("no help for \"{topic}\"")));
    }
    Ok(())
}
