//! Per-kind option handlers and the registry that dispatches to them.
//!
//! A handler knows one object kind (`bridge_slave`, `fou`, ...). It turns
//! command line options into attributes and renders attributes back into
//! fields. Every capability is optional: a handler that cannot print simply
//! returns `None` from [`KindHandler::option_printer`], and dispatching to
//! it is a no-op.
//!
//! ```
//! use nlkit::kind::{KindRegistry, Operation};
//! use nlkit::netlink::builder::ack_request;
//!
//! let registry = KindRegistry::builtin();
//! let mut msg = ack_request(0);
//! let args = vec!["hairpin".to_string(), "on".to_string()];
//! registry.parse_options("bridge_slave", Operation::Set, &args, &mut msg)?;
//! assert!(!msg.is_empty());
//! # Ok::<(), nlkit::Error>(())
//! ```

pub mod bridge_slave;
pub mod fou;

use std::collections::BTreeMap;
use std::io;

use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::table::AttrTable;
use crate::output::FieldSink;

pub use bridge_slave::BridgeSlave;
pub use fou::Fou;

/// Suffix distinguishing a port (slave) kind from its master kind.
pub const SLAVE_SUFFIX: &str = "_slave";

/// What the parsed options will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Delete,
    Set,
}

/// Turns command line options into attributes.
pub trait ParseOptions {
    /// Append the attributes for `args` to `msg`.
    ///
    /// An unknown keyword fails the whole list. Callers restore `msg` on
    /// error, so partial appends are harmless.
    fn parse_options(&self, op: Operation, args: &[String], msg: &mut MessageBuilder) -> Result<()>;
}

/// Renders a decoded attribute table.
pub trait PrintOptions {
    fn print_options(&self, attrs: &AttrTable<'_>, sink: &mut dyn FieldSink) -> Result<()>;
}

/// Writes usage text.
pub trait PrintHelp {
    fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()>;
}

/// Selection made by extended statistics arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XstatsFilter {
    /// Restrict output to one device.
    pub dev: Option<String>,
    /// Nested statistics attribute to show; `None` shows all.
    pub group: Option<u16>,
}

/// Turns extended statistics arguments into a selection.
pub trait ParseXstats {
    fn parse_xstats(&self, args: &[String]) -> Result<XstatsFilter>;

    /// Write the usage text of the statistics arguments.
    fn print_xstats_help(&self, out: &mut dyn io::Write) -> io::Result<()>;
}

/// Renders extended statistics.
pub trait PrintXstats {
    /// IFLA_STATS_* attribute carrying this kind's statistics.
    fn stats_attr(&self) -> u16;

    /// Render the payload of [`stats_attr`](Self::stats_attr).
    fn print_xstats(
        &self,
        data: &[u8],
        filter: &XstatsFilter,
        sink: &mut dyn FieldSink,
    ) -> Result<()>;
}

/// One object kind.
pub trait KindHandler: Send + Sync {
    /// Kind name as typed on the command line.
    fn kind(&self) -> &'static str;

    /// Highest attribute type this handler understands.
    fn max_attr(&self) -> u16;

    fn option_parser(&self) -> Option<&dyn ParseOptions> {
        None
    }

    fn option_printer(&self) -> Option<&dyn PrintOptions> {
        None
    }

    fn help(&self) -> Option<&dyn PrintHelp> {
        None
    }

    fn xstats_parser(&self) -> Option<&dyn ParseXstats> {
        None
    }

    fn xstats_printer(&self) -> Option<&dyn PrintXstats> {
        None
    }
}

/// Capabilities a handler offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub parse_options: bool,
    pub print_options: bool,
    pub print_help: bool,
    pub parse_xstats: bool,
    pub print_xstats: bool,
}

/// Summary of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDescriptor {
    pub name: &'static str,
    pub max_attr: u16,
    pub capabilities: Capabilities,
}

impl KindDescriptor {
    fn of(handler: &dyn KindHandler) -> Self {
        Self {
            name: handler.kind(),
            max_attr: handler.max_attr(),
            capabilities: Capabilities {
                parse_options: handler.option_parser().is_some(),
                print_options: handler.option_printer().is_some(),
                print_help: handler.help().is_some(),
                parse_xstats: handler.xstats_parser().is_some(),
                print_xstats: handler.xstats_printer().is_some(),
            },
        }
    }
}

/// Handlers by kind name. Handlers are immutable once registered.
#[derive(Default)]
pub struct KindRegistry {
    handlers: BTreeMap<&'static str, Box<dyn KindHandler>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every handler shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let handlers: [Box<dyn KindHandler>; 2] = [Box::new(BridgeSlave), Box::new(Fou)];
        for handler in handlers {
            registry.handlers.insert(handler.kind(), handler);
        }
        registry
    }

    /// Add a handler. A second handler for the same name is rejected.
    pub fn register(&mut self, handler: Box<dyn KindHandler>) -> Result<()> {
        let name = handler.kind();
        if self.handlers.contains_key(name) {
            return Err(Error::DuplicateKind(name.to_string()));
        }
        tracing::debug!(kind = name, "registered kind handler");
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn lookup(&self, kind: &str) -> Option<&dyn KindHandler> {
        self.handlers.get(kind).map(|h| h.as_ref())
    }

    /// Handler for a slave kind as reported by the kernel (`bridge` finds
    /// `bridge_slave`).
    pub fn lookup_slave(&self, slave_kind: &str) -> Option<&dyn KindHandler> {
        self.lookup(&format!("{slave_kind}{SLAVE_SUFFIX}"))
    }

    pub fn describe(&self, kind: &str) -> Option<KindDescriptor> {
        self.lookup(kind).map(KindDescriptor::of)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Parse `args` for `kind` into `msg`.
    ///
    /// Succeeds without touching `msg` when the kind is unknown or cannot
    /// parse options. On error `msg` is restored to its prior contents.
    pub fn parse_options(
        &self,
        kind: &str,
        op: Operation,
        args: &[String],
        msg: &mut MessageBuilder,
    ) -> Result<()> {
        let Some(parser) = self.lookup(kind).and_then(|h| h.option_parser()) else {
            tracing::debug!(kind, "no option parser, ignoring options");
            return Ok(());
        };
        let checkpoint = msg.checkpoint();
        let result = parser.parse_options(op, args, msg);
        if result.is_err() {
            msg.rollback(checkpoint);
        }
        result
    }

    /// Decode `data` and render it with `kind`'s printer.
    ///
    /// `declared_max` is the table size the caller would use; it is clamped
    /// to the handler's own maximum. Without a handler nothing is printed.
    /// Malformed data is reported as unavailable rather than failing the
    /// surrounding output.
    pub fn print_options(
        &self,
        kind: &str,
        data: &[u8],
        declared_max: Option<u16>,
        sink: &mut dyn FieldSink,
    ) -> Result<()> {
        let Some(handler) = self.lookup(kind) else {
            return Ok(());
        };
        let Some(printer) = handler.option_printer() else {
            return Ok(());
        };
        let max = declared_max.map_or(handler.max_attr(), |m| m.min(handler.max_attr()));
        match AttrTable::parse(data, max) {
            Ok(attrs) => printer.print_options(&attrs, sink),
            Err(e) => {
                tracing::warn!(kind, error = %e, "attributes unavailable");
                Ok(())
            }
        }
    }

    /// Write `kind`'s usage text. Returns false when it has none.
    pub fn print_help(&self, kind: &str, out: &mut dyn io::Write) -> Result<bool> {
        match self.lookup(kind).and_then(|h| h.help()) {
            Some(help) => {
                help.print_help(out)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Extended statistics renderer for `kind`.
    pub fn xstats_printer(&self, kind: &str) -> Result<&dyn PrintXstats> {
        self.lookup(kind)
            .and_then(|h| h.xstats_printer())
            .ok_or_else(|| Error::NotSupported(format!("extended statistics for \"{kind}\"")))
    }

    pub fn print_xstats_help(&self, kind: &str, out: &mut dyn io::Write) -> Result<()> {
        let parser = self.lookup(kind).and_then(|h| h.xstats_parser()).ok_or_else(|| {
            Error::NotSupported(format!("extended statistics arguments for \"{kind}\""))
        })?;
        parser.print_xstats_help(out)?;
        Ok(())
    }

    /// Parse statistics arguments for `kind`.
    ///
    /// A kind without a parser takes no arguments and selects everything.
    pub fn parse_xstats(&self, kind: &str, args: &[String]) -> Result<XstatsFilter> {
        if let Some(parser) = self.lookup(kind).and_then(|h| h.xstats_parser()) {
            return parser.parse_xstats(args);
        }
        match args.first() {
            None => Ok(XstatsFilter::default()),
            Some(arg) => Err(Error::UnknownOption {
                kind: kind.to_string(),
                option: arg.clone(),
            }),
        }
    }

    pub fn print_xstats(
        &self,
        kind: &str,
        data: &[u8],
        filter: &XstatsFilter,
        sink: &mut dyn FieldSink,
    ) -> Result<()> {
        self.xstats_printer(kind)?.print_xstats(data, filter, sink)
    }
}

/// Value following `keyword`.
pub(crate) fn next_value<'a>(
    args: &mut std::slice::Iter<'a, String>,
    keyword: &str,
) -> Result<&'a str> {
    args.next()
        .map(String::as_str)
        .ok_or_else(|| Error::MissingArgument(keyword.to_string()))
}

#[cfg(test)]
pub(crate) fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
