//! ip link command implementation.

use std::collections::HashMap;
use std::io::{self, Write};
use std::ops::ControlFlow;

use clap::{Args, Subcommand};
use nlkit::kind::{KindRegistry, PrintXstats};
use nlkit::netlink::link::{self, LinkMessage, LinkRequest, LinkStats};
use nlkit::netlink::{Connection, Protocol};
use nlkit::output::{self, Field, FieldSink, FieldValue, OutputFormat, OutputOptions};
use nlkit::{Error, Result};

use super::XSTATS_TOPIC;

pub const USAGE: &str = "\
Usage: ip link show [ [dev] DEVICE ]
       ip link set [dev] DEVICE [ up | down ] [ mtu MTU ]
                   [ { xdp | xdpgeneric | xdpdrv | xdpoffload } { off | none | fd FD } ]
                   [ type KIND [ OPTIONS ] ]
       ip link xstats type KIND [ ARGS ]
       ip link help [ KIND ]

KIND := { bridge_slave }
";

#[derive(Args)]
pub struct LinkCmd {
    #[command(subcommand)]
    action: Option<LinkAction>,
}

#[derive(Subcommand)]
#[command(disable_help_subcommand = true)]
enum LinkAction {
    /// Show link information.
    #[command(visible_alias = "list", visible_alias = "ls")]
    Show {
        /// [dev] DEVICE
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Set link attributes.
    Set {
        /// [dev] DEVICE followed by link options.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show extended statistics.
    Xstats {
        /// type KIND [ ARGS ]
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show usage, optionally for one link kind.
    Help {
        /// Link kind.
        kind: Option<String>,
    },
}

impl LinkCmd {
    pub async fn run(
        self,
        registry: &KindRegistry,
        format: OutputFormat,
        opts: &OutputOptions,
        force: bool,
    ) -> Result<()> {
        match self.action.unwrap_or(LinkAction::Show { args: Vec::new() }) {
            LinkAction::Show { args } => Self::show(registry, &args, format, opts).await,
            LinkAction::Set { args } => Self::set(registry, &args, force).await,
            LinkAction::Xstats { args } => Self::xstats(registry, &args, format, opts).await,
            LinkAction::Help { kind } => Self::help(registry, kind.as_deref()),
        }
    }

    async fn show(
        registry: &KindRegistry,
        args: &[String],
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> Result<()> {
        let dev = parse_dev(args)?;

        let mut conn = Connection::new(Protocol::Route)?;
        let links = dump_links(&mut conn).await?;
        let names = index_names(&links);

        let selected: Vec<_> = links
            .iter()
            .filter(|l| dev.is_none_or(|d| l.name.as_deref() == Some(d)))
            .collect();
        if let Some(name) = dev
            && selected.is_empty()
        {
            return Err(Error::InterfaceNotFound { name: name.into() });
        }

        let mut sink = output::sink(io::stdout().lock(), format, opts);
        for link in selected {
            link::print_link(link, registry, opts, &names, sink.as_mut())?;
        }
        sink.finish()
    }

    async fn set(registry: &KindRegistry, args: &[String], force: bool) -> Result<()> {
        // Parse everything before touching the socket.
        let request = LinkRequest::parse(args, force)?;
        let msg = request.build(registry)?;

        let mut conn = Connection::new(Protocol::Route)?;
        conn.talk(msg)
            .await
            .map_err(|e| e.with_context(format!("set link {}", request.name)))?;
        Ok(())
    }

    async fn xstats(
        registry: &KindRegistry,
        args: &[String],
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> Result<()> {
        let (kind, rest) = match args {
            [keyword, kind, rest @ ..] if keyword == "type" => (kind.as_str(), rest),
            _ => return Err(Error::Usage("xstats: expected \"type KIND\"".into())),
        };
        let printer = registry.xstats_printer(kind)?;
        let filter = registry.parse_xstats(kind, rest).map_err(|e| match e {
            Error::HelpRequested(_) => Error::HelpRequested(format!("{XSTATS_TOPIC}{kind}")),
            other => other,
        })?;

        let mut conn = Connection::new(Protocol::Route)?;
        let links = dump_links(&mut conn).await?;
        let names = index_names(&links);
        let ifindex = match filter.dev.as_deref() {
            Some(dev) => Some(
                links
                    .iter()
                    .find(|l| l.name.as_deref() == Some(dev))
                    .map(LinkMessage::ifindex)
                    .ok_or_else(|| Error::InterfaceNotFound { name: dev.into() })?,
            ),
            None => None,
        };

        let attr = printer.stats_attr();
        let mut stats = Vec::new();
        conn.dump(link::stats_request(attr)?, |_, payload| {
            if let Some(entry) = LinkStats::parse(payload, attr)?
                && ifindex.is_none_or(|i| i == entry.ifindex)
            {
                stats.push(entry);
            }
            Ok(ControlFlow::Continue(()))
        })
        .await?;

        let mut sink = output::sink(io::stdout().lock(), format, opts);
        for entry in &stats {
            let name = names
                .get(&entry.ifindex)
                .cloned()
                .unwrap_or_else(|| entry.ifindex.to_string());
            sink.open_object(None)?;
            sink.field(Field::json("ifname", FieldValue::Str(name.clone())))?;
            sink.field(Field::bare(FieldValue::Str(format!("{name:<16}"))))?;
            printer.print_xstats(&entry.data, &filter, sink.as_mut())?;
            sink.close_object()?;
        }
        sink.finish()
    }

    fn help(registry: &KindRegistry, kind: Option<&str>) -> Result<()> {
        let mut stdout = io::stdout().lock();
        match kind {
            Some(kind) => super::print_usage(registry, kind, &mut stdout)?,
            None => stdout.write_all(USAGE.as_bytes())?,
        }
        Ok(())
    }
}

/// `[dev] NAME` or nothing.
fn parse_dev(args: &[String]) -> Result<Option<&str>> {
    match args {
        [] => Ok(None),
        [keyword] if keyword == "dev" => Err(Error::MissingArgument("dev".into())),
        [name] => Ok(Some(name.as_str())),
        [keyword, name] if keyword == "dev" => Ok(Some(name.as_str())),
        [keyword, _, extra, ..] if keyword == "dev" => Err(Error::UnknownOption {
            kind: "link".into(),
            option: extra.clone(),
        }),
        [_, extra, ..] => Err(Error::UnknownOption {
            kind: "link".into(),
            option: extra.clone(),
        }),
    }
}

async fn dump_links(conn: &mut Connection) -> Result<Vec<LinkMessage>> {
    let mut links = Vec::new();
    conn.dump(link::get_request(None)?, |_, payload| {
        links.push(LinkMessage::parse(payload)?);
        Ok(ControlFlow::Continue(()))
    })
    .await?;
    Ok(links)
}

fn index_names(links: &[LinkMessage]) -> HashMap<u32, String> {
    links
        .iter()
        .filter_map(|l| Some((l.ifindex(), l.name.clone()?)))
        .collect()
}
