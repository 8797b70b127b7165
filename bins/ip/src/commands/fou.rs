//! ip fou command implementation.
//!
//! Requests are parsed before the family is resolved, so an invalid option
//! list never opens a socket. The family id is patched into the header once
//! known.

use std::io;
use std::ops::ControlFlow;

use clap::{Args, Subcommand};
use nlkit::kind::{KindRegistry, Operation};
use nlkit::netlink::builder::{DUMP_CAPACITY, REQUEST_CAPACITY};
use nlkit::netlink::genl::fou::*;
use nlkit::netlink::genl::{self, FamilyResolver, GenlMsgHdr};
use nlkit::netlink::message::{NLM_F_ACK, NLM_F_REQUEST};
use nlkit::output::{self, FieldSink, OutputFormat, OutputOptions};
use nlkit::{Error, Result};

#[derive(Args)]
pub struct FouCmd {
    #[command(subcommand)]
    action: FouAction,
}

#[derive(Subcommand)]
#[command(disable_help_subcommand = true)]
enum FouAction {
    /// Add a receive port.
    Add {
        /// port PORT { ipproto PROTO | gue } [ -6 ]
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Delete a receive port.
    #[command(visible_alias = "del")]
    Delete {
        /// port PORT [ -6 ]
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List receive ports.
    #[command(visible_alias = "list")]
    Show {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        args: Vec<String>,
    },

    /// Show usage.
    Help,
}

impl FouCmd {
    pub async fn run(
        self,
        registry: &KindRegistry,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> Result<()> {
        match self.action {
            FouAction::Add { args } => Self::modify(registry, Operation::Add, &args).await,
            FouAction::Delete { args } => Self::modify(registry, Operation::Delete, &args).await,
            FouAction::Show { args } => Self::show(registry, &args, format, opts).await,
            FouAction::Help => Err(Error::HelpRequested("fou".into())),
        }
    }

    async fn modify(registry: &KindRegistry, op: Operation, args: &[String]) -> Result<()> {
        let cmd = match op {
            Operation::Delete => FOU_CMD_DEL,
            _ => FOU_CMD_ADD,
        };
        let mut msg = genl::request(
            REQUEST_CAPACITY,
            0,
            cmd,
            FOU_GENL_VERSION,
            NLM_F_REQUEST | NLM_F_ACK,
        )?;
        registry.parse_options("fou", op, args, &mut msg)?;

        let mut resolver = FamilyResolver::new()?;
        let family = resolver.resolve(FOU_GENL_NAME).await?;
        msg.set_type(family);
        resolver.connection().talk(msg).await?;
        Ok(())
    }

    async fn show(
        registry: &KindRegistry,
        args: &[String],
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> Result<()> {
        if let Some(extra) = args.first() {
            return Err(Error::UnknownOption {
                kind: "fou".into(),
                option: extra.clone(),
            });
        }

        let mut resolver = FamilyResolver::new()?;
        let family = resolver.resolve(FOU_GENL_NAME).await?;
        let msg = genl::request(DUMP_CAPACITY, family, FOU_CMD_GET, FOU_GENL_VERSION, 0)?;

        let mut sink = output::sink(io::stdout().lock(), format, opts);
        let result = resolver
            .connection()
            .dump(msg, |header, payload| {
                if header.nlmsg_type != family {
                    return Ok(ControlFlow::Continue(()));
                }
                let (_, attrs) = GenlMsgHdr::split(payload)?;
                sink.open_object(None)?;
                registry.print_options("fou", attrs, Some(FOU_ATTR_MAX), sink.as_mut())?;
                sink.close_object()?;
                Ok(ControlFlow::Continue(()))
            })
            .await;

        if let Err(e) = result {
            tracing::debug!(error = %e, "fou dump failed");
            return Err(Error::DumpTerminated(e.to_string()));
        }
        sink.finish()
    }
}
