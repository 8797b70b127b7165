//! ip command - link and foo-over-UDP configuration.

mod commands;

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use nlkit::Error;
use nlkit::kind::KindRegistry;
use nlkit::output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(name = "ip", version, about = "Network configuration tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long)]
    pretty: bool,

    /// Show statistics.
    #[arg(short = 's', long)]
    stats: bool,

    /// Show details.
    #[arg(short = 'd', long)]
    details: bool,

    /// Replace programs that are already attached.
    #[arg(short = 'f', long)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage network interfaces.
    #[command(visible_alias = "l")]
    Link(commands::link::LinkCmd),

    /// Manage foo-over-UDP receive ports.
    Fou(commands::fou::FouCmd),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        stats: cli.stats,
        details: cli.details,
        pretty: cli.pretty,
    };

    let registry = KindRegistry::builtin();

    let result = match cli.command {
        Command::Link(cmd) => cmd.run(&registry, format, &opts, cli.force).await,
        Command::Fou(cmd) => cmd.run(&registry, format, &opts).await,
    };

    if let Err(e) = result {
        report(&registry, &e)?;
        std::process::exit(e.exit_code());
    }

    Ok(())
}

/// Print `e` to stderr, followed by the usage text it asks for.
fn report(registry: &KindRegistry, e: &Error) -> anyhow::Result<()> {
    let mut stderr = io::stderr().lock();
    match e {
        Error::HelpRequested(topic) => commands::print_usage(registry, topic, &mut stderr)?,
        Error::UnknownOption { kind, .. } => {
            writeln!(stderr, "{e}")?;
            commands::print_usage(registry, kind, &mut stderr)?;
        }
        _ => writeln!(stderr, "Error: {e}")?,
    }
    Ok(())
}
