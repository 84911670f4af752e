mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "changelet", version, about = "Changelet CLI")]
struct Cli {
    /// Configuration file naming the catalogue, mapping, and schema documents.
    #[arg(
        long,
        short = 'c',
        global = true,
        default_value = "changelet.yaml",
        env = "CHANGELET_CONFIG"
    )]
    config: PathBuf,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "changelet_policy=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output encoding for result documents.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw agent proposal (JSON/YAML) into a ChangeSet.
    Normalize {
        /// Path to the raw proposal
        raw: PathBuf,

        /// Write the ChangeSet here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a ChangeSet document. Exits with status 1 when rejected.
    Validate {
        /// Path to changeset.json or changeset.yaml
        changeset: PathBuf,
    },

    /// Convert a ChangeSet into deployment values (no validation).
    Convert {
        /// Path to changeset.json or changeset.yaml
        changeset: PathBuf,
    },

    /// Normalize, validate, and convert a raw proposal. Exits with status 1 when rejected.
    Run {
        /// Path to the raw proposal
        raw: PathBuf,
    },

    /// Load the configured artifacts and cross-check them for consistency.
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Normalize { raw, output } => {
            commands::normalize::run(&cli.config, &raw, output.as_deref(), cli.format)?
        }
        Command::Validate { changeset } => {
            commands::validate::run(&cli.config, &changeset, cli.format)?
        }
        Command::Convert { changeset } => {
            commands::convert::run(&cli.config, &changeset, cli.format)?
        }
        Command::Run { raw } => commands::run::run(&cli.config, &raw, cli.format)?,
        Command::Check => commands::check::run(&cli.config)?,
    }

    Ok(())
}
