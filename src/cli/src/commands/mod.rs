//! CLI command definitions and dispatch.

mod inspect;
mod version;

use clap::{Parser, Subcommand, ValueEnum};

/// Layerscope: list every TAR entry of an OCI image or archive.
#[derive(Parser)]
#[command(name = "layerscope", version, about)]
pub struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// List the entries of a TAR archive or of every layer of an OCI image
    Inspect(inspect::InspectArgs),
    /// Show version information
    Version(version::VersionArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Inspect(args) => inspect::execute(args),
        Command::Version(args) => version::execute(args),
    }
}
