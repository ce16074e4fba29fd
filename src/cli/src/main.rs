//! Layerscope CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use layerscope_cli::commands::{dispatch, Cli, LogFormat};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; the report owns stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
