//! `layerscope version` command.

use clap::Args;

#[derive(Args)]
pub struct VersionArgs;

pub fn execute(_args: VersionArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "layerscope version {} (runtime {})",
        layerscope_core::VERSION,
        layerscope_runtime::VERSION
    );
    Ok(())
}
