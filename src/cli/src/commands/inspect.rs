//! `layerscope inspect` command: one line per archive entry.

use std::io::BufWriter;
use std::path::PathBuf;

use clap::Args;
use layerscope_core::config::{Compression, InputMode, InspectConfig, OutputFormat};
use layerscope_core::error::InspectError;

#[derive(Args)]
pub struct InspectArgs {
    /// Raw TAR archive, OCI `index.json`, or OCI layout directory
    pub file: PathBuf,

    /// Treat the input as an OCI image layout
    #[arg(long, conflicts_with = "tar")]
    pub oci: bool,

    /// Treat the input as a raw TAR archive
    #[arg(long)]
    pub tar: bool,

    /// Only report this layer (OCI input, 0-based)
    #[arg(long)]
    pub layer: Option<usize>,

    /// Stream compression: auto, none, gzip, bzip2, xz
    #[arg(long, default_value_t = Compression::Auto)]
    pub compression: Compression,

    /// Report format: text or json
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl InspectArgs {
    fn into_config(self) -> Result<InspectConfig, InspectError> {
        let mode = if self.oci {
            InputMode::Oci
        } else if self.tar {
            InputMode::Tar
        } else {
            InputMode::Auto
        };

        let config = InspectConfig {
            input: self.file,
            mode,
            layer: self.layer,
            compression: self.compression,
            output: self.output,
        };

        if config.layer.is_some() && config.resolve_mode() == InputMode::Tar {
            return Err(InspectError::ConfigError(
                "--layer requires an OCI image input".to_string(),
            ));
        }
        Ok(config)
    }
}

pub fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.into_config()?;
    tracing::debug!(
        input = %config.input.display(),
        mode = %config.resolve_mode(),
        "Inspecting"
    );

    let stdout = std::io::stdout();
    let summary = layerscope_runtime::inspect(&config, BufWriter::new(stdout.lock()))?;

    tracing::info!(
        layers = summary.layers,
        entries = summary.entries,
        "Inspection complete"
    );
    Ok(())
}
