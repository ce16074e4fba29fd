//! Inspection configuration.
//!
//! Built by the command-line front end from its arguments; the runtime only
//! reads it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the input path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputMode {
    /// Decide from the path: directories and `*.json` are OCI layouts.
    Auto,
    /// A raw (optionally compressed) TAR archive.
    Tar,
    /// An OCI image index (`index.json`) or the layout directory holding it.
    Oci,
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Tar => write!(f, "tar"),
            Self::Oci => write!(f, "oci"),
        }
    }
}

impl std::str::FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "tar" => Ok(Self::Tar),
            "oci" => Ok(Self::Oci),
            _ => Err(format!(
                "unknown input mode: '{}' (supported: auto, tar, oci)",
                s
            )),
        }
    }
}

/// Compression applied to a layer or archive stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compression {
    /// Sniff the leading magic bytes.
    Auto,
    /// Plain TAR.
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl Default for Compression {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::None => write!(f, "none"),
            Self::Gzip => write!(f, "gzip"),
            Self::Bzip2 => write!(f, "bzip2"),
            Self::Xz => write!(f, "xz"),
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "gzip" | "gz" => Ok(Self::Gzip),
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            "xz" => Ok(Self::Xz),
            _ => Err(format!(
                "unknown compression: '{}' (supported: auto, none, gzip, bzip2, xz)",
                s
            )),
        }
    }
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One human-readable line per entry.
    Text,
    /// One JSON object per line.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: '{}' (supported: text, json)", s)),
        }
    }
}

/// Configuration for a single inspection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectConfig {
    /// Raw archive, `index.json`, or OCI layout directory
    pub input: PathBuf,

    /// How to interpret `input`
    #[serde(default)]
    pub mode: InputMode,

    /// Report only this layer (OCI mode)
    #[serde(default)]
    pub layer: Option<usize>,

    /// Stream compression
    #[serde(default)]
    pub compression: Compression,

    /// Report format
    #[serde(default)]
    pub output: OutputFormat,
}

impl InspectConfig {
    /// Create a configuration with defaults for everything but the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Resolve `Auto` into a concrete mode.
    ///
    /// Never returns `InputMode::Auto`.
    pub fn resolve_mode(&self) -> InputMode {
        match self.mode {
            InputMode::Auto => Self::detect_mode(&self.input),
            mode => mode,
        }
    }

    fn detect_mode(path: &Path) -> InputMode {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json || path.is_dir() {
            InputMode::Oci
        } else {
            InputMode::Tar
        }
    }
}
