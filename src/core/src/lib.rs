//! Layerscope Core - Shared Types
//!
//! Error taxonomy and configuration types used by the layerscope runtime
//! (OCI resolution, TAR decoding, reporting) and the command-line tool.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Compression, InputMode, InspectConfig, OutputFormat};
pub use error::{InspectError, Result};

/// Layerscope version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
