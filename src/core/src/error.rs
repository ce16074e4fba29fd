use std::path::PathBuf;

use thiserror::Error;

/// Layerscope error types
#[derive(Error, Debug)]
pub enum InspectError {
    /// A digest string lacks the `algorithm:hex` form
    #[error("Invalid digest format: '{digest}' (expected algorithm:hex)")]
    InvalidDigestFormat { digest: String },

    /// The image index is missing required fields or has the wrong shape
    #[error("Malformed image index {}: {reason}", path.display())]
    MalformedIndex { path: PathBuf, reason: String },

    /// The manifest blob is missing required fields or has the wrong shape
    #[error("Malformed manifest {digest}: {reason}")]
    MalformedManifest { digest: String, reason: String },

    /// The index does not reference exactly one manifest
    #[error("Unsupported manifest count: expected exactly 1 manifest in index, found {count}")]
    UnsupportedManifestCount { count: usize },

    /// The sole manifest descriptor is not an OCI image manifest
    #[error("Unsupported manifest media type: {media_type} (expected {expected})")]
    UnsupportedMediaType {
        media_type: String,
        expected: String,
    },

    /// A TAR header failed validation
    #[error("Corrupt header at offset {offset}: {reason}")]
    CorruptHeader { offset: u64, reason: String },

    /// The archive stream ended inside a header or payload
    #[error("Unexpected end of archive at offset {offset}: {context}")]
    UnexpectedEndOfArchive { offset: u64, context: String },

    /// `--layer` selected a layer the manifest does not have
    #[error("Layer index {index} out of range (manifest has {count} layers)")]
    LayerIndexOutOfRange { index: usize, count: usize },

    /// The layer stream uses a compression scheme that cannot be decoded
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A file could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    OpenError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for InspectError {
    fn from(err: serde_json::Error) -> Self {
        InspectError::SerializationError(err.to_string())
    }
}

/// Result type alias for layerscope operations
pub type Result<T> = std::result::Result<T, InspectError>;
