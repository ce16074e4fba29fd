//! Layerscope Runtime - OCI layout walking and TAR header inspection.
//!
//! Resolves OCI image layouts to their layer blobs, decodes TAR headers
//! (v7, ustar, GNU and PAX) from plain or compressed streams, and reports
//! every entry in archive order.

#![allow(clippy::result_large_err)]

pub mod layers;
pub mod oci;
pub mod report;
pub mod tar;

// Re-export common types
pub use layers::open_layer;
pub use oci::{Digest, LayerBlob, OciImage};
pub use report::{format_entry, inspect, InspectSummary, Reporter};
pub use crate::tar::{ArchiveEntry, ArchiveFormat, EntryType, TarDecoder};

/// Layerscope Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
