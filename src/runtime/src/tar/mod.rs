//! TAR header decoding.
//!
//! Decodes plain (v7/ustar), GNU and PAX archives into [`ArchiveEntry`]
//! values without touching payload bytes:
//!
//! ```text
//! ┌────────┬─────────┬────────┬─────────┬────────┬─────────┬──────┬──────┐
//! │ header │ payload │ pax x  │ records │ header │ payload │ zero │ zero │
//! │  512   │ n × 512 │  512   │ n × 512 │  512   │ n × 512 │ 512  │ 512  │
//! └────────┴─────────┴────────┴─────────┴────────┴─────────┴──────┴──────┘
//!                     └─ applies to this header only ─┘
//! ```
//!
//! - Numeric fields: octal ASCII or GNU base-256
//! - Extensions: PAX `x`/`g` records, GNU `L`/`K` long names
//! - Sparse files: GNU old-style maps and PAX `GNU.sparse.*` keys

mod decoder;
mod entry;
mod header;
mod pax;
mod sparse;

#[cfg(test)]
pub(crate) mod testutil;

pub use decoder::TarDecoder;
pub use entry::{ArchiveEntry, EntryType, Mtime, PaxHeaders, SparseMap, SparseRegion};
pub use header::{decode_numeric, ArchiveFormat, BLOCK_SIZE};
