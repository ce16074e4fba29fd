//! OCI image layout support.
//!
//! Resolves an image layout on disk to the ordered list of layer blobs
//! that make up its filesystem:
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OCI Image Layout                          │
//! │                                                              │
//! │  image/                                                      │
//! │  ├── oci-layout           (OCI layout marker)               │
//! │  ├── index.json           (Image index, one manifest)       │
//! │  └── blobs/                                                 │
//! │      └── sha256/                                            │
//! │          ├── <manifest>   (Image manifest)                  │
//! │          ├── <config>     (Image configuration, unused)     │
//! │          └── <layers>     (TAR layers, maybe compressed)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod digest;
mod image;

#[cfg(test)]
pub(crate) mod testutil;

pub use digest::{blob_path, Digest};
pub use image::{LayerBlob, OciImage};
