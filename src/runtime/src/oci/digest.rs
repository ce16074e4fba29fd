//! Content digests and blob addressing.
//!
//! A digest `sha256:abc…` addresses the blob at `<root>/blobs/sha256/abc…`.
//! Digests are never verified against blob contents here.

use layerscope_core::error::{InspectError, Result};
use std::path::{Path, PathBuf};

/// An `algorithm:hex` content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: String,
    hex: String,
}

impl Digest {
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Path of this blob inside the layout rooted at `root_dir`. No I/O.
    pub fn blob_path(&self, root_dir: &Path) -> PathBuf {
        root_dir
            .join("blobs")
            .join(&self.algorithm)
            .join(&self.hex)
    }
}

impl std::str::FromStr for Digest {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || InspectError::InvalidDigestFormat {
            digest: s.to_string(),
        };

        let (algorithm, hex) = s.split_once(':').ok_or_else(invalid)?;
        // both halves become path components
        let bad_component =
            |c: &str| c.is_empty() || c == "." || c == ".." || c.contains(|ch: char| ch == '/' || ch == '\\');
        if bad_component(algorithm) || bad_component(hex) {
            return Err(invalid());
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Parse `digest` and return its blob path under `root_dir`.
pub fn blob_path(root_dir: &Path, digest: &str) -> Result<PathBuf> {
    Ok(digest.parse::<Digest>()?.blob_path(root_dir))
}
