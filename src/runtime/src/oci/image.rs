//! OCI image layout resolution.
//!
//! Walks `index.json` → manifest → layer blobs. Only layouts whose index
//! references exactly one image manifest are supported; there is no
//! platform selection.

use layerscope_core::error::{InspectError, Result};
use oci_spec::image::{ImageIndex, ImageManifest, MediaType};
use std::path::{Path, PathBuf};

use super::digest::Digest;

/// A layer blob resolved to its on-disk location.
#[derive(Debug, Clone)]
pub struct LayerBlob {
    /// Position in the manifest (application order, bottom first)
    pub index: usize,
    pub digest: Digest,
    pub media_type: String,
    /// Declared blob size from the manifest
    pub size: u64,
    pub path: PathBuf,
}

/// An OCI image layout loaded from disk.
#[derive(Debug)]
pub struct OciImage {
    /// Root directory of the OCI image layout
    root_dir: PathBuf,

    /// Digest of the sole manifest
    manifest_digest: Digest,

    /// Image manifest
    manifest: ImageManifest,

    /// Layer blobs (in order, bottom to top)
    layers: Vec<LayerBlob>,
}

impl OciImage {
    /// Load an OCI image from an `index.json` path or the layout directory.
    ///
    /// Blobs are looked up under the directory holding `index.json`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The index cannot be read or parsed
    /// - The index does not reference exactly one image manifest
    /// - The manifest cannot be read or parsed
    /// - Any digest is not of the form `algorithm:hex`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let (root_dir, index_path) = Self::locate(path.as_ref());

        Self::check_layout_marker(&root_dir);

        let index = Self::load_index(&index_path)?;
        let (manifest_digest, manifest) = Self::resolve_manifest(&root_dir, &index)?;
        let layers = Self::layer_blob_paths(&root_dir, &manifest_digest, &manifest)?;

        tracing::info!(
            manifest = %manifest_digest,
            layers = layers.len(),
            root = %root_dir.display(),
            "Resolved OCI image manifest"
        );

        Ok(Self {
            root_dir,
            manifest_digest,
            manifest,
            layers,
        })
    }

    /// Get the root directory of the OCI image.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn manifest_digest(&self) -> &Digest {
        &self.manifest_digest
    }

    pub fn manifest(&self) -> &ImageManifest {
        &self.manifest
    }

    /// All layer blobs in manifest order.
    pub fn layers(&self) -> &[LayerBlob] {
        &self.layers
    }

    /// A single layer by manifest position.
    pub fn layer(&self, index: usize) -> Result<&LayerBlob> {
        self.layers
            .get(index)
            .ok_or(InspectError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
            })
    }

    /// Split an input path into (layout root, index path).
    fn locate(path: &Path) -> (PathBuf, PathBuf) {
        if path.is_dir() {
            return (path.to_path_buf(), path.join("index.json"));
        }
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (root, path.to_path_buf())
    }

    /// The `oci-layout` marker is informational only.
    fn check_layout_marker(root_dir: &Path) {
        if !root_dir.join("oci-layout").exists() {
            tracing::debug!(
                root = %root_dir.display(),
                "No oci-layout file next to the index"
            );
        }
    }

    /// Load the image index.
    pub fn load_index(index_path: &Path) -> Result<ImageIndex> {
        let content = std::fs::read_to_string(index_path).map_err(|e| InspectError::OpenError {
            path: index_path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| InspectError::MalformedIndex {
            path: index_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Select the sole image manifest and load it from the blob store.
    pub fn resolve_manifest(root_dir: &Path, index: &ImageIndex) -> Result<(Digest, ImageManifest)> {
        let descriptor = match index.manifests().as_slice() {
            [only] => only,
            others => {
                return Err(InspectError::UnsupportedManifestCount {
                    count: others.len(),
                })
            }
        };

        if descriptor.media_type() != &MediaType::ImageManifest {
            return Err(InspectError::UnsupportedMediaType {
                media_type: descriptor.media_type().to_string(),
                expected: MediaType::ImageManifest.to_string(),
            });
        }

        let digest: Digest = descriptor.digest().to_string().parse()?;
        let manifest = Self::load_manifest(root_dir, &digest)?;
        Ok((digest, manifest))
    }

    /// Load the image manifest from blobs.
    fn load_manifest(root_dir: &Path, digest: &Digest) -> Result<ImageManifest> {
        let blob_path = digest.blob_path(root_dir);
        let content = std::fs::read_to_string(&blob_path).map_err(|e| InspectError::OpenError {
            path: blob_path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| InspectError::MalformedManifest {
            digest: digest.to_string(),
            reason: e.to_string(),
        })
    }

    /// Map every layer descriptor to its blob path, preserving manifest order.
    pub fn layer_blob_paths(
        root_dir: &Path,
        manifest_digest: &Digest,
        manifest: &ImageManifest,
    ) -> Result<Vec<LayerBlob>> {
        manifest
            .layers()
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                let digest: Digest = layer.digest().to_string().parse()?;
                let size = u64::try_from(layer.size()).map_err(|_| InspectError::MalformedManifest {
                    digest: manifest_digest.to_string(),
                    reason: format!("layer {} has negative size {}", index, layer.size()),
                })?;
                Ok(LayerBlob {
                    index,
                    path: digest.blob_path(root_dir),
                    digest,
                    media_type: layer.media_type().to_string(),
                    size,
                })
            })
            .collect()
    }
}
