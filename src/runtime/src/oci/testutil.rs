//! On-disk OCI layouts for tests.

use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";
pub const LAYER_MEDIA_TYPE: &str = "application/vnd.oci.image.layer.v1.tar";

/// A 64-character hex string made of `c`, e.g. `hex('a')` for `sha256:aaaa…`.
pub fn hex(c: char) -> String {
    c.to_string().repeat(64)
}

/// Write `bytes` as `blobs/sha256/<hex>` and return the digest string.
pub fn write_blob(root: &Path, hex: &str, bytes: &[u8]) -> String {
    let dir = root.join("blobs/sha256");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(hex), bytes).unwrap();
    format!("sha256:{}", hex)
}

/// Write a manifest listing `layers` (hex, blob) and return its digest.
pub fn write_manifest(root: &Path, manifest_hex: &str, layers: &[(&str, Vec<u8>)]) -> String {
    let config = r#"{"architecture":"amd64","os":"linux","rootfs":{"type":"layers","diff_ids":[]}}"#;
    let config_digest = write_blob(root, &hex('f'), config.as_bytes());

    let layer_descriptors: Vec<String> = layers
        .iter()
        .map(|(hex, bytes)| {
            let digest = write_blob(root, hex, bytes);
            format!(
                r#"{{"mediaType":"{}","digest":"{}","size":{}}}"#,
                LAYER_MEDIA_TYPE,
                digest,
                bytes.len()
            )
        })
        .collect();

    let manifest = format!(
        r#"{{
            "schemaVersion": 2,
            "mediaType": "{}",
            "config": {{
                "mediaType": "application/vnd.oci.image.config.v1+json",
                "digest": "{}",
                "size": {}
            }},
            "layers": [{}]
        }}"#,
        MANIFEST_MEDIA_TYPE,
        config_digest,
        config.len(),
        layer_descriptors.join(",")
    );
    write_blob(root, manifest_hex, manifest.as_bytes())
}

/// Write `index.json` with one descriptor per `(digest, media type)`.
pub fn write_index(root: &Path, manifests: &[(&str, &str)]) -> PathBuf {
    let descriptors: Vec<String> = manifests
        .iter()
        .map(|(digest, media_type)| {
            format!(
                r#"{{"mediaType":"{}","digest":"{}","size":100}}"#,
                media_type, digest
            )
        })
        .collect();
    let index = format!(
        r#"{{"schemaVersion":2,"mediaType":"application/vnd.oci.image.index.v1+json","manifests":[{}]}}"#,
        descriptors.join(",")
    );
    fs::write(root.join("oci-layout"), r#"{"imageLayoutVersion":"1.0.0"}"#).unwrap();
    let path = root.join("index.json");
    fs::write(&path, index).unwrap();
    path
}

/// A complete single-manifest layout. Returns the `index.json` path.
pub fn write_layout(root: &Path, layers: &[(&str, Vec<u8>)]) -> PathBuf {
    let manifest = write_manifest(root, &hex('e'), layers);
    write_index(root, &[(&manifest, MANIFEST_MEDIA_TYPE)])
}
