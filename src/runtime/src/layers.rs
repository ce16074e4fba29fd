//! Layer and archive stream decompression.
//!
//! OCI layers may be stored plain or compressed. The compression is taken
//! from the caller or sniffed from the leading magic bytes; the decoded
//! stream is handed to the TAR decoder unchanged.

use layerscope_core::config::Compression;
use layerscope_core::error::{InspectError, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Longest magic we look for.
const SNIFF_LEN: usize = 6;

/// Open a layer or archive file and return its decoded byte stream.
///
/// # Errors
///
/// Returns error if:
/// - The file cannot be opened
/// - The stream uses a compression we cannot decode
pub fn open_layer(path: &Path, compression: Compression) -> Result<(Compression, Box<dyn Read>)> {
    let file = File::open(path).map_err(|e| InspectError::OpenError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (detected, reader) = decompress(BufReader::new(file), compression)?;

    tracing::debug!(
        path = %path.display(),
        compression = %detected,
        "Opened archive stream"
    );

    Ok((detected, reader))
}

/// Wrap `reader` in the decoder for `compression`.
///
/// With [`Compression::Auto`] the first bytes are peeked and replayed, so
/// the returned stream always starts at the beginning of the input.
pub fn decompress<R: Read + 'static>(
    mut reader: R,
    compression: Compression,
) -> Result<(Compression, Box<dyn Read>)> {
    let mut magic = [0u8; SNIFF_LEN];
    let filled = read_prefix(&mut reader, &mut magic)?;
    let stream = Cursor::new(magic[..filled].to_vec()).chain(reader);

    let compression = match compression {
        Compression::Auto => sniff(&magic[..filled])?,
        explicit => explicit,
    };

    let decoded: Box<dyn Read> = match compression {
        // layers may be written as several concatenated members
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(stream)),
        Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(stream)),
        Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(stream)),
        Compression::None | Compression::Auto => Box::new(stream),
    };

    Ok((compression, decoded))
}

/// Identify the compression from leading bytes.
pub fn sniff(magic: &[u8]) -> Result<Compression> {
    if magic.starts_with(GZIP_MAGIC) {
        Ok(Compression::Gzip)
    } else if magic.starts_with(BZIP2_MAGIC) {
        Ok(Compression::Bzip2)
    } else if magic.starts_with(XZ_MAGIC) {
        Ok(Compression::Xz)
    } else if magic.starts_with(ZSTD_MAGIC) {
        Err(InspectError::UnsupportedCompression("zstd".to_string()))
    } else {
        Ok(Compression::None)
    }
}

/// Fill as much of `buf` as the stream allows.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
