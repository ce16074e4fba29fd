//! Raw 512-byte TAR header blocks.
//!
//! Field offsets follow the POSIX ustar layout. GNU headers reuse the
//! ustar prefix area for times and the old sparse map; see [`Header::format`].

use layerscope_core::error::{InspectError, Result};
use serde::Serialize;
use std::ops::Range;

/// Size of every header and payload block.
pub const BLOCK_SIZE: usize = 512;

const NAME: Range<usize> = 0..100;
const MODE: Range<usize> = 100..108;
const UID: Range<usize> = 108..116;
const GID: Range<usize> = 116..124;
const SIZE: Range<usize> = 124..136;
const MTIME: Range<usize> = 136..148;
const CHKSUM: Range<usize> = 148..156;
const TYPEFLAG: usize = 156;
const LINKNAME: Range<usize> = 157..257;
const MAGIC: Range<usize> = 257..263;
const VERSION: Range<usize> = 263..265;
const UNAME: Range<usize> = 265..297;
const GNAME: Range<usize> = 297..329;
const DEVMAJOR: Range<usize> = 329..337;
const DEVMINOR: Range<usize> = 337..345;
const PREFIX: Range<usize> = 345..500;

// GNU-only fields inside the prefix area.
pub(crate) const GNU_SPARSE: Range<usize> = 386..482;
pub(crate) const GNU_IS_EXTENDED: usize = 482;
pub(crate) const GNU_REAL_SIZE: Range<usize> = 483..495;

const POSIX_MAGIC: &[u8] = b"ustar\0";
const GNU_MAGIC: &[u8] = b"ustar ";
const GNU_VERSION: &[u8] = b" \0";

/// Header dialect, detected from the magic and version fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Pre-POSIX header without magic
    V7,
    /// POSIX.1-1988 ustar
    Ustar,
    /// GNU tar (`ustar  \0`)
    Gnu,
    /// POSIX.1-2001 pax (ustar headers plus extended records)
    Pax,
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V7 => write!(f, "v7"),
            Self::Ustar => write!(f, "ustar"),
            Self::Gnu => write!(f, "gnu"),
            Self::Pax => write!(f, "pax"),
        }
    }
}

/// One header block together with its byte offset in the archive stream.
pub struct Header {
    block: [u8; BLOCK_SIZE],
    offset: u64,
}

impl Header {
    pub fn new(block: [u8; BLOCK_SIZE], offset: u64) -> Self {
        Self { block, offset }
    }

    /// Byte offset of this block in the (decompressed) stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.block
    }

    pub fn type_flag(&self) -> u8 {
        self.block[TYPEFLAG]
    }

    /// Header dialect. Extended-header detection (`Pax`) is left to the decoder.
    pub fn format(&self) -> ArchiveFormat {
        let magic = &self.block[MAGIC];
        if magic == GNU_MAGIC && &self.block[VERSION] == GNU_VERSION {
            ArchiveFormat::Gnu
        } else if magic == POSIX_MAGIC {
            ArchiveFormat::Ustar
        } else {
            ArchiveFormat::V7
        }
    }

    /// Verify the stored checksum.
    ///
    /// The checksum field is summed as eight spaces. Both the unsigned sum and
    /// the signed sum written by some historic implementations are accepted.
    pub fn verify_checksum(&self) -> Result<()> {
        let stored = self.numeric(CHKSUM, "chksum")?;

        let mut unsigned: i64 = 0;
        let mut signed: i64 = 0;
        for (i, &b) in self.block.iter().enumerate() {
            let b = if CHKSUM.contains(&i) { b' ' } else { b };
            unsigned += i64::from(b);
            signed += i64::from(b as i8);
        }

        if stored == unsigned || stored == signed {
            Ok(())
        } else {
            Err(self.corrupt(format!(
                "checksum mismatch: stored {:o}, computed {:o}",
                stored, unsigned
            )))
        }
    }

    /// Entry name. For POSIX ustar headers a non-empty prefix is joined in front.
    pub fn path(&self) -> String {
        let name = nul_terminated(&self.block[NAME]);
        if self.format() == ArchiveFormat::Ustar {
            let prefix = nul_terminated(&self.block[PREFIX]);
            if !prefix.is_empty() {
                return format!("{}/{}", prefix, name);
            }
        }
        name
    }

    pub fn link_name(&self) -> String {
        nul_terminated(&self.block[LINKNAME])
    }

    pub fn uname(&self) -> String {
        nul_terminated(&self.block[UNAME])
    }

    pub fn gname(&self) -> String {
        nul_terminated(&self.block[GNAME])
    }

    pub fn mode(&self) -> Result<u32> {
        let value = self.numeric(MODE, "mode")?;
        u32::try_from(value).map_err(|_| self.corrupt(format!("mode out of range: {}", value)))
    }

    pub fn uid(&self) -> Result<u64> {
        self.unsigned(UID, "uid")
    }

    pub fn gid(&self) -> Result<u64> {
        self.unsigned(GID, "gid")
    }

    /// Declared payload size in bytes.
    pub fn size(&self) -> Result<u64> {
        self.unsigned(SIZE, "size")
    }

    /// Modification time in seconds since the epoch (may be negative).
    pub fn mtime(&self) -> Result<i64> {
        self.numeric(MTIME, "mtime")
    }

    pub fn dev_major(&self) -> Result<u32> {
        let value = self.unsigned(DEVMAJOR, "devmajor")?;
        u32::try_from(value)
            .map_err(|_| self.corrupt(format!("devmajor out of range: {}", value)))
    }

    pub fn dev_minor(&self) -> Result<u32> {
        let value = self.unsigned(DEVMINOR, "devminor")?;
        u32::try_from(value)
            .map_err(|_| self.corrupt(format!("devminor out of range: {}", value)))
    }

    /// Decode a numeric field at an arbitrary range of this block.
    pub(crate) fn numeric(&self, range: Range<usize>, field: &str) -> Result<i64> {
        decode_numeric(&self.block[range])
            .map_err(|reason| self.corrupt(format!("invalid {} field: {}", field, reason)))
    }

    pub(crate) fn unsigned(&self, range: Range<usize>, field: &str) -> Result<u64> {
        let value = self.numeric(range, field)?;
        u64::try_from(value).map_err(|_| self.corrupt(format!("negative {}: {}", field, value)))
    }

    pub(crate) fn corrupt(&self, reason: String) -> InspectError {
        InspectError::CorruptHeader {
            offset: self.offset,
            reason,
        }
    }
}

/// True if every byte of the block is zero (end-of-archive marker).
pub fn is_zero_block(block: &[u8]) -> bool {
    block.iter().all(|&b| b == 0)
}

/// Decode a numeric header field.
///
/// Fields are octal ASCII, terminated by NUL or space, unless the first byte
/// is `0x80` (positive) or `0xff` (negative), in which case the remaining
/// bytes are a big-endian base-256 integer.
pub fn decode_numeric(field: &[u8]) -> std::result::Result<i64, String> {
    match field.first() {
        Some(&0x80) | Some(&0xff) => decode_base256(field),
        _ => decode_octal(field),
    }
}

fn decode_base256(field: &[u8]) -> std::result::Result<i64, String> {
    let digits = &field[1..];
    // 11 value bytes at most in a 12-byte field: 88 bits fits in i128.
    let mut value: i128 = 0;
    for &b in digits {
        value = (value << 8) | i128::from(b);
    }
    if field[0] == 0xff {
        value -= 1i128 << (8 * digits.len());
    }
    i64::try_from(value).map_err(|_| format!("base-256 value {} does not fit in 64 bits", value))
}

fn decode_octal(field: &[u8]) -> std::result::Result<i64, String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let text = std::str::from_utf8(&field[..end])
        .map_err(|_| format!("non-ASCII bytes {:?}", &field[..end]))?;
    let text = text.trim_matches(|c: char| c == ' ');
    if text.is_empty() {
        return Ok(0);
    }
    i64::from_str_radix(text, 8).map_err(|_| format!("not an octal number: {:?}", text))
}

fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
