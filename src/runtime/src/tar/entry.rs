//! Decoded archive entries.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Entry type, decoded from the header's type flag.
///
/// Unknown flags are kept as `Other` with the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Regular,
    HardLink,
    Symlink,
    CharDevice,
    BlockDevice,
    Directory,
    Fifo,
    Contiguous,
    GnuSparse,
    /// PAX extended header: `x` (next entry) or `g` (global)
    PaxHeader { global: bool },
    /// GNU `L` record carrying the next entry's name
    GnuLongName,
    /// GNU `K` record carrying the next entry's link target
    GnuLongLink,
    Other(u8),
}

impl EntryType {
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            b'0' | b'\0' => Self::Regular,
            b'1' => Self::HardLink,
            b'2' => Self::Symlink,
            b'3' => Self::CharDevice,
            b'4' => Self::BlockDevice,
            b'5' => Self::Directory,
            b'6' => Self::Fifo,
            b'7' => Self::Contiguous,
            b'S' => Self::GnuSparse,
            b'x' => Self::PaxHeader { global: false },
            b'g' => Self::PaxHeader { global: true },
            b'L' => Self::GnuLongName,
            b'K' => Self::GnuLongLink,
            other => Self::Other(other),
        }
    }

    /// Records that modify the following entry instead of being entries.
    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            Self::PaxHeader { .. } | Self::GnuLongName | Self::GnuLongLink
        )
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::HardLink | Self::Symlink)
    }

    /// Whether payload blocks follow the header. Links, directories, devices
    /// and fifos carry none even when their size field is non-zero.
    pub fn has_payload(&self) -> bool {
        matches!(
            self,
            Self::Regular | Self::Contiguous | Self::GnuSparse | Self::Other(_)
        )
    }

    pub fn label(&self) -> String {
        match self {
            Self::Regular => "regular".to_string(),
            Self::HardLink => "hardlink".to_string(),
            Self::Symlink => "symlink".to_string(),
            Self::CharDevice => "char-device".to_string(),
            Self::BlockDevice => "block-device".to_string(),
            Self::Directory => "directory".to_string(),
            Self::Fifo => "fifo".to_string(),
            Self::Contiguous => "contiguous-file".to_string(),
            Self::GnuSparse => "gnu-sparse".to_string(),
            Self::PaxHeader { global: false } => "pax-extended-header".to_string(),
            Self::PaxHeader { global: true } => "pax-global-header".to_string(),
            Self::GnuLongName => "gnu-longname".to_string(),
            Self::GnuLongLink => "gnu-longlink".to_string(),
            Self::Other(flag) => format!("other({})", display_flag(*flag)),
        }
    }
}

fn display_flag(flag: u8) -> String {
    if flag.is_ascii_graphic() {
        format!("'{}'", flag as char)
    } else {
        format!("0x{:02x}", flag)
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Modification time.
///
/// Header fields hold whole seconds; PAX `mtime` records may carry a fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mtime {
    Seconds(i64),
    Precise(f64),
}

impl std::fmt::Display for Mtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{}", s),
            // Debug keeps the shortest round-trip form and a trailing `.0`
            Self::Precise(s) => write!(f, "{:?}", s),
        }
    }
}

impl Serialize for Mtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seconds(s) => serializer.serialize_i64(*s),
            Self::Precise(s) => serializer.serialize_f64(*s),
        }
    }
}

/// Ordered PAX key/value records.
///
/// Insertion order is kept; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaxHeaders(Vec<(String, String)>);

impl PaxHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn extend(&mut self, other: &PaxHeaders) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PaxHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {:?}", k, v)?;
        }
        f.write_str("}")
    }
}

impl Serialize for PaxHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A populated region of a sparse file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SparseRegion {
    pub offset: u64,
    pub length: u64,
}

/// Sparse layout of a file: populated regions plus the expanded size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SparseMap {
    pub real_size: u64,
    pub regions: Vec<SparseRegion>,
}

impl std::fmt::Display for SparseMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, r) in self.regions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}+{}", r.offset, r.length)?;
        }
        f.write_str("]")
    }
}

/// One decoded archive member, after extension records have been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub link_name: String,
    /// File size; the expanded size for sparse files
    pub size: u64,
    pub mtime: Mtime,
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    pub uname: String,
    pub gname: String,
    pub dev_major: u32,
    pub dev_minor: u32,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub pax_headers: PaxHeaders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<SparseMap>,
    /// Offset of the entry's own header block
    pub header_offset: u64,
    /// Payload bytes stored in the archive (differs from `size` for sparse files)
    #[serde(skip)]
    pub stored_size: u64,
}
