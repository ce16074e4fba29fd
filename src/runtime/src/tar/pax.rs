//! PAX extended records and GNU long name/link records.
//!
//! Extension records never become entries themselves. The decoder collects
//! them into an [`Extensions`] value that is handed to exactly one following
//! entry and then dropped. Global (`g`) records are archive-level and live in
//! the decoder.

use layerscope_core::error::{InspectError, Result};

use super::entry::{ArchiveEntry, Mtime, PaxHeaders, SparseMap};
use super::sparse;

/// Pending extension records for the next entry.
#[derive(Debug, Default)]
pub struct Extensions {
    /// `x` records in arrival order; empty values are kept
    pub pax: Vec<(String, String)>,
    /// GNU `L` payload
    pub long_name: Option<String>,
    /// GNU `K` payload
    pub long_link: Option<String>,
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.pax.is_empty() && self.long_name.is_none() && self.long_link.is_none()
    }
}

/// Parse a PAX payload of `"<len> <key>=<value>\n"` records.
///
/// `<len>` counts the whole record including itself and the newline, which
/// lets values contain `=` and newlines. Parsing stops at a NUL byte.
pub fn parse_records(payload: &[u8], offset: u64) -> Result<Vec<(String, String)>> {
    let corrupt = |reason: String| InspectError::CorruptHeader { offset, reason };

    let mut records = Vec::new();
    let mut pos = 0;
    while pos < payload.len() && payload[pos] != 0 {
        let rest = &payload[pos..];
        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| corrupt(format!("PAX record at +{} has no length", pos)))?;
        let length: usize = std::str::from_utf8(&rest[..space])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| corrupt(format!("PAX record at +{} has an invalid length", pos)))?;

        if length <= space + 1 || length > rest.len() {
            return Err(corrupt(format!(
                "PAX record at +{} has length {} outside the payload",
                pos, length
            )));
        }
        let record = &rest[..length];
        if record[length - 1] != b'\n' {
            return Err(corrupt(format!(
                "PAX record at +{} is not newline-terminated",
                pos
            )));
        }

        let body = &record[space + 1..length - 1];
        let eq = body
            .iter()
            .position(|&b| b == b'=')
            .ok_or_else(|| corrupt(format!("PAX record at +{} has no '='", pos)))?;
        if eq == 0 {
            return Err(corrupt(format!("PAX record at +{} has an empty key", pos)));
        }

        let key = String::from_utf8_lossy(&body[..eq]).into_owned();
        let value = String::from_utf8_lossy(&body[eq + 1..]).into_owned();
        records.push((key, value));
        pos += length;
    }
    Ok(records)
}

/// Payload of a GNU `L`/`K` record: a NUL-terminated path.
pub fn parse_long_name(payload: &[u8]) -> String {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

/// Merge `g` records into the archive-level headers. An empty value deletes the key.
pub fn merge_global(globals: &mut PaxHeaders, records: Vec<(String, String)>) {
    for (key, value) in records {
        if value.is_empty() {
            globals.remove(&key);
        } else {
            globals.insert(key, value);
        }
    }
}

/// Apply archive-level headers and the pending extensions to a freshly decoded entry.
///
/// GNU long names apply first; PAX keys win over them. Every PAX record is kept
/// verbatim in `entry.pax_headers`, globals first.
pub fn apply(entry: &mut ArchiveEntry, globals: &PaxHeaders, ext: Extensions) -> Result<()> {
    if let Some(name) = ext.long_name {
        entry.name = name;
    }
    if let Some(link) = ext.long_link {
        entry.link_name = link;
    }

    let mut shown = globals.clone();
    let mut effective = globals.clone();
    for (key, value) in ext.pax {
        if value.is_empty() {
            effective.remove(&key);
        } else {
            effective.insert(key.clone(), value.clone());
        }
        shown.insert(key, value);
    }

    for (key, value) in effective.iter() {
        apply_key(entry, key, value)?;
    }
    apply_sparse(entry, &effective)?;

    entry.pax_headers = shown;
    Ok(())
}

fn apply_key(entry: &mut ArchiveEntry, key: &str, value: &str) -> Result<()> {
    match key {
        "path" => entry.name = value.to_string(),
        "linkpath" => entry.link_name = value.to_string(),
        "uname" => entry.uname = value.to_string(),
        "gname" => entry.gname = value.to_string(),
        "size" => {
            let size = parse_number(entry, key, value)?;
            // header size fields top out at i64::MAX
            if i64::try_from(size).is_err() {
                return Err(InspectError::CorruptHeader {
                    offset: entry.header_offset,
                    reason: format!("PAX size {} out of range", size),
                });
            }
            entry.size = size;
            entry.stored_size = entry.size;
        }
        "uid" => entry.uid = parse_number(entry, key, value)?,
        "gid" => entry.gid = parse_number(entry, key, value)?,
        "mtime" => entry.mtime = parse_time(entry, key, value)?,
        _ => {}
    }
    Ok(())
}

/// PAX form of GNU sparse files (formats 0.0 and 0.1).
fn apply_sparse(entry: &mut ArchiveEntry, pax: &PaxHeaders) -> Result<()> {
    let real_size = match pax
        .get("GNU.sparse.realsize")
        .or_else(|| pax.get("GNU.sparse.size"))
    {
        Some(value) => parse_number(entry, "GNU.sparse.realsize", value)?,
        None => return Ok(()),
    };

    let regions = match pax.get("GNU.sparse.map") {
        Some(map) => sparse::parse_pax_map(map).map_err(|reason| InspectError::CorruptHeader {
            offset: entry.header_offset,
            reason: format!("invalid GNU.sparse.map: {}", reason),
        })?,
        None => Vec::new(),
    };

    if let Some(name) = pax.get("GNU.sparse.name") {
        entry.name = name.to_string();
    }
    entry.size = real_size;
    entry.sparse = Some(SparseMap { real_size, regions });
    Ok(())
}

fn parse_number(entry: &ArchiveEntry, key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| InspectError::CorruptHeader {
            offset: entry.header_offset,
            reason: format!("invalid PAX {} value: {:?}", key, value),
        })
}

fn parse_time(entry: &ArchiveEntry, key: &str, value: &str) -> Result<Mtime> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() => Ok(Mtime::Precise(secs)),
        _ => Err(InspectError::CorruptHeader {
            offset: entry.header_offset,
            reason: format!("invalid PAX {} value: {:?}", key, value),
        }),
    }
}
