//! GNU sparse maps.
//!
//! Old-style GNU sparse headers (type `S`) hold four `(offset, numbytes)`
//! slots of two 12-byte numeric fields each, followed by an `isextended` flag.
//! When the flag is set, continuation blocks of 21 slots follow the header,
//! each with its own flag at byte 504.

use layerscope_core::error::{InspectError, Result};

use super::entry::SparseRegion;
use super::header::{
    decode_numeric, Header, BLOCK_SIZE, GNU_IS_EXTENDED, GNU_REAL_SIZE, GNU_SPARSE,
};

const SLOT_SIZE: usize = 24;
const EXTENSION_SLOTS: usize = 21;
const EXTENSION_FLAG: usize = EXTENSION_SLOTS * SLOT_SIZE;

/// Regions stored in a GNU sparse header plus its `isextended` flag.
pub fn header_regions(header: &Header) -> Result<(Vec<SparseRegion>, bool)> {
    let bytes = header.as_bytes();
    let regions = parse_slots(&bytes[GNU_SPARSE], header.offset())?;
    Ok((regions, bytes[GNU_IS_EXTENDED] != 0))
}

/// Expanded file size recorded in a GNU sparse header.
pub fn real_size(header: &Header) -> Result<u64> {
    header.unsigned(GNU_REAL_SIZE, "realsize")
}

/// Regions in a sparse continuation block plus its own `isextended` flag.
pub fn extension_regions(block: &[u8; BLOCK_SIZE], offset: u64) -> Result<(Vec<SparseRegion>, bool)> {
    let regions = parse_slots(&block[..EXTENSION_FLAG], offset)?;
    Ok((regions, block[EXTENSION_FLAG] != 0))
}

fn parse_slots(bytes: &[u8], offset: u64) -> Result<Vec<SparseRegion>> {
    let mut regions = Vec::new();
    for slot in bytes.chunks_exact(SLOT_SIZE) {
        // an unused slot is all NUL and ends the list
        if slot.iter().all(|&b| b == 0) {
            break;
        }
        let field = |range: std::ops::Range<usize>, name: &str| -> Result<u64> {
            decode_numeric(&slot[range])
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| InspectError::CorruptHeader {
                    offset,
                    reason: format!("invalid sparse {} field", name),
                })
        };
        regions.push(SparseRegion {
            offset: field(0..12, "offset")?,
            length: field(12..24, "numbytes")?,
        });
    }
    Ok(regions)
}

/// Parse a PAX `GNU.sparse.map` value: comma-separated `offset,length` pairs.
pub fn parse_pax_map(map: &str) -> std::result::Result<Vec<SparseRegion>, String> {
    let map = map.trim();
    if map.is_empty() {
        return Ok(Vec::new());
    }

    let numbers = map
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<u64>()
                .map_err(|_| format!("not a number: {:?}", n))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if numbers.len() % 2 != 0 {
        return Err(format!("odd number of values ({})", numbers.len()));
    }

    Ok(numbers
        .chunks_exact(2)
        .map(|pair| SparseRegion {
            offset: pair[0],
            length: pair[1],
        })
        .collect())
}
