//! Sequential TAR decoder.
//!
//! Reads 512-byte blocks from any [`Read`] and yields one [`ArchiveEntry`] per
//! archive member. Payloads are skipped, never inspected. The decoder is
//! forward-only: scanning again requires a fresh stream.

use std::io::{self, Read};

use layerscope_core::error::{InspectError, Result};

use super::entry::{ArchiveEntry, EntryType, Mtime, PaxHeaders, SparseMap};
use super::header::{is_zero_block, ArchiveFormat, Header, BLOCK_SIZE};
use super::pax::{self, Extensions};
use super::sparse;

/// Upper bound for a single PAX or GNU long-name payload.
const MAX_EXTENSION_SIZE: u64 = 64 * 1024 * 1024;

/// Streaming decoder over a TAR byte stream.
pub struct TarDecoder<R> {
    reader: R,
    /// Bytes consumed so far
    offset: u64,
    /// Padded payload of the last emitted entry, skipped on the next call
    pending_skip: u64,
    /// Effective global (`g`) records
    globals: PaxHeaders,
    /// Global records seen before the first entry
    archive_headers: PaxHeaders,
    format: Option<ArchiveFormat>,
    entries: u64,
    done: bool,
}

impl<R: Read> TarDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            pending_skip: 0,
            globals: PaxHeaders::new(),
            archive_headers: PaxHeaders::new(),
            format: None,
            entries: 0,
            done: false,
        }
    }

    /// Format of the first header, once one has been read.
    pub fn format(&self) -> Option<ArchiveFormat> {
        self.format
    }

    /// Archive-level PAX records that preceded the first entry.
    pub fn archive_headers(&self) -> &PaxHeaders {
        &self.archive_headers
    }

    /// Bytes consumed from the underlying stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of entries emitted so far.
    pub fn entries_decoded(&self) -> u64 {
        self.entries
    }

    /// Decode the next entry, or `None` at the end of the archive.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.pending_skip > 0 {
            let n = std::mem::take(&mut self.pending_skip);
            self.skip(n)?;
        }

        let mut ext = Extensions::default();
        loop {
            let header_offset = self.offset;
            let block = match self.read_block()? {
                Some(block) => block,
                None => return self.end_of_archive(ext, header_offset),
            };

            if is_zero_block(&block) {
                match self.read_block()? {
                    None => {}
                    Some(next) if is_zero_block(&next) => {}
                    Some(_) => {
                        tracing::warn!(
                            offset = header_offset,
                            "Lone zero block followed by data, treating as end of archive"
                        );
                    }
                }
                return self.end_of_archive(ext, header_offset);
            }

            let header = Header::new(block, header_offset);
            header.verify_checksum()?;

            let entry_type = EntryType::from_flag(header.type_flag());
            if self.format.is_none() {
                self.format = Some(match entry_type {
                    EntryType::PaxHeader { .. } => ArchiveFormat::Pax,
                    _ => header.format(),
                });
            }

            if entry_type.is_extension() {
                self.read_extension(&header, entry_type, &mut ext)?;
                continue;
            }

            let entry = self.decode_entry(&header, entry_type, ext)?;
            self.entries += 1;
            return Ok(Some(entry));
        }
    }

    fn end_of_archive(&self, ext: Extensions, offset: u64) -> Result<Option<ArchiveEntry>> {
        if !ext.is_empty() {
            tracing::warn!(offset, "Extension records at end of archive have no entry to apply to");
        }
        tracing::debug!(offset, entries = self.entries, "End of archive");
        Ok(None)
    }

    /// Consume a PAX or GNU long-name record into `ext` (or the globals).
    fn read_extension(
        &mut self,
        header: &Header,
        entry_type: EntryType,
        ext: &mut Extensions,
    ) -> Result<()> {
        let size = header.size()?;
        if size > MAX_EXTENSION_SIZE {
            return Err(header.corrupt(format!(
                "{} record of {} bytes exceeds the {} byte limit",
                entry_type, size, MAX_EXTENSION_SIZE
            )));
        }
        let payload = self.read_payload(size)?;

        match entry_type {
            EntryType::PaxHeader { global: true } => {
                let records = pax::parse_records(&payload, header.offset())?;
                tracing::debug!(offset = header.offset(), records = records.len(), "Global PAX header");
                pax::merge_global(&mut self.globals, records);
                if self.entries == 0 {
                    self.archive_headers = self.globals.clone();
                }
            }
            EntryType::PaxHeader { global: false } => {
                let records = pax::parse_records(&payload, header.offset())?;
                tracing::debug!(offset = header.offset(), records = records.len(), "PAX extended header");
                ext.pax.extend(records);
            }
            EntryType::GnuLongName => ext.long_name = Some(pax::parse_long_name(&payload)),
            EntryType::GnuLongLink => ext.long_link = Some(pax::parse_long_name(&payload)),
            _ => {}
        }
        Ok(())
    }

    fn decode_entry(
        &mut self,
        header: &Header,
        entry_type: EntryType,
        ext: Extensions,
    ) -> Result<ArchiveEntry> {
        let size = header.size()?;
        let mut entry = ArchiveEntry {
            name: header.path(),
            link_name: header.link_name(),
            size,
            mtime: Mtime::Seconds(header.mtime()?),
            mode: header.mode()?,
            uid: header.uid()?,
            gid: header.gid()?,
            uname: header.uname(),
            gname: header.gname(),
            dev_major: header.dev_major()?,
            dev_minor: header.dev_minor()?,
            entry_type,
            pax_headers: PaxHeaders::new(),
            sparse: None,
            header_offset: header.offset(),
            stored_size: size,
        };

        if entry_type == EntryType::GnuSparse {
            let (mut regions, mut extended) = sparse::header_regions(header)?;
            while extended {
                let offset = self.offset;
                let block = self.require_block("sparse continuation block")?;
                let (more, next) = sparse::extension_regions(&block, offset)?;
                regions.extend(more);
                extended = next;
            }
            let real_size = sparse::real_size(header)?;
            entry.size = real_size;
            entry.sparse = Some(SparseMap { real_size, regions });
        }

        pax::apply(&mut entry, &self.globals, ext)?;

        // v7 archives mark directories with a trailing slash on a regular entry
        if header.type_flag() == b'\0' && entry.name.ends_with('/') {
            entry.entry_type = EntryType::Directory;
        }
        if entry.entry_type == EntryType::Directory {
            let trimmed = entry.name.trim_end_matches('/');
            if !trimmed.is_empty() {
                entry.name = trimmed.to_string();
            }
        }

        if entry.entry_type.has_payload() {
            self.pending_skip = padded(entry.stored_size).ok_or_else(|| {
                header.corrupt(format!("size {} overflows block padding", entry.stored_size))
            })?;
        }

        tracing::trace!(
            offset = entry.header_offset,
            name = %entry.name,
            size = entry.size,
            "Decoded entry"
        );
        Ok(entry)
    }

    /// Read one block. `None` on a clean end of stream at a block boundary.
    fn read_block(&mut self) -> Result<Option<[u8; BLOCK_SIZE]>> {
        let start = self.offset;
        let mut block = [0u8; BLOCK_SIZE];
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.reader.read(&mut block[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;

        match filled {
            0 => Ok(None),
            BLOCK_SIZE => Ok(Some(block)),
            n => Err(InspectError::UnexpectedEndOfArchive {
                offset: start,
                context: format!("short block: {} of {} bytes", n, BLOCK_SIZE),
            }),
        }
    }

    fn require_block(&mut self, context: &str) -> Result<[u8; BLOCK_SIZE]> {
        let offset = self.offset;
        self.read_block()?
            .ok_or_else(|| InspectError::UnexpectedEndOfArchive {
                offset,
                context: format!("missing {}", context),
            })
    }

    /// Read `size` payload bytes plus block padding.
    fn read_payload(&mut self, size: u64) -> Result<Vec<u8>> {
        let want = padded(size).ok_or_else(|| InspectError::CorruptHeader {
            offset: self.offset,
            reason: format!("extension size {} overflows block padding", size),
        })?;
        let mut buf = Vec::with_capacity(want as usize);
        let got = (&mut self.reader).take(want).read_to_end(&mut buf)? as u64;
        self.offset += got;
        if got < want {
            return Err(InspectError::UnexpectedEndOfArchive {
                offset: self.offset,
                context: format!("extension payload ended {} bytes early", want - got),
            });
        }
        buf.truncate(size as usize);
        Ok(buf)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        let copied = io::copy(&mut (&mut self.reader).take(n), &mut io::sink())?;
        self.offset += copied;
        if copied < n {
            return Err(InspectError::UnexpectedEndOfArchive {
                offset: self.offset,
                context: format!("entry payload ended {} bytes early", n - copied),
            });
        }
        Ok(())
    }
}

impl<R: Read> Iterator for TarDecoder<R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for TarDecoder<R> {}

/// Round up to a whole number of blocks; `None` if that does not fit in a `u64`.
fn padded(size: u64) -> Option<u64> {
    size.checked_next_multiple_of(BLOCK_SIZE as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tar::testutil::{seal, HeaderSpec, Magic, RawArchive};
    use std::io::Cursor;

    fn decode_all(bytes: Vec<u8>) -> Result<Vec<ArchiveEntry>> {
        TarDecoder::new(Cursor::new(bytes)).collect()
    }

    #[test]
    fn test_padded() {
        assert_eq!(padded(0), Some(0));
        assert_eq!(padded(1), Some(512));
        assert_eq!(padded(512), Some(512));
        assert_eq!(padded(513), Some(1024));
        assert_eq!(padded(u64::MAX), None);
        assert_eq!(padded(u64::MAX - 511), None);
    }

    #[test]
    fn test_pax_size_beyond_header_range_is_corrupt() {
        let bytes = RawArchive::new()
            .pax(&[("size", "18446744073709551615")], false)
            .file("victim", b"")
            .finish();

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        match decoder.next() {
            Some(Err(InspectError::CorruptHeader { offset, reason })) => {
                assert_eq!(offset, 1024);
                assert!(reason.contains("size"), "reason: {reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_lone_zero_block_followed_by_data_ends_archive() {
        let mut bytes = RawArchive::new().file("a", b"1").unterminated();
        bytes.extend_from_slice(&[0u8; BLOCK_SIZE]);
        bytes.extend(RawArchive::new().file("hidden", b"2").finish());

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        let first = decoder.next_entry().unwrap().unwrap();
        assert_eq!(first.name, "a");
        assert!(decoder.next_entry().unwrap().is_none());
        assert_eq!(decoder.entries_decoded(), 1);
    }

    #[test]
    fn test_entries_match_written_order_and_fields() {
        let bytes = RawArchive::new()
            .file("etc/hostname", b"box\n")
            .entry(&HeaderSpec::typed("etc/", b'5'), b"")
            .file("etc/motd", &[b'x'; 1500])
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "etc/hostname");
        assert_eq!(entries[0].size, 4);
        assert_eq!(entries[0].mode, 0o644);
        assert_eq!(entries[0].uid, 1000);
        assert_eq!(entries[0].uname, "user");
        assert_eq!(entries[0].gname, "group");
        assert_eq!(entries[0].mtime, Mtime::Seconds(1_700_000_000));
        assert_eq!(entries[0].entry_type, EntryType::Regular);

        assert_eq!(entries[1].name, "etc");
        assert_eq!(entries[1].entry_type, EntryType::Directory);

        assert_eq!(entries[2].name, "etc/motd");
        assert_eq!(entries[2].size, 1500);
        assert_eq!(entries[2].header_offset, 3 * 512);
    }

    #[test]
    fn test_reference_writer_archive() {
        let mut builder = tar::Builder::new(Vec::new());

        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o755);
        header.set_uid(42);
        header.set_gid(7);
        header.set_mtime(1_600_000_000);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, "bin/tool", b"hello" as &[u8])
            .unwrap();

        let long_name = format!("{}/file.txt", "d".repeat(150));
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o600);
        header.set_cksum();
        builder
            .append_data(&mut header, &long_name, b"abc" as &[u8])
            .unwrap();

        let mut header = tar::Header::new_ustar();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_cksum();
        builder
            .append_link(&mut header, "bin/link", "tool")
            .unwrap();

        let bytes = builder.into_inner().unwrap();
        let entries = decode_all(bytes).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "bin/tool");
        assert_eq!(entries[0].mode, 0o755);
        assert_eq!(entries[0].uid, 42);
        assert_eq!(entries[0].gid, 7);
        assert_eq!(entries[0].mtime, Mtime::Seconds(1_600_000_000));
        assert_eq!(entries[1].name, long_name);
        assert_eq!(entries[1].size, 3);
        assert_eq!(entries[2].entry_type, EntryType::Symlink);
        assert_eq!(entries[2].link_name, "tool");
    }

    #[test]
    fn test_pax_override_scoped_to_next_entry() {
        let bytes = RawArchive::new()
            .pax(
                &[
                    ("path", "very/long/override/name"),
                    ("uid", "123456789"),
                    ("mtime", "1700000000.75"),
                    ("LIBARCHIVE.creationtime", "1600000000"),
                ],
                false,
            )
            .file("short", b"data")
            .file("after", b"more")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.name, "very/long/override/name");
        assert_eq!(first.uid, 123456789);
        assert_eq!(first.mtime, Mtime::Precise(1700000000.75));
        assert_eq!(
            first.pax_headers.get("LIBARCHIVE.creationtime"),
            Some("1600000000")
        );
        assert_eq!(first.pax_headers.len(), 4);

        let second = &entries[1];
        assert_eq!(second.name, "after");
        assert_eq!(second.uid, 1000);
        assert_eq!(second.mtime, Mtime::Seconds(1_700_000_000));
        assert!(second.pax_headers.is_empty());
    }

    #[test]
    fn test_pax_size_override_controls_skip() {
        let data = vec![b'z'; 700];
        let mut spec = HeaderSpec::file("big", 0);
        spec.size = 0;
        let bytes = RawArchive::new()
            .pax(&[("size", "700")], false)
            .entry(&spec, &data)
            .file("next", b"ok")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].size, 700);
        assert_eq!(entries[1].name, "next");
    }

    #[test]
    fn test_global_pax_applies_to_all_following_entries() {
        let mut decoder = TarDecoder::new(Cursor::new(
            RawArchive::new()
                .pax(&[("comment", "built by ci"), ("uname", "builder")], true)
                .file("a", b"1")
                .pax(&[("uname", "alice")], false)
                .file("b", b"2")
                .file("c", b"3")
                .finish(),
        ));

        let a = decoder.next().unwrap().unwrap();
        assert_eq!(decoder.format(), Some(ArchiveFormat::Pax));
        assert_eq!(decoder.archive_headers().get("comment"), Some("built by ci"));

        let b = decoder.next().unwrap().unwrap();
        let c = decoder.next().unwrap().unwrap();
        assert!(decoder.next().is_none());

        assert_eq!(a.uname, "builder");
        assert_eq!(b.uname, "alice");
        assert_eq!(c.uname, "builder");
        assert_eq!(c.pax_headers.get("comment"), Some("built by ci"));
    }

    #[test]
    fn test_gnu_long_name_and_link() {
        let long = format!("{}/target", "t".repeat(120));
        let mut link = HeaderSpec::typed("placeholder", b'2');
        link.magic = Magic::Gnu;
        let bytes = RawArchive::new()
            .gnu_long(b'L', &format!("{}/name", "n".repeat(120)))
            .gnu_long(b'K', &long)
            .entry(&link, b"")
            .file("plain", b"")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].name.ends_with("/name"));
        assert_eq!(entries[0].name.len(), 125);
        assert_eq!(entries[0].link_name, long);
        assert_eq!(entries[1].name, "plain");
        assert_eq!(entries[1].link_name, "");
    }

    #[test]
    fn test_corrupt_checksum_yields_error_and_no_entry() {
        let mut bad = HeaderSpec::file("broken", 0).block();
        bad[10] ^= 0x01;
        let bytes = RawArchive::new()
            .file("good", b"ok")
            .block(bad)
            .finish();

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        assert_eq!(decoder.next().unwrap().unwrap().name, "good");
        match decoder.next() {
            Some(Err(InspectError::CorruptHeader { offset, reason })) => {
                assert_eq!(offset, 1024);
                assert!(reason.contains("checksum mismatch"));
            }
            other => panic!("expected CorruptHeader, got {other:?}"),
        }
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_base256_size_decodes() {
        let spec = HeaderSpec::file("huge.img", 5_000_000_000);
        let bytes = RawArchive::new().block(spec.block()).unterminated();

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        let entry = decoder.next().unwrap().unwrap();
        assert_eq!(entry.size, 5_000_000_000);

        // the payload is not there
        match decoder.next() {
            Some(Err(InspectError::UnexpectedEndOfArchive { offset, .. })) => {
                assert_eq!(offset, 512)
            }
            other => panic!("expected UnexpectedEndOfArchive, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_header_block() {
        let mut bytes = RawArchive::new().file("a", b"1").unterminated();
        bytes.extend_from_slice(&[0x41; 100]);

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        assert!(decoder.next().unwrap().is_ok());
        match decoder.next() {
            Some(Err(InspectError::UnexpectedEndOfArchive { offset, context })) => {
                assert_eq!(offset, 1024);
                assert!(context.contains("short block: 100"));
            }
            other => panic!("expected UnexpectedEndOfArchive, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_pax_payload() {
        let mut bytes = HeaderSpec {
            type_flag: b'x',
            ..HeaderSpec::file("././@PaxHeader", 2048)
        }
        .block()
        .to_vec();
        bytes.extend_from_slice(&[b'1'; 512]);

        let err = decode_all(bytes).unwrap_err();
        assert!(matches!(err, InspectError::UnexpectedEndOfArchive { .. }));
    }

    #[test]
    fn test_end_of_stream_without_marker() {
        let bytes = RawArchive::new().file("a", b"1").file("b", b"2").unterminated();
        assert_eq!(decode_all(bytes).unwrap().len(), 2);
    }

    #[test]
    fn test_single_zero_block_then_eof() {
        let mut bytes = RawArchive::new().file("a", b"1").unterminated();
        bytes.extend_from_slice(&[0u8; BLOCK_SIZE]);
        assert_eq!(decode_all(bytes).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_stream() {
        let mut decoder = TarDecoder::new(Cursor::new(Vec::new()));
        assert!(decoder.next().is_none());
        assert_eq!(decoder.format(), None);
    }

    #[test]
    fn test_unknown_type_is_other_and_payload_skipped() {
        let spec = HeaderSpec {
            type_flag: b'V',
            ..HeaderSpec::file("volume-label", 600)
        };
        let bytes = RawArchive::new()
            .entry(&spec, &[b'v'; 600])
            .file("after", b"x")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries[0].entry_type, EntryType::Other(b'V'));
        assert_eq!(entries[1].name, "after");
    }

    #[test]
    fn test_device_entries() {
        let mut chr = HeaderSpec::typed("dev/null", b'3');
        chr.dev_major = 1;
        chr.dev_minor = 3;
        chr.mode = 0o666;
        let mut blk = HeaderSpec::typed("dev/sda", b'4');
        blk.dev_major = 8;
        let bytes = RawArchive::new()
            .entry(&chr, b"")
            .entry(&blk, b"")
            .entry(&HeaderSpec::typed("run/fifo", b'6'), b"")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries[0].entry_type, EntryType::CharDevice);
        assert_eq!((entries[0].dev_major, entries[0].dev_minor), (1, 3));
        assert_eq!(entries[1].entry_type, EntryType::BlockDevice);
        assert_eq!(entries[1].dev_major, 8);
        assert_eq!(entries[2].entry_type, EntryType::Fifo);
    }

    #[test]
    fn test_v7_directory_convention() {
        let mut spec = HeaderSpec::typed("olddir/", b'\0');
        spec.magic = Magic::V7;
        let bytes = RawArchive::new().entry(&spec, b"").finish();

        let mut decoder = TarDecoder::new(Cursor::new(bytes));
        let entry = decoder.next().unwrap().unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
        assert_eq!(entry.name, "olddir");
        assert_eq!(entry.uname, "");
        assert_eq!(decoder.format(), Some(ArchiveFormat::V7));
    }

    #[test]
    fn test_gnu_sparse_with_continuation_block() {
        let mut spec = HeaderSpec::typed("sparse.img", b'S');
        spec.magic = Magic::Gnu;
        spec.size = 3 * 512;
        let mut header = spec.block();
        for (i, (off, len)) in [(0u64, 512u64), (1 << 20, 512)].iter().enumerate() {
            let at = 386 + i * 24;
            header[at..at + 24]
                .copy_from_slice(format!("{:011o}\0{:011o}\0", off, len).as_bytes());
        }
        header[482] = 1;
        header[483..495].copy_from_slice(format!("{:011o}\0", 4 << 20).as_bytes());
        seal(&mut header);

        let mut ext = [0u8; BLOCK_SIZE];
        ext[..24].copy_from_slice(format!("{:011o}\0{:011o}\0", 4u64 << 20, 512).as_bytes());

        let bytes = RawArchive::new()
            .block(header)
            .block(ext)
            .payload(&[b's'; 3 * 512])
            .file("after", b"x")
            .finish();

        let entries = decode_all(bytes).unwrap();
        assert_eq!(entries.len(), 2);
        let sparse = entries[0].sparse.as_ref().unwrap();
        assert_eq!(entries[0].entry_type, EntryType::GnuSparse);
        assert_eq!(entries[0].size, 4 << 20);
        assert_eq!(entries[0].stored_size, 3 * 512);
        assert_eq!(sparse.regions.len(), 3);
        assert_eq!(sparse.regions[2].offset, 4 << 20);
        assert_eq!(entries[1].name, "after");
    }

    #[test]
    fn test_decoder_is_fused_after_error() {
        let mut bad = HeaderSpec::file("bad", 0).block();
        bad[0] = b'X';
        let mut decoder = TarDecoder::new(Cursor::new(bad.to_vec()));
        assert!(matches!(decoder.next(), Some(Err(_))));
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }
}
