//! Entry reporting.
//!
//! Renders decoded entries in strict archive order, one line per entry:
//!
//! ```text
//! -- layer 0 sha256:4f1c…
//! /img/blobs/sha256/4f1c…: format=pax
//! --- PAX ---
//! comment              built by ci
//! layer=0 size=         4 mtime=1700000000 mode=000644 type=regular uid/gid=0/0 uname/gname=root/root dev=0,0 etc/hostname
//! ```

use std::io::{Read, Write};

use layerscope_core::config::{InputMode, InspectConfig, OutputFormat};
use layerscope_core::error::Result;
use serde::Serialize;

use crate::layers::open_layer;
use crate::oci::{LayerBlob, OciImage};
use crate::tar::{ArchiveEntry, ArchiveFormat, PaxHeaders, TarDecoder};

/// Totals for one inspection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectSummary {
    pub layers: usize,
    pub entries: u64,
}

/// Structured output record, one per line.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Record<'a> {
    Layer {
        index: usize,
        digest: String,
        media_type: &'a str,
        size: u64,
    },
    Archive {
        path: &'a str,
        format: &'a str,
        pax_headers: &'a PaxHeaders,
    },
    Entry {
        #[serde(skip_serializing_if = "Option::is_none")]
        layer: Option<usize>,
        #[serde(flatten)]
        entry: &'a ArchiveEntry,
    },
}

/// Writes report lines for layers, archives and entries.
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Banner preceding a layer's listing.
    pub fn layer_banner(&mut self, layer: &LayerBlob) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "-- layer {} {}", layer.index, layer.digest)?;
            }
            OutputFormat::Json => self.record(&Record::Layer {
                index: layer.index,
                digest: layer.digest.to_string(),
                media_type: &layer.media_type,
                size: layer.size,
            })?,
        }
        Ok(())
    }

    /// `<path>: format=<format>`, then archive-level PAX records if any.
    pub fn archive_banner(
        &mut self,
        path: &str,
        format: Option<ArchiveFormat>,
        pax_headers: &PaxHeaders,
    ) -> Result<()> {
        let format = format.map(|f| f.to_string()).unwrap_or_else(|| "empty".to_string());
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{}: format={}", path, format)?;
                if !pax_headers.is_empty() {
                    writeln!(self.out, "--- PAX ---")?;
                    for (key, value) in pax_headers.iter() {
                        writeln!(self.out, "{:20} {}", key, value)?;
                    }
                }
            }
            OutputFormat::Json => self.record(&Record::Archive {
                path,
                format: &format,
                pax_headers,
            })?,
        }
        Ok(())
    }

    pub fn entry(&mut self, entry: &ArchiveEntry, layer: Option<usize>) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", format_entry(entry, layer))?,
            OutputFormat::Json => self.record(&Record::Entry { layer, entry })?,
        }
        Ok(())
    }

    /// Decode and report a whole archive stream. Returns the entry count.
    ///
    /// Entries reported before a decode error stay written.
    pub fn archive<R: Read>(&mut self, path: &str, reader: R, layer: Option<usize>) -> Result<u64> {
        let mut decoder = TarDecoder::new(reader);

        // The banner needs the format, known only after the first header.
        let mut next = decoder.next_entry()?;
        self.archive_banner(path, decoder.format(), decoder.archive_headers())?;

        while let Some(entry) = next {
            self.entry(&entry, layer)?;
            next = decoder.next_entry()?;
        }

        tracing::debug!(
            path,
            entries = decoder.entries_decoded(),
            bytes = decoder.offset(),
            "Finished archive"
        );
        Ok(decoder.entries_decoded())
    }

    fn record(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Render one entry as a text line.
pub fn format_entry(entry: &ArchiveEntry, layer: Option<usize>) -> String {
    let mut line = String::new();
    if let Some(index) = layer {
        line.push_str(&format!("layer={} ", index));
    }
    line.push_str(&format!(
        "size={:10} mtime={} mode={:06o} type={} uid/gid={}/{} uname/gname={}/{} dev={},{} ",
        entry.size,
        entry.mtime,
        entry.mode,
        entry.entry_type,
        entry.uid,
        entry.gid,
        entry.uname,
        entry.gname,
        entry.dev_major,
        entry.dev_minor,
    ));
    if let Some(sparse) = &entry.sparse {
        line.push_str(&format!("sparse={} ", sparse));
    }
    if !entry.pax_headers.is_empty() {
        line.push_str(&format!("{} ", entry.pax_headers));
    }
    line.push_str(&entry.name);
    if entry.entry_type.is_link() {
        line.push_str(&format!(" -> {}", entry.link_name));
    }
    line
}

/// Run one inspection described by `config`, writing the report to `out`.
///
/// # Errors
///
/// Returns the first resolution, open or decode error. Output written
/// before the failure is left in `out`.
pub fn inspect<W: Write>(config: &InspectConfig, out: W) -> Result<InspectSummary> {
    let mut reporter = Reporter::new(out, config.output);
    let summary = match config.resolve_mode() {
        InputMode::Oci => inspect_image(config, &mut reporter)?,
        _ => inspect_archive(config, &mut reporter)?,
    };
    reporter.into_inner().flush()?;
    Ok(summary)
}

fn inspect_archive<W: Write>(
    config: &InspectConfig,
    reporter: &mut Reporter<W>,
) -> Result<InspectSummary> {
    let (_, reader) = open_layer(&config.input, config.compression)?;
    let entries = reporter.archive(&config.input.display().to_string(), reader, None)?;
    Ok(InspectSummary { layers: 0, entries })
}

fn inspect_image<W: Write>(
    config: &InspectConfig,
    reporter: &mut Reporter<W>,
) -> Result<InspectSummary> {
    let image = OciImage::from_path(&config.input)?;

    let selected: Vec<&LayerBlob> = match config.layer {
        Some(index) => vec![image.layer(index)?],
        None => image.layers().iter().collect(),
    };

    let mut summary = InspectSummary::default();
    for layer in selected {
        reporter.layer_banner(layer)?;
        let (_, reader) = open_layer(&layer.path, config.compression)?;
        summary.entries += reporter.archive(
            &layer.path.display().to_string(),
            reader,
            Some(layer.index),
        )?;
        summary.layers += 1;
    }
    Ok(summary)
}
