//! Entry sinks that buffer one entry's data until it is finished
//!
//! A ZIP local header carries the CRC and both sizes in front of the data, so
//! nothing is written to the archive while the entry is open. Stored entries
//! keep the raw bytes; deflated entries keep the compressor output. Either way
//! the CRC is computed over the uncompressed bytes as they arrive.

use crate::error::Result;
use crate::writer::ZipOutput;
use crc32fast::Hasher as Crc32;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Compression method to use for ZIP entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// No compression (stored)
    Stored,
    /// DEFLATE compression at the best level
    #[default]
    Deflate,
}

impl CompressionMethod {
    pub(crate) fn to_zip_method(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
        }
    }
}

/// Per-entry settings passed to [`ZipOutput::create_entry`]
///
/// ```
/// use zipout::EntryOptions;
///
/// let options = EntryOptions::stored()
///     .alignment(4)
///     .modification_time(0x5A21_6C33)
///     .comment("resources");
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryOptions {
    pub(crate) method: CompressionMethod,
    pub(crate) alignment: Option<u32>,
    pub(crate) modification_time: u32,
    pub(crate) extra_field: Option<Vec<u8>>,
    pub(crate) comment: Option<String>,
    pub(crate) size_hint: Option<u64>,
}

impl EntryOptions {
    /// Options for an uncompressed entry
    pub fn stored() -> Self {
        Self::default().compression_method(CompressionMethod::Stored)
    }

    /// Options for a deflated entry
    pub fn deflated() -> Self {
        Self::default().compression_method(CompressionMethod::Deflate)
    }

    /// Deflate the entry when `compress` is true, store it otherwise
    pub fn compress(self, compress: bool) -> Self {
        self.compression_method(if compress {
            CompressionMethod::Deflate
        } else {
            CompressionMethod::Stored
        })
    }

    /// Set the compression method explicitly
    pub fn compression_method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Align the data of a stored entry to a multiple of `alignment` bytes
    ///
    /// Values of 0 or 1 disable alignment. Ignored for deflated entries.
    /// When unset, the archive's default alignment applies.
    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Modification date and time, already packed in DOS format
    pub fn modification_time(mut self, dos_time: u32) -> Self {
        self.modification_time = dos_time;
        self
    }

    /// Raw extra field: chunks of a 2-byte ID, a 2-byte length and the data
    pub fn extra_field(mut self, extra_field: impl Into<Vec<u8>>) -> Self {
        self.extra_field = Some(extra_field.into());
        self
    }

    /// Entry comment, recorded in the central directory only
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Expected uncompressed size, used to pre-size the entry buffer
    pub fn size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }
}

/// Initial buffer capacity for an entry of roughly `size_hint` bytes
fn buffer_capacity(size_hint: Option<u64>) -> usize {
    match size_hint {
        Some(size) if size < 10_000 => 8 * 1024,
        Some(size) if size < 100_000 => 32 * 1024,
        Some(size) if size < 1_000_000 => 128 * 1024,
        Some(size) if size < 10_000_000 => 256 * 1024,
        Some(_) => 512 * 1024,
        None => 16 * 1024,
    }
}

/// Metadata tracker for CRC and byte counts
struct CrcCounter {
    crc: Crc32,
    uncompressed_count: u64,
}

impl CrcCounter {
    fn new() -> Self {
        Self {
            crc: Crc32::new(),
            uncompressed_count: 0,
        }
    }

    fn update_uncompressed(&mut self, data: &[u8]) {
        self.crc.update(data);
        self.uncompressed_count += data.len() as u64;
    }

    fn finalize(self) -> u32 {
        self.crc.finalize()
    }
}

enum SinkBody {
    Stored(Vec<u8>),
    Deflated(DeflateEncoder<Vec<u8>>),
}

/// Entry data ready to be placed behind its local header
pub(crate) struct FinishedEntry {
    pub crc32: u32,
    pub uncompressed_size: u64,
    pub data: Vec<u8>,
}

/// Byte sink for one pending entry, returned by [`ZipOutput::create_entry`]
///
/// Writes only touch the sink's own buffer, so any number of sinks may be
/// open at once. Nothing reaches the archive until [`EntrySink::finish`].
/// Dropping a sink without finishing it leaves the entry pending, and the
/// archive then refuses to close.
pub struct EntrySink {
    archive_id: u64,
    index: usize,
    name: String,
    counter: CrcCounter,
    body: SinkBody,
}

impl EntrySink {
    pub(crate) fn new(
        archive_id: u64,
        index: usize,
        name: String,
        method: CompressionMethod,
        size_hint: Option<u64>,
    ) -> Self {
        let buffer = Vec::with_capacity(buffer_capacity(size_hint));
        let body = match method {
            CompressionMethod::Stored => SinkBody::Stored(buffer),
            // Raw deflate stream, no zlib framing
            CompressionMethod::Deflate => {
                SinkBody::Deflated(DeflateEncoder::new(buffer, Compression::best()))
            }
        };
        Self {
            archive_id,
            index,
            name,
            counter: CrcCounter::new(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compression_method(&self) -> CompressionMethod {
        match self.body {
            SinkBody::Stored(_) => CompressionMethod::Stored,
            SinkBody::Deflated(_) => CompressionMethod::Deflate,
        }
    }

    /// Number of uncompressed bytes written so far
    pub fn uncompressed_size(&self) -> u64 {
        self.counter.uncompressed_count
    }

    /// Finish the entry and write its local header and data to `archive`
    ///
    /// The sink must have been created by the same archive; a sink from any
    /// other archive is rejected with `UnknownEntry`.
    pub fn finish<W: Write>(self, archive: &mut ZipOutput<W>) -> Result<()> {
        let EntrySink {
            archive_id,
            index,
            name,
            counter,
            body,
        } = self;

        let uncompressed_size = counter.uncompressed_count;
        // finish() consumes the encoder, releasing the compressor state
        let data = match body {
            SinkBody::Stored(buffer) => buffer,
            SinkBody::Deflated(encoder) => match encoder.finish() {
                Ok(buffer) => buffer,
                Err(e) => {
                    archive.abort_entry(archive_id);
                    return Err(e.into());
                }
            },
        };

        archive.finalize_entry(
            archive_id,
            index,
            &name,
            FinishedEntry {
                crc32: counter.finalize(),
                uncompressed_size,
                data,
            },
        )
    }
}

impl Write for EntrySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match &mut self.body {
            SinkBody::Stored(buffer) => {
                buffer.extend_from_slice(buf);
                buf.len()
            }
            SinkBody::Deflated(encoder) => encoder.write(buf)?,
        };
        self.counter.update_uncompressed(&buf[..n]);
        Ok(n)
    }

    /// Entry data only reaches the archive on [`EntrySink::finish`]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for EntrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntrySink")
            .field("name", &self.name)
            .field("method", &self.compression_method())
            .field("uncompressed_size", &self.counter.uncompressed_count)
            .finish()
    }
}
