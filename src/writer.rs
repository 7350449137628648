//! Archive writer that owns the destination, the entry registry and the
//! central directory.
//!
//! Entries are registered in the order they are created, and that order is
//! used verbatim for the central directory. Their data is written whenever
//! each sink is finished, so several entries may be open at the same time.
//!
//! Any `Write` destination works (File, Vec<u8>, sockets, etc.); offsets are
//! tracked by counting bytes, no seeking is needed.

use crate::counting::CountingWriter;
use crate::encoding::modified_utf8;
use crate::entry::{CompressionMethod, EntryOptions, EntrySink, FinishedEntry};
use crate::error::{Result, ZipError};
use crate::header::{
    alignment_padding, CentralDirectoryHeader, EndOfCentralDirectory, EntryFields,
    LocalFileHeader,
};
use log::{debug, trace};
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the ids that tie each sink to the archive that created it
static NEXT_ARCHIVE_ID: AtomicU64 = AtomicU64::new(0);

/// Largest number of entries a classic end-of-central-directory record holds
const MAX_ENTRIES: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveState {
    Open,
    Closed,
    /// A write was interrupted or a finished entry couldn't be placed;
    /// the output is incomplete
    Failed,
}

/// Values known once the entry's sink is finished
#[derive(Debug, Clone, Copy)]
struct FinalizedEntry {
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    local_header_offset: u32,
}

#[derive(Debug)]
enum EntryState {
    Pending,
    Finalized(FinalizedEntry),
}

/// Entry registered in the archive
struct ZipEntry {
    name: String,
    name_bytes: Vec<u8>,
    method: CompressionMethod,
    alignment: u32,
    modification_time: u32,
    extra_field: Vec<u8>,
    comment: Vec<u8>,
    state: EntryState,
}

impl ZipEntry {
    fn is_pending(&self) -> bool {
        matches!(self.state, EntryState::Pending)
    }

    fn fields(&self, finalized: &FinalizedEntry) -> EntryFields<'_> {
        EntryFields {
            method: self.method.to_zip_method(),
            modification_time: self.modification_time,
            crc32: finalized.crc32,
            compressed_size: finalized.compressed_size,
            uncompressed_size: finalized.uncompressed_size,
            name: &self.name_bytes,
            extra_field: &self.extra_field,
        }
    }
}

fn to_u16(value: usize, what: &str) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| ZipError::LimitExceeded(format!("{} is {} bytes", what, value)))
}

fn to_u32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ZipError::LimitExceeded(format!("{} is {}", what, value)))
}

/// Encode the local header for `entry` placed at `offset`
fn local_header(
    entry: &ZipEntry,
    offset: u64,
    finished: &FinishedEntry,
) -> Result<(Vec<u8>, FinalizedEntry)> {
    let finalized = FinalizedEntry {
        crc32: finished.crc32,
        compressed_size: to_u32(finished.data.len() as u64, "compressed size")?,
        uncompressed_size: to_u32(finished.uncompressed_size, "uncompressed size")?,
        local_header_offset: to_u32(offset, "local header offset")?,
    };

    // Alignment filler goes into the extra field, local header only
    let padding = match entry.method {
        CompressionMethod::Stored => alignment_padding(
            offset,
            entry.name_bytes.len(),
            entry.extra_field.len(),
            entry.alignment,
        ),
        CompressionMethod::Deflate => 0,
    };
    to_u16(entry.extra_field.len() + padding, "padded extra field")?;

    let mut header = Vec::new();
    LocalFileHeader {
        fields: entry.fields(&finalized),
        padding,
    }
    .write_to(&mut header);

    debug!(
        "writing local file header [{}] ({:?}, offset = {}, padding = {}, {}/{} bytes)",
        entry.name,
        entry.method,
        offset,
        padding,
        finalized.compressed_size,
        finalized.uncompressed_size
    );
    Ok((header, finalized))
}

/// Streaming ZIP writer with buffered entries
///
/// ```
/// use std::io::Write;
/// use zipout::{EntryOptions, ZipOutput};
///
/// let mut zip = ZipOutput::from_writer_with_alignment(Vec::new(), 4)?;
///
/// let mut first = zip.create_entry("a.txt", EntryOptions::stored())?;
/// let mut second = zip.create_entry("b.txt", EntryOptions::deflated())?;
/// second.write_all(&b"x".repeat(1000))?;
/// first.write_all(b"hi")?;
///
/// // Finish order doesn't matter; the directory keeps creation order
/// second.finish(&mut zip)?;
/// first.finish(&mut zip)?;
///
/// let bytes = zip.close()?;
/// assert_eq!(&bytes[..4], b"PK\x03\x04");
/// # Ok::<(), zipout::ZipError>(())
/// ```
pub struct ZipOutput<W: Write> {
    id: u64,
    output: Option<CountingWriter<W>>,
    entries: Vec<ZipEntry>,
    names: HashSet<String>,
    uncompressed_alignment: u32,
    comment: Option<String>,
    state: ArchiveState,
}

impl ZipOutput<File> {
    /// Create a new ZIP file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> ZipOutput<W> {
    /// Create a new ZIP writer from an arbitrary writer, without alignment
    pub fn from_writer(writer: W) -> Result<Self> {
        Self::from_writer_with_alignment(writer, 1)
    }

    /// Create a new ZIP writer whose stored entries are aligned to
    /// `uncompressed_alignment` bytes unless their options say otherwise
    pub fn from_writer_with_alignment(writer: W, uncompressed_alignment: u32) -> Result<Self> {
        Ok(Self {
            id: NEXT_ARCHIVE_ID.fetch_add(1, Ordering::Relaxed),
            output: Some(CountingWriter::new(writer)),
            entries: Vec::new(),
            names: HashSet::new(),
            uncompressed_alignment,
            comment: None,
            state: ArchiveState::Open,
        })
    }

    /// Create a new ZIP writer that starts with the raw `header` bytes
    ///
    /// The header (a launcher stub, for instance) is written immediately.
    /// All entry offsets and the central directory offset include its length.
    pub fn from_writer_with_header(
        writer: W,
        header: &[u8],
        uncompressed_alignment: u32,
    ) -> Result<Self> {
        let mut zip = Self::from_writer_with_alignment(writer, uncompressed_alignment)?;
        zip.emit(&[header])?;
        debug!("wrote {} byte archive header", header.len());
        Ok(zip)
    }

    /// Set the comment for the entire archive
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Number of bytes written to the destination so far
    pub fn bytes_written(&self) -> u64 {
        self.output.as_ref().map_or(0, |o| o.bytes_written())
    }

    /// Number of registered entries, pending or finished
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Names of the entries whose sinks haven't been finished yet
    pub fn pending_entries(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.is_pending())
            .map(|e| e.name.clone())
            .collect()
    }

    /// Whether [`close`](Self::close) has completed successfully
    pub fn is_closed(&self) -> bool {
        self.state == ArchiveState::Closed
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            ArchiveState::Open => Ok(()),
            ArchiveState::Closed => Err(ZipError::ArchiveAlreadyClosed),
            ArchiveState::Failed => Err(ZipError::ArchiveFailed),
        }
    }

    /// Write `chunks` to the destination, poisoning the archive on failure
    fn emit(&mut self, chunks: &[&[u8]]) -> Result<()> {
        let output = self.output.as_mut().ok_or(ZipError::ArchiveAlreadyClosed)?;
        for chunk in chunks {
            if let Err(e) = output.write_all(chunk) {
                self.state = ArchiveState::Failed;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Poison the archive after one of its entries was lost mid-finish
    ///
    /// Sinks from other archives leave this one untouched.
    pub(crate) fn abort_entry(&mut self, archive_id: u64) {
        if archive_id == self.id && self.state == ArchiveState::Open {
            self.state = ArchiveState::Failed;
        }
    }

    /// Register a new entry and return the sink for its data
    ///
    /// The name is reserved right away. The entry keeps its position in the
    /// central directory no matter when its sink is finished.
    pub fn create_entry(&mut self, name: &str, options: EntryOptions) -> Result<EntrySink> {
        self.ensure_open()?;

        if name.is_empty() {
            return Err(ZipError::InvalidName("entry name is empty".to_string()));
        }
        if self.names.contains(name) {
            return Err(ZipError::DuplicateName(name.to_string()));
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(ZipError::LimitExceeded(format!(
                "archive already holds {} entries",
                MAX_ENTRIES
            )));
        }

        let name_bytes = modified_utf8(name);
        to_u16(name_bytes.len(), "entry name")?;
        let extra_field = options.extra_field.unwrap_or_default();
        to_u16(extra_field.len(), "extra field")?;
        let comment = options
            .comment
            .as_deref()
            .map(modified_utf8)
            .unwrap_or_default();
        to_u16(comment.len(), "entry comment")?;

        let alignment = match options.method {
            CompressionMethod::Stored => options.alignment.unwrap_or(self.uncompressed_alignment),
            CompressionMethod::Deflate => 1,
        };
        // Worst-case padding must still fit the local header's extra field
        let max_padding = alignment.saturating_sub(1) as usize;
        to_u16(extra_field.len() + max_padding, "padded extra field")?;

        let index = self.entries.len();
        self.names.insert(name.to_string());
        self.entries.push(ZipEntry {
            name: name.to_string(),
            name_bytes,
            method: options.method,
            alignment,
            modification_time: options.modification_time,
            extra_field,
            comment,
            state: EntryState::Pending,
        });
        trace!(
            "registered entry [{}] #{} ({:?}, alignment = {})",
            name,
            index,
            options.method,
            alignment
        );

        Ok(EntrySink::new(
            self.id,
            index,
            name.to_string(),
            options.method,
            options.size_hint,
        ))
    }

    /// Create an entry, write `data` to it and finish it
    pub fn write_entry(&mut self, name: &str, options: EntryOptions, data: &[u8]) -> Result<()> {
        let mut sink = self.create_entry(name, options)?;
        sink.write_all(data)?;
        sink.finish(self)
    }

    /// Write the local header and data of a finished sink
    ///
    /// The sink is gone by now, so a failure here can't be retried: once the
    /// entry is known to belong to this archive, any error poisons it.
    pub(crate) fn finalize_entry(
        &mut self,
        archive_id: u64,
        index: usize,
        name: &str,
        finished: FinishedEntry,
    ) -> Result<()> {
        self.ensure_open()?;

        let entry = self
            .entries
            .get(index)
            .filter(|e| archive_id == self.id && e.name == name && e.is_pending())
            .ok_or_else(|| ZipError::UnknownEntry(name.to_string()))?;

        let offset = self.bytes_written();
        let (header, finalized) = match local_header(entry, offset, &finished) {
            Ok(encoded) => encoded,
            Err(e) => {
                self.state = ArchiveState::Failed;
                return Err(e);
            }
        };

        self.emit(&[&header, &finished.data])?;
        self.entries[index].state = EntryState::Finalized(finalized);
        Ok(())
    }

    /// Close the archive, writing the central directory and trailer
    ///
    /// Every sink must have been finished. If some aren't, `UnfinalizedEntries`
    /// is returned before anything is written and the archive stays open, so
    /// the call can be retried once the remaining sinks are finished.
    /// On success the destination is flushed and handed back; the archive
    /// can't be used afterwards.
    pub fn close(&mut self) -> Result<W> {
        self.ensure_open()?;
        let central_directory_offset = self.bytes_written();
        self.close_at(central_directory_offset)
    }

    /// Close the archive, recording `central_directory_offset` in the trailer
    ///
    /// For archives embedded after a prefix the writer never saw, the
    /// directory offset must be relative to the start of the whole file.
    pub fn close_at(&mut self, central_directory_offset: u64) -> Result<W> {
        self.ensure_open()?;

        let pending = self.pending_entries();
        if !pending.is_empty() {
            return Err(ZipError::UnfinalizedEntries(pending));
        }

        let central_directory_offset = to_u32(central_directory_offset, "central directory offset")?;
        let archive_comment = self
            .comment
            .as_deref()
            .map(modified_utf8)
            .unwrap_or_default();
        to_u16(archive_comment.len(), "archive comment")?;

        let mut directory = Vec::new();
        for entry in &self.entries {
            if let EntryState::Finalized(finalized) = &entry.state {
                CentralDirectoryHeader {
                    fields: entry.fields(finalized),
                    comment: &entry.comment,
                    local_header_offset: finalized.local_header_offset,
                }
                .write_to(&mut directory);
            }
        }

        let mut trailer = Vec::new();
        EndOfCentralDirectory {
            entries: to_u16(self.entries.len(), "entry count")?,
            central_directory_size: to_u32(directory.len() as u64, "central directory size")?,
            central_directory_offset,
            comment: &archive_comment,
        }
        .write_to(&mut trailer);

        debug!(
            "writing central directory ({} entries, {} bytes at offset {})",
            self.entries.len(),
            directory.len(),
            central_directory_offset
        );
        self.emit(&[&directory, &trailer])?;

        let mut output = self.output.take().ok_or(ZipError::ArchiveAlreadyClosed)?;
        if let Err(e) = output.flush() {
            self.state = ArchiveState::Failed;
            return Err(e.into());
        }
        debug!("closed archive ({} bytes)", output.bytes_written());

        self.state = ArchiveState::Closed;
        self.entries.clear();
        self.names.clear();
        Ok(output.into_inner())
    }
}
