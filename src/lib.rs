//! # zipout: Streaming ZIP Encoder
//!
//! `zipout` writes ZIP archives to any `Write` destination. Entries are opened
//! by name, filled through ordinary `Write` sinks and finished one by one; the
//! archive keeps them in creation order for its central directory.
//!
//! ## Features
//!
//! - **Buffered entries**: CRC and sizes go in the local header, no data descriptors
//! - **Several open entries**: sinks are independent until they are finished
//! - **Stored or deflated**: raw DEFLATE at the best compression level
//! - **Aligned stored data**: pad the local header so data starts on an N-byte boundary
//! - **No seeking**: offsets are tracked by counting the bytes written
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::io::Write;
//! use zipout::{EntryOptions, ZipOutput};
//!
//! let mut zip = ZipOutput::new("output.zip")?;
//!
//! let mut manifest = zip.create_entry("META-INF/MANIFEST.MF", EntryOptions::deflated())?;
//! manifest.write_all(b"Manifest-Version: 1.0\r\n")?;
//! manifest.finish(&mut zip)?;
//!
//! // Stored data aligned for memory mapping
//! zip.write_entry(
//!     "resources.arsc",
//!     EntryOptions::stored().alignment(4),
//!     &[0u8; 64],
//! )?;
//!
//! zip.set_comment("built by zipout");
//! zip.close()?;
//! # Ok::<(), zipout::ZipError>(())
//! ```
//!
//! ZIP64, encryption and multi-disk archives are not supported: sizes and
//! offsets above 4 GiB, or more than 65535 entries, are rejected with
//! [`ZipError::LimitExceeded`].

mod counting;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod header;
pub mod writer;

pub use encoding::modified_utf8;
pub use entry::{CompressionMethod, EntryOptions, EntrySink};
pub use error::{Result, ZipError};
pub use writer::ZipOutput;
