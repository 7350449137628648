//! Error types for zipout

use std::io;

/// Result type for zipout operations
pub type Result<T> = std::result::Result<T, ZipError>;

/// Error types that can occur while writing a ZIP archive
#[derive(Debug)]
pub enum ZipError {
    /// I/O error from the destination
    Io(io::Error),
    /// An entry with this name was already registered
    DuplicateName(String),
    /// The archive has been closed
    ArchiveAlreadyClosed,
    /// An earlier I/O error left the archive incomplete
    ArchiveFailed,
    /// Close was attempted while these entries were still pending
    UnfinalizedEntries(Vec<String>),
    /// Entry name is not usable
    InvalidName(String),
    /// A value does not fit the classic (non-ZIP64) record layout
    LimitExceeded(String),
    /// The sink does not belong to this archive
    UnknownEntry(String),
}

impl std::fmt::Display for ZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZipError::Io(e) => write!(f, "I/O error: {}", e),
            ZipError::DuplicateName(name) => write!(f, "Duplicate zip entry [{}]", name),
            ZipError::ArchiveAlreadyClosed => write!(f, "Archive already closed"),
            ZipError::ArchiveFailed => {
                write!(f, "Archive aborted by an earlier I/O error")
            }
            ZipError::UnfinalizedEntries(names) => {
                write!(f, "Unfinalized zip entries: [{}]", names.join(", "))
            }
            ZipError::InvalidName(msg) => write!(f, "Invalid entry name: {}", msg),
            ZipError::LimitExceeded(msg) => write!(f, "ZIP limit exceeded: {}", msg),
            ZipError::UnknownEntry(name) => {
                write!(f, "Entry [{}] is not registered in this archive", name)
            }
        }
    }
}

impl std::error::Error for ZipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZipError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ZipError {
    fn from(err: io::Error) -> Self {
        ZipError::Io(err)
    }
}
