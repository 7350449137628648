//! Counting writer wrapper that tracks the archive's stream cursor.

use std::io::{Result, Write};

/// A writer wrapper that counts bytes written through it.
///
/// The count is the offset every local header and the central directory are
/// recorded at, so the destination itself never needs to be seekable.
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Create a new counting writer wrapping the given writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Get the total number of bytes written through this writer.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Wrap `inner` as if `bytes_written` bytes had already gone through it.
    #[cfg(test)]
    pub(crate) fn starting_at(inner: W, bytes_written: u64) -> Self {
        Self {
            inner,
            bytes_written,
        }
    }

    /// Consume this wrapper and return the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
