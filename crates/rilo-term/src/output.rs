// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// `OutputBuffer` accumulates all bytes of one frame — escape sequences and
// text alike — in memory, so the entire repaint can be written in a single
// write() syscall. This is what keeps partial frames from ever being
// visible: the terminal receives a frame atomically or not at all, no
// double buffering required.

use std::io::{self, Write};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame's output for a single `write()`.
///
/// Instead of dozens of small writes per frame (cursor moves, erase-line,
/// row text), everything goes into this buffer first. A single
/// [`flush_to`](Self::flush_to) at frame end writes it all at once.
///
/// Implements [`Write`] so the `ansi` helpers can emit straight into it.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a string slice.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the whole frame to `w` in one `write_all`, flush, and clear.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer. The buffer is cleared
    /// only on success, so a failed frame can be retried or abandoned.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
