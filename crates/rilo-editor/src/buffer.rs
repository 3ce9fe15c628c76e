//! Text buffer — the ordered row store.
//!
//! A `TextBuffer` owns the sequence of [`Row`]s plus the session metadata
//! that belongs with the text: the backing filename (if any) and the
//! modified flag. Row indices are stable between mutations; insert and
//! delete shift later indices by exactly one.
//!
//! # Design choices
//!
//! - **Rows, not a rope.** Every edit touches one or two rows, the screen
//!   is painted row by row, and search scans row render forms. A flat
//!   `Vec<Row>` keeps all of that direct.
//!
//! - **The modified flag is set by every mutator** and cleared only on
//!   load and on a confirmed full save. A failed save leaves it set.
//!
//! - **Persistence is flat text**: rows joined with `\n`, trailing `\n`
//!   after the last row. The render forms never touch the disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::row::Row;

/// The text buffer: ordered rows, filename, and the modified flag.
#[derive(Debug, Default)]
pub struct TextBuffer {
    rows: Vec<Row>,
    filename: Option<PathBuf>,
    modified: bool,
}

impl TextBuffer {
    // ── Construction ────────────────────────────────────────────────

    /// Create an empty untitled buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a buffer from a file.
    ///
    /// The file is read as text and split on line boundaries; trailing
    /// `\n` / `\r\n` are stripped per line. The buffer starts unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. The caller treats
    /// this as fatal — there is nothing to edit.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let rows = text.lines().map(Row::new).collect();
        Ok(Self {
            rows,
            filename: Some(path.to_path_buf()),
            modified: false,
        })
    }

    // ── Access ──────────────────────────────────────────────────────

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when the buffer holds no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The backing file path, if the buffer has one.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Set the backing file path (used by Save-as).
    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    /// Whether the buffer has unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    // ── Row operations ──────────────────────────────────────────────

    /// Insert a row at index `at` (`0..=num_rows`). Out-of-range indices
    /// are a no-op.
    pub fn insert_row(&mut self, at: usize, text: impl Into<Vec<u8>>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(text));
        self.modified = true;
    }

    /// Delete the row at index `at`. Out-of-range indices are a no-op.
    pub fn delete_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows.remove(at);
            self.modified = true;
        }
    }

    // ── Character operations ────────────────────────────────────────

    /// Insert a character at `(cy, cx)`.
    ///
    /// `cy == num_rows` (the virtual row past the end) first appends an
    /// empty row, so typing at the bottom of the file grows the buffer.
    pub fn insert_char(&mut self, cy: usize, cx: usize, ch: char) {
        if cy == self.rows.len() {
            self.rows.push(Row::new(""));
        }
        if let Some(row) = self.rows.get_mut(cy) {
            row.insert_char(cx, ch);
            self.modified = true;
        }
    }

    /// Delete the character left of `(cy, cx)`.
    ///
    /// At `cx == 0` with `cy > 0`, the current row is joined onto the end
    /// of the previous row and removed. At the buffer start, or on the
    /// virtual row past the end, this is a no-op — a boundary edit, not
    /// an error.
    pub fn delete_char(&mut self, cy: usize, cx: usize) {
        if cy >= self.rows.len() || (cx == 0 && cy == 0) {
            return;
        }
        if cx > 0 {
            self.rows[cy].delete_char(cx - 1);
        } else {
            let joined = self.rows.remove(cy);
            self.rows[cy - 1].append_bytes(joined.chars());
        }
        self.modified = true;
    }

    /// Split the row at `(cy, cx)` into two rows (typed newline).
    ///
    /// At `cx == 0` an empty row is inserted above; otherwise the tail
    /// `[cx, len)` becomes the new row below. On the virtual row past the
    /// end an empty row is appended.
    pub fn insert_newline(&mut self, cy: usize, cx: usize) {
        if cy >= self.rows.len() {
            self.rows.push(Row::new(""));
            self.modified = true;
            return;
        }
        if cx == 0 {
            self.rows.insert(cy, Row::new(""));
        } else {
            let tail = self.rows[cy].split_off(cx);
            self.rows.insert(cy + 1, tail);
        }
        self.modified = true;
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Serialize the buffer: every row's bytes followed by `\n`.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let total: usize = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }

    /// Write the buffer to its backing file, truncating prior content.
    ///
    /// Clears the modified flag and returns the byte count only when the
    /// full write succeeds; on failure the flag stays set so the user can
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns an error when the buffer has no filename or when the
    /// create/write fails. Save failures are recoverable: the in-memory
    /// buffer is untouched.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.filename.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no filename set",
            ));
        };

        let data = self.serialize();
        let mut file = fs::File::create(&path)?;
        file.write_all(&data)?;

        self.modified = false;
        Ok(data.len())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
