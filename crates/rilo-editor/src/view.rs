//! View — scrolling and frame painting.
//!
//! A [`Viewport`] tracks which rectangle of the buffer is visible and
//! paints the visible rows plus the status bar into a
//! [`rilo_term::output::OutputBuffer`]. It owns only scroll state and the
//! screen extent; the buffer and cursor are passed in as parameters, and
//! the message line below the status bar belongs to the editor binary.
//!
//! The frame layout:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ text rows (`~` past the end) │  ← screen_rows
//! ├──────────────────────────────┤
//! │ status bar (inverse video)   │  ← 1 row
//! ├──────────────────────────────┤
//! │ message line                 │  ← 1 row (painted by the editor)
//! └──────────────────────────────┘
//! ```
//!
//! Painting is a full repaint, not a diff: each frame hides the cursor,
//! homes it, re-emits every visible row with an erase-to-end-of-line, and
//! the whole frame reaches the terminal in one write. `scroll` must run
//! before every frame so the cursor is always inside the painted rect.

use rilo_term::ansi;
use rilo_term::output::OutputBuffer;

use crate::buffer::TextBuffer;

/// Shown centered on an empty buffer.
const WELCOME: &str = concat!("rilo editor -- version ", env!("CARGO_PKG_VERSION"));

/// The visible window into the buffer.
///
/// `row_off`/`col_off` are the buffer row and render column at the
/// top-left corner; `screen_rows`/`screen_cols` the extent of the text
/// area (the caller reserves the status and message lines).
///
/// Setting `row_off` past the last row (e.g. to `num_rows`) acts as a
/// sentinel: the next [`scroll`](Self::scroll) clamps it back so the
/// cursor row lands at the top of the screen. Search uses this to bring
/// a far-away match into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible buffer row.
    pub row_off: usize,
    /// First visible render column.
    pub col_off: usize,
    /// Text-area height in rows.
    pub screen_rows: usize,
    /// Text-area width in columns.
    pub screen_cols: usize,
}

impl Viewport {
    /// Create a viewport at the origin with the given text-area extent.
    #[must_use]
    pub const fn new(screen_cols: usize, screen_rows: usize) -> Self {
        Self {
            row_off: 0,
            col_off: 0,
            screen_rows,
            screen_cols,
        }
    }

    /// Clamp the offsets so the cursor is visible, and return the
    /// cursor's render column.
    ///
    /// Pure state recomputation: `rx` comes from the coordinate mapper
    /// for the current row (0 on the virtual row past the end), then
    /// `row_off` and `col_off` are clamped so that afterwards
    /// `row_off <= cy < row_off + screen_rows` and
    /// `col_off <= rx < col_off + screen_cols`.
    pub fn scroll(&mut self, buffer: &TextBuffer, cx: usize, cy: usize) -> usize {
        let rx = buffer.row(cy).map_or(0, |row| row.cx_to_rx(cx));

        if cy < self.row_off {
            self.row_off = cy;
        }
        if cy >= self.row_off + self.screen_rows {
            self.row_off = cy + 1 - self.screen_rows;
        }
        if rx < self.col_off {
            self.col_off = rx;
        }
        if rx >= self.col_off + self.screen_cols {
            self.col_off = rx + 1 - self.screen_cols;
        }

        rx
    }

    // ── Painting ────────────────────────────────────────────────────

    /// Paint the visible text rows.
    ///
    /// Rows past the end of the buffer get a `~` placeholder; on a
    /// completely empty buffer the vertical-center placeholder row
    /// carries the centered welcome banner instead. Every line ends with
    /// erase-to-end-of-line, so no stale frame content survives without
    /// a full-screen clear.
    pub fn draw_rows(&self, buffer: &TextBuffer, out: &mut OutputBuffer) {
        for y in 0..self.screen_rows {
            let file_row = y + self.row_off;
            if file_row >= buffer.num_rows() {
                if buffer.is_empty() && y == self.screen_rows / 2 {
                    self.draw_welcome(out);
                } else {
                    out.push_bytes(b"~");
                }
            } else if let Some(row) = buffer.row(file_row) {
                let render = row.render();
                let start = self.col_off.min(render.len());
                let len = (render.len() - start).min(self.screen_cols);
                out.push_bytes(&render[start..start + len]);
            }

            let _ = ansi::erase_line(out);
            out.push_bytes(b"\r\n");
        }
    }

    /// The centered welcome banner, `~` in column 0, clipped to the
    /// screen width.
    fn draw_welcome(&self, out: &mut OutputBuffer) {
        let msg = &WELCOME[..WELCOME.len().min(self.screen_cols)];
        let mut padding = (self.screen_cols - msg.len()) / 2;
        if padding > 0 {
            out.push_bytes(b"~");
            padding -= 1;
        }
        for _ in 0..padding {
            out.push_bytes(b" ");
        }
        out.push_str(msg);
    }

    /// Paint the inverse-video status bar.
    ///
    /// Left side: filename (or `[No Name]`, at most 20 characters), line
    /// count, and a `(modified)` marker. Right side: current line over
    /// total lines. Space-padded, clipped to the screen width.
    pub fn draw_status_bar(&self, buffer: &TextBuffer, cy: usize, out: &mut OutputBuffer) {
        let _ = ansi::invert(out);

        // Clip by characters, not bytes, so multibyte filenames can't
        // split a char boundary.
        let name: String = buffer
            .filename()
            .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string())
            .chars()
            .take(20)
            .collect();
        let dirty = if buffer.is_modified() { " (modified)" } else { "" };

        let left = format!("{name} - {} lines{dirty}", buffer.num_rows());
        let right = format!("{}/{}", cy + 1, buffer.num_rows());

        let mut bar: String = left.chars().take(self.screen_cols).collect();
        while bar.len() < self.screen_cols {
            if self.screen_cols - bar.len() == right.len() {
                bar.push_str(&right);
            } else {
                bar.push(' ');
            }
        }
        out.push_str(&bar);

        let _ = ansi::reset(out);
        out.push_bytes(b"\r\n");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
