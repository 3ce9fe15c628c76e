//! Row — one logical line of text plus its derived render form.
//!
//! A `Row` stores the line's raw bytes (`chars`, never containing a
//! newline) and a derived `render` form in which every tab is expanded to
//! 1–8 spaces so the next render column lands on a multiple of the tab
//! stop. The render form is what the screen and the search scan see; the
//! raw form is what gets edited and saved.
//!
//! # Coordinate mapping
//!
//! `cx` indexes `chars`, `rx` indexes `render`. They diverge only where
//! tabs appear, and `rx >= cx` always (tabs only expand). The two
//! directions — [`cx_to_rx`](Row::cx_to_rx) and [`rx_to_cx`](Row::rx_to_cx)
//! — must agree exactly: that is what lets a search match found in the
//! render form be translated back into an editable cursor position.
//!
//! # Render invariant
//!
//! `render` is recomputed wholesale from `chars` after every mutation.
//! The draw path never observes a stale render form, and there is no
//! partial patching to get wrong.

/// Tab stop width: tabs expand to the next multiple of this column.
pub const TAB_STOP: usize = 8;

/// One line of buffer text plus its tab-expanded render form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Raw line bytes, no embedded newline.
    chars: Vec<u8>,
    /// Derived display bytes: `chars` with tabs expanded to spaces.
    render: Vec<u8>,
}

impl Row {
    /// Create a row from raw line bytes.
    #[must_use]
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        let mut row = Self {
            chars: text.into(),
            render: Vec::new(),
        };
        row.update_render();
        row
    }

    /// The raw line bytes.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The render form: `chars` with tabs expanded to spaces.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Length of the raw line in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when the row holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    // ── Coordinate mapping ──────────────────────────────────────────

    /// Convert a character column to a render column.
    ///
    /// Walks `chars[..cx]`, advancing one render column per byte and
    /// jumping to the next tab stop for each tab.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for &b in self.chars.iter().take(cx) {
            if b == b'\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    /// Convert a render column back to a character column.
    ///
    /// Inverse of [`cx_to_rx`](Self::cx_to_rx): walks the raw bytes
    /// accumulating render width with the same tab rule until the
    /// accumulated width passes `rx`. A render column past the end of the
    /// row maps to the row length.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &b) in self.chars.iter().enumerate() {
            if b == b'\t' {
                cur_rx += (TAB_STOP - 1) - (cur_rx % TAB_STOP);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }

    // ── Mutation ────────────────────────────────────────────────────
    //
    // Every mutator recomputes the render form before returning.

    /// Insert a character's UTF-8 bytes at byte position `at`.
    ///
    /// Positions past the end clamp to an append.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let at = at.min(self.chars.len());
        let mut encoded = [0u8; 4];
        let bytes = ch.encode_utf8(&mut encoded).as_bytes();
        self.chars.splice(at..at, bytes.iter().copied());
        self.update_render();
    }

    /// Delete the byte at position `at`. Out-of-range positions are a no-op.
    pub fn delete_char(&mut self, at: usize) {
        if at < self.chars.len() {
            self.chars.remove(at);
            self.update_render();
        }
    }

    /// Append raw bytes to the end of the row (line join).
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.chars.extend_from_slice(bytes);
        self.update_render();
    }

    /// Split the row at byte position `at`, keeping `[0, at)` and
    /// returning the tail `[at, len)` as a new row.
    #[must_use]
    pub fn split_off(&mut self, at: usize) -> Self {
        let at = at.min(self.chars.len());
        let tail = self.chars.split_off(at);
        self.update_render();
        Self::new(tail)
    }

    /// Recompute `render` from `chars`: every tab becomes 1–8 spaces,
    /// ending on a multiple of [`TAB_STOP`].
    fn update_render(&mut self) {
        let tabs = self.chars.iter().filter(|&&b| b == b'\t').count();
        let mut render = Vec::with_capacity(self.chars.len() + tabs * (TAB_STOP - 1));
        for &b in &self.chars {
            if b == b'\t' {
                render.push(b' ');
                while render.len() % TAB_STOP != 0 {
                    render.push(b' ');
                }
            } else {
                render.push(b);
            }
        }
        self.render = render;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
