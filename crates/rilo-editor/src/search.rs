//! Search — incremental, directional substring search.
//!
//! Searches are literal byte matches over row *render* forms, so a query
//! matches exactly what the user sees on screen (tabs match as spaces).
//! The match's render offset is translated back to a character column by
//! the row's coordinate mapper before the cursor moves.
//!
//! # Search flow
//!
//! 1. The editor opens the search prompt and creates a [`SearchState`],
//!    capturing the cursor and scroll position for cancel-restore
//! 2. Each keystroke re-runs [`find_next`](SearchState::find_next):
//!    arrow keys pick the direction, any edit to the query resets the
//!    match state and scans from the top again
//! 3. Enter keeps the cursor on the current match; Escape restores the
//!    saved position
//!
//! One match is located per keystroke. Repeating a direction key resumes
//! the scan from the last match, wrapping around the buffer ends.

use crate::buffer::TextBuffer;

// ─── Direction ──────────────────────────────────────────────────────────────

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

// ─── SearchState ────────────────────────────────────────────────────────────

/// Transient state for one search-prompt session.
///
/// Holds the row of the last match (scan resume point), the direction,
/// and the cursor/viewport snapshot taken when the prompt opened. The
/// state is discarded when the prompt closes, whether committed or
/// cancelled.
#[derive(Debug)]
pub struct SearchState {
    /// Row of the previous match, or `None` before the first hit.
    last_match: Option<usize>,
    /// Direction for the next scan step.
    direction: SearchDirection,
    /// Cursor position when the prompt opened (for Escape restore).
    saved_cursor: (usize, usize),
    /// Scroll offsets when the prompt opened (for Escape restore).
    saved_offsets: (usize, usize),
}

impl SearchState {
    /// Open a search session, snapshotting cursor `(cx, cy)` and scroll
    /// offsets `(row_off, col_off)`.
    #[must_use]
    pub const fn new(cx: usize, cy: usize, row_off: usize, col_off: usize) -> Self {
        Self {
            last_match: None,
            direction: SearchDirection::Forward,
            saved_cursor: (cx, cy),
            saved_offsets: (row_off, col_off),
        }
    }

    /// The cursor position captured when the session opened.
    #[inline]
    #[must_use]
    pub const fn saved_cursor(&self) -> (usize, usize) {
        self.saved_cursor
    }

    /// The scroll offsets captured when the session opened.
    #[inline]
    #[must_use]
    pub const fn saved_offsets(&self) -> (usize, usize) {
        self.saved_offsets
    }

    /// Set the direction for the next scan step.
    pub fn set_direction(&mut self, direction: SearchDirection) {
        self.direction = direction;
    }

    /// Forget the last match and reset to a forward scan.
    ///
    /// Called whenever the query text changes: the next scan starts over
    /// from the top of the buffer.
    pub fn reset_match(&mut self) {
        self.last_match = None;
        self.direction = SearchDirection::Forward;
    }

    /// Locate the next match, stepping one row at a time from the last
    /// match with wraparound. Returns the match's `(row, render column)`.
    ///
    /// With no prior match the scan runs forward from row 0 regardless of
    /// the requested direction — there is nothing to step back from.
    pub fn find_next(&mut self, buffer: &TextBuffer, query: &[u8]) -> Option<(usize, usize)> {
        if query.is_empty() || buffer.is_empty() {
            return None;
        }

        let num_rows = buffer.num_rows();
        let (mut current, direction) = match self.last_match {
            Some(row) => (row, self.direction),
            None => (num_rows - 1, SearchDirection::Forward),
        };

        for _ in 0..num_rows {
            current = match direction {
                SearchDirection::Forward => (current + 1) % num_rows,
                SearchDirection::Backward => current.checked_sub(1).unwrap_or(num_rows - 1),
            };

            let row = buffer.row(current)?;
            if let Some(rx) = find_sub(row.render(), query) {
                self.last_match = Some(current);
                return Some((current, rx));
            }
        }

        None
    }
}

/// First occurrence of `needle` in `haystack`, as a byte offset.
fn find_sub(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer_from(lines: &[&str]) -> TextBuffer {
        let mut buf = TextBuffer::new();
        for (i, line) in lines.iter().enumerate() {
            buf.insert_row(i, *line);
        }
        buf
    }

    fn state() -> SearchState {
        SearchState::new(0, 0, 0, 0)
    }

    // ── Stepping and wraparound ───────────────────────────────────────

    #[test]
    fn forward_scan_walks_matches_and_wraps() {
        let buf = buffer_from(&["foo", "bar", "foobar"]);
        let mut search = state();

        assert_eq!(search.find_next(&buf, b"foo"), Some((0, 0)));
        assert_eq!(search.find_next(&buf, b"foo"), Some((2, 0)));
        // Third step wraps past the end back to row 0.
        assert_eq!(search.find_next(&buf, b"foo"), Some((0, 0)));
    }

    #[test]
    fn backward_scan_wraps_to_the_bottom() {
        let buf = buffer_from(&["foo", "bar", "foobar"]);
        let mut search = state();

        assert_eq!(search.find_next(&buf, b"foo"), Some((0, 0)));
        search.set_direction(SearchDirection::Backward);
        assert_eq!(search.find_next(&buf, b"foo"), Some((2, 0)));
        assert_eq!(search.find_next(&buf, b"foo"), Some((0, 0)));
    }

    #[test]
    fn first_scan_ignores_backward_direction() {
        let buf = buffer_from(&["alpha", "beta"]);
        let mut search = state();
        search.set_direction(SearchDirection::Backward);
        // No prior match: scan starts forward from row 0.
        assert_eq!(search.find_next(&buf, b"alpha"), Some((0, 0)));
    }

    #[test]
    fn reset_match_restarts_from_the_top() {
        let buf = buffer_from(&["x", "needle", "needle"]);
        let mut search = state();

        assert_eq!(search.find_next(&buf, b"needle"), Some((1, 0)));
        assert_eq!(search.find_next(&buf, b"needle"), Some((2, 0)));
        search.reset_match();
        assert_eq!(search.find_next(&buf, b"needle"), Some((1, 0)));
    }

    // ── Match positions ───────────────────────────────────────────────

    #[test]
    fn match_reports_render_column() {
        let buf = buffer_from(&["say hello"]);
        let mut search = state();
        assert_eq!(search.find_next(&buf, b"hello"), Some((0, 4)));
    }

    #[test]
    fn matches_against_render_form_of_tabs() {
        // "\thi" renders as 8 spaces + "hi": a query with a space matches.
        let buf = buffer_from(&["\thi"]);
        let mut search = state();
        assert_eq!(search.find_next(&buf, b" hi"), Some((0, 7)));
    }

    #[test]
    fn render_offset_translates_to_cursor_column() {
        let buf = buffer_from(&["\thi"]);
        let mut search = state();
        let (row, rx) = search.find_next(&buf, b"hi").unwrap();
        assert_eq!((row, rx), (0, 8));
        assert_eq!(buf.row(row).unwrap().rx_to_cx(rx), 1);
    }

    // ── Misses and edge cases ─────────────────────────────────────────

    #[test]
    fn no_match_returns_none_and_keeps_state() {
        let buf = buffer_from(&["aaa", "bbb"]);
        let mut search = state();
        assert_eq!(search.find_next(&buf, b"zzz"), None);
        // A later hit still scans from the top.
        assert_eq!(search.find_next(&buf, b"bbb"), Some((1, 0)));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let buf = buffer_from(&["aaa"]);
        assert_eq!(state().find_next(&buf, b""), None);
    }

    #[test]
    fn empty_buffer_matches_nothing() {
        let buf = TextBuffer::new();
        assert_eq!(state().find_next(&buf, b"x"), None);
    }

    #[test]
    fn saved_positions_survive_the_session() {
        let search = SearchState::new(3, 7, 2, 5);
        assert_eq!(search.saved_cursor(), (3, 7));
        assert_eq!(search.saved_offsets(), (2, 5));
    }
}
