// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — the frame assembly decides that. This
// module just knows the byte-level encoding of every terminal command rilo
// needs, which is a deliberately small VT100 subset: clear, position,
// erase-line, hide/show cursor, inverse video, and the cursor-position
// query used as a window-size fallback.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor toward the bottom-right corner (CUF 999 + CUD 999).
///
/// Both sequences clamp at the screen edge, so this lands on the last
/// cell without needing to know the screen size — which is the point:
/// it is the setup step for the [`query_cursor`] size fallback.
#[inline]
pub fn cursor_to_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The terminal replies on stdin with `ESC [ rows ; cols R`. Parsing the
/// reply is the terminal module's job.
#[inline]
pub fn query_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the current line (EL 0).
///
/// Cheaper than clearing the whole screen up front: each repainted line
/// erases only its own tail.
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Switch to inverse video (SGR 7). Used for the status bar.
#[inline]
pub fn invert(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        buf
    }

    #[test]
    fn cursor_to_converts_to_one_indexed() {
        assert_eq!(capture(|w| cursor_to(w, 0, 0)), b"\x1b[1;1H");
        assert_eq!(capture(|w| cursor_to(w, 4, 9)), b"\x1b[10;5H");
    }

    #[test]
    fn cursor_home_is_bare_cup() {
        assert_eq!(capture(cursor_home), b"\x1b[H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(capture(cursor_hide), b"\x1b[?25l");
        assert_eq!(capture(cursor_show), b"\x1b[?25h");
    }

    #[test]
    fn size_probe_sequences() {
        assert_eq!(capture(cursor_to_bottom_right), b"\x1b[999C\x1b[999B");
        assert_eq!(capture(query_cursor), b"\x1b[6n");
    }

    #[test]
    fn screen_sequences() {
        assert_eq!(capture(clear_screen), b"\x1b[2J");
        assert_eq!(capture(erase_line), b"\x1b[K");
    }

    #[test]
    fn attribute_sequences() {
        assert_eq!(capture(invert), b"\x1b[7m");
        assert_eq!(capture(reset), b"\x1b[m");
    }
}
