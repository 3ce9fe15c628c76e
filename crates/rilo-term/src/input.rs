// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into logical key events. Handles the legacy
// escape encodings every terminal emits for navigation keys:
//
// - CSI sequences (`ESC [ A..D` arrows, `ESC [ H/F` Home/End)
// - Tilde-terminated CSI (`ESC [ 1~/7~` Home, `ESC [ 4~/8~` End,
//   `ESC [ 3~` Delete, `ESC [ 5~/6~` PageUp/PageDown)
// - SS3 sequences (`ESC O H/F` Home/End from some terminals)
// - Control characters (reported as `Char` + CTRL)
// - UTF-8 multi-byte characters
//
// Note the deliberate redundancy: digit codes 1 and 7 both mean Home,
// 4 and 8 both mean End. Different terminal families emit different
// codes for the same key, so both mappings stay.
//
// # Design
//
// The parser maintains a small internal byte buffer because escape
// sequences can span multiple `read()` calls. Feed bytes with
// [`Parser::advance`], retrieve events from the returned `Vec`.
// After a read timeout with no new bytes, call [`Parser::flush`] to
// resolve a pending lone ESC as a real Escape keypress — a truncated
// sequence must never block the editor or crash it.
//
// A complete but unrecognized escape sequence also degrades to a plain
// Escape event, which the editor treats as "cancel".

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (currently only Ctrl is ever reported).
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A plain keypress with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// True when this event is Ctrl plus the given letter.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && self.code == KeyCode::Char(ch)
    }
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Compatible with the xterm CSI modifier encoding
    /// (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes parsing when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte escape sequence. The parser holds a lone
/// ESC as pending. The caller should wait for the next bounded read to
/// time out and then call [`flush`](Parser::flush) to emit the pending
/// ESC as a real Escape key event.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed raw bytes from stdin and return all events that can be parsed.
    ///
    /// Bytes that form an incomplete sequence are kept in the internal
    /// buffer and will be combined with future [`advance`](Parser::advance)
    /// calls. Call [`flush`](Parser::flush) after a timeout to resolve any
    /// pending lone ESC.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf, pos) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: remove consumed bytes, keep unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Called after a read timeout to resolve the ESC ambiguity: a lone
    /// ESC byte becomes an Escape key event, and any other leftover bytes
    /// become the events they would be outside an escape sequence.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        for &byte in &self.buf {
            let event = match byte {
                0x1B => KeyEvent::plain(KeyCode::Escape),
                0x09 => KeyEvent::plain(KeyCode::Tab),
                0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
                0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
                b @ 0x01..=0x1A => ctrl_key((b + b'a' - 1) as char),
                b @ 0x20..=0x7E => KeyEvent::plain(KeyCode::Char(b as char)),
                _ => continue,
            };
            events.push(event);
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure — they read from `buf[pos..]` and return
// what they found plus how many bytes to consume. No mutable state.

/// Result of trying to parse one event from the buffer.
enum Parsed {
    /// Successfully parsed an event, consuming `usize` bytes.
    Event(KeyEvent, usize),
    /// Sequence is incomplete — need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// A plain keypress event.
const fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::plain(code)
}

/// A Ctrl+letter keypress event.
const fn ctrl_key(ch: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(ch),
        modifiers: Modifiers::CTRL,
    }
}

/// Try to parse a single event starting at `buf[pos]`.
fn try_parse(buf: &[u8], pos: usize) -> Parsed {
    let remaining = &buf[pos..];
    if remaining.is_empty() {
        return Parsed::Skip(0);
    }

    match remaining[0] {
        // ESC — could be escape sequence or standalone Escape key.
        0x1B => parse_escape(remaining),
        // Enter first: CR and LF both mean Enter in raw mode.
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        // Remaining control characters map to Ctrl+letter.
        b @ (0x01..=0x07 | 0x0B..=0x0C | 0x0E..=0x1A) => {
            Parsed::Event(ctrl_key((b + b'a' - 1) as char), 1)
        }
        // ASCII printable.
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(b as char)), 1),
        // UTF-8 multi-byte.
        0xC0..=0xFF => parse_utf8(remaining),
        // NUL and bare continuation bytes (0x80..=0xBF) — skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        // CSI: ESC [
        b'[' => parse_csi(buf),
        // SS3: ESC O
        b'O' => parse_ss3(buf),
        // Anything else after ESC — emit standalone Escape; the second
        // byte is re-parsed on its own.
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte inside a CSI sequence — cancel.
            return Parsed::Event(press(KeyCode::Escape), 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params_raw = &buf[2..end];
    let consumed = end + 1;

    // ── Tilde-terminated sequences (editing keys) ────────────────────
    // Codes 1 and 7 are both Home, 4 and 8 are both End: different
    // terminal families emit different numbers for the same key.
    if final_byte == b'~' {
        let code = match first_param(params_raw) {
            1 | 7 => KeyCode::Home,
            4 | 8 => KeyCode::End,
            3 => KeyCode::Delete,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => KeyCode::Escape,
        };
        return Parsed::Event(press(code), consumed);
    }

    // ── Letter-final sequences ────────────────────────────────────────
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        // Unrecognized sequence — degrade to Escape (cancel).
        _ => KeyCode::Escape,
    };

    Parsed::Event(press(code), consumed)
}

/// Parse the first numeric CSI parameter, or 0 if there is none.
fn first_param(params: &[u8]) -> u32 {
    let mut value = 0u32;
    for &b in params {
        match b {
            b'0'..=b'9' => value = value.saturating_mul(10) + u32::from(b - b'0'),
            _ => break,
        }
    }
    value
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => KeyCode::Escape,
    };

    Parsed::Event(press(code), 3)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };

    if buf.len() < len {
        return Parsed::Incomplete;
    }

    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => {
            // from_utf8 on a correctly-sized slice yields exactly one char.
            s.chars().next().map_or(Parsed::Skip(len), |ch| {
                Parsed::Event(press(KeyCode::Char(ch)), len)
            })
        }
        Err(_) => Parsed::Skip(1),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
