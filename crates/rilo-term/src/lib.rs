// SPDX-License-Identifier: MIT
//
// rilo-term — Terminal layer for rilo.
//
// Everything that touches the terminal device lives here: raw-mode
// termios control with panic-safe restore, window-size queries (ioctl
// with a cursor-position fallback), the byte-stream → key-event parser,
// and the frame output buffer that turns a whole repaint into a single
// write() syscall.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. The editor speaks a small, fixed VT100
// vocabulary — clear, position, erase-line, hide/show cursor, inverse
// video — and every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;
