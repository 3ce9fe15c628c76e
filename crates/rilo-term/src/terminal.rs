// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window-size queries, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd access. These are
// the standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It enters raw mode via
// termios with a bounded read policy (VMIN=0, VTIME=1) so the main loop
// can poll stdin without blocking indefinitely, and guarantees the
// original attributes come back on every exit path: normal drop, error
// return, or panic mid-frame.
//
// The panic hook deserves special mention: it bypasses Rust's stdout
// lock entirely, writing a pre-built restore sequence directly to fd 1.
// This prevents deadlock if the panic happened while holding the stdout
// lock (common during frame rendering). One raw write, attributes
// restored, then the original panic handler prints its message to a
// working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails; callers
/// fall back to the cursor-position probe in that case.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Parse a DSR cursor-position report: `ESC [ rows ; cols R`.
///
/// Used by the window-size fallback: after pushing the cursor to the
/// bottom-right corner, the report's coordinates are the screen size.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R")?;
    let mut parts = body.splitn(2, |&b| b == b';');

    let rows = parse_u16(parts.next()?)?;
    let cols = parse_u16(parts.next()?)?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some(Size { cols, rows })
}

fn parse_u16(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u16 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add(u16::from(b - b'0'))?;
    }
    Some(value)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore raw mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Terminal restore sequence for emergency use: reset SGR attributes,
/// show the cursor. Everything else rilo changes is covered by the
/// termios restore.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode. The original
/// attributes are automatically restored when the handle is dropped —
/// even on panic.
///
/// Raw mode here means the full kilo-style attribute set: no input
/// translation (BRKINT, ICRNL, INPCK, ISTRIP, IXON all off), no output
/// post-processing (OPOST off), 8-bit characters (CS8), no echo /
/// canonical / extended / signal processing (ECHO, ICANON, IEXTEN, ISIG
/// off), and a bounded read policy: `VMIN=0, VTIME=1` makes `read()`
/// return after at most 100 ms with zero bytes, so the main loop can
/// poll without blocking forever.
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Whether raw mode is currently active.
    active: bool,
}

impl Terminal {
    /// Create an inactive terminal handle.
    ///
    /// Does **not** enter raw mode — call [`enter`](Self::enter) for that.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            active: false,
        }
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Installs the panic hook (once per process), captures the current
    /// attribute set, and applies the raw attributes. Idempotent: calling
    /// `enter()` while already active is a no-op. When stdin is not a TTY
    /// (tests, pipes) this is a no-op as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute get/set fails. The caller treats
    /// this as fatal — there is no partial state to protect.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;
        self.active = true;
        Ok(())
    }

    /// Leave raw mode and restore the original attributes.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    /// Read available stdin bytes into `buf`, waiting at most one VTIME
    /// tick (100 ms). Returns `Ok(0)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns an error for real read failures. Interrupted reads
    /// (`EINTR`) and would-block conditions are reported as `Ok(0)` so
    /// the main loop simply polls again.
    #[cfg(unix)]
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };

        if n >= 0 {
            #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
            return Ok(n as usize);
        }

        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(0),
            _ => Err(err),
        }
    }

    #[cfg(not(unix))]
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::Read;
        io::stdin().read(buf)
    }

    /// The terminal size, preferring `ioctl(TIOCGWINSZ)`.
    ///
    /// When the ioctl is unavailable, falls back to the VT100 probe: push
    /// the cursor to the bottom-right corner, ask for a cursor-position
    /// report, and parse the reply. The fallback requires raw mode (the
    /// reply arrives as unbuffered stdin bytes).
    ///
    /// # Errors
    ///
    /// Returns an error when both queries fail. The caller treats this as
    /// a fatal setup failure.
    pub fn window_size(&self) -> io::Result<Size> {
        if let Some(size) = get_size() {
            return Ok(size);
        }
        if self.active {
            if let Some(size) = self.probe_size()? {
                return Ok(size);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "unable to determine window size",
        ))
    }

    /// The cursor-position window-size probe.
    fn probe_size(&self) -> io::Result<Option<Size>> {
        let mut stdout = io::stdout().lock();
        ansi::cursor_to_bottom_right(&mut stdout)?;
        ansi::query_cursor(&mut stdout)?;
        stdout.flush()?;
        drop(stdout);

        // Collect the reply: ESC [ rows ; cols R. Bounded by both the
        // reply buffer size and the VTIME read timeout.
        let mut reply = Vec::with_capacity(16);
        let mut byte = [0u8; 1];
        while reply.len() < 32 {
            if self.read(&mut byte)? == 0 {
                break;
            }
            reply.push(byte[0]);
            if byte[0] == b'R' {
                break;
            }
        }

        Ok(parse_cursor_report(&reply))
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Save original for restore.
            self.original_termios = Some(termios);

            // Also save to global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100 ms even
            // with no input, so the main loop never blocks indefinitely.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
