// SPDX-License-Identifier: MIT
//
// rilo — a tiny terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   rilo-term   → raw mode, key decoding, single-write frame output
//   rilo-editor → rows, text buffer, viewport, search
//
// The Editor struct is the controller: it owns the buffer, cursor,
// viewport, prompt mode, and status message, and dispatches every key
// event. Each keypress flows through:
//
//   stdin → parser → handle_key → buffer/cursor mutation
//   refresh_screen → viewport scroll → one frame → single write
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← h - 2 rows (painted by Viewport)
//   ├──────────────────────────────┤
//   │ status bar (inverse video)   │  ← 1 row (painted by Viewport)
//   ├──────────────────────────────┤
//   │ message / prompt line        │  ← 1 row (painted by Editor)
//   └──────────────────────────────┘
//
// Everything is single-threaded and synchronous: the only thing that
// ever suspends is the bounded terminal read (VTIME, 100 ms), which
// doubles as the escape-sequence timeout for the input parser.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use rilo_editor::buffer::TextBuffer;
use rilo_editor::row::Row;
use rilo_editor::search::{SearchDirection, SearchState};
use rilo_editor::view::Viewport;

use rilo_term::ansi;
use rilo_term::input::{KeyCode, KeyEvent, Modifiers, Parser};
use rilo_term::output::OutputBuffer;
use rilo_term::terminal::{Size, Terminal};

/// Consecutive Ctrl-Q presses required to discard unsaved changes.
const QUIT_TIMES: u8 = 3;

/// How long a status message stays visible.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Controller state ───────────────────────────────────────────────────────

/// What the controller tells the main loop after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep running.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// Active modal prompt, if any.
///
/// While a prompt is open it consumes every keystroke: printable keys
/// edit the input line, Enter commits (non-empty input required),
/// Escape cancels. The search prompt additionally reacts to arrow keys
/// (direction) and re-runs the scan after every change.
enum Prompt {
    /// "Save as:" — collect a filename for an untitled buffer.
    SaveAs { input: String },
    /// "Search:" — incremental search with live cursor movement.
    Search { input: String, state: SearchState },
}

/// A transient status message with its creation time.
struct StatusMessage {
    text: String,
    time: Instant,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// The editor session: buffer, cursor, viewport, prompt, message.
///
/// One instance per process, owned by `main` and passed nowhere else —
/// all mutation happens on the single control-flow thread.
struct Editor {
    buffer: TextBuffer,
    /// Cursor character column (byte index into the current row).
    cx: usize,
    /// Cursor row. `cy == num_rows` is the virtual row past the end.
    cy: usize,
    view: Viewport,
    message: Option<StatusMessage>,
    prompt: Option<Prompt>,
    quit_times: u8,
}

impl Editor {
    /// Create an editor with an empty untitled buffer.
    ///
    /// Two screen rows are reserved for the status bar and the message
    /// line; the viewport gets the rest.
    fn new(size: Size) -> Self {
        Self {
            buffer: TextBuffer::new(),
            cx: 0,
            cy: 0,
            view: Viewport::new(size.cols as usize, (size.rows as usize).saturating_sub(2)),
            message: None,
            prompt: None,
            quit_times: QUIT_TIMES,
        }
    }

    /// Create an editor with a buffer loaded from `path`.
    fn from_file(size: Size, path: &Path) -> io::Result<Self> {
        let mut editor = Self::new(size);
        editor.buffer = TextBuffer::from_file(path)?;
        Ok(editor)
    }

    /// Set the transient status message.
    fn set_status_message(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            time: Instant::now(),
        });
    }

    // ── Key dispatch ────────────────────────────────────────────────

    /// Handle one key event. Returns [`Action::Quit`] on a confirmed quit.
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return Action::Continue;
        }

        if key.is_ctrl('q') {
            return self.handle_quit();
        }

        if key.is_ctrl('s') {
            self.save();
        } else if key.is_ctrl('f') {
            self.open_search();
        } else if key.is_ctrl('h') {
            self.delete_back();
        } else if key.is_ctrl('l') || key.code == KeyCode::Escape {
            // Ctrl-L refresh is implicit (full repaint every frame);
            // a stray Escape is ignored.
        } else {
            match key.code {
                KeyCode::Char(ch) if !key.modifiers.contains(Modifiers::CTRL) => {
                    self.insert_char(ch);
                }
                KeyCode::Tab => self.insert_char('\t'),
                KeyCode::Enter => self.insert_newline(),
                KeyCode::Backspace => self.delete_back(),
                KeyCode::Delete => self.delete_forward(),
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                    self.move_cursor(key.code);
                }
                KeyCode::Home => self.cx = 0,
                KeyCode::End => self.cx = self.current_row_len(),
                KeyCode::PageUp | KeyCode::PageDown => self.move_page(key.code),
                _ => {}
            }
        }

        // Anything that wasn't a quit press restores the countdown.
        self.quit_times = QUIT_TIMES;
        Action::Continue
    }

    /// Ctrl-Q: quit immediately when clean, count down when modified.
    fn handle_quit(&mut self) -> Action {
        if self.buffer.is_modified() {
            self.quit_times -= 1;
            if self.quit_times > 0 {
                self.set_status_message(format!(
                    "WARNING!!! File has unsaved changes. \
                     Press Ctrl-Q {} more times to quit.",
                    self.quit_times
                ));
                return Action::Continue;
            }
        }
        Action::Quit
    }

    // ── Editing ─────────────────────────────────────────────────────

    fn insert_char(&mut self, ch: char) {
        self.buffer.insert_char(self.cy, self.cx, ch);
        self.cx += ch.len_utf8();
    }

    fn insert_newline(&mut self) {
        self.buffer.insert_newline(self.cy, self.cx);
        self.cy += 1;
        self.cx = 0;
    }

    /// Backspace: delete left of the cursor, joining lines at column 0.
    fn delete_back(&mut self) {
        if self.cy >= self.buffer.num_rows() || (self.cx == 0 && self.cy == 0) {
            return;
        }
        if self.cx > 0 {
            self.buffer.delete_char(self.cy, self.cx);
            self.cx -= 1;
        } else {
            let new_cx = self.buffer.row(self.cy - 1).map_or(0, Row::len);
            self.buffer.delete_char(self.cy, 0);
            self.cy -= 1;
            self.cx = new_cx;
        }
    }

    /// Delete: remove the character under the cursor (step right, then
    /// delete back). A no-op at the very end of the buffer.
    fn delete_forward(&mut self) {
        let last_row = self.buffer.num_rows().checked_sub(1);
        let at_end = match last_row {
            None => true,
            Some(last) => self.cy > last || (self.cy == last && self.cx >= self.current_row_len()),
        };
        if at_end {
            return;
        }
        self.move_cursor(KeyCode::Right);
        self.delete_back();
    }

    // ── Movement ────────────────────────────────────────────────────

    /// Length of the row under the cursor (0 on the virtual row).
    fn current_row_len(&self) -> usize {
        self.buffer.row(self.cy).map_or(0, Row::len)
    }

    /// One-step cursor movement with kilo semantics: Left at column 0
    /// wraps to the previous row end, Right at row end wraps to the next
    /// row start, and the column snaps to the row length when arriving
    /// on a shorter row.
    fn move_cursor(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.current_row_len();
                }
            }
            KeyCode::Right => {
                if let Some(row) = self.buffer.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            KeyCode::Up => self.cy = self.cy.saturating_sub(1),
            KeyCode::Down => {
                if self.cy < self.buffer.num_rows() {
                    self.cy += 1;
                }
            }
            _ => {}
        }

        // Snap to the end of a shorter row.
        self.cx = self.cx.min(self.current_row_len());
    }

    /// PageUp/PageDown: jump the cursor to the viewport edge, then move
    /// a full screen of rows.
    fn move_page(&mut self, code: KeyCode) {
        let (edge, step) = match code {
            KeyCode::PageUp => (self.view.row_off, KeyCode::Up),
            _ => (
                (self.view.row_off + self.view.screen_rows)
                    .saturating_sub(1)
                    .min(self.buffer.num_rows()),
                KeyCode::Down,
            ),
        };
        self.cy = edge;
        for _ in 0..self.view.screen_rows {
            self.move_cursor(step);
        }
    }

    // ── Saving ──────────────────────────────────────────────────────

    /// Ctrl-S: save in place, or open the Save-as prompt when untitled.
    fn save(&mut self) {
        if self.buffer.filename().is_none() {
            self.prompt = Some(Prompt::SaveAs {
                input: String::new(),
            });
            return;
        }
        self.do_save();
    }

    /// Write the buffer to disk and report the outcome. A failed save
    /// keeps the modified flag set so the user can retry.
    fn do_save(&mut self) {
        match self.buffer.save() {
            Ok(bytes) => self.set_status_message(format!("{bytes} bytes written to disk")),
            Err(err) => self.set_status_message(format!("Can't save! I/O error: {err}")),
        }
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Ctrl-F: open the search prompt, snapshotting cursor and scroll
    /// for Escape restore.
    fn open_search(&mut self) {
        self.prompt = Some(Prompt::Search {
            input: String::new(),
            state: SearchState::new(self.cx, self.cy, self.view.row_off, self.view.col_off),
        });
    }

    /// Run one scan step and move the cursor to the match, if any.
    ///
    /// The match's render offset comes back through `rx_to_cx` so the
    /// cursor lands on an editable character position, and `row_off` is
    /// pushed past the end so the next `scroll` recenters on the match.
    fn run_search(&mut self) {
        let Some(Prompt::Search { input, state }) = &mut self.prompt else {
            return;
        };
        if let Some((row, rx)) = state.find_next(&self.buffer, input.as_bytes()) {
            self.cy = row;
            self.cx = self.buffer.row(row).map_or(0, |r| r.rx_to_cx(rx));
            self.view.row_off = self.buffer.num_rows();
        }
    }

    // ── Prompt mode ─────────────────────────────────────────────────

    /// Handle a key while a prompt is open. The prompt consumes every
    /// keystroke until Enter or Escape closes it.
    fn handle_prompt_key(&mut self, key: KeyEvent) {
        if key.is_ctrl('h') {
            self.prompt_delete();
            return;
        }

        match key.code {
            KeyCode::Enter => self.prompt_commit(),
            KeyCode::Escape => self.prompt_cancel(),
            KeyCode::Backspace | KeyCode::Delete => self.prompt_delete(),
            KeyCode::Char(ch) if !key.modifiers.contains(Modifiers::CTRL) && !ch.is_control() => {
                if let Some(Prompt::SaveAs { input } | Prompt::Search { input, .. }) =
                    &mut self.prompt
                {
                    input.push(ch);
                }
                self.on_query_edited();
            }
            KeyCode::Left | KeyCode::Up => self.search_step(SearchDirection::Backward),
            KeyCode::Right | KeyCode::Down => self.search_step(SearchDirection::Forward),
            _ => {
                // Any other key restarts the search scan from the top.
                let searching = match &mut self.prompt {
                    Some(Prompt::Search { state, .. }) => {
                        state.reset_match();
                        true
                    }
                    _ => false,
                };
                if searching {
                    self.run_search();
                }
            }
        }
    }

    /// Enter: commit the prompt. An empty input is not accepted — the
    /// prompt stays open.
    fn prompt_commit(&mut self) {
        match self.prompt.take() {
            Some(Prompt::SaveAs { input }) => {
                if input.is_empty() {
                    self.prompt = Some(Prompt::SaveAs { input });
                } else {
                    self.buffer.set_filename(PathBuf::from(input));
                    self.do_save();
                }
            }
            // Search commit: the cursor stays on the match; the
            // session state is simply discarded.
            Some(Prompt::Search { .. }) | None => {}
        }
    }

    /// Escape: cancel the prompt. Cancelling a search restores the
    /// cursor and viewport captured when the prompt opened.
    fn prompt_cancel(&mut self) {
        match self.prompt.take() {
            Some(Prompt::SaveAs { .. }) => self.set_status_message("Save aborted"),
            Some(Prompt::Search { state, .. }) => {
                (self.cx, self.cy) = state.saved_cursor();
                (self.view.row_off, self.view.col_off) = state.saved_offsets();
            }
            None => {}
        }
    }

    /// Backspace/Delete inside a prompt: shorten the input.
    fn prompt_delete(&mut self) {
        if let Some(Prompt::SaveAs { input } | Prompt::Search { input, .. }) = &mut self.prompt {
            input.pop();
        }
        self.on_query_edited();
    }

    /// The query text changed: restart the search scan from the top.
    fn on_query_edited(&mut self) {
        let searching = match &mut self.prompt {
            Some(Prompt::Search { state, .. }) => {
                state.reset_match();
                true
            }
            _ => false,
        };
        if searching {
            self.run_search();
        }
    }

    /// Arrow key inside the search prompt: pick a direction and step.
    fn search_step(&mut self, direction: SearchDirection) {
        let searching = match &mut self.prompt {
            Some(Prompt::Search { state, .. }) => {
                state.set_direction(direction);
                true
            }
            _ => false,
        };
        if searching {
            self.run_search();
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Build one frame into `out`: scroll, text rows, status bar,
    /// message line, cursor placement. The caller flushes the buffer to
    /// the terminal in a single write.
    fn refresh_screen(&mut self, out: &mut OutputBuffer) {
        let rx = self.view.scroll(&self.buffer, self.cx, self.cy);

        let _ = ansi::cursor_hide(out);
        let _ = ansi::cursor_home(out);

        self.view.draw_rows(&self.buffer, out);
        self.view.draw_status_bar(&self.buffer, self.cy, out);
        self.draw_message_bar(out);

        #[allow(clippy::cast_possible_truncation)] // Clamped to the screen extent.
        let _ = ansi::cursor_to(
            out,
            (rx - self.view.col_off) as u16,
            (self.cy - self.view.row_off) as u16,
        );
        let _ = ansi::cursor_show(out);
    }

    /// The bottom line: the open prompt, or the status message while it
    /// is younger than [`MESSAGE_TIMEOUT`], or nothing.
    fn draw_message_bar(&self, out: &mut OutputBuffer) {
        let _ = ansi::erase_line(out);

        let text = match &self.prompt {
            Some(Prompt::SaveAs { input }) => format!("Save as: {input} (ESC to cancel)"),
            Some(Prompt::Search { input, .. }) => {
                format!("Search: {input} (Use ESC/Arrows/Enter)")
            }
            None => match &self.message {
                Some(msg) if msg.time.elapsed() < MESSAGE_TIMEOUT => msg.text.clone(),
                _ => String::new(),
            },
        };

        // Clip on a byte count; slicing the bytes sidesteps char
        // boundary panics for multibyte filenames.
        let clip = text.len().min(self.view.screen_cols);
        out.push_bytes(&text.as_bytes()[..clip]);
    }
}

// ─── Main loop ──────────────────────────────────────────────────────────────

/// Run the editor loop: repaint, bounded read, decode, dispatch.
///
/// A read timeout with pending parser bytes resolves the lone-ESC
/// ambiguity: the pending bytes flush as literal key events.
fn run(editor: &mut Editor, terminal: &Terminal) -> io::Result<()> {
    let mut parser = Parser::new();
    let mut frame = OutputBuffer::new();
    let mut buf = [0u8; 1024];

    loop {
        editor.refresh_screen(&mut frame);
        frame.flush_to(&mut io::stdout().lock())?;

        let n = terminal.read(&mut buf)?;
        let events = if n > 0 {
            parser.advance(&buf[..n])
        } else if parser.has_pending() {
            parser.flush()
        } else {
            Vec::new()
        };

        for key in events {
            if editor.handle_key(key) == Action::Quit {
                return Ok(());
            }
        }
    }
}

/// Clear the screen and restore the terminal, then report a fatal error
/// to stderr and exit with a non-zero status.
fn die(terminal: &mut Terminal, context: &str, err: &io::Error) -> ! {
    clear_screen_best_effort();
    let _ = terminal.leave();
    eprintln!("rilo: {context}: {err}");
    process::exit(1);
}

fn clear_screen_best_effort() {
    let mut stdout = io::stdout().lock();
    let _ = ansi::clear_screen(&mut stdout);
    let _ = ansi::cursor_home(&mut stdout);
    let _ = stdout.flush();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut terminal = Terminal::new();
    if let Err(err) = terminal.enter() {
        eprintln!("rilo: failed to enable raw mode: {err}");
        process::exit(1);
    }

    let size = match terminal.window_size() {
        Ok(size) => size,
        Err(err) => die(&mut terminal, "failed to get window size", &err),
    };

    let mut editor = match args.get(1) {
        Some(path) => match Editor::from_file(size, Path::new(path)) {
            Ok(editor) => editor,
            Err(err) => die(&mut terminal, path, &err),
        },
        None => Editor::new(size),
    };

    editor.set_status_message("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");

    let result = run(&mut editor, &terminal);

    clear_screen_best_effort();
    if let Err(err) = terminal.leave() {
        eprintln!("rilo: failed to restore terminal: {err}");
        process::exit(1);
    }
    if let Err(err) = result {
        eprintln!("rilo: {err}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────

    const SIZE: Size = Size { cols: 80, rows: 24 };

    fn editor() -> Editor {
        Editor::new(SIZE)
    }

    fn editor_with(lines: &[&str]) -> Editor {
        let mut ed = editor();
        for (i, line) in lines.iter().enumerate() {
            ed.buffer.insert_row(i, *line);
        }
        ed
    }

    fn press(ch: char) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(ch))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    fn type_str(ed: &mut Editor, text: &str) {
        for ch in text.chars() {
            ed.handle_key(press(ch));
        }
    }

    fn row_text(ed: &Editor, at: usize) -> String {
        String::from_utf8_lossy(ed.buffer.row(at).unwrap().chars()).into_owned()
    }

    // ── Typing and editing ────────────────────────────────────────────

    #[test]
    fn typing_inserts_and_advances_cursor() {
        let mut ed = editor();
        type_str(&mut ed, "hi");
        assert_eq!(row_text(&ed, 0), "hi");
        assert_eq!((ed.cx, ed.cy), (2, 0));
        assert!(ed.buffer.is_modified());
    }

    #[test]
    fn enter_splits_the_current_row() {
        let mut ed = editor();
        type_str(&mut ed, "hello");
        ed.cx = 2;
        ed.handle_key(key(KeyCode::Enter));
        assert_eq!(row_text(&ed, 0), "he");
        assert_eq!(row_text(&ed, 1), "llo");
        assert_eq!((ed.cx, ed.cy), (0, 1));
    }

    #[test]
    fn backspace_deletes_left() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        ed.handle_key(key(KeyCode::Backspace));
        assert_eq!(row_text(&ed, 0), "ab");
        assert_eq!(ed.cx, 2);
    }

    #[test]
    fn backspace_at_column_zero_joins_rows() {
        let mut ed = editor_with(&["hello", "world"]);
        ed.cy = 1;
        ed.cx = 0;
        ed.handle_key(key(KeyCode::Backspace));
        assert_eq!(ed.buffer.num_rows(), 1);
        assert_eq!(row_text(&ed, 0), "helloworld");
        assert_eq!((ed.cx, ed.cy), (5, 0));
    }

    #[test]
    fn backspace_at_buffer_start_is_noop() {
        let mut ed = editor_with(&["x"]);
        ed.handle_key(key(KeyCode::Backspace));
        assert_eq!(row_text(&ed, 0), "x");
    }

    #[test]
    fn delete_removes_char_under_cursor() {
        let mut ed = editor_with(&["abc"]);
        ed.cx = 1;
        ed.handle_key(key(KeyCode::Delete));
        assert_eq!(row_text(&ed, 0), "ac");
        assert_eq!(ed.cx, 1);
    }

    #[test]
    fn delete_at_row_end_joins_with_next() {
        let mut ed = editor_with(&["ab", "cd"]);
        ed.cx = 2;
        ed.handle_key(key(KeyCode::Delete));
        assert_eq!(ed.buffer.num_rows(), 1);
        assert_eq!(row_text(&ed, 0), "abcd");
    }

    #[test]
    fn delete_at_buffer_end_is_noop() {
        let mut ed = editor_with(&["ab"]);
        ed.cx = 2;
        ed.handle_key(key(KeyCode::Delete));
        assert_eq!(row_text(&ed, 0), "ab");
        assert_eq!((ed.cx, ed.cy), (2, 0));
    }

    #[test]
    fn tab_key_inserts_a_tab() {
        let mut ed = editor();
        ed.handle_key(key(KeyCode::Tab));
        assert_eq!(row_text(&ed, 0), "\t");
    }

    // ── Movement ──────────────────────────────────────────────────────

    #[test]
    fn left_at_column_zero_wraps_to_previous_row_end() {
        let mut ed = editor_with(&["abc", "d"]);
        ed.cy = 1;
        ed.handle_key(key(KeyCode::Left));
        assert_eq!((ed.cx, ed.cy), (3, 0));
    }

    #[test]
    fn right_at_row_end_wraps_to_next_row_start() {
        let mut ed = editor_with(&["ab", "cd"]);
        ed.cx = 2;
        ed.handle_key(key(KeyCode::Right));
        assert_eq!((ed.cx, ed.cy), (0, 1));
    }

    #[test]
    fn cursor_snaps_to_shorter_row() {
        let mut ed = editor_with(&["a long line", "x"]);
        ed.cx = 10;
        ed.handle_key(key(KeyCode::Down));
        assert_eq!((ed.cx, ed.cy), (1, 1));
    }

    #[test]
    fn down_stops_at_virtual_row() {
        let mut ed = editor_with(&["a"]);
        ed.handle_key(key(KeyCode::Down));
        assert_eq!(ed.cy, 1);
        ed.handle_key(key(KeyCode::Down));
        assert_eq!(ed.cy, 1);
    }

    #[test]
    fn home_and_end() {
        let mut ed = editor_with(&["hello"]);
        ed.handle_key(key(KeyCode::End));
        assert_eq!(ed.cx, 5);
        ed.handle_key(key(KeyCode::Home));
        assert_eq!(ed.cx, 0);
    }

    #[test]
    fn page_down_moves_a_screenful() {
        let lines: Vec<String> = (0..100).map(|i| format!("{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor_with(&refs);
        ed.handle_key(key(KeyCode::PageDown));
        assert!(ed.cy > 0);
        assert!(ed.cy <= ed.buffer.num_rows());
    }

    // ── Quit countdown ────────────────────────────────────────────────

    #[test]
    fn clean_buffer_quits_on_first_press() {
        let mut ed = editor();
        assert_eq!(ed.handle_key(ctrl('q')), Action::Quit);
    }

    #[test]
    fn modified_buffer_requires_three_presses() {
        let mut ed = editor();
        type_str(&mut ed, "x");
        assert_eq!(ed.handle_key(ctrl('q')), Action::Continue);
        assert_eq!(ed.handle_key(ctrl('q')), Action::Continue);
        assert_eq!(ed.handle_key(ctrl('q')), Action::Quit);
    }

    #[test]
    fn countdown_shows_a_warning() {
        let mut ed = editor();
        type_str(&mut ed, "x");
        ed.handle_key(ctrl('q'));
        let msg = ed.message.as_ref().unwrap();
        assert!(msg.text.contains("unsaved changes"));
        assert!(msg.text.contains('2'));
    }

    #[test]
    fn any_other_key_resets_the_countdown() {
        let mut ed = editor();
        type_str(&mut ed, "x");
        ed.handle_key(ctrl('q'));
        ed.handle_key(ctrl('q'));
        ed.handle_key(press('y'));
        // Countdown is back at 3: two more presses still continue.
        assert_eq!(ed.handle_key(ctrl('q')), Action::Continue);
        assert_eq!(ed.handle_key(ctrl('q')), Action::Continue);
        assert_eq!(ed.handle_key(ctrl('q')), Action::Quit);
    }

    // ── Save ──────────────────────────────────────────────────────────

    #[test]
    fn save_untitled_opens_save_as_prompt() {
        let mut ed = editor();
        type_str(&mut ed, "x");
        ed.handle_key(ctrl('s'));
        assert!(matches!(ed.prompt, Some(Prompt::SaveAs { .. })));
    }

    #[test]
    fn save_as_escape_aborts_with_message() {
        let mut ed = editor();
        ed.handle_key(ctrl('s'));
        ed.handle_key(press('f'));
        ed.handle_key(key(KeyCode::Escape));
        assert!(ed.prompt.is_none());
        assert_eq!(ed.message.as_ref().unwrap().text, "Save aborted");
        assert!(ed.buffer.filename().is_none());
    }

    #[test]
    fn save_as_empty_input_stays_open() {
        let mut ed = editor();
        ed.handle_key(ctrl('s'));
        ed.handle_key(key(KeyCode::Enter));
        assert!(ed.prompt.is_some());
    }

    #[test]
    fn save_as_commit_writes_the_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("rilo-main-test-{}", std::process::id()));
        let path_str = path.to_str().unwrap().to_string();

        let mut ed = editor();
        type_str(&mut ed, "hi");
        ed.handle_key(ctrl('s'));
        for ch in path_str.chars() {
            ed.handle_key(press(ch));
        }
        ed.handle_key(key(KeyCode::Enter));

        let written = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, b"hi\n");
        assert!(!ed.buffer.is_modified());
        assert!(ed.message.as_ref().unwrap().text.contains("bytes written"));
    }

    #[test]
    fn failed_save_reports_and_stays_modified() {
        let mut ed = editor();
        type_str(&mut ed, "x");
        ed.buffer.set_filename(PathBuf::from("/nonexistent/dir/rilo"));
        ed.handle_key(ctrl('s'));
        assert!(ed.buffer.is_modified());
        assert!(ed.message.as_ref().unwrap().text.contains("Can't save"));
    }

    // ── Search ────────────────────────────────────────────────────────

    #[test]
    fn search_moves_cursor_to_first_match() {
        let mut ed = editor_with(&["foo", "bar", "foobar"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "bar");
        assert_eq!(ed.cy, 1);
        assert_eq!(ed.cx, 0);
    }

    #[test]
    fn search_direction_keys_step_through_matches() {
        let mut ed = editor_with(&["foo", "bar", "foobar"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "foo");
        assert_eq!(ed.cy, 0);
        ed.handle_key(key(KeyCode::Right));
        assert_eq!(ed.cy, 2);
        ed.handle_key(key(KeyCode::Right));
        assert_eq!(ed.cy, 0); // wrapped
        ed.handle_key(key(KeyCode::Left));
        assert_eq!(ed.cy, 2); // backward wraps too
    }

    #[test]
    fn search_escape_restores_cursor_and_viewport() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor_with(&refs);
        ed.cx = 3;
        ed.cy = 5;
        ed.view.row_off = 2;

        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "line 90");
        assert_eq!(ed.cy, 90);

        ed.handle_key(key(KeyCode::Escape));
        assert_eq!((ed.cx, ed.cy), (3, 5));
        assert_eq!(ed.view.row_off, 2);
    }

    #[test]
    fn search_enter_keeps_cursor_on_match() {
        let mut ed = editor_with(&["alpha", "beta"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "beta");
        ed.handle_key(key(KeyCode::Enter));
        assert!(ed.prompt.is_none());
        assert_eq!(ed.cy, 1);
    }

    #[test]
    fn search_match_lands_on_editable_column_after_tab() {
        let mut ed = editor_with(&["\thi"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "hi");
        // Render offset 8 translates back to character column 1.
        assert_eq!((ed.cx, ed.cy), (1, 0));
    }

    #[test]
    fn search_forces_viewport_recenter() {
        let lines: Vec<String> = (0..100).map(|i| format!("row {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor_with(&refs);

        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "row 80");
        // The sentinel pushes row_off out of range; the next scroll
        // clamps it so the match is visible.
        let mut frame = OutputBuffer::new();
        ed.refresh_screen(&mut frame);
        assert!(ed.view.row_off <= 80);
        assert!(80 < ed.view.row_off + ed.view.screen_rows);
    }

    #[test]
    fn editing_the_query_restarts_the_scan() {
        let mut ed = editor_with(&["aa", "ab"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "a");
        assert_eq!(ed.cy, 0);
        ed.handle_key(key(KeyCode::Right));
        assert_eq!(ed.cy, 1);
        type_str(&mut ed, "b"); // query is now "ab" — scan restarts
        assert_eq!(ed.cy, 1);
        ed.handle_key(key(KeyCode::Backspace)); // back to "a", restart again
        assert_eq!(ed.cy, 0);
    }

    #[test]
    fn prompt_consumes_editing_keys() {
        let mut ed = editor_with(&["abc"]);
        ed.handle_key(ctrl('f'));
        type_str(&mut ed, "x");
        ed.handle_key(key(KeyCode::Backspace));
        // The buffer is untouched: the prompt ate every keystroke.
        assert_eq!(row_text(&ed, 0), "abc");
        assert!(ed.prompt.is_some());
    }

    // ── Frames ────────────────────────────────────────────────────────

    fn render(ed: &mut Editor) -> String {
        let mut frame = OutputBuffer::new();
        ed.refresh_screen(&mut frame);
        String::from_utf8_lossy(frame.as_bytes()).into_owned()
    }

    #[test]
    fn frame_hides_then_shows_cursor() {
        let mut ed = editor_with(&["x"]);
        let frame = render(&mut ed);
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn frame_positions_cursor_relative_to_viewport() {
        let mut ed = editor_with(&["hello"]);
        ed.cx = 3;
        let frame = render(&mut ed);
        assert!(frame.contains("\x1b[1;4H"));
    }

    #[test]
    fn frame_places_cursor_at_render_column_for_tabs() {
        let mut ed = editor_with(&["\tx"]);
        ed.cx = 1;
        let frame = render(&mut ed);
        // cx=1 is rx=8 → column 9 in 1-indexed terminal coordinates.
        assert!(frame.contains("\x1b[1;9H"));
    }

    #[test]
    fn message_bar_shows_fresh_message_only() {
        let mut ed = editor_with(&["x"]);
        ed.set_status_message("hello there");
        assert!(render(&mut ed).contains("hello there"));

        if let Some(msg) = &mut ed.message {
            if let Some(past) = Instant::now().checked_sub(Duration::from_secs(6)) {
                msg.time = past;
            }
        }
        assert!(!render(&mut ed).contains("hello there"));
    }

    #[test]
    fn prompt_is_shown_in_the_message_bar() {
        let mut ed = editor();
        ed.handle_key(ctrl('s'));
        type_str(&mut ed, "na");
        assert!(render(&mut ed).contains("Save as: na"));
    }
}
