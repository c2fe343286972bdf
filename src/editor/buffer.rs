use ropey::Rope;

use super::history::{BufferState, check_selection};
use super::sync::Surface;
use crate::error::Result;

/// Line/column position of the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text buffer backed by a rope data structure.
///
/// Plays the part of a host text field: it edits itself the way a platform
/// would for keys nobody intercepts, and exposes text, selection and scroll
/// to the history manager through [`Surface`]. The selection is a pair of
/// byte offsets; the caret sits at its end.
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    rope: Rope,
    selection_start: usize,
    selection_end: usize,
    scroll: (u32, u32),
    focus_count: usize,
}

impl EditorBuffer {
    /// Create a new buffer from a string, caret at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection_start: 0,
            selection_end: 0,
            scroll: (0, 0),
            focus_count: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// Selection as `(start, end)` byte offsets.
    pub const fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Byte offset of the caret.
    pub const fn caret(&self) -> usize {
        self.selection_end
    }

    /// Line and column of the caret.
    pub fn cursor(&self) -> Cursor {
        let line = self.rope.byte_to_line(self.caret());
        Cursor {
            line,
            col: self.caret() - self.rope.line_to_byte(line),
        }
    }

    /// Select `start..end`. Offsets must be ordered, in range and on char
    /// boundaries.
    pub fn select(&mut self, start: usize, end: usize) -> Result<()> {
        check_selection(&self.text(), start, end)?;
        self.selection_start = start;
        self.selection_end = end;
        Ok(())
    }

    /// Scroll position as `(x, y)`.
    pub const fn scroll(&self) -> (u32, u32) {
        self.scroll
    }

    pub const fn set_scroll(&mut self, x: u32, y: u32) {
        self.scroll = (x, y);
    }

    /// How many times focus was handed back to the buffer.
    pub const fn focus_count(&self) -> usize {
        self.focus_count
    }

    /// Type a character over the selection.
    pub fn insert_char(&mut self, ch: char) {
        let mut tmp = [0; 4];
        self.insert_str(ch.encode_utf8(&mut tmp));
    }

    /// Type a string over the selection, leaving the caret after it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() && self.selection_start == self.selection_end {
            return;
        }
        self.remove_selection();
        let char_idx = self.rope.byte_to_char(self.selection_start);
        self.rope.insert(char_idx, s);
        self.collapse_to(self.selection_start + s.len());
    }

    /// Delete the selection, or the character before the caret (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.remove_selection() {
            return true;
        }
        if self.caret() == 0 {
            return false;
        }
        let char_idx = self.rope.byte_to_char(self.caret());
        let prev_len = self.rope.char(char_idx - 1).len_utf8();
        self.rope.remove(char_idx - 1..char_idx);
        self.collapse_to(self.caret() - prev_len);
        true
    }

    /// Delete the selection, or the character after the caret (Delete key).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.remove_selection() {
            return true;
        }
        if self.caret() >= self.len() {
            return false;
        }
        let char_idx = self.rope.byte_to_char(self.caret());
        self.rope.remove(char_idx..=char_idx);
        true
    }

    /// Move the caret, collapsing any selection.
    ///
    /// Left and Right first collapse a selection onto its near edge.
    pub fn move_caret(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(false),
            Direction::Down => self.move_vertical(true),
        }
    }

    /// Move the caret to the beginning of its line (Home).
    pub fn move_home(&mut self) {
        let line = self.cursor().line;
        self.collapse_to(self.rope.line_to_byte(line));
    }

    /// Move the caret to the end of its line (End).
    pub fn move_end(&mut self) {
        let line = self.cursor().line;
        self.collapse_to(self.rope.line_to_byte(line) + self.line_len(line));
    }

    // --- Private helpers ---

    const fn collapse_to(&mut self, offset: usize) {
        self.selection_start = offset;
        self.selection_end = offset;
    }

    fn remove_selection(&mut self) -> bool {
        let (start, end) = self.selection();
        if start == end {
            return false;
        }
        let range = self.rope.byte_to_char(start)..self.rope.byte_to_char(end);
        self.rope.remove(range);
        self.collapse_to(start);
        true
    }

    fn move_left(&mut self) {
        let (start, end) = self.selection();
        if start != end {
            self.collapse_to(start);
        } else if start > 0 {
            let char_idx = self.rope.byte_to_char(start);
            self.collapse_to(start - self.rope.char(char_idx - 1).len_utf8());
        }
    }

    fn move_right(&mut self) {
        let (start, end) = self.selection();
        if start != end {
            self.collapse_to(end);
        } else if end < self.len() {
            let char_idx = self.rope.byte_to_char(end);
            self.collapse_to(end + self.rope.char(char_idx).len_utf8());
        }
    }

    fn move_vertical(&mut self, down: bool) {
        let Cursor { line, col } = self.cursor();
        let target = if down {
            line + 1
        } else {
            let Some(prev) = line.checked_sub(1) else {
                return;
            };
            prev
        };
        let Some(text) = self.line_at(target) else {
            return;
        };
        let mut col = col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        self.collapse_to(self.rope.line_to_byte(target) + col);
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl Surface for EditorBuffer {
    fn snapshot(&self) -> BufferState {
        let (x, y) = self.scroll;
        BufferState::clamped(self.text(), self.selection_start, self.selection_end, x, y)
    }

    fn apply(&mut self, state: &BufferState) {
        if self.rope != state.text() {
            self.rope = Rope::from_str(state.text());
        }
        self.selection_start = state.selection_start();
        self.selection_end = state.selection_end();
        self.scroll = state.scroll();
    }

    fn focus(&mut self) {
        self.focus_count += 1;
    }
}
