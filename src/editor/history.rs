//! Buffer states and the linear undo history built from them.

use serde::Serialize;

use crate::error::{Error, Result};

const NBSP: char = '\u{a0}';

/// A snapshot of the surface: text, selection and scroll position.
///
/// Offsets are byte offsets and always satisfy
/// `selection_start <= selection_end <= text.len()` on char boundaries.
/// `committed` marks a finished undo checkpoint; an uncommitted state is
/// still absorbing native typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferState {
    text: String,
    selection_start: usize,
    selection_end: usize,
    scroll_x: u32,
    scroll_y: u32,
    committed: bool,
}

impl BufferState {
    /// Build an uncommitted state, rejecting invalid selections.
    pub fn new(
        text: impl Into<String>,
        selection_start: usize,
        selection_end: usize,
        scroll_x: u32,
        scroll_y: u32,
    ) -> Result<Self> {
        let text = text.into();
        check_selection(&text, selection_start, selection_end)?;
        Ok(Self {
            text,
            selection_start,
            selection_end,
            scroll_x,
            scroll_y,
            committed: false,
        })
    }

    /// A state with a collapsed caret and no scroll.
    pub fn caret(text: impl Into<String>, at: usize) -> Result<Self> {
        Self::new(text, at, at, 0, 0)
    }

    /// Build a state from whatever a host surface reports, pulling the
    /// offsets back into range instead of failing.
    pub fn clamped(
        text: impl Into<String>,
        selection_start: usize,
        selection_end: usize,
        scroll_x: u32,
        scroll_y: u32,
    ) -> Self {
        let text = text.into();
        let end = floor_char_boundary(&text, selection_end);
        let start = floor_char_boundary(&text, selection_start).min(end);
        Self {
            text,
            selection_start: start,
            selection_end: end,
            scroll_x,
            scroll_y,
            committed: false,
        }
    }

    #[must_use]
    pub fn with_committed(mut self, committed: bool) -> Self {
        self.committed = committed;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub const fn selection_start(&self) -> usize {
        self.selection_start
    }

    pub const fn selection_end(&self) -> usize {
        self.selection_end
    }

    pub const fn scroll(&self) -> (u32, u32) {
        (self.scroll_x, self.scroll_y)
    }

    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Same text, selection and scroll, whatever the committed flag.
    pub fn same_view(&self, other: &Self) -> bool {
        self.text == other.text
            && self.selection_start == other.selection_start
            && self.selection_end == other.selection_end
            && self.scroll_x == other.scroll_x
            && self.scroll_y == other.scroll_y
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selection_start..self.selection_end]
    }

    /// The text split into (before selection, selection, after selection).
    pub fn split(&self) -> (&str, &str, &str) {
        (
            &self.text[..self.selection_start],
            &self.text[self.selection_start..self.selection_end],
            &self.text[self.selection_end..],
        )
    }

    /// Replace non-breaking spaces with plain spaces, shifting the selection
    /// to match the shorter text.
    #[must_use]
    pub fn without_nbsp(self) -> Self {
        if !self.text.contains(NBSP) {
            return self;
        }
        let shrink = NBSP.len_utf8() - 1;
        let shift = |offset: usize| {
            let before = self
                .text
                .char_indices()
                .take_while(|&(i, _)| i < offset)
                .filter(|&(_, c)| c == NBSP)
                .count();
            offset - before * shrink
        };
        let selection_start = shift(self.selection_start);
        let selection_end = shift(self.selection_end);
        Self {
            text: self.text.replace(NBSP, " "),
            selection_start,
            selection_end,
            ..self
        }
    }
}

/// Validate a selection against `text`.
pub fn check_selection(text: &str, start: usize, end: usize) -> Result<()> {
    let valid = start <= end
        && end <= text.len()
        && text.is_char_boundary(start)
        && text.is_char_boundary(end);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSelection {
            start,
            end,
            len: text.len(),
        })
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Linear undo history: checkpoints plus a cursor.
///
/// Never empty. Appending while the cursor is not at the end drops the redo
/// branch first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<BufferState>,
    index: usize,
}

#[allow(clippy::len_without_is_empty)]
impl History {
    pub fn new(initial: BufferState) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &BufferState {
        &self.entries[self.index]
    }

    pub fn get(&self, index: usize) -> Option<&BufferState> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[BufferState] {
        &self.entries
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Overwrite the checkpoint under the cursor.
    pub fn replace_current(&mut self, state: BufferState) {
        self.entries[self.index] = state;
    }

    /// Mark the checkpoint under the cursor as committed.
    pub fn commit_current(&mut self) {
        self.entries[self.index].committed = true;
    }

    /// Drop the redo branch, append `state`, and move the cursor onto it.
    pub fn append(&mut self, state: BufferState) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state);
        self.index = self.entries.len() - 1;
    }

    /// Move the cursor to `index`. Out-of-range targets are refused.
    pub fn seek(&mut self, index: usize) -> Option<&BufferState> {
        if index >= self.entries.len() {
            return None;
        }
        self.index = index;
        Some(self.current())
    }

    pub fn step_back(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn step_forward(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> BufferState {
        BufferState::caret(text, text.len()).unwrap()
    }

    // --- BufferState ---

    #[test]
    fn test_new_state_is_uncommitted() {
        let s = BufferState::new("hello", 1, 3, 0, 0).unwrap();
        assert!(!s.is_committed());
        assert_eq!(s.selected_text(), "el");
        assert_eq!(s.split(), ("h", "el", "lo"));
    }

    #[test]
    fn test_rejects_reversed_selection() {
        let err = BufferState::new("hello", 3, 1, 0, 0).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSelection {
                start: 3,
                end: 1,
                len: 5
            }
        );
    }

    #[test]
    fn test_rejects_selection_past_end() {
        assert!(BufferState::caret("abc", 4).is_err());
    }

    #[test]
    fn test_rejects_offset_inside_char() {
        assert!(BufferState::caret("é", 1).is_err());
        assert!(BufferState::caret("é", 2).is_ok());
    }

    #[test]
    fn test_clamped_repairs_offsets() {
        let s = BufferState::clamped("é!", 9, 1, 0, 0);
        assert_eq!(s.selection_start(), 0);
        assert_eq!(s.selection_end(), 3);
    }

    #[test]
    fn test_without_nbsp_shifts_offsets() {
        let s = BufferState::new("a\u{a0}b\u{a0}c", 4, 6, 0, 0).unwrap();
        assert_eq!(s.selected_text(), "\u{a0}c");
        let s = s.without_nbsp();
        assert_eq!(s.text(), "a b c");
        assert_eq!(s.selected_text(), " c");
    }

    #[test]
    fn test_same_view_ignores_committed_flag() {
        let s = BufferState::new("abc", 1, 2, 0, 3).unwrap();
        assert!(s.same_view(&s.clone().with_committed(true)));
        assert!(!s.same_view(&BufferState::new("abc", 1, 2, 0, 4).unwrap()));
        assert!(!s.same_view(&BufferState::new("abc", 1, 1, 0, 3).unwrap()));
    }

    // --- History ---

    #[test]
    fn test_new_history_has_one_entry() {
        let h = History::new(state("a"));
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_append_moves_cursor() {
        let mut h = History::new(state("a"));
        h.append(state("ab"));
        h.append(state("abc"));
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), 2);
        assert_eq!(h.current().text(), "abc");
    }

    #[test]
    fn test_append_after_undo_drops_redo_branch() {
        let mut h = History::new(state("a"));
        h.append(state("ab"));
        h.append(state("abc"));
        assert!(h.step_back());
        assert!(h.step_back());
        h.append(state("x"));
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(h.current().text(), "x");
    }

    #[test]
    fn test_steps_stop_at_bounds() {
        let mut h = History::new(state("a"));
        h.append(state("b"));
        assert!(!h.step_forward());
        assert!(h.step_back());
        assert!(!h.step_back());
        assert_eq!(h.index(), 0);
    }

    #[test]
    fn test_seek_refuses_out_of_range() {
        let mut h = History::new(state("a"));
        h.append(state("b"));
        assert!(h.seek(5).is_none());
        assert_eq!(h.index(), 1);
        assert_eq!(h.seek(0).map(BufferState::text), Some("a"));
    }

    #[test]
    fn test_commit_current() {
        let mut h = History::new(state("a"));
        h.commit_current();
        assert!(h.current().is_committed());
    }
}
