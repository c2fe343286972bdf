//! Keeping the surface, the undo history and the host's undo stack in step.
//!
//! Structured edits arrive as [`NewState`]s and always start a new committed
//! checkpoint. Native typing is captured after the fact and coalesces into an
//! uncommitted checkpoint until the next structured edit. Hosts that cannot
//! hand over their undo stack publish checkpoint indices into an
//! [`UndoChannel`] so that their own undo/redo lands back here.

use super::actions::NewState;
use super::history::{BufferState, History, check_selection};
use crate::error::Result;

/// A text surface the manager reads from and writes to.
pub trait Surface {
    /// Current text, selection and scroll.
    fn snapshot(&self) -> BufferState;

    /// Replace text, selection and scroll with `state`.
    fn apply(&mut self, state: &BufferState);

    /// Return input focus to the surface.
    fn focus(&mut self) {}
}

/// A side channel holding the current checkpoint index as decimal text.
pub trait UndoChannel {
    /// Start over with `index` as the only content.
    fn reset(&mut self, index: usize);

    /// Replace the content with `index` as one undoable host operation.
    fn publish(&mut self, index: usize);

    /// Whatever the channel currently holds.
    fn content(&self) -> Option<String>;
}

/// Channel for hosts that own their undo stack directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullChannel;

impl UndoChannel for NullChannel {
    fn reset(&mut self, _index: usize) {}

    fn publish(&mut self, _index: usize) {}

    fn content(&self) -> Option<String> {
        None
    }
}

/// In-memory stand-in for a host undo stack.
///
/// Every `publish` is one host operation; `native_undo` and `native_redo`
/// walk those operations the way a platform's own undo would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryChannel {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self {
            entries: vec!["0".to_string()],
            cursor: 0,
        }
    }

    /// Undo one host operation. Returns whether the content changed.
    pub fn native_undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Redo one host operation. Returns whether the content changed.
    pub fn native_redo(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Overwrite the content without recording an operation, as a stray
    /// host edit would.
    pub fn overwrite(&mut self, content: impl Into<String>) {
        self.entries[self.cursor] = content.into();
    }

    /// Number of host operations recorded, including the initial content.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoChannel for MemoryChannel {
    fn reset(&mut self, index: usize) {
        self.entries = vec![index.to_string()];
        self.cursor = 0;
    }

    fn publish(&mut self, index: usize) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(index.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn content(&self) -> Option<String> {
        self.entries.get(self.cursor).cloned()
    }
}

/// Owns a surface, its undo history and the undo side channel.
#[derive(Debug)]
pub struct HistoryManager<S, C = NullChannel> {
    surface: S,
    channel: C,
    history: History,
}

impl<S: Surface> HistoryManager<S> {
    pub fn new(surface: S) -> Self {
        Self::with_channel(surface, NullChannel)
    }
}

impl<S: Surface, C: UndoChannel> HistoryManager<S, C> {
    pub fn with_channel(surface: S, mut channel: C) -> Self {
        let history = History::new(surface.snapshot().without_nbsp());
        channel.reset(0);
        Self {
            surface,
            channel,
            history,
        }
    }

    /// Forget all checkpoints and start over from the live surface.
    pub fn reset(&mut self) {
        self.history = History::new(self.snapshot());
        self.channel.reset(0);
    }

    /// The live surface with non-breaking spaces normalised.
    pub fn snapshot(&self) -> BufferState {
        self.surface.snapshot().without_nbsp()
    }

    /// The live text with non-breaking spaces normalised.
    pub fn value(&self) -> String {
        self.snapshot().into_text()
    }

    /// Record a structured edit as a new committed checkpoint and show it.
    pub fn push_state(&mut self, state: &NewState) -> Result<()> {
        let start = state.selection_start;
        let end = state.selection_end();
        check_selection(&state.value, start, end)?;

        let live = self.snapshot();
        let (live_x, live_y) = live.scroll();
        if self.history.index() == 0 || !self.history.current().is_committed() {
            self.history.replace_current(live.with_committed(true));
        }

        let next = BufferState::new(
            state.value.clone(),
            start,
            end,
            state.scroll_x.unwrap_or(live_x),
            state.scroll_y.unwrap_or(live_y),
        )?
        .with_committed(true);
        self.history.append(next);
        self.channel.publish(self.history.index());
        tracing::debug!(
            index = self.history.index(),
            len = self.history.len(),
            "pushed checkpoint"
        );
        self.project();
        Ok(())
    }

    /// Capture whatever the host just did to the surface on its own.
    ///
    /// Nothing is recorded when the surface still shows the current
    /// checkpoint.
    pub fn native_input(&mut self) {
        let live = self.snapshot();
        if live.same_view(self.history.current()) {
            return;
        }
        if self.history.index() == 0 {
            self.history.commit_current();
        }
        if self.history.current().is_committed() {
            self.history.append(live);
            self.channel.publish(self.history.index());
            tracing::trace!(index = self.history.index(), "opened typing checkpoint");
        } else {
            self.history.replace_current(live);
            tracing::trace!(index = self.history.index(), "coalesced typing");
        }
        self.project();
    }

    /// Step back one checkpoint. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        if !self.history.step_back() {
            return false;
        }
        self.project();
        true
    }

    /// Step forward one checkpoint. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        if !self.history.step_forward() {
            return false;
        }
        self.project();
        true
    }

    /// React to the host having changed the side channel, usually through
    /// its own undo or redo.
    ///
    /// Content that is not an index into the history is ignored and the
    /// surface gets focus back.
    pub fn channel_input(&mut self) -> bool {
        let content = self.channel.content();
        let target = content
            .as_deref()
            .and_then(|text| text.trim().parse::<usize>().ok())
            .filter(|&index| index < self.history.len());
        let Some(target) = target else {
            tracing::warn!(
                content = ?content,
                len = self.history.len(),
                "ignoring undo channel content"
            );
            self.surface.focus();
            return false;
        };
        self.history.seek(target);
        self.project();
        true
    }

    /// Replace the text, caret at the end. History restarts unless
    /// `keep_undo` is set.
    pub fn set_value(&mut self, text: impl Into<String>, keep_undo: bool) {
        let text = text.into();
        let end = text.len();
        let (x, y) = self.surface.snapshot().scroll();
        self.surface.apply(&BufferState::clamped(text, end, end, x, y));
        if !keep_undo {
            self.reset();
        }
    }

    /// Bind a different surface and return the previous one.
    pub fn replace_surface(&mut self, surface: S) -> S {
        let old = std::mem::replace(&mut self.surface, surface);
        self.reset();
        old
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    fn project(&mut self) {
        self.surface.apply(self.history.current());
        self.surface.focus();
    }
}
