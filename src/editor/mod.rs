//! Markdown-aware editing on a plain text surface.
//!
//! [`actions`](handle_action) turn the text around the selection into a new
//! state for a structured edit (list continuation, indent, outdent, inline
//! pairing). [`HistoryManager`] records those states and native typing as
//! undo checkpoints and keeps a host's own undo stack in step. The analyzer
//! and prefix helpers underneath work on the line before the caret.

mod actions;
mod buffer;
mod context;
mod history;
mod prefix;
mod sync;

pub use actions::{
    Action, FENCE_PLACEHOLDER, KeyFacts, NewState, handle_action, indent, inline_wrap,
    is_closing_bracket, is_opening_bracket, line_break, outdent,
};
pub use buffer::{Cursor, Direction, EditorBuffer};
pub use context::{LineContext, analyze, line_start};
pub use history::{BufferState, History, check_selection};
pub use prefix::{increment_ordinal, is_list, strip_trailing_marker, to_indentation};
pub use sync::{HistoryManager, MemoryChannel, NullChannel, Surface, UndoChannel};
