// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorBuffer)
    clippy::module_name_repetitions
)]

//! # Marktype
//!
//! Markdown-aware keystroke handling for plain text fields.
//!
//! Marktype turns a handful of keys into structured markdown edits:
//! - Enter continues lists, quotes and checkboxes, and breaks out of empty items
//! - Tab / Shift+Tab indent and outdent whole lines
//! - Quotes, brackets and emphasis markers pair up, skip, wrap or unwrap
//! - Every structured edit is an undo checkpoint; native typing coalesces
//!
//! ## Architecture
//!
//! Each key press flows through three stages:
//! - **Resolve**: [`input::Keymap`] maps the press to an [`editor::Action`]
//! - **Compute**: [`editor::handle_action`] turns the text around the
//!   selection into a new state
//! - **Record**: [`editor::HistoryManager`] commits the state, projects it onto
//!   the surface and keeps the host's undo stack in step
//!
//! ## Modules
//!
//! - [`editor`]: Line analysis, actions, history and the rope-backed buffer
//! - [`input`]: Key presses, combo strings and the binding table
//! - [`config`]: Config files and editing options
//! - [`session`]: Everything above wired to one surface

pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod session;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, Options};
    pub use crate::editor::{
        Action, BufferState, EditorBuffer, HistoryManager, KeyFacts, NewState, Surface,
        UndoChannel,
    };
    pub use crate::input::{KeyPress, Keymap, Platform};
    pub use crate::session::{KeyOutcome, Session};
}
