//! Keymap resolution: from a physical key press to a logical action.
//!
//! Bindings are written as human combo strings (`"Shift+Tab"`, `"Cmd+m"`),
//! parsed once into [`KeyCombo`] patterns, and matched against incoming
//! [`KeyPress`] events in table order.

mod combo;
mod keymap;

pub use combo::{KeyCombo, KeyPress, Platform, parse_combo, split_combos};
pub use keymap::{
    Binding, ComboList, INLINE_KEYS, Keymap, KeymapConfig, default_combos, default_patterns,
};
