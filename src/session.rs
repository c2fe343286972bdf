//! One editing session: options, key bindings and the history manager for a
//! single surface.

use crossterm::event::KeyEvent;

use crate::config::{Config, Options};
use crate::editor::{
    Action, BufferState, HistoryManager, KeyFacts, NewState, NullChannel, Surface, UndoChannel,
    handle_action,
};
use crate::error::Result;
use crate::input::{KeyPress, Keymap, Platform};

/// What happened to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// An action ran and its state was pushed; the host must not perform
    /// its default handling.
    Handled(Action),
    /// Nothing ran; the host handles the key itself.
    Ignored,
}

impl KeyOutcome {
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

impl From<&KeyPress> for KeyFacts {
    fn from(press: &KeyPress) -> Self {
        Self {
            shift: press.shift,
            trigger: press.as_char(),
        }
    }
}

#[derive(Debug)]
pub struct Session<S, C = NullChannel> {
    options: Options,
    keymap: Keymap,
    manager: HistoryManager<S, C>,
}

impl<S: Surface> Session<S> {
    pub fn new(surface: S, options: Options, keymap: Keymap) -> Self {
        Self::with_channel(surface, NullChannel, options, keymap)
    }

    /// Build a session from a loaded config.
    pub fn from_config(surface: S, config: &Config, platform: Platform) -> Result<Self> {
        Ok(Self::new(surface, config.options()?, config.keymap(platform)?))
    }
}

impl<S: Surface, C: UndoChannel> Session<S, C> {
    pub fn with_channel(surface: S, channel: C, options: Options, keymap: Keymap) -> Self {
        Self {
            options,
            keymap,
            manager: HistoryManager::with_channel(surface, channel),
        }
    }

    /// Resolve `press` and run the bound action.
    pub fn handle_key(&mut self, press: &KeyPress) -> Result<KeyOutcome> {
        let Some(action) = self.keymap.resolve(press) else {
            return Ok(KeyOutcome::Ignored);
        };
        if self.apply(action, KeyFacts::from(press))? {
            Ok(KeyOutcome::Handled(action))
        } else {
            Ok(KeyOutcome::Ignored)
        }
    }

    /// [`handle_key`](Self::handle_key) for a terminal key event.
    pub fn handle_event(&mut self, event: &KeyEvent) -> Result<KeyOutcome> {
        match KeyPress::from_crossterm(event) {
            Some(press) => self.handle_key(&press),
            None => Ok(KeyOutcome::Ignored),
        }
    }

    /// Run `action` against the current selection. Returns whether a state
    /// was pushed.
    pub fn apply(&mut self, action: Action, facts: KeyFacts) -> Result<bool> {
        let live = self.manager.snapshot();
        let (prefix, selection, postfix) = live.split();
        let Some(state) = handle_action(action, &self.options, prefix, selection, postfix, facts)
        else {
            return Ok(false);
        };
        tracing::debug!(%action, start = state.selection_start, "applying action");
        self.manager.push_state(&state)?;
        Ok(true)
    }

    pub fn push_state(&mut self, state: &NewState) -> Result<()> {
        self.manager.push_state(state)
    }

    pub fn native_input(&mut self) {
        self.manager.native_input();
    }

    pub fn undo(&mut self) -> bool {
        self.manager.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.manager.redo()
    }

    pub fn channel_input(&mut self) -> bool {
        self.manager.channel_input()
    }

    pub fn set_value(&mut self, text: impl Into<String>, keep_undo: bool) {
        self.manager.set_value(text, keep_undo);
    }

    pub fn value(&self) -> String {
        self.manager.value()
    }

    pub fn snapshot(&self) -> BufferState {
        self.manager.snapshot()
    }

    pub fn replace_surface(&mut self, surface: S) -> S {
        self.manager.replace_surface(surface)
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.keymap = keymap;
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub const fn manager(&self) -> &HistoryManager<S, C> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut HistoryManager<S, C> {
        &mut self.manager
    }

    pub fn surface(&self) -> &S {
        self.manager.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.manager.surface_mut()
    }
}
