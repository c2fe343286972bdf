//! Key presses, key-combination patterns, and the combo string syntax.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::{Error, Result};

/// Named keys, in the spelling used for matching.
const NAMED_KEYS: &[&str] = &[
    "Enter",
    "Tab",
    "Escape",
    "Backspace",
    "Delete",
    "Insert",
    "Home",
    "End",
    "PageUp",
    "PageDown",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
];

/// Host platform facts that affect key bindings.
///
/// Computed once and passed to whoever parses combos, so the `cmd` alias
/// never depends on ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Platform {
    /// `cmd` means the meta key (macOS) rather than control.
    pub mac: bool,
}

impl Platform {
    /// The platform this binary was built for.
    pub const fn current() -> Self {
        Self {
            mac: cfg!(target_os = "macos"),
        }
    }

    pub const fn mac() -> Self {
        Self { mac: true }
    }

    pub const fn other() -> Self {
        Self { mac: false }
    }
}

/// A concrete key event: the key plus the state of every modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    /// A press of `key` with no modifiers.
    pub fn new(key: &str) -> Self {
        Self {
            key: canonical_key(key),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    /// A press of a character key.
    pub fn char(c: char) -> Self {
        Self::new(c.encode_utf8(&mut [0; 4]))
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub const fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// The character this key types, if it is a single character.
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Convert a terminal key event.
    ///
    /// Releases and keys with no name here (function keys, media keys)
    /// yield `None`.
    pub fn from_crossterm(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let mut shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let key = match event.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => {
                shift = true;
                "Tab".to_string()
            }
            KeyCode::Esc => "Escape".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Up => "ArrowUp".to_string(),
            KeyCode::Down => "ArrowDown".to_string(),
            KeyCode::Left => "ArrowLeft".to_string(),
            KeyCode::Right => "ArrowRight".to_string(),
            _ => return None,
        };
        Some(Self {
            key: canonical_key(&key),
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            shift,
            meta: event
                .modifiers
                .intersects(KeyModifiers::SUPER | KeyModifiers::META),
        })
    }
}

/// A binding pattern: a key plus the modifiers it constrains.
///
/// A modifier left as `None` matches either state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: String,
    pub ctrl: Option<bool>,
    pub alt: Option<bool>,
    pub shift: Option<bool>,
    pub meta: Option<bool>,
}

impl KeyCombo {
    /// A pattern for `key` with every modifier unconstrained.
    pub fn new(key: &str) -> Self {
        Self {
            key: canonical_key(key),
            ctrl: None,
            alt: None,
            shift: None,
            meta: None,
        }
    }

    /// Require shift.
    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = Some(true);
        self
    }

    /// Require the platform's command modifier: meta on macOS, control
    /// elsewhere.
    #[must_use]
    pub const fn with_cmd(mut self, platform: Platform) -> Self {
        if platform.mac {
            self.meta = Some(true);
        } else {
            self.ctrl = Some(true);
        }
        self
    }

    /// Whether `press` satisfies this pattern.
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.key == press.key
            && self.ctrl.is_none_or(|v| v == press.ctrl)
            && self.alt.is_none_or(|v| v == press.alt)
            && self.shift.is_none_or(|v| v == press.shift)
            && self.meta.is_none_or(|v| v == press.meta)
    }

    /// The press this pattern describes, with unconstrained modifiers
    /// released.
    pub fn press(&self) -> KeyPress {
        KeyPress {
            key: self.key.clone(),
            ctrl: self.ctrl == Some(true),
            alt: self.alt == Some(true),
            shift: self.shift == Some(true),
            meta: self.meta == Some(true),
        }
    }

    /// Pin every unconstrained modifier to "not held".
    pub fn complete_modifiers(&mut self) {
        for flag in [&mut self.ctrl, &mut self.alt, &mut self.shift, &mut self.meta] {
            flag.get_or_insert(false);
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (flag, name) in flags {
            if flag == Some(true) {
                write!(f, "{name}+")?;
            }
        }
        match self.key.as_str() {
            " " => f.write_str("Space"),
            key => f.write_str(key),
        }
    }
}

/// Parse a human combo string such as `"Shift+Tab"` or `"Cmd+m"`.
///
/// Modifier names are case-insensitive; `cmd` resolves to meta on macOS and
/// to control elsewhere. `"+"` and `"Ctrl++"` name the plus key itself.
pub fn parse_combo(text: &str, platform: Platform) -> Result<KeyCombo> {
    let trimmed = text.trim();
    let invalid = || Error::InvalidCombo(text.to_string());

    let (modifiers, mut key) = if trimmed == "+" {
        ("", Some("+".to_string()))
    } else if let Some(rest) = trimmed.strip_suffix("++") {
        (rest, Some("+".to_string()))
    } else {
        (trimmed, None)
    };

    let mut combo = KeyCombo::new("");
    if !modifiers.is_empty() {
        for token in modifiers.split('+').map(str::trim) {
            match token.to_ascii_lowercase().as_str() {
                "" => return Err(invalid()),
                "ctrl" | "control" => combo.ctrl = Some(true),
                "alt" | "option" => combo.alt = Some(true),
                "shift" => combo.shift = Some(true),
                "meta" => combo.meta = Some(true),
                "cmd" | "command" => combo = combo.with_cmd(platform),
                _ if key.is_some() => return Err(invalid()),
                _ => key = Some(canonical_key(token)),
            }
        }
    }

    combo.key = key.ok_or_else(invalid)?;
    Ok(combo)
}

/// Split a delimited combo list (`"Tab | Cmd+m"` or `"Tab, Cmd+m"`).
pub fn split_combos(text: &str) -> Vec<String> {
    text.split(['|', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Normalise a key name so patterns and presses compare equal.
fn canonical_key(name: &str) -> String {
    if let Some(named) = NAMED_KEYS.iter().find(|k| k.eq_ignore_ascii_case(name)) {
        return (*named).to_string();
    }
    let alias = match name.to_ascii_lowercase().as_str() {
        "esc" => Some("Escape"),
        "return" => Some("Enter"),
        "del" => Some("Delete"),
        "up" => Some("ArrowUp"),
        "down" => Some("ArrowDown"),
        "left" => Some("ArrowLeft"),
        "right" => Some("ArrowRight"),
        "space" => Some(" "),
        _ => None,
    };
    if let Some(alias) = alias {
        return alias.to_string();
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parse_combo ---

    #[test]
    fn test_parse_plain_key() {
        let combo = parse_combo("Enter", Platform::other()).unwrap();
        assert_eq!(combo, KeyCombo::new("Enter"));
    }

    #[test]
    fn test_parse_modifiers_are_case_insensitive() {
        let combo = parse_combo("SHIFT + tab", Platform::other()).unwrap();
        assert_eq!(combo.key, "Tab");
        assert_eq!(combo.shift, Some(true));
        assert_eq!(combo.ctrl, None);
    }

    #[test]
    fn test_cmd_follows_platform() {
        let mac = parse_combo("Cmd+m", Platform::mac()).unwrap();
        assert_eq!(mac.meta, Some(true));
        assert_eq!(mac.ctrl, None);

        let other = parse_combo("Cmd+m", Platform::other()).unwrap();
        assert_eq!(other.ctrl, Some(true));
        assert_eq!(other.meta, None);
    }

    #[test]
    fn test_parse_plus_key() {
        assert_eq!(parse_combo("+", Platform::other()).unwrap().key, "+");
        let combo = parse_combo("Ctrl++", Platform::other()).unwrap();
        assert_eq!(combo.key, "+");
        assert_eq!(combo.ctrl, Some(true));
    }

    #[test]
    fn test_parse_rejects_missing_or_extra_keys() {
        assert!(matches!(
            parse_combo("Ctrl+Shift", Platform::other()),
            Err(Error::InvalidCombo(_))
        ));
        assert!(parse_combo("a+b", Platform::other()).is_err());
        assert!(parse_combo("", Platform::other()).is_err());
        assert!(parse_combo("Ctrl++a", Platform::other()).is_err());
    }

    #[test]
    fn test_letters_are_lowercased() {
        let combo = parse_combo("Cmd+Shift+M", Platform::other()).unwrap();
        assert_eq!(combo.key, "m");
        assert_eq!(KeyPress::new("M").key, "m");
    }

    #[test]
    fn test_key_aliases() {
        assert_eq!(KeyCombo::new("esc").key, "Escape");
        assert_eq!(KeyCombo::new("space").key, " ");
        assert_eq!(KeyCombo::new("ENTER").key, "Enter");
    }

    // --- split_combos ---

    #[test]
    fn test_split_combos_on_either_delimiter() {
        assert_eq!(split_combos("Tab | Cmd+m"), vec!["Tab", "Cmd+m"]);
        assert_eq!(split_combos(" a , b|c "), vec!["a", "b", "c"]);
        assert!(split_combos("  ").is_empty());
    }

    // --- matching ---

    #[test]
    fn test_unset_modifiers_are_wildcards() {
        let combo = KeyCombo::new("Enter");
        assert!(combo.matches(&KeyPress::new("Enter")));
        assert!(combo.matches(&KeyPress::new("Enter").with_shift()));
        assert!(!combo.matches(&KeyPress::new("Tab")));
    }

    #[test]
    fn test_completed_modifiers_must_match_exactly() {
        let mut combo = KeyCombo::new("Tab");
        combo.complete_modifiers();
        assert!(combo.matches(&KeyPress::new("Tab")));
        assert!(!combo.matches(&KeyPress::new("Tab").with_shift()));
        assert!(!combo.matches(&KeyPress::new("Tab").with_ctrl()));
    }

    #[test]
    fn test_press_from_combo_matches_it() {
        let combo = parse_combo("Ctrl+Shift+m", Platform::other()).unwrap();
        let press = combo.press();
        assert_eq!(press, KeyPress::new("m").with_ctrl().with_shift());
        assert!(combo.matches(&press));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let combo = parse_combo("ctrl+shift+m", Platform::other()).unwrap();
        assert_eq!(combo.to_string(), "Ctrl+Shift+m");
        assert_eq!(parse_combo(&combo.to_string(), Platform::other()).unwrap(), combo);
    }

    // --- crossterm conversion ---

    #[test]
    fn test_from_crossterm_char() {
        let event = KeyEvent::new(KeyCode::Char('*'), KeyModifiers::SHIFT);
        let press = KeyPress::from_crossterm(&event).unwrap();
        assert_eq!(press.key, "*");
        assert!(press.shift);
        assert_eq!(press.as_char(), Some('*'));
    }

    #[test]
    fn test_from_crossterm_backtab_is_shift_tab() {
        let event = KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE);
        let press = KeyPress::from_crossterm(&event).unwrap();
        assert_eq!(press, KeyPress::new("Tab").with_shift());
    }

    #[test]
    fn test_from_crossterm_super_is_meta() {
        let event = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::SUPER);
        let press = KeyPress::from_crossterm(&event).unwrap();
        assert!(press.meta);
        assert!(!press.ctrl);
    }

    #[test]
    fn test_from_crossterm_ignores_unnamed_keys() {
        let event = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert!(KeyPress::from_crossterm(&event).is_none());
    }
}
