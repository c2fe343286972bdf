//! The binding table from key combinations to actions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::combo::{KeyCombo, KeyPress, Platform, parse_combo, split_combos};
use crate::editor::Action;
use crate::error::Result;

/// Keys that pair, skip, or wrap.
pub const INLINE_KEYS: &[&str] = &[
    "\"", "'", "`", "*", "_", "[", "]", "(", ")", "{", "}", "<", ">",
];

/// Default combos for an action.
pub const fn default_combos(action: Action) -> &'static [&'static str] {
    match action {
        Action::LineBreak => &["Enter", "Shift+Enter"],
        Action::Indent => &["Tab", "Cmd+m"],
        Action::Outdent => &["Shift+Tab", "Cmd+Shift+m"],
        Action::InlineWrap => INLINE_KEYS,
    }
}

/// Combos for one action as written in a config file: a list, or a single
/// string delimited by `|` or `,`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComboList {
    Many(Vec<String>),
    Delimited(String),
}

impl ComboList {
    pub fn combos(&self) -> Vec<String> {
        match self {
            Self::Many(list) => list
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Self::Delimited(text) => split_combos(text),
        }
    }
}

/// Default patterns for an action, built directly rather than parsed.
pub fn default_patterns(action: Action, platform: Platform) -> Vec<KeyCombo> {
    match action {
        Action::LineBreak => vec![KeyCombo::new("Enter"), KeyCombo::new("Enter").with_shift()],
        Action::Indent => vec![KeyCombo::new("Tab"), KeyCombo::new("m").with_cmd(platform)],
        Action::Outdent => vec![
            KeyCombo::new("Tab").with_shift(),
            KeyCombo::new("m").with_cmd(platform).with_shift(),
        ],
        Action::InlineWrap => INLINE_KEYS.iter().copied().map(KeyCombo::new).collect(),
    }
}

type RawOverrides = BTreeMap<String, Option<ComboList>>;

/// User overrides, per action. An absent action keeps its defaults; an
/// explicit `null` (or an empty list/string) disables it. Unknown action
/// names are skipped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOverrides", into = "RawOverrides")]
pub struct KeymapConfig {
    overrides: BTreeMap<Action, Option<ComboList>>,
}

impl From<RawOverrides> for KeymapConfig {
    fn from(raw: RawOverrides) -> Self {
        let mut overrides = BTreeMap::new();
        for (name, combos) in raw {
            match Action::from_name(&name) {
                Some(action) => {
                    overrides.insert(action, combos);
                }
                None => tracing::warn!(name, "ignoring key bindings for unknown action"),
            }
        }
        Self { overrides }
    }
}

impl From<KeymapConfig> for RawOverrides {
    fn from(config: KeymapConfig) -> Self {
        config
            .overrides
            .into_iter()
            .map(|(action, combos)| (action.name().to_string(), combos))
            .collect()
    }
}

impl KeymapConfig {
    /// Replace the combos bound to `action`.
    pub fn bind<I, S>(&mut self, action: Action, combos: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = combos.into_iter().map(Into::into).collect();
        self.overrides.insert(action, Some(ComboList::Many(list)));
    }

    /// Remove every binding of `action`, defaults included.
    pub fn disable(&mut self, action: Action) {
        self.overrides.insert(action, None);
    }

    /// Whether `action` has an override (including a disabling one).
    pub fn is_overridden(&self, action: Action) -> bool {
        self.overrides.contains_key(&action)
    }

    /// Combo strings in effect for `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        match self.overrides.get(&action) {
            None => default_combos(action).iter().map(ToString::to_string).collect(),
            Some(None) => Vec::new(),
            Some(Some(list)) => list.combos(),
        }
    }

    /// Merge, with `other` winning for every action it mentions.
    pub fn union(&self, other: &Self) -> Self {
        let mut overrides = self.overrides.clone();
        overrides.extend(other.overrides.clone());
        Self { overrides }
    }
}

/// One entry of the binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub combo: KeyCombo,
    pub action: Action,
}

/// Ordered binding table; the first matching binding wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    /// Build the table from defaults plus overrides.
    ///
    /// Whenever a bare key appears in more than one binding, every binding
    /// on that key has its unset modifiers pinned to `false`, so `Tab` no
    /// longer also matches `Shift+Tab`.
    pub fn build(config: &KeymapConfig, platform: Platform) -> Result<Self> {
        let mut bindings = Vec::new();
        for action in Action::ALL {
            if !config.is_overridden(action) {
                bindings.extend(
                    default_patterns(action, platform)
                        .into_iter()
                        .map(|combo| Binding { combo, action }),
                );
                continue;
            }
            for text in config.combos_for(action) {
                bindings.push(Binding {
                    combo: parse_combo(&text, platform)?,
                    action,
                });
            }
        }
        Ok(Self::from_bindings(bindings))
    }

    /// The default table for `platform`.
    pub fn defaults(platform: Platform) -> Self {
        let bindings = Action::ALL
            .into_iter()
            .flat_map(|action| {
                default_patterns(action, platform)
                    .into_iter()
                    .map(move |combo| Binding { combo, action })
            })
            .collect();
        Self::from_bindings(bindings)
    }

    fn from_bindings(mut bindings: Vec<Binding>) -> Self {
        let mut key_counts: HashMap<String, usize> = HashMap::new();
        for binding in &bindings {
            *key_counts.entry(binding.combo.key.clone()).or_default() += 1;
        }
        for binding in &mut bindings {
            if key_counts.get(&binding.combo.key).copied().unwrap_or(0) > 1 {
                binding.combo.complete_modifiers();
            }
        }
        Self { bindings }
    }

    /// The action bound to `press`, if any.
    pub fn resolve(&self, press: &KeyPress) -> Option<Action> {
        self.bindings
            .iter()
            .find(|binding| binding.combo.matches(press))
            .map(|binding| binding.action)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Bindings of one action, in table order.
    pub fn bindings_for(&self, action: Action) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.action == action)
    }
}
