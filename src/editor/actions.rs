//! The action engine.
//!
//! Every handler is a pure function of the buffer split around the
//! selection (`prefix`, `selection`, `postfix`) and returns the complete new
//! buffer content together with the selection to place in it. Offsets are
//! byte offsets into the new value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{analyze, line_start};
use super::prefix::{increment_ordinal, is_list, strip_trailing_marker, to_indentation};
use crate::config::Options;

/// Placeholder selected after a code fence expands, ready to be typed over.
pub const FENCE_PLACEHOLDER: &str = "language";

/// Logical editing actions a key combination can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Continue, break out of, or open a structure on Enter.
    #[serde(alias = "enter")]
    LineBreak,
    /// Indent the current line or every selected line.
    Indent,
    /// Remove one indent level from the current or selected lines.
    Outdent,
    /// Pair, skip over, or wrap with quotes, brackets and emphasis.
    #[serde(alias = "inline")]
    InlineWrap,
}

impl Action {
    /// All actions, in keymap table order.
    pub const ALL: [Self; 4] = [Self::LineBreak, Self::Indent, Self::Outdent, Self::InlineWrap];

    pub const fn name(self) -> &'static str {
        match self {
            Self::LineBreak => "lineBreak",
            Self::Indent => "indent",
            Self::Outdent => "outdent",
            Self::InlineWrap => "inlineWrap",
        }
    }

    /// Look up an action by its config name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lineBreak" | "enter" => Some(Self::LineBreak),
            "indent" => Some(Self::Indent),
            "outdent" => Some(Self::Outdent),
            "inlineWrap" | "inline" => Some(Self::InlineWrap),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Facts about the key event that triggered an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyFacts {
    /// Shift was held.
    pub shift: bool,
    /// The literal character of the key, when it produces one.
    pub trigger: Option<char>,
}

impl KeyFacts {
    pub const fn plain() -> Self {
        Self {
            shift: false,
            trigger: None,
        }
    }

    pub const fn shifted() -> Self {
        Self {
            shift: true,
            trigger: None,
        }
    }

    pub const fn typed(key: char) -> Self {
        Self {
            shift: false,
            trigger: Some(key),
        }
    }
}

/// The result of an action: new content plus selection and scroll.
///
/// `selection_end` defaults to `selection_start` (a collapsed caret) and the
/// scroll position defaults to wherever the surface currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewState {
    pub value: String,
    pub selection_start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_end: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<u32>,
}

impl NewState {
    /// A state with a collapsed caret at `at`.
    pub const fn caret(value: String, at: usize) -> Self {
        Self {
            value,
            selection_start: at,
            selection_end: None,
            scroll_x: None,
            scroll_y: None,
        }
    }

    /// A state selecting `start..end`.
    pub const fn range(value: String, start: usize, end: usize) -> Self {
        Self {
            value,
            selection_start: start,
            selection_end: Some(end),
            scroll_x: None,
            scroll_y: None,
        }
    }

    #[must_use]
    pub const fn with_scroll(mut self, x: u32, y: u32) -> Self {
        self.scroll_x = Some(x);
        self.scroll_y = Some(y);
        self
    }

    /// Effective end of the selection.
    pub fn selection_end(&self) -> usize {
        self.selection_end.unwrap_or(self.selection_start)
    }

    /// The selected text, if the offsets are valid for the value.
    pub fn selected_text(&self) -> Option<&str> {
        self.value.get(self.selection_start..self.selection_end())
    }
}

/// Run `action` over the buffer split around the selection.
///
/// Returns `None` when the action cannot apply to the event, i.e. an inline
/// wrap triggered by a key that is not a single character.
pub fn handle_action(
    action: Action,
    options: &Options,
    prefix: &str,
    selection: &str,
    postfix: &str,
    facts: KeyFacts,
) -> Option<NewState> {
    match action {
        Action::LineBreak => Some(line_break(options, prefix, selection, postfix, facts.shift)),
        Action::Indent => Some(indent(options, prefix, selection, postfix)),
        Action::Outdent => Some(outdent(options, prefix, selection, postfix)),
        Action::InlineWrap => facts
            .trigger
            .map(|key| inline_wrap(prefix, selection, postfix, key)),
    }
}

/// Enter: continue the list or quote the caret is in, break out of an empty
/// item, or open an indented block after an opening bracket.
pub fn line_break(
    options: &Options,
    prefix: &str,
    selection: &str,
    postfix: &str,
    shift: bool,
) -> NewState {
    let mut head = prefix.to_string();
    let mut tail = postfix.to_string();

    if !selection.is_empty() {
        head.push('\n');
        let caret = head.len();
        head.push_str(postfix);
        return NewState::caret(head, caret);
    }

    let ctx = analyze(prefix);
    if ctx.last_char().is_some_and(is_opening_bracket) {
        let base = ctx
            .structural_prefix
            .as_deref()
            .map(|p| to_indentation(p, true))
            .unwrap_or_default();
        tail = format!("\n{base}{postfix}");
        if !shift {
            head.push('\n');
            head.push_str(&base);
            head.push_str(options.indent_unit());
        }
    } else if let Some(structure) = ctx.structural_prefix.as_deref() {
        let at_item_end = postfix.is_empty() || postfix.starts_with('\n');
        if !shift && ctx.is_empty_item() && at_item_end {
            head.truncate(ctx.line_start);
            head.push_str(&strip_trailing_marker(structure));
        } else if !shift && is_list(structure) {
            head.push('\n');
            head.push_str(&increment_ordinal(structure));
        } else {
            head.push('\n');
            head.push_str(&to_indentation(structure, shift));
        }
    } else {
        head.push('\n');
    }

    let caret = head.len();
    head.push_str(&tail);
    NewState::caret(head, caret)
}

/// Tab: indent whole lines. A caret inside a line indents that line and
/// keeps the caret on the same character.
pub fn indent(options: &Options, prefix: &str, selection: &str, postfix: &str) -> NewState {
    let unit = options.indent_unit();
    let line_start = line_start(prefix);
    let head = &prefix[..line_start];
    let region = format!("{}{selection}", &prefix[line_start..]);

    let mut start = prefix.len();
    if line_start < prefix.len() || selection.is_empty() {
        start += unit.len();
    }

    if region.is_empty() {
        return NewState::caret(format!("{head}{unit}{postfix}"), start);
    }

    let region = indent_lines(&region, unit);
    let end = line_start + region.len();
    NewState::range(format!("{head}{region}{postfix}"), start, end)
}

/// Shift+Tab: remove one indent unit from the start of each touched line.
pub fn outdent(options: &Options, prefix: &str, selection: &str, postfix: &str) -> NewState {
    let unit = options.indent_unit();
    let line_start = line_start(prefix);
    let head = &prefix[..line_start];
    let region = format!("{}{selection}", &prefix[line_start..]);

    let mut start = prefix.len();
    if line_start < prefix.len() && region.starts_with(unit) {
        start = start.saturating_sub(unit.len()).max(line_start);
    }

    let region = outdent_lines(&region, unit);
    let end = line_start + region.len();
    NewState::range(format!("{head}{region}{postfix}"), start, end)
}

/// Quotes, brackets and emphasis: skip over an existing closer, expand a
/// code fence, unwrap an empty pair, or wrap the selection.
pub fn inline_wrap(prefix: &str, selection: &str, postfix: &str, key: char) -> NewState {
    let at = prefix.len();
    let width = key.len_utf8();
    let before = prefix.chars().next_back();
    let after = postfix.chars().next();

    if selection.is_empty() && !is_opening_bracket(key) && after == Some(key) {
        let doubled = if is_emphasis(key) {
            format!("{key}{key}")
        } else {
            String::new()
        };
        return NewState::caret(format!("{prefix}{doubled}{postfix}"), at + width);
    }

    if selection.is_empty()
        && ((key == '\'' && !before.is_some_and(opens_quote)) || is_closing_bracket(key))
    {
        return NewState::caret(format!("{prefix}{key}{postfix}"), at + width);
    }

    if selection.is_empty() && is_fence(key) && prefix.ends_with(&format!("{key}{key}")) {
        let fence = key.to_string().repeat(3);
        let newline = if postfix.starts_with('\n') { "" } else { "\n" };
        let value = format!("{prefix}{key}{FENCE_PLACEHOLDER}\n{fence}{newline}{postfix}");
        let start = at + width;
        return NewState::range(value, start, start + FENCE_PLACEHOLDER.len());
    }

    if before == Some(key) && after == Some(key) {
        let start = at - width;
        let value = format!("{}{selection}{}", &prefix[..start], &postfix[width..]);
        return NewState::range(value, start, start + selection.len());
    }

    let open = opening_counterpart(key);
    let close = closing_counterpart(key);
    let start = at + open.len_utf8();
    NewState::range(
        format!("{prefix}{open}{selection}{close}{postfix}"),
        start,
        start + selection.len(),
    )
}

fn indent_lines(region: &str, unit: &str) -> String {
    let mut out = String::with_capacity(region.len() + unit.len());
    for line in region.split_inclusive('\n') {
        out.push_str(unit);
        out.push_str(line);
    }
    out
}

fn outdent_lines(region: &str, unit: &str) -> String {
    region
        .split_inclusive('\n')
        .map(|line| line.strip_prefix(unit).unwrap_or(line))
        .collect()
}

pub const fn is_opening_bracket(c: char) -> bool {
    matches!(c, '[' | '(' | '{' | '<')
}

pub const fn is_closing_bracket(c: char) -> bool {
    matches!(c, ']' | ')' | '}' | '>')
}

const fn is_emphasis(c: char) -> bool {
    matches!(c, '*' | '_')
}

const fn is_fence(c: char) -> bool {
    matches!(c, '`' | '~')
}

/// Characters after which a `'` starts a quotation rather than closing one
/// or forming an apostrophe.
fn opens_quote(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '='
                | '"'
                | '\''
                | '`'
                | '<'
                | '>'
                | '['
                | ']'
                | '('
                | ')'
                | '{'
                | '}'
                | '+'
                | '*'
                | '^'
                | '$'
                | '\\'
                | '.'
                | '|'
        )
}

const fn opening_counterpart(c: char) -> char {
    match c {
        ']' => '[',
        ')' => '(',
        '}' => '{',
        '>' => '<',
        other => other,
    }
}

const fn closing_counterpart(c: char) -> char {
    match c {
        '[' => ']',
        '(' => ')',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}
