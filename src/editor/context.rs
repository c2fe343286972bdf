//! Line context: the line the caret sits on and its structural prefix.
//!
//! The structural prefix is the leading run of indentation, list markers,
//! checkboxes and blockquote markers that a line break should carry over.
//! It is recognised by a small hand-written scanner over this grammar,
//! anchored at the start of the line:
//!
//! ```text
//! prefix   := ws* item* colon?
//! item     := (bullet | ordinal) ws+ checkbox?  |  '>' ws*
//! bullet   := '-' | '+' | '*'
//! ordinal  := digit+ '.'
//! checkbox := '[' (' ' | 'x') ']' ws+
//! colon    := ':' ws*
//! ```

/// The current line as seen from the text before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineContext {
    /// Text of the current line up to the caret.
    pub line: String,
    /// Byte offset of the line start in the full text.
    pub line_start: usize,
    /// Leading list/quote/indent structure, `None` when the line has none.
    pub structural_prefix: Option<String>,
}

impl LineContext {
    /// Whether the line holds nothing but its structural prefix, i.e. an
    /// empty list or quote item.
    pub fn is_empty_item(&self) -> bool {
        self.structural_prefix.as_deref() == Some(self.line.as_str())
    }

    /// The last character on the line before the caret.
    pub fn last_char(&self) -> Option<char> {
        self.line.chars().next_back()
    }
}

/// Analyze the text before the caret.
pub fn analyze(before_cursor: &str) -> LineContext {
    let line_start = line_start(before_cursor);
    let line = &before_cursor[line_start..];
    let len = structural_prefix_len(line);

    LineContext {
        line: line.to_string(),
        line_start,
        structural_prefix: (len > 0).then(|| line[..len].to_string()),
    }
}

/// Byte offset just past the last newline, or 0.
pub fn line_start(text: &str) -> usize {
    text.rfind('\n').map_or(0, |i| i + 1)
}

/// Length in bytes of the structural prefix at the start of `line`.
///
/// Every byte the scanner accepts is ASCII, so the result is always a char
/// boundary.
pub(crate) fn structural_prefix_len(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut pos = skip_ws(bytes, 0);
    while let Some(end) = scan_item(bytes, pos) {
        pos = end;
    }
    if bytes.get(pos) == Some(&b':') {
        pos = skip_ws(bytes, pos + 1);
    }
    pos
}

pub(crate) const fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

pub(crate) fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_ws(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// One repeated item: a list marker with its spacing and optional checkbox,
/// or a blockquote marker. `None` when no complete item starts at `pos`.
fn scan_item(bytes: &[u8], pos: usize) -> Option<usize> {
    if *bytes.get(pos)? == b'>' {
        return Some(skip_ws(bytes, pos + 1));
    }
    let after_marker = scan_list_marker(bytes, pos)?;
    let after_ws = skip_ws(bytes, after_marker);
    if after_ws == after_marker {
        return None;
    }
    Some(scan_checkbox(bytes, after_ws).unwrap_or(after_ws))
}

/// A bullet (`-`, `+`, `*`) or an ordinal (`<digits>.`), without spacing.
pub(crate) fn scan_list_marker(bytes: &[u8], pos: usize) -> Option<usize> {
    match *bytes.get(pos)? {
        b'-' | b'+' | b'*' => Some(pos + 1),
        b if b.is_ascii_digit() => {
            let digits_end = pos + bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
            (bytes.get(digits_end) == Some(&b'.')).then_some(digits_end + 1)
        }
        _ => None,
    }
}

/// `[ ]` or `[x]` followed by at least one space or tab.
pub(crate) fn scan_checkbox(bytes: &[u8], pos: usize) -> Option<usize> {
    let token = bytes.get(pos..pos + 3)?;
    if token != b"[ ]" && token != b"[x]" {
        return None;
    }
    let end = skip_ws(bytes, pos + 3);
    (end > pos + 3).then_some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_of(line: &str) -> Option<String> {
        analyze(line).structural_prefix
    }

    #[test]
    fn test_first_line_starts_at_zero() {
        let ctx = analyze("hello");
        assert_eq!(ctx.line_start, 0);
        assert_eq!(ctx.line, "hello");
    }

    #[test]
    fn test_line_is_text_after_last_newline() {
        let ctx = analyze("one\ntwo\n- thr");
        assert_eq!(ctx.line_start, 8);
        assert_eq!(ctx.line, "- thr");
        assert_eq!(ctx.structural_prefix.as_deref(), Some("- "));
    }

    #[test]
    fn test_plain_line_has_no_prefix() {
        assert_eq!(prefix_of("hello world"), None);
        assert_eq!(prefix_of(""), None);
    }

    #[test]
    fn test_bullets() {
        assert_eq!(prefix_of("- item").as_deref(), Some("- "));
        assert_eq!(prefix_of("+\titem").as_deref(), Some("+\t"));
        assert_eq!(prefix_of("*   item").as_deref(), Some("*   "));
    }

    #[test]
    fn test_bullet_requires_spacing() {
        assert_eq!(prefix_of("-item"), None);
        assert_eq!(prefix_of("**bold**"), None);
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(prefix_of("1. foo").as_deref(), Some("1. "));
        assert_eq!(prefix_of("42.  foo").as_deref(), Some("42.  "));
        assert_eq!(prefix_of("1.5 is a number"), None);
        assert_eq!(prefix_of("12 apples"), None);
    }

    #[test]
    fn test_checkboxes() {
        assert_eq!(prefix_of("- [ ] todo").as_deref(), Some("- [ ] "));
        assert_eq!(prefix_of("- [x] done").as_deref(), Some("- [x] "));
        // No spacing after the box: only the bullet counts.
        assert_eq!(prefix_of("- [x]done").as_deref(), Some("- "));
        assert_eq!(prefix_of("- [X] done").as_deref(), Some("- "));
    }

    #[test]
    fn test_blockquotes_and_nesting() {
        assert_eq!(prefix_of("> quote").as_deref(), Some("> "));
        assert_eq!(prefix_of(">quote").as_deref(), Some(">"));
        assert_eq!(prefix_of("> > - nested").as_deref(), Some("> > - "));
        assert_eq!(prefix_of("- > mixed").as_deref(), Some("- > "));
    }

    #[test]
    fn test_leading_indentation() {
        assert_eq!(prefix_of("    code").as_deref(), Some("    "));
        assert_eq!(prefix_of("  - item").as_deref(), Some("  - "));
        assert_eq!(prefix_of("\t1. item").as_deref(), Some("\t1. "));
    }

    #[test]
    fn test_trailing_colon() {
        assert_eq!(prefix_of("- : term").as_deref(), Some("- : "));
        assert_eq!(prefix_of(": definition").as_deref(), Some(": "));
        assert_eq!(prefix_of("- a: b").as_deref(), Some("- "));
    }

    #[test]
    fn test_empty_item_detection() {
        assert!(analyze("text\n- ").is_empty_item());
        assert!(analyze("> ").is_empty_item());
        assert!(!analyze("- item").is_empty_item());
        assert!(!analyze("").is_empty_item());
    }

    #[test]
    fn test_multibyte_text_after_prefix() {
        let ctx = analyze("café\n- naïve");
        assert_eq!(ctx.line_start, 6);
        assert_eq!(ctx.structural_prefix.as_deref(), Some("- "));
        assert_eq!(ctx.last_char(), Some('e'));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prefix_is_a_prefix_of_the_line(text in "[-+*>:0-9. \\[\\]x\ta-z\n]{0,40}") {
                let ctx = analyze(&text);
                prop_assert!(text[ctx.line_start..] == ctx.line);
                if let Some(prefix) = ctx.structural_prefix {
                    prop_assert!(!prefix.is_empty());
                    prop_assert!(ctx.line.starts_with(&prefix));
                }
            }

            #[test]
            fn prefix_scan_is_idempotent(text in "[-+*>:0-9. \\[\\]x\ta-z]{0,40}") {
                let len = structural_prefix_len(&text);
                prop_assert_eq!(structural_prefix_len(&text[..len]), len);
            }
        }
    }
}
