//! Transforms applied to a structural prefix when continuing or leaving a
//! list or quote.

use super::context::{is_ws, scan_checkbox, scan_list_marker, skip_ws};

/// Characters that make up list markers and checkboxes.
const fn is_list_marker_char(c: char) -> bool {
    matches!(c, '-' | '+' | '*' | '[' | ']' | 'x' | '.') || c.is_ascii_digit()
}

/// Replace marker characters with spaces, preserving width.
///
/// With `pure == false` only list markers and checkboxes are blanked, so
/// blockquote and colon markers carry over to the next line. With
/// `pure == true` everything except spaces and tabs is blanked.
pub fn to_indentation(prefix: &str, pure: bool) -> String {
    prefix
        .chars()
        .map(|c| {
            let blank = if pure {
                c != ' ' && c != '\t'
            } else {
                is_list_marker_char(c)
            };
            if blank { ' ' } else { c }
        })
        .collect()
}

/// Bump the ordinal that ends the prefix: `"1. "` becomes `"2. "`.
///
/// Only an ordinal followed by nothing but spacing is touched, so a
/// checkbox item (`"1. [ ] "`) keeps its number.
pub fn increment_ordinal(prefix: &str) -> String {
    let bytes = prefix.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if !bytes[pos].is_ascii_digit() {
            pos += 1;
            continue;
        }
        let digits_end = pos + bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        let spacing = digits_end + 1;
        let ends_in_spacing = bytes.get(digits_end) == Some(&b'.')
            && spacing < bytes.len()
            && bytes[spacing..].iter().all(|&b| is_ws(b));
        if ends_in_spacing {
            let Some(next) = prefix[pos..digits_end]
                .parse::<u64>()
                .ok()
                .and_then(|n| n.checked_add(1))
            else {
                return prefix.to_string();
            };
            return format!("{}{next}{}", &prefix[..pos], &prefix[digits_end..]);
        }
        pos = digits_end;
    }
    prefix.to_string()
}

/// Drop the last marker token from the end of the prefix.
///
/// When that token is the first one on the line its leading indentation
/// goes too, and a prefix of bare indentation strips to nothing.
pub fn strip_trailing_marker(prefix: &str) -> String {
    let bytes = prefix.as_bytes();
    for start in 0..bytes.len() {
        let token_start = if start == 0 { skip_ws(bytes, 0) } else { start };
        if token_start == bytes.len() || is_trailing_token(bytes, token_start) {
            return prefix[..start].to_string();
        }
    }
    prefix.to_string()
}

/// Whether the prefix ends in a bullet or ordinal list marker, optionally
/// followed by a checkbox.
pub fn is_list(prefix: &str) -> bool {
    let bytes = prefix.as_bytes();
    (0..bytes.len()).any(|pos| {
        let Some(after_marker) = scan_list_marker(bytes, pos) else {
            return false;
        };
        let after_ws = skip_ws(bytes, after_marker);
        after_ws > after_marker
            && (after_ws == bytes.len() || scan_checkbox(bytes, after_ws) == Some(bytes.len()))
    })
}

/// A single marker at `pos` (bullet, ordinal, `>` or `:`) with optional
/// checkbox, running through trailing spacing to the end of `bytes`.
fn is_trailing_token(bytes: &[u8], pos: usize) -> bool {
    let after_marker = match bytes.get(pos) {
        Some(b'>' | b':') => pos + 1,
        Some(_) => match scan_list_marker(bytes, pos) {
            Some(end) => end,
            None => return false,
        },
        None => return false,
    };
    let after_ws = skip_ws(bytes, after_marker);
    if after_ws == bytes.len() {
        return true;
    }
    after_ws > after_marker
        && matches!(bytes.get(after_ws..after_ws + 3), Some(b"[ ]" | b"[x]"))
        && skip_ws(bytes, after_ws + 3) == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- to_indentation ---

    #[test]
    fn test_to_indentation_blanks_list_markers() {
        assert_eq!(to_indentation("- ", false), "  ");
        assert_eq!(to_indentation("12. [x] ", false), "        ");
    }

    #[test]
    fn test_to_indentation_keeps_quote_markers_unless_pure() {
        assert_eq!(to_indentation("> - ", false), ">   ");
        assert_eq!(to_indentation("> - ", true), "    ");
        assert_eq!(to_indentation(": ", false), ": ");
    }

    #[test]
    fn test_to_indentation_preserves_tabs_and_width() {
        assert_eq!(to_indentation("\t- ", true), "\t  ");
        let prefix = "  > 1. [ ] ";
        assert_eq!(to_indentation(prefix, true).len(), prefix.len());
        assert_eq!(to_indentation(prefix, false).len(), prefix.len());
    }

    // --- increment_ordinal ---

    #[test]
    fn test_increment_ordinal() {
        assert_eq!(increment_ordinal("1. "), "2. ");
        assert_eq!(increment_ordinal("9.\t"), "10.\t");
        assert_eq!(increment_ordinal("  > 41.  "), "  > 42.  ");
    }

    #[test]
    fn test_increment_only_touches_trailing_ordinal() {
        assert_eq!(increment_ordinal("1. 2. "), "1. 3. ");
        assert_eq!(increment_ordinal("1. - "), "1. - ");
    }

    #[test]
    fn test_increment_leaves_non_ordinals_alone() {
        assert_eq!(increment_ordinal("- "), "- ");
        assert_eq!(increment_ordinal("1. [ ] "), "1. [ ] ");
        assert_eq!(increment_ordinal("1."), "1.");
        assert_eq!(increment_ordinal(""), "");
    }

    #[test]
    fn test_increment_drops_leading_zeros() {
        assert_eq!(increment_ordinal("007. "), "8. ");
    }

    #[test]
    fn test_increment_overflow_is_left_unchanged() {
        let prefix = "18446744073709551615. ";
        assert_eq!(increment_ordinal(prefix), prefix);
    }

    // --- strip_trailing_marker ---

    #[test]
    fn test_strip_single_marker() {
        assert_eq!(strip_trailing_marker("- "), "");
        assert_eq!(strip_trailing_marker("1. "), "");
        assert_eq!(strip_trailing_marker("> "), "");
        assert_eq!(strip_trailing_marker("- [ ] "), "");
    }

    #[test]
    fn test_strip_takes_indentation_of_first_marker() {
        assert_eq!(strip_trailing_marker("    - "), "");
        assert_eq!(strip_trailing_marker("    "), "");
    }

    #[test]
    fn test_strip_only_last_of_nested_markers() {
        assert_eq!(strip_trailing_marker("> - "), "> ");
        assert_eq!(strip_trailing_marker("> > "), "> ");
        assert_eq!(strip_trailing_marker("  - - "), "  - ");
        assert_eq!(strip_trailing_marker("- : "), "- ");
        assert_eq!(strip_trailing_marker("10. 11. "), "10. ");
    }

    #[test]
    fn test_strip_without_marker_is_unchanged() {
        assert_eq!(strip_trailing_marker(""), "");
        assert_eq!(strip_trailing_marker("abc"), "abc");
    }

    // --- is_list ---

    #[test]
    fn test_is_list() {
        assert!(is_list("- "));
        assert!(is_list("3. "));
        assert!(is_list("- [x] "));
        assert!(is_list("> - "));
        assert!(is_list("  * "));
    }

    #[test]
    fn test_is_not_list() {
        assert!(!is_list("> "));
        assert!(!is_list("    "));
        assert!(!is_list("- > "));
        assert!(!is_list("- : "));
        assert!(!is_list("-"));
    }
}
