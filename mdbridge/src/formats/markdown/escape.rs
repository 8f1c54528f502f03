//! Escaping of reserved Markdown characters in rendered text.
//!
//! Rules run in a fixed order and never revisit characters escaped by an earlier rule:
//!
//! 1. the escape character itself (`\` becomes `\\`);
//! 2. at the start of a line inside running text, the first character of a construct that
//!    would start a block: list marker, setext underline, blockquote marker, ATX marker;
//! 3. inline emphasis and code markers (`*`, `_`, `` ` ``) not already escaped by rule 2.

use once_cell::sync::Lazy;
use regex::Regex;

/// Where the text being flushed sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeContext {
    /// Inside running text (paragraph, list item, heading, cell, ...).
    pub in_line: bool,
    /// The text starts at the beginning of an output line.
    pub at_line_start: bool,
}

/// A block-start pattern and the capture group whose character gets the backslash.
struct LineStartRule {
    pattern: Regex,
    /// Escape the last character of the group instead of the first.
    escape_last: bool,
}

static LINE_START_RULES: Lazy<Vec<LineStartRule>> = Lazy::new(|| {
    let rule = |pattern: &str, escape_last: bool| LineStartRule {
        pattern: Regex::new(pattern).expect("valid line start pattern"),
        escape_last,
    };
    vec![
        // Bullet markers.
        rule(r"^[ \t]*([*+-])[ \t]+", false),
        // Ordered markers: `\1.` is not an escape in CommonMark, so escape the delimiter.
        rule(r"^[ \t]*([0-9]{1,9}[.)])(?:[ \t]+|$)", true),
        // Setext underlines.
        rule(r"^[ \t]*(=+|-+)", false),
        // Blockquotes.
        rule(r"^(>+)", false),
        // ATX headings.
        rule(r"^[ \t]*(#{1,6})(?:[ \t]|$)", false),
    ]
});

const RESERVED_INLINE: [char; 3] = ['*', '_', '`'];

/// Escape `text` for the given context.
pub fn escape(text: &str, context: EscapeContext) -> String {
    // Rule 1
    let mut out = text.replace('\\', "\\\\");

    // Rule 2
    if context.in_line && context.at_line_start {
        out = escape_line_start(&out);
    }

    // Rule 3
    escape_inline_markers(&out)
}

fn escape_line_start(text: &str) -> String {
    for rule in LINE_START_RULES.iter() {
        let Some(group) = rule.pattern.captures(text).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let position = if rule.escape_last {
            // Markers are ASCII, so the last byte starts the last character.
            group.end() - 1
        } else {
            group.start()
        };
        let mut escaped = String::with_capacity(text.len() + 1);
        escaped.push_str(&text[..position]);
        escaped.push('\\');
        escaped.push_str(&text[position..]);
        return escaped;
    }
    text.to_string()
}

fn escape_inline_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // A marker is escaped when an odd run of backslashes precedes it.
    let mut backslashes = 0usize;
    for c in text.chars() {
        if RESERVED_INLINE.contains(&c) && backslashes % 2 == 0 {
            out.push('\\');
        }
        out.push(c);
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }
    out
}

/// Remove backslash escapes in front of ASCII punctuation.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next_if(|n| n.is_ascii_punctuation()) {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LINE_START: EscapeContext = EscapeContext {
        in_line: true,
        at_line_start: true,
    };
    const MID_LINE: EscapeContext = EscapeContext {
        in_line: true,
        at_line_start: false,
    };

    #[test]
    fn backslash_is_doubled_first() {
        assert_eq!(escape(r"a\b", MID_LINE), r"a\\b");
    }

    #[test]
    fn list_markers_escaped_at_line_start_only() {
        assert_eq!(escape("* item", LINE_START), r"\* item");
        assert_eq!(escape("- item", LINE_START), r"\- item");
        assert_eq!(escape("+ item", LINE_START), r"\+ item");
        assert_eq!(escape("- item", MID_LINE), "- item");
    }

    #[test]
    fn ordered_markers_escape_the_delimiter() {
        assert_eq!(escape("1. first", LINE_START), r"1\. first");
        assert_eq!(escape("12) first", LINE_START), r"12\) first");
        assert_eq!(escape("1.5 apples", LINE_START), "1.5 apples");
    }

    #[test]
    fn setext_quote_and_heading_markers() {
        assert_eq!(escape("===", LINE_START), r"\===");
        assert_eq!(escape("--x", LINE_START), r"\--x");
        assert_eq!(escape(">> quoted", LINE_START), r"\>> quoted");
        assert_eq!(escape("# title", LINE_START), r"\# title");
        assert_eq!(escape("#hashtag", LINE_START), "#hashtag");
    }

    #[test]
    fn line_start_rules_need_running_text() {
        let block = EscapeContext {
            in_line: false,
            at_line_start: true,
        };
        assert_eq!(escape("- item", block), "- item");
    }

    #[test]
    fn inline_markers_are_escaped_once() {
        assert_eq!(escape("**bold** and _it_", MID_LINE), r"\*\*bold\*\* and \_it\_");
        assert_eq!(escape("`code`", MID_LINE), r"\`code\`");
        assert_eq!(escape("* a", LINE_START), r"\* a");
    }

    #[test]
    fn literal_backslash_before_marker() {
        assert_eq!(escape(r"\*", MID_LINE), r"\\\*");
    }

    #[test]
    fn unescape_reverses_punctuation_escapes_only() {
        assert_eq!(unescape(r"\*a\_b\\c"), r"*a_b\c");
        assert_eq!(unescape(r"\q"), r"\q");
    }

    proptest! {
        #[test]
        fn unescape_inverts_escape(
            text in r"[*_`\\\-+>=#0-9. a-z]{0,24}",
            in_line in any::<bool>(),
            at_line_start in any::<bool>(),
        ) {
            let context = EscapeContext { in_line, at_line_start };
            prop_assert_eq!(unescape(&escape(&text, context)), text);
        }
    }
}
