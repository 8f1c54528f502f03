//! Plain text parsing
//!
//! Plain text has no markup. Blank lines separate paragraphs and every other character is
//! split into words, spaces, newlines and special symbols. The same inline tokenizer
//! re-tokenizes text nodes coming from Markdown.

use crate::ir::events::{Event, Listener};
use crate::ir::reference::Parameters;

/// Whether `c` is reported as a [`Event::SpecialSymbol`] rather than part of a word.
pub fn is_special_symbol(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Split inline text into word, space, newline and special symbol events.
pub fn tokenize_inline(text: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut word = String::new();
    let mut chars = text.chars().peekable();

    let flush = |word: &mut String, events: &mut Vec<Event>| {
        if !word.is_empty() {
            events.push(Event::word(std::mem::take(word)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {
                flush(&mut word, &mut events);
                events.push(Event::Space);
            }
            '\r' => {
                flush(&mut word, &mut events);
                chars.next_if_eq(&'\n');
                events.push(Event::NewLine);
            }
            '\n' => {
                flush(&mut word, &mut events);
                events.push(Event::NewLine);
            }
            c if is_special_symbol(c) => {
                flush(&mut word, &mut events);
                events.push(Event::special(c));
            }
            c => word.push(c),
        }
    }
    flush(&mut word, &mut events);
    events
}

/// Parse a plain text document.
pub fn parse_plain(source: &str, listener: &mut dyn Listener) {
    let metadata = Parameters::from([("syntax".to_string(), super::PLAIN_1_0.to_string())]);
    listener.on_event(&Event::BeginDocument {
        metadata: metadata.clone(),
    });

    let normalized = source.replace("\r\n", "\n");
    let mut paragraph: Vec<&str> = Vec::new();
    let mut lines = normalized.lines().peekable();
    while let Some(line) = lines.next() {
        if !line.trim().is_empty() {
            paragraph.push(line);
        }
        let at_break = line.trim().is_empty() || lines.peek().is_none();
        if at_break && !paragraph.is_empty() {
            listener.on_event(&Event::BeginParagraph);
            for event in tokenize_inline(&paragraph.join("\n")) {
                listener.on_event(&event);
            }
            listener.on_event(&Event::EndParagraph);
            paragraph.clear();
        }
    }

    listener.on_event(&Event::EndDocument { metadata });
}
