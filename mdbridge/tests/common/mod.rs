//! Shared helpers for the integration tests

use mdbridge::{parse_to_events, render_events, DialectConfig, Event};
use std::path::PathBuf;

pub fn dialect(syntax: &str) -> DialectConfig {
    DialectConfig::for_syntax(syntax).unwrap()
}

/// Events of `source` without the document begin/end pair.
pub fn body_events(source: &str, syntax: &str) -> Vec<Event> {
    let events = parse_to_events(source, &dialect(syntax)).unwrap();
    events[1..events.len() - 1].to_vec()
}

pub fn render(source: &str, from: &str, to: &str) -> String {
    let events = parse_to_events(source, &dialect(from)).unwrap();
    render_events(&events, &dialect(to)).unwrap()
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read fixture {}: {err}", path.display()))
}
