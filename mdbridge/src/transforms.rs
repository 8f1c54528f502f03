//! Conversion pipelines
//!
//! Functional wrappers over the registry for the common cases: parse a source into events,
//! render events, or run both to move a document from one syntax to another.

use crate::dialect::DialectConfig;
use crate::error::ConvertError;
use crate::formats::markdown::{parse_markdown, render, visit};
use crate::ir::events::Event;
use crate::registry::FormatRegistry;

/// Parse Markdown in the given dialect and collect the events.
///
/// # Example
///
/// ```ignore
/// let dialect = DialectConfig::for_syntax("commonmark/0.27")?;
/// let events = parse_to_events("# Title", &dialect)?;
/// ```
pub fn parse_to_events(source: &str, dialect: &DialectConfig) -> Result<Vec<Event>, ConvertError> {
    let document = parse_markdown(source, dialect)?;
    let mut events = Vec::new();
    visit(&document, &mut events, dialect)?;
    tracing::debug!(syntax = %dialect.syntax, events = events.len(), "parsed to events");
    Ok(events)
}

/// Render events as Markdown in the given dialect.
pub fn render_events(events: &[Event], dialect: &DialectConfig) -> Result<String, ConvertError> {
    render(events, dialect)
}

/// Convert `source` from one registered syntax to another.
///
/// # Example
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let gfm = convert(&registry, "~~gone~~", "markdown/1.2", "commonmark/0.27")?;
/// assert_eq!(gfm, "<del>gone</del>");
/// ```
pub fn convert(
    registry: &FormatRegistry,
    source: &str,
    from: &str,
    to: &str,
) -> Result<String, ConvertError> {
    let events = registry.parse_events(source, from)?;
    tracing::debug!(from, to, events = events.len(), "converting");
    registry.serialize(&events, to)
}
