//! Format trait definition
//!
//! This module defines the core Format trait that every syntax implements. Parsing pushes
//! events into a [`Listener`]; serialization consumes a complete event slice.

use crate::error::ConvertError;
use crate::ir::events::{Event, Listener};

/// Trait for document syntaxes
///
/// Implementors provide conversion between source text and the event stream.
/// A syntax can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct Shouting;
///
/// impl Format for Shouting {
///     fn name(&self) -> &str {
///         "shouting/1.0"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, events: &[Event]) -> Result<String, ConvertError> {
///         Ok(render_plain_text(events).to_uppercase())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Syntax id (e.g. "markdown/1.2", "plain/1.0")
    fn name(&self) -> &str;

    /// Optional description of this syntax
    fn description(&self) -> &str {
        ""
    }

    /// File extensions claimed by this syntax, without the leading dot.
    ///
    /// Used for automatic syntax detection from filenames, so at most one registered
    /// syntax should claim a given extension.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this syntax supports parsing (source → events)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this syntax supports serialization (events → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text, sending every event to `listener`
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &str, _listener: &mut dyn Listener) -> Result<(), ConvertError> {
        Err(ConvertError::NotSupported(format!(
            "Syntax '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a complete event stream into source text
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _events: &[Event]) -> Result<String, ConvertError> {
        Err(ConvertError::NotSupported(format!(
            "Syntax '{}' does not support serialization",
            self.name()
        )))
    }

    /// Parse source text and collect the events.
    fn parse_events(&self, source: &str) -> Result<Vec<Event>, ConvertError> {
        let mut events = Vec::new();
        self.parse(source, &mut events)?;
        Ok(events)
    }
}
