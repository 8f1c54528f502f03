//! Syntax registry for syntax discovery and selection
//!
//! This module provides a centralized registry for all available syntaxes.
//! Syntaxes are registered and retrieved by their syntax id (`markdown/1.2`, `plain/1.0`).

use crate::dialect::DialectConfig;
use crate::error::ConvertError;
use crate::format::Format;
use crate::formats::{MarkdownFormat, PlainFormat};
use crate::ir::events::{Event, Listener};
use std::collections::HashMap;

/// Registry of document syntaxes
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let events = registry.parse_events("# Title", "markdown/1.2")?;
/// let text = registry.serialize(&events, "commonmark/0.27")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a syntax
    ///
    /// If a syntax with the same id already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        tracing::trace!(syntax = format.name(), "registering syntax");
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a syntax by id
    pub fn get(&self, name: &str) -> Result<&dyn Format, ConvertError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| ConvertError::FormatNotFound(name.to_string()))
    }

    /// Check if a syntax exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available syntax ids (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect the syntax from a filename based on its extension
    ///
    /// Returns the syntax id if a matching extension is found, or None otherwise.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension))
            .map(|format| format.name().to_string())
    }

    /// Parse source text with the given syntax, sending events to `listener`
    pub fn parse(
        &self,
        source: &str,
        format: &str,
        listener: &mut dyn Listener,
    ) -> Result<(), ConvertError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(ConvertError::NotSupported(format!(
                "Syntax '{format}' does not support parsing"
            )));
        }
        fmt.parse(source, listener)
    }

    /// Parse source text with the given syntax and collect the events
    pub fn parse_events(&self, source: &str, format: &str) -> Result<Vec<Event>, ConvertError> {
        let mut events = Vec::new();
        self.parse(source, format, &mut events)?;
        Ok(events)
    }

    /// Serialize an event stream with the given syntax
    pub fn serialize(&self, events: &[Event], format: &str) -> Result<String, ConvertError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(ConvertError::NotSupported(format!(
                "Syntax '{format}' does not support serialization"
            )));
        }
        fmt.serialize(events)
    }

    /// Create a registry with the built-in Markdown dialects and plain text
    pub fn with_defaults() -> Self {
        Self::with_dialects(DialectConfig::builtin())
    }

    /// Create a registry from resolved dialect settings, plus plain text.
    ///
    /// Used when dialects were adjusted by configuration.
    pub fn with_dialects(dialects: impl IntoIterator<Item = DialectConfig>) -> Self {
        let mut registry = Self::new();
        for dialect in dialects {
            registry.register(MarkdownFormat::new(dialect));
        }
        registry.register(PlainFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
