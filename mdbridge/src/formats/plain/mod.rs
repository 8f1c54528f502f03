//! The `plain/1.0` syntax
//!
//! Parsing yields paragraphs of words, spaces, newlines and special symbols. Serialization
//! keeps the text and drops all markup.

use crate::error::ConvertError;
use crate::format::Format;
use crate::ir::events::{Event, Listener};

pub mod parser;
pub mod serializer;

pub use parser::tokenize_inline;
pub use serializer::{render_plain_text, PlainTextRenderer};

pub const PLAIN_1_0: &str = "plain/1.0";

/// Format implementation for plain text
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormat;

impl Format for PlainFormat {
    fn name(&self) -> &str {
        PLAIN_1_0
    }

    fn description(&self) -> &str {
        "Plain text without markup"
    }

    fn file_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, listener: &mut dyn Listener) -> Result<(), ConvertError> {
        parser::parse_plain(source, listener);
        Ok(())
    }

    fn serialize(&self, events: &[Event]) -> Result<String, ConvertError> {
        Ok(render_plain_text(events))
    }
}
