//! Defines the flat event stream representation of a document.
//!
//! Parsing a document produces a sequence of [`Event`]s delivered to a [`Listener`];
//! rendering consumes the same sequence. Container constructs come as begin/end pairs that
//! must nest properly, everything else is an atomic event.

use crate::error::ConvertError;
use crate::ir::reference::{Parameters, ResourceReference};
use serde::Serialize;
use std::fmt;

/// Inline formatting span kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Bold,
    Italic,
    Underlined,
    Strikeout,
    Superscript,
    Subscript,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bulleted,
    Numbered,
}

/// Represents a single event in the document stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    BeginDocument {
        metadata: Parameters,
    },
    EndDocument {
        metadata: Parameters,
    },
    BeginParagraph,
    EndParagraph,
    BeginHeader {
        level: u8,
        id: String,
    },
    EndHeader {
        level: u8,
        id: String,
    },
    BeginFormat {
        format: FormatKind,
    },
    EndFormat {
        format: FormatKind,
    },
    BeginList {
        list: ListType,
    },
    EndList {
        list: ListType,
    },
    BeginListItem,
    EndListItem,
    BeginDefinitionList,
    EndDefinitionList,
    BeginDefinitionTerm,
    EndDefinitionTerm,
    BeginDefinitionDescription,
    EndDefinitionDescription,
    BeginQuotation,
    EndQuotation,
    BeginQuotationLine,
    EndQuotationLine,
    BeginLink {
        reference: ResourceReference,
        free_standing: bool,
        parameters: Parameters,
    },
    EndLink {
        reference: ResourceReference,
        free_standing: bool,
        parameters: Parameters,
    },
    Image {
        reference: ResourceReference,
        free_standing: bool,
        parameters: Parameters,
    },
    BeginTable {
        parameters: Parameters,
    },
    EndTable {
        parameters: Parameters,
    },
    BeginTableRow,
    EndTableRow,
    BeginTableCell {
        parameters: Parameters,
    },
    EndTableCell {
        parameters: Parameters,
    },
    BeginTableHeadCell {
        parameters: Parameters,
    },
    EndTableHeadCell {
        parameters: Parameters,
    },
    Word {
        text: String,
    },
    Space,
    NewLine,
    SpecialSymbol {
        symbol: char,
    },
    RawText {
        text: String,
        syntax: String,
    },
    Macro {
        id: String,
        parameters: Parameters,
        content: Option<String>,
        inline: bool,
    },
    HorizontalLine {
        parameters: Parameters,
    },
    Verbatim {
        text: String,
        inline: bool,
        parameters: Parameters,
    },
}

/// Position of an event within a begin/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Begin,
    End,
    Atomic,
}

impl Event {
    pub fn word(text: impl Into<String>) -> Self {
        Event::Word { text: text.into() }
    }

    pub fn special(symbol: char) -> Self {
        Event::SpecialSymbol { symbol }
    }

    pub fn raw_html(text: impl Into<String>) -> Self {
        Event::RawText {
            text: text.into(),
            syntax: HTML_SYNTAX.to_string(),
        }
    }

    /// Name of the construct this event opens, closes or represents.
    pub fn construct(&self) -> &'static str {
        match self {
            Event::BeginDocument { .. } | Event::EndDocument { .. } => "document",
            Event::BeginParagraph | Event::EndParagraph => "paragraph",
            Event::BeginHeader { .. } | Event::EndHeader { .. } => "header",
            Event::BeginFormat { .. } | Event::EndFormat { .. } => "format",
            Event::BeginList { .. } | Event::EndList { .. } => "list",
            Event::BeginListItem | Event::EndListItem => "list item",
            Event::BeginDefinitionList | Event::EndDefinitionList => "definition list",
            Event::BeginDefinitionTerm | Event::EndDefinitionTerm => "definition term",
            Event::BeginDefinitionDescription | Event::EndDefinitionDescription => {
                "definition description"
            }
            Event::BeginQuotation | Event::EndQuotation => "quotation",
            Event::BeginQuotationLine | Event::EndQuotationLine => "quotation line",
            Event::BeginLink { .. } | Event::EndLink { .. } => "link",
            Event::BeginTable { .. } | Event::EndTable { .. } => "table",
            Event::BeginTableRow | Event::EndTableRow => "table row",
            Event::BeginTableCell { .. } | Event::EndTableCell { .. } => "table cell",
            Event::BeginTableHeadCell { .. } | Event::EndTableHeadCell { .. } => {
                "table head cell"
            }
            Event::Image { .. } => "image",
            Event::Word { .. } => "word",
            Event::Space => "space",
            Event::NewLine => "newline",
            Event::SpecialSymbol { .. } => "special symbol",
            Event::RawText { .. } => "raw text",
            Event::Macro { .. } => "macro",
            Event::HorizontalLine { .. } => "horizontal line",
            Event::Verbatim { .. } => "verbatim",
        }
    }

    pub fn boundary(&self) -> Boundary {
        match self {
            Event::BeginDocument { .. }
            | Event::BeginParagraph
            | Event::BeginHeader { .. }
            | Event::BeginFormat { .. }
            | Event::BeginList { .. }
            | Event::BeginListItem
            | Event::BeginDefinitionList
            | Event::BeginDefinitionTerm
            | Event::BeginDefinitionDescription
            | Event::BeginQuotation
            | Event::BeginQuotationLine
            | Event::BeginLink { .. }
            | Event::BeginTable { .. }
            | Event::BeginTableRow
            | Event::BeginTableCell { .. }
            | Event::BeginTableHeadCell { .. } => Boundary::Begin,
            Event::EndDocument { .. }
            | Event::EndParagraph
            | Event::EndHeader { .. }
            | Event::EndFormat { .. }
            | Event::EndList { .. }
            | Event::EndListItem
            | Event::EndDefinitionList
            | Event::EndDefinitionTerm
            | Event::EndDefinitionDescription
            | Event::EndQuotation
            | Event::EndQuotationLine
            | Event::EndLink { .. }
            | Event::EndTable { .. }
            | Event::EndTableRow
            | Event::EndTableCell { .. }
            | Event::EndTableHeadCell { .. } => Boundary::End,
            _ => Boundary::Atomic,
        }
    }

    /// Whether this event may only appear inside running text.
    pub fn is_inline(&self) -> bool {
        match self {
            Event::BeginFormat { .. }
            | Event::EndFormat { .. }
            | Event::BeginLink { .. }
            | Event::EndLink { .. }
            | Event::Image { .. }
            | Event::Word { .. }
            | Event::Space
            | Event::NewLine
            | Event::SpecialSymbol { .. } => true,
            Event::Macro { inline, .. } | Event::Verbatim { inline, .. } => *inline,
            _ => false,
        }
    }
}

/// Syntax hint for raw HTML fragments.
pub const HTML_SYNTAX: &str = "html/5.0";

/// Check that begin/end events nest properly.
pub fn validate_balance(events: &[Event]) -> Result<(), ConvertError> {
    let mut open: Vec<&'static str> = Vec::new();
    for (index, event) in events.iter().enumerate() {
        match event.boundary() {
            Boundary::Begin => open.push(event.construct()),
            Boundary::End => match open.pop() {
                Some(expected) if expected == event.construct() => {}
                Some(expected) => {
                    return Err(ConvertError::UnbalancedEvents(format!(
                        "event {index} closes a {} while a {expected} is open",
                        event.construct()
                    )))
                }
                None => {
                    return Err(ConvertError::UnbalancedEvents(format!(
                        "event {index} closes a {} that was never opened",
                        event.construct()
                    )))
                }
            },
            Boundary::Atomic => {}
        }
    }
    match open.last() {
        Some(construct) => Err(ConvertError::UnbalancedEvents(format!(
            "{construct} left open at end of stream"
        ))),
        None => Ok(()),
    }
}

/// Receiver of document events.
pub trait Listener {
    fn on_event(&mut self, event: &Event);
}

/// Collects events, mostly for tests and inspection.
impl Listener for Vec<Event> {
    fn on_event(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &Parameters) -> fmt::Result {
    for (key, value) in params {
        write!(f, " {key}=\"{value}\"")?;
    }
    Ok(())
}

/// One-line, human readable rendering used by `inspect`.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.boundary() {
            Boundary::Begin => "begin ",
            Boundary::End => "end ",
            Boundary::Atomic => "",
        };
        write!(f, "{prefix}{}", self.construct())?;
        match self {
            Event::BeginDocument { metadata } | Event::EndDocument { metadata } => {
                write_params(f, metadata)
            }
            Event::BeginHeader { level, id } | Event::EndHeader { level, id } => {
                write!(f, " {level} [{id}]")
            }
            Event::BeginFormat { format } | Event::EndFormat { format } => {
                write!(f, " {format:?}")
            }
            Event::BeginList { list } | Event::EndList { list } => write!(f, " {list:?}"),
            Event::BeginLink {
                reference,
                free_standing,
                parameters,
            }
            | Event::EndLink {
                reference,
                free_standing,
                parameters,
            }
            | Event::Image {
                reference,
                free_standing,
                parameters,
            } => {
                write!(
                    f,
                    " {}:{} free={free_standing}",
                    reference.kind, reference.reference
                )?;
                write_params(f, parameters)
            }
            Event::BeginTable { parameters }
            | Event::EndTable { parameters }
            | Event::BeginTableCell { parameters }
            | Event::EndTableCell { parameters }
            | Event::BeginTableHeadCell { parameters }
            | Event::EndTableHeadCell { parameters }
            | Event::HorizontalLine { parameters } => write_params(f, parameters),
            Event::Word { text } => write!(f, " {text:?}"),
            Event::SpecialSymbol { symbol } => write!(f, " {symbol:?}"),
            Event::RawText { text, syntax } => write!(f, " [{syntax}] {text:?}"),
            Event::Macro {
                id,
                parameters,
                content,
                inline,
            } => {
                write!(f, " {id} inline={inline}")?;
                write_params(f, parameters)?;
                match content {
                    Some(content) => write!(f, " {content:?}"),
                    None => Ok(()),
                }
            }
            Event::Verbatim {
                text,
                inline,
                parameters,
            } => {
                write!(f, " inline={inline}")?;
                write_params(f, parameters)?;
                write!(f, " {text:?}")
            }
            _ => Ok(()),
        }
    }
}
