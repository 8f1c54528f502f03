//! Markdown dialects
//!
//! One [`MarkdownFormat`] is registered per dialect. All of them share the same pipeline and
//! differ only in their [`DialectConfig`].
//!
//! # Library Choice
//!
//! We use the `comrak` crate for the Markdown grammar. It covers CommonMark and the GFM
//! extensions (tables, strikethrough, autolinks), plus superscript, description lists and
//! wiki links. Macros and abbreviations have no comrak extension and are recognized in a
//! line pass before comrak runs (see [`parser`]). Serialization does not go through comrak:
//! the event renderer prints Markdown directly (see [`serializer`]).
//!
//! # Element Mapping Table
//!
//! | Markdown                    | Events                                   | Notes                                 |
//! |-----------------------------|------------------------------------------|---------------------------------------|
//! | `# Heading`                 | BeginHeader / EndHeader                  | id `H` + letters and digits, unique   |
//! | Paragraph                   | BeginParagraph / EndParagraph            | dissolved inside items and cells      |
//! | `*` / `1.` lists            | BeginList / BeginListItem                | item paragraphs joined by NewLine     |
//! | `Term` + `: Details`        | Definition list events                   | `definitions` extension               |
//! | `> quote`                   | BeginQuotation / BeginQuotationLine      | one line per paragraph                |
//! | Pipe table                  | Table, row and cell events               | `align` from the delimiter row        |
//! | `[label](url)`, `<url>`     | BeginLink / EndLink                      | `<url>` is free standing              |
//! | `[[label\|ref]]`            | BeginLink / EndLink                      | `wiki-links` extension                |
//! | `![alt](src)`, `![[src]]`   | Image                                    | alt kept only when informative        |
//! | `` `code` ``, fenced blocks | Macro `code`                             | `language` parameter, `none` default  |
//! | HTML block                  | Macro `html` or RawText                  | Macro when `macros` is active         |
//! | `{{id k="v"}}...{{/id}}`    | Macro                                    | `macros` extension                    |
//! | `*[key]: expansion`         | RawText `<abbr>`                         | `abbreviations` extension             |
//!
//! # Lossy Conversions
//!
//! - Setext headings render as ATX headings
//! - Ordered lists lose their start number; every marker renders as `1.`
//! - Emphasis written with `*` renders with `_`
//! - Loose and tight lists render alike
//! - Reference-style links render inline; the definitions are dropped

pub mod escape;
pub mod parser;
pub mod serializer;
pub mod visitor;

use crate::dialect::{
    DialectConfig, COMMONMARK_0_27, MARKDOWN_1_0, MARKDOWN_1_1, MARKDOWN_1_2, MARKDOWN_GITHUB_1_0,
};
use crate::error::ConvertError;
use crate::format::Format;
use crate::ir::events::{Event, Listener};

pub use escape::{escape, unescape, EscapeContext};
pub use parser::parse_markdown;
pub use serializer::{render, MarkdownRenderer};
pub use visitor::{visit, EventVisitor};

/// Format implementation for one Markdown dialect
#[derive(Debug, Clone)]
pub struct MarkdownFormat {
    dialect: DialectConfig,
}

impl MarkdownFormat {
    pub fn new(dialect: DialectConfig) -> Self {
        MarkdownFormat { dialect }
    }

    /// The built-in dialect for `syntax`.
    pub fn for_syntax(syntax: &str) -> Result<Self, ConvertError> {
        DialectConfig::for_syntax(syntax).map(Self::new)
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        &self.dialect.syntax
    }

    fn description(&self) -> &str {
        match self.dialect.syntax.as_str() {
            COMMONMARK_0_27 => "CommonMark 0.27",
            MARKDOWN_1_0 => "Markdown with tables and autolinks",
            MARKDOWN_1_1 => "Markdown with definitions, superscript, subscript and strikethrough",
            MARKDOWN_1_2 => "Markdown with wiki links, macros and abbreviations",
            MARKDOWN_GITHUB_1_0 => "GitHub flavored Markdown with every extension",
            _ => "Markdown dialect",
        }
    }

    /// Only the richest wiki dialect claims the usual Markdown extensions.
    fn file_extensions(&self) -> &[&str] {
        if self.dialect.syntax == MARKDOWN_1_2 {
            &["md", "markdown"]
        } else {
            &[]
        }
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str, listener: &mut dyn Listener) -> Result<(), ConvertError> {
        let document = parse_markdown(source, &self.dialect)?;
        visit(&document, listener, &self.dialect)
    }

    fn serialize(&self, events: &[Event]) -> Result<String, ConvertError> {
        render(events, &self.dialect)
    }
}
