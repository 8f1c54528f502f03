//! Markdown serialization (events → Markdown text)
//!
//! [`MarkdownRenderer`] is a listener: events are printed as they arrive. Text is delayed
//! and only escaped once the next piece of syntax gets printed, so the escaper knows whether
//! the text starts a line. Headers, table cells, link labels and `^`/`~` spans print into
//! their own printer and are wrapped once complete.
//!
//! One renderer serves every dialect. Each handler checks the deltas of the dialect's
//! [`RenderLevel`] first and falls back to the base behavior.

use std::collections::BTreeSet;

use crate::common::html_merge::longest_backtick_run;
use crate::common::links::serialize_reference;
use crate::common::macros::{render_block_macro, render_inline_macro, serialize_parameters};
use crate::common::printer::{Printer, PrinterStack};
use crate::common::table::{Cell, TableLayout};
use crate::dialect::{DialectConfig, Extension, RenderLevel};
use crate::error::ConvertError;
use crate::formats::markdown::escape::{escape, EscapeContext};
use crate::ir::events::{validate_balance, Event, FormatKind, ListType, Listener};
use crate::ir::nodes::Alignment;
use crate::ir::reference::{Parameters, ResourceReference, ResourceType};
use once_cell::sync::Lazy;
use regex::Regex;

static EMBEDDED_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<abbr\b[^>]*>[^<]*</abbr>").expect("valid abbreviation element pattern")
});

/// Columns added per nested list and per definition description.
const INDENT: usize = 4;

const MID_LINE: EscapeContext = EscapeContext {
    in_line: true,
    at_line_start: false,
};

/// Render a complete event stream as Markdown for `dialect`.
///
/// The stream is checked for balance first, so a truncated stream fails instead of
/// producing half a document.
pub fn render(events: &[Event], dialect: &DialectConfig) -> Result<String, ConvertError> {
    validate_balance(events)?;

    let mut renderer = MarkdownRenderer::new(dialect);
    for event in events {
        renderer.on_event(event);
    }
    let output = renderer.finish();

    tracing::debug!(syntax = %dialect.syntax, bytes = output.len(), "rendered markdown");
    Ok(output)
}

#[derive(Debug)]
struct ListState {
    list: ListType,
    items: usize,
    /// Column of this list's markers.
    column: usize,
}

/// What a sub-printer is collecting.
#[derive(Debug)]
enum Fragment {
    Header,
    Cell {
        head: bool,
        alignment: Option<Alignment>,
    },
    Link {
        reference: ResourceReference,
        parameters: Parameters,
    },
    /// `^`/`~` span whose spaces must be escaped.
    Script,
}

pub struct MarkdownRenderer {
    level: RenderLevel,
    extensions: BTreeSet<Extension>,
    printers: PrinterStack,
    /// One entry per printer above the document printer.
    fragments: Vec<Fragment>,
    /// Depth of running text (paragraphs, items, lines, fragments).
    inline_depth: usize,
    lists: Vec<ListState>,
    /// Content columns of open list items and definition descriptions.
    indents: Vec<usize>,
    /// Entries printed so far, per open definition list.
    definitions: Vec<usize>,
    /// Lines printed so far, per open quotation.
    quotes: Vec<usize>,
    table: Option<TableLayout>,
    abbreviations: Vec<(String, String)>,
}

impl MarkdownRenderer {
    pub fn new(dialect: &DialectConfig) -> Self {
        MarkdownRenderer {
            level: dialect.render_level,
            extensions: dialect.extensions.clone(),
            printers: PrinterStack::new(),
            fragments: Vec::new(),
            inline_depth: 0,
            lists: Vec::new(),
            indents: Vec::new(),
            definitions: Vec::new(),
            quotes: Vec::new(),
            table: None,
            abbreviations: Vec::new(),
        }
    }

    /// Flush pending text and return the document. No trailing newline is added.
    pub fn finish(mut self) -> String {
        self.flush();
        self.printers.into_output()
    }

    fn has(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    // Printing primitives

    fn flush(&mut self) {
        let in_line = self.inline_depth > 0;
        let printer = self.printers.top_mut();
        if let Some((text, at_line_start)) = printer.take_delayed() {
            printer.write(&escape(
                &text,
                EscapeContext {
                    in_line,
                    at_line_start,
                },
            ));
        }
    }

    fn delay(&mut self, text: &str) {
        self.printers.top_mut().delay(text);
    }

    fn print(&mut self, text: &str) {
        self.flush();
        self.printers.top_mut().write(text);
    }

    fn mark_line_start(&mut self) {
        self.printers.top_mut().mark_line_start();
    }

    fn indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    /// What every continuation line starts with: quote markers, then the container indent.
    fn continuation(&self) -> String {
        format!("{}{}", "> ".repeat(self.quotes.len()), " ".repeat(self.indent()))
    }

    fn newline(&mut self) {
        let continuation = self.continuation();
        self.print("\n");
        self.print(&continuation);
        self.mark_line_start();
    }

    fn blank_line(&mut self) {
        let continuation = self.continuation();
        self.print("\n");
        self.print(continuation.trim_end());
        self.print("\n");
        self.print(&continuation);
        self.mark_line_start();
    }

    /// Start a block: a blank line unless nothing has been printed on the current line.
    fn separate_block(&mut self) {
        self.flush();
        let printer = self.printers.top();
        if !printer.is_empty() && !printer.is_at_line_start() {
            self.blank_line();
        }
    }

    /// Print multi-line text, carrying the continuation prefix onto every line.
    fn print_lines(&mut self, text: &str) {
        let continuation = self.continuation();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.print("\n");
                if line.is_empty() {
                    self.print(continuation.trim_end());
                } else {
                    self.print(&continuation);
                }
            }
            self.print(line);
        }
    }

    fn open_fragment(&mut self, fragment: Fragment) {
        self.flush();
        self.printers.push(Printer::fragment());
        self.fragments.push(fragment);
        self.inline_depth += 1;
    }

    fn close_fragment(&mut self) -> Option<(Fragment, String)> {
        self.flush();
        let Some(fragment) = self.fragments.pop() else {
            tracing::warn!("printer stack popped with no open fragment");
            return None;
        };
        self.inline_depth = self.inline_depth.saturating_sub(1);
        let printer = self.printers.pop()?;
        Some((fragment, printer.into_buffer()))
    }

    fn begin_inline(&mut self) {
        self.inline_depth += 1;
    }

    fn end_inline(&mut self) {
        self.flush();
        self.inline_depth = self.inline_depth.saturating_sub(1);
    }

    // Blocks

    fn begin_header(&mut self, level: u8) {
        self.separate_block();
        self.print(&"#".repeat(level.clamp(1, 6) as usize));
        self.print(" ");
        self.open_fragment(Fragment::Header);
    }

    fn end_header(&mut self) {
        if let Some((_, text)) = self.close_fragment() {
            self.print(text.trim());
        }
    }

    fn begin_list(&mut self, list: ListType) {
        let column = match self.lists.last() {
            Some(parent) => parent.column + INDENT,
            None => {
                self.separate_block();
                self.indent()
            }
        };
        self.lists.push(ListState {
            list,
            items: 0,
            column,
        });
    }

    fn begin_list_item(&mut self) {
        self.flush();
        let (list, first, column) = match self.lists.last_mut() {
            Some(state) => {
                state.items += 1;
                (state.list, state.items == 1, state.column)
            }
            None => (ListType::Bulleted, true, 0),
        };
        let marker = match list {
            ListType::Bulleted => "* ",
            ListType::Numbered => "1. ",
        };

        let start = if first && self.printers.top().is_at_line_start() {
            // Right after a block separator or a parent marker.
            self.indent()
        } else {
            let prefix = format!("\n{}{}", "> ".repeat(self.quotes.len()), " ".repeat(column));
            self.print(&prefix);
            column
        };

        self.print(marker);
        self.mark_line_start();
        self.indents.push(start + marker.len());
        self.begin_inline();
    }

    fn end_list_item(&mut self) {
        self.end_inline();
        self.indents.pop();
    }

    fn begin_definition_entry(&mut self) {
        self.flush();
        let printed = match self.definitions.last_mut() {
            Some(count) => {
                *count += 1;
                *count > 1
            }
            None => false,
        };
        if printed {
            self.blank_line();
        }
    }

    fn begin_definition_description(&mut self) {
        self.begin_definition_entry();
        self.print(":   ");
        self.mark_line_start();
        self.indents.push(self.indent() + INDENT);
        self.begin_inline();
    }

    fn begin_quotation(&mut self) {
        if self.quotes.is_empty() {
            self.separate_block();
        } else {
            self.flush();
        }
        self.quotes.push(0);
    }

    fn begin_quotation_line(&mut self) {
        self.flush();
        let lines = match self.quotes.last_mut() {
            Some(lines) => {
                *lines += 1;
                *lines
            }
            None => 1,
        };

        if lines > 1 {
            // The bare marker line ends the previous line and closes deeper quotations.
            self.blank_line();
        } else if self.printers.top().is_at_line_start() {
            self.print("> ");
            self.mark_line_start();
        } else {
            self.newline();
        }
        self.begin_inline();
    }

    fn new_line(&mut self) {
        match self.fragments.last() {
            Some(Fragment::Header | Fragment::Cell { .. }) => self.delay(" "),
            _ => {
                self.print("  ");
                self.newline();
            }
        }
    }

    fn end_cell(&mut self) {
        match self.close_fragment() {
            Some((Fragment::Cell { head, alignment }, text)) => {
                let cell = Cell {
                    text: text.trim().replace('|', "\\|"),
                    head,
                    alignment,
                };
                if let Some(table) = self.table.as_mut() {
                    table.push_cell(cell);
                }
            }
            Some((_, text)) => self.print(&text),
            None => {}
        }
    }

    fn end_table(&mut self) {
        self.flush();
        if let Some(table) = self.table.take() {
            let text = table.render();
            self.print_lines(&text);
        }
    }

    fn end_document(&mut self) {
        self.flush();
        if self.abbreviations.is_empty() {
            return;
        }
        let footer = self
            .abbreviations
            .iter()
            .map(|(key, expansion)| format!("*[{key}]: {expansion}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.separate_block();
        self.print(&footer);
    }

    // Inline syntax

    fn format_markers(&self, format: FormatKind) -> (&'static str, &'static str) {
        match format {
            FormatKind::Bold => ("**", "**"),
            FormatKind::Italic => ("_", "_"),
            FormatKind::Underlined => ("<ins>", "</ins>"),
            FormatKind::Strikeout
                if self.level == RenderLevel::Wiki && self.has(Extension::Strikethrough) =>
            {
                ("~~", "~~")
            }
            FormatKind::Strikeout => ("<del>", "</del>"),
            FormatKind::Superscript if self.level >= RenderLevel::Extended => ("^", "^"),
            FormatKind::Superscript => ("<sup>", "</sup>"),
            FormatKind::Subscript if self.level >= RenderLevel::Extended => ("~", "~"),
            FormatKind::Subscript => ("<sub>", "</sub>"),
            FormatKind::Monospace => ("`", "`"),
        }
    }

    fn is_script_span(&self, format: FormatKind) -> bool {
        self.level == RenderLevel::Extended
            && matches!(format, FormatKind::Superscript | FormatKind::Subscript)
    }

    fn begin_format(&mut self, format: FormatKind) {
        let (open, _) = self.format_markers(format);
        self.print(open);
        if self.is_script_span(format) {
            self.open_fragment(Fragment::Script);
        }
    }

    fn end_format(&mut self, format: FormatKind) {
        if self.is_script_span(format) {
            if let Some((_, text)) = self.close_fragment() {
                self.print(&text.replace(' ', "\\ "));
            }
        }
        let (_, close) = self.format_markers(format);
        self.print(close);
    }

    fn end_link(&mut self) {
        match self.close_fragment() {
            Some((
                Fragment::Link {
                    reference,
                    parameters,
                },
                label,
            )) => {
                let markup = self.link_markup(&reference, &label, &parameters);
                self.print(&markup);
            }
            Some((_, text)) => self.print(&text),
            None => {}
        }
    }

    fn link_markup(
        &self,
        reference: &ResourceReference,
        label: &str,
        parameters: &Parameters,
    ) -> String {
        let target = serialize_reference(reference);
        match reference.kind {
            ResourceType::Mailto if label.is_empty() => format!("<{}>", reference.reference),
            ResourceType::Url if label.is_empty() => format!("<{target}>"),
            ResourceType::Url | ResourceType::Mailto => format!(
                "[{label}]({}{})",
                self.destination(&target),
                title_suffix(parameters)
            ),
            _ if self.level == RenderLevel::Wiki => {
                wiki_link(label, &target, &reference.parameters)
            }
            _ => {
                let label = if label.is_empty() {
                    escape(&target, MID_LINE)
                } else {
                    label.to_string()
                };
                format!(
                    "[{label}]({}{})",
                    self.destination(&target),
                    title_suffix(parameters)
                )
            }
        }
    }

    fn image_markup(&self, reference: &ResourceReference, parameters: &Parameters) -> String {
        let target = serialize_reference(reference);
        // Blank alt text falls back to the target.
        let alt = parameters
            .get("alt")
            .filter(|alt| !alt.trim().is_empty())
            .map_or_else(|| escape(&target, MID_LINE), |alt| escape(alt, MID_LINE));

        if self.level == RenderLevel::Wiki && reference.kind != ResourceType::Url {
            return format!("![[{alt}|{target}]]");
        }
        format!(
            "![{alt}]({}{})",
            self.destination(&target),
            title_suffix(parameters)
        )
    }

    /// Link destination: parentheses escaped for wiki dialects, angle brackets around
    /// targets with spaces.
    fn destination(&self, target: &str) -> String {
        let target = if self.level == RenderLevel::Wiki {
            target.replace('(', "\\(").replace(')', "\\)")
        } else {
            target.to_string()
        };
        if target.contains(char::is_whitespace) {
            format!("<{target}>")
        } else {
            target
        }
    }

    fn render_macro(&mut self, id: &str, parameters: &Parameters, content: Option<&str>, inline: bool) {
        match id {
            "code" if inline => self.print(&code_span(content.unwrap_or_default())),
            "code" => {
                let language = parameters.get("language").map(String::as_str);
                self.code_block(language, content.unwrap_or_default());
            }
            "html" => {
                let html = content.unwrap_or_default();
                if inline {
                    self.print(html);
                } else {
                    self.separate_block();
                    self.print_lines(html);
                }
            }
            _ if inline => {
                let markup = if self.level == RenderLevel::Wiki {
                    render_block_macro(id, parameters, content, false)
                } else {
                    render_inline_macro(id, parameters, content)
                };
                self.print(&markup);
            }
            _ => {
                self.separate_block();
                self.print_lines(&render_block_macro(id, parameters, content, true));
            }
        }
    }

    fn code_block(&mut self, language: Option<&str>, code: &str) {
        self.separate_block();
        match language.filter(|language| !language.is_empty() && *language != "none") {
            Some(language) => {
                let fence = code_fence(code);
                self.print_lines(&format!("{fence}{language}\n{code}\n{fence}"));
            }
            None => {
                let indented = code
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            String::new()
                        } else {
                            format!("    {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                self.print_lines(&indented);
            }
        }
    }

    fn raw_text(&mut self, text: &str) {
        if self.has(Extension::Abbreviations) && text.starts_with("<abbr") {
            if let Some((key, title)) = parse_abbreviation(text) {
                if let Some(title) = title {
                    self.record_abbreviation(&key, title);
                }
                self.delay(&key);
                return;
            }
        }
        let text = if self.has(Extension::Abbreviations) {
            self.lift_embedded_abbreviations(text)
        } else {
            text.to_string()
        };

        if self.inline_depth > 0 {
            self.print(&text);
        } else {
            self.separate_block();
            self.print_lines(&text);
        }
    }

    /// Move the titles of `<abbr>` elements inside other markup to the footer, leaving the key.
    fn lift_embedded_abbreviations(&mut self, text: &str) -> String {
        let mut lifted = String::with_capacity(text.len());
        let mut last = 0;
        for found in EMBEDDED_ABBREVIATION.find_iter(text) {
            let Some((key, Some(title))) = parse_abbreviation(found.as_str()) else {
                continue;
            };
            self.record_abbreviation(&key, title);
            lifted.push_str(&text[last..found.start()]);
            lifted.push_str(&key);
            last = found.end();
        }
        lifted.push_str(&text[last..]);
        lifted
    }

    fn record_abbreviation(&mut self, key: &str, title: String) {
        if !self.abbreviations.iter().any(|(known, _)| known == key) {
            self.abbreviations.push((key.to_string(), title));
        }
    }

    fn verbatim(&mut self, text: &str, inline: bool) {
        if inline {
            self.print(text);
        } else {
            self.separate_block();
            let fence = code_fence(text);
            self.print_lines(&format!("{fence}\n{text}\n{fence}"));
        }
    }
}

impl Listener for MarkdownRenderer {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::BeginDocument { .. } => self.abbreviations.clear(),
            Event::EndDocument { .. } => self.end_document(),
            Event::BeginParagraph => {
                self.separate_block();
                self.begin_inline();
            }
            Event::EndParagraph => self.end_inline(),
            Event::BeginHeader { level, .. } => self.begin_header(*level),
            Event::EndHeader { .. } => self.end_header(),
            Event::BeginFormat { format } => self.begin_format(*format),
            Event::EndFormat { format } => self.end_format(*format),
            Event::BeginList { list } => self.begin_list(*list),
            Event::EndList { .. } => {
                self.flush();
                self.lists.pop();
            }
            Event::BeginListItem => self.begin_list_item(),
            Event::EndListItem => self.end_list_item(),
            Event::BeginDefinitionList => {
                self.separate_block();
                self.definitions.push(0);
            }
            Event::EndDefinitionList => {
                self.flush();
                self.definitions.pop();
            }
            Event::BeginDefinitionTerm => {
                self.begin_definition_entry();
                self.begin_inline();
            }
            Event::EndDefinitionTerm => self.end_inline(),
            Event::BeginDefinitionDescription => self.begin_definition_description(),
            Event::EndDefinitionDescription => {
                self.end_inline();
                self.indents.pop();
            }
            Event::BeginQuotation => self.begin_quotation(),
            Event::EndQuotation => {
                self.flush();
                self.quotes.pop();
            }
            Event::BeginQuotationLine => self.begin_quotation_line(),
            Event::EndQuotationLine => self.end_inline(),
            Event::BeginLink {
                reference,
                parameters,
                ..
            } => self.open_fragment(Fragment::Link {
                reference: reference.clone(),
                parameters: parameters.clone(),
            }),
            Event::EndLink { .. } => self.end_link(),
            Event::Image {
                reference,
                parameters,
                ..
            } => {
                let markup = self.image_markup(reference, parameters);
                self.print(&markup);
            }
            Event::BeginTable { .. } => {
                self.separate_block();
                self.table = Some(TableLayout::new());
            }
            Event::EndTable { .. } => self.end_table(),
            Event::BeginTableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.begin_row();
                }
            }
            Event::EndTableRow => {}
            Event::BeginTableCell { parameters } => self.open_fragment(Fragment::Cell {
                head: false,
                alignment: cell_alignment(parameters),
            }),
            Event::BeginTableHeadCell { parameters } => self.open_fragment(Fragment::Cell {
                head: true,
                alignment: cell_alignment(parameters),
            }),
            Event::EndTableCell { .. } | Event::EndTableHeadCell { .. } => self.end_cell(),
            Event::Word { text } => self.delay(text),
            Event::Space => self.delay(" "),
            Event::NewLine => self.new_line(),
            Event::SpecialSymbol { symbol } => {
                let text = typographic_replacement(*symbol)
                    .map(str::to_string)
                    .unwrap_or_else(|| symbol.to_string());
                self.delay(&text);
            }
            Event::RawText { text, .. } => self.raw_text(text),
            Event::Macro {
                id,
                parameters,
                content,
                inline,
            } => self.render_macro(id, parameters, content.as_deref(), *inline),
            Event::HorizontalLine { .. } => {
                self.separate_block();
                self.print("---");
            }
            Event::Verbatim { text, inline, .. } => self.verbatim(text, *inline),
        }
    }
}

fn typographic_replacement(symbol: char) -> Option<&'static str> {
    match symbol {
        '\u{201C}' => Some("<<"),
        '\u{201D}' => Some(">>"),
        '—' => Some("---"),
        '–' => Some("--"),
        '…' => Some("..."),
        _ => None,
    }
}

fn cell_alignment(parameters: &Parameters) -> Option<Alignment> {
    parameters
        .get("align")
        .and_then(|name| Alignment::from_name(name))
}

fn title_suffix(parameters: &Parameters) -> String {
    match parameters.get("title").filter(|title| !title.is_empty()) {
        Some(title) => format!(" \"{}\"", title.replace('"', "\\\"")),
        None => String::new(),
    }
}

fn wiki_link(label: &str, target: &str, parameters: &Parameters) -> String {
    if !parameters.is_empty() {
        let label = if label.is_empty() { target } else { label };
        return format!("[[{label}|{target}|{}]]", serialize_parameters(parameters));
    }
    if label.is_empty() {
        format!("[[{target}]]")
    } else {
        format!("[[{label}|{target}]]")
    }
}

fn code_span(code: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(code) + 1);
    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    let pad = if padded { " " } else { "" };
    format!("{fence}{pad}{code}{pad}{fence}")
}

fn code_fence(code: &str) -> String {
    "`".repeat((longest_backtick_run(code) + 1).max(3))
}

/// Key and title of `<abbr title="...">key</abbr>`; `None` if the markup is not an `abbr`
/// element.
fn parse_abbreviation(markup: &str) -> Option<(String, Option<String>)> {
    let document = match roxmltree::Document::parse(markup) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(%err, "malformed abbreviation markup, printed as is");
            return None;
        }
    };
    let root = document.root_element();
    if !root.has_tag_name("abbr") {
        return None;
    }
    let key = root.text().unwrap_or_default().to_string();
    Some((key, root.attribute("title").map(str::to_string)))
}
