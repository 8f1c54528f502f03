//! Plain text rendering
//!
//! Keeps the readable text of an event stream and drops all markup. Used for `plain/1.0`
//! output, for heading ids and for image alt text.

use crate::ir::events::{Event, Listener};

#[derive(Debug, Default)]
pub struct PlainTextRenderer {
    output: String,
    /// A block ended and the next text starts a new paragraph.
    pending_break: bool,
    /// Output offset where the current link label starts.
    label_start: Option<usize>,
}

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn text(&mut self, text: &str) {
        if self.pending_break && !self.output.is_empty() {
            self.output.push_str("\n\n");
        }
        self.pending_break = false;
        self.output.push_str(text);
    }

    pub fn into_string(self) -> String {
        self.output
    }
}

impl Listener for PlainTextRenderer {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::Word { text } => self.text(text),
            Event::Space => self.text(" "),
            Event::NewLine => self.text("\n"),
            Event::SpecialSymbol { symbol } => self.text(symbol.encode_utf8(&mut [0; 4])),
            Event::Verbatim { text, .. } => self.text(text),
            Event::Macro {
                content: Some(content),
                ..
            } => self.text(content),
            Event::BeginLink { .. } => self.label_start = Some(self.output.len()),
            Event::EndLink { reference, .. } => {
                // A link without a label reads as its target.
                if self.label_start.take() == Some(self.output.len()) {
                    self.text(&reference.reference);
                }
            }
            Event::EndParagraph
            | Event::EndHeader { .. }
            | Event::EndListItem
            | Event::EndDefinitionTerm
            | Event::EndDefinitionDescription
            | Event::EndQuotationLine
            | Event::EndTableRow
            | Event::HorizontalLine { .. } => self.pending_break = true,
            Event::EndTableCell { .. } | Event::EndTableHeadCell { .. } => self.text(" "),
            _ => {}
        }
    }
}

/// Flatten events to their plain text.
pub fn render_plain_text(events: &[Event]) -> String {
    let mut renderer = PlainTextRenderer::new();
    for event in events {
        renderer.on_event(event);
    }
    renderer.into_string()
}
