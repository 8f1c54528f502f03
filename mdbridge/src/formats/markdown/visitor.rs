//! AST to event visitor
//!
//! Walks a [`Document`] depth first and reports every node to a [`Listener`] as events.
//! Context-dependent rewrites go through the listener stack: list items and definitions
//! swallow their paragraphs, quotations turn paragraphs into quotation lines, and headings
//! are captured so their id can be derived from their text before they are replayed.

use crate::common::html_merge::{abbreviation_markup, escape_markup};
use crate::common::ids::IdGenerator;
use crate::common::links::{parse_image_reference, parse_link_reference, parse_wiki_link};
use crate::common::listeners::{Frame, ListenerStack};
use crate::common::macros::parse_macro_info;
use crate::dialect::{DialectConfig, Extension, SoftBreak};
use crate::error::ConvertError;
use crate::formats::plain::{render_plain_text, tokenize_inline};
use crate::ir::events::{Event, FormatKind, ListType, Listener};
use crate::ir::nodes::{Document, Node, NodeKind};
use crate::ir::reference::{Parameters, ResourceReference, ResourceType};

const HEADING_ID_PREFIX: &str = "H";

/// Send the events of `document` to `listener`.
pub fn visit(
    document: &Document,
    listener: &mut dyn Listener,
    dialect: &DialectConfig,
) -> Result<(), ConvertError> {
    EventVisitor::new(document, dialect).visit(listener)
}

pub struct EventVisitor<'v> {
    document: &'v Document,
    dialect: &'v DialectConfig,
    ids: IdGenerator,
    /// Kinds of the nodes being visited, outermost first.
    ancestors: Vec<&'v NodeKind>,
}

impl<'v> EventVisitor<'v> {
    pub fn new(document: &'v Document, dialect: &'v DialectConfig) -> Self {
        EventVisitor {
            document,
            dialect,
            ids: IdGenerator::new(),
            ancestors: Vec::new(),
        }
    }

    pub fn visit(&mut self, listener: &mut dyn Listener) -> Result<(), ConvertError> {
        self.ids.reset();
        let metadata = Parameters::from([("syntax".to_string(), self.dialect.syntax.clone())]);

        let mut out = ListenerStack::new(listener);
        out.emit(Event::BeginDocument {
            metadata: metadata.clone(),
        });
        let document = self.document;
        self.visit_children(&document.root, &mut out)?;
        out.emit(Event::EndDocument { metadata });

        tracing::debug!(syntax = %self.dialect.syntax, "document visited");
        Ok(())
    }

    fn visit_children(
        &mut self,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        for child in &node.children {
            self.visit_node(child, out)?;
        }
        Ok(())
    }

    fn visit_node(&mut self, node: &'v Node, out: &mut ListenerStack<'_>) -> Result<(), ConvertError> {
        if self.ancestors.len() >= self.dialect.max_depth {
            return Err(ConvertError::nesting_too_deep(
                self.dialect.max_depth,
                &node.plain_text(),
            ));
        }
        self.ancestors.push(&node.kind);
        let result = self.dispatch(node, out);
        self.ancestors.pop();
        result
    }

    /// Whether a strict ancestor of the current node matches.
    fn inside(&self, test: impl Fn(&NodeKind) -> bool) -> bool {
        self.ancestors
            .iter()
            .rev()
            .skip(1)
            .any(|kind| test(kind))
    }

    fn dispatch(&mut self, node: &'v Node, out: &mut ListenerStack<'_>) -> Result<(), ConvertError> {
        match &node.kind {
            NodeKind::Document => self.visit_children(node, out),
            NodeKind::Paragraph => {
                // A table cell holds running text only.
                if self.inside(|kind| matches!(kind, NodeKind::TableCell { .. })) {
                    return self.visit_children(node, out);
                }
                self.wrap(Event::BeginParagraph, Event::EndParagraph, node, out)
            }
            NodeKind::Heading { level } => self.heading(*level, node, out),
            NodeKind::Text(text) => {
                emit_inline_text(text, out);
                Ok(())
            }
            NodeKind::Emphasis => self.format(FormatKind::Italic, node, out),
            NodeKind::Strong => self.format(FormatKind::Bold, node, out),
            NodeKind::Strikethrough => self.format(FormatKind::Strikeout, node, out),
            NodeKind::Superscript => self.format(FormatKind::Superscript, node, out),
            NodeKind::Subscript => self.format(FormatKind::Subscript, node, out),
            NodeKind::BulletList => self.list(ListType::Bulleted, node, out),
            NodeKind::OrderedList => self.list(ListType::Numbered, node, out),
            NodeKind::ListItem => {
                self.swallowing(Event::BeginListItem, Event::EndListItem, node, out)
            }
            NodeKind::DefinitionList => self.wrap(
                Event::BeginDefinitionList,
                Event::EndDefinitionList,
                node,
                out,
            ),
            NodeKind::DefinitionTerm => self.swallowing(
                Event::BeginDefinitionTerm,
                Event::EndDefinitionTerm,
                node,
                out,
            ),
            NodeKind::DefinitionItem => self.swallowing(
                Event::BeginDefinitionDescription,
                Event::EndDefinitionDescription,
                node,
                out,
            ),
            NodeKind::BlockQuote => {
                out.emit(Event::BeginQuotation);
                {
                    let mut scope = out.push(Frame::quote_lines());
                    self.visit_children(node, &mut scope)?;
                    scope.finish();
                }
                out.emit(Event::EndQuotation);
                Ok(())
            }
            NodeKind::Table => self.wrap(
                Event::BeginTable {
                    parameters: Parameters::new(),
                },
                Event::EndTable {
                    parameters: Parameters::new(),
                },
                node,
                out,
            ),
            NodeKind::TableHead | NodeKind::TableBody => self.visit_children(node, out),
            NodeKind::TableRow => self.wrap(Event::BeginTableRow, Event::EndTableRow, node, out),
            NodeKind::TableCell {
                header,
                span,
                alignment,
            } => {
                let mut parameters = Parameters::new();
                if *span > 1 {
                    parameters.insert("colspan".to_string(), span.to_string());
                }
                if let Some(alignment) = alignment {
                    parameters.insert("align".to_string(), alignment.as_str().to_string());
                }
                let (begin, end) = if *header {
                    (
                        Event::BeginTableHeadCell {
                            parameters: parameters.clone(),
                        },
                        Event::EndTableHeadCell { parameters },
                    )
                } else {
                    (
                        Event::BeginTableCell {
                            parameters: parameters.clone(),
                        },
                        Event::EndTableCell { parameters },
                    )
                };
                self.wrap(begin, end, node, out)
            }
            NodeKind::TableCaption => {
                let text = escape_markup(&node.plain_text());
                out.emit(Event::raw_html(format!("<caption>{text}</caption>")));
                Ok(())
            }
            NodeKind::TableSeparator => Ok(()),
            NodeKind::AutoLink(url) => {
                emit_free_standing_link(parse_link_reference(url), out);
                Ok(())
            }
            NodeKind::MailLink(address) => {
                let reference = ResourceReference::new(ResourceType::Mailto, address.as_str());
                emit_free_standing_link(reference.typed(true), out);
                Ok(())
            }
            NodeKind::Link { url, title } => {
                self.link(parse_link_reference(url), title, node, out)
            }
            NodeKind::LinkRef { label, raw } => {
                let document = self.document;
                match document.references.resolve(label) {
                    Some(definition) => {
                        let title = definition.title.as_deref().unwrap_or_default();
                        self.link(parse_link_reference(&definition.url), title, node, out)
                    }
                    None => {
                        tracing::warn!(label = %label, "undefined link reference, kept as text");
                        emit_inline_text(raw, out);
                        Ok(())
                    }
                }
            }
            NodeKind::WikiLink { link, label } => {
                let reference = parse_wiki_link(link);
                let parameters = Parameters::new();
                out.emit(Event::BeginLink {
                    reference: reference.clone(),
                    free_standing: false,
                    parameters: parameters.clone(),
                });
                if let Some(label) = label {
                    emit_inline_text(label, out);
                }
                out.emit(Event::EndLink {
                    reference,
                    free_standing: false,
                    parameters,
                });
                Ok(())
            }
            NodeKind::Image { url, title } => {
                self.image(parse_image_reference(url), title, node, out)
            }
            NodeKind::ImageRef { label, raw } => {
                let document = self.document;
                match document.references.resolve(label) {
                    Some(definition) => {
                        let title = definition.title.as_deref().unwrap_or_default();
                        self.image(parse_image_reference(&definition.url), title, node, out)
                    }
                    None => {
                        tracing::warn!(label = %label, "undefined image reference, kept verbatim");
                        out.emit(Event::Verbatim {
                            text: raw.clone(),
                            inline: true,
                            parameters: Parameters::new(),
                        });
                        Ok(())
                    }
                }
            }
            NodeKind::WikiImage { link, label } => {
                let target = link.split('|').next().unwrap_or(link);
                let mut parameters = Parameters::new();
                if let Some(label) = label.as_ref().filter(|label| !label.is_empty()) {
                    parameters.insert("alt".to_string(), label.clone());
                }
                out.emit(Event::Image {
                    reference: parse_image_reference(target),
                    free_standing: false,
                    parameters,
                });
                Ok(())
            }
            NodeKind::Code(literal) => {
                out.emit(code_macro("none", literal, true));
                Ok(())
            }
            NodeKind::FencedCodeBlock { info, literal } => {
                let language = info.split_whitespace().next().unwrap_or("none");
                out.emit(code_macro(language, trim_final_newline(literal), false));
                Ok(())
            }
            NodeKind::IndentedCodeBlock(literal) => {
                out.emit(code_macro("none", trim_final_newline(literal), false));
                Ok(())
            }
            NodeKind::HtmlBlock(html) => {
                let html = html.trim();
                if self.dialect.has(Extension::Macros) {
                    out.emit(Event::Macro {
                        id: "html".to_string(),
                        parameters: Parameters::new(),
                        content: Some(html.to_string()),
                        inline: false,
                    });
                } else {
                    out.emit(Event::raw_html(html));
                }
                Ok(())
            }
            NodeKind::HtmlInline(html) | NodeKind::HtmlComment(html) | NodeKind::HtmlEntity(html) => {
                out.emit(Event::raw_html(html.as_str()));
                Ok(())
            }
            NodeKind::Abbreviation { key, expansion } => {
                out.emit(Event::raw_html(abbreviation_markup(key, expansion.as_deref())));
                Ok(())
            }
            NodeKind::MacroBlock { info, content } => {
                out.emit(macro_event(info, content.as_deref(), false));
                Ok(())
            }
            NodeKind::InlineMacro { info, content } => {
                out.emit(macro_event(info, content.as_deref(), true));
                Ok(())
            }
            NodeKind::ThematicBreak => {
                out.emit(Event::HorizontalLine {
                    parameters: Parameters::new(),
                });
                Ok(())
            }
            NodeKind::HardLineBreak => {
                out.emit(Event::NewLine);
                Ok(())
            }
            NodeKind::SoftLineBreak => {
                out.emit(match self.dialect.soft_break {
                    SoftBreak::Space => Event::Space,
                    SoftBreak::NewLine => Event::NewLine,
                });
                Ok(())
            }
        }
    }

    fn wrap(
        &mut self,
        begin: Event,
        end: Event,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        out.emit(begin);
        self.visit_children(node, out)?;
        out.emit(end);
        Ok(())
    }

    /// Like [`Self::wrap`], with the children's paragraphs dissolved into running text.
    fn swallowing(
        &mut self,
        begin: Event,
        end: Event,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        out.emit(begin);
        {
            let mut scope = out.push(Frame::swallow_paragraphs());
            self.visit_children(node, &mut scope)?;
        }
        out.emit(end);
        Ok(())
    }

    fn format(
        &mut self,
        format: FormatKind,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        self.wrap(
            Event::BeginFormat { format },
            Event::EndFormat { format },
            node,
            out,
        )
    }

    fn list(
        &mut self,
        list: ListType,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        self.wrap(
            Event::BeginList { list },
            Event::EndList { list },
            node,
            out,
        )
    }

    /// Capture the heading content, derive the id from its text, then replay it.
    fn heading(
        &mut self,
        level: u8,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        let content = self.capture(node, out)?;
        let id = self
            .ids
            .generate_unique_id(HEADING_ID_PREFIX, &render_plain_text(&content));

        out.emit(Event::BeginHeader {
            level,
            id: id.clone(),
        });
        for event in content {
            out.emit(event);
        }
        out.emit(Event::EndHeader { level, id });
        Ok(())
    }

    fn capture(
        &mut self,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<Vec<Event>, ConvertError> {
        let mut scope = out.push(Frame::capture());
        self.visit_children(node, &mut scope)?;
        Ok(scope.finish())
    }

    fn link(
        &mut self,
        reference: ResourceReference,
        title: &str,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        let mut parameters = Parameters::new();
        if !title.is_empty() {
            parameters.insert("title".to_string(), title.to_string());
        }
        self.wrap(
            Event::BeginLink {
                reference: reference.clone(),
                free_standing: false,
                parameters: parameters.clone(),
            },
            Event::EndLink {
                reference,
                free_standing: false,
                parameters,
            },
            node,
            out,
        )
    }

    /// The alt text is kept only when it says something the reference does not.
    fn image(
        &mut self,
        reference: ResourceReference,
        title: &str,
        node: &'v Node,
        out: &mut ListenerStack<'_>,
    ) -> Result<(), ConvertError> {
        let alt = render_plain_text(&self.capture(node, out)?);

        let mut parameters = Parameters::new();
        if !alt.is_empty() && alt != reference.reference {
            parameters.insert("alt".to_string(), alt);
        }
        if !title.is_empty() {
            parameters.insert("title".to_string(), title.to_string());
        }
        out.emit(Event::Image {
            reference,
            free_standing: false,
            parameters,
        });
        Ok(())
    }
}

fn emit_inline_text(text: &str, out: &mut ListenerStack<'_>) {
    for event in tokenize_inline(text) {
        out.emit(event);
    }
}

fn emit_free_standing_link(reference: ResourceReference, out: &mut ListenerStack<'_>) {
    out.emit(Event::BeginLink {
        reference: reference.clone(),
        free_standing: true,
        parameters: Parameters::new(),
    });
    out.emit(Event::EndLink {
        reference,
        free_standing: true,
        parameters: Parameters::new(),
    });
}

fn code_macro(language: &str, content: &str, inline: bool) -> Event {
    Event::Macro {
        id: "code".to_string(),
        parameters: Parameters::from([("language".to_string(), language.to_string())]),
        content: Some(content.to_string()),
        inline,
    }
}

fn macro_event(info: &str, content: Option<&str>, inline: bool) -> Event {
    let call = parse_macro_info(info);
    Event::Macro {
        id: call.id,
        parameters: call.parameters,
        content: content.filter(|c| !c.is_empty()).map(str::to_string),
        inline,
    }
}

fn trim_final_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}
