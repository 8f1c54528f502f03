//! Generic Markdown AST consumed by the event visitor.
//!
//! The tree is produced by lowering the tokenizer's output (see
//! `formats::markdown::parser`), but can be built by hand as well. Each node owns its
//! children; there are no parent links.

use std::collections::HashMap;

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Center => "center",
        }
    }

    /// Inverse of [`Alignment::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Alignment::Left),
            "right" => Some(Alignment::Right),
            "center" => Some(Alignment::Center),
            _ => None,
        }
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading {
        level: u8,
    },
    Text(String),
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link {
        url: String,
        title: String,
    },
    /// Reference-style link; `raw` is the source text used when the label is undefined.
    LinkRef {
        label: String,
        raw: String,
    },
    AutoLink(String),
    MailLink(String),
    /// `[[label|link]]`; `link` may carry trailing `|key="value"` parameters.
    WikiLink {
        link: String,
        label: Option<String>,
    },
    Image {
        url: String,
        title: String,
    },
    ImageRef {
        label: String,
        raw: String,
    },
    WikiImage {
        link: String,
        label: Option<String>,
    },
    BulletList,
    OrderedList,
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionItem,
    BlockQuote,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell {
        header: bool,
        span: usize,
        alignment: Option<Alignment>,
    },
    TableCaption,
    TableSeparator,
    Code(String),
    FencedCodeBlock {
        info: String,
        literal: String,
    },
    IndentedCodeBlock(String),
    HtmlBlock(String),
    HtmlInline(String),
    HtmlComment(String),
    HtmlEntity(String),
    ThematicBreak,
    HardLineBreak,
    SoftLineBreak,
    Abbreviation {
        key: String,
        expansion: Option<String>,
    },
    /// `info` is the macro id followed by its raw parameters.
    MacroBlock {
        info: String,
        content: Option<String>,
    },
    InlineMacro {
        info: String,
        content: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Node { kind, children }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node::new(NodeKind::Text(content.into()))
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document
                | NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::BulletList
                | NodeKind::OrderedList
                | NodeKind::ListItem
                | NodeKind::DefinitionList
                | NodeKind::DefinitionTerm
                | NodeKind::DefinitionItem
                | NodeKind::BlockQuote
                | NodeKind::Table
                | NodeKind::TableHead
                | NodeKind::TableBody
                | NodeKind::TableRow
                | NodeKind::TableCell { .. }
                | NodeKind::TableCaption
                | NodeKind::TableSeparator
                | NodeKind::FencedCodeBlock { .. }
                | NodeKind::IndentedCodeBlock(_)
                | NodeKind::HtmlBlock(_)
                | NodeKind::ThematicBreak
                | NodeKind::MacroBlock { .. }
        )
    }

    /// Concatenated text of all descendant text-like nodes.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Text(text) | NodeKind::Code(text) => out.push_str(text),
        NodeKind::SoftLineBreak | NodeKind::HardLineBreak => out.push(' '),
        NodeKind::Abbreviation { key, .. } => out.push_str(key),
        _ => {}
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

/// Target of a link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    pub url: String,
    pub title: Option<String>,
}

/// Link and image definitions keyed by normalized label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRepository {
    entries: HashMap<String, LinkDefinition>,
}

impl ReferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. The first definition of a label wins.
    pub fn define(&mut self, label: &str, url: impl Into<String>, title: Option<String>) {
        self.entries
            .entry(normalize_label(label))
            .or_insert_with(|| LinkDefinition {
                url: url.into(),
                title,
            });
    }

    pub fn resolve(&self, label: &str) -> Option<&LinkDefinition> {
        self.entries.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case-fold and collapse runs of whitespace.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parsed document: the AST root plus its reference definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Node,
    pub references: ReferenceRepository,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Document {
            root: Node::with_children(NodeKind::Document, children),
            references: ReferenceRepository::new(),
        }
    }

    pub fn with_references(mut self, references: ReferenceRepository) -> Self {
        self.references = references;
        self
    }
}
