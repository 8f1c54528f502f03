//! Markdown parsing (Markdown → generic AST)
//!
//! Pipeline: source → dialect pre-passes → comrak AST → [`Document`] → inline HTML merge.
//!
//! comrak knows nothing about macros or abbreviation definitions, so those are cut out of
//! the source before tokenizing. Block macros are replaced by an HTML comment placeholder on
//! its own line, inline macros by a private-use marker inside the text; both are swapped
//! back for their nodes while lowering. `![[` would open an image bracket in comrak, so a
//! marker is slipped between the `!` and the wiki link. Code blocks get their original text
//! back, since the line pass cannot always tell an indented code line from a continuation.

use crate::common::html_merge::merge_inline_html;
use crate::common::macros::scan_macro;
use crate::dialect::{DialectConfig, EmulationFamily, Extension};
use crate::error::ConvertError;
use crate::ir::nodes::{Alignment, Document, Node, NodeKind, ReferenceRepository};
use comrak::nodes::{AstNode, ListType, NodeValue, Sourcepos, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};
use once_cell::sync::Lazy;
use regex::Regex;

const BLOCK_PLACEHOLDER: &str = "<!--mdbridge:macro:";
const INLINE_OPEN: char = '\u{E000}';
const INLINE_CLOSE: char = '\u{E001}';
const WIKI_IMAGE: char = '\u{E002}';

static ABBREVIATION_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}\*\[([^\]]+)\]:[ \t]*(.*?)[ \t]*$").expect("valid abbreviation pattern")
});

static REFERENCE_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^ {0,3}\[([^\]^][^\]]*)\]:[ \t]*<?([^\s>]+)>?(?:[ \t]+(?:"([^"]*)"|'([^']*)'|\(([^)]*)\)))?[ \t]*$"#,
    )
    .expect("valid reference definition pattern")
});

/// Parse Markdown source into the generic AST for a dialect.
pub fn parse_markdown(source: &str, dialect: &DialectConfig) -> Result<Document, ConvertError> {
    let prepared = prepare(source, dialect);
    tracing::debug!(
        syntax = %dialect.syntax,
        macros = prepared.macros.len(),
        abbreviations = prepared.abbreviations.len(),
        references = prepared.references.len(),
        "pre-passes done"
    );

    let arena = Arena::new();
    let options = comrak_options(dialect);
    let root = parse_document(&arena, &prepared.text, &options);

    let mut lowering = Lowering {
        dialect,
        macros: &prepared.macros,
        macro_sources: &prepared.macro_sources,
        lines: prepared.text.split('\n').collect(),
        depth: 0,
    };
    let mut children = lowering.lower_children(root)?;

    if !prepared.abbreviations.is_empty() {
        let abbreviations = Abbreviations::new(&prepared.abbreviations);
        for child in &mut children {
            abbreviations.apply(child);
        }
    }

    let mut document = Document::new(children).with_references(prepared.references);
    merge_inline_html(&mut document.root);
    Ok(document)
}

fn comrak_options(dialect: &DialectConfig) -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = dialect.has(Extension::Tables);
    // Subscripts share the tilde delimiter and are told apart while lowering.
    options.extension.strikethrough =
        dialect.has(Extension::Strikethrough) || dialect.has(Extension::Subscript);
    options.extension.superscript = dialect.has(Extension::Superscript);
    options.extension.description_lists = dialect.has(Extension::Definitions);
    options.extension.wikilinks_title_before_pipe = dialect.has(Extension::WikiLinks);
    options.extension.autolink =
        dialect.has(Extension::Autolink) || dialect.family == EmulationFamily::Github;
    options
}

/// Source after the dialect pre-passes, plus what they collected.
#[derive(Debug, Default)]
struct Prepared {
    text: String,
    macros: Vec<Node>,
    /// Source text of each entry in `macros`.
    macro_sources: Vec<String>,
    abbreviations: Vec<(String, String)>,
    references: ReferenceRepository,
}

/// Run the line based pre-passes. Fenced code is copied through untouched.
fn prepare(source: &str, dialect: &DialectConfig) -> Prepared {
    let with_macros = dialect.has(Extension::Macros);
    let with_wiki_links = dialect.has(Extension::WikiLinks);
    let with_abbreviations = dialect.has(Extension::Abbreviations);

    let mut prepared = Prepared::default();
    let mut fence: Option<(char, usize)> = None;
    let mut rest = source;

    while !rest.is_empty() {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = &rest[..line_end];

        if let Some(open) = fence {
            if closes_fence(line, open) {
                fence = None;
            }
            prepared.text.push_str(line);
            rest = &rest[line_end..];
            continue;
        }
        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            prepared.text.push_str(line);
            rest = &rest[line_end..];
            continue;
        }

        let indent = line.len() - line.trim_start_matches(' ').len();
        if with_macros && indent < 4 && line[indent..].starts_with("{{") {
            if let Some(consumed) = block_macro(&rest[indent..], &mut prepared) {
                rest = &rest[indent + consumed..];
                continue;
            }
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        if with_abbreviations {
            if let Some(caps) = ABBREVIATION_DEFINITION.captures(trimmed) {
                prepared
                    .abbreviations
                    .push((caps[1].trim().to_string(), caps[2].to_string()));
                rest = &rest[line_end..];
                continue;
            }
        }
        if let Some(caps) = REFERENCE_DEFINITION.captures(trimmed) {
            let title = caps
                .get(3)
                .or_else(|| caps.get(4))
                .or_else(|| caps.get(5))
                .map(|m| m.as_str().to_string());
            prepared.references.define(&caps[1], &caps[2], title);
        }

        if with_macros || with_wiki_links {
            inline_pass(line, &mut prepared, with_macros, with_wiki_links);
        } else {
            prepared.text.push_str(line);
        }
        rest = &rest[line_end..];
    }

    prepared
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    (run >= 3).then_some((marker, run))
}

fn closes_fence(line: &str, (marker, length): (char, usize)) -> bool {
    let trimmed = line.trim();
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= length && run == trimmed.chars().count()
}

/// Replace a macro spanning whole lines with a placeholder block. Returns the bytes consumed.
fn block_macro(text: &str, prepared: &mut Prepared) -> Option<usize> {
    let (found, used) = scan_macro(text)?;
    let after = &text[used..];
    let tail = after.find('\n').map(|i| i + 1).unwrap_or(after.len());
    if !after[..tail].trim().is_empty() {
        return None;
    }

    let index = prepared.macros.len();
    prepared.macros.push(Node::new(NodeKind::MacroBlock {
        info: found.info,
        content: found.content,
    }));
    prepared.macro_sources.push(text[..used].to_string());
    prepared
        .text
        .push_str(&format!("\n{BLOCK_PLACEHOLDER}{index}-->\n\n"));
    Some(used + tail)
}

/// Copy `line`, replacing inline macros and marking wiki images outside code spans.
fn inline_pass(line: &str, prepared: &mut Prepared, with_macros: bool, with_wiki_links: bool) {
    let mut cursor = 0;
    while cursor < line.len() {
        let rest = &line[cursor..];
        let Some(offset) = rest.find(['`', '{', '!']) else {
            prepared.text.push_str(rest);
            return;
        };
        prepared.text.push_str(&rest[..offset]);
        cursor += offset;
        let rest = &line[cursor..];

        if rest.starts_with('`') {
            let span = code_span_length(rest);
            prepared.text.push_str(&rest[..span]);
            cursor += span;
            continue;
        }

        if rest.starts_with('!') {
            prepared.text.push('!');
            if with_wiki_links && rest.starts_with("![[") {
                prepared.text.push(WIKI_IMAGE);
            }
            cursor += 1;
            continue;
        }

        match scan_macro(rest).filter(|_| with_macros) {
            Some((found, used)) => {
                let index = prepared.macros.len();
                prepared.macros.push(Node::new(NodeKind::InlineMacro {
                    info: found.info,
                    content: found.content,
                }));
                prepared.macro_sources.push(rest[..used].to_string());
                prepared
                    .text
                    .push_str(&format!("{INLINE_OPEN}{index}{INLINE_CLOSE}"));
                cursor += used;
            }
            None => {
                prepared.text.push('{');
                cursor += 1;
            }
        }
    }
}

/// Length of the code span starting at `text`, or of the bare backtick run if it is unclosed.
fn code_span_length(text: &str) -> usize {
    let run = text.chars().take_while(|c| *c == '`').count();
    let fence = &text[..run];
    let mut search = run;
    while let Some(found) = text[search..].find(fence) {
        let start = search + found;
        let length = text[start..].chars().take_while(|c| *c == '`').count();
        if length == run {
            return start + run;
        }
        search = start + length;
    }
    run
}

/// Turns the comrak tree into generic nodes.
struct Lowering<'p> {
    dialect: &'p DialectConfig,
    macros: &'p [Node],
    macro_sources: &'p [String],
    lines: Vec<&'p str>,
    depth: usize,
}

impl<'p> Lowering<'p> {
    fn lower_children<'a>(&mut self, node: &'a AstNode<'a>) -> Result<Vec<Node>, ConvertError> {
        self.depth += 1;
        if self.depth > self.dialect.max_depth {
            let sourcepos = node.data.borrow().sourcepos;
            return Err(ConvertError::nesting_too_deep(
                self.dialect.max_depth,
                self.line_at(sourcepos),
            ));
        }

        let mut children = Vec::new();
        for child in node.children() {
            children.extend(self.lower(child)?);
        }
        self.depth -= 1;
        Ok(attach_wiki_images(merge_adjacent_text(children)))
    }

    /// Lower one node. Wrappers without a counterpart dissolve into their children.
    fn lower<'a>(&mut self, node: &'a AstNode<'a>) -> Result<Vec<Node>, ConvertError> {
        let data = node.data.borrow();
        let kind = match &data.value {
            NodeValue::Paragraph => NodeKind::Paragraph,
            NodeValue::Heading(heading) => NodeKind::Heading {
                level: heading.level,
            },
            NodeValue::Text(text) => return self.text(text, data.sourcepos),
            NodeValue::Emph => NodeKind::Emphasis,
            NodeValue::Strong => NodeKind::Strong,
            NodeValue::Strikethrough => {
                if self.dialect.has(Extension::Subscript) && self.is_single_tilde(data.sourcepos)
                {
                    NodeKind::Subscript
                } else {
                    NodeKind::Strikethrough
                }
            }
            NodeValue::Superscript => NodeKind::Superscript,
            NodeValue::Link(link) => {
                let bracketed = self.starts_with_bracket(data.sourcepos);
                let (url, title) = (link.url.clone(), link.title.clone());
                drop(data);
                let children = self.lower_children(node)?;
                return Ok(vec![link_node(&url, &title, bracketed, children)]);
            }
            NodeValue::Image(link) => NodeKind::Image {
                url: link.url.clone(),
                title: link.title.clone(),
            },
            NodeValue::WikiLink(wiki) => {
                let children = self.lower_children(node)?;
                return Ok(vec![wiki_link_node(&wiki.url, &children)]);
            }
            NodeValue::List(list) => match list.list_type {
                ListType::Bullet => NodeKind::BulletList,
                ListType::Ordered => NodeKind::OrderedList,
            },
            NodeValue::Item(_) => NodeKind::ListItem,
            NodeValue::DescriptionList => NodeKind::DefinitionList,
            NodeValue::DescriptionTerm => NodeKind::DefinitionTerm,
            NodeValue::DescriptionDetails => NodeKind::DefinitionItem,
            NodeValue::BlockQuote => NodeKind::BlockQuote,
            NodeValue::Table(table) => {
                let alignments = table.alignments.clone();
                drop(data);
                return Ok(vec![self.table(node, &alignments)?]);
            }
            NodeValue::Code(code) => return Ok(vec![Node::new(NodeKind::Code(code.literal.clone()))]),
            NodeValue::CodeBlock(block) => {
                let literal = self.restore_markers(&block.literal);
                let kind = if block.fenced {
                    NodeKind::FencedCodeBlock {
                        info: block.info.clone(),
                        literal,
                    }
                } else {
                    NodeKind::IndentedCodeBlock(literal)
                };
                return Ok(vec![Node::new(kind)]);
            }
            NodeValue::HtmlBlock(html) => return self.html_block(&html.literal, data.sourcepos),
            NodeValue::HtmlInline(html) => {
                let kind = if html.starts_with("<!--") {
                    NodeKind::HtmlComment(html.clone())
                } else {
                    NodeKind::HtmlInline(html.clone())
                };
                return Ok(vec![Node::new(kind)]);
            }
            NodeValue::ThematicBreak => return Ok(vec![Node::new(NodeKind::ThematicBreak)]),
            NodeValue::LineBreak => return Ok(vec![Node::new(NodeKind::HardLineBreak)]),
            NodeValue::SoftBreak => return Ok(vec![Node::new(NodeKind::SoftLineBreak)]),
            NodeValue::FrontMatter(_) => return Ok(Vec::new()),
            other => {
                tracing::trace!(node = ?other, "no generic counterpart, keeping children");
                drop(data);
                return self.lower_children(node);
            }
        };
        drop(data);

        let children = self.lower_children(node)?;
        Ok(vec![Node::with_children(kind, children)])
    }

    fn table<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        alignments: &[TableAlignment],
    ) -> Result<Node, ConvertError> {
        let mut head = Vec::new();
        let mut body = Vec::new();

        for row in node.children() {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            let mut cells = Vec::new();
            for (column, cell) in row.children().enumerate() {
                let alignment = match alignments.get(column) {
                    Some(TableAlignment::Left) => Some(Alignment::Left),
                    Some(TableAlignment::Right) => Some(Alignment::Right),
                    Some(TableAlignment::Center) => Some(Alignment::Center),
                    _ => None,
                };
                let kind = NodeKind::TableCell {
                    header,
                    span: 1,
                    alignment,
                };
                cells.push(Node::with_children(kind, self.lower_children(cell)?));
            }

            let row = Node::with_children(NodeKind::TableRow, cells);
            if header {
                head.push(row);
            } else {
                body.push(row);
            }
        }

        let mut sections = Vec::new();
        if !head.is_empty() {
            sections.push(Node::with_children(NodeKind::TableHead, head));
        }
        if !body.is_empty() {
            sections.push(Node::with_children(NodeKind::TableBody, body));
        }
        Ok(Node::with_children(NodeKind::Table, sections))
    }

    fn html_block(&self, literal: &str, sourcepos: Sourcepos) -> Result<Vec<Node>, ConvertError> {
        let trimmed = literal.trim();
        match trimmed
            .strip_prefix(BLOCK_PLACEHOLDER)
            .and_then(|rest| rest.strip_suffix("-->"))
        {
            Some(index) => Ok(vec![self.placeholder(index, sourcepos)?]),
            None => Ok(vec![Node::new(NodeKind::HtmlBlock(literal.to_string()))]),
        }
    }

    /// Split text around inline macro markers.
    fn text(&self, text: &str, sourcepos: Sourcepos) -> Result<Vec<Node>, ConvertError> {
        let mut nodes = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find(INLINE_OPEN) {
            let Some(close) = rest[open..].find(INLINE_CLOSE).map(|at| open + at) else {
                break;
            };
            if open > 0 {
                nodes.push(Node::text(&rest[..open]));
            }
            let index = &rest[open + INLINE_OPEN.len_utf8()..close];
            nodes.push(self.placeholder(index, sourcepos)?);
            rest = &rest[close + INLINE_CLOSE.len_utf8()..];
        }
        if !rest.is_empty() {
            nodes.push(Node::text(rest));
        }
        Ok(nodes)
    }

    fn placeholder(&self, index: &str, sourcepos: Sourcepos) -> Result<Node, ConvertError> {
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| self.macros.get(i))
            .cloned()
            .ok_or_else(|| {
                ConvertError::parse(
                    format!("dangling macro placeholder {index}"),
                    self.line_at(sourcepos),
                )
            })
    }

    /// Put back the source text the line pass replaced with markers.
    fn restore_markers(&self, text: &str) -> String {
        let mut restored = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find([INLINE_OPEN, WIKI_IMAGE]) {
            restored.push_str(&rest[..open]);
            if rest[open..].starts_with(WIKI_IMAGE) {
                rest = &rest[open + WIKI_IMAGE.len_utf8()..];
                continue;
            }
            let after = &rest[open + INLINE_OPEN.len_utf8()..];
            let source = after.find(INLINE_CLOSE).and_then(|close| {
                let index = after[..close].parse::<usize>().ok()?;
                Some((self.macro_sources.get(index)?, close))
            });
            match source {
                Some((source, close)) => {
                    restored.push_str(source);
                    rest = &after[close + INLINE_CLOSE.len_utf8()..];
                }
                None => {
                    restored.push(INLINE_OPEN);
                    rest = after;
                }
            }
        }
        restored.push_str(rest);
        restored
    }

    /// Whether the inline at `sourcepos` opens with `[`, as bracketed links do.
    fn starts_with_bracket(&self, sourcepos: Sourcepos) -> bool {
        let column = sourcepos.start.column;
        column >= 1 && self.line_at(sourcepos).as_bytes().get(column - 1) == Some(&b'[')
    }

    /// Whether the tilde span at `sourcepos` uses a single `~`.
    fn is_single_tilde(&self, sourcepos: Sourcepos) -> bool {
        let line = self.line_at(sourcepos).as_bytes();
        let column = sourcepos.start.column;
        column >= 1
            && line.get(column - 1) == Some(&b'~')
            && line.get(column) != Some(&b'~')
    }

    fn line_at(&self, sourcepos: Sourcepos) -> &str {
        sourcepos
            .start
            .line
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
            .unwrap_or_default()
    }
}

/// Links not written in brackets whose text repeats their target are autolinks.
fn link_node(url: &str, title: &str, bracketed: bool, children: Vec<Node>) -> Node {
    let text = plain_text(&children);
    if title.is_empty() && !bracketed {
        if text == url {
            return Node::new(NodeKind::AutoLink(url.to_string()));
        }
        if let Some(address) = url.strip_prefix("mailto:") {
            if text == address {
                return Node::new(NodeKind::MailLink(address.to_string()));
            }
        }
    }
    Node::with_children(
        NodeKind::Link {
            url: url.to_string(),
            title: title.to_string(),
        },
        children,
    )
}

fn wiki_link_node(url: &str, children: &[Node]) -> Node {
    let text = plain_text(children);
    let target = url.split('|').next().unwrap_or(url);
    let label = (!text.is_empty() && text != url && text != target).then_some(text);
    Node::new(NodeKind::WikiLink {
        link: url.to_string(),
        label,
    })
}

/// comrak may leave a run of text split over several nodes.
fn merge_adjacent_text(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if let (Some(Node {
            kind: NodeKind::Text(previous),
            ..
        }), NodeKind::Text(text)) = (out.last_mut(), &child.kind)
        {
            previous.push_str(text);
            continue;
        }
        out.push(child);
    }
    out
}

/// `!` right before a wiki link turns it into a wiki image.
fn attach_wiki_images(children: Vec<Node>) -> Vec<Node> {
    let marker: String = ['!', WIKI_IMAGE].iter().collect();
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if let NodeKind::WikiLink { link, label } = &child.kind {
            if let Some(NodeKind::Text(text)) = out.last().map(|n| &n.kind) {
                if let Some(stripped) = text.strip_suffix(marker.as_str()) {
                    let stripped = stripped.to_string();
                    out.pop();
                    if !stripped.is_empty() {
                        out.push(Node::text(stripped));
                    }
                    out.push(Node::new(NodeKind::WikiImage {
                        link: link.clone(),
                        label: label.clone(),
                    }));
                    continue;
                }
            }
        }
        out.push(child);
    }

    // Markers whose wiki link did not materialize.
    for node in &mut out {
        if let NodeKind::Text(text) = &mut node.kind {
            if text.contains(WIKI_IMAGE) {
                text.retain(|c| c != WIKI_IMAGE);
            }
        }
    }
    out
}

fn plain_text(children: &[Node]) -> String {
    children.iter().map(Node::plain_text).collect()
}

/// Defined abbreviations, longest key first so that overlapping keys prefer the longer one.
struct Abbreviations {
    pattern: Option<Regex>,
    entries: Vec<(String, String)>,
}

impl Abbreviations {
    fn new(definitions: &[(String, String)]) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (key, expansion) in definitions {
            if !entries.iter().any(|(k, _)| k == key) {
                entries.push((key.clone(), expansion.clone()));
            }
        }
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let alternatives: Vec<String> = entries.iter().map(|(k, _)| regex::escape(k)).collect();
        let pattern = Regex::new(&format!("(?:{})", alternatives.join("|")))
            .map_err(|err| tracing::warn!(error = %err, "abbreviation keys do not compile"))
            .ok();
        Abbreviations { pattern, entries }
    }

    fn apply(&self, node: &mut Node) {
        if matches!(
            node.kind,
            NodeKind::Code(_)
                | NodeKind::FencedCodeBlock { .. }
                | NodeKind::IndentedCodeBlock(_)
                | NodeKind::MacroBlock { .. }
                | NodeKind::InlineMacro { .. }
        ) {
            return;
        }
        let children = std::mem::take(&mut node.children);
        for child in children {
            match &child.kind {
                NodeKind::Text(text) => node.children.extend(self.split(text)),
                _ => {
                    let mut child = child;
                    self.apply(&mut child);
                    node.children.push(child);
                }
            }
        }
    }

    /// Split text into plain runs and abbreviations. Matches must stand as whole words.
    fn split(&self, text: &str) -> Vec<Node> {
        let Some(pattern) = &self.pattern else {
            return vec![Node::text(text)];
        };

        let mut nodes = Vec::new();
        let mut last = 0;
        for found in pattern.find_iter(text) {
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            if before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
            {
                continue;
            }
            if found.start() > last {
                nodes.push(Node::text(&text[last..found.start()]));
            }
            let expansion = self
                .entries
                .iter()
                .find(|(key, _)| key == found.as_str())
                .map(|(_, expansion)| expansion.clone());
            nodes.push(Node::new(NodeKind::Abbreviation {
                key: found.as_str().to_string(),
                expansion,
            }));
            last = found.end();
        }
        if last < text.len() {
            nodes.push(Node::text(&text[last..]));
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{COMMONMARK_0_27, MARKDOWN_1_1, MARKDOWN_1_2};
    use pretty_assertions::assert_eq;

    fn parse(source: &str, syntax: &str) -> Vec<Node> {
        let dialect = DialectConfig::for_syntax(syntax).unwrap();
        parse_markdown(source, &dialect).unwrap().root.children
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::with_children(NodeKind::Paragraph, children)
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(
            parse("Hello world", COMMONMARK_0_27),
            vec![paragraph(vec![Node::text("Hello world")])]
        );
    }

    #[test]
    fn test_autolinks_are_recognized() {
        assert_eq!(
            parse("<http://x.test> <john@x.test>", COMMONMARK_0_27),
            vec![paragraph(vec![
                Node::new(NodeKind::AutoLink("http://x.test".into())),
                Node::text(" "),
                Node::new(NodeKind::MailLink("john@x.test".into())),
            ])]
        );
    }

    #[test]
    fn test_bracketed_link_repeating_its_target_is_not_an_autolink() {
        let nodes = parse(
            "[http://x.test](http://x.test) [a@x.test](mailto:a@x.test)",
            COMMONMARK_0_27,
        );
        let inlines = &nodes[0].children;
        assert_eq!(
            inlines[0],
            Node::with_children(
                NodeKind::Link {
                    url: "http://x.test".into(),
                    title: String::new(),
                },
                vec![Node::text("http://x.test")],
            )
        );
        assert!(matches!(inlines[2].kind, NodeKind::Link { ref url, .. } if url == "mailto:a@x.test"));
    }

    #[test]
    fn test_labelled_link_keeps_children() {
        let nodes = parse("[label](http://x.test \"T\")", COMMONMARK_0_27);
        assert_eq!(
            nodes,
            vec![paragraph(vec![Node::with_children(
                NodeKind::Link {
                    url: "http://x.test".into(),
                    title: "T".into(),
                },
                vec![Node::text("label")],
            )])]
        );
    }

    #[test]
    fn test_table_cells_know_header_and_alignment() {
        let nodes = parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n", MARKDOWN_1_2);
        let table = &nodes[0];
        assert_eq!(table.kind, NodeKind::Table);
        let head_cell = &table.children[0].children[0].children[0];
        assert_eq!(
            head_cell.kind,
            NodeKind::TableCell {
                header: true,
                span: 1,
                alignment: Some(Alignment::Left),
            }
        );
        let body_cell = &table.children[1].children[0].children[1];
        assert_eq!(
            body_cell.kind,
            NodeKind::TableCell {
                header: false,
                span: 1,
                alignment: Some(Alignment::Right),
            }
        );
    }

    #[test]
    fn test_tables_need_the_extension() {
        let nodes = parse("| a |\n|---|\n", COMMONMARK_0_27);
        assert_eq!(nodes[0].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_block_macro_is_cut_out() {
        let nodes = parse(
            "Before\n\n{{info title=\"Note\"}}\nBody text\n{{/info}}\n\nAfter",
            MARKDOWN_1_2,
        );
        assert_eq!(nodes.len(), 3);
        assert_eq!(
            nodes[1].kind,
            NodeKind::MacroBlock {
                info: "info title=\"Note\"".into(),
                content: Some("Body text".into()),
            }
        );
    }

    #[test]
    fn test_inline_macro_inside_text() {
        let nodes = parse("a {{time/}} b", MARKDOWN_1_2);
        assert_eq!(
            nodes,
            vec![paragraph(vec![
                Node::text("a "),
                Node::new(NodeKind::InlineMacro {
                    info: "time".into(),
                    content: None,
                }),
                Node::text(" b"),
            ])]
        );
    }

    #[test]
    fn test_macros_in_code_are_left_alone() {
        let nodes = parse("`{{time/}}`\n\n```\n{{toc/}}\n```\n", MARKDOWN_1_2);
        assert_eq!(
            nodes[0],
            paragraph(vec![Node::new(NodeKind::Code("{{time/}}".into()))])
        );
        assert!(matches!(nodes[1].kind, NodeKind::FencedCodeBlock { .. }));
    }

    #[test]
    fn test_indented_code_keeps_macros_and_wiki_images_verbatim() {
        let nodes = parse("para\n\n    {{toc/}}\n    ![[x]]\n", MARKDOWN_1_2);
        assert_eq!(
            nodes[1].kind,
            NodeKind::IndentedCodeBlock("{{toc/}}\n![[x]]\n".into())
        );
    }

    #[test]
    fn test_macros_need_the_extension() {
        let nodes = parse("{{toc/}}", MARKDOWN_1_1);
        assert_eq!(nodes, vec![paragraph(vec![Node::text("{{toc/}}")])]);
    }

    #[test]
    fn test_abbreviations_are_split_out() {
        let nodes = parse("The HTML spec.\n\n*[HTML]: Hyper Text Markup Language", MARKDOWN_1_2);
        assert_eq!(
            nodes,
            vec![paragraph(vec![
                Node::text("The "),
                Node::new(NodeKind::Abbreviation {
                    key: "HTML".into(),
                    expansion: Some("Hyper Text Markup Language".into()),
                }),
                Node::text(" spec."),
            ])]
        );
    }

    #[test]
    fn test_abbreviations_inside_inline_html_keep_their_expansion() {
        let nodes = parse("a <span>HTML</span> b\n\n*[HTML]: Hyper Text", MARKDOWN_1_2);
        assert_eq!(
            nodes,
            vec![paragraph(vec![
                Node::text("a "),
                Node::new(NodeKind::HtmlInline(
                    "<span><abbr title=\"Hyper Text\">HTML</abbr></span>".into()
                )),
                Node::text(" b"),
            ])]
        );
    }

    #[test]
    fn test_abbreviations_match_whole_words_only() {
        let nodes = parse("HTMLish\n\n*[HTML]: Hyper Text", MARKDOWN_1_2);
        assert_eq!(nodes, vec![paragraph(vec![Node::text("HTMLish")])]);
    }

    #[test]
    fn test_reference_definitions_are_collected() {
        let dialect = DialectConfig::for_syntax(COMMONMARK_0_27).unwrap();
        let document =
            parse_markdown("[a][Site]\n\n[site]: http://x.test \"Home\"\n", &dialect).unwrap();
        let definition = document.references.resolve("SITE").unwrap();
        assert_eq!(definition.url, "http://x.test");
        assert_eq!(definition.title.as_deref(), Some("Home"));
    }

    #[test]
    fn test_wiki_links_and_images() {
        let nodes = parse("[[Label|Main.Page]] and ![[photo.png]]", MARKDOWN_1_2);
        let inlines = &nodes[0].children;
        assert_eq!(
            inlines[0].kind,
            NodeKind::WikiLink {
                link: "Main.Page".into(),
                label: Some("Label".into()),
            }
        );
        assert_eq!(
            inlines.last().map(|n| &n.kind),
            Some(&NodeKind::WikiImage {
                link: "photo.png".into(),
                label: None,
            })
        );
    }

    #[test]
    fn test_inline_html_is_merged() {
        let nodes = parse("a <span>b *c*</span> d", COMMONMARK_0_27);
        assert_eq!(
            nodes,
            vec![paragraph(vec![
                Node::text("a "),
                Node::new(NodeKind::HtmlInline("<span>b *c*</span>".into())),
                Node::text(" d"),
            ])]
        );
    }

    #[test]
    fn test_only_the_github_family_links_bare_urls() {
        let with_family = |family| {
            let mut dialect = DialectConfig::for_syntax(COMMONMARK_0_27).unwrap();
            dialect.family = family;
            parse_markdown("see http://x.test", &dialect).unwrap().root.children
        };
        for family in [
            EmulationFamily::CommonMark,
            EmulationFamily::Markdown,
            EmulationFamily::Kramdown,
        ] {
            assert_eq!(
                with_family(family),
                vec![paragraph(vec![Node::text("see http://x.test")])]
            );
        }
        assert_eq!(
            with_family(EmulationFamily::Github),
            vec![paragraph(vec![
                Node::text("see "),
                Node::new(NodeKind::AutoLink("http://x.test".into())),
            ])]
        );
    }

    #[test]
    fn test_nesting_limit() {
        let dialect = DialectConfig::for_syntax(COMMONMARK_0_27)
            .unwrap()
            .with_max_depth(4);
        let result = parse_markdown("> > > > > deep", &dialect);
        assert!(matches!(
            result,
            Err(ConvertError::NestingTooDeep { limit: 4, .. })
        ));
    }
}
