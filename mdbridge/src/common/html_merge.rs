//! Coalescing of inline HTML.
//!
//! The tokenizer splits `<span>some *text*</span>` into an opening tag, the Markdown inlines
//! between the tags and a closing tag. Embedded HTML is only meaningful as a whole, so this
//! pass folds such runs back into a single [`NodeKind::HtmlInline`] node.

use crate::ir::nodes::{Node, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</?([A-Za-z][A-Za-z0-9-]*)").expect("valid tag pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'a> {
    Open(&'a str),
    Close(&'a str),
    Other,
}

fn classify(html: &str) -> Tag<'_> {
    let trimmed = html.trim();
    let Some(name) = TAG_NAME
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Tag::Other;
    };

    if trimmed.starts_with("</") {
        Tag::Close(name)
    } else if trimmed.ends_with("/>") {
        Tag::Other
    } else {
        Tag::Open(name)
    }
}

/// Merge inline HTML runs everywhere below `node`.
pub fn merge_inline_html(node: &mut Node) {
    for child in &mut node.children {
        merge_inline_html(child);
    }
    if node
        .children
        .iter()
        .any(|child| matches!(child.kind, NodeKind::HtmlInline(_)))
    {
        node.children = merge_siblings(std::mem::take(&mut node.children));
    }
}

fn merge_siblings(children: Vec<Node>) -> Vec<Node> {
    let mut merged = Vec::with_capacity(children.len());
    let mut index = 0;

    while index < children.len() {
        let open_name = match &children[index].kind {
            NodeKind::HtmlInline(html) => match classify(html) {
                Tag::Open(name) => Some(name.to_ascii_lowercase()),
                _ => None,
            },
            _ => None,
        };

        let Some(name) = open_name else {
            merged.push(children[index].clone());
            index += 1;
            continue;
        };

        match find_close(&children, index, &name) {
            Some(close) => {
                let html: String = children[index..=close].iter().map(source_form).collect();
                merged.push(Node::new(NodeKind::HtmlInline(html)));
                index = close + 1;
            }
            None => {
                tracing::warn!(tag = %name, "inline HTML tag is never closed");
                merged.push(children[index].clone());
                index += 1;
            }
        }
    }

    merged
}

/// Index of the sibling closing the tag opened at `open`, counting nested opens.
fn find_close(children: &[Node], open: usize, name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, child) in children[open + 1..].iter().enumerate() {
        let NodeKind::HtmlInline(html) = &child.kind else {
            continue;
        };
        match classify(html) {
            Tag::Open(other) if other.eq_ignore_ascii_case(name) => depth += 1,
            Tag::Close(other) if other.eq_ignore_ascii_case(name) => {
                if depth == 0 {
                    return Some(open + 1 + offset);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Markdown text that produces `node`, as far as inline content goes.
pub fn source_form(node: &Node) -> String {
    let inner = || node.children.iter().map(source_form).collect::<String>();
    match &node.kind {
        NodeKind::Text(text) => text.clone(),
        NodeKind::HtmlInline(html) | NodeKind::HtmlComment(html) | NodeKind::HtmlEntity(html) => {
            html.clone()
        }
        NodeKind::Code(code) => {
            let fence = "`".repeat(longest_backtick_run(code) + 1);
            format!("{fence}{code}{fence}")
        }
        NodeKind::Emphasis => format!("*{}*", inner()),
        NodeKind::Strong => format!("**{}**", inner()),
        NodeKind::Strikethrough => format!("~~{}~~", inner()),
        NodeKind::Superscript => format!("^{}^", inner()),
        NodeKind::Subscript => format!("~{}~", inner()),
        NodeKind::Link { url, title } => format!("[{}]({})", inner(), with_title(url, title)),
        NodeKind::Image { url, title } => format!("![{}]({})", inner(), with_title(url, title)),
        NodeKind::AutoLink(url) => format!("<{url}>"),
        NodeKind::MailLink(address) => format!("<{address}>"),
        NodeKind::LinkRef { raw, .. } | NodeKind::ImageRef { raw, .. } => raw.clone(),
        NodeKind::WikiLink { link, label } => match label {
            Some(label) => format!("[[{label}|{link}]]"),
            None => format!("[[{link}]]"),
        },
        NodeKind::WikiImage { link, label } => match label {
            Some(label) => format!("![[{label}|{link}]]"),
            None => format!("![[{link}]]"),
        },
        NodeKind::Abbreviation { key, expansion } => abbreviation_markup(key, expansion.as_deref()),
        NodeKind::SoftLineBreak => "\n".to_string(),
        NodeKind::HardLineBreak => "  \n".to_string(),
        NodeKind::InlineMacro { info, content } => match content {
            Some(content) => {
                let id = info.split_whitespace().next().unwrap_or_default();
                format!("{{{{{info}}}}}{content}{{{{/{id}}}}}")
            }
            None => format!("{{{{{info}/}}}}"),
        },
        _ => inner(),
    }
}

/// `<abbr>` element for an abbreviation, carrying its expansion as title.
pub(crate) fn abbreviation_markup(key: &str, expansion: Option<&str>) -> String {
    match expansion {
        Some(expansion) => format!(
            "<abbr title=\"{}\">{}</abbr>",
            escape_markup(expansion),
            escape_markup(key)
        ),
        None => format!("<abbr>{}</abbr>", escape_markup(key)),
    }
}

pub(crate) fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn with_title(url: &str, title: &str) -> String {
    if title.is_empty() {
        url.to_string()
    } else {
        format!("{url} \"{title}\"")
    }
}

pub(crate) fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(text: &str) -> Node {
        Node::new(NodeKind::HtmlInline(text.to_string()))
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::with_children(NodeKind::Paragraph, children)
    }

    #[test]
    fn open_and_close_fold_into_one_node() {
        let mut node = paragraph(vec![
            Node::text("a "),
            html("<span class=\"x\">"),
            Node::text("b "),
            Node::with_children(NodeKind::Emphasis, vec![Node::text("c")]),
            html("</span>"),
            Node::text(" d"),
        ]);
        merge_inline_html(&mut node);

        assert_eq!(
            node.children,
            vec![
                Node::text("a "),
                html("<span class=\"x\">b *c*</span>"),
                Node::text(" d"),
            ]
        );
    }

    #[test]
    fn nested_same_name_tags_are_counted() {
        let mut node = paragraph(vec![
            html("<span>"),
            html("<span>"),
            Node::text("x"),
            html("</span>"),
            Node::text("y"),
            html("</span>"),
        ]);
        merge_inline_html(&mut node);
        assert_eq!(
            node.children,
            vec![html("<span><span>x</span>y</span>")]
        );
    }

    #[test]
    fn unclosed_tags_are_left_alone() {
        let children = vec![html("<b>"), Node::text("bold")];
        let mut node = paragraph(children.clone());
        merge_inline_html(&mut node);
        assert_eq!(node.children, children);
    }

    #[test]
    fn self_closing_and_closing_tags_do_not_start_a_run() {
        let children = vec![html("<br/>"), Node::text("x"), html("</i>")];
        let mut node = paragraph(children.clone());
        merge_inline_html(&mut node);
        assert_eq!(node.children, children);
    }

    #[test]
    fn abbreviations_inside_a_run_keep_their_expansion() {
        let mut node = paragraph(vec![
            html("<span>"),
            Node::new(NodeKind::Abbreviation {
                key: "HTML".into(),
                expansion: Some("Hyper Text".into()),
            }),
            html("</span>"),
        ]);
        merge_inline_html(&mut node);
        assert_eq!(
            node.children,
            vec![html("<span><abbr title=\"Hyper Text\">HTML</abbr></span>")]
        );
    }

    #[test]
    fn code_spans_keep_their_fence() {
        assert_eq!(source_form(&Node::new(NodeKind::Code("a`b".into()))), "``a`b``");
    }
}
