//! Parse, render, parse again: the second parse must see the same document.

use crate::common::{dialect, fixture};
use mdbridge::{parse_to_events, render_events};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn assert_stable(source: &str, syntax: &str) {
    let dialect = dialect(syntax);
    let first = parse_to_events(source, &dialect).unwrap();
    let rendered = render_events(&first, &dialect).unwrap();
    let second = parse_to_events(&rendered, &dialect).unwrap();
    assert_eq!(first, second, "rendered as:\n{rendered}");
}

#[rstest]
#[case("commonmark/0.27")]
#[case("markdown/1.0")]
#[case("markdown/1.1")]
#[case("markdown/1.2")]
#[case("markdown+github/1.0")]
fn basic_document_is_stable(#[case] syntax: &str) {
    assert_stable(&fixture("basic.md"), syntax);
}

#[rstest]
#[case("markdown/1.2")]
#[case("markdown+github/1.0")]
fn wiki_document_is_stable(#[case] syntax: &str) {
    assert_stable(&fixture("wiki.md"), syntax);
}

#[test]
fn rendering_is_idempotent() {
    let dialect = dialect("markdown/1.2");
    let once = render_events(
        &parse_to_events(&fixture("wiki.md"), &dialect).unwrap(),
        &dialect,
    )
    .unwrap();
    let twice = render_events(&parse_to_events(&once, &dialect).unwrap(), &dialect).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn escaped_markers_survive() {
    assert_stable("\\* not a list and 1\\. not ordered\n", "commonmark/0.27");
    assert_stable("a \\_b\\_ c\n", "markdown/1.2");
}
