//! Events → Markdown

use crate::common::{dialect, render};
use mdbridge::ir::events::{Event, FormatKind};
use mdbridge::ir::reference::Parameters;
use mdbridge::render_events;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn formatted(format: FormatKind) -> Vec<Event> {
    vec![
        Event::BeginDocument {
            metadata: Parameters::new(),
        },
        Event::BeginParagraph,
        Event::BeginFormat { format },
        Event::word("x"),
        Event::EndFormat { format },
        Event::EndParagraph,
        Event::EndDocument {
            metadata: Parameters::new(),
        },
    ]
}

#[rstest]
#[case("commonmark/0.27", "<del>x</del>")]
#[case("markdown/1.0", "<del>x</del>")]
#[case("markdown/1.1", "<del>x</del>")]
#[case("markdown/1.2", "~~x~~")]
#[case("markdown+github/1.0", "~~x~~")]
fn strikeout_per_dialect(#[case] syntax: &str, #[case] expected: &str) {
    let output = render_events(&formatted(FormatKind::Strikeout), &dialect(syntax)).unwrap();
    assert_eq!(output, expected);
}

#[rstest]
#[case("commonmark/0.27", "<sup>x</sup>")]
#[case("markdown/1.0", "<sup>x</sup>")]
#[case("markdown/1.1", "^x^")]
#[case("markdown/1.2", "^x^")]
fn superscript_per_dialect(#[case] syntax: &str, #[case] expected: &str) {
    let output = render_events(&formatted(FormatKind::Superscript), &dialect(syntax)).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn table_columns_fit_the_widest_cell() {
    let output = render(
        "| longer cell | b |\n|---|---|\n| x | y |\n",
        "markdown/1.2",
        "markdown/1.2",
    );
    assert_eq!(
        output,
        "| longer cell |  b  |\n| ----------- | --- |\n|      x      |  y  |"
    );
}

#[test]
fn ordered_lists_lose_their_start_number() {
    assert_eq!(
        render("3. first\n4. second\n", "commonmark/0.27", "commonmark/0.27"),
        "1. first\n1. second"
    );
}

#[test]
fn wiki_links_render_natively_only_in_wiki_dialects() {
    let source = "[[Main.WebHome]]\n";
    assert_eq!(
        render(source, "markdown/1.2", "markdown/1.2"),
        "[[Main.WebHome]]"
    );
    assert_eq!(
        render(source, "markdown/1.2", "commonmark/0.27"),
        "[Main.WebHome](Main.WebHome)"
    );
}

#[test]
fn markdown_significant_text_is_escaped() {
    let events = vec![
        Event::BeginParagraph,
        Event::word("#"),
        Event::Space,
        Event::word("not"),
        Event::Space,
        Event::word("a"),
        Event::Space,
        Event::word("heading"),
        Event::EndParagraph,
    ];
    let output = render_events(&events, &dialect("commonmark/0.27")).unwrap();
    assert_eq!(output, "\\# not a heading");
}

#[test]
fn cross_dialect_conversion_downgrades_wiki_syntax() {
    let output = render(
        &crate::common::fixture("wiki.md"),
        "markdown/1.2",
        "commonmark/0.27",
    );
    assert!(output.contains("[Home](Main.WebHome)"));
    assert!(output.contains("<del>old</del>"));
    assert!(output.contains("<abbr title=\"Hyper Text Markup Language\">HTML</abbr>"));
    assert!(!output.contains("*[HTML]"));
}

#[test]
fn abbreviations_inside_inline_html_keep_the_footer() {
    let output = render(
        "a <span>HTML</span> b\n\n*[HTML]: Hyper Text\n",
        "markdown/1.2",
        "markdown/1.2",
    );
    assert!(output.contains("a <span>HTML</span> b"));
    assert!(output.contains("*[HTML]: Hyper Text"));
}

#[test]
fn images_without_alt_text_use_their_target() {
    let output = render(
        "![](http://x.test/a.png)\n",
        "commonmark/0.27",
        "commonmark/0.27",
    );
    assert_eq!(output.trim_end(), "![http://x.test/a.png](http://x.test/a.png)");
}

#[test]
fn basic_fixture_renders_canonically() {
    let output = render(
        &crate::common::fixture("basic.md"),
        "commonmark/0.27",
        "commonmark/0.27",
    );
    insta::assert_snapshot!(output, @r"
    # Title

    A paragraph with _emphasis_, **strong** and `code`.

    * one
    * two
        * nested

    > quoted

    1. first
    1. second

    ---

    A [link](http://x.test) and <http://y.test>.

    ## Title
    ");
}
