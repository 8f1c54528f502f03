//! Markdown → events

use crate::common::body_events;
use mdbridge::ir::events::{Event, ListType};
use mdbridge::ir::reference::{ResourceReference, ResourceType};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn nested_lists_stay_inside_their_item() {
    let events = body_events("* a\n  * b\n", "commonmark/0.27");
    let bulleted = ListType::Bulleted;
    assert_eq!(
        events,
        vec![
            Event::BeginList { list: bulleted },
            Event::BeginListItem,
            Event::word("a"),
            Event::BeginList { list: bulleted },
            Event::BeginListItem,
            Event::word("b"),
            Event::EndListItem,
            Event::EndList { list: bulleted },
            Event::EndListItem,
            Event::EndList { list: bulleted },
        ]
    );
}

#[test]
fn repeated_headings_get_distinct_ids() {
    let ids: Vec<String> = body_events("# Title\n\n## Title\n", "commonmark/0.27")
        .into_iter()
        .filter_map(|event| match event {
            Event::BeginHeader { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["HTitle", "HTitle0"]);
}

#[test]
fn angle_autolinks_are_free_standing() {
    let free_standing = |source: &str| {
        body_events(source, "commonmark/0.27")
            .into_iter()
            .find_map(|event| match event {
                Event::BeginLink {
                    reference,
                    free_standing,
                    ..
                } => Some((reference, free_standing)),
                _ => None,
            })
            .unwrap()
    };

    let url = ResourceReference::new(ResourceType::Url, "http://x.test");
    assert_eq!(free_standing("<http://x.test>"), (url.clone(), true));
    assert_eq!(free_standing("[label](http://x.test)"), (url.clone(), false));
    assert_eq!(free_standing("[http://x.test](http://x.test)"), (url, false));
    assert!(!free_standing("[a@x.test](mailto:a@x.test)").1);
}

#[test]
fn indented_code_content_is_verbatim() {
    let events = body_events("para\n\n    {{toc/}}\n    ![[x]]\n", "markdown/1.2");
    let content = events.into_iter().find_map(|event| match event {
        Event::Macro { id, content, .. } if id == "code" => content,
        _ => None,
    });
    assert_eq!(content.as_deref(), Some("{{toc/}}\n![[x]]"));
}

#[test]
fn abbreviations_become_raw_html() {
    let events = body_events(
        "*[HTML]: Hyper Text Markup Language\n\nHTML rocks\n",
        "markdown/1.2",
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::RawText { text, .. }
            if text == "<abbr title=\"Hyper Text Markup Language\">HTML</abbr>"
    )));
}

#[test]
fn definition_lists_need_the_extension() {
    let source = "Term\n\n: Details\n";

    let extended = body_events(source, "markdown/1.1");
    assert_eq!(extended[0], Event::BeginDefinitionList);
    assert!(extended.contains(&Event::BeginDefinitionTerm));
    assert!(extended.contains(&Event::word("Details")));

    let base = body_events(source, "commonmark/0.27");
    assert!(!base.contains(&Event::BeginDefinitionList));
}

#[test]
fn wiki_images_carry_their_alt_text() {
    let events = body_events("![[A photo|photo.png]]\n", "markdown/1.2");
    let image = events
        .iter()
        .find_map(|event| match event {
            Event::Image {
                reference,
                parameters,
                ..
            } => Some((reference, parameters)),
            _ => None,
        })
        .unwrap();
    assert_eq!(image.0.kind, ResourceType::Attachment);
    assert_eq!(image.0.reference, "photo.png");
    assert_eq!(image.1["alt"], "A photo");
}

#[rstest]
#[case("commonmark/0.27", Event::Space)]
#[case("markdown/1.0", Event::NewLine)]
#[case("markdown/1.1", Event::NewLine)]
#[case("markdown/1.2", Event::Space)]
fn soft_breaks_follow_the_dialect(#[case] syntax: &str, #[case] expected: Event) {
    let events = body_events("one\ntwo\n", syntax);
    assert_eq!(
        events,
        vec![
            Event::BeginParagraph,
            Event::word("one"),
            expected,
            Event::word("two"),
            Event::EndParagraph,
        ]
    );
}

#[test]
#[tracing_test::traced_test]
fn unclosed_inline_html_is_reported() {
    let events = body_events("a <b>bold\n", "commonmark/0.27");
    assert!(events.contains(&Event::raw_html("<b>")));
    assert!(logs_contain("inline HTML tag is never closed"));
}
