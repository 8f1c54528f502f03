//! Failure modes

use crate::common::dialect;
use mdbridge::ir::events::{Event, ListType};
use mdbridge::{parse_to_events, render_events, ConvertError, DialectConfig, FormatRegistry};

#[test]
fn nesting_past_the_limit_fails() {
    let dialect = dialect("commonmark/0.27").with_max_depth(3);
    let err = parse_to_events("> > > > deep\n", &dialect).unwrap_err();
    assert!(matches!(err, ConvertError::NestingTooDeep { limit: 3, .. }));
}

#[test]
fn nesting_within_the_limit_passes() {
    let dialect = dialect("commonmark/0.27").with_max_depth(8);
    assert!(parse_to_events("> > deep\n", &dialect).is_ok());
}

#[test]
fn unknown_extension_is_rejected() {
    let err = DialectConfig::for_syntax("markdown/1.2")
        .unwrap()
        .with_extensions(["tables", "footnotes"])
        .unwrap_err();
    assert_eq!(err, ConvertError::UnknownExtension("footnotes".to_string()));
}

#[test]
fn unbalanced_events_are_refused() {
    let events = vec![
        Event::BeginList {
            list: ListType::Bulleted,
        },
        Event::BeginListItem,
        Event::word("a"),
        Event::EndList {
            list: ListType::Bulleted,
        },
    ];
    let err = render_events(&events, &dialect("markdown/1.2")).unwrap_err();
    assert!(matches!(err, ConvertError::UnbalancedEvents(_)));
}

#[test]
fn unknown_syntax_is_not_found() {
    let registry = FormatRegistry::default();
    let err = registry.parse_events("x", "markdown/3.0").unwrap_err();
    assert_eq!(err.to_string(), "Syntax 'markdown/3.0' not found");
}
