//! Event stream views for the inspect command
//!
//! - `events-text`: one event per line, indented by nesting depth
//! - `events-json`: the event list as pretty-printed JSON

use mdbridge::ir::events::{Boundary, Event};
use mdbridge::FormatRegistry;

/// All available inspect transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["events-text", "events-json"];

pub const DEFAULT_TRANSFORM: &str = "events-text";

/// Parse `source` with `syntax` and render the events with the named transform.
pub fn execute_transform(
    registry: &FormatRegistry,
    source: &str,
    syntax: &str,
    transform: &str,
) -> Result<String, String> {
    let events = registry
        .parse_events(source, syntax)
        .map_err(|e| e.to_string())?;

    match transform {
        "events-text" => Ok(events_to_text(&events)),
        "events-json" => serde_json::to_string_pretty(&events)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| format!("JSON serialization failed: {e}")),
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn events_to_text(events: &[Event]) -> String {
    let mut output = String::new();
    let mut depth = 0usize;
    for event in events {
        if event.boundary() == Boundary::End {
            depth = depth.saturating_sub(1);
        }
        output.push_str(&"  ".repeat(depth));
        output.push_str(&event.to_string());
        output.push('\n');
        if event.boundary() == Boundary::Begin {
            depth += 1;
        }
    }
    output
}
