//! Parsing and serialization of link and image references.
//!
//! A reference is either typed (`doc:Main.WebHome`, `attach:photo.png`, `mailto:john@x.test`)
//! or untyped. Untyped references that parse as absolute URLs with a host are URLs; anything
//! else defaults to a document (links) or an attachment (images).

use crate::common::macros::parse_parameters;
use crate::ir::reference::{ResourceReference, ResourceType};
use url::Url;

const MAILTO_PREFIX: &str = "mailto:";

/// Parse the target of a link.
pub fn parse_link_reference(raw: &str) -> ResourceReference {
    parse_reference(raw, ResourceType::Document)
}

/// Parse the target of an image.
pub fn parse_image_reference(raw: &str) -> ResourceReference {
    parse_reference(raw, ResourceType::Attachment)
}

fn parse_reference(raw: &str, fallback: ResourceType) -> ResourceReference {
    let raw = raw.trim();

    if let Some(address) = raw.strip_prefix(MAILTO_PREFIX) {
        return ResourceReference::new(ResourceType::Mailto, address).typed(true);
    }

    if looks_like_url(raw) {
        return ResourceReference::new(ResourceType::Url, raw);
    }

    if let Some((scheme, rest)) = raw.split_once(':') {
        if let Some(kind) = ResourceType::from_scheme(scheme) {
            return ResourceReference::new(kind, rest).typed(true);
        }
    }

    ResourceReference::new(fallback, raw)
}

fn looks_like_url(raw: &str) -> bool {
    Url::parse(raw).map(|url| url.has_host()).unwrap_or(false)
}

/// Text to put inside `(...)`, `<...>` or `[[...]]` for a reference.
pub fn serialize_reference(reference: &ResourceReference) -> String {
    match reference.kind {
        ResourceType::Url if !reference.typed => reference.reference.clone(),
        ResourceType::Mailto => format!("{MAILTO_PREFIX}{}", reference.reference),
        kind if reference.typed => format!("{}:{}", kind.scheme(), reference.reference),
        _ => reference.reference.clone(),
    }
}

/// Split a wiki link target of the form `reference|key="value" ...`.
///
/// Only `queryString` and `anchor` are kept, and only for document references.
pub fn parse_wiki_link(raw: &str) -> ResourceReference {
    let (target, params) = match raw.split_once('|') {
        Some((target, params)) => (target, Some(params)),
        None => (raw, None),
    };

    let mut reference = parse_link_reference(target);
    if reference.kind == ResourceType::Document {
        if let Some(params) = params {
            for (key, value) in parse_parameters(params) {
                if key == "queryString" || key == "anchor" {
                    reference.parameters.insert(key, value);
                }
            }
        }
    }
    reference
}
