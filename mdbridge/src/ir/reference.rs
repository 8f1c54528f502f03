//! Resource references carried by link and image events.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Ordered key/value parameters attached to events and references.
pub type Parameters = BTreeMap<String, String>;

/// What a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Url,
    Mailto,
    Document,
    Page,
    Space,
    Attachment,
    Data,
    Path,
    Unc,
}

impl ResourceType {
    /// Prefix used when the reference is written in typed form (`doc:Main.WebHome`).
    pub fn scheme(self) -> &'static str {
        match self {
            ResourceType::Url => "url",
            ResourceType::Mailto => "mailto",
            ResourceType::Document => "doc",
            ResourceType::Page => "page",
            ResourceType::Space => "space",
            ResourceType::Attachment => "attach",
            ResourceType::Data => "data",
            ResourceType::Path => "path",
            ResourceType::Unc => "unc",
        }
    }

    pub fn from_scheme(scheme: &str) -> Option<Self> {
        [
            ResourceType::Url,
            ResourceType::Mailto,
            ResourceType::Document,
            ResourceType::Page,
            ResourceType::Space,
            ResourceType::Attachment,
            ResourceType::Data,
            ResourceType::Path,
            ResourceType::Unc,
        ]
        .into_iter()
        .find(|kind| kind.scheme() == scheme)
    }

    /// URL-like references render with native Markdown link syntax.
    pub fn is_external(self) -> bool {
        matches!(self, ResourceType::Url | ResourceType::Mailto)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// A link or image target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReference {
    pub kind: ResourceType,
    pub reference: String,
    /// Whether the reference was written with an explicit `kind:` prefix.
    pub typed: bool,
    pub parameters: Parameters,
}

impl ResourceReference {
    pub fn new(kind: ResourceType, reference: impl Into<String>) -> Self {
        ResourceReference {
            kind,
            reference: reference.into(),
            typed: false,
            parameters: Parameters::new(),
        }
    }

    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}
