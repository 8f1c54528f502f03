//! Error types for conversion operations

/// Errors that can occur while parsing Markdown into events or rendering events back
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// Syntax id not found in the registry
    #[error("Syntax '{0}' not found")]
    FormatNotFound(String),

    /// The syntax does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Fatal failure while turning a document into events
    #[error("Failed to parse Markdown content: {message} (near \"{excerpt}\")")]
    Parse { message: String, excerpt: String },

    /// Nesting went past the configured maximum depth
    #[error("Document nesting exceeds the maximum depth of {limit} (near \"{excerpt}\")")]
    NestingTooDeep { limit: usize, excerpt: String },

    #[error("Unknown Markdown extension '{0}'")]
    UnknownExtension(String),

    #[error("Unknown emulation family '{0}'")]
    UnknownFamily(String),

    #[error("Unknown soft break mode '{0}'")]
    UnknownSoftBreak(String),

    /// Begin/end events do not pair up
    #[error("Unbalanced event stream: {0}")]
    UnbalancedEvents(String),
}

impl ConvertError {
    /// Build a parse error, keeping a short excerpt of the offending input.
    pub fn parse(message: impl Into<String>, input: &str) -> Self {
        ConvertError::Parse {
            message: message.into(),
            excerpt: excerpt(input),
        }
    }

    pub fn nesting_too_deep(limit: usize, input: &str) -> Self {
        ConvertError::NestingTooDeep {
            limit,
            excerpt: excerpt(input),
        }
    }
}

const EXCERPT_CHARS: usize = 40;

/// First line of `input`, cut to a few dozen characters.
pub(crate) fn excerpt(input: &str) -> String {
    let line = input.trim_start().lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(EXCERPT_CHARS).collect();
    if line.chars().count() > EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}
