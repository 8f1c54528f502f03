//! Syntax implementations
//!
//! Every syntax converts between source text and the event stream; see [`crate::format`].

pub mod markdown;
pub mod plain;

pub use markdown::MarkdownFormat;
pub use plain::PlainFormat;
