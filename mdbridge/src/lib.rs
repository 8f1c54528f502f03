//! Bidirectional bridge between Markdown dialects and a document event stream
//!
//!     Parsing turns Markdown into a flat stream of begin/end events; rendering turns such a
//!     stream back into Markdown. Any syntax that speaks the event contract can sit on either
//!     side, so converting between dialects is parse with one and render with the other.
//!
//!     This is a pure lib, that is, it powers mdbridge-cli but is shell agnostic: no code here
//!     prints to stdout, reads env vars or touches the filesystem.
//!
//! Architecture
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── dialect.rs              # Syntax ids, extensions, per-dialect settings
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── transforms.rs           # parse / render / convert pipelines
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parser.rs       # comrak → generic AST, dialect pre-passes
//!     │   │   ├── visitor.rs      # generic AST → events
//!     │   │   ├── serializer.rs   # events → Markdown text
//!     │   │   ├── escape.rs       # escaping of reserved characters
//!     │   │   └── mod.rs
//!     │   └── plain               # plain/1.0 and the inline tokenizer
//!     ├── ir                      # Generic AST, events, references
//!     └── common                  # Helpers shared by both directions
//!
//! Parsing
//!
//!     comrak parses the source (after a line pass for the constructs comrak has no extension
//!     for: macros, abbreviations, wiki images). Its tree is lowered into the generic AST of
//!     [`ir::nodes`], adjacent inline HTML is merged, and [`formats::markdown::visitor`] walks
//!     the result. The visitor sends events through a listener stack whose frames rewrite
//!     context-dependent constructs: paragraphs inside list items are dissolved, paragraphs
//!     inside quotations become quotation lines, headings are buffered to derive their ids.
//!
//! Rendering
//!
//!     [`formats::markdown::serializer::MarkdownRenderer`] prints events as they arrive. Text is
//!     held back until the next piece of syntax so the escaper knows where it sits. Dialect
//!     differences are deltas keyed on [`dialect::RenderLevel`] over a single base renderer.
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common                  # Shared helpers
//!     ├── fixtures                # Sample documents
//!     └── markdown
//!         └── <area>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to
//!     include these in the mod.
pub mod dialect;
pub mod error;
pub mod format;
pub mod formats;
pub mod registry;
pub mod transforms;

pub mod common;
pub mod ir;

pub use dialect::{DialectConfig, EmulationFamily, Extension, RenderLevel, SoftBreak};
pub use error::ConvertError;
pub use format::Format;
pub use ir::events::{Event, Listener};
pub use registry::FormatRegistry;
pub use transforms::{convert, parse_to_events, render_events};
