//! Markdown dialect tests
//!
//! Parsing into events, rendering events back, and the two glued together.

mod errors;
mod export;
mod import;
mod round_trip;
