//! Intermediate representations shared by every syntax.
//!
//! - [`nodes`]: the generic Markdown AST that parsers lower their input into.
//! - [`events`]: the flat begin/end event stream and the [`events::Listener`] contract.
//! - [`reference`]: link and image targets carried by events.

pub mod events;
pub mod nodes;
pub mod reference;
