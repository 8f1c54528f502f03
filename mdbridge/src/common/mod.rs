//! Helpers shared by the parsing and rendering directions.

pub mod html_merge;
pub mod ids;
pub mod links;
pub mod listeners;
pub mod macros;
pub mod printer;
pub mod table;
