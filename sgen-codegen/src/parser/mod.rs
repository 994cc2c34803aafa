//! Struct declaration parser module using syn

mod declaration_parser;
mod metadata;

pub use declaration_parser::*;
pub use metadata::*;
