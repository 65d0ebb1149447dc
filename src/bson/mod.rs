//! BSON helpers for parsing JSON input and rendering documents for output.

mod formatter;
mod parser;

pub use formatter::*;
pub use parser::*;
