//! Parsers for unified diff text.

mod lenient;
mod unified;

pub use unified::{parse_unified_diff, ParseError};
