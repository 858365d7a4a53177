//! Reader for the serialized Cool abstract syntax tree.
//!
//! The upstream parser phase writes the tree as line-oriented text; this
//! crate turns that text back into [coolc_dsl::ast] objects, interning
//! every name through the shared symbol registry as it goes.

mod parser;

pub use parser::parse_program;
