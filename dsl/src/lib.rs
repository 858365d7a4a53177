//! Provides definitions of objects for the Cool language and base
//! implementations of common patterns for working with programs: interned
//! symbols, the abstract syntax tree, diagnostics, and the annotated-tree
//! serializer.

pub mod ast;
pub mod core;
pub mod diagnostic;
pub mod dump;
pub mod symbol;
