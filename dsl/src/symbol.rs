//! Interned symbols for identifiers and type names.
//!
//! The analyzer compares names constantly: every subtype query, method
//! lookup and scope probe compares two names. Names are therefore interned
//! once into a [SymbolTable] and carried around as [Symbol] handles that
//! compare and hash in O(1). The registry never hands out two handles for
//! the same string, so handle equality is string equality.

use std::collections::HashMap;
use std::fmt;

/// A handle to an interned string.
///
/// Two symbols produced by the same table are equal if and only if they
/// were interned from the same string. Symbols are meaningless without the
/// table that produced them; use [SymbolTable::resolve] to get the text
/// back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// The registry of interned strings.
#[derive(Default)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// Creates an empty registry.
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Returns the handle for the string, interning it first if this is
    /// the first time the string is seen.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.index.get(name) {
            return *symbol;
        }
        let symbol = Symbol(u32::try_from(self.names.len()).expect("symbol registry overflow"));
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), symbol);
        symbol
    }

    /// Returns the string for a handle produced by this table.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        &self.names[symbol.0 as usize]
    }

    /// Returns the number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_when_same_string_then_same_handle() {
        let mut table = SymbolTable::new();
        let first = table.intern("Main");
        let second = table.intern("Main");
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn intern_when_different_strings_then_different_handles() {
        let mut table = SymbolTable::new();
        let upper = table.intern("Main");
        let lower = table.intern("main");
        assert_ne!(upper, lower);
    }

    #[test]
    fn resolve_when_interned_then_returns_original_text() {
        let mut table = SymbolTable::new();
        let symbol = table.intern("SELF_TYPE");
        assert_eq!(table.resolve(symbol), "SELF_TYPE");
    }
}
