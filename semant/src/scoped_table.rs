//! A table for names. The table maintains scopes and a mapping of a name
//! to data for each item in the scope.
//!
//! The analyzer enters a scope per class, then a nested scope per feature
//! (and per `let` body and `case` branch while walking expressions), and
//! uses the item functions (`add`, `find`, `probe`) as individual names go
//! into and out of definition. A `Block` deliberately does not get a scope
//! of its own.

use std::collections::HashMap;
use std::hash::Hash;

struct Scope<K: Eq + Hash + Clone, V: Clone> {
    table: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V: Clone> Scope<K, V> {
    fn new() -> Self {
        Scope {
            table: HashMap::new(),
        }
    }

    fn add(&mut self, name: &K, value: V) {
        self.table.insert(name.clone(), value);
    }

    fn find(&self, name: &K) -> Option<&V> {
        self.table.get(name)
    }
}

/// A stack of scopes. Later scopes hide declarations from earlier ones.
pub struct ScopedTable<K: Eq + Hash + Clone, V: Clone> {
    stack: Vec<Scope<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> ScopedTable<K, V> {
    /// Creates a table with a single outermost scope.
    pub fn new() -> Self {
        ScopedTable {
            stack: vec![Scope::new()],
        }
    }

    /// Enters a new scope.
    ///
    /// This creates a new context that can hide declarations
    /// from outer scopes.
    pub fn enter(&mut self) {
        self.stack.push(Scope::new())
    }

    /// Exits the current scope.
    ///
    /// This removes the current scope. Every `enter` must be matched by
    /// exactly one `exit` on all return paths.
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Adds the given name to the innermost scope with the specified value.
    pub fn add(&mut self, name: &K, value: V) {
        if let Some(scope) = self.stack.last_mut() {
            scope.add(name, value);
        }
    }

    /// Returns the value for the given name, searching from the innermost
    /// scope outward.
    pub fn find(&self, name: &K) -> Option<&V> {
        self.stack.iter().rev().find_map(|scope| scope.find(name))
    }

    /// Returns the value for the given name in the innermost scope only.
    pub fn probe(&self, name: &K) -> Option<&V> {
        self.stack.last().and_then(|scope| scope.find(name))
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for ScopedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
