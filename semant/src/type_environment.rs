//! Type environment for the checking passes: the scoped name table, the
//! method signature map, and the class currently being checked.

use std::collections::HashMap;

use coolc_dsl::symbol::Symbol;

use crate::inheritance_graph::InheritanceGraph;
use crate::scoped_table::ScopedTable;

/// Key for the method map. Cool has no overloading, so a class name plus a
/// method name identifies a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub class_name: Symbol,
    pub method_name: Symbol,
}

/// A method's interface: the declared return type and the declared formal
/// types in parameter order. Two signatures are equal exactly when both
/// parts are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub return_type: Symbol,
    pub formal_types: Vec<Symbol>,
}

/// One environment per type-check invocation. `current_class` is rebound
/// as the outer iteration enters each class.
pub struct TypeEnvironment {
    pub symbols: ScopedTable<Symbol, Symbol>,
    pub methods: HashMap<MethodKey, MethodSignature>,
    pub current_class: Option<Symbol>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        TypeEnvironment {
            symbols: ScopedTable::new(),
            methods: HashMap::new(),
            current_class: None,
        }
    }

    /// Resolves a method by walking the ancestor chain from `class`
    /// upward, the class itself included. Returns the signature and the
    /// class that declares it.
    pub fn resolve_method(
        &self,
        graph: &InheritanceGraph,
        class: Symbol,
        method: Symbol,
    ) -> Option<(Symbol, &MethodSignature)> {
        let mut cursor = Some(class);
        while let Some(class_name) = cursor {
            let key = MethodKey {
                class_name,
                method_name: method,
            };
            if let Some(signature) = self.methods.get(&key) {
                return Some((class_name, signature));
            }
            cursor = graph.parent(class_name);
        }
        None
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coolc_dsl::symbol::SymbolTable;

    #[test]
    fn method_signature_when_same_parts_then_equal() {
        let mut symbols = SymbolTable::new();
        let int = symbols.intern("Int");
        let string = symbols.intern("String");
        let left = MethodSignature {
            return_type: int,
            formal_types: vec![int, string],
        };
        let right = MethodSignature {
            return_type: int,
            formal_types: vec![int, string],
        };
        assert_eq!(left, right);
    }

    #[test]
    fn method_signature_when_formal_order_differs_then_not_equal() {
        let mut symbols = SymbolTable::new();
        let int = symbols.intern("Int");
        let string = symbols.intern("String");
        let left = MethodSignature {
            return_type: int,
            formal_types: vec![int, string],
        };
        let right = MethodSignature {
            return_type: int,
            formal_types: vec![string, int],
        };
        assert_ne!(left, right);
    }

    #[test]
    fn resolve_method_when_declared_in_ancestor_then_found_there() {
        let mut symbols = SymbolTable::new();
        let object = symbols.intern("Object");
        let a = symbols.intern("A");
        let b = symbols.intern("B");
        let f = symbols.intern("f");
        let int = symbols.intern("Int");

        let mut graph = InheritanceGraph::new();
        graph.add_node(object);
        graph.add_node(a);
        graph.add_node(b);
        graph.add_child(object, a).unwrap();
        graph.add_child(a, b).unwrap();

        let mut env = TypeEnvironment::new();
        env.methods.insert(
            MethodKey {
                class_name: a,
                method_name: f,
            },
            MethodSignature {
                return_type: int,
                formal_types: vec![],
            },
        );

        let (declaring, signature) = env.resolve_method(&graph, b, f).expect("inherited method");
        assert_eq!(declaring, a);
        assert_eq!(signature.return_type, int);
        assert!(env.resolve_method(&graph, object, f).is_none());
    }
}
