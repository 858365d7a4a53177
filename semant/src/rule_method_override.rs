//! Semantic rule that checks that a method redefined in a subclass keeps
//! the inherited signature: the same declared return type and the same
//! ordered formal types.
//!
//! ## Passes
//!
//! ```text
//! class A { f(x: Int): Int { x }; };
//! class B inherits A { f(x: Int): Int { 0 }; };
//! ```
//!
//! ## Fails
//!
//! ```text
//! class A { f(x: Int): Int { x }; };
//! class B inherits A { f(x: String): Int { 0 }; };
//! ```

use coolc_dsl::ast::{Class, Feature};
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::SymbolTable;
use coolc_problems::Problem;

use crate::inheritance_graph::InheritanceGraph;
use crate::type_environment::{MethodKey, TypeEnvironment};

pub fn apply(
    classes: &[Class],
    graph: &InheritanceGraph,
    env: &TypeEnvironment,
    symbols: &SymbolTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for class in classes {
        for feature in &class.features {
            let Feature::Method { line, name, .. } = feature else {
                continue;
            };
            let child_key = MethodKey {
                class_name: class.name,
                method_name: *name,
            };
            let Some(child_signature) = env.methods.get(&child_key) else {
                continue;
            };

            // Walk every ancestor: a mismatch anywhere up the chain is an
            // error, reported once per method.
            let mut cursor = graph.parent(class.name);
            while let Some(ancestor) = cursor {
                let parent_key = MethodKey {
                    class_name: ancestor,
                    method_name: *name,
                };
                if let Some(parent_signature) = env.methods.get(&parent_key) {
                    if parent_signature != child_signature {
                        diagnostics.push(
                            Diagnostic::problem(
                                Problem::OverrideMismatch,
                                format!(
                                    "Method redefined in {} does not match parent class method signature",
                                    symbols.resolve(class.name)
                                ),
                            )
                            .with_location(
                                FileId::from_string(symbols.resolve(class.filename)),
                                *line,
                            ),
                        );
                        break;
                    }
                }
                cursor = graph.parent(ancestor);
            }
        }
    }
}
