//! Builds the inheritance graph from the class list and checks the
//! structural rules.
//!
//! One pass over the declarations, basic classes first. A class that
//! violates a structural rule is skipped; a cycle is fatal and halts the
//! scan because nothing after it can trust the graph. Two integrity
//! checks run after the scan: every node except the forest root must have
//! been declared (a parent-less node is a parent that was referenced but
//! never defined), and a class named `Main` must exist.
//!
//! ## Passes
//!
//! ```text
//! class Main { main(): Int { 0 }; };
//! ```
//!
//! ## Fails
//!
//! ```text
//! class X inherits Int { };
//! class A inherits B { };
//! class B inherits A { };
//! ```

use coolc_dsl::ast::Class;
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::SymbolTable;
use coolc_problems::Problem;
use log::debug;
use std::collections::HashSet;

use crate::inheritance_graph::InheritanceGraph;
use crate::stdlib::Predefined;

/// Populates the inheritance graph, reporting every structural violation.
///
/// Returns `Ok(InheritanceGraph)` if the hierarchy is sound.
/// Returns `Err(Vec<Diagnostic>)` otherwise; the type checker must not run
/// over an unsound hierarchy.
pub fn apply(
    classes: &[Class],
    predefined: &Predefined,
    symbols: &SymbolTable,
) -> Result<InheritanceGraph, Vec<Diagnostic>> {
    let mut graph = InheritanceGraph::new();
    let mut diagnostics = Vec::new();
    let mut declared = HashSet::new();

    for class in classes {
        let class_name = symbols.resolve(class.name);

        if class.name == predefined.self_type {
            diagnostics.push(located(
                class,
                symbols,
                Problem::SelfTypeRedefined,
                "Redefinition of basic class SELF_TYPE".to_string(),
            ));
            continue;
        }

        if predefined.is_basic_value_class(class.parent) {
            diagnostics.push(located(
                class,
                symbols,
                Problem::BasicClassInheritance,
                format!(
                    "Class {class_name} inherits from either Int, Bool, or String. This is illegal."
                ),
            ));
            continue;
        }

        // Basic classes are installed first, so redefining one of them is
        // reported here against the user's declaration.
        if !declared.insert(class.name) {
            diagnostics.push(located(
                class,
                symbols,
                Problem::ClassMultiplyDefined,
                format!("Class {class_name} multiply defined"),
            ));
            continue;
        }

        if class.parent == class.name {
            diagnostics.push(located(
                class,
                symbols,
                Problem::ClassInheritsFromSelf,
                format!("Class {class_name} inherits from itself"),
            ));
            continue;
        }

        // The parent node may be created before the parent's own
        // declaration is visited; it is filled in later.
        graph.add_node(class.name);
        graph.add_node(class.parent);

        if graph.add_child(class.parent, class.name).is_err() {
            diagnostics.push(located(
                class,
                symbols,
                Problem::InheritanceCycle,
                format!("Cycle detected with class {class_name}"),
            ));
            break;
        }
    }

    // Every node except _no_class must have a parent by now. A node
    // without one was referenced as a parent but never declared; report it
    // on each child, in declaration order.
    for class in classes {
        if class.parent == predefined.no_class {
            continue;
        }
        if graph.contains(class.parent)
            && !graph.has_parent(class.parent)
            && graph.contains(class.name)
        {
            diagnostics.push(located(
                class,
                symbols,
                Problem::ParentNotDefined,
                format!(
                    "parent class of {} is not defined",
                    symbols.resolve(class.name)
                ),
            ));
        }
    }

    if !graph.contains(predefined.main_class) {
        diagnostics.push(Diagnostic::problem(
            Problem::MainNotDefined,
            "Class Main is not defined.",
        ));
    }

    debug!(
        "inheritance graph holds {} nodes, {} descendants of the root",
        graph.node_count(),
        graph.num_descendants(predefined.no_class) + 1
    );

    if diagnostics.is_empty() {
        Ok(graph)
    } else {
        Err(diagnostics)
    }
}

fn located(
    class: &Class,
    symbols: &SymbolTable,
    problem: Problem,
    message: String,
) -> Diagnostic {
    Diagnostic::problem(problem, message).with_location(
        FileId::from_string(symbols.resolve(class.filename)),
        class.line,
    )
}
