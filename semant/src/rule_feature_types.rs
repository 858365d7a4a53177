//! Attribute gathering and feature type checking, one class at a time.
//!
//! For each class the pass opens a class scope, loads every attribute
//! visible along the ancestor chain (rejecting redefinitions with a probe
//! of the accumulated scope), then type checks the class's own features in
//! a nested scope that holds the method formals. Attributes are loaded
//! before any initializer is checked, so an initializer may refer to any
//! attribute of the hierarchy, including ones declared later.
//!
//! A method whose declared return type is `SELF_TYPE` needs a body of
//! exactly `SELF_TYPE`; any other declared type accepts any conforming
//! subtype.

use std::collections::HashMap;

use coolc_dsl::ast::{Class, Feature};
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::{Symbol, SymbolTable};
use coolc_problems::Problem;

use crate::inheritance_graph::InheritanceGraph;
use crate::stdlib::Predefined;
use crate::type_environment::TypeEnvironment;
use crate::typecheck_expression::{conforms, typecheck_expression, TypeCtx};

pub fn apply(
    classes: &mut [Class],
    class_index: &HashMap<Symbol, usize>,
    graph: &InheritanceGraph,
    env: &mut TypeEnvironment,
    predefined: &Predefined,
    symbols: &SymbolTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for position in 0..classes.len() {
        let class_name = classes[position].name;
        env.symbols.enter();
        env.current_class = Some(class_name);

        gather_attributes(
            classes,
            class_index,
            graph,
            env,
            predefined,
            symbols,
            class_name,
            diagnostics,
        );

        let class = &mut classes[position];
        let ctx = TypeCtx {
            graph,
            predefined,
            symbols,
            filename: class.filename,
        };
        for feature in class.features.iter_mut() {
            env.symbols.enter();
            match feature {
                Feature::Method {
                    line,
                    formals,
                    return_type,
                    body,
                    ..
                } => {
                    for formal in formals.iter() {
                        env.symbols.add(&formal.name, formal.declared_type);
                    }
                    if !body.is_no_expr() {
                        if let Some(inferred) = typecheck_expression(env, &ctx, body, diagnostics) {
                            if !conforms(&ctx, class_name, inferred, *return_type) {
                                diagnostics.push(
                                    Diagnostic::problem(
                                        Problem::MethodBodyTypeMismatch,
                                        "Method expression and return type mismatch",
                                    )
                                    .with_location(
                                        FileId::from_string(symbols.resolve(ctx.filename)),
                                        *line,
                                    ),
                                );
                            }
                        }
                    }
                }
                Feature::Attribute {
                    line,
                    declared_type,
                    init,
                    ..
                } => {
                    if !init.is_no_expr() {
                        if let Some(inferred) = typecheck_expression(env, &ctx, init, diagnostics) {
                            if !conforms(&ctx, class_name, inferred, *declared_type) {
                                diagnostics.push(
                                    Diagnostic::problem(
                                        Problem::AttributeInitTypeMismatch,
                                        "Attribute initialization type mismatch",
                                    )
                                    .with_location(
                                        FileId::from_string(symbols.resolve(ctx.filename)),
                                        *line,
                                    ),
                                );
                            }
                        }
                    }
                }
            }
            env.symbols.exit();
        }

        env.current_class = None;
        env.symbols.exit();
    }
}

/// Walks the ancestor chain from `class_name` up to (but not including)
/// the forest root, adding each attribute to the class scope. A name
/// already present anywhere in the accumulated scope is a redefinition;
/// walking child-first, the blame lands on the declaration found later in
/// the walk.
#[allow(clippy::too_many_arguments)]
fn gather_attributes(
    classes: &[Class],
    class_index: &HashMap<Symbol, usize>,
    graph: &InheritanceGraph,
    env: &mut TypeEnvironment,
    predefined: &Predefined,
    symbols: &SymbolTable,
    class_name: Symbol,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut cursor = Some(class_name);
    while let Some(current) = cursor {
        if current == predefined.no_class {
            break;
        }
        let position = class_index
            .get(&current)
            .copied()
            .expect("every ancestor is declared once the hierarchy validates");
        let visited = &classes[position];
        for feature in &visited.features {
            let Feature::Attribute {
                line,
                name,
                declared_type,
                ..
            } = feature
            else {
                continue;
            };
            if *name == predefined.self_name {
                diagnostics.push(
                    Diagnostic::problem(Problem::AttributeNamedSelf, "Attribute cannot be named self")
                        .with_location(
                            FileId::from_string(symbols.resolve(visited.filename)),
                            *line,
                        ),
                );
                continue;
            }
            if env.symbols.probe(name).is_some() {
                diagnostics.push(
                    Diagnostic::problem(
                        Problem::AttributeMultiplyDefined,
                        "Attribute redefined in the same class or class hierarchy.",
                    )
                    .with_location(
                        FileId::from_string(symbols.resolve(visited.filename)),
                        *line,
                    ),
                );
                continue;
            }
            env.symbols.add(name, *declared_type);
        }
        cursor = graph.parent(current);
    }
}
