//! The analyzer as individual stages (to enable testing).

use coolc_dsl::ast::{Class, Program};
use coolc_dsl::symbol::SymbolTable;
use log::debug;

use crate::result::SemanticResult;
use crate::stdlib::{self, Predefined};
use crate::type_environment::TypeEnvironment;
use crate::{
    rule_feature_types, rule_method_override, xform_resolve_inheritance,
    xform_resolve_type_environment,
};

/// Runs semantic analysis over the program, writing the inferred static
/// type of every expression into the tree.
///
/// Returns `Ok(())` if the program is semantically well formed.
/// Returns `Err(Vec<Diagnostic>)` otherwise; when the inheritance graph
/// itself is unsound the type-checking passes are skipped entirely, since
/// nothing they compute over a broken hierarchy can be trusted.
pub fn analyze(program: &mut Program, symbols: &mut SymbolTable) -> SemanticResult {
    let predefined = Predefined::intern(symbols);

    // The basic classes join the user classes so every pass treats them
    // uniformly; they are split back off before returning.
    let mut classes = stdlib::basic_classes(&predefined);
    let user_start = classes.len();
    classes.append(&mut program.classes);

    let result = check(&mut classes, &predefined, symbols);

    program.classes = classes.split_off(user_start);
    result
}

fn check(classes: &mut [Class], predefined: &Predefined, symbols: &SymbolTable) -> SemanticResult {
    let graph = xform_resolve_inheritance::apply(classes, predefined, symbols)?;

    if log::log_enabled!(log::Level::Debug) {
        if let Some(mut dfs) = graph.dfs(predefined.object) {
            while let Some(class) = dfs.next(&graph) {
                debug!(
                    "class {} has {} descendants",
                    symbols.resolve(class),
                    graph.num_descendants(class)
                );
            }
        }
    }

    let mut diagnostics = Vec::new();
    let mut env = TypeEnvironment::new();
    let class_index = xform_resolve_type_environment::apply(
        classes,
        predefined,
        symbols,
        &mut env,
        &mut diagnostics,
    );
    rule_method_override::apply(classes, &graph, &env, symbols, &mut diagnostics);
    rule_feature_types::apply(
        classes,
        &class_index,
        &graph,
        &mut env,
        predefined,
        symbols,
        &mut diagnostics,
    );

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}
