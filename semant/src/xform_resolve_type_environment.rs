//! Gathers classes and method signatures into the type environment.
//!
//! Two passes. The class gather inserts every class name into the
//! outermost scope and builds the class-name index used by later passes.
//! The method gather records a signature per `(class, method)` key while
//! checking the declaration rules: no duplicate method in one class, no
//! formal named `self`, no formal of type `SELF_TYPE`, no duplicate formal
//! names. The gather also establishes whether `Main` declares the
//! parameterless `main()` entry point.

use std::collections::{HashMap, HashSet};

use coolc_dsl::ast::{Class, Feature};
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::{Symbol, SymbolTable};
use coolc_problems::Problem;

use crate::stdlib::Predefined;
use crate::type_environment::{MethodKey, MethodSignature, TypeEnvironment};

pub fn apply(
    classes: &[Class],
    predefined: &Predefined,
    symbols: &SymbolTable,
    env: &mut TypeEnvironment,
    diagnostics: &mut Vec<Diagnostic>,
) -> HashMap<Symbol, usize> {
    // Class gather: the outermost scope maps every class name to itself,
    // and the index maps it to its declaration.
    let mut class_index = HashMap::new();
    for (position, class) in classes.iter().enumerate() {
        env.symbols.add(&class.name, class.name);
        class_index.insert(class.name, position);
    }

    // Method gather.
    let mut main_defined = false;
    for class in classes {
        for feature in &class.features {
            let Feature::Method {
                line,
                name,
                formals,
                return_type,
                ..
            } = feature
            else {
                continue;
            };

            let key = MethodKey {
                class_name: class.name,
                method_name: *name,
            };
            if env.methods.contains_key(&key) {
                diagnostics.push(
                    Diagnostic::problem(
                        Problem::MethodMultiplyDefined,
                        "Method defined twice in the same class.",
                    )
                    .with_location(file_of(class, symbols), *line),
                );
                continue;
            }

            let mut formal_names = HashSet::new();
            for formal in formals {
                if formal.name == predefined.self_name {
                    diagnostics.push(
                        Diagnostic::problem(
                            Problem::FormalNamedSelf,
                            "Formal parameter cannot be named self",
                        )
                        .with_location(file_of(class, symbols), formal.line),
                    );
                }
                if formal.declared_type == predefined.self_type {
                    diagnostics.push(
                        Diagnostic::problem(
                            Problem::FormalSelfTypeParameter,
                            "Formal parameter cannot have type SELF_TYPE",
                        )
                        .with_location(file_of(class, symbols), formal.line),
                    );
                }
                if !formal_names.insert(formal.name) {
                    diagnostics.push(
                        Diagnostic::problem(
                            Problem::FormalMultiplyDefined,
                            "Formal parameter defined twice in the same method",
                        )
                        .with_location(file_of(class, symbols), formal.line),
                    );
                }
            }

            if *name == predefined.main_method
                && class.name == predefined.main_class
                && formals.is_empty()
            {
                main_defined = true;
            }

            env.methods.insert(
                key,
                MethodSignature {
                    return_type: *return_type,
                    formal_types: formals.iter().map(|formal| formal.declared_type).collect(),
                },
            );
        }
    }

    if !main_defined {
        let main = class_index
            .get(&predefined.main_class)
            .map(|position| &classes[*position])
            .expect("Main class exists after inheritance validation");
        diagnostics.push(
            Diagnostic::problem(
                Problem::MainMethodSignature,
                "main() method that takes no params must be declared in Main class",
            )
            .with_location(file_of(main, symbols), main.line),
        );
    }

    class_index
}

fn file_of(class: &Class, symbols: &SymbolTable) -> FileId {
    FileId::from_string(symbols.resolve(class.filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib;
    use crate::test_helpers::TestProgram;

    fn gather(t: &mut TestProgram) -> (TypeEnvironment, Vec<Diagnostic>) {
        let mut classes = stdlib::basic_classes(&t.predefined);
        classes.extend(t.classes.clone());
        let mut env = TypeEnvironment::new();
        let mut diagnostics = Vec::new();
        apply(&classes, &t.predefined, &t.symbols, &mut env, &mut diagnostics);
        (env, diagnostics)
    }

    #[test]
    fn apply_when_main_has_entry_point_then_no_diagnostics() {
        let mut t = TestProgram::new();
        let body = t.int_const("0");
        let main = t.method("main", &[], "Int", body);
        t.class("Main", "Object", vec![main]);
        let (env, diagnostics) = gather(&mut t);
        assert!(diagnostics.is_empty());
        let key = MethodKey {
            class_name: t.sym("Main"),
            method_name: t.sym("main"),
        };
        assert_eq!(env.methods[&key].return_type, t.sym("Int"));
    }

    #[test]
    fn apply_when_method_defined_twice_then_first_signature_kept() {
        let mut t = TestProgram::new();
        let body1 = t.int_const("0");
        let f1 = t.method("f", &[], "Int", body1);
        let body2 = t.string_const("x");
        let f2 = t.method("f", &[], "String", body2);
        let body3 = t.int_const("0");
        let main = t.method("main", &[], "Int", body3);
        t.class("Main", "Object", vec![f1, f2, main]);
        let (env, diagnostics) = gather(&mut t);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::MethodMultiplyDefined.code());
        let key = MethodKey {
            class_name: t.sym("Main"),
            method_name: t.sym("f"),
        };
        assert_eq!(env.methods[&key].return_type, t.sym("Int"));
    }

    #[test]
    fn apply_when_formal_rules_broken_then_one_diagnostic_each() {
        let mut t = TestProgram::new();
        let body = t.int_const("0");
        let bad = t.method(
            "f",
            &[("self", "Int"), ("x", "SELF_TYPE"), ("y", "Int"), ("y", "Bool")],
            "Int",
            body,
        );
        let main_body = t.int_const("0");
        let main = t.method("main", &[], "Int", main_body);
        t.class("Main", "Object", vec![bad, main]);
        let (env, diagnostics) = gather(&mut t);
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                Problem::FormalNamedSelf.code(),
                Problem::FormalSelfTypeParameter.code(),
                Problem::FormalMultiplyDefined.code()
            ]
        );
        // The signature still records every declared formal in order.
        let key = MethodKey {
            class_name: t.sym("Main"),
            method_name: t.sym("f"),
        };
        assert_eq!(env.methods[&key].formal_types.len(), 4);
    }

    #[test]
    fn apply_when_main_method_missing_then_error_on_main_class() {
        let mut t = TestProgram::new();
        let body = t.int_const("0");
        let other = t.method("other", &[], "Int", body);
        t.class("Main", "Object", vec![other]);
        let (_env, diagnostics) = gather(&mut t);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "main() method that takes no params must be declared in Main class"
        );
    }

    #[test]
    fn apply_when_main_method_takes_params_then_entry_point_missing() {
        let mut t = TestProgram::new();
        let body = t.int_const("0");
        let main = t.method("main", &[("x", "Int")], "Int", body);
        t.class("Main", "Object", vec![main]);
        let (_env, diagnostics) = gather(&mut t);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::MainMethodSignature.code());
    }
}
