//! The expression type rules.
//!
//! One recursive function over the closed expression union. On success the
//! inferred type is written into the node's type slot and returned; on
//! failure a diagnostic is emitted and the slot stays unset. A caller that
//! sees an unset child result propagates it without raising a second
//! diagnostic for the same node, but keeps checking sibling expressions so
//! independent errors are all reported in one run.
//!
//! `SELF_TYPE` flows through these rules as itself and is only mapped to
//! the current class where a concrete class is required: the left side of
//! a conformance check, the operands of a least upper bound, and the
//! lookup root of a dispatch.

use std::collections::HashSet;

use coolc_dsl::ast::{ExprKind, Expression};
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::{Symbol, SymbolTable};
use coolc_problems::Problem;

use crate::inheritance_graph::InheritanceGraph;
use crate::stdlib::Predefined;
use crate::type_environment::TypeEnvironment;

/// The read-only context of a check: the validated hierarchy, the
/// predefined names, the registry for message formatting, and the file of
/// the class being checked.
pub struct TypeCtx<'a> {
    pub graph: &'a InheritanceGraph,
    pub predefined: &'a Predefined,
    pub symbols: &'a SymbolTable,
    pub filename: Symbol,
}

impl TypeCtx<'_> {
    fn diagnostic(&self, problem: Problem, message: impl Into<String>, line: u32) -> Diagnostic {
        Diagnostic::problem(problem, message).with_location(
            FileId::from_string(self.symbols.resolve(self.filename)),
            line,
        )
    }
}

/// `sub` conforms to `sup` under the current class.
///
/// `SELF_TYPE ⊑ SELF_TYPE`; a concrete type never conforms to
/// `SELF_TYPE`; `SELF_TYPE ⊑ T` behaves as the current class; otherwise
/// walk the parent chain. A type that is not in the hierarchy (a declared
/// type that was never defined) conforms to nothing.
pub fn conforms(ctx: &TypeCtx, current_class: Symbol, sub: Symbol, sup: Symbol) -> bool {
    let self_type = ctx.predefined.self_type;
    if sub == self_type && sup == self_type {
        return true;
    }
    if sup == self_type {
        return false;
    }
    let sub = if sub == self_type { current_class } else { sub };
    ctx.graph.is_child_of_or_equal(sub, sup)
}

/// Least upper bound of two static types under the current class.
///
/// Unknown types widen to `Object`, the ancestor every well-formed class
/// shares.
pub fn least_upper_bound(ctx: &TypeCtx, current_class: Symbol, left: Symbol, right: Symbol) -> Symbol {
    let self_type = ctx.predefined.self_type;
    if left == self_type && right == self_type {
        return self_type;
    }
    let left = if left == self_type { current_class } else { left };
    let right = if right == self_type { current_class } else { right };
    ctx.graph
        .first_common_ancestor(left, right)
        .unwrap_or(ctx.predefined.object)
}

/// Infers the static type of `expr`, writing it into the node on success.
pub fn typecheck_expression(
    env: &mut TypeEnvironment,
    ctx: &TypeCtx,
    expr: &mut Expression,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Symbol> {
    let p = ctx.predefined;
    let current_class = env
        .current_class
        .expect("current class is bound while checking expressions");
    let line = expr.line;

    let inferred: Option<Symbol> = match &mut expr.kind {
        ExprKind::IntConst { .. } => Some(p.int),
        ExprKind::BoolConst { .. } => Some(p.boolean),
        ExprKind::StringConst { .. } => Some(p.string),

        ExprKind::Object { name } => {
            if *name == p.self_name {
                Some(p.self_type)
            } else {
                match env.symbols.find(name) {
                    Some(declared) => Some(*declared),
                    None => {
                        diagnostics.push(ctx.diagnostic(
                            Problem::UnboundIdentifier,
                            "Identifier not defined in this scope",
                            line,
                        ));
                        None
                    }
                }
            }
        }

        // Cool permits `new SELF_TYPE`; the static type stays SELF_TYPE.
        ExprKind::New { type_name } => Some(*type_name),

        ExprKind::Assign { name, value } => {
            let value_type = typecheck_expression(env, ctx, value, diagnostics);
            let declared = env.symbols.find(name).copied();
            match (value_type, declared) {
                (Some(value_type), Some(declared))
                    if conforms(ctx, current_class, value_type, declared) =>
                {
                    Some(value_type)
                }
                (Some(_), _) => {
                    diagnostics.push(ctx.diagnostic(
                        Problem::AssignTypeMismatch,
                        "Assignment expression has a static type that does not match the identifier, or the identifier type is unknown",
                        line,
                    ));
                    None
                }
                (None, _) => None,
            }
        }

        // A block does not open a scope; its type is the type of the last
        // expression.
        ExprKind::Block { body } => {
            let mut result = None;
            for expr in body.iter_mut() {
                result = typecheck_expression(env, ctx, expr, diagnostics);
            }
            result
        }

        ExprKind::Conditional {
            pred,
            then_branch,
            else_branch,
        } => {
            let pred_type = typecheck_expression(env, ctx, pred, diagnostics);
            let pred_ok = match pred_type {
                Some(pred_type) if pred_type == p.boolean => true,
                Some(_) => {
                    diagnostics.push(ctx.diagnostic(
                        Problem::PredicateNotBool,
                        "Predicate of a conditional must be Bool",
                        line,
                    ));
                    false
                }
                None => false,
            };
            let then_type = typecheck_expression(env, ctx, then_branch, diagnostics);
            let else_type = typecheck_expression(env, ctx, else_branch, diagnostics);
            match (pred_ok, then_type, else_type) {
                (true, Some(then_type), Some(else_type)) => {
                    Some(least_upper_bound(ctx, current_class, then_type, else_type))
                }
                _ => None,
            }
        }

        ExprKind::Loop { pred, body } => {
            let pred_type = typecheck_expression(env, ctx, pred, diagnostics);
            let pred_ok = match pred_type {
                Some(pred_type) if pred_type == p.boolean => true,
                Some(_) => {
                    diagnostics.push(ctx.diagnostic(
                        Problem::PredicateNotBool,
                        "Predicate of a loop must be Bool",
                        line,
                    ));
                    false
                }
                None => false,
            };
            let body_type = typecheck_expression(env, ctx, body, diagnostics);
            if pred_ok && body_type.is_some() {
                Some(p.object)
            } else {
                None
            }
        }

        ExprKind::IsVoid { operand } => {
            typecheck_expression(env, ctx, operand, diagnostics).map(|_| p.boolean)
        }

        ExprKind::Comp { operand } => {
            match typecheck_expression(env, ctx, operand, diagnostics) {
                Some(operand_type) if operand_type == p.boolean => Some(p.boolean),
                Some(_) => {
                    diagnostics.push(ctx.diagnostic(
                        Problem::ComplementTypeMismatch,
                        "Argument of not must be Bool",
                        line,
                    ));
                    None
                }
                None => None,
            }
        }

        ExprKind::Neg { operand } => {
            match typecheck_expression(env, ctx, operand, diagnostics) {
                Some(operand_type) if operand_type == p.int => Some(p.int),
                Some(_) => {
                    diagnostics.push(ctx.diagnostic(
                        Problem::NegationTypeMismatch,
                        "Argument of ~ must be Int",
                        line,
                    ));
                    None
                }
                None => None,
            }
        }

        ExprKind::Plus { lhs, rhs }
        | ExprKind::Sub { lhs, rhs }
        | ExprKind::Mul { lhs, rhs }
        | ExprKind::Divide { lhs, rhs } => {
            int_operands(env, ctx, lhs, rhs, line, diagnostics).map(|()| p.int)
        }

        ExprKind::Lt { lhs, rhs } | ExprKind::Leq { lhs, rhs } => {
            int_operands(env, ctx, lhs, rhs, line, diagnostics).map(|()| p.boolean)
        }

        ExprKind::Eq { lhs, rhs } => {
            let lhs_type = typecheck_expression(env, ctx, lhs, diagnostics);
            let rhs_type = typecheck_expression(env, ctx, rhs, diagnostics);
            match (lhs_type, rhs_type) {
                (Some(lhs_type), Some(rhs_type)) => {
                    let one_is_basic = p.is_basic_value_class(lhs_type)
                        || p.is_basic_value_class(rhs_type);
                    if one_is_basic && lhs_type != rhs_type {
                        diagnostics.push(ctx.diagnostic(
                            Problem::EqualityBasicTypeMismatch,
                            "Comparison can only be made between two basic types",
                            line,
                        ));
                    }
                    // The node is still Bool so the misuse does not
                    // cascade into enclosing expressions.
                    Some(p.boolean)
                }
                _ => None,
            }
        }

        ExprKind::Let {
            name,
            declared_type,
            init,
            body,
        } => {
            let mut poisoned = false;
            if *name == p.self_name {
                diagnostics.push(ctx.diagnostic(
                    Problem::LetSelfBinding,
                    "self cannot be bound in a let expression",
                    line,
                ));
                poisoned = true;
            }
            if !init.is_no_expr() {
                match typecheck_expression(env, ctx, init, diagnostics) {
                    Some(init_type) => {
                        if !conforms(ctx, current_class, init_type, *declared_type) {
                            diagnostics.push(ctx.diagnostic(
                                Problem::LetInitTypeMismatch,
                                "Let initialization expression does not conform to the declared type",
                                line,
                            ));
                            poisoned = true;
                        }
                    }
                    None => poisoned = true,
                }
            }
            env.symbols.enter();
            env.symbols.add(name, *declared_type);
            let body_type = typecheck_expression(env, ctx, body, diagnostics);
            env.symbols.exit();
            if poisoned {
                None
            } else {
                body_type
            }
        }

        ExprKind::TypeCase {
            scrutinee,
            branches,
        } => {
            let mut poisoned = typecheck_expression(env, ctx, scrutinee, diagnostics).is_none();
            let mut seen_types = HashSet::new();
            let mut result: Option<Symbol> = None;
            for branch in branches.iter_mut() {
                if branch.name == p.self_name {
                    diagnostics.push(ctx.diagnostic(
                        Problem::CaseSelfBinding,
                        "self cannot be bound in a case branch",
                        branch.line,
                    ));
                    poisoned = true;
                }
                if !seen_types.insert(branch.declared_type) {
                    diagnostics.push(ctx.diagnostic(
                        Problem::CaseDuplicateBranchType,
                        "Duplicate branch type in case expression",
                        branch.line,
                    ));
                    poisoned = true;
                }
                env.symbols.enter();
                env.symbols.add(&branch.name, branch.declared_type);
                let branch_type = typecheck_expression(env, ctx, &mut branch.body, diagnostics);
                env.symbols.exit();
                match branch_type {
                    Some(branch_type) => {
                        result = Some(match result {
                            None => branch_type,
                            Some(accumulated) => {
                                least_upper_bound(ctx, current_class, accumulated, branch_type)
                            }
                        })
                    }
                    None => poisoned = true,
                }
            }
            if poisoned {
                None
            } else {
                result
            }
        }

        ExprKind::Dispatch {
            receiver,
            method,
            args,
        } => {
            let receiver_type = typecheck_expression(env, ctx, receiver, diagnostics);
            let method = *method;
            check_dispatch(
                env,
                ctx,
                current_class,
                receiver_type,
                receiver_type.map(|receiver_type| {
                    if receiver_type == p.self_type {
                        current_class
                    } else {
                        receiver_type
                    }
                }),
                method,
                args,
                line,
                diagnostics,
            )
        }

        ExprKind::StaticDispatch {
            receiver,
            type_name,
            method,
            args,
        } => {
            let receiver_type = typecheck_expression(env, ctx, receiver, diagnostics);
            let type_name = *type_name;
            let method = *method;
            if type_name == p.self_type {
                diagnostics.push(ctx.diagnostic(
                    Problem::StaticDispatchSelfType,
                    "Static dispatch to SELF_TYPE is not allowed",
                    line,
                ));
                // Still visit the arguments for their own diagnostics.
                for arg in args.iter_mut() {
                    typecheck_expression(env, ctx, arg, diagnostics);
                }
                None
            } else {
                let receiver_conforms = match receiver_type {
                    Some(receiver_type) => {
                        let ok = conforms(ctx, current_class, receiver_type, type_name);
                        if !ok {
                            diagnostics.push(ctx.diagnostic(
                                Problem::StaticDispatchTypeMismatch,
                                "Expression type does not conform to the static dispatch type",
                                line,
                            ));
                        }
                        ok
                    }
                    None => false,
                };
                let result = check_dispatch(
                    env,
                    ctx,
                    current_class,
                    receiver_type,
                    Some(type_name),
                    method,
                    args,
                    line,
                    diagnostics,
                );
                if receiver_conforms {
                    result
                } else {
                    None
                }
            }
        }

        // NoExpr is never reached by the recursive walk: feature checking
        // tests for the sentinel before descending.
        ExprKind::NoExpr => unreachable!("NoExpr must not be type checked"),
    };

    if let Some(inferred) = inferred {
        expr.ty = Some(inferred);
    }
    inferred
}

/// Both operands of an arithmetic or ordering operator must be Int.
fn int_operands(
    env: &mut TypeEnvironment,
    ctx: &TypeCtx,
    lhs: &mut Expression,
    rhs: &mut Expression,
    line: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<()> {
    let lhs_type = typecheck_expression(env, ctx, lhs, diagnostics);
    let rhs_type = typecheck_expression(env, ctx, rhs, diagnostics);
    let p = ctx.predefined;
    match (lhs_type, rhs_type) {
        (Some(lhs_type), Some(rhs_type)) => {
            if lhs_type == p.int && rhs_type == p.int {
                Some(())
            } else {
                diagnostics.push(ctx.diagnostic(
                    Problem::ArithmeticTypeMismatch,
                    "Operation is only valid between two Ints",
                    line,
                ));
                None
            }
        }
        _ => None,
    }
}

/// Shared tail of dynamic and static dispatch: resolve the method from
/// the lookup root, check the arguments positionally, and compute the
/// result type. A declared return of SELF_TYPE yields the receiver's own
/// static type.
#[allow(clippy::too_many_arguments)]
fn check_dispatch(
    env: &mut TypeEnvironment,
    ctx: &TypeCtx,
    current_class: Symbol,
    receiver_type: Option<Symbol>,
    lookup_root: Option<Symbol>,
    method: Symbol,
    args: &mut [Expression],
    line: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Symbol> {
    let signature = lookup_root
        .and_then(|root| env.resolve_method(ctx.graph, root, method))
        .map(|(_, signature)| signature.clone());

    let signature = match signature {
        Some(signature) => Some(signature),
        None => {
            if lookup_root.is_some() {
                diagnostics.push(ctx.diagnostic(
                    Problem::DispatchUndefinedMethod,
                    "Tried to call method that was not defined in the specified class hierarchy",
                    line,
                ));
            }
            None
        }
    };

    let mut poisoned = receiver_type.is_none() || signature.is_none();
    if let Some(signature) = &signature {
        if args.len() != signature.formal_types.len() {
            diagnostics.push(ctx.diagnostic(
                Problem::DispatchWrongArgumentCount,
                "Method called with wrong number of arguments",
                line,
            ));
            poisoned = true;
        }
    }

    for (position, arg) in args.iter_mut().enumerate() {
        match typecheck_expression(env, ctx, arg, diagnostics) {
            Some(arg_type) => {
                let formal_type = signature
                    .as_ref()
                    .and_then(|signature| signature.formal_types.get(position));
                if let Some(formal_type) = formal_type {
                    if !conforms(ctx, current_class, arg_type, *formal_type) {
                        diagnostics.push(ctx.diagnostic(
                            Problem::DispatchArgumentTypeMismatch,
                            "Argument type does not conform to the formal parameter type",
                            arg.line,
                        ));
                        poisoned = true;
                    }
                }
            }
            None => poisoned = true,
        }
    }

    if poisoned {
        return None;
    }
    let signature = signature.expect("dispatch signature resolved when not poisoned");
    let receiver_type = receiver_type.expect("receiver typed when not poisoned");
    if signature.return_type == ctx.predefined.self_type {
        Some(receiver_type)
    } else {
        Some(signature.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{method_body, TestProgram};
    use coolc_dsl::ast::Program;
    use rstest::rstest;

    /// Wraps one expression as the body of `Main.main(): Object` plus any
    /// extra features, then runs the pipeline.
    fn analyze_main(
        t: &mut TestProgram,
        return_type: &str,
        body: Expression,
        mut extra: Vec<coolc_dsl::ast::Feature>,
    ) -> (Program, Vec<Diagnostic>) {
        let main = t.method("main", &[], return_type, body);
        extra.push(main);
        t.class("Main", "Object", extra);
        let (program, result) = t.analyze();
        (program, result.err().unwrap_or_default())
    }

    fn main_body_type(program: &Program, t: &mut TestProgram) -> Option<String> {
        let body = method_body(program, &t.symbols, "Main", "main");
        body.ty.map(|ty| t.symbols.resolve(ty).to_string())
    }

    #[test]
    fn typecheck_when_constants_then_basic_types() {
        let mut t = TestProgram::new();
        let int = t.int_const("1");
        let string = t.string_const("s");
        let boolean = t.bool_const(true);
        let body = t.block(vec![int, string, boolean]);
        let (program, diagnostics) = analyze_main(&mut t, "Bool", body, vec![]);
        assert!(diagnostics.is_empty());
        // The block takes the type of its last expression.
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Bool"));
    }

    #[test]
    fn typecheck_when_self_then_self_type() {
        let mut t = TestProgram::new();
        let body = t.self_object();
        let (program, diagnostics) = analyze_main(&mut t, "SELF_TYPE", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("SELF_TYPE"));
    }

    #[test]
    fn typecheck_when_identifier_unbound_then_error() {
        let mut t = TestProgram::new();
        let body = t.object("ghost");
        let (program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics.len(), 1, "the failed body raises no second diagnostic");
        assert_eq!(diagnostics[0].code, Problem::UnboundIdentifier.code());
        assert_eq!(main_body_type(&program, &mut t), None);
    }

    #[rstest]
    #[case(TestProgram::plus, "Int")]
    #[case(TestProgram::sub, "Int")]
    #[case(TestProgram::mul, "Int")]
    #[case(TestProgram::divide, "Int")]
    #[case(TestProgram::lt, "Bool")]
    #[case(TestProgram::leq, "Bool")]
    fn typecheck_when_int_operator_then_result_type(
        #[case] op: fn(&mut TestProgram, Expression, Expression) -> Expression,
        #[case] expected: &str,
    ) {
        let mut t = TestProgram::new();
        let lhs = t.int_const("1");
        let rhs = t.int_const("2");
        let body = op(&mut t, lhs, rhs);
        let (program, diagnostics) = analyze_main(&mut t, expected, body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            main_body_type(&program, &mut t).as_deref(),
            Some(expected)
        );
    }

    #[rstest]
    #[case(TestProgram::plus)]
    #[case(TestProgram::lt)]
    fn typecheck_when_int_operator_on_string_then_error(
        #[case] op: fn(&mut TestProgram, Expression, Expression) -> Expression,
    ) {
        let mut t = TestProgram::new();
        let lhs = t.int_const("1");
        let rhs = t.string_const("two");
        let body = op(&mut t, lhs, rhs);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::ArithmeticTypeMismatch.code());
    }

    #[test]
    fn typecheck_when_neg_and_comp_then_typed() {
        let mut t = TestProgram::new();
        let one = t.int_const("1");
        let neg = t.neg(one);
        let tru = t.bool_const(true);
        let comp = t.comp(tru);
        let void = t.self_object();
        let isvoid = t.is_void(void);
        let eq = t.eq(comp, isvoid);
        let body = t.block(vec![neg, eq]);
        let (_program, diagnostics) = analyze_main(&mut t, "Bool", body, vec![]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn typecheck_when_comp_of_int_then_error() {
        let mut t = TestProgram::new();
        let one = t.int_const("1");
        let body = t.comp(one);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::ComplementTypeMismatch.code());
    }

    #[test]
    fn typecheck_when_eq_mixes_basic_and_class_then_error_but_bool() {
        let mut t = TestProgram::new();
        let one = t.int_const("1");
        let obj = t.new_object("Object");
        let body = t.eq(one, obj);
        let (program, diagnostics) = analyze_main(&mut t, "Bool", body, vec![]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Problem::EqualityBasicTypeMismatch.code());
        // The node is still annotated Bool so the misuse does not cascade.
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Bool"));
    }

    #[test]
    fn typecheck_when_eq_between_classes_then_ok() {
        let mut t = TestProgram::new();
        t.class("A", "Object", vec![]);
        let a = t.new_object("A");
        let obj = t.new_object("Object");
        let body = t.eq(a, obj);
        let (_program, diagnostics) = analyze_main(&mut t, "Bool", body, vec![]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn typecheck_when_assign_subtype_then_value_type() {
        let mut t = TestProgram::new();
        t.class("A", "Object", vec![]);
        t.class("B", "A", vec![]);
        let init = t.no_expr();
        let attr = t.attribute("a", "A", init);
        let value = t.new_object("B");
        let body = t.assign("a", value);
        let (program, diagnostics) = analyze_main(&mut t, "B", body, vec![attr]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("B"));
    }

    #[test]
    fn typecheck_when_assign_unrelated_then_error() {
        let mut t = TestProgram::new();
        let init = t.no_expr();
        let attr = t.attribute("a", "Int", init);
        let value = t.string_const("no");
        let body = t.assign("a", value);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![attr]);
        assert_eq!(diagnostics[0].code, Problem::AssignTypeMismatch.code());
    }

    #[test]
    fn typecheck_when_conditional_then_least_upper_bound() {
        let mut t = TestProgram::new();
        t.class("A", "Object", vec![]);
        t.class("B", "A", vec![]);
        t.class("C", "A", vec![]);
        let pred = t.bool_const(true);
        let then_branch = t.new_object("B");
        let else_branch = t.new_object("C");
        let body = t.conditional(pred, then_branch, else_branch);
        let (program, diagnostics) = analyze_main(&mut t, "A", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("A"));
    }

    #[test]
    fn typecheck_when_conditional_pred_not_bool_then_error() {
        let mut t = TestProgram::new();
        let pred = t.int_const("1");
        let then_branch = t.int_const("2");
        let else_branch = t.int_const("3");
        let body = t.conditional(pred, then_branch, else_branch);
        let (program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::PredicateNotBool.code());
        assert_eq!(main_body_type(&program, &mut t), None);
    }

    #[test]
    fn typecheck_when_loop_then_object() {
        let mut t = TestProgram::new();
        let pred = t.bool_const(false);
        let inner = t.int_const("1");
        let body = t.loop_while(pred, inner);
        let (program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Object"));
    }

    #[test]
    fn typecheck_when_loop_pred_not_bool_then_error() {
        let mut t = TestProgram::new();
        let pred = t.int_const("1");
        let inner = t.int_const("2");
        let body = t.loop_while(pred, inner);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::PredicateNotBool.code());
    }

    #[test]
    fn typecheck_when_let_then_body_type_with_binding() {
        let mut t = TestProgram::new();
        let init = t.int_const("5");
        let use_x = t.object("x");
        let one = t.int_const("1");
        let sum = t.plus(use_x, one);
        let body = t.let_in("x", "Int", init, sum);
        let (program, diagnostics) = analyze_main(&mut t, "Int", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Int"));
    }

    #[test]
    fn typecheck_when_let_shadows_attribute_then_inner_type_wins() {
        let mut t = TestProgram::new();
        let attr_init = t.no_expr();
        let attr = t.attribute("x", "String", attr_init);
        let init = t.int_const("5");
        let use_x = t.object("x");
        let body = t.let_in("x", "Int", init, use_x);
        let (program, diagnostics) = analyze_main(&mut t, "Int", body, vec![attr]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Int"));
    }

    #[test]
    fn typecheck_when_let_binds_self_then_error() {
        let mut t = TestProgram::new();
        let init = t.int_const("5");
        let inner = t.int_const("0");
        let body = t.let_in("self", "Int", init, inner);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::LetSelfBinding.code());
    }

    #[test]
    fn typecheck_when_let_init_does_not_conform_then_error() {
        let mut t = TestProgram::new();
        let init = t.string_const("five");
        let inner = t.int_const("0");
        let body = t.let_in("x", "Int", init, inner);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::LetInitTypeMismatch.code());
    }

    #[test]
    fn typecheck_when_case_then_branch_lub() {
        let mut t = TestProgram::new();
        t.class("A", "Object", vec![]);
        t.class("B", "A", vec![]);
        t.class("C", "A", vec![]);
        let scrutinee = t.new_object("A");
        let body_b = t.new_object("B");
        let branch_b = t.branch("b", "B", body_b);
        let body_c = t.new_object("C");
        let branch_c = t.branch("c", "C", body_c);
        let body = t.type_case(scrutinee, vec![branch_b, branch_c]);
        let (program, diagnostics) = analyze_main(&mut t, "A", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("A"));
    }

    #[test]
    fn typecheck_when_case_branch_types_repeat_then_error() {
        let mut t = TestProgram::new();
        let scrutinee = t.int_const("1");
        let body_a = t.int_const("1");
        let branch_a = t.branch("a", "Int", body_a);
        let body_b = t.int_const("2");
        let branch_b = t.branch("b", "Int", body_b);
        let body = t.type_case(scrutinee, vec![branch_a, branch_b]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::CaseDuplicateBranchType.code());
    }

    #[test]
    fn typecheck_when_case_binds_self_then_error() {
        let mut t = TestProgram::new();
        let scrutinee = t.int_const("1");
        let body_a = t.int_const("1");
        let branch_a = t.branch("self", "Int", body_a);
        let body = t.type_case(scrutinee, vec![branch_a]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::CaseSelfBinding.code());
    }

    #[test]
    fn typecheck_when_dispatch_on_self_then_self_type_result() {
        // out_string returns SELF_TYPE, so dispatching through self keeps
        // SELF_TYPE as the static type.
        let mut t = TestProgram::new();
        let receiver = t.self_object();
        let arg = t.string_const("Hi");
        let body = t.dispatch(receiver, "out_string", vec![arg]);
        let main = t.method("main", &[], "SELF_TYPE", body);
        t.class("Main", "IO", vec![main]);
        let (program, result) = t.analyze();
        assert!(result.is_ok());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("SELF_TYPE"));
    }

    #[test]
    fn typecheck_when_dispatch_on_concrete_receiver_then_receiver_type() {
        let mut t = TestProgram::new();
        let receiver = t.new_object("IO");
        let arg = t.int_const("1");
        let body = t.dispatch(receiver, "out_int", vec![arg]);
        let (program, diagnostics) = analyze_main(&mut t, "IO", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("IO"));
    }

    #[test]
    fn typecheck_when_dispatch_to_missing_method_then_error() {
        let mut t = TestProgram::new();
        let receiver = t.self_object();
        let body = t.dispatch(receiver, "vanish", vec![]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::DispatchUndefinedMethod.code());
        assert_eq!(
            diagnostics[0].message,
            "Tried to call method that was not defined in the specified class hierarchy"
        );
    }

    #[test]
    fn typecheck_when_dispatch_arity_wrong_then_error() {
        let mut t = TestProgram::new();
        let receiver = t.new_object("String");
        let arg = t.int_const("1");
        let body = t.dispatch(receiver, "length", vec![arg]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(
            diagnostics[0].code,
            Problem::DispatchWrongArgumentCount.code()
        );
    }

    #[test]
    fn typecheck_when_dispatch_argument_does_not_conform_then_error() {
        let mut t = TestProgram::new();
        let receiver = t.new_object("IO");
        let arg = t.string_const("not an int");
        let body = t.dispatch(receiver, "out_int", vec![arg]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(
            diagnostics[0].code,
            Problem::DispatchArgumentTypeMismatch.code()
        );
    }

    #[test]
    fn typecheck_when_static_dispatch_then_uses_named_class() {
        let mut t = TestProgram::new();
        let body_a = t.int_const("1");
        let f_a = t.method("f", &[], "Int", body_a);
        t.class("A", "Object", vec![f_a]);
        let body_b = t.int_const("2");
        let f_b = t.method("f", &[], "Int", body_b);
        t.class("B", "A", vec![f_b]);
        let receiver = t.new_object("B");
        let body = t.static_dispatch(receiver, "A", "f", vec![]);
        let (program, diagnostics) = analyze_main(&mut t, "Int", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("Int"));
    }

    #[test]
    fn typecheck_when_static_dispatch_to_self_type_then_error() {
        let mut t = TestProgram::new();
        let receiver = t.self_object();
        let body = t.static_dispatch(receiver, "SELF_TYPE", "copy", vec![]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(diagnostics[0].code, Problem::StaticDispatchSelfType.code());
    }

    #[test]
    fn typecheck_when_static_dispatch_receiver_not_subtype_then_error() {
        let mut t = TestProgram::new();
        t.class("A", "Object", vec![]);
        let receiver = t.new_object("Object");
        let body = t.static_dispatch(receiver, "A", "copy", vec![]);
        let (_program, diagnostics) = analyze_main(&mut t, "Object", body, vec![]);
        assert_eq!(
            diagnostics[0].code,
            Problem::StaticDispatchTypeMismatch.code()
        );
    }

    #[test]
    fn typecheck_when_new_self_type_then_preserved() {
        let mut t = TestProgram::new();
        let body = t.new_object("SELF_TYPE");
        let (program, diagnostics) = analyze_main(&mut t, "SELF_TYPE", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("SELF_TYPE"));
    }

    #[test]
    fn typecheck_when_copy_on_self_then_self_type() {
        let mut t = TestProgram::new();
        let receiver = t.self_object();
        let body = t.dispatch(receiver, "copy", vec![]);
        let (program, diagnostics) = analyze_main(&mut t, "SELF_TYPE", body, vec![]);
        assert!(diagnostics.is_empty());
        assert_eq!(main_body_type(&program, &mut t).as_deref(), Some("SELF_TYPE"));
    }
}
