//! Builders for analyzer tests.
//!
//! Tests construct programs directly from the dsl objects instead of
//! writing serialized-tree text by hand. Line numbers are assigned from a
//! running counter so diagnostics in tests point at distinct lines.

use coolc_dsl::ast::{CaseBranch, Class, ExprKind, Expression, Feature, Formal, Program};
use coolc_dsl::symbol::{Symbol, SymbolTable};

use crate::result::SemanticResult;
use crate::stdlib::Predefined;

pub struct TestProgram {
    pub symbols: SymbolTable,
    pub predefined: Predefined,
    pub classes: Vec<Class>,
    next_line: u32,
}

impl TestProgram {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let predefined = Predefined::intern(&mut symbols);
        TestProgram {
            symbols,
            predefined,
            classes: Vec::new(),
            next_line: 0,
        }
    }

    pub fn sym(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    fn line(&mut self) -> u32 {
        self.next_line += 1;
        self.next_line
    }

    pub fn class(&mut self, name: &str, parent: &str, features: Vec<Feature>) {
        let line = self.line();
        let name = self.sym(name);
        let parent = self.sym(parent);
        let filename = self.sym("test.cl");
        self.classes.push(Class::new(line, name, parent, filename, features));
    }

    pub fn method(
        &mut self,
        name: &str,
        formals: &[(&str, &str)],
        return_type: &str,
        body: Expression,
    ) -> Feature {
        let line = self.line();
        let formals = formals
            .iter()
            .map(|(formal_name, formal_type)| {
                let formal_name = self.sym(formal_name);
                let formal_type = self.sym(formal_type);
                Formal::new(line, formal_name, formal_type)
            })
            .collect();
        let name = self.sym(name);
        let return_type = self.sym(return_type);
        Feature::method(line, name, formals, return_type, body)
    }

    pub fn attribute(&mut self, name: &str, declared_type: &str, init: Expression) -> Feature {
        let line = self.line();
        let name = self.sym(name);
        let declared_type = self.sym(declared_type);
        Feature::attribute(line, name, declared_type, init)
    }

    pub fn no_expr(&mut self) -> Expression {
        Expression::no_expr(self.line())
    }

    fn expr(&mut self, kind: ExprKind) -> Expression {
        Expression::new(self.line(), kind)
    }

    pub fn object(&mut self, name: &str) -> Expression {
        let name = self.sym(name);
        self.expr(ExprKind::Object { name })
    }

    pub fn self_object(&mut self) -> Expression {
        self.object("self")
    }

    pub fn int_const(&mut self, value: &str) -> Expression {
        let value = self.sym(value);
        self.expr(ExprKind::IntConst { value })
    }

    pub fn bool_const(&mut self, value: bool) -> Expression {
        self.expr(ExprKind::BoolConst { value })
    }

    pub fn string_const(&mut self, value: &str) -> Expression {
        let value = self.sym(value);
        self.expr(ExprKind::StringConst { value })
    }

    pub fn new_object(&mut self, type_name: &str) -> Expression {
        let type_name = self.sym(type_name);
        self.expr(ExprKind::New { type_name })
    }

    pub fn assign(&mut self, name: &str, value: Expression) -> Expression {
        let name = self.sym(name);
        self.expr(ExprKind::Assign {
            name,
            value: Box::new(value),
        })
    }

    pub fn dispatch(&mut self, receiver: Expression, method: &str, args: Vec<Expression>) -> Expression {
        let method = self.sym(method);
        self.expr(ExprKind::Dispatch {
            receiver: Box::new(receiver),
            method,
            args,
        })
    }

    pub fn static_dispatch(
        &mut self,
        receiver: Expression,
        type_name: &str,
        method: &str,
        args: Vec<Expression>,
    ) -> Expression {
        let type_name = self.sym(type_name);
        let method = self.sym(method);
        self.expr(ExprKind::StaticDispatch {
            receiver: Box::new(receiver),
            type_name,
            method,
            args,
        })
    }

    pub fn conditional(
        &mut self,
        pred: Expression,
        then_branch: Expression,
        else_branch: Expression,
    ) -> Expression {
        self.expr(ExprKind::Conditional {
            pred: Box::new(pred),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    pub fn loop_while(&mut self, pred: Expression, body: Expression) -> Expression {
        self.expr(ExprKind::Loop {
            pred: Box::new(pred),
            body: Box::new(body),
        })
    }

    pub fn block(&mut self, body: Vec<Expression>) -> Expression {
        self.expr(ExprKind::Block { body })
    }

    pub fn let_in(
        &mut self,
        name: &str,
        declared_type: &str,
        init: Expression,
        body: Expression,
    ) -> Expression {
        let name = self.sym(name);
        let declared_type = self.sym(declared_type);
        self.expr(ExprKind::Let {
            name,
            declared_type,
            init: Box::new(init),
            body: Box::new(body),
        })
    }

    pub fn branch(&mut self, name: &str, declared_type: &str, body: Expression) -> CaseBranch {
        let line = self.line();
        let name = self.sym(name);
        let declared_type = self.sym(declared_type);
        CaseBranch {
            line,
            name,
            declared_type,
            body,
        }
    }

    pub fn type_case(&mut self, scrutinee: Expression, branches: Vec<CaseBranch>) -> Expression {
        self.expr(ExprKind::TypeCase {
            scrutinee: Box::new(scrutinee),
            branches,
        })
    }

    pub fn plus(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Plus {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn sub(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Sub {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn mul(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Mul {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn divide(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Divide {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn lt(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Lt {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn leq(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Leq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn eq(&mut self, lhs: Expression, rhs: Expression) -> Expression {
        self.expr(ExprKind::Eq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn neg(&mut self, operand: Expression) -> Expression {
        self.expr(ExprKind::Neg {
            operand: Box::new(operand),
        })
    }

    pub fn comp(&mut self, operand: Expression) -> Expression {
        self.expr(ExprKind::Comp {
            operand: Box::new(operand),
        })
    }

    pub fn is_void(&mut self, operand: Expression) -> Expression {
        self.expr(ExprKind::IsVoid {
            operand: Box::new(operand),
        })
    }

    /// Runs the whole pipeline over the accumulated classes. Returns the
    /// analyzed program so tests can inspect the written type slots.
    pub fn analyze(&mut self) -> (Program, SemanticResult) {
        let mut program = Program {
            line: 1,
            classes: std::mem::take(&mut self.classes),
        };
        let result = crate::stages::analyze(&mut program, &mut self.symbols);
        (program, result)
    }
}

/// Returns the body of the named method; panics when absent.
pub fn method_body<'a>(program: &'a Program, symbols: &SymbolTable, class: &str, method: &str) -> &'a Expression {
    for candidate in &program.classes {
        if symbols.resolve(candidate.name) != class {
            continue;
        }
        for feature in &candidate.features {
            if let Feature::Method { name, body, .. } = feature {
                if symbols.resolve(*name) == method {
                    return body;
                }
            }
        }
    }
    panic!("no method {class}::{method} in the analyzed program");
}
