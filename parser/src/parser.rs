//! Grammar for the serialized tree format.
//!
//! The format is whitespace-separated tokens: every node starts with a
//! `#<line>` marker followed by its tag (`_class`, `_dispatch`, ...), and
//! every expression ends with a `: <type>` trailer. The trailer is what
//! terminates the body of a `_block` and the branch list of a `_typcase`,
//! so the reader requires it on every expression. The carried type is
//! discarded; the analyzer recomputes every slot, which also makes
//! re-analyzing an already annotated dump produce identical output.
//!
//! Indentation in the dump is cosmetic; the grammar treats all whitespace
//! alike.

use std::cell::RefCell;

use coolc_dsl::ast::{CaseBranch, Class, ExprKind, Expression, Feature, Formal, Program};
use coolc_dsl::core::FileId;
use coolc_dsl::diagnostic::Diagnostic;
use coolc_dsl::symbol::{Symbol, SymbolTable};
use coolc_problems::Problem;

/// Parses a serialized program, interning names into the registry.
///
/// Returns `Ok(Program)` if reading succeeded.
/// Returns `Err(Diagnostic)` if the text is not a valid serialized tree.
pub fn parse_program(
    source: &str,
    file_id: &FileId,
    symbols: &mut SymbolTable,
) -> Result<Program, Diagnostic> {
    let registry = RefCell::new(std::mem::take(symbols));
    let result = serialized_tree::program(source, &registry);
    *symbols = registry.into_inner();

    result.map_err(|e| {
        let expected = Vec::from_iter(e.expected.tokens()).join(", ");
        Diagnostic::problem(
            Problem::SyntaxError,
            format!("Syntax error in serialized tree: expected one of {expected}"),
        )
        .with_location(file_id.clone(), e.location.line as u32)
    })
}

peg::parser! {
    grammar serialized_tree(symbols: &RefCell<SymbolTable>) for str {
        rule _ = quiet!{[' ' | '\t' | '\r' | '\n']*}

        // After a tag literal: no identifier character may follow, so a
        // tag never matches a prefix of a longer token.
        rule tail() = !['a'..='z' | 'A'..='Z' | '0'..='9' | '_'] _

        rule line_marker() -> u32
            = "#" n:$(['0'..='9']+) _ {? n.parse().or(Err("line number")) }

        rule symbol() -> Symbol
            = s:$(['a'..='z' | 'A'..='Z' | '_']['a'..='z' | 'A'..='Z' | '0'..='9' | '_']*) _
              { symbols.borrow_mut().intern(s) }

        rule int_symbol() -> Symbol
            = s:$(['0'..='9']+) _ { symbols.borrow_mut().intern(s) }

        rule bool_value() -> bool
            = "1" _ { true }
            / "0" _ { false }

        rule string_symbol() -> Symbol
            = "\"" parts:(string_char()*) "\"" _ {
                let text: String = parts.into_iter().collect();
                symbols.borrow_mut().intern(&text)
            }

        rule string_char() -> char
            = "\\" c:escape() { c }
            / c:[^ '"' | '\\'] { c }

        rule escape() -> char
            = "n" { '\n' }
            / "t" { '\t' }
            / "b" { '\u{8}' }
            / "f" { '\u{c}' }
            / digits:$(['0'..='7']*<1,3>) {?
                u32::from_str_radix(digits, 8)
                    .ok()
                    .and_then(|value| char::from_u32(value & 0xff))
                    .ok_or("octal escape")
            }
            / c:[_] { c }

        rule lparen() = "(" _
        rule rparen() = ")" _

        // The trailer's type is whatever the upstream phase left there
        // (normally `_no_type`); the analyzer recomputes it.
        rule type_trailer() = ":" _ symbol()

        pub rule program() -> Program
            = _ line:line_marker() "_program" tail() classes:(class_decl()*) ![_]
              { Program { line, classes } }

        rule class_decl() -> Class
            = line:line_marker() "_class" tail()
              name:symbol() parent:symbol() filename:string_symbol()
              lparen() features:(feature()*) rparen()
              { Class::new(line, name, parent, filename, features) }

        rule feature() -> Feature
            = attribute()
            / method()

        rule attribute() -> Feature
            = line:line_marker() "_attr" tail()
              name:symbol() declared_type:symbol() init:expression()
              { Feature::attribute(line, name, declared_type, init) }

        rule method() -> Feature
            = line:line_marker() "_method" tail()
              name:symbol() formals:(formal()*) return_type:symbol() body:expression()
              { Feature::method(line, name, formals, return_type, body) }

        rule formal() -> Formal
            = line:line_marker() "_formal" tail() name:symbol() declared_type:symbol()
              { Formal::new(line, name, declared_type) }

        rule case_branch() -> CaseBranch
            = line:line_marker() "_branch" tail()
              name:symbol() declared_type:symbol() body:expression()
              { CaseBranch { line, name, declared_type, body } }

        rule expression() -> Expression
            = line:line_marker() kind:expr_kind() type_trailer()
              { Expression::new(line, kind) }

        rule expr_kind() -> ExprKind
            = "_assign" tail() name:symbol() value:expression()
              { ExprKind::Assign { name, value: Box::new(value) } }
            / "_static_dispatch" tail() receiver:expression()
              type_name:symbol() method:symbol() lparen() args:(expression()*) rparen()
              { ExprKind::StaticDispatch { receiver: Box::new(receiver), type_name, method, args } }
            / "_dispatch" tail() receiver:expression()
              method:symbol() lparen() args:(expression()*) rparen()
              { ExprKind::Dispatch { receiver: Box::new(receiver), method, args } }
            / "_cond" tail() pred:expression() then_branch:expression() else_branch:expression()
              { ExprKind::Conditional {
                  pred: Box::new(pred),
                  then_branch: Box::new(then_branch),
                  else_branch: Box::new(else_branch),
              } }
            / "_loop" tail() pred:expression() body:expression()
              { ExprKind::Loop { pred: Box::new(pred), body: Box::new(body) } }
            / "_typcase" tail() scrutinee:expression() branches:(case_branch()+)
              { ExprKind::TypeCase { scrutinee: Box::new(scrutinee), branches } }
            / "_block" tail() body:(expression()+)
              { ExprKind::Block { body } }
            / "_let" tail() name:symbol() declared_type:symbol() init:expression() body:expression()
              { ExprKind::Let {
                  name,
                  declared_type,
                  init: Box::new(init),
                  body: Box::new(body),
              } }
            / "_plus" tail() lhs:expression() rhs:expression()
              { ExprKind::Plus { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_sub" tail() lhs:expression() rhs:expression()
              { ExprKind::Sub { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_mul" tail() lhs:expression() rhs:expression()
              { ExprKind::Mul { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_divide" tail() lhs:expression() rhs:expression()
              { ExprKind::Divide { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_neg" tail() operand:expression()
              { ExprKind::Neg { operand: Box::new(operand) } }
            / "_lt" tail() lhs:expression() rhs:expression()
              { ExprKind::Lt { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_eq" tail() lhs:expression() rhs:expression()
              { ExprKind::Eq { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_leq" tail() lhs:expression() rhs:expression()
              { ExprKind::Leq { lhs: Box::new(lhs), rhs: Box::new(rhs) } }
            / "_comp" tail() operand:expression()
              { ExprKind::Comp { operand: Box::new(operand) } }
            / "_int" tail() value:int_symbol()
              { ExprKind::IntConst { value } }
            / "_bool" tail() value:bool_value()
              { ExprKind::BoolConst { value } }
            / "_string" tail() value:string_symbol()
              { ExprKind::StringConst { value } }
            / "_new" tail() type_name:symbol()
              { ExprKind::New { type_name } }
            / "_isvoid" tail() operand:expression()
              { ExprKind::IsVoid { operand: Box::new(operand) } }
            / "_no_expr" tail()
              { ExprKind::NoExpr }
            / "_object" tail() name:symbol()
              { ExprKind::Object { name } }
    }
}
