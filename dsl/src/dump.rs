//! Serializer for the type-annotated tree.
//!
//! The output is the same line-oriented format the parser phase produces:
//! every node preceded by a `#<line>` marker, two more spaces of padding
//! per level, and a `: <type>` trailer after every expression. After
//! analysis the trailer holds the inferred static type; unset slots (and
//! `_no_expr` nodes) print `_no_type`.

use core::fmt;
use core::fmt::Write;

use crate::ast::{CaseBranch, Class, ExprKind, Expression, Feature, Formal, Program};
use crate::symbol::{Symbol, SymbolTable};

/// Serializes the program, resolving symbols through the registry that
/// interned them.
pub fn dump_program(program: &Program, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    write_program(&mut out, program, symbols).expect("writing to a String cannot fail");
    out
}

/// Serializes the program to the writer.
pub fn write_program(
    out: &mut impl Write,
    program: &Program,
    symbols: &SymbolTable,
) -> fmt::Result {
    let mut printer = TreePrinter { out, symbols };
    printer.program(program, 0)
}

/// Escapes a string constant (or filename) the way the original printer
/// does: the short escapes for backslash, quote, newline, tab, backspace
/// and form-feed, and three-digit octal for everything else outside
/// printable ASCII.
pub fn escaped(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            c if (c as u32) < 0x100 => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => {
                // Multi-byte text that never went through the escape
                // scheme; emit its UTF-8 bytes the way a byte-oriented
                // printer would.
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "\\{:03o}", byte);
                }
            }
        }
    }
    out
}

struct TreePrinter<'a, W: Write> {
    out: &'a mut W,
    symbols: &'a SymbolTable,
}

impl<W: Write> TreePrinter<'_, W> {
    fn pad(&mut self, n: usize) -> fmt::Result {
        write!(self.out, "{:width$}", "", width = n)
    }

    fn line_marker(&mut self, n: usize, line: u32) -> fmt::Result {
        self.pad(n)?;
        writeln!(self.out, "#{}", line)
    }

    fn tag(&mut self, n: usize, tag: &str) -> fmt::Result {
        self.pad(n)?;
        writeln!(self.out, "{}", tag)
    }

    fn symbol(&mut self, n: usize, symbol: Symbol) -> fmt::Result {
        self.pad(n)?;
        writeln!(self.out, "{}", self.symbols.resolve(symbol))
    }

    fn quoted(&mut self, n: usize, symbol: Symbol) -> fmt::Result {
        self.pad(n)?;
        writeln!(self.out, "\"{}\"", escaped(self.symbols.resolve(symbol)))
    }

    fn program(&mut self, program: &Program, n: usize) -> fmt::Result {
        self.line_marker(n, program.line)?;
        self.tag(n, "_program")?;
        for class in &program.classes {
            self.class(class, n + 2)?;
        }
        Ok(())
    }

    fn class(&mut self, class: &Class, n: usize) -> fmt::Result {
        self.line_marker(n, class.line)?;
        self.tag(n, "_class")?;
        self.symbol(n + 2, class.name)?;
        self.symbol(n + 2, class.parent)?;
        self.quoted(n + 2, class.filename)?;
        self.tag(n + 2, "(")?;
        for feature in &class.features {
            self.feature(feature, n + 2)?;
        }
        self.tag(n + 2, ")")
    }

    fn feature(&mut self, feature: &Feature, n: usize) -> fmt::Result {
        match feature {
            Feature::Attribute {
                line,
                name,
                declared_type,
                init,
            } => {
                self.line_marker(n, *line)?;
                self.tag(n, "_attr")?;
                self.symbol(n + 2, *name)?;
                self.symbol(n + 2, *declared_type)?;
                self.expression(init, n + 2)
            }
            Feature::Method {
                line,
                name,
                formals,
                return_type,
                body,
            } => {
                self.line_marker(n, *line)?;
                self.tag(n, "_method")?;
                self.symbol(n + 2, *name)?;
                for formal in formals {
                    self.formal(formal, n + 2)?;
                }
                self.symbol(n + 2, *return_type)?;
                self.expression(body, n + 2)
            }
        }
    }

    fn formal(&mut self, formal: &Formal, n: usize) -> fmt::Result {
        self.line_marker(n, formal.line)?;
        self.tag(n, "_formal")?;
        self.symbol(n + 2, formal.name)?;
        self.symbol(n + 2, formal.declared_type)
    }

    fn branch(&mut self, branch: &CaseBranch, n: usize) -> fmt::Result {
        self.line_marker(n, branch.line)?;
        self.tag(n, "_branch")?;
        self.symbol(n + 2, branch.name)?;
        self.symbol(n + 2, branch.declared_type)?;
        self.expression(&branch.body, n + 2)
    }

    fn expression(&mut self, expr: &Expression, n: usize) -> fmt::Result {
        self.line_marker(n, expr.line)?;
        match &expr.kind {
            ExprKind::Assign { name, value } => {
                self.tag(n, "_assign")?;
                self.symbol(n + 2, *name)?;
                self.expression(value, n + 2)?;
            }
            ExprKind::StaticDispatch {
                receiver,
                type_name,
                method,
                args,
            } => {
                self.tag(n, "_static_dispatch")?;
                self.expression(receiver, n + 2)?;
                self.symbol(n + 2, *type_name)?;
                self.symbol(n + 2, *method)?;
                self.tag(n + 2, "(")?;
                for arg in args {
                    self.expression(arg, n + 2)?;
                }
                self.tag(n + 2, ")")?;
            }
            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => {
                self.tag(n, "_dispatch")?;
                self.expression(receiver, n + 2)?;
                self.symbol(n + 2, *method)?;
                self.tag(n + 2, "(")?;
                for arg in args {
                    self.expression(arg, n + 2)?;
                }
                self.tag(n + 2, ")")?;
            }
            ExprKind::Conditional {
                pred,
                then_branch,
                else_branch,
            } => {
                self.tag(n, "_cond")?;
                self.expression(pred, n + 2)?;
                self.expression(then_branch, n + 2)?;
                self.expression(else_branch, n + 2)?;
            }
            ExprKind::Loop { pred, body } => {
                self.tag(n, "_loop")?;
                self.expression(pred, n + 2)?;
                self.expression(body, n + 2)?;
            }
            ExprKind::TypeCase {
                scrutinee,
                branches,
            } => {
                self.tag(n, "_typcase")?;
                self.expression(scrutinee, n + 2)?;
                for branch in branches {
                    self.branch(branch, n + 2)?;
                }
            }
            ExprKind::Block { body } => {
                self.tag(n, "_block")?;
                for expr in body {
                    self.expression(expr, n + 2)?;
                }
            }
            ExprKind::Let {
                name,
                declared_type,
                init,
                body,
            } => {
                self.tag(n, "_let")?;
                self.symbol(n + 2, *name)?;
                self.symbol(n + 2, *declared_type)?;
                self.expression(init, n + 2)?;
                self.expression(body, n + 2)?;
            }
            ExprKind::Plus { lhs, rhs } => self.binary(n, "_plus", lhs, rhs)?,
            ExprKind::Sub { lhs, rhs } => self.binary(n, "_sub", lhs, rhs)?,
            ExprKind::Mul { lhs, rhs } => self.binary(n, "_mul", lhs, rhs)?,
            ExprKind::Divide { lhs, rhs } => self.binary(n, "_divide", lhs, rhs)?,
            ExprKind::Neg { operand } => {
                self.tag(n, "_neg")?;
                self.expression(operand, n + 2)?;
            }
            ExprKind::Lt { lhs, rhs } => self.binary(n, "_lt", lhs, rhs)?,
            ExprKind::Eq { lhs, rhs } => self.binary(n, "_eq", lhs, rhs)?,
            ExprKind::Leq { lhs, rhs } => self.binary(n, "_leq", lhs, rhs)?,
            ExprKind::Comp { operand } => {
                self.tag(n, "_comp")?;
                self.expression(operand, n + 2)?;
            }
            ExprKind::IntConst { value } => {
                self.tag(n, "_int")?;
                self.symbol(n + 2, *value)?;
            }
            ExprKind::BoolConst { value } => {
                self.tag(n, "_bool")?;
                self.pad(n + 2)?;
                writeln!(self.out, "{}", u8::from(*value))?;
            }
            ExprKind::StringConst { value } => {
                self.tag(n, "_string")?;
                self.quoted(n + 2, *value)?;
            }
            ExprKind::New { type_name } => {
                self.tag(n, "_new")?;
                self.symbol(n + 2, *type_name)?;
            }
            ExprKind::IsVoid { operand } => {
                self.tag(n, "_isvoid")?;
                self.expression(operand, n + 2)?;
            }
            ExprKind::NoExpr => {
                self.tag(n, "_no_expr")?;
            }
            ExprKind::Object { name } => {
                self.tag(n, "_object")?;
                self.symbol(n + 2, *name)?;
            }
        }
        self.type_trailer(expr, n)
    }

    fn binary(&mut self, n: usize, tag: &str, lhs: &Expression, rhs: &Expression) -> fmt::Result {
        self.tag(n, tag)?;
        self.expression(lhs, n + 2)?;
        self.expression(rhs, n + 2)
    }

    fn type_trailer(&mut self, expr: &Expression, n: usize) -> fmt::Result {
        self.pad(n)?;
        match expr.ty {
            Some(ty) => writeln!(self.out, ": {}", self.symbols.resolve(ty)),
            None => writeln!(self.out, ": _no_type"),
        }
    }
}
