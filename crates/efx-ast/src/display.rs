//! Display implementations and text dump for debugging.

use std::fmt::{self, Write};

use crate::expr::{Expr, ExprKind, Literal};
use crate::func::FuncDef;
use crate::program::Program;
use crate::stmt::Statement;
use crate::types::{SamplerKind, ScalarKind, Type};
use crate::var::{ConstValue, Qualifier, Variable};

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        })
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Logical => "sampler",
            Self::Transformed => "lsampler",
            Self::FloatMap => "fsampler",
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Vector { kind, size } => write!(f, "{kind}{}", size as usize),
            Self::Sampler(kind) => write!(f, "{kind}"),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "",
            Self::Const => "const",
            Self::Param => "param",
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Variable(name) => f.write_str(name),
            ExprKind::Unary { op, expr } => write!(f, "{}{expr}", op.symbol()),
            ExprKind::Binary { op, left, right } => {
                write!(f, "{left} {} {right}", op.symbol())
            }
            ExprKind::Paren(inner) => write!(f, "({inner})"),
            ExprKind::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
            ExprKind::Field { base, fields } => write!(f, "{base}.{fields}"),
            ExprKind::Index { base, index } => write!(f, "{base}[{index}]"),
            ExprKind::Construct { args } => {
                write!(f, "{}(", self.ty)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn dump_variable(out: &mut String, var: &Variable) {
    let _ = write!(out, "  ");
    if var.qualifier != Qualifier::None {
        let _ = write!(out, "{} ", var.qualifier);
    }
    let _ = write!(out, "{} {}", var.ty, var.name);
    if let Some(len) = var.array_len {
        let _ = write!(out, "[{len}]");
    }
    match &var.const_value {
        Some(ConstValue::Int(v)) => {
            let _ = write!(out, " = {v}");
        }
        Some(ConstValue::Float(v)) => {
            let _ = write!(out, " = {v}");
        }
        Some(ConstValue::Vector(vs)) => {
            let _ = write!(out, " = {vs:?}");
        }
        None => {}
    }
    if let Some(acc) = &var.accessor {
        let _ = write!(out, " (accessor {acc})");
    }
    if let Some(reg) = var.register {
        let _ = write!(out, " (register {reg})");
    }
    out.push('\n');
}

fn dump_stmt(out: &mut String, stmt: &Statement, depth: usize) {
    let pad = "  ".repeat(depth);
    match stmt {
        Statement::Decl { var, init } => {
            let _ = write!(out, "{pad}decl {} {}", var.ty, var.name);
            if let Some(e) = init {
                let _ = write!(out, " = {e}");
            }
            out.push('\n');
        }
        Statement::Expr(e) => {
            let _ = writeln!(out, "{pad}{e}");
        }
        Statement::Block(body) => {
            let _ = writeln!(out, "{pad}block");
            for s in body {
                dump_stmt(out, s, depth + 1);
            }
        }
        Statement::If {
            condition,
            accept,
            reject,
        } => {
            let _ = writeln!(out, "{pad}if {condition}");
            for s in accept {
                dump_stmt(out, s, depth + 1);
            }
            if !reject.is_empty() {
                let _ = writeln!(out, "{pad}else");
                for s in reject {
                    dump_stmt(out, s, depth + 1);
                }
            }
        }
        Statement::For {
            init,
            condition,
            update,
            body,
        } => {
            let _ = write!(out, "{pad}for ");
            if init.is_some() {
                let _ = write!(out, "<init>; ");
            }
            let _ = write!(out, "{condition}");
            if let Some(u) = update {
                let _ = write!(out, "; {u}");
            }
            out.push('\n');
            if let Some(i) = init {
                dump_stmt(out, i, depth + 1);
            }
            for s in body {
                dump_stmt(out, s, depth + 1);
            }
        }
        Statement::While { condition, body } => {
            let _ = writeln!(out, "{pad}while {condition}");
            for s in body {
                dump_stmt(out, s, depth + 1);
            }
        }
        Statement::DoWhile { body, condition } => {
            let _ = writeln!(out, "{pad}do-while {condition}");
            for s in body {
                dump_stmt(out, s, depth + 1);
            }
        }
        Statement::Break => {
            let _ = writeln!(out, "{pad}break");
        }
        Statement::Continue => {
            let _ = writeln!(out, "{pad}continue");
        }
        Statement::Return(e) => match e {
            Some(e) => {
                let _ = writeln!(out, "{pad}return {e}");
            }
            None => {
                let _ = writeln!(out, "{pad}return");
            }
        },
        Statement::Discard => {
            let _ = writeln!(out, "{pad}discard");
        }
        Statement::Glue(text) => {
            let _ = writeln!(out, "{pad}glue <<{} chars>>", text.len());
        }
    }
}

fn dump_function(out: &mut String, f: &FuncDef) {
    let _ = write!(out, "  fn {}(", f.name);
    for (i, p) in f.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", p.ty, p.name);
    }
    match f.result {
        Some(ty) => {
            let _ = writeln!(out, ") -> {ty}");
        }
        None => {
            let _ = writeln!(out, ")");
        }
    }
    for s in &f.body {
        dump_stmt(out, s, 2);
    }
}

/// Renders a program as indented text, for debugging and `--emit-ast`.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "effect \"{}\"", program.name);

    let _ = writeln!(out, "globals:");
    let mut vars: Vec<&Variable> = program.symbols.values().collect();
    vars.sort_by(|a, b| a.name.cmp(&b.name));
    for var in vars {
        dump_variable(&mut out, var);
    }

    let _ = writeln!(out, "functions:");
    for f in &program.functions {
        dump_function(&mut out, f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;
    use crate::types::Type;

    #[test]
    fn type_names() {
        assert_eq!(Type::FLOAT4.to_string(), "float4");
        assert_eq!(Type::INT.to_string(), "int");
        assert_eq!(Type::LSAMPLER.to_string(), "lsampler");
    }

    #[test]
    fn expr_rendering() {
        let e = Expr::binary(
            Type::FLOAT,
            BinaryOp::Multiply,
            Expr::var("gain", Type::FLOAT),
            Expr::paren(Expr::float(0.5)),
        );
        assert_eq!(e.to_string(), "gain * (0.5)");
    }

    #[test]
    fn dump_lists_sorted_globals() {
        let mut p = Program::new("Blend");
        p.functions.push(FuncDef::new("main", None));
        p.declare(Variable::param("zeta", Type::FLOAT, "getZeta"));
        p.declare(Variable::param("alpha", Type::FLOAT, "getAlpha"));
        let text = dump_program(&p);
        let alpha = text.find("alpha").unwrap();
        let zeta = text.find("zeta").unwrap();
        assert!(alpha < zeta);
    }
}
