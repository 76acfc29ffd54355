//! Vector-scalarizing tree walker.
//!
//! Walks the `main` function's statement tree once and renders the body of
//! the per-pixel C kernel, lowering every vector-typed expression or
//! statement into one scalar emission per lane. Side information needed by
//! the glue generator (glue blocks, non-`main` function definitions,
//! declared result temporaries) accumulates in the scanner itself; one
//! scanner instance serves exactly one compilation.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use efx_ast::{
    field_index, lane_suffix, Expr, ExprKind, FuncDef, Literal, Program, Qualifier, Statement,
    Type,
};
use efx_backend_core::BackendError;

use crate::{c_scalar, float_text, funcs};

/// Nesting depth of the kernel body inside the C template (function +
/// scanline loop + pixel loop).
const BODY_INDENT: usize = 3;

/// The lane-selection context threaded through expression emission.
///
/// `vector` is set while emitting the i-th scalar statement of a vector
/// operation; `field` is set while a field-select is being resolved and
/// takes precedence over `vector`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LaneCtx {
    vector: Option<usize>,
    field: Option<usize>,
}

impl LaneCtx {
    pub(crate) fn vector(lane: usize) -> Self {
        Self {
            vector: Some(lane),
            field: None,
        }
    }

    fn with_field(self, lane: usize) -> Self {
        Self {
            field: Some(lane),
            ..self
        }
    }

    /// The active lane, if any: the selected field, else the ambient
    /// vector lane.
    fn lane(self) -> Option<usize> {
        self.field.or(self.vector)
    }
}

/// The C scalar type of a non-sampler value.
fn c_type_of(ty: Type, name: &str) -> Result<&'static str, BackendError> {
    ty.scalar_kind().map(c_scalar).ok_or_else(|| {
        BackendError::Internal(format!("`{name}` has no scalar kind"))
    })
}

/// Everything the walk produced for the glue generator.
pub(crate) struct ScanOutput {
    /// The scalarized kernel body, result-temporary declarations first.
    pub body: String,
    /// Concatenated glue-block text, in encounter order.
    pub glue: String,
}

/// One-shot tree walker; create one per compilation.
pub(crate) struct KernelScanner<'a> {
    program: &'a Program,
    body: String,
    result_decls: String,
    glue: String,
    funcs: HashMap<&'a str, &'a FuncDef>,
    declared_results: HashSet<String>,
    active_inlines: Vec<String>,
    indent: usize,
}

impl<'a> KernelScanner<'a> {
    pub(crate) fn new(program: &'a Program) -> Self {
        Self {
            program,
            body: String::new(),
            result_decls: String::new(),
            glue: String::new(),
            funcs: HashMap::new(),
            declared_results: HashSet::new(),
            active_inlines: Vec::new(),
            indent: BODY_INDENT,
        }
    }

    pub(crate) fn program(&self) -> &'a Program {
        self.program
    }

    /// Visits one top-level function definition. `main`'s body is walked
    /// into the kernel-body buffer; any other definition is registered for
    /// later inlining and emits nothing here.
    pub(crate) fn scan_function(&mut self, f: &'a FuncDef) -> Result<(), BackendError> {
        if f.is_main() {
            log::debug!("scalarizing main body of effect '{}'", self.program.name);
            for stmt in &f.body {
                self.emit_stmt(stmt, None)?;
            }
        } else {
            self.funcs.insert(f.name.as_str(), f);
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> ScanOutput {
        let mut body = self.result_decls;
        body.push_str(&self.body);
        ScanOutput {
            body,
            glue: self.glue,
        }
    }

    pub(crate) fn push_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.body.push_str("    ");
        }
        self.body.push_str(line);
        self.body.push('\n');
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn emit_stmt(&mut self, stmt: &Statement, fctx: Option<&'a FuncDef>) -> Result<(), BackendError> {
        match stmt {
            Statement::Decl { var, init } => self.emit_decl(var, init.as_ref()),
            Statement::Expr(e) => {
                self.emit_call_preambles(e)?;
                if e.ty.is_vector() {
                    for lane in 0..e.ty.arity() {
                        let mut line = String::new();
                        self.emit_expr(e, LaneCtx::vector(lane), &mut line)?;
                        line.push(';');
                        self.push_line(&line);
                    }
                } else {
                    let mut line = String::new();
                    self.emit_expr(e, LaneCtx::default(), &mut line)?;
                    line.push(';');
                    self.push_line(&line);
                }
                Ok(())
            }
            Statement::Block(body) => {
                self.push_line("{");
                self.indent += 1;
                for s in body {
                    self.emit_stmt(s, fctx)?;
                }
                self.indent -= 1;
                self.push_line("}");
                Ok(())
            }
            Statement::If {
                condition,
                accept,
                reject,
            } => {
                self.emit_call_preambles(condition)?;
                let mut cond = String::new();
                self.emit_expr(condition, LaneCtx::default(), &mut cond)?;
                self.push_line(&format!("if ({cond}) {{"));
                self.indent += 1;
                for s in accept {
                    self.emit_stmt(s, fctx)?;
                }
                self.indent -= 1;
                if reject.is_empty() {
                    self.push_line("}");
                } else {
                    self.push_line("} else {");
                    self.indent += 1;
                    for s in reject {
                        self.emit_stmt(s, fctx)?;
                    }
                    self.indent -= 1;
                    self.push_line("}");
                }
                Ok(())
            }
            Statement::For {
                init,
                condition,
                update,
                body,
            } => {
                // Call preambles for the loop head are computed once,
                // ahead of the loop.
                if let Some(init) = init {
                    if let Statement::Decl {
                        init: Some(e), ..
                    }
                    | Statement::Expr(e) = init.as_ref()
                    {
                        self.emit_call_preambles(e)?;
                    }
                }
                self.emit_call_preambles(condition)?;
                let init_text = match init {
                    Some(s) => self.render_for_init(s)?,
                    None => String::new(),
                };
                let mut cond = String::new();
                self.emit_expr(condition, LaneCtx::default(), &mut cond)?;
                let mut update_text = String::new();
                if let Some(u) = update {
                    self.emit_expr(u, LaneCtx::default(), &mut update_text)?;
                }
                self.push_line(&format!("for ({init_text}; {cond}; {update_text}) {{"));
                self.indent += 1;
                for s in body {
                    self.emit_stmt(s, fctx)?;
                }
                self.indent -= 1;
                self.push_line("}");
                Ok(())
            }
            Statement::While { condition, body } => {
                self.emit_call_preambles(condition)?;
                let mut cond = String::new();
                self.emit_expr(condition, LaneCtx::default(), &mut cond)?;
                self.push_line(&format!("while ({cond}) {{"));
                self.indent += 1;
                for s in body {
                    self.emit_stmt(s, fctx)?;
                }
                self.indent -= 1;
                self.push_line("}");
                Ok(())
            }
            Statement::DoWhile { body, condition } => {
                self.emit_call_preambles(condition)?;
                self.push_line("do {");
                self.indent += 1;
                for s in body {
                    self.emit_stmt(s, fctx)?;
                }
                self.indent -= 1;
                let mut cond = String::new();
                self.emit_expr(condition, LaneCtx::default(), &mut cond)?;
                self.push_line(&format!("}} while ({cond});"));
                Ok(())
            }
            Statement::Break => {
                self.push_line("break;");
                Ok(())
            }
            Statement::Continue => {
                self.push_line("continue;");
                Ok(())
            }
            Statement::Return(value) => self.emit_return(value.as_ref(), fctx),
            Statement::Discard => Err(BackendError::Unsupported(
                "discard statement".into(),
            )),
            Statement::Glue(text) => {
                self.glue.push_str(text);
                if !text.ends_with('\n') {
                    self.glue.push('\n');
                }
                Ok(())
            }
        }
    }

    fn emit_decl(&mut self, var: &efx_ast::Variable, init: Option<&Expr>) -> Result<(), BackendError> {
        // Qualified variables are declared once by the glue generator, not
        // inline in the kernel body.
        if var.qualifier != Qualifier::None {
            return Ok(());
        }
        if var.ty.is_sampler() {
            return Err(BackendError::Internal(format!(
                "sampler `{}` declared as a local",
                var.name
            )));
        }
        if var.array_len.is_some() {
            return Err(BackendError::Unsupported(format!(
                "local array declaration `{}`",
                var.name
            )));
        }
        if let Some(e) = init {
            self.emit_call_preambles(e)?;
        }
        let cty = c_type_of(var.ty, &var.name)?;
        if var.ty.is_vector() {
            for lane in 0..var.ty.arity() {
                let mut line = format!("{cty} {}{}", var.name, lane_suffix(lane));
                if let Some(e) = init {
                    line.push_str(" = ");
                    self.emit_expr(e, LaneCtx::vector(lane), &mut line)?;
                }
                line.push(';');
                self.push_line(&line);
            }
        } else {
            let mut line = format!("{cty} {}", var.name);
            if let Some(e) = init {
                line.push_str(" = ");
                self.emit_expr(e, LaneCtx::default(), &mut line)?;
            }
            line.push(';');
            self.push_line(&line);
        }
        Ok(())
    }

    fn emit_return(
        &mut self,
        value: Option<&Expr>,
        fctx: Option<&'a FuncDef>,
    ) -> Result<(), BackendError> {
        let Some(def) = fctx else {
            return Err(BackendError::Internal(
                "`return` outside a named function body".into(),
            ));
        };
        let result = def.result.ok_or_else(|| {
            BackendError::Internal(format!("inlined function `{}` has no result type", def.name))
        })?;
        let Some(value) = value else {
            return Err(BackendError::Unsupported(format!(
                "empty `return` in function `{}`, which must produce a value",
                def.name
            )));
        };
        self.emit_call_preambles(value)?;
        if result.is_vector() {
            for lane in 0..result.arity() {
                let mut line = format!("{}_res{} = ", def.name, lane_suffix(lane));
                self.emit_expr(value, LaneCtx::vector(lane), &mut line)?;
                line.push(';');
                self.push_line(&line);
            }
        } else {
            let mut line = format!("{}_res = ", def.name);
            self.emit_expr(value, LaneCtx::default(), &mut line)?;
            line.push(';');
            self.push_line(&line);
        }
        Ok(())
    }

    fn render_for_init(&mut self, stmt: &Statement) -> Result<String, BackendError> {
        match stmt {
            Statement::Decl { var, init } => {
                if var.qualifier != Qualifier::None || var.ty.is_vector() || var.ty.is_sampler() {
                    return Err(BackendError::Unsupported(
                        "non-scalar declaration in `for` initializer".into(),
                    ));
                }
                let cty = c_type_of(var.ty, &var.name)?;
                let mut text = format!("{cty} {}", var.name);
                if let Some(e) = init {
                    text.push_str(" = ");
                    self.emit_expr(e, LaneCtx::default(), &mut text)?;
                }
                Ok(text)
            }
            Statement::Expr(e) => {
                let mut text = String::new();
                self.emit_expr(e, LaneCtx::default(), &mut text)?;
                Ok(text)
            }
            _ => Err(BackendError::Unsupported(
                "unsupported `for` initializer form".into(),
            )),
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    pub(crate) fn emit_expr(
        &self,
        e: &Expr,
        lane: LaneCtx,
        out: &mut String,
    ) -> Result<(), BackendError> {
        match &e.kind {
            ExprKind::Literal(lit) => {
                match *lit {
                    Literal::Int(v) => {
                        let _ = write!(out, "{v}");
                    }
                    Literal::Float(v) => out.push_str(&float_text(v)),
                    Literal::Bool(v) => out.push_str(if v { "1" } else { "0" }),
                }
                Ok(())
            }
            ExprKind::Variable(name) => self.emit_var_ref(e, name, lane, out),
            ExprKind::Unary { op, expr } => {
                out.push_str(op.symbol());
                self.emit_expr(expr, lane, out)
            }
            ExprKind::Binary { op, left, right } => {
                self.emit_expr(left, lane, out)?;
                let _ = write!(out, " {} ", op.symbol());
                self.emit_expr(right, lane, out)
            }
            ExprKind::Paren(inner) => {
                out.push('(');
                self.emit_expr(inner, lane, out)?;
                out.push(')');
                Ok(())
            }
            ExprKind::Call { name, .. } => {
                // The call itself was expanded ahead of this statement by
                // the preamble scan; only the result reference remains.
                out.push_str(name);
                out.push_str("_res");
                if e.ty.is_vector() {
                    let Some(i) = lane.lane() else {
                        return Err(BackendError::Internal(format!(
                            "vector-returning call `{name}` referenced outside any \
                             lane-selecting context"
                        )));
                    };
                    out.push_str(lane_suffix(i));
                }
                Ok(())
            }
            ExprKind::Field { base, fields } => {
                let nfields = fields.chars().count();
                let pick = if nfields > 1 {
                    lane.lane().unwrap_or(0)
                } else {
                    0
                };
                let ch = fields.chars().nth(pick).ok_or_else(|| {
                    BackendError::Internal(format!(
                        "swizzle `.{fields}` has no component for lane {pick}"
                    ))
                })?;
                let idx = field_index(ch).ok_or_else(|| {
                    BackendError::Internal(format!("invalid field selector `{ch}`"))
                })?;
                self.emit_expr(base, lane.with_field(idx), out)
            }
            ExprKind::Index { base, index } => self.emit_index(base, index, lane, out),
            ExprKind::Construct { args } => {
                if e.ty.is_vector() {
                    let Some(k) = lane.lane() else {
                        return Err(BackendError::Internal(
                            "vector constructor outside any lane-selecting context".into(),
                        ));
                    };
                    let arg = args.get(k).ok_or_else(|| {
                        BackendError::Internal(format!(
                            "constructor of arity {} has no component {k}",
                            args.len()
                        ))
                    })?;
                    self.emit_expr(arg, LaneCtx::default(), out)
                } else {
                    let arg = args.first().ok_or_else(|| {
                        BackendError::Internal("empty scalar constructor".into())
                    })?;
                    self.emit_expr(arg, LaneCtx::default(), out)
                }
            }
        }
    }

    fn emit_var_ref(
        &self,
        e: &Expr,
        name: &str,
        lane: LaneCtx,
        out: &mut String,
    ) -> Result<(), BackendError> {
        out.push_str(name);
        if let Some(var) = self.program.symbols.get(name) {
            // Parameters are staged into `_tmp` locals before use.
            if var.qualifier == Qualifier::Param {
                out.push_str("_tmp");
            }
        }
        if e.ty.is_vector() {
            let Some(i) = lane.lane() else {
                return Err(BackendError::Internal(format!(
                    "vector reference `{name}` outside any lane-selecting context"
                )));
            };
            out.push_str(lane_suffix(i));
        }
        Ok(())
    }

    fn emit_index(
        &self,
        base: &Expr,
        index: &Expr,
        lane: LaneCtx,
        out: &mut String,
    ) -> Result<(), BackendError> {
        // Only the restricted variable-base/variable-index form is part of
        // the kernel's array model.
        let ExprKind::Variable(base_name) = &base.kind else {
            return Err(BackendError::Unsupported(
                "array access with a non-variable base".into(),
            ));
        };
        if !matches!(index.kind, ExprKind::Variable(_)) {
            return Err(BackendError::Unsupported(
                "array access with a non-variable index".into(),
            ));
        }
        let mut idx = String::new();
        self.emit_expr(index, LaneCtx::default(), &mut idx)?;
        if base.ty.is_vector() {
            let comp = base.ty.arity();
            let Some(k) = lane.lane() else {
                return Err(BackendError::Internal(format!(
                    "vector array access `{base_name}[..]` outside any lane-selecting context"
                )));
            };
            let _ = write!(out, "{base_name}[{idx} * {comp} + {k}]");
        } else {
            let _ = write!(out, "{base_name}[{idx}]");
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Call preambles
    // -----------------------------------------------------------------

    /// Secondary scan over one statement's expression tree: expands every
    /// call it contains ahead of the statement, innermost calls first, so
    /// the statement can reference the `<fn>_res` temporaries. The scan is
    /// independent of the outer walk's lane context.
    fn emit_call_preambles(&mut self, e: &Expr) -> Result<(), BackendError> {
        match &e.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => Ok(()),
            ExprKind::Unary { expr, .. } | ExprKind::Paren(expr) => {
                self.emit_call_preambles(expr)
            }
            ExprKind::Binary { left, right, .. } => {
                self.emit_call_preambles(left)?;
                self.emit_call_preambles(right)
            }
            ExprKind::Field { base, .. } => self.emit_call_preambles(base),
            ExprKind::Index { base, index } => {
                self.emit_call_preambles(base)?;
                self.emit_call_preambles(index)
            }
            ExprKind::Construct { args } => {
                for a in args {
                    self.emit_call_preambles(a)?;
                }
                Ok(())
            }
            ExprKind::Call { name, args } => {
                for a in args {
                    self.emit_call_preambles(a)?;
                }
                if let Some(def) = self.funcs.get(name.as_str()).copied() {
                    self.inline_function(def, args)
                } else if let Some(intr) = funcs::lookup(name) {
                    funcs::expand(self, intr, e, args)
                } else {
                    Err(BackendError::Unsupported(format!(
                        "call to unknown function `{name}`"
                    )))
                }
            }
        }
    }

    /// Declares the `<fn>_res` temporaries for `name` once per kernel.
    pub(crate) fn declare_result(&mut self, name: &str, ty: Type) -> Result<(), BackendError> {
        if !self.declared_results.insert(name.to_string()) {
            return Ok(());
        }
        let kind = ty.scalar_kind().ok_or_else(|| {
            BackendError::Internal(format!("function `{name}` returns a sampler"))
        })?;
        let cty = c_scalar(kind);
        let pad = "    ".repeat(BODY_INDENT);
        if ty.is_vector() {
            for lane in 0..ty.arity() {
                let _ = writeln!(
                    self.result_decls,
                    "{pad}{cty} {name}_res{};",
                    lane_suffix(lane)
                );
            }
        } else {
            let _ = writeln!(self.result_decls, "{pad}{cty} {name}_res;");
        }
        Ok(())
    }

    /// Expands a user-defined function call in place: the result
    /// temporaries are declared at kernel scope, then a braced block
    /// stages the arguments under the callee's parameter names and walks
    /// the callee's body, whose `return` statements assign the result
    /// temporaries.
    fn inline_function(&mut self, def: &'a FuncDef, args: &[Expr]) -> Result<(), BackendError> {
        if self.active_inlines.iter().any(|n| n == &def.name) {
            return Err(BackendError::Unsupported(format!(
                "recursive call to function `{}`",
                def.name
            )));
        }
        let result = def.result.ok_or_else(|| {
            BackendError::Internal(format!("called function `{}` has no result type", def.name))
        })?;
        if def.params.len() != args.len() {
            return Err(BackendError::Internal(format!(
                "call to `{}` passes {} argument(s), expected {}",
                def.name,
                args.len(),
                def.params.len()
            )));
        }
        self.declare_result(&def.name, result)?;

        self.push_line("{");
        self.indent += 1;
        for (p, a) in def.params.iter().zip(args) {
            if p.ty.is_sampler() {
                return Err(BackendError::Unsupported(format!(
                    "sampler-typed parameter `{}` of function `{}`",
                    p.name, def.name
                )));
            }
            let cty = c_type_of(p.ty, &p.name)?;
            if p.ty.is_vector() {
                for lane in 0..p.ty.arity() {
                    let mut line = format!("{cty} {}{} = ", p.name, lane_suffix(lane));
                    self.emit_expr(a, LaneCtx::vector(lane), &mut line)?;
                    line.push(';');
                    self.push_line(&line);
                }
            } else {
                let mut line = format!("{cty} {} = ", p.name);
                self.emit_expr(a, LaneCtx::default(), &mut line)?;
                line.push(';');
                self.push_line(&line);
            }
        }
        self.active_inlines.push(def.name.clone());
        for s in &def.body {
            self.emit_stmt(s, Some(def))?;
        }
        self.active_inlines.pop();
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }
}
