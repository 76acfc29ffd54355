//! SSE software-renderer backend for the efx compiler.
//!
//! Translates a checked effect program into two textually-synchronized
//! artifacts: a Java host-side peer class and a C/JNI per-pixel kernel.
//! The tree walker scalarizes every vector operation into per-lane scalar
//! statements; the glue generator derives both
//! artifacts' positional parameter lists from one classified slot list so
//! their calling conventions cannot drift apart.

mod funcs;
mod glue;
mod scan;

use efx_ast::{Program, ScalarKind};
use efx_backend_core::{
    Backend, BackendError, BackendOptions, BackendOutput, Diagnostic, DiagnosticLevel,
    OutputContent, OutputFile,
};

pub use glue::{param_slots, SlotShape};

/// The SSE software backend.
#[derive(Debug)]
pub struct SseBackend;

impl Backend for SseBackend {
    fn name(&self) -> &str {
        "SSE software renderer"
    }

    fn targets(&self) -> &[&str] {
        &["sse", "sw-sse"]
    }

    fn compile(
        &self,
        program: &Program,
        opts: &BackendOptions,
    ) -> Result<BackendOutput, BackendError> {
        if program.main().is_none() {
            return Err(BackendError::Other(
                "program has no `main` function".into(),
            ));
        }
        log::debug!("compiling effect '{}' for target sse", program.name);

        // One scanner per compilation; all side tables live and die with
        // it. Named functions are registered before `main` is walked so
        // definition order in the source does not matter.
        let mut scanner = scan::KernelScanner::new(program);
        for f in program.functions.iter().filter(|f| !f.is_main()) {
            scanner.scan_function(f)?;
        }
        for f in program.functions.iter().filter(|f| f.is_main()) {
            scanner.scan_function(f)?;
        }
        let scan = scanner.finish();

        let peer = opts.peer_name.as_deref().unwrap_or(&program.name);
        let artifacts = glue::generate(program, &scan, peer, opts.interface.as_deref())?;

        let slots = glue::param_slots(program)?;
        let samplers = slots
            .iter()
            .filter(|(_, shape)| *shape == SlotShape::Sampler)
            .count();
        let diagnostics = vec![Diagnostic {
            level: DiagnosticLevel::Info,
            message: format!(
                "effect '{}': {} parameter slot(s), {} sampler(s)",
                program.name,
                slots.len(),
                samplers
            ),
        }];

        Ok(BackendOutput {
            files: vec![
                OutputFile {
                    name: format!("{}.java", artifacts.class_name),
                    content: OutputContent::Text(artifacts.java),
                },
                OutputFile {
                    name: format!("{}.c", artifacts.class_name),
                    content: OutputContent::Text(artifacts.c),
                },
            ],
            diagnostics,
        })
    }
}

/// Renders a float literal for the generated Java and C sources.
pub(crate) fn float_text(v: f32) -> String {
    if v == v.trunc() && v.is_finite() {
        format!("{v:.1}f")
    } else {
        format!("{v}f")
    }
}

/// C type name for a scalar slot.
pub(crate) fn c_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Float => "float",
        ScalarKind::Int | ScalarKind::Bool => "int",
    }
}

/// Java type name for a scalar slot crossing the native boundary.
pub(crate) fn java_scalar(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Float => "float",
        ScalarKind::Int => "int",
        ScalarKind::Bool => "boolean",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efx_ast::{BinaryOp, Expr, FuncDef, Statement, Type, Variable};

    fn identity_program() -> Program {
        let mut p = Program::new("Identity");
        p.declare(Variable::builtin("color", Type::FLOAT4));
        p.declare(Variable::sampler("base", Type::SAMPLER, 0));
        let mut main = FuncDef::new("main", None);
        main.body.push(Statement::Expr(Expr::binary(
            Type::FLOAT4,
            BinaryOp::Assign,
            Expr::var("color", Type::FLOAT4),
            Expr::call(
                Type::FLOAT4,
                "sample",
                vec![
                    Expr::var("base", Type::SAMPLER),
                    Expr::field(Type::FLOAT, Expr::var("pos0", Type::FLOAT2), "x"),
                    Expr::field(Type::FLOAT, Expr::var("pos0", Type::FLOAT2), "y"),
                ],
            ),
        )));
        p.functions.push(main);
        p.declare(Variable::builtin("pos0", Type::FLOAT2));
        p
    }

    #[test]
    fn backend_metadata() {
        let backend = SseBackend;
        assert_eq!(backend.name(), "SSE software renderer");
        assert!(backend.targets().contains(&"sse"));
        assert!(backend.targets().contains(&"sw-sse"));
    }

    #[test]
    fn compile_emits_both_artifacts() {
        let output = SseBackend
            .compile(&identity_program(), &BackendOptions::default())
            .unwrap();
        assert_eq!(output.files.len(), 2);
        assert_eq!(output.files[0].name, "IdentityPeer.java");
        assert_eq!(output.files[1].name, "IdentityPeer.c");
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("1 sampler(s)"));
    }

    #[test]
    fn compile_without_main_fails() {
        let p = Program::new("Empty");
        let err = SseBackend.compile(&p, &BackendOptions::default());
        assert!(matches!(err, Err(BackendError::Other(_))));
    }

    #[test]
    fn peer_name_override() {
        let opts = BackendOptions {
            peer_name: Some("Copy".into()),
            interface: None,
        };
        let output = SseBackend.compile(&identity_program(), &opts).unwrap();
        assert_eq!(output.files[0].name, "CopyPeer.java");
    }

    #[test]
    fn float_literal_text() {
        assert_eq!(float_text(4.0), "4.0f");
        assert_eq!(float_text(0.25), "0.25f");
        assert_eq!(float_text(-1.5), "-1.5f");
    }

    #[test]
    fn scalar_type_names() {
        assert_eq!(c_scalar(ScalarKind::Float), "float");
        assert_eq!(c_scalar(ScalarKind::Bool), "int");
        assert_eq!(java_scalar(ScalarKind::Int), "int");
    }
}
