use efx_ast::{FuncDef, Program, Statement, Type, Variable};
use efx_backend_core::{Backend, BackendError, BackendOptions, BackendOutput, OutputContent};
use efx_backend_sse::SseBackend;

/// A program seeded with the runtime-supplied built-in placeholders.
#[allow(dead_code)]
pub fn effect(name: &str) -> Program {
    let mut p = Program::new(name);
    p.declare(Variable::builtin("color", Type::FLOAT4));
    p.declare(Variable::builtin("pixcoord", Type::FLOAT2));
    p.declare(Variable::builtin("pos0", Type::FLOAT2));
    p
}

/// Appends a `main` with the given body.
#[allow(dead_code)]
pub fn with_main(mut program: Program, body: Vec<Statement>) -> Program {
    let mut main = FuncDef::new("main", None);
    main.body = body;
    program.functions.push(main);
    program
}

/// Compiles with the SSE backend, panicking on failure.
#[allow(dead_code)]
pub fn compile(program: &Program) -> BackendOutput {
    SseBackend
        .compile(program, &BackendOptions::default())
        .expect("SSE compilation failed")
}

/// Compiles with explicit options.
#[allow(dead_code)]
pub fn compile_opts(program: &Program, opts: &BackendOptions) -> BackendOutput {
    SseBackend
        .compile(program, opts)
        .expect("SSE compilation failed")
}

/// Like `compile` but returns the error instead of panicking.
#[allow(dead_code)]
pub fn try_compile(program: &Program) -> Result<BackendOutput, BackendError> {
    SseBackend.compile(program, &BackendOptions::default())
}

fn text(output: &BackendOutput, index: usize) -> &str {
    match &output.files[index].content {
        OutputContent::Text(t) => t,
        OutputContent::Binary(_) => panic!("expected text output"),
    }
}

/// The generated Java host wrapper.
#[allow(dead_code)]
pub fn java_text(output: &BackendOutput) -> &str {
    text(output, 0)
}

/// The generated C kernel.
#[allow(dead_code)]
pub fn c_text(output: &BackendOutput) -> &str {
    text(output, 1)
}

/// Non-empty kernel lines, trimmed of indentation.
#[allow(dead_code)]
pub fn trimmed_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Variable-derived parameter declarations of the native kernel signature,
/// fixed destination parameters stripped.
#[allow(dead_code)]
pub fn native_params(c: &str) -> Vec<String> {
    let start = c.find("(JNIEnv").expect("native signature not found");
    let end = start + c[start..].find(')').expect("unterminated signature");
    c[start + 1..end]
        .split(',')
        .map(|s| s.trim().to_string())
        .skip(6) // JNIEnv, jclass, dst_arr, dstw, dsth, dstscan
        .collect()
}

/// Variable-derived parameter declarations of the host-side `native`
/// method, fixed destination parameters stripped.
#[allow(dead_code)]
pub fn host_params(java: &str) -> Vec<String> {
    let marker = "private static native void filter(";
    let start = java.find(marker).expect("native declaration not found") + marker.len();
    let end = start + java[start..].find(");").expect("unterminated declaration");
    java[start..end]
        .split(',')
        .map(|s| s.trim().to_string())
        .skip(4) // int[] dst, int dstw, int dsth, int dstscan
        .collect()
}

/// Variable-derived argument expressions of the host-side call into the
/// native kernel, fixed destination arguments stripped.
#[allow(dead_code)]
pub fn call_args(java: &str) -> Vec<String> {
    let marker = "filter(dst.getPixelArray()";
    let start = java.find(marker).expect("native call not found") + "filter(".len();
    let end = start + java[start..].find(");").expect("unterminated call");
    java[start..end]
        .split(',')
        .map(|s| s.trim().to_string())
        .skip(4) // dst buffer, dstw, dsth, dst scan
        .collect()
}

/// The declared name of a parameter declaration like `jfloat a_tmp_x`.
#[allow(dead_code)]
pub fn param_name(decl: &str) -> &str {
    decl.rsplit(' ').next().expect("empty declaration")
}
