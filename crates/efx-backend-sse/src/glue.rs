//! Glue-code generator.
//!
//! Consumes the scalarized kernel body and the program's global symbol
//! table and synthesizes the two parameter-order-synchronized artifacts:
//! the Java host wrapper and the C/JNI kernel.
//!
//! One classification pass builds a single ordered slot list from the
//! name-sorted globals; every synchronized view (host locals, host-call
//! arguments, host parameters, native parameters, acquire prologue,
//! release epilogue, host cleanup) is rendered from that one list, so the
//! two artifacts cannot drift out of positional lockstep.

use std::collections::HashSet;
use std::fmt::Write;

use efx_ast::{
    lane_suffix, ConstValue, Program, Qualifier, SamplerKind, ScalarKind, Variable,
};
use efx_backend_core::BackendError;

use crate::scan::ScanOutput;
use crate::{float_text, java_scalar};

const WRAPPER_TEMPLATE: &str = include_str!("../templates/wrapper.java.in");
const KERNEL_TEMPLATE: &str = include_str!("../templates/kernel.c.in");

/// How a global variable crosses the host/native boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotShape {
    /// One scalar positional parameter.
    Scalar,
    /// N lane-suffixed scalar positional parameters.
    Vector,
    /// One array parameter with acquire/release bracketing.
    Array,
    /// Buffer + source rect + geometry parameters for one input image.
    Sampler,
}

struct Slot<'a> {
    var: &'a Variable,
    shape: SlotShape,
}

/// The classified, name-sorted parameter slots a program contributes to
/// the generated signatures. Built-in placeholders contribute nothing.
pub fn param_slots(program: &Program) -> Result<Vec<(String, SlotShape)>, BackendError> {
    Ok(slots(program)?
        .into_iter()
        .map(|s| (s.var.name.clone(), s.shape))
        .collect())
}

fn slots(program: &Program) -> Result<Vec<Slot<'_>>, BackendError> {
    // Sorted by name so generated parameter lists are identical across
    // repeated builds regardless of symbol-table insertion order.
    let mut vars: Vec<&Variable> = program.symbols.values().collect();
    vars.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = Vec::new();
    for var in vars {
        if var.is_builtin() {
            continue;
        }
        out.push(Slot {
            var,
            shape: classify(var)?,
        });
    }
    Ok(out)
}

fn classify(var: &Variable) -> Result<SlotShape, BackendError> {
    if var.ty.is_sampler() {
        if var.qualifier != Qualifier::Param {
            return Err(BackendError::Internal(format!(
                "sampler `{}` is not param-qualified",
                var.name
            )));
        }
        if var.register.is_none() {
            return Err(BackendError::Internal(format!(
                "sampler `{}` has no register index",
                var.name
            )));
        }
        return Ok(SlotShape::Sampler);
    }
    if var.qualifier == Qualifier::None {
        return Err(BackendError::Internal(format!(
            "unqualified global variable `{}`",
            var.name
        )));
    }
    if var.ty.scalar_kind() == Some(ScalarKind::Bool) {
        return Err(BackendError::Internal(format!(
            "bool variable `{}` cannot cross the native boundary",
            var.name
        )));
    }
    if var.array_len.is_some() {
        if var.qualifier != Qualifier::Param {
            return Err(BackendError::Internal(format!(
                "array `{}` is not param-qualified",
                var.name
            )));
        }
        return Ok(SlotShape::Array);
    }
    if var.ty.is_vector() {
        if var.qualifier == Qualifier::Const {
            match &var.const_value {
                Some(ConstValue::Vector(vals)) if vals.len() == var.ty.arity() => {}
                _ => {
                    return Err(BackendError::Internal(format!(
                        "vector constant `{}` lacks per-lane float values",
                        var.name
                    )));
                }
            }
            if var.ty.scalar_kind() == Some(ScalarKind::Int) {
                return Err(BackendError::Internal(format!(
                    "int vector constant `{}` is not representable",
                    var.name
                )));
            }
        }
        return Ok(SlotShape::Vector);
    }
    if var.qualifier == Qualifier::Param && var.accessor.is_none() {
        return Err(BackendError::Internal(format!(
            "param `{}` has no accessor",
            var.name
        )));
    }
    Ok(SlotShape::Scalar)
}

// ---------------------------------------------------------------------
// Synchronized views
// ---------------------------------------------------------------------

#[derive(Default)]
struct Views {
    locals: String,
    call_args: Vec<String>,
    host_params: Vec<String>,
    native_params: Vec<String>,
    acquire: String,
    release: String,
    cleanup: String,
    setup: String,
    scanline: String,
    pixelstep: String,
    scanstep: String,
}

fn render_slot(views: &mut Views, slot: &Slot<'_>) -> Result<(), BackendError> {
    match slot.shape {
        SlotShape::Scalar => render_scalar(views, slot.var),
        SlotShape::Vector => render_vector(views, slot.var),
        SlotShape::Array => render_array(views, slot.var),
        SlotShape::Sampler => render_sampler(views, slot.var),
    }
}

fn accessor(var: &Variable) -> Result<&str, BackendError> {
    var.accessor
        .as_deref()
        .ok_or_else(|| BackendError::Internal(format!("param `{}` has no accessor", var.name)))
}

fn scalar_kind(var: &Variable) -> Result<ScalarKind, BackendError> {
    var.ty
        .scalar_kind()
        .ok_or_else(|| BackendError::Internal(format!("`{}` has no scalar kind", var.name)))
}

fn render_scalar(views: &mut Views, var: &Variable) -> Result<(), BackendError> {
    let name = &var.name;
    let jt = java_scalar(scalar_kind(var)?);
    match var.qualifier {
        Qualifier::Const => {
            let text = match (&var.const_value, scalar_kind(var)?) {
                (Some(ConstValue::Int(v)), ScalarKind::Int) => v.to_string(),
                (Some(ConstValue::Float(v)), ScalarKind::Float) => float_text(*v),
                _ => {
                    return Err(BackendError::Internal(format!(
                        "constant `{name}` has a value of the wrong kind"
                    )));
                }
            };
            let _ = writeln!(views.locals, "        {jt} {name} = {text};");
            views.call_args.push(name.clone());
            views.host_params.push(format!("{jt} {name}"));
            views.native_params.push(format!("j{jt} {name}"));
        }
        Qualifier::Param => {
            let acc = accessor(var)?;
            let _ = writeln!(views.locals, "        {jt} {name}_tmp = {acc}();");
            views.call_args.push(format!("{name}_tmp"));
            views.host_params.push(format!("{jt} {name}_tmp"));
            views.native_params.push(format!("j{jt} {name}_tmp"));
        }
        Qualifier::None => {
            return Err(BackendError::Internal(format!(
                "unqualified global variable `{name}`"
            )));
        }
    }
    Ok(())
}

fn render_vector(views: &mut Views, var: &Variable) -> Result<(), BackendError> {
    let name = &var.name;
    let jt = java_scalar(scalar_kind(var)?);
    let lanes = var.ty.arity();
    match var.qualifier {
        Qualifier::Param => {
            let acc = accessor(var)?;
            let _ = writeln!(views.locals, "        {jt}[] {name}_tmp = {acc}();");
            for lane in 0..lanes {
                let sfx = lane_suffix(lane);
                views.call_args.push(format!("{name}_tmp[{lane}]"));
                views.host_params.push(format!("{jt} {name}_tmp{sfx}"));
                views.native_params.push(format!("j{jt} {name}_tmp{sfx}"));
            }
        }
        Qualifier::Const => {
            let Some(ConstValue::Vector(vals)) = &var.const_value else {
                return Err(BackendError::Internal(format!(
                    "vector constant `{name}` lacks per-lane values"
                )));
            };
            let body: Vec<String> = vals.iter().map(|v| float_text(*v)).collect();
            let _ = writeln!(
                views.locals,
                "        {jt}[] {name} = {{ {} }};",
                body.join(", ")
            );
            for lane in 0..lanes {
                let sfx = lane_suffix(lane);
                views.call_args.push(format!("{name}[{lane}]"));
                views.host_params.push(format!("{jt} {name}{sfx}"));
                views.native_params.push(format!("j{jt} {name}{sfx}"));
            }
        }
        Qualifier::None => {
            return Err(BackendError::Internal(format!(
                "unqualified global variable `{name}`"
            )));
        }
    }
    Ok(())
}

fn render_array(views: &mut Views, var: &Variable) -> Result<(), BackendError> {
    let name = &var.name;
    let acc = accessor(var)?;
    let (buf_ty, jt) = match scalar_kind(var)? {
        ScalarKind::Float => ("FloatBuffer", "float"),
        ScalarKind::Int => ("IntBuffer", "int"),
        ScalarKind::Bool => {
            return Err(BackendError::Internal(format!(
                "bool array `{name}` cannot cross the native boundary"
            )));
        }
    };
    let _ = writeln!(views.locals, "        {buf_ty} {name}_buf = {acc}();");
    let _ = writeln!(
        views.locals,
        "        {jt}[] {name}_arr = new {jt}[{name}_buf.capacity()];"
    );
    let _ = writeln!(views.locals, "        {name}_buf.rewind();");
    let _ = writeln!(views.locals, "        {name}_buf.get({name}_arr);");

    views.call_args.push(format!("{name}_arr"));
    views.host_params.push(format!("{jt}[] {name}"));
    views.native_params.push(format!("j{jt}Array {name}_arr"));

    let _ = writeln!(
        views.acquire,
        "    j{jt} *{name} = (j{jt} *)(*env)->GetPrimitiveArrayCritical(env, {name}_arr, 0);"
    );
    let _ = writeln!(views.acquire, "    if ({name} == NULL) return;");
    // Inputs only: release discards any (accidental) modification.
    let _ = writeln!(
        views.release,
        "    (*env)->ReleasePrimitiveArrayCritical(env, {name}_arr, {name}, JNI_ABORT);"
    );
    Ok(())
}

fn render_sampler(views: &mut Views, var: &Variable) -> Result<(), BackendError> {
    let kind = var.ty.sampler_kind().ok_or_else(|| {
        BackendError::Internal(format!("`{}` is not a sampler", var.name))
    })?;
    let reg = var.register.ok_or_else(|| {
        BackendError::Internal(format!("sampler `{}` has no register index", var.name))
    })?;
    let src = format!("src{reg}");

    match kind {
        SamplerKind::Logical => {
            let _ = writeln!(
                views.locals,
                "        HeapImage {src} = (HeapImage)getInput({reg}).getUntransformedImage();"
            );
        }
        SamplerKind::Transformed => {
            let _ = writeln!(
                views.locals,
                "        HeapImage {src} = (HeapImage)getInput({reg}).getTransformedImage();"
            );
        }
        SamplerKind::FloatMap => {
            let _ = writeln!(views.locals, "        FloatMap {src} = getFloatInput({reg});");
        }
    }
    let _ = writeln!(views.locals, "        int {src}w = {src}.getPhysicalWidth();");
    let _ = writeln!(views.locals, "        int {src}h = {src}.getPhysicalHeight();");
    let _ = writeln!(views.locals, "        int {src}scan = {src}.getScanlineStride();");
    let _ = writeln!(views.locals, "        float[] {src}Rect = getSourceRegion({reg});");

    let buffer_arg = match kind {
        SamplerKind::FloatMap => format!("{src}.getData()"),
        _ => format!("{src}.getPixelArray()"),
    };
    views.call_args.push(buffer_arg);
    for i in 0..4 {
        views.call_args.push(format!("{src}Rect[{i}]"));
    }
    views.call_args.push(format!("{src}w"));
    views.call_args.push(format!("{src}h"));
    views.call_args.push(format!("{src}scan"));

    let (jarr, jel) = match kind {
        SamplerKind::FloatMap => ("float[]", "jfloat"),
        _ => ("int[]", "jint"),
    };
    views.host_params.push(format!("{jarr} {src}"));
    for corner in ["x0", "y0", "x1", "y1"] {
        views.host_params.push(format!("float {src}{corner}"));
    }
    views.host_params.push(format!("int {src}w"));
    views.host_params.push(format!("int {src}h"));
    views.host_params.push(format!("int {src}scan"));

    let jarr_native = match kind {
        SamplerKind::FloatMap => "jfloatArray",
        _ => "jintArray",
    };
    views.native_params.push(format!("{jarr_native} {src}_arr"));
    for corner in ["x0", "y0", "x1", "y1"] {
        views.native_params.push(format!("jfloat {src}{corner}"));
    }
    views.native_params.push(format!("jint {src}w"));
    views.native_params.push(format!("jint {src}h"));
    views.native_params.push(format!("jint {src}scan"));

    let _ = writeln!(
        views.acquire,
        "    {jel} *{src} = ({jel} *)(*env)->GetPrimitiveArrayCritical(env, {src}_arr, 0);"
    );
    let _ = writeln!(views.acquire, "    if ({src} == NULL) return;");
    let _ = writeln!(
        views.release,
        "    (*env)->ReleasePrimitiveArrayCritical(env, {src}_arr, {src}, JNI_ABORT);"
    );

    // Ownership of a transformed input stays with the source effect; it is
    // handed back after the native call. Logical and float-map inputs are
    // borrowed views and are never released.
    if kind == SamplerKind::Transformed {
        let _ = writeln!(
            views.cleanup,
            "        getInput({reg}).releaseTransformedImage({src});"
        );
    }

    let _ = writeln!(views.setup, "    float inc{reg}_x = ({src}x1 - {src}x0) / dstw;");
    let _ = writeln!(views.setup, "    float inc{reg}_y = ({src}y1 - {src}y0) / dsth;");
    let _ = writeln!(views.setup, "    float pos{reg}_y = {src}y0 + inc{reg}_y * 0.5f;");
    let _ = writeln!(
        views.scanline,
        "        float pos{reg}_x = {src}x0 + inc{reg}_x * 0.5f;"
    );
    let _ = writeln!(views.pixelstep, "            pos{reg}_x += inc{reg}_x;");
    let _ = writeln!(views.scanstep, "        pos{reg}_y += inc{reg}_y;");
    Ok(())
}

// ---------------------------------------------------------------------
// Artifact rendering
// ---------------------------------------------------------------------

/// The rendered output artifacts.
pub(crate) struct Artifacts {
    pub class_name: String,
    pub java: String,
    pub c: String,
}

pub(crate) fn generate(
    program: &Program,
    scan: &ScanOutput,
    peer: &str,
    interface: Option<&str>,
) -> Result<Artifacts, BackendError> {
    let slots = slots(program)?;
    let mut views = Views::default();
    for slot in &slots {
        render_slot(&mut views, slot)?;
    }
    debug_assert_eq!(views.host_params.len(), views.native_params.len());
    debug_assert_eq!(views.host_params.len(), views.call_args.len());

    let class_name = format!("{peer}Peer");
    let iface = interface
        .map(|i| format!(" implements {i}"))
        .unwrap_or_default();

    let java = render_template(
        WRAPPER_TEMPLATE,
        &[
            ("EFFECT", program.name.as_str()),
            ("CLASS", &class_name),
            ("INTERFACE", &iface),
            ("GLUE", scan.glue.trim_end()),
            ("LOCALS", views.locals.trim_end()),
            ("ARGS", &continuation(&views.call_args, "            ")),
            ("CLEANUP", views.cleanup.trim_end()),
            ("PARAMS", &continuation(&views.host_params, "            ")),
        ],
    )?;

    let c = render_template(
        KERNEL_TEMPLATE,
        &[
            ("EFFECT", program.name.as_str()),
            ("MANGLED", &escape_jni(&class_name)),
            ("PARAMS", &continuation(&views.native_params, "     ")),
            ("ACQUIRE", views.acquire.trim_end()),
            ("SETUP", views.setup.trim_end()),
            ("SCANLINE", views.scanline.trim_end()),
            ("BODY", scan.body.trim_end()),
            ("PIXELSTEP", views.pixelstep.trim_end()),
            ("SCANSTEP", views.scanstep.trim_end()),
            ("RELEASE", views.release.trim_end()),
        ],
    )?;

    Ok(Artifacts {
        class_name,
        java,
        c,
    })
}

/// Renders positional entries as `,\n<pad>entry` continuations appended
/// after the fixed leading parameters.
fn continuation(entries: &[String], pad: &str) -> String {
    let mut out = String::new();
    for e in entries {
        let _ = write!(out, ",\n{pad}{e}");
    }
    out
}

/// Escapes a name for use in a JNI-mangled C function name.
fn escape_jni(name: &str) -> String {
    name.replace('_', "_1")
}

/// Substitutes `@KEY@` markers. Every provided key must appear in the
/// template and every marker in the template must be provided; template
/// drift surfaces as a resource error rather than silently corrupt output.
fn render_template(template: &str, subs: &[(&str, &str)]) -> Result<String, BackendError> {
    let mut markers = HashSet::new();
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '@' {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_ascii_uppercase() || chars[j] == '_') {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j] == '@' {
                markers.insert(chars[i + 1..j].iter().collect::<String>());
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    for (key, _) in subs {
        if !markers.contains(*key) {
            return Err(BackendError::Resource(format!(
                "template has no placeholder @{key}@"
            )));
        }
    }
    for marker in &markers {
        if !subs.iter().any(|(k, _)| k == marker) {
            return Err(BackendError::Resource(format!(
                "unsubstituted template placeholder @{marker}@"
            )));
        }
    }

    let mut out = template.to_string();
    for (key, value) in subs {
        out = out.replace(&format!("@{key}@"), value);
    }
    Ok(out)
}
