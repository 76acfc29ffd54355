//! Built-in function implementations.
//!
//! Calls that do not resolve in the user function-definition table are
//! looked up here. Each built-in expands in the call preamble to C code
//! computing the same `<fn>_res` temporaries a user function would, so the
//! call site only ever references a precomputed result.

use efx_ast::{lane_suffix, Expr, ExprKind, SamplerKind, ScalarKind};
use efx_backend_core::BackendError;

use crate::scan::{KernelScanner, LaneCtx};

/// A built-in function of the effect language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intrinsic {
    Abs,
    Min,
    Max,
    Clamp,
    Floor,
    Fract,
    Sqrt,
    Mix,
    /// Pixel-image fetch; yields a 4-vector.
    Sample,
    /// Float-map fetch; yields a scalar.
    FSample,
}

pub(crate) fn lookup(name: &str) -> Option<Intrinsic> {
    Some(match name {
        "abs" => Intrinsic::Abs,
        "min" => Intrinsic::Min,
        "max" => Intrinsic::Max,
        "clamp" => Intrinsic::Clamp,
        "floor" => Intrinsic::Floor,
        "fract" => Intrinsic::Fract,
        "sqrt" => Intrinsic::Sqrt,
        "mix" => Intrinsic::Mix,
        "sample" => Intrinsic::Sample,
        "fsample" => Intrinsic::FSample,
        _ => return None,
    })
}

fn arg_count(intr: Intrinsic) -> usize {
    match intr {
        Intrinsic::Abs | Intrinsic::Floor | Intrinsic::Fract | Intrinsic::Sqrt => 1,
        Intrinsic::Min | Intrinsic::Max => 2,
        Intrinsic::Clamp | Intrinsic::Mix | Intrinsic::Sample | Intrinsic::FSample => 3,
    }
}

/// Expands one built-in call into preamble statements.
pub(crate) fn expand(
    scanner: &mut KernelScanner<'_>,
    intr: Intrinsic,
    call: &Expr,
    args: &[Expr],
) -> Result<(), BackendError> {
    if args.len() != arg_count(intr) {
        return Err(BackendError::Internal(format!(
            "built-in `{intr:?}` called with {} argument(s), expected {}",
            args.len(),
            arg_count(intr)
        )));
    }
    match intr {
        Intrinsic::Sample | Intrinsic::FSample => expand_sample(scanner, intr, call, args),
        _ => expand_math(scanner, intr, call, args),
    }
}

fn expand_math(
    scanner: &mut KernelScanner<'_>,
    intr: Intrinsic,
    call: &Expr,
    args: &[Expr],
) -> Result<(), BackendError> {
    let name = intrinsic_name(intr);
    let is_int = call.ty.scalar_kind() == Some(ScalarKind::Int);
    scanner.declare_result(name, call.ty)?;

    let lanes = call.ty.arity();
    for lane in 0..lanes {
        let ctx = if call.ty.is_vector() {
            LaneCtx::vector(lane)
        } else {
            LaneCtx::default()
        };
        let mut texts = Vec::with_capacity(args.len());
        for a in args {
            let mut t = String::new();
            scanner.emit_expr(a, ctx, &mut t)?;
            texts.push(t);
        }
        let rhs = match intr {
            Intrinsic::Abs if is_int => format!("abs({})", texts[0]),
            Intrinsic::Abs => format!("fabsf({})", texts[0]),
            Intrinsic::Min if is_int => {
                format!("(({a}) < ({b}) ? ({a}) : ({b}))", a = texts[0], b = texts[1])
            }
            Intrinsic::Min => format!("fminf({}, {})", texts[0], texts[1]),
            Intrinsic::Max if is_int => {
                format!("(({a}) > ({b}) ? ({a}) : ({b}))", a = texts[0], b = texts[1])
            }
            Intrinsic::Max => format!("fmaxf({}, {})", texts[0], texts[1]),
            Intrinsic::Clamp => format!(
                "fminf(fmaxf({}, {}), {})",
                texts[0], texts[1], texts[2]
            ),
            Intrinsic::Floor => format!("floorf({})", texts[0]),
            Intrinsic::Fract => format!("(({a}) - floorf({a}))", a = texts[0]),
            Intrinsic::Sqrt => format!("sqrtf({})", texts[0]),
            Intrinsic::Mix => format!(
                "(({a}) + (({b}) - ({a})) * ({t}))",
                a = texts[0],
                b = texts[1],
                t = texts[2]
            ),
            Intrinsic::Sample | Intrinsic::FSample => {
                return Err(BackendError::Internal(
                    "sampler fetch routed through math expansion".into(),
                ));
            }
        };
        let suffix = if call.ty.is_vector() {
            lane_suffix(lane)
        } else {
            ""
        };
        scanner.push_line(&format!("{name}_res{suffix} = {rhs};"));
    }
    Ok(())
}

fn expand_sample(
    scanner: &mut KernelScanner<'_>,
    intr: Intrinsic,
    call: &Expr,
    args: &[Expr],
) -> Result<(), BackendError> {
    let name = intrinsic_name(intr);
    let ExprKind::Variable(sampler_name) = &args[0].kind else {
        return Err(BackendError::Unsupported(format!(
            "`{name}` requires a sampler variable as its first argument"
        )));
    };
    let var = scanner
        .program()
        .symbols
        .get(sampler_name)
        .ok_or_else(|| {
            BackendError::Internal(format!("unknown sampler variable `{sampler_name}`"))
        })?;
    let kind = var.ty.sampler_kind().ok_or_else(|| {
        BackendError::Internal(format!("`{name}` applied to non-sampler `{sampler_name}`"))
    })?;
    match (intr, kind) {
        (Intrinsic::Sample, SamplerKind::Logical | SamplerKind::Transformed) => {}
        (Intrinsic::FSample, SamplerKind::FloatMap) => {}
        _ => {
            return Err(BackendError::Unsupported(format!(
                "`{name}` applied to a {} sampler",
                var.ty
            )));
        }
    }
    let reg = var.register.ok_or_else(|| {
        BackendError::Internal(format!("sampler `{sampler_name}` has no register index"))
    })?;

    let mut x = String::new();
    scanner.emit_expr(&args[1], LaneCtx::default(), &mut x)?;
    let mut y = String::new();
    scanner.emit_expr(&args[2], LaneCtx::default(), &mut y)?;

    scanner.declare_result(name, call.ty)?;
    let src = format!("src{reg}");

    scanner.push_line("{");
    scanner.push_line(&format!("    int sx = (int)(({x}) * {src}w);"));
    scanner.push_line(&format!("    int sy = (int)(({y}) * {src}h);"));
    scanner.push_line(&format!(
        "    if (sx < 0) sx = 0; else if (sx >= {src}w) sx = {src}w - 1;"
    ));
    scanner.push_line(&format!(
        "    if (sy < 0) sy = 0; else if (sy >= {src}h) sy = {src}h - 1;"
    ));
    if intr == Intrinsic::FSample {
        scanner.push_line(&format!("    fsample_res = {src}[sy * {src}scan + sx];"));
    } else {
        scanner.push_line(&format!("    int pix = {src}[sy * {src}scan + sx];"));
        scanner.push_line("    sample_res_w = ((pix >> 24) & 0xff) * (1.0f / 255.0f);");
        scanner.push_line("    sample_res_x = ((pix >> 16) & 0xff) * (1.0f / 255.0f);");
        scanner.push_line("    sample_res_y = ((pix >> 8) & 0xff) * (1.0f / 255.0f);");
        scanner.push_line("    sample_res_z = (pix & 0xff) * (1.0f / 255.0f);");
    }
    scanner.push_line("}");
    Ok(())
}

fn intrinsic_name(intr: Intrinsic) -> &'static str {
    match intr {
        Intrinsic::Abs => "abs",
        Intrinsic::Min => "min",
        Intrinsic::Max => "max",
        Intrinsic::Clamp => "clamp",
        Intrinsic::Floor => "floor",
        Intrinsic::Fract => "fract",
        Intrinsic::Sqrt => "sqrt",
        Intrinsic::Mix => "mix",
        Intrinsic::Sample => "sample",
        Intrinsic::FSample => "fsample",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("min"), Some(Intrinsic::Min));
        assert_eq!(lookup("sample"), Some(Intrinsic::Sample));
        assert_eq!(lookup("discombobulate"), None);
    }

    #[test]
    fn arg_counts() {
        assert_eq!(arg_count(Intrinsic::Sqrt), 1);
        assert_eq!(arg_count(Intrinsic::Max), 2);
        assert_eq!(arg_count(Intrinsic::Mix), 3);
        assert_eq!(arg_count(Intrinsic::Sample), 3);
    }
}
