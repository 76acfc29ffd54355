//! Type system for effect programs.

use serde::{Deserialize, Serialize};

/// The kind of a scalar slot.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScalarKind {
    /// Signed integer.
    Int,
    /// Floating point.
    Float,
    /// Boolean. The type of relational and logical expressions; it never
    /// crosses the host/native parameter boundary.
    Bool,
}

/// The addressing mode of a sampler parameter.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SamplerKind {
    /// Pixel-image sampler read at untransformed (logical) coordinates.
    Logical,
    /// Pixel-image sampler read after the geometry transform.
    Transformed,
    /// In-memory float-map sampler.
    FloatMap,
}

/// Number of lanes in a value: scalar (`One`) or vector (2..4).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Arity {
    /// Scalar.
    One = 1,
    /// 2-component vector.
    Two = 2,
    /// 3-component vector.
    Three = 3,
    /// 4-component vector.
    Four = 4,
}

/// A type in an effect program.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// A single scalar value.
    Scalar(ScalarKind),
    /// A vector of 2..4 scalars.
    Vector { kind: ScalarKind, size: Arity },
    /// A sampler bound to an input image or float map.
    Sampler(SamplerKind),
}

impl Type {
    pub const INT: Self = Self::Scalar(ScalarKind::Int);
    pub const FLOAT: Self = Self::Scalar(ScalarKind::Float);
    pub const BOOL: Self = Self::Scalar(ScalarKind::Bool);
    pub const INT2: Self = Self::vector(ScalarKind::Int, Arity::Two);
    pub const INT3: Self = Self::vector(ScalarKind::Int, Arity::Three);
    pub const INT4: Self = Self::vector(ScalarKind::Int, Arity::Four);
    pub const FLOAT2: Self = Self::vector(ScalarKind::Float, Arity::Two);
    pub const FLOAT3: Self = Self::vector(ScalarKind::Float, Arity::Three);
    pub const FLOAT4: Self = Self::vector(ScalarKind::Float, Arity::Four);
    pub const SAMPLER: Self = Self::Sampler(SamplerKind::Logical);
    pub const LSAMPLER: Self = Self::Sampler(SamplerKind::Transformed);
    pub const FSAMPLER: Self = Self::Sampler(SamplerKind::FloatMap);

    const fn vector(kind: ScalarKind, size: Arity) -> Self {
        Self::Vector { kind, size }
    }

    /// Lane count: 1 for scalars and samplers, 2..4 for vectors.
    pub fn arity(&self) -> usize {
        match *self {
            Self::Vector { size, .. } => size as usize,
            Self::Scalar(_) | Self::Sampler(_) => 1,
        }
    }

    /// Returns `true` for vector types.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector { .. })
    }

    /// Returns `true` for sampler types.
    pub fn is_sampler(&self) -> bool {
        matches!(self, Self::Sampler(_))
    }

    /// The scalar kind of a scalar or vector type.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match *self {
            Self::Scalar(kind) | Self::Vector { kind, .. } => Some(kind),
            Self::Sampler(_) => None,
        }
    }

    /// The addressing mode of a sampler type.
    pub fn sampler_kind(&self) -> Option<SamplerKind> {
        match *self {
            Self::Sampler(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Scalar-slot name suffixes for vector lanes 0..3.
pub const LANE_SUFFIXES: [&str; 4] = ["_x", "_y", "_z", "_w"];

/// The scalar-slot suffix for a lane index.
///
/// Callers guarantee `lane < 4`; lane indices only ever come from iterating
/// an [`Arity`].
pub fn lane_suffix(lane: usize) -> &'static str {
    LANE_SUFFIXES[lane]
}

/// Maps a field character to its lane index.
///
/// Positional names `x,y,z,w` and color-channel aliases `r,g,b,a` address
/// the same lanes 0..3.
pub fn field_index(field: char) -> Option<usize> {
    match field {
        'x' | 'r' => Some(0),
        'y' | 'g' => Some(1),
        'z' | 'b' => Some(2),
        'w' | 'a' => Some(3),
        _ => None,
    }
}
