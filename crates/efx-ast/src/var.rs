//! Global variables and the qualifiers that bind them.

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// Storage qualifier of a global variable.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Qualifier {
    /// Unqualified.
    None,
    /// Compile-time constant. A `Const` variable with no constant value is
    /// a built-in placeholder supplied by the runtime (`pos0`, `pixcoord`,
    /// `color`, ...).
    Const,
    /// Bound to an externally-set effect parameter, fetched through the
    /// variable's accessor.
    Param,
}

/// The literal value of a `const` variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Int(i32),
    Float(f32),
    /// Per-lane values of a vector constant.
    Vector(Vec<f32>),
}

/// A global variable in an effect program's symbol table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub qualifier: Qualifier,
    /// Element count for array-valued params; `None` for non-arrays.
    pub array_len: Option<u32>,
    /// Literal value for `const` variables.
    pub const_value: Option<ConstValue>,
    /// Host-side getter used to fetch the runtime value of a `param`.
    pub accessor: Option<String>,
    /// Input-image slot index for samplers.
    pub register: Option<u32>,
}

impl Variable {
    /// An unqualified variable.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            qualifier: Qualifier::None,
            array_len: None,
            const_value: None,
            accessor: None,
            register: None,
        }
    }

    /// A `param` variable with its host-side accessor.
    pub fn param(name: impl Into<String>, ty: Type, accessor: impl Into<String>) -> Self {
        Self {
            qualifier: Qualifier::Param,
            accessor: Some(accessor.into()),
            ..Self::new(name, ty)
        }
    }

    /// A `const` variable with a literal value.
    pub fn constant(name: impl Into<String>, ty: Type, value: ConstValue) -> Self {
        Self {
            qualifier: Qualifier::Const,
            const_value: Some(value),
            ..Self::new(name, ty)
        }
    }

    /// A runtime-supplied built-in placeholder (`const` with no value).
    pub fn builtin(name: impl Into<String>, ty: Type) -> Self {
        Self {
            qualifier: Qualifier::Const,
            ..Self::new(name, ty)
        }
    }

    /// A sampler `param` bound to the given input-image register.
    pub fn sampler(name: impl Into<String>, ty: Type, register: u32) -> Self {
        Self {
            qualifier: Qualifier::Param,
            register: Some(register),
            ..Self::new(name, ty)
        }
    }

    /// Marks this variable as an array-valued param of `len` elements.
    pub fn with_array_len(mut self, len: u32) -> Self {
        self.array_len = Some(len);
        self
    }

    /// Returns `true` for built-in placeholders: `const`-qualified
    /// variables with no constant value, reserved for implicit values the
    /// runtime supplies directly.
    pub fn is_builtin(&self) -> bool {
        self.qualifier == Qualifier::Const && self.const_value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_carries_accessor() {
        let v = Variable::param("area", Type::FLOAT4, "getArea");
        assert_eq!(v.qualifier, Qualifier::Param);
        assert_eq!(v.accessor.as_deref(), Some("getArea"));
        assert!(!v.is_builtin());
    }

    #[test]
    fn builtin_rule() {
        let pos = Variable::builtin("pos0", Type::FLOAT2);
        assert!(pos.is_builtin());

        let k = Variable::constant("k", Type::FLOAT, ConstValue::Float(2.5));
        assert!(!k.is_builtin());
    }

    #[test]
    fn array_len() {
        let w = Variable::param("weights", Type::FLOAT4, "getWeights").with_array_len(16);
        assert_eq!(w.array_len, Some(16));
    }
}
