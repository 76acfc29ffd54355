//! Function definitions.

use serde::{Deserialize, Serialize};

use crate::stmt::Statement;
use crate::types::Type;

/// A formal parameter of a function.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuncParam {
    pub name: String,
    pub ty: Type,
}

/// A function definition.
///
/// Every named (non-`main`) function returns a value; `main` has no result
/// and writes its output through the `color` built-in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: String,
    /// Return type; `None` only for `main`.
    pub result: Option<Type>,
    pub params: Vec<FuncParam>,
    pub body: Vec<Statement>,
}

impl FuncDef {
    /// Creates an empty function with the given name and result type.
    pub fn new(name: impl Into<String>, result: Option<Type>) -> Self {
        Self {
            name: name.into(),
            result,
            params: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Returns `true` for the distinguished `main` entry point.
    pub fn is_main(&self) -> bool {
        self.name == "main"
    }
}
