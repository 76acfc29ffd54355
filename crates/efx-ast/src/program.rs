//! The top-level effect program.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::AstError;
use crate::func::FuncDef;
use crate::var::Variable;

/// A complete, type-checked effect program.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    /// Effect name, e.g. `"Brightpass"`.
    pub name: String,
    /// Global variables by name. Iteration order is unspecified; consumers
    /// needing determinism must sort by name.
    pub symbols: HashMap<String, Variable>,
    /// Top-level function definitions, `main` included, in source order.
    pub functions: Vec<FuncDef>,
}

impl Program {
    /// Creates an empty program with the given effect name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The distinguished `main` entry point, if present.
    pub fn main(&self) -> Option<&FuncDef> {
        self.functions.iter().find(|f| f.is_main())
    }

    /// Adds a variable to the symbol table under its own name.
    pub fn declare(&mut self, var: Variable) {
        self.symbols.insert(var.name.clone(), var);
    }

    /// Structural validation: a `main` exists, function names are unique,
    /// `param` variables carry accessors (samplers carry registers
    /// instead), and symbol-table keys match variable names.
    ///
    /// This is not semantic analysis; type checking happened in the front
    /// end and is trusted.
    pub fn validate(&self) -> Result<(), AstError> {
        if self.main().is_none() {
            return Err(AstError::MissingMain);
        }

        let mut seen = HashSet::new();
        for f in &self.functions {
            if !seen.insert(f.name.as_str()) {
                return Err(AstError::DuplicateFunction(f.name.clone()));
            }
        }

        for (key, var) in &self.symbols {
            if *key != var.name {
                return Err(AstError::MisfiledVariable {
                    key: key.clone(),
                    name: var.name.clone(),
                });
            }
            if var.ty.is_sampler() {
                if var.register.is_none() {
                    return Err(AstError::MissingRegister(var.name.clone()));
                }
            } else if var.qualifier == crate::Qualifier::Param && var.accessor.is_none() {
                return Err(AstError::MissingAccessor(var.name.clone()));
            }
        }

        Ok(())
    }
}
