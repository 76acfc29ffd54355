//! efx abstract syntax tree.
//!
//! The typed, already-checked representation of an effect program that the
//! code-generation backends consume. A front end (parser + type checker,
//! not part of this workspace) produces these trees; every expression node
//! carries the static type the checker assigned to it, and the backends
//! trust those annotations.

mod display;
mod error;
mod expr;
mod func;
mod program;
mod stmt;
mod types;
mod var;

pub use display::dump_program;
pub use error::AstError;
pub use expr::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
pub use func::{FuncDef, FuncParam};
pub use program::Program;
pub use stmt::Statement;
pub use types::{field_index, lane_suffix, Arity, SamplerKind, ScalarKind, Type, LANE_SUFFIXES};
pub use var::{ConstValue, Qualifier, Variable};
