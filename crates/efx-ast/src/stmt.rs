//! Statements and control flow.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::var::Variable;

/// A statement in a function body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Statement {
    /// A variable declaration with an optional initializer. Declarations
    /// of qualified variables restate a symbol-table entry at its source
    /// position; backends declare those elsewhere.
    Decl {
        var: Variable,
        init: Option<Expr>,
    },
    /// An expression evaluated for its side effects.
    Expr(Expr),
    /// A braced statement list.
    Block(Vec<Statement>),
    /// Conditional branch.
    If {
        condition: Expr,
        accept: Vec<Statement>,
        reject: Vec<Statement>,
    },
    /// C-style `for` loop.
    For {
        init: Option<Box<Statement>>,
        condition: Expr,
        update: Option<Expr>,
        body: Vec<Statement>,
    },
    While {
        condition: Expr,
        body: Vec<Statement>,
    },
    DoWhile {
        body: Vec<Statement>,
        condition: Expr,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// Abort the per-pixel computation for this output pixel. Not
    /// implemented by any current backend.
    Discard,
    /// Verbatim pass-through text destined for the generated host-side
    /// wrapper.
    Glue(String),
}
