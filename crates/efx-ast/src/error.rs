//! Error types for AST validation.

/// Structural defects detected by [`Program::validate`](crate::Program::validate).
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    /// The program has no `main` function.
    #[error("program has no `main` function")]
    MissingMain,

    /// Two function definitions share a name.
    #[error("duplicate function definition `{0}`")]
    DuplicateFunction(String),

    /// A `param` variable has no host-side accessor.
    #[error("param variable `{0}` has no accessor")]
    MissingAccessor(String),

    /// A sampler variable has no input-image register.
    #[error("sampler variable `{0}` has no register index")]
    MissingRegister(String),

    /// A symbol-table entry is keyed under a different name than it carries.
    #[error("symbol table key `{key}` does not match variable name `{name}`")]
    MisfiledVariable { key: String, name: String },
}
