use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

/// Diagnostics surfaced by the translation core. Each source-level error
/// carries the line number of the offending construct; the driver prints
/// them as `Line N: message`.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum CompileError {
    /// Produced by the external parser and tunneled through unchanged.
    #[error("Line {line}: {message}")]
    SyntaxError { line: u32, message: String },

    /// Name resolution, arity, loop-context, constness violations.
    #[error("Line {line}: {message}")]
    SemanticError { line: u32, message: String },

    /// An operand type not acceptable for an operator.
    #[error("Line {line}: {message}")]
    TypeError { line: u32, message: String },

    /// Invariant violation inside the core. Asserts in debug builds,
    /// fails closed in release.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl CompileError {
    pub fn semantic(line: u32, message: impl Into<String>) -> Self {
        Self::SemanticError { line, message: message.into() }
    }
    pub fn typing(line: u32, message: impl Into<String>) -> Self {
        Self::TypeError { line, message: message.into() }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(false, "internal error: {message}");
        Self::InternalError(message)
    }
}
