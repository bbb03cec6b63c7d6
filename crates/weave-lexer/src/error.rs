//! Lexer error types.

/// Error produced while splitting markup into elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LexError {
    /// A code fence was opened but never closed.
    #[error("line {line}: unterminated code fence")]
    UnterminatedFence {
        /// Line of the opening fence (1-indexed).
        line: usize,
    },
}
