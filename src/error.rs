use thiserror::Error;

use crate::value::ValueKind;

/// Parse/evaluate-time failure. Nothing here is transient: the same formula
/// fails the same way every time, so callers (the fixture-document loader)
/// are expected to downgrade these to warnings and substitute a default.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("`?` without a matching `:`")]
    MismatchedTernary,

    #[error("type mismatch: expected a {expected} value, found a {found} value")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("invalid literal `{0}`")]
    InvalidLiteral(String),

    #[error("empty expression")]
    EmptyExpression,

    #[error("expression too deeply nested")]
    TooComplex,
}
