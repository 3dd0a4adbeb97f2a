use std::fmt;

use crate::error::EvalError;
use crate::FloatExt;

/// The typed outcome of evaluating a formula.
///
/// Every successful evaluation yields exactly one of these; there is no
/// "undefined" result. Sub-results are rendered back to text with
/// [`Display`](fmt::Display) when a parenthesized span has to be spliced into
/// its surrounding formula.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<Real> {
    Numeric(Real),
    Boolean(bool),
}

/// Which variant a [`Value`] holds. Used in type-mismatch diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Numeric,
    Boolean,
}

impl<Real: FloatExt> Value<Real> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Numeric(_) => ValueKind::Numeric,
            Self::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Extract the numeric variant, or fail with a type mismatch.
    pub fn numeric(self) -> Result<Real, EvalError> {
        match self {
            Self::Numeric(n) => Ok(n),
            Self::Boolean(_) => Err(EvalError::TypeMismatch {
                expected: ValueKind::Numeric,
                found: ValueKind::Boolean,
            }),
        }
    }

    /// Extract the boolean variant, or fail with a type mismatch.
    pub fn boolean(self) -> Result<bool, EvalError> {
        match self {
            Self::Boolean(b) => Ok(b),
            Self::Numeric(_) => Err(EvalError::TypeMismatch {
                expected: ValueKind::Boolean,
                found: ValueKind::Numeric,
            }),
        }
    }
}

impl<Real: FloatExt> fmt::Display for Value<Real> {
    /// Canonical literal rendering: shortest round-trip formatting for
    /// numbers, `true`/`false` for booleans. Re-evaluating the rendered text
    /// yields an equal value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_check_the_variant() {
        assert_eq!(Value::Numeric(2.5f64).numeric().unwrap(), 2.5);
        assert!(Value::<f64>::Boolean(true).boolean().unwrap());

        let err = Value::<f64>::Boolean(true).numeric().unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeMismatch {
                expected: ValueKind::Numeric,
                found: ValueKind::Boolean,
            }
        );
    }

    #[test]
    fn rendering_round_trips() {
        assert_eq!(Value::Numeric(0.1f64 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Numeric(-4.0f32).to_string(), "-4");
        assert_eq!(Value::<f64>::Boolean(false).to_string(), "false");
    }
}
