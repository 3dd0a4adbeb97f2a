//! Formula expression evaluator for fixture definitions.
//!
//! # Why?
//!
//! Fixture definition documents embed small free-text formulas in their
//! geometry and parameter fields: head spacing, tilt offsets, conditional
//! channel defaults. They are evaluated once at load time, after the loader
//! has substituted every variable reference, so the language is deliberately
//! tiny: arithmetic, boolean logic, comparisons, a ternary conditional, and
//! single-argument math functions. One call evaluates one string to one typed
//! [`Value`], with no state carried between calls.
//!
//! The evaluator works by interval splitting rather than building a syntax
//! tree: it repeatedly re-slices the formula text at the weakest-binding
//! operator. For a grammar this small that is simpler than a conventional
//! parser, and it pins down behavior (left-to-right associativity, the
//! ternary false-branch parenthesization rule) that existing fixture
//! libraries depend on.
//!
//! # Example
//!
//! ```rust
//! use fixture_expr::{evaluate_boolean, evaluate_numeric};
//!
//! let spacing: f64 = evaluate_numeric("2*(1.5+0.75)").unwrap();
//! assert_eq!(spacing, 4.5);
//!
//! let wide = evaluate_boolean::<f64>("16/9>=1.5").unwrap();
//! assert!(wide);
//!
//! let tilt: f64 = evaluate_numeric("true?-30:30").unwrap();
//! assert_eq!(tilt, -30.0);
//! ```

mod error;
mod evaluate;
pub mod functions;
mod value;

pub use error::EvalError;
pub use evaluate::{
    evaluate, evaluate_boolean, evaluate_boolean_or, evaluate_numeric, evaluate_numeric_or,
    Evaluator, DEFAULT_MAX_DEPTH,
};
pub use functions::MathFn;
pub use value::{Value, ValueKind};

/// Float types the evaluator can compute with.
pub trait FloatExt:
    num_traits::Float + std::str::FromStr + std::fmt::Display + Send + Sync
{
}
impl FloatExt for f32 {}
impl FloatExt for f64 {}
