use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::EvalError;
use crate::FloatExt;

/// A single-argument numeric transform usable in formulas.
///
/// The direct trigonometric functions take degrees and the inverse ones
/// return degrees, matching how fixture geometry is authored; `deg`/`rad`
/// convert explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Deg,
    Rad,
    Abs,
    Sqrt,
    Floor,
    Ceil,
    Round,
}

/// Fixed name registry. None of the names is a prefix of another, so the
/// evaluator's leaf step can match them with a plain `strip_prefix`.
static FUNCTIONS: Lazy<BTreeMap<&'static str, MathFn>> = Lazy::new(|| {
    use MathFn::*;
    BTreeMap::from([
        ("sin", Sin),
        ("cos", Cos),
        ("tan", Tan),
        ("asin", Asin),
        ("acos", Acos),
        ("atan", Atan),
        ("deg", Deg),
        ("rad", Rad),
        ("abs", Abs),
        ("sqrt", Sqrt),
        ("floor", Floor),
        ("ceil", Ceil),
        ("round", Round),
    ])
});

impl MathFn {
    pub fn apply<Real: FloatExt>(self, x: Real) -> Real {
        match self {
            Self::Sin => x.to_radians().sin(),
            Self::Cos => x.to_radians().cos(),
            Self::Tan => x.to_radians().tan(),
            Self::Asin => x.asin().to_degrees(),
            Self::Acos => x.acos().to_degrees(),
            Self::Atan => x.atan().to_degrees(),
            Self::Deg => x.to_degrees(),
            Self::Rad => x.to_radians(),
            Self::Abs => x.abs(),
            Self::Sqrt => x.sqrt(),
            Self::Floor => x.floor(),
            Self::Ceil => x.ceil(),
            Self::Round => x.round(),
        }
    }
}

/// Look up `name` and apply it to `arg`.
pub fn apply<Real: FloatExt>(name: &str, arg: Real) -> Result<Real, EvalError> {
    FUNCTIONS
        .get(name)
        .copied()
        .map(|f| f.apply(arg))
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
}

/// If `expr` starts with a registered function name, return the function and
/// the remaining argument text.
pub(crate) fn match_prefix(expr: &str) -> Option<(MathFn, &str)> {
    FUNCTIONS
        .iter()
        .find_map(|(name, f)| expr.strip_prefix(name).map(|rest| (*f, rest)))
}

/// Whether `text` ends with a registered function name. Used to recognize a
/// `-` that directly follows a function name as a sign rather than a
/// subtraction, e.g. the `-` in `abs-5`.
pub(crate) fn name_ends_at(text: &str) -> bool {
    FUNCTIONS.keys().any(|name| text.ends_with(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trig_is_degree_based() {
        assert!((apply("sin", 30.0f64).unwrap() - 0.5).abs() < 1e-12);
        assert!((apply("cos", 60.0f64).unwrap() - 0.5).abs() < 1e-12);
        assert!((apply("atan", 1.0f64).unwrap() - 45.0).abs() < 1e-12);
        assert!((apply("asin", 1.0f64).unwrap() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn conversions_and_rounding() {
        assert!((apply("rad", 180.0f64).unwrap() - std::f64::consts::PI).abs() < 1e-12);
        assert!((apply("deg", std::f64::consts::PI).unwrap() - 180.0).abs() < 1e-12);
        assert_eq!(apply("floor", 2.7f64).unwrap(), 2.0);
        assert_eq!(apply("ceil", 2.1f64).unwrap(), 3.0);
        assert_eq!(apply("round", 2.5f64).unwrap(), 3.0);
        assert_eq!(apply("abs", -3.0f64).unwrap(), 3.0);
        assert_eq!(apply("sqrt", 9.0f64).unwrap(), 3.0);
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert_eq!(
            apply("cbrt", 8.0f64).unwrap_err(),
            EvalError::UnknownFunction("cbrt".to_string())
        );
    }

    #[test]
    fn prefix_matching() {
        let (f, rest) = match_prefix("sqrt9").unwrap();
        assert_eq!(f, MathFn::Sqrt);
        assert_eq!(rest, "9");
        // `asin` must not be mistaken for an argument to `sin`.
        let (f, rest) = match_prefix("asin0.5").unwrap();
        assert_eq!(f, MathFn::Asin);
        assert_eq!(rest, "0.5");
        assert!(match_prefix("2.5").is_none());
    }

    #[test]
    fn name_window() {
        assert!(name_ends_at("4+abs"));
        assert!(name_ends_at("atan"));
        assert!(!name_ends_at("4+ab"));
        assert!(!name_ends_at(""));
    }
}
