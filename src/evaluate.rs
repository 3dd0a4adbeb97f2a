use crate::error::EvalError;
use crate::functions;
use crate::value::Value;
use crate::FloatExt;

/// Recursion budget used by [`Evaluator::default`]. Real fixture formulas
/// nest a handful of levels at most; anything deeper is adversarial input.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Binary operator precedence ladder, weakest binding first.
///
/// The evaluator splits at the rightmost operator of the first level that
/// matches anywhere in the string. Splitting the weakest binder first and
/// picking the rightmost occurrence within a level yields left-to-right
/// associativity: the left half may still contain same-level operators and is
/// split again on recursion.
const PRECEDENCE: &[&[&str]] = &[
    &["||", "|"],
    &["&&", "&"],
    &["<=", ">=", "<", ">"],
    &["==", "!="],
    &["+", "-"],
    &["*", "/", "%"],
    &["^"],
];

/// Characters that cannot end a complete operand. A `-` right after one of
/// these is a sign on the operand that follows, not a subtraction.
const OPERAND_BREAKERS: &[u8] = b"^*/+-%<>=!&|(?:";

/// Evaluates formula strings by interval splitting: parenthesis collapse,
/// then ternary split, then the precedence ladder, then unary/leaf handling,
/// each step recursing on the substrings it carves out.
///
/// Stateless apart from the recursion limit; a single `Evaluator` may be
/// shared freely across threads.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator that gives up with [`EvalError::TooComplex`] beyond
    /// `max_depth` recursion levels.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Evaluate `formula` to a typed [`Value`].
    ///
    /// The formula must already have variable references substituted by the
    /// caller. Whitespace is stripped up front; none of the grammar depends
    /// on it as a separator.
    pub fn evaluate<Real: FloatExt>(&self, formula: &str) -> Result<Value<Real>, EvalError> {
        let stripped: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
        self.eval(&stripped, 0)
    }

    /// Evaluate `formula`, requiring a numeric result.
    pub fn evaluate_numeric<Real: FloatExt>(&self, formula: &str) -> Result<Real, EvalError> {
        self.evaluate(formula)?.numeric()
    }

    /// Evaluate `formula`, requiring a boolean result.
    pub fn evaluate_boolean<Real: FloatExt>(&self, formula: &str) -> Result<bool, EvalError> {
        self.evaluate::<Real>(formula)?.boolean()
    }

    fn eval<Real: FloatExt>(&self, expr: &str, depth: usize) -> Result<Value<Real>, EvalError> {
        if depth > self.max_depth {
            return Err(EvalError::TooComplex);
        }
        if let Some(value) = self.collapse_parens(expr, depth)? {
            return Ok(value);
        }
        if let Some(value) = self.split_ternary(expr, depth)? {
            return Ok(value);
        }
        if let Some(value) = self.split_binary(expr, depth)? {
            return Ok(value);
        }
        self.eval_leaf(expr, depth)
    }

    /// Resolve the innermost parenthesized span, if any.
    ///
    /// The scan tracks the most recent unmatched `(`; the first `)` seen
    /// necessarily closes it. When the span covers the whole string the inner
    /// result is returned as-is, with no string round-trip, so fully
    /// parenthesized formulas keep exact precision. Otherwise the inner
    /// result is rendered to its canonical literal, spliced over the span,
    /// and the whole string is evaluated again.
    fn collapse_parens<Real: FloatExt>(
        &self,
        expr: &str,
        depth: usize,
    ) -> Result<Option<Value<Real>>, EvalError> {
        let mut open = None;
        for (i, b) in expr.bytes().enumerate() {
            match b {
                b'(' => open = Some(i),
                b')' => {
                    let start = open.ok_or(EvalError::MismatchedParentheses)?;
                    let inner = &expr[start + 1..i];
                    if start == 0 && i == expr.len() - 1 {
                        return self.eval(inner, depth + 1).map(Some);
                    }
                    let value: Value<Real> = self.eval(inner, depth + 1)?;
                    let spliced = format!("{}{}{}", &expr[..start], value, &expr[i + 1..]);
                    return self.eval(&spliced, depth + 1).map(Some);
                }
                _ => {}
            }
        }
        if open.is_some() {
            return Err(EvalError::MismatchedParentheses);
        }
        Ok(None)
    }

    /// Split a ternary conditional at the first `?` and the last `:`.
    ///
    /// Only the taken branch is evaluated; the other is never parsed.
    /// Splitting at the last `:` makes unparenthesized nesting work in the
    /// true branch but not in the false branch, where the outer split can
    /// steal an inner ternary's colon. A ternary in false-branch position
    /// must be parenthesized. Long-standing behavior that existing fixture
    /// formulas rely on; do not change without a grammar decision.
    fn split_ternary<Real: FloatExt>(
        &self,
        expr: &str,
        depth: usize,
    ) -> Result<Option<Value<Real>>, EvalError> {
        let question = match expr.find('?') {
            Some(0) => return Err(EvalError::MismatchedTernary),
            Some(i) => i,
            None => return Ok(None),
        };
        let colon = expr
            .rfind(':')
            .filter(|&c| c > question)
            .ok_or(EvalError::MismatchedTernary)?;
        let condition = self.eval::<Real>(&expr[..question], depth + 1)?.boolean()?;
        let branch = if condition {
            &expr[question + 1..colon]
        } else {
            &expr[colon + 1..]
        };
        self.eval(branch, depth + 1).map(Some)
    }

    /// Walk the precedence ladder and split at the first level that has an
    /// operator occurrence, taking the rightmost occurrence within the level.
    fn split_binary<Real: FloatExt>(
        &self,
        expr: &str,
        depth: usize,
    ) -> Result<Option<Value<Real>>, EvalError> {
        for level in PRECEDENCE {
            let mut best: Option<(usize, &str)> = None;
            for &op in *level {
                if let Some(pos) = rightmost_occurrence(expr, op) {
                    if best.map_or(true, |(best_pos, _)| pos > best_pos) {
                        best = Some((pos, op));
                    }
                }
            }
            if let Some((pos, op)) = best {
                let lhs = self.eval(&expr[..pos], depth + 1)?;
                let rhs = self.eval(&expr[pos + op.len()..], depth + 1)?;
                return apply_binary(op, lhs, rhs).map(Some);
            }
        }
        Ok(None)
    }

    /// Unary operators, function application, and literal parsing.
    fn eval_leaf<Real: FloatExt>(&self, expr: &str, depth: usize) -> Result<Value<Real>, EvalError> {
        let expr = expr.trim();
        if let Some(rest) = expr.strip_prefix('-') {
            let operand = self.eval::<Real>(rest, depth + 1)?.numeric()?;
            return Ok(Value::Numeric(-operand));
        }
        if let Some(rest) = expr.strip_prefix('!') {
            let operand = self.eval::<Real>(rest, depth + 1)?.boolean()?;
            return Ok(Value::Boolean(!operand));
        }
        // A function's argument runs to the end of the current slice; callers
        // get grouping from the parenthesis step, e.g. `sin(45)` arrives here
        // as `sin45`.
        if let Some((function, rest)) = functions::match_prefix(expr) {
            let arg = self.eval::<Real>(rest, depth + 1)?.numeric()?;
            return Ok(Value::Numeric(function.apply(arg)));
        }
        if expr.is_empty() {
            return Err(EvalError::EmptyExpression);
        }
        if expr.eq_ignore_ascii_case("true") {
            return Ok(Value::Boolean(true));
        }
        if expr.eq_ignore_ascii_case("false") {
            return Ok(Value::Boolean(false));
        }
        expr.parse::<Real>()
            .map(Value::Numeric)
            .map_err(|_| EvalError::InvalidLiteral(expr.to_string()))
    }
}

/// Rightmost position where `op` occurs as a real binary operator.
fn rightmost_occurrence(expr: &str, op: &str) -> Option<usize> {
    let mut end = expr.len();
    while let Some(pos) = expr[..end].rfind(op) {
        if is_binary_occurrence(expr, pos, op) {
            return Some(pos);
        }
        if pos == 0 {
            return None;
        }
        // Keep overlapping earlier matches inside the next window.
        end = pos + op.len() - 1;
    }
    None
}

fn is_binary_occurrence(expr: &str, pos: usize, op: &str) -> bool {
    let bytes = expr.as_bytes();
    match op {
        // A `-` is a subtraction only if a complete operand just ended:
        // not at the start, not after an operator or grouping character,
        // and not directly after a function name (`abs-5` negates).
        "-" => {
            pos != 0
                && !OPERAND_BREAKERS.contains(&bytes[pos - 1])
                && !functions::name_ends_at(&expr[..pos])
        }
        // A lone `&`/`|` next to its twin is part of the doubled spelling.
        "&" | "|" => {
            let twin = op.as_bytes()[0];
            (pos == 0 || bytes[pos - 1] != twin) && bytes.get(pos + 1) != Some(&twin)
        }
        // `<`/`>` directly followed by `=` belong to `<=`/`>=`.
        "<" | ">" => bytes.get(pos + 1) != Some(&b'='),
        _ => true,
    }
}

fn apply_binary<Real: FloatExt>(
    op: &str,
    lhs: Value<Real>,
    rhs: Value<Real>,
) -> Result<Value<Real>, EvalError> {
    let value = match op {
        "||" | "|" => Value::Boolean(lhs.boolean()? || rhs.boolean()?),
        "&&" | "&" => Value::Boolean(lhs.boolean()? && rhs.boolean()?),
        "<=" => Value::Boolean(lhs.numeric()? <= rhs.numeric()?),
        ">=" => Value::Boolean(lhs.numeric()? >= rhs.numeric()?),
        "<" => Value::Boolean(lhs.numeric()? < rhs.numeric()?),
        ">" => Value::Boolean(lhs.numeric()? > rhs.numeric()?),
        "==" => Value::Boolean(lhs.numeric()? == rhs.numeric()?),
        "!=" => Value::Boolean(lhs.numeric()? != rhs.numeric()?),
        "+" => Value::Numeric(lhs.numeric()? + rhs.numeric()?),
        "-" => Value::Numeric(lhs.numeric()? - rhs.numeric()?),
        "*" => Value::Numeric(lhs.numeric()? * rhs.numeric()?),
        "/" => Value::Numeric(lhs.numeric()? / rhs.numeric()?),
        "%" => Value::Numeric(lhs.numeric()? % rhs.numeric()?),
        "^" => Value::Numeric(lhs.numeric()?.powf(rhs.numeric()?)),
        op => unreachable!("not a binary operator: {op}"),
    };
    Ok(value)
}

/// Evaluate `formula` with the default recursion budget.
pub fn evaluate<Real: FloatExt>(formula: &str) -> Result<Value<Real>, EvalError> {
    Evaluator::default().evaluate(formula)
}

/// Evaluate `formula` with the default recursion budget, requiring a numeric
/// result.
pub fn evaluate_numeric<Real: FloatExt>(formula: &str) -> Result<Real, EvalError> {
    Evaluator::default().evaluate_numeric(formula)
}

/// Evaluate `formula` with the default recursion budget, requiring a boolean
/// result.
pub fn evaluate_boolean<Real: FloatExt>(formula: &str) -> Result<bool, EvalError> {
    Evaluator::default().evaluate_boolean::<Real>(formula)
}

/// Evaluate `formula`, logging a warning and returning `default` on failure.
///
/// This is the contract fixture loaders want: one malformed formula becomes a
/// warning and a safe value instead of aborting the whole document.
pub fn evaluate_numeric_or<Real: FloatExt>(formula: &str, default: Real) -> Real {
    match evaluate_numeric(formula) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("formula `{formula}` failed to evaluate: {err}; using {default}");
            default
        }
    }
}

/// Boolean counterpart of [`evaluate_numeric_or`].
pub fn evaluate_boolean_or(formula: &str, default: bool) -> bool {
    match evaluate_boolean::<f64>(formula) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("formula `{formula}` failed to evaluate: {err}; using {default}");
            default
        }
    }
}
