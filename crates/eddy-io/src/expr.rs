use serde::Deserialize;
use thiserror::Error;

/// Integer-valued configuration field: either a plain number or a string
/// expression over named variables, e.g. `"nx/2"` or `"ny - 10"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntExpr {
    Literal(i64),
    Expr(String),
}

impl Default for IntExpr {
    fn default() -> Self {
        IntExpr::Literal(0)
    }
}

#[derive(Debug, Error)]
pub enum ExprError {
    #[error("empty expression after substitution")]
    Empty,
    #[error("expected a number in expression `{0}`")]
    ExpectedNumber(String),
    #[error("unknown operator `{0}` in expression")]
    UnknownOperator(char),
    #[error("division by zero in expression `{0}`")]
    DivisionByZero(String),
}

impl IntExpr {
    /// Evaluates the expression against a variable table.
    ///
    /// Variable names are substituted longest-first so a name never clobbers
    /// a longer name it is a prefix of. The remaining text follows the
    /// grammar `signed_int (op signed_int)*` with `+ - * /`, folded left to
    /// right with no precedence.
    pub fn resolve(&self, vars: &[(&str, i64)]) -> Result<i64, ExprError> {
        let text = match self {
            IntExpr::Literal(n) => return Ok(*n),
            IntExpr::Expr(s) => s,
        };

        let mut sorted: Vec<_> = vars.to_vec();
        sorted.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));

        let mut expr = text.clone();
        for (name, value) in sorted {
            expr = expr.replace(name, &value.to_string());
        }

        eval(&expr)
    }
}

fn eval(expr: &str) -> Result<i64, ExprError> {
    let mut rest = expr.trim_start();
    if rest.is_empty() {
        return Err(ExprError::Empty);
    }

    let (mut result, tail) = take_number(rest, expr)?;
    rest = tail.trim_start();

    while !rest.is_empty() {
        let op = rest.chars().next().ok_or(ExprError::Empty)?;
        rest = rest[op.len_utf8()..].trim_start();

        let (operand, tail) = take_number(rest, expr)?;
        rest = tail.trim_start();

        result = match op {
            '+' => result + operand,
            '-' => result - operand,
            '*' => result * operand,
            '/' => {
                if operand == 0 {
                    return Err(ExprError::DivisionByZero(expr.to_string()));
                }
                result / operand
            }
            other => return Err(ExprError::UnknownOperator(other)),
        };
    }

    Ok(result)
}

/// Parses one optionally-signed integer from the front of `rest`, returning
/// it and the remaining text.
fn take_number<'a>(rest: &'a str, full: &str) -> Result<(i64, &'a str), ExprError> {
    let bytes = rest.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if end == digits_start {
        return Err(ExprError::ExpectedNumber(full.to_string()));
    }

    let value = rest[..end]
        .parse::<i64>()
        .map_err(|_| ExprError::ExpectedNumber(full.to_string()))?;

    Ok((value, &rest[end..]))
}
