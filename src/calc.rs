//! Sandboxed arithmetic evaluation
//!
//! Accepts only digits, `.`, `+ - * /`, parentheses and spaces. Anything
//! else is rejected before parsing. The grammar is:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```
//!
//! Integer subexpressions are evaluated exactly. A decimal literal or a
//! division with a remainder switches to floating point.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

const ALLOWED_CHARS: &str = "0123456789.+-*/() ";

/// Spoken when the expression contains characters outside the allow-list.
pub const UNSUPPORTED_MESSAGE: &str = "The calculation contains unsupported characters or symbols.";

/// Errors raised while evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("disallowed character '{0}'")]
    DisallowedCharacter(char),

    #[error("empty expression")]
    Empty,

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected '{0}'")]
    UnexpectedToken(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("number is too large")]
    Overflow,
}

/// Result of a calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(x) => x == 0.0,
        }
    }

    fn float(x: f64) -> Result<Self, CalcError> {
        if x.is_finite() {
            Ok(Number::Float(x))
        } else {
            Err(CalcError::Overflow)
        }
    }

    fn negate(self) -> Result<Self, CalcError> {
        match self {
            Number::Int(n) => n.checked_neg().map(Number::Int).ok_or(CalcError::Overflow),
            Number::Float(x) => Ok(Number::Float(-x)),
        }
    }

    fn apply(self, op: char, rhs: Number) -> Result<Self, CalcError> {
        if op == '/' && rhs.is_zero() {
            return Err(CalcError::DivisionByZero);
        }

        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) if op != '/' || a.checked_rem(b) == Some(0) => {
                let exact = match op {
                    '+' => a.checked_add(b),
                    '-' => a.checked_sub(b),
                    '*' => a.checked_mul(b),
                    _ => a.checked_div(b),
                };
                exact.map(Number::Int).ok_or(CalcError::Overflow)
            }
            (lhs, rhs) => {
                let (a, b) = (lhs.as_f64(), rhs.as_f64());
                Number::float(match op {
                    '+' => a + b,
                    '-' => a - b,
                    '*' => a * b,
                    _ => a / b,
                })
            }
        }
    }
}

/// Integral results drop the fractional part so "10 / 4 * 2" speaks as "5".
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{}", n),
            // -0.0 would otherwise render as "-0"
            Number::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{}", x as i64),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Evaluate `expr` and render the outcome as speakable text.
///
/// Returns the result (or a failure message) and whether evaluation
/// succeeded.
pub fn evaluate(expr: &str) -> (String, bool) {
    match compute(expr) {
        Ok(value) => (value.to_string(), true),
        Err(CalcError::DisallowedCharacter(_)) => (UNSUPPORTED_MESSAGE.to_string(), false),
        Err(e) => (
            format!(
                "I couldn't perform that calculation due to an error: {}. Please ensure it's a valid mathematical expression.",
                e
            ),
            false,
        ),
    }
}

/// Evaluate `expr` to a number.
pub fn compute(expr: &str) -> Result<Number, CalcError> {
    if let Some(c) = expr.chars().find(|c| !ALLOWED_CHARS.contains(*c)) {
        return Err(CalcError::DisallowedCharacter(c));
    }
    if expr.trim().is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        chars: expr.chars().peekable(),
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(CalcError::UnexpectedToken(c)),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    /// Next non-space character without consuming it
    fn peek(&mut self) -> Option<char> {
        while self.chars.next_if_eq(&' ').is_some() {}
        self.chars.peek().copied()
    }

    fn bump(&mut self) {
        self.chars.next();
    }

    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = value.apply(op, rhs)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Number, CalcError> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            value = value.apply(op, rhs)?;
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<Number, CalcError> {
        match self.peek() {
            Some('+') => {
                self.bump();
                self.factor()
            }
            Some('-') => {
                self.bump();
                self.factor()?.negate()
            }
            Some('(') => {
                self.bump();
                let value = self.expr()?;
                match self.peek() {
                    Some(')') => {
                        self.bump();
                        Ok(value)
                    }
                    Some(c) => Err(CalcError::UnexpectedToken(c)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::UnexpectedToken(c)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<Number, CalcError> {
        let mut literal = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            literal.push(c);
        }

        if literal.contains('.') {
            let value = literal
                .parse::<f64>()
                .map_err(|_| CalcError::InvalidNumber(literal))?;
            Number::float(value)
        } else {
            // Digits only, so the parse can only fail on overflow
            literal
                .parse::<i128>()
                .map(Number::Int)
                .map_err(|_| CalcError::Overflow)
        }
    }
}
