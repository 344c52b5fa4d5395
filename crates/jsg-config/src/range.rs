//! Range expressions of the form `start[:stop[:step]]`.

use std::fmt;

use jsg_core::{codes, ErrorInfo, JsgError};
use serde_json::Value;

/// Offset added to a lone float start so that the inclusive walk yields it once.
const FLOAT_SINGLETON_SPAN: f64 = 0.1;

/// Fallback rules applied while resolving a [`RangeExpression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeFallback {
    /// The expression was not numeric; the literal text is the only value.
    Literal {
        /// Why numeric interpretation was abandoned.
        reason: String,
    },
    /// A single float term was widened by an implicit stop of `start + 0.1`.
    FloatSingleton,
}

impl fmt::Display for RangeFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeFallback::Literal { reason } => write!(f, "literal ({reason})"),
            RangeFallback::FloatSingleton => write!(f, "float singleton"),
        }
    }
}

/// Values produced by a range expression plus the fallback rule, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    /// Rendered values in enumeration order.
    pub values: Vec<String>,
    /// Fallback rule that shaped `values`.
    pub fallback: Option<RangeFallback>,
}

impl ResolvedRange {
    fn literal(text: &str, reason: impl Into<String>) -> Self {
        Self {
            values: vec![text.to_string()],
            fallback: Some(RangeFallback::Literal {
                reason: reason.into(),
            }),
        }
    }
}

/// A `start[:stop[:step]]` expression.
///
/// A decimal point anywhere in the text selects floating point arithmetic,
/// otherwise terms are integers. Two terms imply a step of one, a single
/// term yields exactly one value. The walk is inclusive of `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpression(String);

impl RangeExpression {
    /// Wraps raw expression text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Builds an expression from a JSON scalar, stringifying numbers and booleans.
    pub fn from_value(value: &Value) -> Option<Self> {
        render_scalar(value).map(Self)
    }

    /// Raw expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves the expression into concrete values.
    ///
    /// Returns an error only for a zero or negative step; anything that
    /// cannot be read as numbers becomes a [`RangeFallback::Literal`].
    pub fn resolve(&self) -> Result<ResolvedRange, JsgError> {
        let text = self.0.as_str();
        let terms: Vec<&str> = text.split(':').map(str::trim).collect();
        if terms.len() > 3 {
            return Ok(ResolvedRange::literal(text, "more than three terms"));
        }
        if text.contains('.') {
            resolve_float(text, &terms)
        } else {
            resolve_int(text, &terms)
        }
    }
}

fn resolve_int(text: &str, terms: &[&str]) -> Result<ResolvedRange, JsgError> {
    let mut parsed = Vec::with_capacity(terms.len());
    for term in terms {
        match term.parse::<i64>() {
            Ok(value) => parsed.push(value),
            Err(_) => return Ok(ResolvedRange::literal(text, "non-integer term")),
        }
    }
    let (start, stop, step) = match parsed.as_slice() {
        [start] => (*start, *start, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Ok(ResolvedRange::literal(text, "empty expression")),
    };
    if step <= 0 {
        return Err(invalid_step(text));
    }
    let mut values = Vec::new();
    let mut current = start;
    while current <= stop {
        values.push(current.to_string());
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(ResolvedRange {
        values,
        fallback: None,
    })
}

fn resolve_float(text: &str, terms: &[&str]) -> Result<ResolvedRange, JsgError> {
    let mut parsed = Vec::with_capacity(terms.len());
    for term in terms {
        match term.parse::<f64>() {
            Ok(value) if value.is_finite() => parsed.push(value),
            _ => return Ok(ResolvedRange::literal(text, "non-numeric float term")),
        }
    }
    let (start, stop, step, fallback) = match parsed.as_slice() {
        [start] => (
            *start,
            *start + FLOAT_SINGLETON_SPAN,
            1.0,
            Some(RangeFallback::FloatSingleton),
        ),
        [start, stop] => (*start, *stop, 1.0, None),
        [start, stop, step] => (*start, *stop, *step, None),
        _ => return Ok(ResolvedRange::literal(text, "empty expression")),
    };
    if step <= 0.0 {
        return Err(invalid_step(text));
    }
    let mut values = Vec::new();
    let mut current = start;
    while current <= stop {
        values.push(format_float(current));
        let next = current + step;
        // Below the float spacing the walk stops advancing.
        if next == current {
            break;
        }
        current = next;
    }
    Ok(ResolvedRange { values, fallback })
}

fn invalid_step(text: &str) -> JsgError {
    JsgError::Config(
        ErrorInfo::new(codes::INVALID_RANGE_STEP, "range step must be positive")
            .with_context("expression", text),
    )
}

/// Renders a float so that integral values keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Stringifies a JSON scalar; arrays, objects and `null` yield `None`.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
