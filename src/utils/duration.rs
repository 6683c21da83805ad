// Relative time literal parsing
//
// Grammar: <non-negative integer><unit>, unit one of s, m, h, d, w.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::utils::clock::TimeSource;

/// Malformed relative or absolute time literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeLiteralError {
    #[error("empty time literal")]
    Empty,
    #[error("'{0}' has no numeric amount")]
    MissingAmount(String),
    #[error("'{0}' has no unit (expected s, m, h, d or w)")]
    MissingUnit(String),
    #[error("unknown unit '{unit}' in '{literal}'")]
    UnknownUnit { literal: String, unit: String },
    #[error("'{0}' is out of range")]
    OutOfRange(String),
    #[error("'{0}' is not a yyyy-MM-dd date")]
    InvalidDate(String),
}

fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(3_600),
        "d" => Some(86_400),
        "w" => Some(7 * 86_400),
        _ => None,
    }
}

/// Parse a duration literal such as `120s`, `5h`, `4d` or `2w`
pub fn parse_relative_duration(expr: &str) -> Result<Duration, TimeLiteralError> {
    if expr.is_empty() {
        return Err(TimeLiteralError::Empty);
    }

    let digits_end = expr
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expr.len());
    let (amount, unit) = expr.split_at(digits_end);

    if amount.is_empty() {
        return Err(TimeLiteralError::MissingAmount(expr.to_string()));
    }
    if unit.is_empty() {
        return Err(TimeLiteralError::MissingUnit(expr.to_string()));
    }
    let seconds_per_unit = unit_seconds(unit).ok_or_else(|| TimeLiteralError::UnknownUnit {
        literal: expr.to_string(),
        unit: unit.to_string(),
    })?;

    let amount: i64 = amount
        .parse()
        .map_err(|_| TimeLiteralError::OutOfRange(expr.to_string()))?;
    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(|| TimeLiteralError::OutOfRange(expr.to_string()))
}

/// Resolve a duration literal into `now - duration`
pub fn resolve_since(expr: &str, clock: &dyn TimeSource) -> Result<DateTime<Utc>, TimeLiteralError> {
    let duration = parse_relative_duration(expr)?;
    clock
        .now()
        .checked_sub_signed(duration)
        .ok_or_else(|| TimeLiteralError::OutOfRange(expr.to_string()))
}
