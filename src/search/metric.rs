//! Metric expression parser
//!
//! `metric:<name>` asks for any metric with that name; `metric:<name><op><number>`
//! additionally compares its value. Two-character operators are tried before
//! their one-character prefixes, so `duration>=5` is `>=` and never `>` `=5`.

use serde::Serialize;
use thiserror::Error;

use crate::models::Metric;

/// Comparison operators for metric expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

/// Longest operators first
const OPERATORS: [(&str, ComparisonOp); 6] = [
    (">=", ComparisonOp::Gte),
    ("<=", ComparisonOp::Lte),
    ("==", ComparisonOp::Eq),
    ("!=", ComparisonOp::Neq),
    (">", ComparisonOp::Gt),
    ("<", ComparisonOp::Lt),
];

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lte => "<=",
        }
    }

    pub fn sql_symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Neq => "<>",
            other => other.symbol(),
        }
    }

    /// `lhs <op> rhs`; NaN never compares, as with SQL NULL
    pub fn compare(&self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            ComparisonOp::Eq => lhs == rhs,
            ComparisonOp::Neq => lhs != rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Gte => lhs >= rhs,
            ComparisonOp::Lte => lhs <= rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub op: ComparisonOp,
    pub threshold: f64,
}

/// "Has a metric named `name` (whose value satisfies `comparison`)"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCondition {
    pub name: String,
    pub comparison: Option<MetricComparison>,
}

impl MetricCondition {
    pub fn exists(name: &str) -> Self {
        Self {
            name: name.to_string(),
            comparison: None,
        }
    }

    pub fn compare(name: &str, op: ComparisonOp, threshold: f64) -> Self {
        Self {
            name: name.to_string(),
            comparison: Some(MetricComparison { op, threshold }),
        }
    }

    pub fn matches(&self, metric: &Metric) -> bool {
        metric.name == self.name
            && self
                .comparison
                .as_ref()
                .map_or(true, |c| c.op.compare(metric.value, c.threshold))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricParseError {
    #[error("metric expression has no name")]
    MissingName,
    #[error("unknown operator in '{0}'")]
    UnknownOperator(String),
    #[error("'{0}' is not a finite number")]
    InvalidNumber(String),
}

/// Parse `<name>` or `<name><op><number>`
pub fn parse_metric_expression(expr: &str) -> Result<MetricCondition, MetricParseError> {
    let op_start = match expr.find(|c: char| matches!(c, '<' | '>' | '=' | '!')) {
        Some(idx) => idx,
        None if expr.is_empty() => return Err(MetricParseError::MissingName),
        None => return Ok(MetricCondition::exists(expr)),
    };

    let name = &expr[..op_start];
    if name.is_empty() {
        return Err(MetricParseError::MissingName);
    }

    let rest = &expr[op_start..];
    let (symbol, op) = OPERATORS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .ok_or_else(|| MetricParseError::UnknownOperator(expr.to_string()))?;

    let number = &rest[symbol.len()..];
    let threshold: f64 = number
        .parse()
        .map_err(|_| MetricParseError::InvalidNumber(number.to_string()))?;
    if !threshold.is_finite() {
        return Err(MetricParseError::InvalidNumber(number.to_string()));
    }

    Ok(MetricCondition::compare(name, *op, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only_is_existence() {
        assert_eq!(parse_metric_expression("duration").unwrap(), MetricCondition::exists("duration"));
    }

    #[test]
    fn test_longest_operator_wins() {
        let cases = [
            ("duration>=5", ComparisonOp::Gte),
            ("duration<=5", ComparisonOp::Lte),
            ("duration==5", ComparisonOp::Eq),
            ("duration!=5", ComparisonOp::Neq),
            ("duration>5", ComparisonOp::Gt),
            ("duration<5", ComparisonOp::Lt),
        ];
        for (expr, op) in cases {
            let condition = parse_metric_expression(expr).unwrap();
            assert_eq!(condition.name, "duration");
            assert_eq!(condition.comparison, Some(MetricComparison { op, threshold: 5.0 }), "{}", expr);
        }
    }

    #[test]
    fn test_threshold_is_float() {
        let condition = parse_metric_expression("memory<1.5e3").unwrap();
        assert_eq!(condition.comparison.unwrap().threshold, 1500.0);
        let condition = parse_metric_expression("delta>-0.25").unwrap();
        assert_eq!(condition.comparison.unwrap().threshold, -0.25);
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(parse_metric_expression(""), Err(MetricParseError::MissingName));
        assert_eq!(parse_metric_expression(">=5"), Err(MetricParseError::MissingName));
        assert!(matches!(parse_metric_expression("duration=5"), Err(MetricParseError::UnknownOperator(_))));
        assert!(matches!(parse_metric_expression("duration!5"), Err(MetricParseError::UnknownOperator(_))));
        assert!(matches!(parse_metric_expression("duration>"), Err(MetricParseError::InvalidNumber(_))));
        assert!(matches!(parse_metric_expression("duration>=fast"), Err(MetricParseError::InvalidNumber(_))));
        assert!(matches!(parse_metric_expression("duration>=5>3"), Err(MetricParseError::InvalidNumber(_))));
        assert!(matches!(parse_metric_expression("duration>inf"), Err(MetricParseError::InvalidNumber(_))));
        assert!(matches!(parse_metric_expression("duration>NaN"), Err(MetricParseError::InvalidNumber(_))));
    }

    #[test]
    fn test_condition_matches_metric() {
        let condition = parse_metric_expression("duration>=5").unwrap();
        assert!(condition.matches(&Metric::new("duration", 5.0)));
        assert!(!condition.matches(&Metric::new("duration", 4.9)));
        assert!(!condition.matches(&Metric::new("Duration", 6.0)));
        assert!(!condition.matches(&Metric::new("duration", f64::NAN)));
    }
}
