// Absolute date literal parsing

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::utils::duration::TimeLiteralError;

/// Parse a `yyyy-MM-dd` date into midnight UTC of that day
pub fn parse_absolute_date(expr: &str) -> Result<DateTime<Utc>, TimeLiteralError> {
    let date = NaiveDate::parse_from_str(expr, "%Y-%m-%d")
        .map_err(|_| TimeLiteralError::InvalidDate(expr.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TimeLiteralError::InvalidDate(expr.to_string()))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
