// Error handling utilities for consistent error messages and exit codes

use std::process;

use chrono::{DateTime, Utc};

use crate::models::{EntityKind, TraitType};

/// Invalid input from the command line or an import file (exit code 1).
/// Any other error reaching `main` is internal (exit code 2).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code >1)
/// Internal errors are for unexpected system failures, database corruption, etc.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Parse an entity kind argument (`test-case`, `test-case-run`, `issue`, `test-run`)
pub fn parse_kind(value: &str) -> Result<EntityKind, String> {
    EntityKind::from_str(&value.to_ascii_lowercase()).ok_or_else(|| {
        let names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("Invalid kind: '{}'. Expected one of: {}", value, names.join(", "))
    })
}

/// Parse a field trait argument, case-insensitively
pub fn parse_trait_type(value: &str) -> Result<TraitType, String> {
    TraitType::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = TraitType::ALL.iter().map(|t| t.as_str()).collect();
        format!("Invalid trait: '{}'. Expected one of: {}", value, names.join(", "))
    })
}

/// Parse an RFC 3339 instant used to pin the clock
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid time: '{}'. Expected RFC 3339, e.g. 2025-05-20T12:00:00Z", value))
}

/// Validate a field name: no whitespace and no colon, so it can appear as `name:value`
pub fn validate_field_name(name: &str) -> Result<String, String> {
    validate_non_empty(name, "Field name")?;
    if name.chars().any(|c| c.is_whitespace() || c == ':' || c == '"') {
        return Err(format!(
            "Invalid field name: '{}'. Field names cannot contain whitespace, colons or quotes.",
            name
        ));
    }
    Ok(name.to_string())
}
