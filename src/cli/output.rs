use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;

use crate::filter::SqlClause;
use crate::models::{FieldDefinition, Issue, TestCase, TestCaseRun, TestRun};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Narrowest the flexible column is squeezed to
const MIN_FLEX_WIDTH: usize = 12;

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format date for display (UTC, date only)
pub fn format_date(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(2)).collect();
    format!("{}..", kept)
}

fn opt_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn opt_text(text: &Option<String>) -> String {
    text.clone().unwrap_or_default()
}

/// One line of a result table
pub trait TableRow {
    const HEADERS: &'static [&'static str];
    /// Column that absorbs the remaining width (and is truncated first)
    const FLEX_COLUMN: usize;

    fn cells(&self) -> Vec<String>;
}

impl TableRow for TestCase {
    const HEADERS: &'static [&'static str] = &["ID", "Key", "Name", "State", "Type", "Project", "Created"];
    const FLEX_COLUMN: usize = 2;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_text(&self.external_display_id),
            self.name.clone(),
            opt_text(&self.state),
            self.execution_type.as_str().to_string(),
            opt_id(self.project_id),
            format_date(self.created_ts),
        ]
    }
}

impl TableRow for TestCaseRun {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Result", "State", "Assignee", "Run", "Created"];
    const FLEX_COLUMN: usize = 1;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.result.as_str().to_string(),
            opt_text(&self.state),
            opt_text(&self.assigned_to_user_name),
            opt_id(self.test_run_id),
            format_date(self.created_ts),
        ]
    }
}

impl TableRow for Issue {
    const HEADERS: &'static [&'static str] = &["ID", "Key", "Title", "Type", "State", "Assignee", "Created"];
    const FLEX_COLUMN: usize = 2;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            opt_text(&self.external_display_id),
            self.title.clone(),
            self.issue_type.as_str().to_string(),
            opt_text(&self.state),
            opt_text(&self.assigned_to),
            format_date(self.created_ts),
        ]
    }
}

impl TableRow for TestRun {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "State", "Completed", "Project", "Created"];
    const FLEX_COLUMN: usize = 1;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt_text(&self.state),
            if self.completed { "yes" } else { "no" }.to_string(),
            opt_id(self.project_id),
            format_date(self.created_ts),
        ]
    }
}

impl TableRow for FieldDefinition {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Trait", "Kind", "Project"];
    const FLEX_COLUMN: usize = 1;

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.trait_type.as_str().to_string(),
            self.target.as_str().to_string(),
            self.project_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "*".to_string()),
        ]
    }
}

/// Format rows as an aligned table no wider than `max_width`
pub fn format_table<R: TableRow>(rows: &[R], max_width: usize, is_tty: bool) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let mut widths: Vec<usize> = R::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // Shrink the flexible column until the table fits
    let separators = widths.len().saturating_sub(1);
    let fixed: usize = widths
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != R::FLEX_COLUMN)
        .map(|(_, w)| *w)
        .sum();
    if let Some(flex) = widths.get_mut(R::FLEX_COLUMN) {
        let available = max_width.saturating_sub(fixed + separators);
        *flex = (*flex).min(available.max(MIN_FLEX_WIDTH));
    }

    let mut output = String::new();
    let header: Vec<String> = R::HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    output.push_str(bold_if_tty(header.join(" ").trim_end(), is_tty).as_str());
    output.push('\n');

    let total_width: usize = widths.iter().sum::<usize>() + separators;
    output.push_str(&"-".repeat(total_width));
    output.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", truncate(cell, *w), w = *w))
            .collect();
        output.push_str(line.join(" ").trim_end());
        output.push('\n');
    }

    output
}

/// JSON form of a bound SQL parameter
pub fn sql_param_to_json(value: &SqlValue) -> serde_json::Value {
    match value {
        SqlValue::Null => serde_json::Value::Null,
        SqlValue::Integer(v) => serde_json::json!(v),
        SqlValue::Real(v) => serde_json::json!(v),
        SqlValue::Text(v) => serde_json::json!(v),
        SqlValue::Blob(v) => serde_json::json!(v),
    }
}

/// JSON form of a rendered WHERE clause
pub fn sql_clause_to_json(clause: &SqlClause) -> serde_json::Value {
    serde_json::json!({
        "sql": clause.sql,
        "params": clause.params.iter().map(sql_param_to_json).collect::<Vec<_>>(),
    })
}
