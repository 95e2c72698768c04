//! Diagnostics
//!
//! Turns an [`Error`] into either a structured JSON report or a
//! human-readable message with the offending source line underlined.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::utils::Error;

/// A structured error report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Diagnostic code (e.g., "P002")
    pub code: String,
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Source position, for lexer and parser errors
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_column: Option<usize>,
}

impl ErrorReport {
    /// Create an error report from an interpreter error
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let location = error.span().map(|s| Location {
            file: file_name.to_string(),
            line: s.line,
            column: s.column,
            end_column: (!s.is_empty()).then(|| s.column + s.len()),
        });

        Self {
            code: error.code().to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON, one report per line
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Render an error for a terminal.
///
/// Errors with a position quote the source line and put carets under the
/// offending text.
pub fn render_human(error: &Error, file_name: &str, source: &str) -> String {
    let mut out = format!("error[{}]: {}\n", error.code(), error);

    let Some(span) = error.span() else {
        return out;
    };
    let _ = writeln!(out, " --> {}:{}:{}", file_name, span.line, span.column);

    let Some(line) = source.lines().nth(span.line.saturating_sub(1)) else {
        return out;
    };
    let gutter = " ".repeat(span.line.to_string().len());
    let line_len = line.chars().count();
    let start = span.column.saturating_sub(1).min(line_len);
    let width = span.len().min(line_len.saturating_sub(start)).max(1);

    let _ = writeln!(out, "{} |", gutter);
    let _ = writeln!(out, "{} | {}", span.line, line);
    let _ = writeln!(out, "{} | {}{}", gutter, " ".repeat(start), "^".repeat(width));
    out
}
