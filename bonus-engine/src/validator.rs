//! Document validation
//!
//! [`validate`] only checks that the text parses. [`validate_document`] also
//! checks the keys the consuming engine cannot default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Location of a syntax error in the serialized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Byte offset of the failing token
    pub offset: usize,
}

/// A problem found in a serialized document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Where the problem is, when known
    pub position: Option<Position>,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    fn at(position: Position, message: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            message: message.into(),
        }
    }

    fn missing(path: &str) -> Self {
        Self {
            position: None,
            message: format!("missing required field `{}`", path),
        }
    }

    /// Line of the error, if positional
    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }

    /// Column of the error, if positional
    pub fn column(&self) -> Option<usize> {
        self.position.map(|p| p.column)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(f, "line {}, column {}: {}", p.line, p.column, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Syntax check. Returns at most one error, positioned at the failing token.
pub fn validate(serialized: &str) -> Vec<ValidationError> {
    match serde_json::from_str::<Value>(serialized) {
        Ok(_) => Vec::new(),
        Err(e) => vec![syntax_error(serialized, &e)],
    }
}

/// Syntax check plus presence of `id`, `type`, `trigger.type` and `trigger.duration`
pub fn validate_document(serialized: &str) -> Vec<ValidationError> {
    let value = match serde_json::from_str::<Value>(serialized) {
        Ok(value) => value,
        Err(e) => return vec![syntax_error(serialized, &e)],
    };

    let Some(root) = value.as_object() else {
        return vec![ValidationError {
            position: None,
            message: "document must be a JSON object".to_string(),
        }];
    };

    let mut errors = Vec::new();
    for key in ["id", "type"] {
        if !root.get(key).map_or(false, Value::is_string) {
            errors.push(ValidationError::missing(key));
        }
    }
    match root.get("trigger").and_then(Value::as_object) {
        Some(trigger) => {
            for key in ["type", "duration"] {
                if !trigger.contains_key(key) {
                    errors.push(ValidationError::missing(&format!("trigger.{}", key)));
                }
            }
        }
        None => errors.push(ValidationError::missing("trigger")),
    }
    errors
}

/// Whether the text may be handed to export or copy actions
pub fn is_exportable(serialized: &str) -> bool {
    validate(serialized).is_empty()
}

fn syntax_error(text: &str, error: &serde_json::Error) -> ValidationError {
    let offset = offset_of(text, error.line(), error.column());
    let position = position_at(text, offset);

    let message = error.to_string();
    let message = match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    };
    ValidationError::at(position, message)
}

/// Byte offset for a 1-based line and column, clamped to the text
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split('\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Line and column of a byte offset; the column counts characters
fn position_at(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |idx| idx + 1);

    Position {
        line,
        column: String::from_utf8_lossy(&before[line_start..]).chars().count() + 1,
        offset,
    }
}
