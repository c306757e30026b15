use std::fmt;

use serde::{Deserialize, Serialize};

/// One field-level validation failure.
///
/// `path` uses dotted/indexed notation (`items[0].quantity`); failures that
/// concern the body as a whole use `"body"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Convert a serde decoding failure into a field error.
    ///
    /// serde_json reports missing and unknown fields as ``missing field `x` ``
    /// / ``unknown field `x` ``; the backticked name becomes the path.
    pub fn from_decode(err: &serde_json::Error) -> Self {
        let message = err.to_string();
        let path = if message.starts_with("missing field") || message.starts_with("unknown field")
        {
            backticked(&message).unwrap_or("body")
        } else {
            "body"
        };
        Self {
            path: path.to_string(),
            message,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn backticked(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message.get(start..)?.find('`')?;
    message.get(start..start + len)
}

/// Rule checks that run after a body has decoded into its typed shape.
pub trait Validate {
    /// Returns every violation found; an empty list means the value is valid.
    fn validate(&self) -> Vec<FieldError>;
}

/// Accumulates failures while walking a value.
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    /// Require a non-blank string.
    pub fn not_blank(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(path, "must not be empty");
        }
    }

    /// Require a non-blank string when the field was provided at all.
    pub fn not_blank_opt(&mut self, path: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.not_blank(path, v);
        }
    }

    /// Run a nested validator, prefixing its paths.
    pub fn nested(&mut self, prefix: &str, value: &impl Validate) {
        for err in value.validate() {
            self.errors
                .push(FieldError::new(format!("{prefix}.{}", err.path), err.message));
        }
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}
