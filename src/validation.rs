use regex::Regex;
use serde::Serialize;
use std::{fmt, sync::LazyLock};

/// Email validation regex (RFC 5322 simplified).
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Invalid email regex")
});

/// Logo ids are derived from 16-bit values, so explicit ones must fit the same range.
pub const MAX_LOGO_ID: i32 = u16::MAX as i32;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// ValidationErrors
///
/// Accumulates every field failure of a request body so the client sees all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Builds an error with a single message not tied to a specific field (e.g. malformed JSON).
    pub fn body(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add("body", message);
        errors
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn require_non_empty(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{field} should not be empty"));
        }
    }

    pub fn require_email(&mut self, field: &'static str, value: &str) {
        if !is_valid_email(value) {
            self.add(field, format!("{field} must be an email"));
        }
    }

    pub fn require_logo_id(&mut self, field: &'static str, value: i32) {
        if !(0..=MAX_LOGO_ID).contains(&value) {
            self.add(field, format!("{field} must be between 0 and {MAX_LOGO_ID}"));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate
///
/// Schema checks a request DTO runs after deserialization and before reaching a service.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}
