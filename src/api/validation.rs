//! Request Validation Module
//!
//! Rejects malformed payloads before they reach the extractor.

use serde::Serialize;
use thiserror::Error;

use crate::error::AppError;

/// Maximum characters accepted in one chat message
pub const MAX_TEXT_LENGTH: usize = 2_000;
/// Maximum characters in a symptom or medication name
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum characters in a search query
pub const MAX_QUERY_LENGTH: usize = 500;
/// Upper bound for `k` in semantic search
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Validation error types
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    #[error("Field '{field}' is too long (max: {max}, got: {got})")]
    TooLong {
        field: String,
        max: usize,
        got: usize,
    },

    #[error("Field '{field}' must be between {min} and {max}, got {got}")]
    OutOfRange {
        field: String,
        min: usize,
        max: usize,
        got: usize,
    },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } => field.as_str(),
            Self::TooLong { field, .. } => field.as_str(),
            Self::OutOfRange { field, .. } => field.as_str(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Validation result type
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Non-blank value no longer than `max` characters, returned trimmed.
pub fn require_text<'a>(
    field: &str,
    value: Option<&'a str>,
    max: usize,
) -> ValidationResult<&'a str> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::MissingField {
            field: field.to_string(),
        })?;

    let length = value.chars().count();
    if length > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            got: length,
        });
    }

    Ok(value)
}

/// Common validation helpers
pub mod validators {
    use super::*;

    /// Validate chat text
    pub fn validate_chat_text(text: Option<&str>) -> ValidationResult<&str> {
        require_text("text", text, MAX_TEXT_LENGTH)
    }

    /// Validate a symptom or medication name from the path
    pub fn validate_name(name: &str) -> ValidationResult<&str> {
        require_text("name", Some(name), MAX_NAME_LENGTH)
    }

    /// Validate search query
    pub fn validate_search_query(query: Option<&str>) -> ValidationResult<&str> {
        require_text("q", query, MAX_QUERY_LENGTH)
    }

    /// Validate result count, defaulting to 5
    pub fn validate_k(k: Option<usize>) -> ValidationResult<usize> {
        let k = k.unwrap_or(5);
        if k == 0 || k > MAX_SEARCH_RESULTS {
            return Err(ValidationError::OutOfRange {
                field: "k".to_string(),
                min: 1,
                max: MAX_SEARCH_RESULTS,
                got: k,
            });
        }
        Ok(k)
    }
}
