//! Typed error hierarchy for The Written Hug.
//!
//! `HugError` is what every order, reply and session operation returns.
//! Each variant maps onto one of four stable kinds (`ErrorKind`) that the
//! HTTP layer and the CLI surface to callers unchanged.

use serde::Serialize;
use thiserror::Error;

/// Stable, caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    DependencyFailure,
    Unauthorized,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DependencyFailure => "dependency_failure",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// One offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum HugError {
    #[error("Invalid input: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Order {id} not found")]
    OrderNotFound { id: String },

    #[error("Reply {id} not found")]
    ReplyNotFound { id: String },

    #[error("Record store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Session expired, please log in again")]
    SessionExpired,
}

impl HugError {
    /// Validation failure for a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::OrderNotFound { .. } | Self::ReplyNotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) | Self::Mail(_) => ErrorKind::DependencyFailure,
            Self::Unauthorized(_) | Self::SessionExpired => ErrorKind::Unauthorized,
        }
    }

    /// Offending fields for validation errors, empty otherwise.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            Self::Validation(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = HugError::Validation(vec![
            FieldError::new("name", "is required"),
            FieldError::new("email", "is not a valid address"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("name is required"));
        assert!(msg.contains("email is not a valid address"));
        assert_eq!(err.fields().len(), 2);
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(HugError::invalid("x", "bad").kind(), ErrorKind::Validation);
        assert_eq!(
            HugError::OrderNotFound { id: "a".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            HugError::ReplyNotFound { id: "a".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            HugError::Store(anyhow::anyhow!("disk full")).kind(),
            ErrorKind::DependencyFailure
        );
        assert_eq!(
            HugError::Mail("timeout".into()).kind(),
            ErrorKind::DependencyFailure
        );
        assert_eq!(HugError::SessionExpired.kind(), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::DependencyFailure.as_str(), "dependency_failure");
    }

    #[test]
    fn order_not_found_carries_id() {
        let err = HugError::OrderNotFound { id: "abc-123".into() };
        match &err {
            HugError::OrderNotFound { id } => assert_eq!(id, "abc-123"),
            _ => panic!("Expected OrderNotFound"),
        }
        assert!(err.to_string().contains("abc-123"));
        assert!(err.fields().is_empty());
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }

    #[test]
    fn implements_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&HugError::SessionExpired);
    }
}
