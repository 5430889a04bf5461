//! Error taxonomy shared by the client, the catalog and every adapter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification callers branch on (retry, surface to the LLM, abort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input did not match the tool's parameter schema.
    Validation,
    /// The requested tool is not in the catalog.
    UnknownTool,
    /// The Membrane API answered with a non-success status.
    RemoteApi,
    /// The round trip itself failed (network, deadline, cancellation, bad body).
    Transport,
    /// The catalog or client was built from an invalid configuration.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::UnknownTool => write!(f, "unknown_tool"),
            Self::RemoteApi => write!(f, "remote_api"),
            Self::Transport => write!(f, "transport"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// A single offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path to the field (`limit`, `input.channel`, `ids[2]`); empty for the root.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Every field-level failure of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Names of the offending fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl Deref for FieldErrors {
    type Target = [FieldError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Errors produced while resolving, validating or executing a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input for tool '{tool}': {errors}")]
    InvalidInput { tool: String, errors: FieldErrors },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("Membrane API error {status}: {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Membrane API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Membrane API request exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Membrane API request was cancelled")]
    Cancelled,

    #[error("failed to decode Membrane API response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("invalid Membrane API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("duplicate tool name in catalog: {0}")]
    DuplicateTool(String),
}

impl ToolError {
    /// Build a validation error for `tool` from collected field errors.
    pub fn invalid_input(tool: impl Into<String>, errors: impl Into<FieldErrors>) -> Self {
        Self::InvalidInput {
            tool: tool.into(),
            errors: errors.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::RemoteApi { .. } => ErrorKind::RemoteApi,
            Self::Transport(_)
            | Self::DeadlineExceeded(_)
            | Self::Cancelled
            | Self::InvalidResponse(_) => ErrorKind::Transport,
            Self::InvalidBaseUrl { .. } | Self::DuplicateTool(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field errors of a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::InvalidInput { errors, .. } => &errors.0,
            _ => &[],
        }
    }

    /// Whether repeating the same call may succeed. Never acted on internally.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteApi { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) | Self::DeadlineExceeded(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validation_message_lists_every_field() {
        let err = ToolError::invalid_input(
            "run-tool",
            vec![
                FieldError::new("actionId", "is required"),
                FieldError::new("connectionId", "is required"),
            ],
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "invalid input for tool 'run-tool': actionId: is required; connectionId: is required"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn remote_errors_carry_status_and_retryability() {
        let unauthorized = ToolError::RemoteApi {
            status: 401,
            body: "{\"error\":\"Unauthorized\"}".into(),
        };
        assert_eq!(unauthorized.kind(), ErrorKind::RemoteApi);
        assert_eq!(unauthorized.status(), Some(401));
        assert!(!unauthorized.is_retryable());

        let unavailable = ToolError::RemoteApi {
            status: 503,
            body: String::new(),
        };
        assert!(unavailable.is_retryable());
    }

    #[test]
    fn deadline_and_cancel_are_transport_failures() {
        assert_eq!(
            ToolError::DeadlineExceeded(Duration::from_secs(1)).kind(),
            ErrorKind::Transport
        );
        assert_eq!(ToolError::Cancelled.kind(), ErrorKind::Transport);
        assert!(!ToolError::Cancelled.is_retryable());
    }
}
