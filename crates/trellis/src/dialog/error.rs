//! Error types for the dialog engine.

use serde::{Deserialize, Serialize};

use super::operation::OperationKind;
use super::record::FieldErrors;
use crate::config::ErrorMessages;

/// A failure that ends one submission attempt.
///
/// None of these escape the controller: each is converted into the session's
/// [`SessionError`] and the dialog stays open and interactive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    /// The form's input did not validate.
    #[error("validation failed")]
    Validation {
        /// Per-field messages, possibly empty.
        errors: FieldErrors,
    },

    /// No form adapter was registered for the active kind, even after the
    /// bounded retry.
    #[error("no form registered for {kind} operation")]
    Registration {
        /// The kind that had no adapter.
        kind: OperationKind,
    },

    /// The submit handler raised or declined.
    #[error("submission failed{}", message_suffix(.message))]
    Submission {
        /// Message supplied by the handler, if any.
        message: Option<String>,
    },

    /// No submission result arrived within the emergency timeout.
    #[error("submission timed out")]
    Timeout,

    /// An error injected from outside the submission pathway, for example
    /// server-side field errors reported after the fact.
    #[error("{message}")]
    External {
        /// User-facing message.
        message: String,
        /// Per-field messages.
        errors: FieldErrors,
    },
}

impl DialogError {
    /// The error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DialogError::Validation { .. } => ErrorKind::Validation,
            DialogError::Registration { .. } => ErrorKind::Registration,
            DialogError::Submission { .. } => ErrorKind::Submission,
            DialogError::Timeout => ErrorKind::Timeout,
            DialogError::External { .. } => ErrorKind::External,
        }
    }

    /// Convert into the user-facing session error.
    pub fn to_session_error(&self, messages: &ErrorMessages) -> SessionError {
        let (message, field_errors) = match self {
            DialogError::Validation { errors } => {
                (messages.validation_failed.clone(), errors.clone())
            }
            DialogError::Registration { .. } => (messages.form_not_ready.clone(), FieldErrors::new()),
            DialogError::Submission { message } => (
                message
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| messages.submission_failed.clone()),
                FieldErrors::new(),
            ),
            DialogError::Timeout => (messages.interrupted.clone(), FieldErrors::new()),
            DialogError::External { message, errors } => (message.clone(), errors.clone()),
        };
        SessionError {
            kind: self.kind(),
            message,
            field_errors,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Class of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Field validation failed.
    Validation,
    /// The form was not ready.
    Registration,
    /// The submit handler failed.
    Submission,
    /// The emergency timeout fired.
    Timeout,
    /// Injected from outside.
    External,
}

/// The error shown in an open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    /// Error class.
    pub kind: ErrorKind,
    /// User-facing message.
    pub message: String,
    /// Per-field messages, empty for non-field errors.
    pub field_errors: FieldErrors,
}

impl SessionError {
    /// Returns `true` if this error carries field-level messages.
    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Error returned by a [`SubmitHandler`](super::controller::SubmitHandler).
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", .message.as_deref().unwrap_or("submit handler failed"))]
pub struct SubmitError {
    /// Message to show verbatim, if any.
    pub message: Option<String>,
}

impl SubmitError {
    /// A failure with a user-facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A failure without a message; the generic fallback is shown.
    pub fn unspecified() -> Self {
        Self::default()
    }
}

impl From<String> for SubmitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for SubmitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error raised by a raw form implementation.
///
/// Adapters catch these and translate them into their own result shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The form rejected its input with field errors.
    #[error("form validation failed")]
    Validation(FieldErrors),

    /// The form library itself failed.
    #[error("form backend error: {0}")]
    Backend(String),
}

/// Error constructing a [`DialogHost`](super::DialogHost).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A core primitive could not be created.
    #[error(transparent)]
    Core(#[from] trellis_core::CoreError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
