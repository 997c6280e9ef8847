//! Error types and error-message normalization for the HRMS API client.
//!
//! # Design
//! Every failure ends up in front of a user as one short sentence. The
//! backend serializes errors the way Django REST Framework does by default:
//! either `{"detail": "..."}` or a map of field names to message lists.
//! `extract_message` turns such a body into that sentence. The shape it
//! sniffs is a wire contract pinned by `test-vectors/error_messages.json`;
//! changing the precedence below is a breaking change for views.

use serde_json::Value;
use thiserror::Error;

/// Shown when an error body carries nothing usable.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Errors produced while building requests, talking to the server, or
/// parsing what it returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `message` is already
    /// normalized by [`extract_message`].
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never completed (connection refused, DNS, reset, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A successful response body did not match the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Rejected on the client before any request was sent.
    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    /// The message a view should show for this error.
    ///
    /// Server and validation errors speak for themselves; transport and
    /// codec failures carry nothing a user can act on, so the caller's
    /// per-operation `fallback` is used instead.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Http { message, .. } | ApiError::Invalid(message) => message.clone(),
            ApiError::Transport(_) | ApiError::Serialization(_) | ApiError::Deserialization(_) => {
                fallback.to_string()
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Extract a human-readable message from a non-success response body.
///
/// Precedence:
/// 1. a top-level `detail` field, verbatim, unless it is empty, `null`,
///    `false` or `0`;
/// 2. the first key in document order: `"<key>: <first element>"` for a
///    list, `"<key>: <value>"` for a string;
/// 3. [`GENERIC_ERROR_MESSAGE`] for anything else, including bodies that
///    are not JSON at all.
pub fn extract_message(body: &str) -> String {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    match fields.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        Some(Value::Null | Value::Bool(false) | Value::String(_)) | None => {}
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {}
        Some(other) => return other.to_string(),
    }

    let Some((key, value)) = fields.iter().next() else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::String(first)) => format!("{key}: {first}"),
            Some(first) => format!("{key}: {first}"),
            None => GENERIC_ERROR_MESSAGE.to_string(),
        },
        Value::String(text) => format!("{key}: {text}"),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}
