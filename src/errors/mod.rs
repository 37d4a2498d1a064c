//! Error handling module for the ERP forms client.
//!
//! Provides one client error type with stable error codes, HTTP status passthrough and a
//! decoder for the backend's error envelope.

use serde::{Deserialize, Serialize};

use crate::forms::FieldError;
use crate::models::RecordId;

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const MISSING_AUTH: &str = "MISSING_AUTH";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_SELECTION: &str = "INVALID_SELECTION";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const PARTIAL_DELETE: &str = "PARTIAL_DELETE";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Client error type.
#[derive(Debug)]
pub enum ClientError {
    /// No session token available
    MissingAuth,
    /// Backend rejected the session (401)
    Unauthorized(String),
    /// Login endpoint rejected the password or OTP (401 without a session)
    InvalidCredentials(String),
    /// Client-side field validation failed
    Validation(Vec<FieldError>),
    /// Cascading selector used out of order
    InvalidSelection(String),
    /// Record not found, remotely (404) or in the local list
    NotFound(String),
    /// Any other non-success HTTP status
    Http { status: u16, message: String },
    /// Connection or timeout failure
    Transport(String),
    /// Unexpected response body
    Decode(String),
    /// Session store failure
    Storage(String),
    /// Bulk delete where some of the calls failed
    PartialDelete {
        deleted: Vec<RecordId>,
        failed: Vec<(RecordId, String)>,
        /// Set when one of the failures was a rejected session
        login_required: bool,
    },
    /// Invalid configuration
    Config(String),
}

impl ClientError {
    /// Get the HTTP status this error carries, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) | ClientError::InvalidCredentials(_) => Some(401),
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::MissingAuth => codes::MISSING_AUTH,
            ClientError::Unauthorized(_) => codes::UNAUTHORIZED,
            ClientError::InvalidCredentials(_) => codes::INVALID_CREDENTIALS,
            ClientError::Validation(_) => codes::VALIDATION_ERROR,
            ClientError::InvalidSelection(_) => codes::INVALID_SELECTION,
            ClientError::NotFound(_) => codes::NOT_FOUND,
            ClientError::Http { .. } => codes::HTTP_ERROR,
            ClientError::Transport(_) => codes::TRANSPORT_ERROR,
            ClientError::Decode(_) => codes::DECODE_ERROR,
            ClientError::Storage(_) => codes::STORAGE_ERROR,
            ClientError::PartialDelete { .. } => codes::PARTIAL_DELETE,
            ClientError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::MissingAuth => "No active session, please log in".to_string(),
            ClientError::Unauthorized(msg) => msg.clone(),
            ClientError::InvalidCredentials(msg) => msg.clone(),
            ClientError::Validation(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            ClientError::InvalidSelection(msg) => msg.clone(),
            ClientError::NotFound(msg) => msg.clone(),
            ClientError::Http { status, message } => format!("HTTP {}: {}", status, message),
            ClientError::Transport(msg) => msg.clone(),
            ClientError::Decode(msg) => msg.clone(),
            ClientError::Storage(msg) => msg.clone(),
            ClientError::PartialDelete { deleted, failed, .. } => format!(
                "deleted {} record(s), {} failed: {}",
                deleted.len(),
                failed.len(),
                failed
                    .iter()
                    .map(|(id, reason)| format!("{} ({})", id, reason))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    /// Whether the caller should be sent back to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::MissingAuth
                | ClientError::Unauthorized(_)
                | ClientError::PartialDelete {
                    login_required: true,
                    ..
                }
        )
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            tracing::error!("Response decode error: {:?}", err);
            return ClientError::Decode(format!("Invalid response body: {}", err));
        }
        tracing::error!("Transport error: {:?}", err);
        ClientError::Transport(format!("Request failed: {}", err))
    }
}

impl From<sqlx::Error> for ClientError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Session store error: {:?}", err);
        ClientError::Storage(format!("Session store error: {}", err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ClientError::Decode(format!("JSON error: {}", err))
    }
}

/// Error envelope returned by the backend.
///
/// Account endpoints answer `{"status": "error", "message": ...}`, the resource viewsets
/// answer `{"detail": ...}` for auth and lookup failures.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Extract a human readable message from a raw response body.
    pub fn message_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed.message.or(parsed.detail)
    }
}

/// Build the error for a non-success status and its raw body.
pub fn from_status(status: u16, body: &str) -> ClientError {
    let message = ErrorBody::message_from(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("request failed with status {}", status)
        } else {
            body.trim().to_string()
        }
    });

    match status {
        401 => ClientError::Unauthorized(message),
        404 => ClientError::NotFound(message),
        _ => ClientError::Http { status, message },
    }
}
