// ── Core error types ──
//
// Orchestrator-level errors. Front ends never see reqwest errors or raw
// JSON failures; the `From<onuctl_api::Error>` impl folds transport-layer
// failures into this taxonomy.

use thiserror::Error;

use crate::lifecycle::LifecycleOp;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local errors (no network call was made) ─────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("A {operation} is already in progress")]
    Busy { operation: LifecycleOp },

    // ── Session errors ──────────────────────────────────────────────
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session expired -- sign in again")]
    AuthExpired,

    // ── Transport errors ────────────────────────────────────────────
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request aborted")]
    Aborted,

    #[error("Network error: {reason}")]
    Network { reason: String },

    // ── Remote errors ───────────────────────────────────────────────
    #[error("Not found: {entity} {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Device-control API error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    // ── Configuration errors ────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ─────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` if the session must be torn down.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<onuctl_api::Error> for CoreError {
    fn from(err: onuctl_api::Error) -> Self {
        match err {
            onuctl_api::Error::InvalidCredentials { .. } => CoreError::InvalidCredentials,
            onuctl_api::Error::SessionExpired => CoreError::AuthExpired,
            onuctl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_ms: 0 }
                } else if let Some(status) = e.status() {
                    CoreError::Remote {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Network {
                        reason: e.to_string(),
                    }
                }
            }
            onuctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            onuctl_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            onuctl_api::Error::Aborted => CoreError::Aborted,
            onuctl_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
            },
            onuctl_api::Error::Api { status, message } => CoreError::Remote { status, message },
            onuctl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
