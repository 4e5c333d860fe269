//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use onuctl_config::ConfigError;
use onuctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const BUSY: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device-control API")]
    #[diagnostic(
        code(onuctl::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Invalid username or password")]
    #[diagnostic(
        code(onuctl::auth_failed),
        help("Verify your credentials, then run: onuctl config set-password")
    )]
    AuthFailed,

    #[error("Not signed in for profile '{profile}'")]
    #[diagnostic(code(onuctl::not_signed_in), help("Run: onuctl login"))]
    NotSignedIn { profile: String },

    #[error("Session expired")]
    #[diagnostic(
        code(onuctl::session_expired),
        help("Sessions last 4 hours or until the API rejects them. Run: onuctl login")
    )]
    SessionExpired,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(onuctl::no_credentials),
        help(
            "Configure credentials with: onuctl config init\n\
             Or set ONUCTL_USERNAME and ONUCTL_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(onuctl::not_found),
        help("Run: onuctl {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("A {operation} is already in progress")]
    #[diagnostic(
        code(onuctl::busy),
        help("Wait for the running {operation} to finish, then retry.")
    )]
    Busy { operation: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(onuctl::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(onuctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(onuctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: onuctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API configured")]
    #[diagnostic(
        code(onuctl::no_config),
        help(
            "Create a profile with: onuctl config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(onuctl::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(onuctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Interrupted")]
    #[diagnostic(code(onuctl::interrupted))]
    Interrupted,

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(onuctl::timeout),
        help("The OLT did not answer in time. Raise the profile's timeout or retry.")
    )]
    Timeout { timeout_ms: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    #[diagnostic(code(onuctl::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    #[diagnostic(code(onuctl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed
            | Self::NotSignedIn { .. }
            | Self::SessionExpired
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy { .. } => exit_code::BUSY,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Busy { operation } => CliError::Busy {
                operation: operation.to_string(),
            },
            CoreError::InvalidCredentials => CliError::AuthFailed,
            CoreError::AuthExpired => CliError::SessionExpired,
            CoreError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },
            CoreError::Aborted => CliError::Interrupted,
            CoreError::Network { reason } => CliError::ConnectionFailed {
                source: reason.into(),
            },
            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command_for(&entity),
                resource_type: entity,
                identifier,
            },
            CoreError::Remote { status, message } => CliError::ApiError { status, message },
            CoreError::Config { message } | CoreError::Internal(message) => {
                CliError::Config { message }
            }
        }
    }
}

fn list_command_for(entity: &str) -> String {
    match entity {
        "device" | "olt" => "olt list".into(),
        "service" => "olt services <olt>".into(),
        _ => "onu autofind <olt>".into(),
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use onuctl_core::LifecycleOp;

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::InvalidCredentials, exit_code::AUTH),
            (CoreError::AuthExpired, exit_code::AUTH),
            (CoreError::Timeout { timeout_ms: 5000 }, exit_code::TIMEOUT),
            (
                CoreError::Busy {
                    operation: LifecycleOp::Delete,
                },
                exit_code::BUSY,
            ),
            (
                CoreError::Network {
                    reason: "connection refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Validation {
                    message: "description is required".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Remote {
                    status: 500,
                    message: "telnet down".into(),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn busy_names_the_operation() {
        let err = CliError::from(CoreError::Busy {
            operation: LifecycleOp::Reboot,
        });
        assert_eq!(err.to_string(), "A reboot is already in progress");
    }

    #[test]
    fn missing_credentials_are_an_auth_failure() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
