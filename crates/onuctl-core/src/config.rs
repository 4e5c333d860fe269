// ── Runtime connection configuration ──
//
// Describes how to reach the device-control API and how long each class of
// call may take. The CLI builds an `OltConfig` from its profile and hands it
// in; core never reads config files.

use std::time::Duration;

use url::Url;

/// Hard ceiling for the token exchange.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(5);
/// Hard ceiling for an autofind scan.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);
/// Transport-level default for every other call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed management hosts).
    DangerAcceptInvalid,
}

/// Configuration for one device-control API endpoint.
#[derive(Debug, Clone)]
pub struct OltConfig {
    /// API base URL (e.g., `https://olt-api.example.net/api`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Transport-level request timeout.
    pub timeout: Duration,
    /// Sign-in deadline.
    pub login_timeout: Duration,
    /// Autofind scan deadline.
    pub scan_timeout: Duration,
}

impl OltConfig {
    /// Config for `url` with default TLS and timeouts.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}
