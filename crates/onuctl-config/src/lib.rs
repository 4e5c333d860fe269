//! Shared configuration for onuctl.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), session
//! persistence, and translation to `onuctl_core::OltConfig`. The CLI layers
//! its `GlobalOpts` overrides on top.

pub mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use onuctl_core::config::{DEFAULT_LOGIN_TIMEOUT, DEFAULT_SCAN_TIMEOUT, DEFAULT_TIMEOUT};
use onuctl_core::{OltConfig, TlsVerification};

pub use session::{SessionStore, StoredSession};

const KEYRING_SERVICE: &str = "onuctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("session file is corrupt: {0}")]
    Session(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Transport timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// A named device-control API profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://olt-api.example.net").
    pub api_url: String,

    /// Sign-in username.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override transport timeout (seconds).
    pub timeout: Option<u64>,

    /// Sign-in deadline (seconds).
    pub login_timeout: Option<u64>,

    /// Autofind scan deadline (seconds).
    pub scan_timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "onuctl", "onuctl")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "onuctl", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding persisted sessions.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "onuctl"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + `ONUCTL_` environment (`__` separates nesting, e.g.
/// `ONUCTL_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ONUCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the sign-in username: profile, then `ONUCTL_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("ONUCTL_USERNAME").ok())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password: profile's `password_env`, `ONUCTL_PASSWORD`,
/// system keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(pw) = std::env::var("ONUCTL_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Parse and normalize an API URL.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build an `OltConfig` from a profile and global defaults.
pub fn profile_to_olt_config(profile: &Profile, defaults: &Defaults) -> Result<OltConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = OltConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.login_timeout = profile
        .login_timeout
        .map_or(DEFAULT_LOGIN_TIMEOUT, Duration::from_secs);
    config.scan_timeout = profile
        .scan_timeout
        .map_or(DEFAULT_SCAN_TIMEOUT, Duration::from_secs);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                api_url: "https://olt-api.lab.example".into(),
                username: Some("noc".into()),
                scan_timeout: Some(45),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let lab = &loaded.profiles["lab"];
        assert_eq!(lab.api_url, "https://olt-api.lab.example");
        assert_eq!(lab.username.as_deref(), Some("noc"));
        assert_eq!(lab.scan_timeout, Some(45));
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn olt_config_applies_timeouts_and_tls() {
        let profile = Profile {
            api_url: "https://olt-api.example".into(),
            ca_cert: Some(PathBuf::from("/etc/ssl/olt-ca.pem")),
            login_timeout: Some(8),
            ..Profile::default()
        };
        let config = profile_to_olt_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.login_timeout, Duration::from_secs(8));
        assert_eq!(config.scan_timeout, DEFAULT_SCAN_TIMEOUT);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/olt-ca.pem"))
        );
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            api_url: "https://olt-api.example".into(),
            ca_cert: Some(PathBuf::from("ca.pem")),
            insecure: Some(true),
            ..Profile::default()
        };
        let config = profile_to_olt_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(matches!(
            parse_api_url("ftp://olt.example"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            api_url: "https://olt-api.example".into(),
            password: Some("fallback".into()),
            password_env: Some("ONUCTL_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        // Only meaningful when neither env var nor keyring entry exists.
        if std::env::var("ONUCTL_PASSWORD").is_err() {
            let pw = resolve_password(&profile, "onuctl-test-no-such-profile").unwrap();
            assert_eq!(pw.expose_secret(), "fallback");
        }
    }
}
