// Session persistence
//
// One JSON file per profile under the data directory, holding the bearer
// token and its issue time. This is the only state onuctl keeps between
// invocations. Files are written owner-only on Unix.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use onuctl_core::Session;

use crate::ConfigError;

/// On-disk form of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub api_url: String,
    pub username: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(api_url: &str, username: &str, session: &Session) -> Self {
        Self {
            api_url: api_url.to_owned(),
            username: username.to_owned(),
            token: session.token().expose_secret().to_owned(),
            issued_at: session.issued_at(),
        }
    }

    pub fn to_session(&self) -> Session {
        Session::new(SecretString::from(self.token.clone()), self.issued_at)
    }
}

/// Reads and writes persisted sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(crate::data_dir().join("sessions"))
    }
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, profile: &str) -> PathBuf {
        self.dir.join(format!("{profile}.json"))
    }

    pub fn load(&self, profile: &str) -> Result<Option<StoredSession>, ConfigError> {
        let path = self.path_for(profile);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, profile: &str, stored: &StoredSession) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(profile);
        let body = serde_json::to_string_pretty(stored)?;
        write_private(&path, body.as_bytes())?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    /// Remove a persisted session. Missing files are not an error.
    pub fn clear(&self, profile: &str) -> Result<bool, ConfigError> {
        match std::fs::remove_file(self.path_for(profile)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(body)
}

#[cfg(not(unix))]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, body)
}
