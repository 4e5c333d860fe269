// ── Session management ──
//
// A `Session` is a bearer token plus the instant it was issued. Validity is
// a local TTL check; the server's 401 stays authoritative and is mapped to
// `CoreError::AuthExpired` by the error conversion. Only `SessionManager`
// creates or clears the held session; components receive `&Session`.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use onuctl_api::OltClient;

use crate::error::CoreError;

/// How long an issued token is trusted locally.
pub const TOKEN_TTL: Duration = Duration::from_secs(4 * 60 * 60);

// ── Session ──────────────────────────────────────────────────────

/// An issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: SecretString, issued_at: DateTime<Utc>) -> Self {
        Self { token, issued_at }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::TimeDelta::from_std(TOKEN_TTL)
            .ok()
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
            .unwrap_or(self.issued_at)
    }

    /// `now - issued_at < TOKEN_TTL`. A timestamp in the future (clock
    /// skew between hosts) counts as freshly issued.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.issued_at).to_std() {
            Ok(age) => age < TOKEN_TTL,
            Err(_) => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// The token to put on the wire, or `AuthExpired` without any I/O.
    pub fn bearer(&self) -> Result<&SecretString, CoreError> {
        if self.is_valid() {
            Ok(&self.token)
        } else {
            Err(CoreError::AuthExpired)
        }
    }

    /// Operator identity from the JWT `sub` claim, when the token is a JWT.
    pub fn subject(&self) -> Option<String> {
        let payload = self.token.expose_secret().split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        match claims.get("sub")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ── SessionManager ───────────────────────────────────────────────

/// Issues, holds, and expires the session for one API endpoint.
#[derive(Debug)]
pub struct SessionManager {
    client: OltClient,
    login_timeout: Duration,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(client: OltClient, login_timeout: Duration) -> Self {
        Self {
            client,
            login_timeout,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exchange credentials for a token. Exactly one request per call; any
    /// failure leaves no session held.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, CoreError> {
        self.sign_out();

        let issued = self
            .client
            .login(username, password, self.login_timeout)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::Remote { status, message } => CoreError::Network {
                    reason: format!("sign-in failed (HTTP {status}): {message}"),
                },
                other => other,
            })?;

        let session = Session::new(SecretString::from(issued.access_token), Utc::now());
        *self.slot() = Some(session.clone());
        info!(username, "signed in");
        Ok(session)
    }

    /// Drop the held session. Idempotent.
    pub fn sign_out(&self) {
        if self.slot().take().is_some() {
            debug!("session cleared");
        }
    }

    /// Pure TTL check.
    pub fn is_valid(session: &Session) -> bool {
        session.is_valid()
    }

    /// The held session, tearing it down if its TTL has lapsed.
    pub fn current(&self) -> Result<Session, CoreError> {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(session) if session.is_valid() => Ok(session.clone()),
            Some(_) => {
                *slot = None;
                debug!("session expired locally");
                Err(CoreError::AuthExpired)
            }
            None => Err(CoreError::AuthExpired),
        }
    }

    /// Adopt a previously issued session (e.g. one persisted by the CLI).
    pub fn restore(&self, session: Session) -> Result<Session, CoreError> {
        if !session.is_valid() {
            self.sign_out();
            return Err(CoreError::AuthExpired);
        }
        *self.slot() = Some(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn issued(ago: TimeDelta) -> Session {
        Session::new(SecretString::from("t".to_string()), Utc::now() - ago)
    }

    #[test]
    fn five_hours_old_is_invalid() {
        assert!(!issued(TimeDelta::hours(5)).is_valid());
    }

    #[test]
    fn one_hour_old_is_valid() {
        assert!(issued(TimeDelta::hours(1)).is_valid());
    }

    #[test]
    fn ttl_boundary_is_exclusive() {
        let now = Utc::now();
        let session = Session::new(SecretString::from("t".to_string()), now);
        let ttl = TimeDelta::from_std(TOKEN_TTL).unwrap();
        assert!(session.is_valid_at(now + ttl - TimeDelta::seconds(1)));
        assert!(!session.is_valid_at(now + ttl));
    }

    #[test]
    fn bearer_refuses_expired_session() {
        assert!(matches!(
            issued(TimeDelta::hours(6)).bearer(),
            Err(CoreError::AuthExpired)
        ));
    }

    #[test]
    fn subject_reads_jwt_sub_claim() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"noc-operator","exp":1}"#);
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig");
        let session = Session::new(SecretString::from(token), Utc::now());
        assert_eq!(session.subject().as_deref(), Some("noc-operator"));
    }

    #[test]
    fn subject_is_none_for_opaque_token() {
        let session = Session::new(SecretString::from("opaque".to_string()), Utc::now());
        assert_eq!(session.subject(), None);
    }

    #[test]
    fn restore_rejects_and_clears_expired_session() {
        let client =
            OltClient::new("http://127.0.0.1:9", &onuctl_api::TransportConfig::default()).unwrap();
        let manager = SessionManager::new(client, Duration::from_secs(5));

        manager.restore(issued(TimeDelta::minutes(10))).unwrap();
        assert!(manager.current().is_ok());

        assert!(manager.restore(issued(TimeDelta::hours(5))).is_err());
        assert!(matches!(manager.current(), Err(CoreError::AuthExpired)));
    }
}
