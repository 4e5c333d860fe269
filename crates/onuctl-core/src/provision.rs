// ── Conflict resolution and registration ──
//
// A provisioning attempt runs strictly in sequence:
//
//   validate (local) -> lookup SN -> delete stale record (if any) -> add
//
// Only validation, an expired session, and the final add can fail the
// attempt. Lookup and delete problems are recorded in the report and the
// flow continues; the add call is what the operator ultimately cares about.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use onuctl_api::OltClient;
use onuctl_api::types::AddOnuRequest;

use crate::convert::stale_delete_request;
use crate::error::CoreError;
use crate::model::{Fsp, OnuCandidate, RegistrationRequest, SearchResult, ServiceProfile};
use crate::search::SearchEngine;
use crate::session::Session;

// ── Input and report types ───────────────────────────────────────

/// What the operator selected for registration.
#[derive(Debug, Clone)]
pub struct ProvisionInput {
    pub candidate: OnuCandidate,
    pub description: String,
    pub service: Option<ServiceProfile>,
    pub native_vlan: bool,
}

/// Outcome of removing a stale registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeleteAttempt {
    Ok,
    Failed { reason: String },
}

impl fmt::Display for DeleteAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("deleted"),
            Self::Failed { reason } => write!(f, "delete failed: {reason}"),
        }
    }
}

/// What the pre-registration lookup found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConflictCheck {
    /// The serial was not registered on the OLT.
    NotRegistered,
    /// The lookup itself failed; registration went ahead regardless.
    LookupFailed { reason: String },
    /// A stale registration was found and a delete was attempted.
    Removed {
        stale: SearchResult,
        delete: DeleteAttempt,
    },
}

/// Audit record of one provisioning attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub attempt_id: Uuid,
    pub device_id: String,
    pub conflict: ConflictCheck,
    pub request: RegistrationRequest,
    /// The candidate with its server-assigned `ontid`.
    pub onu: OnuCandidate,
    pub completed_at: DateTime<Utc>,
}

// ── Validation ───────────────────────────────────────────────────

impl RegistrationRequest {
    /// Validate operator input without any network call.
    pub fn build(input: &ProvisionInput) -> Result<Self, CoreError> {
        let description = input.description.as_str();
        if description.is_empty() {
            return Err(CoreError::validation("description is required"));
        }
        if description.chars().any(char::is_whitespace) {
            return Err(CoreError::validation("description must not contain spaces"));
        }

        let serial_number = input.candidate.serial_number.trim();
        if serial_number.is_empty() {
            return Err(CoreError::validation("serial number is required"));
        }

        let fsp = Fsp::parse(&input.candidate.fsp)?;

        let Some(service) = input.service else {
            return Err(CoreError::validation("a service profile (VLAN) must be selected"));
        };

        Ok(Self {
            description: description.to_owned(),
            serial_number: serial_number.to_owned(),
            fsp,
            native_vlan: input.native_vlan,
            service,
        })
    }
}

// ── ConflictResolver ─────────────────────────────────────────────

/// Finds and removes an existing registration for a serial number.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    client: OltClient,
    search: SearchEngine,
}

impl ConflictResolver {
    pub fn new(client: OltClient) -> Self {
        Self {
            search: SearchEngine::new(client.clone()),
            client,
        }
    }

    /// Look up `sn` and delete whatever registration the OLT reports for it.
    ///
    /// Only `AuthExpired` is returned as an error.
    pub async fn resolve(
        &self,
        device_id: &str,
        session: &Session,
        sn: &str,
    ) -> Result<ConflictCheck, CoreError> {
        let stale = match self.search.lookup(device_id, session, sn).await {
            Ok(Some(stale)) => stale,
            Ok(None) => {
                debug!(device_id, sn, "serial not registered");
                return Ok(ConflictCheck::NotRegistered);
            }
            Err(e) if e.is_auth_expired() => return Err(e),
            Err(e) => {
                warn!(device_id, sn, error = %e, "conflict lookup failed, continuing");
                return Ok(ConflictCheck::LookupFailed {
                    reason: e.to_string(),
                });
            }
        };

        let token = session.bearer()?;
        let request = stale_delete_request(sn, &stale);
        let delete = match self.client.delete_onu(token, device_id, &request).await {
            Ok(()) => {
                info!(device_id, sn, ontid = ?stale.ontid, fsp = ?stale.fsp, "stale registration removed");
                DeleteAttempt::Ok
            }
            Err(e) => {
                let e = CoreError::from(e);
                if e.is_auth_expired() {
                    return Err(e);
                }
                warn!(device_id, sn, error = %e, "stale registration delete failed, continuing");
                DeleteAttempt::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ConflictCheck::Removed { stale, delete })
    }
}

// ── Registrar ────────────────────────────────────────────────────

/// Commits new registrations after conflict resolution.
#[derive(Debug, Clone)]
pub struct Registrar {
    client: OltClient,
    resolver: ConflictResolver,
}

impl Registrar {
    pub fn new(client: OltClient) -> Self {
        Self {
            resolver: ConflictResolver::new(client.clone()),
            client,
        }
    }

    /// Submit a validated request. Only `201 Created` succeeds; returns the
    /// server-assigned ONT id when the response carries one.
    pub async fn register(
        &self,
        device_id: &str,
        session: &Session,
        request: &RegistrationRequest,
    ) -> Result<Option<String>, CoreError> {
        let token = session.bearer()?;
        let body = AddOnuRequest::from(request);
        let created = self.client.add_onu(token, device_id, &body).await?;
        Ok(created.ontid)
    }

    /// Validate, resolve conflicts, and register, in that order.
    pub async fn provision(
        &self,
        device_id: &str,
        session: &Session,
        input: ProvisionInput,
    ) -> Result<ProvisionReport, CoreError> {
        let request = RegistrationRequest::build(&input)?;
        session.bearer()?;

        let attempt_id = Uuid::new_v4();
        debug!(%attempt_id, device_id, sn = %request.serial_number, "provisioning attempt started");

        let conflict = self
            .resolver
            .resolve(device_id, session, &request.serial_number)
            .await?;

        let ontid = self.register(device_id, session, &request).await?;
        info!(%attempt_id, device_id, sn = %request.serial_number, ontid = ?ontid, "ONU registered");

        let mut onu = input.candidate;
        onu.ontid = ontid;
        onu.fsp = request.fsp.to_string();

        Ok(ProvisionReport {
            attempt_id,
            device_id: device_id.to_owned(),
            conflict,
            request,
            onu,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(description: &str, fsp: &str, service: Option<ServiceProfile>) -> ProvisionInput {
        ProvisionInput {
            candidate: OnuCandidate::manual("HWTC1234567890AB", fsp),
            description: description.into(),
            service,
            native_vlan: false,
        }
    }

    const SERVICE: ServiceProfile = ServiceProfile { id: 5, vlan_tag: 100 };

    #[test]
    fn valid_input_builds_request() {
        let req = RegistrationRequest::build(&input("user1", "0/1/2", Some(SERVICE))).unwrap();
        assert_eq!(req.fsp.interface(), "0/1");
        assert_eq!(req.fsp.port(), "2");
        assert_eq!(req.service, SERVICE);
    }

    #[test]
    fn description_with_space_rejected() {
        let err = RegistrationRequest::build(&input("user 1", "0/1/2", Some(SERVICE)));
        assert!(matches!(err, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn leading_or_trailing_whitespace_rejected() {
        for description in [" user1", "user1\t", " user1 "] {
            let err = RegistrationRequest::build(&input(description, "0/1/2", Some(SERVICE)));
            assert!(
                matches!(err, Err(CoreError::Validation { .. })),
                "{description:?} was accepted"
            );
        }
    }

    #[test]
    fn empty_description_rejected() {
        let err = RegistrationRequest::build(&input("  ", "0/1/2", Some(SERVICE)));
        assert!(matches!(err, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn missing_service_rejected() {
        let err = RegistrationRequest::build(&input("user1", "0/1/2", None));
        assert!(matches!(err, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn short_fsp_rejected() {
        let err = RegistrationRequest::build(&input("user1", "0/1", Some(SERVICE)));
        assert!(matches!(err, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn delete_attempt_display() {
        assert_eq!(DeleteAttempt::Ok.to_string(), "deleted");
        assert_eq!(
            DeleteAttempt::Failed {
                reason: "HTTP 500".into()
            }
            .to_string(),
            "delete failed: HTTP 500"
        );
    }
}
