// ── Lifecycle controller ──
//
// Destructive ONU actions (delete registration, reboot). An action is first
// staged, then confirmed or cancelled. Dispatch is single-flight per
// operation kind: the in-flight marker lives in a `DashMap` and is removed
// by a guard's `Drop`, so every exit path (error, timeout, cancellation,
// panic) releases it. The published state reads `Busy` for as long as any
// marker is held.

use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use onuctl_api::OltClient;
use onuctl_api::types::{DeleteOnuRequest, OnuLocator};

use crate::error::CoreError;
use crate::session::Session;

// ── Actions and state ────────────────────────────────────────────

/// Single-flight key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleOp {
    Delete,
    Reboot,
}

/// A destructive action and its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum LifecycleAction {
    Delete { sn: String },
    Reboot { fsp: String, ontid: String },
}

impl LifecycleAction {
    pub fn op(&self) -> LifecycleOp {
        match self {
            Self::Delete { .. } => LifecycleOp::Delete,
            Self::Reboot { .. } => LifecycleOp::Reboot,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Delete { sn } if sn.trim().is_empty() => {
                Err(CoreError::validation("serial number is required"))
            }
            Self::Reboot { fsp, ontid } if fsp.trim().is_empty() || ontid.trim().is_empty() => {
                Err(CoreError::validation("FSP and ONT id are required"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    AwaitingConfirmation(LifecycleAction),
    Busy(LifecycleOp),
    Completed(LifecycleOp),
}

// ── Single-flight guard ──────────────────────────────────────────

struct InFlight<'a> {
    slots: &'a DashMap<LifecycleOp, Instant>,
    op: LifecycleOp,
}

impl<'a> InFlight<'a> {
    fn acquire(slots: &'a DashMap<LifecycleOp, Instant>, op: LifecycleOp) -> Option<Self> {
        match slots.entry(op) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(Self { slots, op })
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some((_, started)) = self.slots.remove(&self.op) {
            debug!(op = %self.op, elapsed = ?started.elapsed(), "single-flight released");
        }
    }
}

// ── Controller ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct LifecycleController {
    client: OltClient,
    in_flight: DashMap<LifecycleOp, Instant>,
    state: watch::Sender<LifecycleState>,
}

impl LifecycleController {
    pub fn new(client: OltClient) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            client,
            in_flight: DashMap::new(),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self, op: LifecycleOp) -> bool {
        self.in_flight.contains_key(&op)
    }

    /// Select a target and wait for confirmation.
    pub fn stage(&self, device_id: &str, action: LifecycleAction) -> PendingAction<'_> {
        self.publish(LifecycleState::AwaitingConfirmation(action.clone()));
        PendingAction {
            controller: self,
            device_id: device_id.to_owned(),
            action,
        }
    }

    /// Dispatch `action` now. A second call for the same kind while one is
    /// in flight fails with `Busy` and makes no request.
    pub async fn execute(
        &self,
        device_id: &str,
        session: &Session,
        action: &LifecycleAction,
    ) -> Result<(), CoreError> {
        action.validate()?;
        let op = action.op();

        let Some(guard) = InFlight::acquire(&self.in_flight, op) else {
            debug!(%op, "rejected: already in flight");
            return Err(CoreError::Busy { operation: op });
        };
        self.state.send_replace(LifecycleState::Busy(op));

        let result = self.dispatch(device_id, session, action).await;
        drop(guard);

        match &result {
            Ok(()) => {
                info!(%op, device_id, "lifecycle action completed");
                self.publish(LifecycleState::Completed(op));
            }
            Err(e) => {
                warn!(%op, device_id, error = %e, "lifecycle action failed");
                self.publish(LifecycleState::Idle);
            }
        }
        result
    }

    /// Publish `next` unless another action still holds its lock, in which
    /// case that action stays visible as `Busy`.
    fn publish(&self, next: LifecycleState) {
        let running = self.in_flight.iter().next().map(|entry| *entry.key());
        self.state.send_replace(match running {
            Some(op) => LifecycleState::Busy(op),
            None => next,
        });
    }

    async fn dispatch(
        &self,
        device_id: &str,
        session: &Session,
        action: &LifecycleAction,
    ) -> Result<(), CoreError> {
        let token = session.bearer()?;
        match action {
            LifecycleAction::Delete { sn } => {
                let request = DeleteOnuRequest::Serial {
                    sn: sn.trim().to_owned(),
                };
                self.client.delete_onu(token, device_id, &request).await?;
            }
            LifecycleAction::Reboot { fsp, ontid } => {
                let locator = OnuLocator {
                    fsp: fsp.trim().to_owned(),
                    ontid: ontid.trim().to_owned(),
                };
                self.client.reset_onu(token, device_id, &locator).await?;
            }
        }
        Ok(())
    }
}

// ── PendingAction ────────────────────────────────────────────────

/// A staged action awaiting the operator's decision.
#[derive(Debug)]
#[must_use = "a staged action does nothing until confirmed or cancelled"]
pub struct PendingAction<'a> {
    controller: &'a LifecycleController,
    device_id: String,
    action: LifecycleAction,
}

impl PendingAction<'_> {
    pub fn action(&self) -> &LifecycleAction {
        &self.action
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Dispatch the staged action. Front ends go through
    /// `Orchestrator::confirm`, which also handles a rejected token.
    pub(crate) async fn confirm(self, session: &Session) -> Result<(), CoreError> {
        self.controller
            .execute(&self.device_id, session, &self.action)
            .await
    }

    /// Clear the selection without dispatching.
    pub fn cancel(self) {
        self.controller.publish(LifecycleState::Idle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use onuctl_api::TransportConfig;

    use super::*;

    #[test]
    fn guard_is_exclusive_per_kind() {
        let slots = DashMap::new();
        let first = InFlight::acquire(&slots, LifecycleOp::Delete);
        assert!(first.is_some());
        assert!(InFlight::acquire(&slots, LifecycleOp::Delete).is_none());
        assert!(InFlight::acquire(&slots, LifecycleOp::Reboot).is_some());

        drop(first);
        assert!(InFlight::acquire(&slots, LifecycleOp::Delete).is_some());
    }

    #[test]
    fn empty_targets_fail_validation() {
        let delete = LifecycleAction::Delete { sn: " ".into() };
        assert!(matches!(delete.validate(), Err(CoreError::Validation { .. })));

        let reboot = LifecycleAction::Reboot {
            fsp: "0/1/2".into(),
            ontid: String::new(),
        };
        assert!(matches!(reboot.validate(), Err(CoreError::Validation { .. })));
    }

    #[test]
    fn held_lock_keeps_state_busy() {
        let client = OltClient::new("http://127.0.0.1:9", &TransportConfig::default()).unwrap();
        let controller = LifecycleController::new(client);
        let guard = InFlight::acquire(&controller.in_flight, LifecycleOp::Reboot).unwrap();

        let pending = controller.stage("1", LifecycleAction::Delete { sn: "SN".into() });
        assert_eq!(controller.state(), LifecycleState::Busy(LifecycleOp::Reboot));
        pending.cancel();
        assert_eq!(controller.state(), LifecycleState::Busy(LifecycleOp::Reboot));

        drop(guard);
        controller.publish(LifecycleState::Completed(LifecycleOp::Delete));
        assert_eq!(
            controller.state(),
            LifecycleState::Completed(LifecycleOp::Delete)
        );
    }

    #[test]
    fn op_display_is_lowercase() {
        assert_eq!(LifecycleOp::Delete.to_string(), "delete");
        assert_eq!(LifecycleOp::Reboot.to_string(), "reboot");
    }
}
