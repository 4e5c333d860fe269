// ── Optical diagnostics poller ──
//
// Last-request-wins: every fetch takes a fresh id from a monotonically
// increasing counter and may only publish while its id is still the latest.
// The check and the publish happen inside `watch::Sender::send_if_modified`,
// so a superseded response can never overwrite a newer state.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use onuctl_api::OltClient;
use onuctl_api::types::OnuLocator;

use crate::convert::optical_reading;
use crate::error::CoreError;
use crate::model::{OpticalReading, OpticalTarget};
use crate::session::Session;

/// The exposed reading, as observed by front ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OpticalState {
    #[default]
    Idle,
    Loading { target: OpticalTarget },
    Ready(OpticalReading),
    Failed { target: OpticalTarget, message: String },
}

/// What a single `fetch` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// `fsp` or `ontid` was missing; no request was made.
    Skipped,
    /// A newer fetch (or a reset) started first; this result was discarded.
    Superseded,
    Reading(OpticalReading),
}

#[derive(Debug)]
pub struct OpticalPoller {
    client: OltClient,
    latest: AtomicU64,
    state: watch::Sender<OpticalState>,
}

impl OpticalPoller {
    pub fn new(client: OltClient) -> Self {
        let (state, _) = watch::channel(OpticalState::Idle);
        Self {
            client,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OpticalState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> OpticalState {
        self.state.borrow().clone()
    }

    /// Invalidate any in-flight fetch and clear the exposed reading.
    pub fn reset(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(OpticalState::Idle);
    }

    /// Publish `next` only if request `id` is still the newest one.
    fn publish_if_latest(&self, id: u64, next: OpticalState) -> bool {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) == id {
                *state = next;
                true
            } else {
                false
            }
        })
    }

    /// Fetch receive power for `(fsp, ontid)` on `device_id`.
    pub async fn fetch(
        &self,
        device_id: &str,
        session: &Session,
        fsp: Option<&str>,
        ontid: Option<&str>,
    ) -> Result<FetchOutcome, CoreError> {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish_if_latest(id, OpticalState::Idle);

        let (Some(fsp), Some(ontid)) = (
            fsp.map(str::trim).filter(|s| !s.is_empty()),
            ontid.map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            debug!(device_id, "optical fetch skipped: no location");
            return Ok(FetchOutcome::Skipped);
        };

        let target = OpticalTarget {
            fsp: fsp.to_owned(),
            ontid: ontid.to_owned(),
        };
        self.publish_if_latest(
            id,
            OpticalState::Loading {
                target: target.clone(),
            },
        );

        let result = match session.bearer() {
            Ok(token) => self
                .client
                .optical(token, device_id, &OnuLocator::from(&target))
                .await
                .map_err(CoreError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(record) => {
                let reading = optical_reading(target, record);
                if self.publish_if_latest(id, OpticalState::Ready(reading.clone())) {
                    debug!(device_id, id, "optical reading published");
                    Ok(FetchOutcome::Reading(reading))
                } else {
                    debug!(device_id, id, "optical reading superseded");
                    Ok(FetchOutcome::Superseded)
                }
            }
            Err(e) => {
                let failed = OpticalState::Failed {
                    target,
                    message: e.to_string(),
                };
                if self.publish_if_latest(id, failed) {
                    Err(e)
                } else {
                    Ok(FetchOutcome::Superseded)
                }
            }
        }
    }
}
