// ── Discovery scanner ──
//
// One autofind request per scan, bounded by the scan ceiling and by a
// caller-supplied cancellation token. Both paths drop the request future,
// so nothing from an abandoned scan is ever returned.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use onuctl_api::OltClient;

use crate::error::CoreError;
use crate::model::OnuCandidate;
use crate::session::Session;

/// Result of a completed scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Candidates in server order, duplicates included.
    Found(Vec<OnuCandidate>),
    /// The OLT reported no unregistered ONUs.
    Empty,
}

impl ScanOutcome {
    pub fn candidates(&self) -> &[OnuCandidate] {
        match self {
            Self::Found(found) => found,
            Self::Empty => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryScanner {
    client: OltClient,
    ceiling: Duration,
}

impl DiscoveryScanner {
    pub fn new(client: OltClient, ceiling: Duration) -> Self {
        Self { client, ceiling }
    }

    /// Scan `device_id` for unregistered ONUs.
    ///
    /// Fails with `Timeout` when the ceiling elapses and `Aborted` when
    /// `cancel` fires first. A non-success response surfaces as `Remote`.
    pub async fn auto_find(
        &self,
        device_id: &str,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, CoreError> {
        let token = session.bearer()?;
        debug!(device_id, ceiling = ?self.ceiling, "autofind scan started");

        let records = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(device_id, "autofind scan cancelled");
                return Err(CoreError::Aborted);
            }
            result = self.client.autofind(token, device_id, self.ceiling) => result?,
        };

        if records.is_empty() {
            info!(device_id, "autofind found no unregistered ONUs");
            return Ok(ScanOutcome::Empty);
        }

        info!(device_id, count = records.len(), "autofind complete");
        Ok(ScanOutcome::Found(
            records.into_iter().map(OnuCandidate::from).collect(),
        ))
    }
}
