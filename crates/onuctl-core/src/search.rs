// ── Search engine ──
//
// Serial-number lookup against one OLT. `lookup` is the raw primitive the
// conflict resolver also uses; `search` adds the operator-facing input
// check. Results are never cached.

use tracing::debug;

use onuctl_api::OltClient;

use crate::error::CoreError;
use crate::model::SearchResult;
use crate::session::Session;

/// Shortest serial number accepted from an operator.
pub const MIN_SN_LEN: usize = 15;

#[derive(Debug, Clone)]
pub struct SearchEngine {
    client: OltClient,
}

impl SearchEngine {
    pub fn new(client: OltClient) -> Self {
        Self { client }
    }

    /// Look up a registered ONU by serial. `Ok(None)` when the OLT does not
    /// know it.
    pub async fn lookup(
        &self,
        device_id: &str,
        session: &Session,
        sn: &str,
    ) -> Result<Option<SearchResult>, CoreError> {
        let token = session.bearer()?;
        let sn = sn.trim();
        let found = self.client.search_sn(token, device_id, sn).await?;
        debug!(device_id, sn, found = found.is_some(), "serial lookup complete");
        Ok(found.map(SearchResult::from))
    }

    /// Operator search: rejects short serials before touching the network.
    pub async fn search(
        &self,
        device_id: &str,
        session: &Session,
        sn: &str,
    ) -> Result<Option<SearchResult>, CoreError> {
        validate_search_sn(sn)?;
        self.lookup(device_id, session, sn).await
    }
}

pub(crate) fn validate_search_sn(sn: &str) -> Result<(), CoreError> {
    let len = sn.trim().chars().count();
    if len < MIN_SN_LEN {
        return Err(CoreError::validation(format!(
            "serial number must be at least {MIN_SN_LEN} characters (got {len})"
        )));
    }
    Ok(())
}
