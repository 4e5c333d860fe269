// ── OLT inventory ──

use futures::future::join_all;
use tracing::debug;

use onuctl_api::OltClient;

use crate::error::CoreError;
use crate::model::{Device, DeviceStatus, ServiceProfile};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct Inventory {
    client: OltClient,
}

impl Inventory {
    pub fn new(client: OltClient) -> Self {
        Self { client }
    }

    /// List OLTs with reachability filled in from the status endpoint.
    ///
    /// Status checks run concurrently; any failure of a check (other than
    /// an expired session) marks that OLT offline.
    pub async fn list_devices(&self, session: &Session) -> Result<Vec<Device>, CoreError> {
        let token = session.bearer()?;
        let records = self.client.list_devices(token).await?;

        let checks = records
            .iter()
            .map(|rec| self.client.device_status(token, &rec.id));
        let statuses = join_all(checks).await;

        let mut devices = Vec::with_capacity(records.len());
        for (rec, status) in records.into_iter().zip(statuses) {
            let online = match status {
                Ok(s) => s
                    .status
                    .as_deref()
                    .and_then(|s| s.parse::<DeviceStatus>().ok())
                    .is_some_and(DeviceStatus::is_online),
                Err(e) if e.is_auth_expired() => return Err(CoreError::AuthExpired),
                Err(e) => {
                    debug!(device_id = %rec.id, error = %e, "status check failed");
                    false
                }
            };
            let mut device = Device::from(rec);
            device.status = if online {
                DeviceStatus::Online
            } else {
                DeviceStatus::Offline
            };
            devices.push(device);
        }
        Ok(devices)
    }

    /// Service profiles configured on `device_id`, in server order.
    pub async fn list_services(
        &self,
        device_id: &str,
        session: &Session,
    ) -> Result<Vec<ServiceProfile>, CoreError> {
        let token = session.bearer()?;
        let records = self.client.list_services(token, device_id).await?;
        Ok(records.into_iter().map(ServiceProfile::from).collect())
    }
}
