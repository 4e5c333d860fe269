// Device (OLT) inventory endpoints

use secrecy::SecretString;
use tracing::debug;

use crate::client::OltClient;
use crate::error::Error;
use crate::types::{DeviceRecord, DeviceStatusRecord, ServiceRecord};

impl OltClient {
    /// List the OLTs visible to this account.
    ///
    /// `GET /device`
    pub async fn list_devices(&self, token: &SecretString) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.endpoint(&["device", ""])?;
        let resp = self.get(url, token).send().await?;
        self.handle_json(resp).await
    }

    /// Side-channel reachability check for one OLT.
    ///
    /// `GET /device/{id}/status`
    pub async fn device_status(
        &self,
        token: &SecretString,
        device_id: &str,
    ) -> Result<DeviceStatusRecord, Error> {
        let url = self.endpoint(&["device", device_id, "status"])?;
        debug!(device_id, "checking device status");
        let resp = self.get(url, token).send().await?;
        self.handle_json(resp).await
    }

    /// Service profiles (VLAN bindings) configured on an OLT.
    ///
    /// `GET /device/{id}/services`
    pub async fn list_services(
        &self,
        token: &SecretString,
        device_id: &str,
    ) -> Result<Vec<ServiceRecord>, Error> {
        let url = self.endpoint(&["device", device_id, "services"])?;
        let resp = self.get(url, token).send().await?;
        self.handle_json(resp).await
    }
}
