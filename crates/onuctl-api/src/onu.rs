// ONU endpoints
//
// Autofind, SN lookup, registration, deletion, reset, and optical power.
// Status handling differs per endpoint (404 is a valid empty lookup, add
// only succeeds on 201), so each method inspects the status itself before
// delegating to the shared response helpers.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use tracing::debug;

use crate::client::{OltClient, bounded, decode};
use crate::error::Error;
use crate::types::{
    AddOnuRequest, AddOnuResponse, AutofindRecord, DeleteOnuRequest, OnuLocator, OpticalRecord,
    SnQuery, SnRecord,
};

impl OltClient {
    /// Trigger an autofind scan and return unregistered ONUs in server order.
    ///
    /// `GET /device/{id}/onu/autofind`. The whole exchange (headers and body)
    /// is bounded by `deadline`; on expiry the request is dropped.
    pub async fn autofind(
        &self,
        token: &SecretString,
        device_id: &str,
        deadline: Duration,
    ) -> Result<Vec<AutofindRecord>, Error> {
        let url = self.endpoint(&["device", device_id, "onu", "autofind"])?;
        debug!(device_id, ?deadline, "starting autofind scan");

        bounded(Some(deadline), async {
            let resp = self.get(url, token).send().await?;
            self.handle_json(resp).await
        })
        .await
    }

    /// Look up a registered ONU by serial number.
    ///
    /// `POST /device/{id}/onu/search/sn` with `{"sn": "..."}`. Returns
    /// `Ok(None)` on 404 or an empty/null body.
    pub async fn search_sn(
        &self,
        token: &SecretString,
        device_id: &str,
        sn: &str,
    ) -> Result<Option<SnRecord>, Error> {
        let url = self.endpoint(&["device", device_id, "onu", "search", "sn"])?;
        debug!(device_id, sn, "searching ONU by serial");

        let resp = self.post(url, token, &SnQuery { sn }).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode::<Option<SnRecord>>(body)
    }

    /// Register an ONU.
    ///
    /// `POST /device/{id}/onu/add`. Only `201 Created` counts as success;
    /// any other status (including other 2xx codes) is an error.
    pub async fn add_onu(
        &self,
        token: &SecretString,
        device_id: &str,
        request: &AddOnuRequest,
    ) -> Result<AddOnuResponse, Error> {
        let url = self.endpoint(&["device", device_id, "onu", "add"])?;
        debug!(device_id, sn = %request.sn, fsp = %request.fsp, "registering ONU");

        let resp = self.post(url, token, request).send().await?;
        let status = resp.status();

        if status != StatusCode::CREATED {
            if status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: if message.is_empty() {
                        "registration not created".into()
                    } else {
                        message
                    },
                });
            }
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(AddOnuResponse::default());
        }
        decode(body)
    }

    /// Remove an ONU registration.
    ///
    /// `DELETE /device/{id}/onu/delete` with a JSON body.
    pub async fn delete_onu(
        &self,
        token: &SecretString,
        device_id: &str,
        request: &DeleteOnuRequest,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["device", device_id, "onu", "delete"])?;
        debug!(device_id, ?request, "deleting ONU registration");

        let resp = self.delete(url, token, request).send().await?;
        self.handle_empty(resp).await
    }

    /// Reboot an ONU.
    ///
    /// `POST /device/{id}/onu/reset` with `{"FSP", "ONTID"}`.
    pub async fn reset_onu(
        &self,
        token: &SecretString,
        device_id: &str,
        locator: &OnuLocator,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["device", device_id, "onu", "reset"])?;
        debug!(device_id, fsp = %locator.fsp, ontid = %locator.ontid, "rebooting ONU");

        let resp = self.post(url, token, locator).send().await?;
        self.handle_empty(resp).await
    }

    /// Read receive power for a registered ONU.
    ///
    /// `POST /device/{id}/onu/optical` with `{"FSP", "ONTID"}`.
    pub async fn optical(
        &self,
        token: &SecretString,
        device_id: &str,
        locator: &OnuLocator,
    ) -> Result<OpticalRecord, Error> {
        let url = self.endpoint(&["device", device_id, "onu", "optical"])?;
        debug!(device_id, fsp = %locator.fsp, ontid = %locator.ontid, "reading optical power");

        let resp = self.post(url, token, locator).send().await?;
        self.handle_json(resp).await
    }
}
