// Device-control API HTTP client
//
// Wraps `reqwest::Client` with bearer authentication, URL construction from
// path segments, hard per-call deadlines, and status-to-error mapping. The
// endpoint groups (auth, devices, onu) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape from the device-control API ─────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the OLT device-control API.
///
/// Every authenticated call takes the bearer token explicitly; the client
/// never stores credentials, so a token lives no longer than the request
/// that carries it.
#[derive(Debug, Clone)]
pub struct OltClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OltClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so segment pushes land under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request builders ─────────────────────────────────────────────

    pub(crate) fn get(&self, url: Url, token: &SecretString) -> reqwest::RequestBuilder {
        debug!("GET {url}");
        self.http.get(url).bearer_auth(token.expose_secret())
    }

    pub(crate) fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        token: &SecretString,
        body: &B,
    ) -> reqwest::RequestBuilder {
        debug!("POST {url}");
        self.http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(body)
    }

    pub(crate) fn delete<B: Serialize + ?Sized>(
        &self,
        url: Url,
        token: &SecretString,
        body: &B,
    ) -> reqwest::RequestBuilder {
        debug!("DELETE {url}");
        self.http
            .delete(url)
            .bearer_auth(token.expose_secret())
            .json(body)
    }

    /// Unauthenticated form POST (token endpoint only).
    pub(crate) fn post_form<B: Serialize + ?Sized>(
        &self,
        url: Url,
        form: &B,
    ) -> reqwest::RequestBuilder {
        debug!("POST {url} (form)");
        self.http.post(url).form(form)
    }

    // ── Response handling ────────────────────────────────────────────

    pub(crate) async fn handle_json<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            decode(body)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    pub(crate) async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    pub(crate) async fn parse_error(
        &self,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| {
                err.message.or_else(|| {
                    err.detail.map(|d| match d {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                })
            })
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Decode a JSON body, keeping a preview of the payload on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Run `fut` under a hard deadline.
///
/// When the deadline fires the future is dropped, which tears down the
/// in-flight request at the connection level rather than merely ignoring
/// its eventual response.
pub(crate) async fn bounded<T, F>(deadline: Option<Duration>, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout {
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?,
        None => fut.await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments_under_base_path() {
        let client =
            OltClient::from_reqwest("http://olt.example/api", reqwest::Client::new()).unwrap();
        let url = client.endpoint(&["device", "7", "onu", "autofind"]).unwrap();
        assert_eq!(url.as_str(), "http://olt.example/api/device/7/onu/autofind");
    }

    #[test]
    fn endpoint_encodes_unsafe_segments() {
        let client = OltClient::from_reqwest("http://olt.example/", reqwest::Client::new()).unwrap();
        let url = client.endpoint(&["device", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://olt.example/device/a%2Fb");
    }

    #[tokio::test]
    async fn bounded_maps_elapsed_deadline_to_timeout() {
        let result: Result<(), Error> = bounded(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout { timeout_ms: 10 })));
    }
}
