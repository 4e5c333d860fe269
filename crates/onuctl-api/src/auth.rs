// Token endpoint
//
// Form-encoded username/password exchanged for a bearer token. The call is
// bounded by a hard deadline supplied by the caller; the session lifetime
// bookkeeping lives in `onuctl-core`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{OltClient, bounded, decode};
use crate::error::Error;
use crate::types::{LoginForm, TokenResponse};

impl OltClient {
    /// Exchange credentials for a bearer token.
    ///
    /// `POST /login` with `application/x-www-form-urlencoded` body.
    /// A 404, 401, or 403 means the credentials were rejected and yields
    /// [`Error::InvalidCredentials`]. Exceeding `deadline` yields
    /// [`Error::Timeout`] and drops the request.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        deadline: Duration,
    ) -> Result<TokenResponse, Error> {
        let url = self.endpoint(&["login"])?;
        debug!(username, "requesting access token");

        let form = LoginForm {
            username,
            password: password.expose_secret(),
        };

        bounded(Some(deadline), async {
            let resp = self.post_form(url, &form).send().await?;
            let status = resp.status();

            if matches!(status.as_u16(), 401 | 403 | 404) {
                return Err(Error::InvalidCredentials {
                    status: status.as_u16(),
                });
            }
            if !status.is_success() {
                return Err(self.parse_error(status, resp).await);
            }

            let body = resp.text().await?;
            let token: TokenResponse = decode(body)?;
            debug!("access token issued");
            Ok(token)
        })
        .await
    }
}
