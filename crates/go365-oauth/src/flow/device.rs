//! Device Authorization Flow implementation (RFC 8628).

use super::{OAuthClient, error_from_body, read_token_response};
use crate::error::{Error, Result};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Device authorization response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceAuthorization {
    /// Device code for polling.
    pub device_code: String,
    /// User code to display to the user.
    pub user_code: String,
    /// Verification URI where user should go.
    pub verification_uri: String,
    /// Complete verification URI (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_uri_complete: Option<String>,
    /// Expiration time in seconds.
    pub expires_in: u32,
    /// Polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Ready-made instructions for the user (Microsoft sends one).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const fn default_interval() -> u32 {
    5
}

/// Device Authorization Flow for `OAuth2`.
///
/// This flow is suitable for devices with limited input capabilities
/// or no browser (e.g., CLI applications over SSH).
#[derive(Debug)]
pub struct DeviceFlow {
    client: OAuthClient,
}

impl DeviceFlow {
    /// Creates a new device flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// Requests device authorization from the server.
    ///
    /// Returns the device code and user code that should be displayed to the user.
    ///
    /// # Arguments
    ///
    /// * `scopes` - Optional scopes to request (uses provider defaults if None)
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization request fails.
    pub async fn request_device_authorization(
        &self,
        scopes: Option<&[String]>,
    ) -> Result<DeviceAuthorization> {
        let device_auth_url = self
            .client
            .provider
            .device_auth_url
            .as_ref()
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "Provider {} does not support device flow",
                    self.client.provider.name
                ))
            })?;

        let scope_str = scopes.map_or_else(
            || self.client.provider.default_scopes.join(" "),
            |s| s.join(" "),
        );

        let mut params = HashMap::new();
        params.insert("client_id", self.client.client_id.as_str());
        if !scope_str.is_empty() {
            params.insert("scope", &scope_str);
        }

        let response = self
            .client
            .http_client
            .post(device_auth_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status, body));
        }

        serde_json::from_str(&body).map_err(Into::into)
    }

    /// Polls the token endpoint once, after waiting `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizationPending`] or [`Error::SlowDown`] while the
    /// user has not finished; callers keep polling on those. Returns
    /// [`Error::AccessDenied`] if the user declined and [`Error::TokenExpired`]
    /// once the device code is no longer valid.
    pub async fn poll_for_token(&self, device_code: &str, interval: Duration) -> Result<Token> {
        tokio::time::sleep(interval).await;

        let mut params = HashMap::new();
        params.insert("grant_type", "urn:ietf:params:oauth:grant-type:device_code");
        params.insert("device_code", device_code);
        params.insert("client_id", &self.client.client_id);

        let response = self
            .client
            .http_client
            .post(self.client.provider.token_url.clone())
            .form(&params)
            .send()
            .await?;

        match read_token_response(response).await {
            Ok(token_response) => Token::from_response(token_response),
            Err(Error::OAuth { error, description }) => Err(match error.as_str() {
                "authorization_pending" => Error::AuthorizationPending,
                "slow_down" => Error::SlowDown,
                "access_denied" | "authorization_declined" => Error::AccessDenied,
                "expired_token" | "code_expired" => Error::TokenExpired,
                _ => Error::OAuth { error, description },
            }),
            Err(e) => Err(e),
        }
    }

    /// Polls until the user completes the authorization shown in `auth`.
    ///
    /// # Arguments
    ///
    /// * `auth` - Response from [`DeviceFlow::request_device_authorization`]
    /// * `max_attempts` - Maximum number of polling attempts (0 = until the code expires)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when attempts run out or the code expires,
    /// or any non-retryable error from the token endpoint.
    pub async fn wait_for_token(
        &self,
        auth: &DeviceAuthorization,
        max_attempts: usize,
    ) -> Result<Token> {
        let started = Instant::now();
        let lifetime = Duration::from_secs(u64::from(auth.expires_in));
        let mut interval = Duration::from_secs(u64::from(auth.interval));
        let mut attempts = 0;

        loop {
            if (max_attempts > 0 && attempts >= max_attempts) || started.elapsed() >= lifetime {
                return Err(Error::Timeout(auth.expires_in.into()));
            }

            match self.poll_for_token(&auth.device_code, interval).await {
                Ok(token) => return Ok(token),
                Err(Error::AuthorizationPending) => {
                    attempts += 1;
                }
                Err(Error::SlowDown) => {
                    // Increase interval by 5 seconds as per RFC
                    interval += Duration::from_secs(5);
                    attempts += 1;
                    debug!(?interval, "device flow asked to slow down");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Complete device authorization flow.
    ///
    /// Requests a device code, hands it to `on_prompt` so the caller can show
    /// the user code and verification URI, then polls until completion.
    ///
    /// # Errors
    ///
    /// Returns an error if authorization fails or times out.
    pub async fn authorize<F>(
        &self,
        scopes: Option<&[String]>,
        max_attempts: usize,
        on_prompt: F,
    ) -> Result<(DeviceAuthorization, Token)>
    where
        F: FnOnce(&DeviceAuthorization),
    {
        let auth = self.request_device_authorization(scopes).await?;
        on_prompt(&auth);
        let token = self.wait_for_token(&auth, max_attempts).await?;
        Ok((auth, token))
    }
}
