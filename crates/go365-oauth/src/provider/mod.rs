//! Microsoft identity platform endpoint configuration.

use crate::error::{Error, Result};
use url::Url;

/// Public cloud authority host.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Scope granting every delegated Graph permission consented for the app.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Scope that makes the token endpoint issue refresh tokens.
pub const OFFLINE_ACCESS_SCOPE: &str = "offline_access";

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name, used in error messages.
    pub name: String,
    /// Authorization endpoint URL.
    pub auth_url: Url,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Device authorization endpoint (if supported).
    pub device_auth_url: Option<Url>,
    /// Default scopes.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if URLs are invalid.
    pub fn new(
        name: impl Into<String>,
        auth_url: impl AsRef<str>,
        token_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            auth_url: Url::parse(auth_url.as_ref())?,
            token_url: Url::parse(token_url.as_ref())?,
            device_auth_url: None,
            default_scopes: Vec::new(),
        })
    }

    /// Sets the device authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_device_auth_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.device_auth_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Microsoft identity platform (v2.0 endpoints) for a tenant.
    ///
    /// `tenant` is `common`, `organizations`, `consumers`, a verified domain
    /// or a tenant GUID.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is empty or produces an invalid URL.
    pub fn microsoft(tenant: &str) -> Result<Self> {
        Self::microsoft_with_authority(DEFAULT_AUTHORITY, tenant)
    }

    /// Microsoft identity platform under a custom authority host
    /// (national clouds, local test servers).
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is empty or produces an invalid URL.
    pub fn microsoft_with_authority(authority: &str, tenant: &str) -> Result<Self> {
        let tenant = tenant.trim();
        if tenant.is_empty() || tenant.contains('/') {
            return Err(Error::InvalidConfig(format!(
                "invalid tenant identifier: {tenant:?}"
            )));
        }

        let base = format!("{}/{tenant}/oauth2/v2.0", authority.trim_end_matches('/'));
        Ok(Self::new(
            "Microsoft",
            format!("{base}/authorize"),
            format!("{base}/token"),
        )?
        .with_device_auth_url(format!("{base}/devicecode"))?
        .with_default_scopes(vec![
            GRAPH_DEFAULT_SCOPE.to_string(),
            OFFLINE_ACCESS_SCOPE.to_string(),
        ]))
    }

    /// Validates that required URLs are set.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.auth_url.as_str().is_empty() {
            return Err(Error::InvalidConfig("auth_url is empty".into()));
        }
        if self.token_url.as_str().is_empty() {
            return Err(Error::InvalidConfig("token_url is empty".into()));
        }
        Ok(())
    }
}
