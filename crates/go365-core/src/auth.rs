//! Turning configuration plus a stored token into a usable access token.

use go365_oauth::provider::OFFLINE_ACCESS_SCOPE;
use go365_oauth::{
    AuthorizationCodeFlow, DeviceAuthorization, DeviceFlow, OAuthClient, Provider, Token,
};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::credentials::TokenStore;
use crate::error::{Error, Result};

/// Redirect URI registered for the authorization code flow.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";

/// Signs the user in and keeps the stored token fresh.
pub struct Authenticator {
    client: OAuthClient,
    scopes: Vec<String>,
    store: Box<dyn TokenStore>,
    code_flow: AuthorizationCodeFlow,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_id", &self.client.client_id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Authenticator for the tenant and client in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the tenant or client id is missing.
    pub fn new(config: &Config, store: Box<dyn TokenStore>) -> Result<Self> {
        require_ids(config)?;
        let provider = Provider::microsoft(&config.tenant_id)?;
        Ok(Self::with_provider(config, provider, store))
    }

    /// Authenticator against an explicit provider (national clouds, tests).
    #[must_use]
    pub fn with_provider(config: &Config, provider: Provider, store: Box<dyn TokenStore>) -> Self {
        let client = OAuthClient::new(&config.client_id, provider)
            .with_redirect_uri(DEFAULT_REDIRECT_URI);

        let mut scopes = config.scopes.clone();
        if !scopes.iter().any(|s| s == OFFLINE_ACCESS_SCOPE) {
            scopes.push(OFFLINE_ACCESS_SCOPE.to_string());
        }

        Self {
            code_flow: AuthorizationCodeFlow::new(client.clone()).with_pkce(),
            client,
            scopes,
            store,
        }
    }

    /// Scopes requested at sign-in.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Runs the device code flow and stores the token.
    ///
    /// `on_prompt` receives the code and URL to show the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow fails or the token cannot be stored.
    pub async fn login_with_device_code<F>(&self, on_prompt: F) -> Result<Token>
    where
        F: FnOnce(&DeviceAuthorization),
    {
        let flow = DeviceFlow::new(self.client.clone());
        let (_, token) = flow.authorize(Some(self.scopes.as_slice()), 0, on_prompt).await?;
        self.store.save(&token)?;
        info!("signed in with device code");
        Ok(token)
    }

    /// Browser sign-in URL for the authorization code flow (with PKCE).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        Ok(self
            .code_flow
            .authorization_url(Some(self.scopes.as_slice()), Some(state))?)
    }

    /// Redeems the code delivered to the redirect URI and stores the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the token cannot be stored.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        let token = self.code_flow.exchange_code(code, None).await?;
        self.store.save(&token)?;
        Ok(token)
    }

    /// The stored token, refreshed first if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when nothing is stored, or the
    /// refresh error when the token expired and cannot be renewed.
    pub async fn token(&self) -> Result<Token> {
        let token = self.store.load()?.ok_or(Error::NotAuthenticated)?;
        if token.is_valid() {
            return Ok(token);
        }

        debug!("access token expired, refreshing");
        let refreshed = self.client.refresh_token(&token).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed)
    }

    /// Access token for Graph requests.
    ///
    /// # Errors
    ///
    /// Same as [`Authenticator::token`].
    pub async fn access_token(&self) -> Result<String> {
        Ok(self.token().await?.access_token)
    }

    /// Whether a usable token is stored (refreshing it if needed).
    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_ok_and(|t| t.is_valid())
    }

    /// Forgets the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn logout(&self) -> Result<()> {
        self.store.delete()
    }
}

fn require_ids(config: &Config) -> Result<()> {
    if config.is_complete() {
        Ok(())
    } else {
        Err(Error::Config(
            "client ID and tenant ID must be configured. Use 'go365 config set' to configure"
                .into(),
        ))
    }
}
