//! # go365-oauth
//!
//! `OAuth2` authentication against the Microsoft identity platform for
//! Microsoft Graph clients.
//!
//! ## Features
//!
//! - **Authorization flows**: Device Flow (RFC 8628) and Authorization Code
//!   Flow (with optional PKCE)
//! - **Token management**: Expiration checking with a safety buffer, refresh
//! - **Tenant-aware endpoints**: `common`, `organizations`, `consumers` or a
//!   tenant GUID
//!
//! ## Quick Start
//!
//! ### Device Flow (CLI apps)
//!
//! ```ignore
//! use go365_oauth::{DeviceFlow, OAuthClient, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::microsoft("common")?;
//!     let client = OAuthClient::new("your_client_id", provider);
//!     let flow = DeviceFlow::new(client);
//!
//!     let auth = flow.request_device_authorization(None).await?;
//!     println!("Visit {} and enter {}", auth.verification_uri, auth.user_code);
//!
//!     let token = flow.wait_for_token(&auth, 0).await?;
//!     println!("Authorized! Expires at: {:?}", token.expires_at);
//!     Ok(())
//! }
//! ```
//!
//! ### Authorization Code Flow
//!
//! ```ignore
//! use go365_oauth::{AuthorizationCodeFlow, OAuthClient, Provider};
//!
//! let provider = Provider::microsoft("organizations")?;
//! let client = OAuthClient::new("your_client_id", provider)
//!     .with_redirect_uri("http://localhost:8400");
//! let flow = AuthorizationCodeFlow::new(client).with_pkce();
//!
//! let auth_url = flow.authorization_url(None, Some("state"))?;
//! // ...user consents, redirect delivers `code`...
//! let token = flow.exchange_code(code, None).await?;
//! ```
//!
//! ### Token Refresh
//!
//! ```ignore
//! if token.is_expired() {
//!     let token = client.refresh_token(&token).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;

pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, DeviceAuthorization, DeviceFlow, OAuthClient, PkceChallenge};
pub use provider::Provider;
pub use token::Token;
