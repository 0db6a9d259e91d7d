//! # go365-core
//!
//! Everything the `go365` CLI needs besides Graph itself.
//!
//! This crate provides:
//! - Configuration in `~/.go365/config.json`
//! - Token storage in a private file or the OS keyring
//! - An [`Authenticator`] that signs in (device code or browser) and refreshes
//!   expired tokens
//! - Natural-language date parsing for command-line flags
//! - Discovery and execution of `go365-<name>` plugins

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod config;
pub mod credentials;
pub mod dateparse;
mod error;
pub mod plugin;

pub use auth::Authenticator;
pub use config::{Config, ConfigManager, TokenStorage};
pub use credentials::{FileTokenStore, KeyringTokenStore, TokenStore};
pub use error::{Error, Result};
