//! Command implementations.
//!
//! Each command loads the configuration on its own; commands that talk to
//! Graph go through [`Session::graph`], which refreshes the stored token.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod drive;
pub mod mail;
pub mod plugins;

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, FixedOffset, Local};
use go365_core::{Authenticator, Config, ConfigManager};
use go365_graph::GraphClient;

/// Configuration shared by every command of one invocation.
#[derive(Debug)]
pub struct Session {
    manager: ConfigManager,
}

impl Session {
    pub fn new() -> Result<Self> {
        let manager = ConfigManager::new().context("failed to locate the configuration directory")?;
        Ok(Self { manager })
    }

    pub const fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn config(&self) -> Result<Config> {
        self.manager.load().context("failed to load config")
    }

    pub fn authenticator(&self) -> Result<Authenticator> {
        let config = self.config()?;
        let store = self.manager.token_store(&config);
        Authenticator::new(&config, store).context("failed to create authenticator")
    }

    /// Graph client for the signed-in user.
    pub async fn graph(&self) -> Result<GraphClient> {
        let auth = self.authenticator()?;
        let token = match auth.access_token().await {
            Ok(token) => token,
            Err(go365_core::Error::NotAuthenticated) => {
                bail!("not authenticated. Please run 'go365 login' first")
            }
            Err(e) => return Err(e).context("failed to get access token"),
        };
        Ok(GraphClient::new(token))
    }
}

/// Current local time with a fixed offset, the reference for date flags.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}
