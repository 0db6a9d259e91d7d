//! OAuth token persistence.
//!
//! Tokens go either to `token.json` next to the configuration or to the
//! platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use go365_oauth::Token;
use keyring::Entry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::write_private;
use crate::error::Result;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "go365";

/// Keyring user under which the token is stored.
const OAUTH_TOKEN_CREDENTIAL: &str = "oauth_token";

/// Token file name inside the configuration directory.
pub const TOKEN_FILE_NAME: &str = "token.json";

/// Somewhere a token can be kept between invocations.
pub trait TokenStore: Send + Sync {
    /// Loads the stored token, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored data is corrupt.
    fn load(&self) -> Result<Option<Token>>;

    /// Replaces the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn save(&self, token: &Token) -> Result<()>;

    /// Removes the stored token; removing a missing token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self) -> Result<()>;
}

/// Token kept as JSON in a private file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at `dir/token.json`.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(TOKEN_FILE_NAME),
        }
    }

    /// Path of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &Token) -> Result<()> {
        let data = serde_json::to_vec_pretty(token)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_private(&self.path, &data)?;
        debug!(path = %self.path.display(), "stored token");
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token kept in the OS keyring, serialized as JSON.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    user: String,
}

impl KeyringTokenStore {
    /// Store under the `go365` service.
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Store under another service name.
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: OAUTH_TOKEN_CREDENTIAL.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Ok(Entry::new(&self.service, &self.user)?)
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        match self.entry()?.get_password() {
            Ok(token_json) => Ok(Some(serde_json::from_str(&token_json)?)),
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "no token in keyring");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &Token) -> Result<()> {
        let token_json = serde_json::to_string(token)?;
        self.entry()?.set_password(&token_json)?;
        debug!(service = %self.service, "stored token in keyring");
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!("Failed to delete token from keyring: {e}");
                Err(e.into())
            }
        }
    }
}
