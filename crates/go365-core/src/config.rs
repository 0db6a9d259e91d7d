//! Persistent CLI configuration.
//!
//! Everything lives in one directory, `~/.go365` unless `GO365_CONFIG_DIR`
//! points elsewhere: `config.json` and, with file token storage,
//! `token.json`. The directory is private to the user (0700) and files are
//! written 0600.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::credentials::{FileTokenStore, KeyringTokenStore, TokenStore};
use crate::error::{Error, Result};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "GO365_CONFIG_DIR";

/// Directory name under the home directory.
pub const CONFIG_DIR_NAME: &str = ".go365";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Scope used when none is configured.
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Where OAuth tokens are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    /// `token.json` in the configuration directory.
    #[default]
    File,
    /// The OS credential store.
    Keyring,
}

impl fmt::Display for TokenStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Keyring => "keyring",
        })
    }
}

impl FromStr for TokenStorage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            other => Err(Error::Config(format!(
                "unknown token storage {other:?} (expected file or keyring)"
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Entra ID tenant (GUID, domain, `common`, `organizations`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    /// Application (client) id of the app registration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    /// Requested scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Token storage backend.
    #[serde(default)]
    pub token_storage: TokenStorage,
}

impl Config {
    /// Whether both the tenant and the client id are set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.tenant_id.is_empty() && !self.client_id.is_empty()
    }

    fn with_defaults(mut self) -> Self {
        if self.scopes.is_empty() {
            self.scopes = vec![DEFAULT_SCOPE.to_string()];
        }
        self
    }
}

/// Loads and saves [`Config`] in a configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    dir: PathBuf,
}

impl ConfigManager {
    /// Uses `GO365_CONFIG_DIR`, falling back to `~/.go365`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_dir(dir));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("failed to get home directory".into()))?;
        Ok(Self::with_dir(home.join(CONFIG_DIR_NAME)))
    }

    /// Uses the given directory.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The configuration directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `config.json`.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let path = self.path();
        match fs::read(&path) {
            Ok(data) => {
                let config: Config = serde_json::from_slice(&data)?;
                Ok(config.with_defaults())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Config::default().with_defaults())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the configuration as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, config: &Config) -> Result<()> {
        let data = serde_json::to_vec_pretty(config)?;
        self.ensure_dir()?;
        write_private(&self.path(), &data)?;
        debug!(path = %self.path().display(), "saved config");
        Ok(())
    }

    /// Creates the directory with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir)?;
        Ok(())
    }

    /// Token store selected by `config.token_storage`.
    #[must_use]
    pub fn token_store(&self, config: &Config) -> Box<dyn TokenStore> {
        match config.token_storage {
            TokenStorage::File => Box::new(FileTokenStore::new(&self.dir)),
            TokenStorage::Keyring => Box::new(KeyringTokenStore::new()),
        }
    }
}

/// Writes `data` to `path`, readable by the owner only.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    io::Write::write_all(&mut options.open(path)?, data)
}
