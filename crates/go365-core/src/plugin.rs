//! External `go365-<name>` subcommands found on `PATH`.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::debug;

use crate::error::{Error, Result};

/// Executable name prefix shared by all plugins.
pub const PLUGIN_PREFIX: &str = "go365-";

/// Locates the executable for plugin `name`.
///
/// # Errors
///
/// Returns [`Error::PluginNotFound`] if no `go365-<name>` is on `PATH`.
pub fn find_plugin(name: &str) -> Result<PathBuf> {
    which::which(format!("{PLUGIN_PREFIX}{name}")).map_err(|_| Error::PluginNotFound(name.into()))
}

/// Runs plugin `name` with `args`, inheriting stdin, stdout and stderr.
///
/// # Errors
///
/// Returns [`Error::PluginNotFound`] if the plugin is missing, or an I/O
/// error if it cannot be started.
pub fn execute_plugin<I, S>(name: &str, args: I) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let path = find_plugin(name)?;
    debug!(plugin = %path.display(), "running plugin");
    Ok(Command::new(path).args(args).status()?)
}

/// Names of all plugins on `PATH`, sorted, without the prefix.
#[must_use]
pub fn list_plugins() -> Vec<String> {
    std::env::var_os("PATH")
        .map(|path| list_plugins_in(&path))
        .unwrap_or_default()
}

/// Names of all plugins in the directories of a `PATH`-style list.
///
/// Unreadable directories are skipped; a name found in several
/// directories is listed once.
#[must_use]
pub fn list_plugins_in(path_var: &OsStr) -> Vec<String> {
    let mut names = BTreeSet::new();
    for dir in std::env::split_paths(path_var) {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(|n| n.strip_prefix(PLUGIN_PREFIX)) else {
                continue;
            };
            if !name.is_empty() && is_executable(&entry.path()) {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file())
}
