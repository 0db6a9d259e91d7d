//! Listing and running `go365-<name>` plugins.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Result, anyhow, bail};
use go365_core::plugin;
use tracing::debug;

pub fn list() -> Result<()> {
    render(&mut io::stdout().lock(), &plugin::list_plugins())?;
    Ok(())
}

fn render<W: Write>(out: &mut W, plugins: &[String]) -> io::Result<()> {
    if plugins.is_empty() {
        return writeln!(out, "No plugins found in PATH");
    }
    writeln!(out, "Available plugins:")?;
    for name in plugins {
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

/// Runs the plugin named by the first argument, passing the rest through.
///
/// The plugin's exit code becomes ours.
pub fn dispatch(args: Vec<OsString>) -> Result<ExitCode> {
    let mut args = args.into_iter();
    let Some(name) = args.next() else {
        bail!("missing command");
    };
    let name = name
        .into_string()
        .map_err(|n| anyhow!("unknown command {n:?} for \"go365\""))?;

    let status = match plugin::execute_plugin(&name, args) {
        Ok(status) => status,
        Err(go365_core::Error::PluginNotFound(_)) => {
            bail!("unknown command \"{name}\" for \"go365\"\nRun 'go365 --help' for usage.")
        }
        Err(e) => return Err(e.into()),
    };
    debug!(plugin = %name, %status, "plugin exited");

    Ok(status
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut buf = Vec::new();
        render(&mut buf, &["backup".into(), "teams".into()]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Available plugins:\n  - backup\n  - teams\n"
        );

        let mut buf = Vec::new();
        render(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No plugins found in PATH\n");
    }

    #[test]
    fn test_missing_plugin_is_unknown_command() {
        let err = dispatch(vec!["no-such-plugin-7c2e".into(), "--flag".into()]).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("unknown command \"no-such-plugin-7c2e\" for \"go365\"")
        );
    }
}
