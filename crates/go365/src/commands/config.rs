//! `config set` and `config show`.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use go365_core::Config;

use super::Session;
use crate::cli::ConfigSetArgs;

pub fn set(session: &Session, args: ConfigSetArgs) -> Result<()> {
    let mut config = session.config()?;
    apply(&mut config, args);
    session
        .manager()
        .save(&config)
        .context("failed to save config")?;
    println!("Configuration saved successfully!");
    Ok(())
}

/// Overwrites the fields given on the command line.
fn apply(config: &mut Config, args: ConfigSetArgs) {
    if let Some(tenant_id) = args.tenant_id.filter(|v| !v.is_empty()) {
        config.tenant_id = tenant_id;
    }
    if let Some(client_id) = args.client_id.filter(|v| !v.is_empty()) {
        config.client_id = client_id;
    }
    if let Some(scopes) = args.scopes {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !scopes.is_empty() {
            config.scopes = scopes;
        }
    }
    if let Some(storage) = args.token_storage {
        config.token_storage = storage;
    }
}

pub fn show(session: &Session) -> Result<()> {
    let config = session.config()?;
    render(&mut io::stdout().lock(), &config)?;
    println!("Config file: {}", session.manager().path().display());
    Ok(())
}

fn render<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    writeln!(out, "Tenant ID: {}", config.tenant_id)?;
    writeln!(out, "Client ID: {}", config.client_id)?;
    writeln!(out, "Scopes: {}", config.scopes.join(" "))?;
    writeln!(out, "Token storage: {}", config.token_storage)
}
