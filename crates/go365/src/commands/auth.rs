//! `login`, `logout` and `status`.

use anyhow::{Context as _, Result, anyhow, bail, ensure};
use go365_core::Authenticator;
use go365_oauth::{DeviceAuthorization, PkceChallenge};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use url::Url;

use super::Session;
use crate::cli::LoginArgs;

pub async fn login(session: &Session, args: &LoginArgs) -> Result<()> {
    let config = session.config()?;
    ensure!(
        config.is_complete(),
        "client ID and tenant ID must be configured. Use 'go365 config set' to configure"
    );
    let auth = session.authenticator()?;

    if args.browser {
        login_with_browser(&auth).await?;
    } else {
        auth.login_with_device_code(print_device_prompt)
            .await
            .context("authentication failed")?;
    }
    println!("Successfully authenticated!");
    Ok(())
}

fn print_device_prompt(authorization: &DeviceAuthorization) {
    match &authorization.message {
        Some(message) => println!("{message}"),
        None => println!(
            "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
            authorization.verification_uri, authorization.user_code
        ),
    }
}

async fn login_with_browser(auth: &Authenticator) -> Result<()> {
    let state = PkceChallenge::generate().verifier().to_string();
    let url = auth
        .authorization_url(&state)
        .context("failed to build sign-in URL")?;

    println!("Opening your browser to sign in. If it does not open, visit:\n\n  {url}\n");
    if let Err(e) = opener::open(url.as_str()) {
        warn!(error = %e, "could not open browser");
    }
    println!("After signing in, paste the address your browser was redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read redirect address")?;

    let code = authorization_code(line.trim(), &state)?;
    auth.exchange_code(&code)
        .await
        .context("authentication failed")?;
    Ok(())
}

/// Pulls the code out of a pasted redirect address, or accepts a bare code.
fn authorization_code(input: &str, expected_state: &str) -> Result<String> {
    ensure!(!input.is_empty(), "no authorization code given");
    let Ok(url) = Url::parse(input) else {
        return Ok(input.to_string());
    };

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };
    if let Some(error) = param("error") {
        let description = param("error_description").unwrap_or_default();
        bail!("sign-in was rejected: {error} {description}");
    }
    if let Some(state) = param("state") {
        ensure!(state == expected_state, "state mismatch in redirect address");
    }
    param("code").ok_or_else(|| anyhow!("redirect address has no code parameter"))
}

pub fn logout(session: &Session) -> Result<()> {
    let config = session.config()?;
    session
        .manager()
        .token_store(&config)
        .delete()
        .context("logout failed")?;
    println!("Successfully logged out!");
    Ok(())
}

pub async fn status(session: &Session) -> Result<()> {
    let config = session.config()?;
    if !config.is_complete() {
        debug!("tenant or client ID not configured");
        println!("Status: Not authenticated");
        return Ok(());
    }

    let auth = session.authenticator()?;
    if !auth.is_authenticated().await {
        println!("Status: Not authenticated");
        return Ok(());
    }
    println!("Status: Authenticated");

    let client = session.graph().await?;
    match client.get_me().await {
        Ok(me) => {
            if let Some(name) = me.get("displayName").and_then(|v| v.as_str()) {
                println!("User: {name}");
            }
            if let Some(upn) = me.get("userPrincipalName").and_then(|v| v.as_str()) {
                println!("Email: {upn}");
            }
        }
        Err(e) => println!("Warning: Could not retrieve user info: {e}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_redirect() {
        let code =
            authorization_code("http://localhost/?code=M.C123&state=s1&session_state=x", "s1")
                .unwrap();
        assert_eq!(code, "M.C123");
    }

    #[test]
    fn test_bare_code() {
        assert_eq!(authorization_code("M.C123", "s1").unwrap(), "M.C123");
        assert!(authorization_code("", "s1").is_err());
    }

    #[test]
    fn test_state_mismatch() {
        let err = authorization_code("http://localhost/?code=abc&state=other", "s1").unwrap_err();
        assert!(err.to_string().contains("state mismatch"));
    }

    #[test]
    fn test_error_redirect() {
        let err = authorization_code(
            "http://localhost/?error=access_denied&error_description=User+cancelled",
            "s1",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "sign-in was rejected: access_denied User cancelled");
    }

    #[test]
    fn test_redirect_without_code() {
        assert!(authorization_code("http://localhost/?state=s1", "s1").is_err());
    }
}
