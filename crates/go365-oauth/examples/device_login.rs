//! Example: sign in with the device code flow and print the granted token.
//!
//! ```bash
//! export GO365_CLIENT_ID="your-app-registration-id"
//! export GO365_TENANT_ID="common"
//! cargo run -p go365-oauth --example device_login
//! ```

use go365_oauth::{DeviceFlow, OAuthClient, Provider};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client_id = env::var("GO365_CLIENT_ID")?;
    let tenant = env::var("GO365_TENANT_ID").unwrap_or_else(|_| "common".to_string());

    let provider = Provider::microsoft(&tenant)?;
    let flow = DeviceFlow::new(OAuthClient::new(client_id, provider));

    let (_, token) = flow
        .authorize(None, 0, |auth| match &auth.message {
            Some(message) => println!("{message}"),
            None => println!(
                "Open {} and enter the code {}",
                auth.verification_uri, auth.user_code
            ),
        })
        .await?;

    println!("Signed in. Token expires at {:?}", token.expires_at);
    println!("Scopes: {}", token.scope.as_deref().unwrap_or("(none reported)"));
    Ok(())
}
