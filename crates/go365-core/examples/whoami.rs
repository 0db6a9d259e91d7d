//! Example: print the signed-in user's profile.
//!
//! Uses the configuration and token left by `go365 login`.
//!
//! ```bash
//! cargo run -p go365-core --example whoami
//! ```

use go365_core::{Authenticator, ConfigManager};
use go365_graph::GraphClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    let auth = Authenticator::new(&config, manager.token_store(&config))?;

    let Ok(access_token) = auth.access_token().await else {
        eprintln!("Not authenticated. Please run 'go365 login' first.");
        std::process::exit(1);
    };

    let me = GraphClient::new(access_token).get_me().await?;
    println!("Current User Information:");
    println!("{}", serde_json::to_string_pretty(&me)?);
    Ok(())
}
