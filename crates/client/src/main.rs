//! Encrypted Warriors client binary.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. GameClient (wallet session, chain sync) via RuntimeBuilder
//! 2. Frontend (UI) - CLI, GUI, etc.
//!
//! Both are built independently and injected into the Client container.
//!
//! # Features
//!
//! - `frontend-cli`: Terminal UI (default)
//!
//! # Examples
//!
//! ```bash
//! # Local simulated chain with the default accounts
//! cargo run -p warriors-client
//!
//! # Read-only session without a wallet
//! WALLET=none cargo run -p warriors-client
//! ```

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    #[cfg(feature = "frontend-cli")]
    {
        run_cli().await?;
    }

    #[cfg(not(feature = "frontend-cli"))]
    {
        compile_error!("At least one frontend feature must be enabled (frontend-cli, etc.)");
    }

    Ok(())
}

/// Run the CLI frontend.
#[cfg(feature = "frontend-cli")]
async fn run_cli() -> Result<()> {
    use client_bootstrap::{RuntimeBuilder, RuntimeConfig};
    use client_frontend_cli::{CliConfig, CliFrontend, FrontendConfig, logging};
    use warriors_client::Client;

    // 1. Load configuration from environment
    let runtime_config = RuntimeConfig::from_env();
    let frontend_config = FrontendConfig::from_env();
    let cli_config = CliConfig::from_env();

    // 2. Setup logging
    logging::setup_logging(&runtime_config.session_id)?;

    tracing::info!("Starting Encrypted Warriors client");
    tracing::info!("Session ID: {:?}", runtime_config.session_id);
    tracing::info!(
        "Network: {} ({})",
        runtime_config.network.chain_name,
        runtime_config.network.chain_id
    );
    tracing::info!("Wallet backend: {:?}", runtime_config.wallet);
    tracing::info!("Game code cache persisted: {}", runtime_config.cache.persist);

    // The account after the active one plays the opponent on a local chain
    let opponent = runtime_config.local_accounts.get(1).copied();

    // 3. Build GameClient (independent layer)
    tracing::debug!("Building game client...");
    let setup = RuntimeBuilder::new().config(runtime_config).build().await?;

    tracing::info!("Game client built successfully");

    // 4. Build Frontend (independent layer)
    tracing::debug!("Building CLI frontend...");
    let mut frontend = CliFrontend::new(frontend_config, cli_config);
    match (setup.chain, opponent) {
        (Some(chain), Some(address)) => {
            tracing::info!("Local opponent account: {}", address);
            frontend = frontend.with_local_opponent(chain, address);
        }
        (Some(_), None) => {
            tracing::debug!("Single local account configured; opponent command disabled");
        }
        (None, _) => {}
    }

    // 5. Build and run
    let client = Client::builder()
        .game_client(setup.client)
        .frontend(frontend)
        .build()?;

    tracing::info!("Client assembled, starting...");
    client.run().await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}
