//! Builds the game client, chain handles, and config bundle used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::{BlockchainConfig, MockChain};
use runtime::{FileGameCodeRepository, GameClient, GameCodeRepository, InMemoryGameCodeRepository};

use crate::chain::{ChainFactory, LocalChainFactory};
use crate::config::RuntimeConfig;

/// Builder that assembles the wallet, contract, cache and configuration for clients.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    chain_factory: Option<Arc<dyn ChainFactory>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            chain_factory: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a custom chain factory (e.g., an RPC-backed wallet and contract).
    pub fn chain_factory(mut self, factory: impl ChainFactory + 'static) -> Self {
        self.chain_factory = Some(Arc::new(factory));
        self
    }

    pub async fn build(self) -> Result<RuntimeSetup> {
        self.config
            .network
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid network configuration")?;

        let factory = self.chain_factory.unwrap_or_else(|| {
            Arc::new(LocalChainFactory::new(
                self.config.wallet,
                self.config.local_accounts.clone(),
            ))
        });
        let chain = factory.build();

        let repository = game_code_repository(&self.config)?;

        let mut builder = GameClient::builder()
            .config(self.config.client_config())
            .contract(chain.contract)
            .repository(repository);

        if let Some(wallet) = chain.wallet {
            builder = builder.wallet(wallet);
        } else {
            tracing::info!("No wallet capability configured");
        }

        let client = builder.build().context("Failed to build game client")?;

        tracing::info!(
            "Game client ready: contract={}, network={} ({})",
            client.contract_name(),
            self.config.network.network_name(),
            self.config.network.chain_id
        );

        Ok(RuntimeSetup {
            config: self.config,
            client,
            chain: chain.local,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn game_code_repository(config: &RuntimeConfig) -> Result<Arc<dyn GameCodeRepository>> {
    if !config.cache.persist {
        tracing::debug!("Game code cache kept in memory");
        return Ok(Arc::new(InMemoryGameCodeRepository::new()));
    }

    let repository = FileGameCodeRepository::new(&config.cache.path).with_context(|| {
        format!(
            "Failed to open game code cache at {}",
            config.cache.path.display()
        )
    })?;
    tracing::debug!("Game code cache: {}", repository.path().display());
    Ok(Arc::new(repository))
}

pub struct RuntimeSetup {
    pub config: RuntimeConfig,
    pub client: GameClient,
    /// Handle to the simulated chain when running locally.
    pub chain: Option<MockChain>,
}
