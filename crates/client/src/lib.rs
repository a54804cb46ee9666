//! Top-level client orchestrating the game client and a frontend.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   ├─→ GameClient (wallet session, chain sync, actions)
//!   └─→ Frontend (UI layer - CLI, GUI, etc.)
//! ```
//!
//! The game client is assembled by `client-bootstrap`, the frontend by its
//! own crate, and both are injected here through [`ClientBuilder`].

mod builder;

pub use builder::ClientBuilder;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::{Result, anyhow};
use runtime::GameClient;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() receives the independently built layers
/// 2. Client::run() hands the game client to the frontend on its own task
/// 3. The frontend drives the client until the user quits
pub struct Client {
    client: GameClient,
    frontend: Box<dyn Frontend>,
}

impl Client {
    /// Create a new ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run the frontend until it returns.
    ///
    /// # Errors
    ///
    /// Returns the frontend's error, or an error if its task panicked.
    pub async fn run(self) -> Result<()> {
        let Client {
            client,
            mut frontend,
        } = self;

        let frontend_task = tokio::spawn(async move { frontend.run(client).await });

        match frontend_task.await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::error!("Frontend error: {:#}", e);
                }
                result
            }
            Err(e) => {
                tracing::error!("Frontend task failed: {}", e);
                Err(anyhow!("frontend task failed: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use async_trait::async_trait;
    use client_blockchain_core::{Address, MockChain};
    use runtime::Step;

    struct ScriptedFrontend {
        steps: Arc<std::sync::Mutex<Vec<Step>>>,
    }

    #[async_trait]
    impl Frontend for ScriptedFrontend {
        async fn run(&mut self, mut client: GameClient) -> Result<()> {
            client.connect().await?;
            client.create_game().await?;
            self.steps.lock().unwrap().push(client.step());
            Ok(())
        }
    }

    struct PanickingFrontend;

    #[async_trait]
    impl Frontend for PanickingFrontend {
        async fn run(&mut self, _client: GameClient) -> Result<()> {
            panic!("render failure");
        }
    }

    fn game_client() -> GameClient {
        let chain = MockChain::new(vec![Address::from_bytes([0x1a; 20])]);
        GameClient::builder()
            .wallet(Arc::new(chain.clone()))
            .contract(Arc::new(chain))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_frontend_drives_game_client() {
        let steps = Arc::new(std::sync::Mutex::new(Vec::new()));
        let client = Client::builder()
            .game_client(game_client())
            .frontend(ScriptedFrontend {
                steps: steps.clone(),
            })
            .build()
            .unwrap();

        client.run().await.unwrap();
        assert_eq!(*steps.lock().unwrap(), vec![Step::JoinGame]);
    }

    #[tokio::test]
    async fn test_frontend_panic_becomes_error() {
        let client = Client::builder()
            .game_client(game_client())
            .frontend(PanickingFrontend)
            .build()
            .unwrap();

        let err = client.run().await.unwrap_err();
        assert!(err.to_string().contains("frontend task failed"));
    }
}
