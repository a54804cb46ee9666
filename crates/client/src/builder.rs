//! Client builder with dependency injection pattern.

use crate::{Client, Frontend};
use anyhow::{Context, Result};
use runtime::GameClient;

/// Builder for constructing a Client with proper validation.
///
/// Both the game client and the frontend are required; missing either fails
/// `build()`.
#[derive(Default)]
pub struct ClientBuilder {
    client: Option<GameClient>,
    frontend: Option<Box<dyn Frontend>>,
}

impl ClientBuilder {
    /// Create a new ClientBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the game client (required).
    ///
    /// It should be constructed via `RuntimeBuilder` from the `client-bootstrap` crate.
    pub fn game_client(mut self, client: GameClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the frontend (required).
    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    /// Build the Client.
    ///
    /// # Errors
    ///
    /// Returns an error if the game client or the frontend is not set.
    pub fn build(self) -> Result<Client> {
        let client = self
            .client
            .context("Game client is required. Use .game_client() to set it.")?;

        let frontend = self
            .frontend
            .context("Frontend is required. Use .frontend() to set it.")?;

        Ok(Client { client, frontend })
    }
}
