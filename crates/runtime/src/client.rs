//! High-level client orchestrator.
//!
//! [`GameClient`] owns the session manager and the synchronizer, reacts to
//! wallet and contract notifications, and exposes the player's actions. It is
//! driven by one task: the frontend alternates between user commands and
//! [`GameClient::next_event`] / [`GameClient::handle_event`].

use std::sync::Arc;

use client_blockchain_core::{
    CombatOutcome, ContractEvent, GameCode, GameContract, NetworkParams, WalletEvent,
    WalletProvider,
};
use tokio::sync::{broadcast, watch};

use crate::error::{Result, RuntimeError};
use crate::events::{Event, EventBus, GameEvent, Topic};
use crate::repository::{GameCodeRepository, InMemoryGameCodeRepository};
use crate::session::{Session, SessionManager, recv_or_pending};
use crate::state::{GameState, Unit, UnitLoadout};
use crate::step::{Step, derive_step};
use crate::sync::GameSynchronizer;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The one network writes are allowed on.
    pub network: NetworkParams,
    pub event_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::sepolia(),
            event_buffer_size: 64,
        }
    }
}

/// Notification from one of the client's external sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Wallet(WalletEvent),
    Contract(ContractEvent),
}

pub struct GameClient {
    sessions: SessionManager,
    sync: GameSynchronizer,
    contract_events: Option<broadcast::Receiver<ContractEvent>>,
    bus: EventBus,
    contract_name: String,
}

impl GameClient {
    pub fn builder() -> GameClientBuilder {
        GameClientBuilder::new()
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn session(&self) -> Option<&Session> {
        self.sessions.session()
    }

    pub fn state(&self) -> GameState {
        self.sync.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<GameState> {
        self.sync.watch()
    }

    /// Current phase, derived from the latest session and state.
    pub fn step(&self) -> Step {
        derive_step(self.session(), &self.state())
    }

    pub fn network(&self) -> &NetworkParams {
        self.sessions.network()
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn has_wallet(&self) -> bool {
        self.sessions.has_wallet()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Connect the wallet and load the player's game.
    pub async fn connect(&mut self) -> Result<Session> {
        let session = self.sessions.connect().await?;
        if let Err(err) = self.refresh_with_recovery().await {
            tracing::warn!("Initial refresh failed: {}", err);
        }
        Ok(session)
    }

    pub fn disconnect(&mut self) {
        self.sessions.disconnect();
        self.sync.reset();
    }

    /// Switch the wallet to the required network.
    pub async fn switch_network(&mut self) -> Result<()> {
        self.sessions.require_session()?;
        self.sessions.switch_network().await
    }

    // ------------------------------------------------------------------
    // Synchronization
    // ------------------------------------------------------------------

    /// Re-read the game from the chain.
    ///
    /// An invalid session clears the state and is retried once after one
    /// reconnect attempt. Other failures keep the existing state.
    pub async fn refresh(&mut self) -> Result<GameState> {
        let state = self.refresh_with_recovery().await?;
        self.bus.publish(GameEvent::StateRefreshed);
        Ok(state)
    }

    async fn refresh_with_recovery(&mut self) -> Result<GameState> {
        let first = match self.sessions.verify().await {
            Ok(()) | Err(RuntimeError::NotConnected) => {
                self.sync.refresh(self.sessions.session()).await
            }
            Err(err) => Err(err),
        };

        match first {
            Err(err) if err.is_session_invalid() => {
                tracing::warn!("Session invalid during refresh, reconnecting: {}", err);
                self.sync.reset();
                self.sessions.disconnect();
                self.sessions.connect().await?;
                self.sync.refresh(self.sessions.session()).await
            }
            other => other,
        }
    }

    /// Refresh after a confirmed write; the write itself already succeeded.
    async fn refresh_after_write(&mut self) {
        if let Err(err) = self.refresh_with_recovery().await {
            tracing::warn!("Refresh after transaction failed: {}", err);
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub async fn create_game(&mut self) -> Result<GameCode> {
        self.sessions.require_writable()?;
        let code = self.sync.create_game().await?;
        self.refresh_after_write().await;
        Ok(code)
    }

    pub async fn join_game(&mut self, input: &str) -> Result<GameCode> {
        self.sessions.require_writable()?;
        let code = self.sync.join_game(input).await?;
        self.refresh_after_write().await;
        Ok(code)
    }

    pub async fn deploy_unit(&mut self, loadout: UnitLoadout) -> Result<Unit> {
        self.sessions.require_writable()?;
        let unit = self.sync.deploy_unit(loadout).await?;
        self.refresh_after_write().await;
        Ok(unit)
    }

    pub async fn attack(&mut self) -> Result<()> {
        let session = self.sessions.require_writable()?.clone();
        self.sync.attack(&session).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn reveal_outcome(&mut self) -> Result<CombatOutcome> {
        self.sessions.require_writable()?;
        let outcome = self.sync.reveal_outcome().await?;
        self.refresh_after_write().await;
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Wait for the next wallet or contract notification.
    ///
    /// Cancel-safe: intended to be raced against user input in `select!`.
    pub async fn next_event(&mut self) -> ClientEvent {
        let contract_events = &mut self.contract_events;
        let contract = async move {
            loop {
                let Some(receiver) = contract_events.as_mut() else {
                    return std::future::pending::<ContractEvent>().await;
                };
                match recv_or_pending(receiver).await {
                    Some(event) => return event,
                    None => *contract_events = None,
                }
            }
        };

        tokio::select! {
            event = self.sessions.next_event() => ClientEvent::Wallet(event),
            event = contract => ClientEvent::Contract(event),
        }
    }

    /// Apply a notification to the session and state.
    pub async fn handle_event(&mut self, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::Wallet(WalletEvent::AccountsChanged(accounts)) => {
                match accounts.first() {
                    None => self.disconnect(),
                    Some(&address) => {
                        self.sessions.switch_account(address);
                        self.refresh_with_recovery().await?;
                    }
                }
            }
            ClientEvent::Wallet(WalletEvent::ChainChanged(chain_id)) => {
                self.sessions.on_chain_changed(chain_id);
            }
            ClientEvent::Contract(ContractEvent::PlayerJoined { code, player }) => {
                tracing::debug!("PlayerJoined {} in {}", player, code);
                self.bus.publish(GameEvent::PlayerJoined { code, player });
                self.refresh_with_recovery().await?;
            }
            ClientEvent::Contract(ContractEvent::GameCreated { code, creator }) => {
                tracing::trace!("GameCreated {} by {}", code, creator);
            }
        }
        Ok(())
    }
}

/// Builder for [`GameClient`].
pub struct GameClientBuilder {
    config: ClientConfig,
    wallet: Option<Arc<dyn WalletProvider>>,
    contract: Option<Arc<dyn GameContract>>,
    repository: Option<Arc<dyn GameCodeRepository>>,
}

impl GameClientBuilder {
    fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            wallet: None,
            contract: None,
            repository: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn network(mut self, network: NetworkParams) -> Self {
        self.config.network = network;
        self
    }

    /// Wallet capability (optional; without it `connect` fails).
    pub fn wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Game contract (required).
    pub fn contract(mut self, contract: Arc<dyn GameContract>) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Game code cache. Defaults to an in-memory slot.
    pub fn repository(mut self, repository: Arc<dyn GameCodeRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn build(self) -> Result<GameClient> {
        let contract = self.contract.ok_or(RuntimeError::MissingContract)?;
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryGameCodeRepository::new()));

        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let contract_events = Some(contract.subscribe());
        let contract_name = contract.name().to_string();

        let sessions = SessionManager::new(self.wallet, self.config.network.clone(), bus.clone());
        let sync = GameSynchronizer::new(contract, repository, self.config.network, bus.clone());

        tracing::debug!("Game client built for contract {}", contract_name);

        Ok(GameClient {
            sessions,
            sync,
            contract_events,
            bus,
            contract_name,
        })
    }
}
