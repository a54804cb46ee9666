//! Game state synchronization.
//!
//! [`GameSynchronizer`] folds contract reads into a [`GameState`] snapshot and
//! submits the game's transactions. The snapshot lives in a `watch` channel
//! and every update replaces it in a single step, so readers see either the
//! old or the new state, never a mix.
//!
//! Write operations only wait for confirmation; the caller refreshes
//! afterwards so session recovery stays in one place.

use std::sync::Arc;

use client_blockchain_core::{
    Address, CombatOutcome, ContractError, EncryptedInput, GameCode, GameContract, GameInfo,
    InputProof, NetworkParams, PendingTransaction, TransactionReceipt, TransactionStatus,
};
use tokio::sync::watch;

use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, GameEvent, TransactionEvent, TxAction};
use crate::repository::GameCodeRepository;
use crate::session::Session;
use crate::state::{GameState, Unit, UnitLoadout};

/// Outcome submitted by [`GameSynchronizer::reveal_outcome`].
///
/// Placeholder until combat is resolved from the encrypted unit stats; it is
/// not derived from anything.
pub const DEMO_OUTCOME: CombatOutcome = CombatOutcome::AttackerWins;

/// Chain facts one refresh is built from.
struct Observation {
    code: GameCode,
    info: GameInfo,
    outcome: Option<CombatOutcome>,
}

pub struct GameSynchronizer {
    contract: Arc<dyn GameContract>,
    repository: Arc<dyn GameCodeRepository>,
    network: NetworkParams,
    state: watch::Sender<GameState>,
    bus: EventBus,
}

impl GameSynchronizer {
    pub fn new(
        contract: Arc<dyn GameContract>,
        repository: Arc<dyn GameCodeRepository>,
        network: NetworkParams,
        bus: EventBus,
    ) -> Self {
        let (state, _) = watch::channel(GameState::empty());
        Self {
            contract,
            repository,
            network,
            state,
            bus,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> GameState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied snapshot.
    pub fn watch(&self) -> watch::Receiver<GameState> {
        self.state.subscribe()
    }

    /// Rebuild the snapshot from the chain.
    ///
    /// Without a session the state becomes empty. On failure the existing
    /// state is left untouched.
    pub async fn refresh(&self, session: Option<&Session>) -> Result<GameState> {
        let observation = match session {
            Some(session) => self.observe(&session.address).await?,
            None => None,
        };

        let mut second_player = None;
        self.state.send_if_modified(|current| {
            let next = match &observation {
                Some(observed) => GameState::observed(
                    current,
                    observed.code.clone(),
                    observed.info,
                    observed.outcome,
                ),
                None => GameState::empty(),
            };
            if *current == next {
                return false;
            }

            // Only a join into the game already shown counts
            if current.game_code == next.game_code
                && current.players_joined == 1
                && next.players_joined == 2
            {
                second_player = next.game_code.clone().zip(next.player2);
            }
            *current = next;
            true
        });

        if let Some((code, player2)) = second_player {
            tracing::info!("Second player {} joined game {}", player2, code);
            self.bus
                .publish(GameEvent::SecondPlayerJoined { code, player2 });
        }

        Ok(self.state())
    }

    async fn observe(&self, address: &Address) -> Result<Option<Observation>> {
        let Some(code) = self.resolve_code(address).await? else {
            return Ok(None);
        };

        let info = self
            .contract
            .get_game(&code)
            .await
            .map_err(RuntimeError::from_read)?;
        if info.creator.is_zero() {
            tracing::debug!("Game {} has no creator on-chain", code);
            return Ok(None);
        }

        let outcome = match self.contract.last_combat_outcome().await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::debug!("Combat outcome unavailable: {}", err);
                None
            }
        };

        Ok(Some(Observation {
            code,
            info,
            outcome,
        }))
    }

    /// Code from the player index, falling back to the local cache when the
    /// index has not caught up yet.
    async fn resolve_code(&self, address: &Address) -> Result<Option<GameCode>> {
        let code = self
            .contract
            .player_game_code(address)
            .await
            .map_err(RuntimeError::from_read)?;
        if !code.is_zero() {
            return Ok(Some(code));
        }

        match self.repository.load() {
            Ok(cached) => {
                let cached = cached.filter(|code| !code.is_zero());
                if let Some(code) = &cached {
                    tracing::debug!("Player index empty, using cached game code {}", code);
                }
                Ok(cached)
            }
            Err(err) => {
                tracing::warn!("Failed to read cached game code: {}", err);
                Ok(None)
            }
        }
    }

    /// Replace the state with the empty snapshot.
    pub fn reset(&self) {
        let modified = self.state.send_if_modified(|current| {
            if current.is_empty() {
                return false;
            }
            *current = GameState::empty();
            true
        });
        if modified {
            tracing::debug!("Game state reset");
            self.bus.publish(GameEvent::StateReset);
        }
    }

    /// Create a new game; the state is reset before the transaction is sent.
    pub async fn create_game(&self) -> Result<GameCode> {
        self.reset();

        let receipt = self
            .confirm(TxAction::CreateGame, self.contract.create_game().await)
            .await?;
        let code = receipt
            .created_game()
            .cloned()
            .ok_or_else(|| RuntimeError::Contract("GameCreated event missing".to_string()))?;

        self.remember(&code);
        tracing::info!("Created game {}", code);
        self.bus.publish(GameEvent::GameCreated { code: code.clone() });
        Ok(code)
    }

    /// Join the game identified by user input.
    pub async fn join_game(&self, input: &str) -> Result<GameCode> {
        let code = normalize_join_code(input)?;

        self.confirm(TxAction::JoinGame, self.contract.join_game(&code).await)
            .await?;

        self.remember(&code);
        tracing::info!("Joined game {}", code);
        self.bus.publish(GameEvent::GameJoined { code: code.clone() });
        Ok(code)
    }

    /// Deploy a unit and record it locally once confirmed.
    pub async fn deploy_unit(&self, loadout: UnitLoadout) -> Result<Unit> {
        loadout.validate()?;

        let (attack, attack_proof) = (EncryptedInput::placeholder(), InputProof::placeholder());
        let (defense, defense_proof) = (EncryptedInput::placeholder(), InputProof::placeholder());
        let submitted = self
            .contract
            .deploy_unit(&attack, &attack_proof, &defense, &defense_proof)
            .await;
        self.confirm(TxAction::DeployUnit, submitted).await?;

        let unit = loadout.into_deployed();
        self.state.send_modify(|state| state.my_unit = Some(unit.clone()));

        tracing::info!(
            "Deployed {} (attack {}, defense {})",
            unit.unit_type,
            unit.attack,
            unit.defense
        );
        self.bus.publish(GameEvent::UnitDeployed {
            unit_type: unit.unit_type,
            attack: unit.attack,
            defense: unit.defense,
        });
        Ok(unit)
    }

    /// Attack the other participant of the current game.
    pub async fn attack(&self, session: &Session) -> Result<()> {
        let (player1, player2) = {
            let state = self.state.borrow();
            (state.player1, state.player2)
        };
        let (Some(player1), Some(player2)) = (player1, player2) else {
            return Err(RuntimeError::NoOpponent);
        };

        let attacker = session.address;
        let defender = if attacker == player1 { player2 } else { player1 };

        self.confirm(
            TxAction::Attack,
            self.contract.attack(&attacker, &defender).await,
        )
        .await?;

        tracing::info!("{} attacked {}", attacker, defender);
        self.bus.publish(GameEvent::Attacked { attacker, defender });
        Ok(())
    }

    /// Submit [`DEMO_OUTCOME`] as the combat result.
    pub async fn reveal_outcome(&self) -> Result<CombatOutcome> {
        let outcome = DEMO_OUTCOME;
        self.confirm(
            TxAction::RevealOutcome,
            self.contract.submit_combat_outcome(outcome).await,
        )
        .await?;

        tracing::info!("Revealed outcome: {}", outcome);
        self.bus.publish(GameEvent::OutcomeRevealed { outcome });
        Ok(outcome)
    }

    fn remember(&self, code: &GameCode) {
        if let Err(err) = self.repository.save(code) {
            tracing::warn!("Failed to cache game code {}: {}", code, err);
        }
    }

    /// Wait for a submitted transaction, publishing its lifecycle.
    async fn confirm(
        &self,
        action: TxAction,
        submitted: std::result::Result<PendingTransaction, ContractError>,
    ) -> Result<TransactionReceipt> {
        let result = self.await_receipt(action, submitted).await;
        if let Err(err) = &result {
            tracing::warn!("{} failed: {}", action, err);
            self.bus.publish(TransactionEvent::Failed {
                action,
                reason: err.to_string(),
            });
        }
        result
    }

    async fn await_receipt(
        &self,
        action: TxAction,
        submitted: std::result::Result<PendingTransaction, ContractError>,
    ) -> Result<TransactionReceipt> {
        let pending = submitted?;
        let transaction_id = pending.transaction_id;

        tracing::debug!("{} submitted: {}", action, transaction_id);
        self.bus.publish(TransactionEvent::Pending {
            action,
            transaction_id: transaction_id.clone(),
            explorer_url: self.network.transaction_url(&transaction_id),
        });

        let receipt = self.contract.wait_for_receipt(&transaction_id).await?;
        match &receipt.status {
            TransactionStatus::Confirmed { block_height } => {
                tracing::debug!("{} confirmed in block {}", action, block_height);
                self.bus.publish(TransactionEvent::Confirmed {
                    action,
                    transaction_id,
                });
                Ok(receipt)
            }
            TransactionStatus::Failed { error } => Err(RuntimeError::from_revert(error)),
            TransactionStatus::Pending => Err(RuntimeError::Contract(format!(
                "transaction {} is still pending",
                transaction_id
            ))),
        }
    }
}

/// Normalize a user-entered game code.
///
/// Surrounding whitespace is trimmed and a missing `0x` prefix is added.
/// Empty input and non-hex digits are rejected before any network call.
pub fn normalize_join_code(input: &str) -> Result<GameCode> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RuntimeError::InvalidCode("game code is empty".to_string()));
    }

    let prefixed = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        trimmed.to_string()
    } else {
        format!("0x{}", trimmed)
    };
    Ok(GameCode::parse(&prefixed)?)
}
