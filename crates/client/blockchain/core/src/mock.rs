//! In-memory wallet and contract for tests and local play.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::traits::{
    ContractError, ContractEvents, GameContract, GameReader, GameWriter, WalletError,
    WalletProvider,
};
use crate::types::{
    Address, ChainId, CombatOutcome, ContractEvent, EncryptedInput, GameCode, GameInfo,
    InputProof, NetworkParams, PendingTransaction, TransactionId, TransactionReceipt,
    TransactionStatus, WalletEvent,
};

/// Revert reason of the contract when a creator joins their own game.
pub const CREATOR_JOIN_REVERT: &str = "Creator cannot join their own game";

/// Simulated chain with a wallet and one Encrypted Warriors contract.
///
/// Clones share state, so a test can keep one handle for scripting while the
/// client under test holds others as `dyn WalletProvider` / `dyn GameContract`.
/// Writes are signed by the first exposed account and confirm immediately.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
    wallet_tx: broadcast::Sender<WalletEvent>,
    contract_tx: broadcast::Sender<ContractEvent>,
}

struct ChainState {
    accounts: Vec<Address>,
    chain_id: ChainId,
    known_chains: Vec<ChainId>,

    // Failure injection
    reject_requests: bool,
    signer_unavailable: bool,
    unknown_account: bool,
    index_lag: bool,
    read_failure: Option<String>,
    revert_next_write: Option<String>,

    games: HashMap<GameCode, GameInfo>,
    player_codes: HashMap<Address, GameCode>,
    deployed: HashSet<Address>,
    combat_started: bool,
    last_outcome: CombatOutcome,

    receipts: HashMap<TransactionId, TransactionReceipt>,
    block_height: u64,
    games_created: u64,
    read_calls: u64,
    write_calls: u64,
}

impl MockChain {
    /// Chain on Sepolia with the given wallet accounts.
    pub fn new(accounts: Vec<Address>) -> Self {
        let sepolia = NetworkParams::sepolia().chain_id;
        let (wallet_tx, _) = broadcast::channel(64);
        let (contract_tx, _) = broadcast::channel(64);

        Self {
            state: Arc::new(Mutex::new(ChainState {
                accounts,
                chain_id: sepolia.clone(),
                known_chains: vec![sepolia, ChainId::new("0x1")],
                reject_requests: false,
                signer_unavailable: false,
                unknown_account: false,
                index_lag: false,
                read_failure: None,
                revert_next_write: None,
                games: HashMap::new(),
                player_codes: HashMap::new(),
                deployed: HashSet::new(),
                combat_started: false,
                last_outcome: CombatOutcome::NoCombat,
                receipts: HashMap::new(),
                block_height: 0,
                games_created: 0,
                read_calls: 0,
                write_calls: 0,
            })),
            wallet_tx,
            contract_tx,
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Scripting helpers
    // ------------------------------------------------------------------

    /// Change exposed accounts and notify subscribers.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state().accounts = accounts.clone();
        let _ = self.wallet_tx.send(WalletEvent::AccountsChanged(accounts));
    }

    /// Change the connected chain and notify subscribers.
    pub fn set_chain(&self, chain_id: ChainId) {
        self.state().chain_id = chain_id.clone();
        let _ = self.wallet_tx.send(WalletEvent::ChainChanged(chain_id));
    }

    /// Change the connected chain without notifying (wallet connected elsewhere).
    pub fn with_chain(self, chain_id: ChainId) -> Self {
        self.state().chain_id = chain_id;
        self
    }

    /// Forget a chain so `switch_chain` reports it as unrecognized.
    pub fn forget_chain(&self, chain_id: &ChainId) {
        self.state().known_chains.retain(|known| !known.matches(chain_id));
    }

    pub fn set_reject_requests(&self, reject: bool) {
        self.state().reject_requests = reject;
    }

    pub fn set_signer_unavailable(&self, unavailable: bool) {
        self.state().signer_unavailable = unavailable;
    }

    /// Make contract reads fail with an "unknown account" error.
    pub fn set_unknown_account(&self, unknown: bool) {
        self.state().unknown_account = unknown;
    }

    /// Make `player_game_code` lag behind writes (always returns zero).
    pub fn set_index_lag(&self, lag: bool) {
        self.state().index_lag = lag;
    }

    /// Make every contract read fail with a network error.
    pub fn set_read_failure(&self, message: Option<&str>) {
        self.state().read_failure = message.map(str::to_string);
    }

    /// Revert the next write with the given reason.
    pub fn revert_next_write(&self, reason: &str) {
        self.state().revert_next_write = Some(reason.to_string());
    }

    /// Insert a game directly, bypassing transactions.
    pub fn insert_game(&self, code: GameCode, creator: Address, player2: Option<Address>) {
        let mut state = self.state();
        state.player_codes.insert(creator, code.clone());
        if let Some(player2) = player2 {
            state.player_codes.insert(player2, code.clone());
        }
        state.games.insert(
            code,
            GameInfo {
                creator,
                player2: player2.unwrap_or(Address::ZERO),
            },
        );
    }

    /// Another player joins `code`, emitting `PlayerJoined`.
    pub fn join_as(&self, player: Address, code: &GameCode) -> Result<(), ContractError> {
        {
            let mut state = self.state();
            apply_join(&mut *state, player, code)?;
        }
        let _ = self.contract_tx.send(ContractEvent::PlayerJoined {
            code: code.clone(),
            player,
        });
        Ok(())
    }

    /// Number of contract reads served.
    pub fn read_calls(&self) -> u64 {
        self.state().read_calls
    }

    /// Number of contract writes submitted.
    pub fn write_calls(&self) -> u64 {
        self.state().write_calls
    }

    pub fn is_deployed(&self, player: &Address) -> bool {
        self.state().deployed.contains(player)
    }

    pub fn current_chain(&self) -> ChainId {
        self.state().chain_id.clone()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn begin_read(&self) -> Result<MutexGuard<'_, ChainState>, ContractError> {
        let mut state = self.state();
        state.read_calls += 1;

        if state.unknown_account {
            return Err(ContractError::UnknownAccount(
                "unknown account #0".to_string(),
            ));
        }
        if let Some(message) = &state.read_failure {
            return Err(ContractError::Network(message.clone()));
        }

        Ok(state)
    }

    /// Run a write as the current signer and store its receipt.
    fn write<F>(&self, apply: F) -> Result<PendingTransaction, ContractError>
    where
        F: FnOnce(&mut ChainState, Address) -> Result<Vec<ContractEvent>, ContractError>,
    {
        let (pending, events) = {
            let mut state = self.state();
            state.write_calls += 1;

            if state.reject_requests {
                return Err(ContractError::UserRejected);
            }
            let signer = *state
                .accounts
                .first()
                .ok_or_else(|| ContractError::UnknownAccount("no signer".to_string()))?;

            state.block_height += 1;
            let block_height = state.block_height;
            let transaction_id = transaction_id(block_height);

            let (status, events) = match state.revert_next_write.take() {
                Some(reason) => (TransactionStatus::Failed { error: reason }, Vec::new()),
                None => match apply(&mut *state, signer) {
                    Ok(events) => (TransactionStatus::Confirmed { block_height }, events),
                    Err(ContractError::Reverted(reason)) => {
                        (TransactionStatus::Failed { error: reason }, Vec::new())
                    }
                    Err(other) => return Err(other),
                },
            };

            if let TransactionStatus::Failed { error } = &status {
                tracing::debug!("Mock write {} reverted: {}", transaction_id, error);
            } else {
                tracing::trace!(
                    "Mock write {} by {} in block {}",
                    transaction_id,
                    signer,
                    block_height
                );
            }

            state.receipts.insert(
                transaction_id.clone(),
                TransactionReceipt {
                    transaction_id: transaction_id.clone(),
                    status,
                    events: events.clone(),
                },
            );

            (PendingTransaction { transaction_id }, events)
        };

        for event in events {
            let _ = self.contract_tx.send(event);
        }

        Ok(pending)
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn transaction_id(block_height: u64) -> TransactionId {
    let mut bytes = vec![0u8; 32];
    bytes[24..].copy_from_slice(&block_height.to_be_bytes());
    TransactionId::from_bytes(bytes)
}

fn game_code(sequence: u64) -> GameCode {
    let mut bytes = [0u8; GameCode::BYTE_LEN];
    bytes[0] = 0xc0;
    bytes[1] = 0xde;
    bytes[24..].copy_from_slice(&sequence.to_be_bytes());
    GameCode::from_bytes(bytes)
}

fn apply_join(state: &mut ChainState, player: Address, code: &GameCode) -> Result<(), ContractError> {
    let game = state
        .games
        .get_mut(code)
        .ok_or_else(|| ContractError::Reverted("Game not found".to_string()))?;

    if game.creator == player {
        return Err(ContractError::Reverted(CREATOR_JOIN_REVERT.to_string()));
    }
    if !game.player2.is_zero() {
        return Err(ContractError::Reverted("Game is full".to_string()));
    }

    game.player2 = player;
    state.player_codes.insert(player, code.clone());
    Ok(())
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let state = self.state();
        if state.reject_requests {
            return Err(WalletError::UserRejected);
        }
        Ok(state.accounts.clone())
    }

    async fn current_address(&self) -> Result<Address, WalletError> {
        let state = self.state();
        if state.signer_unavailable {
            return Err(WalletError::SignerUnavailable("wallet locked".to_string()));
        }
        state
            .accounts
            .first()
            .copied()
            .ok_or_else(|| WalletError::SignerUnavailable("no accounts exposed".to_string()))
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        Ok(self.state().chain_id.clone())
    }

    async fn switch_chain(&self, chain_id: &ChainId) -> Result<(), WalletError> {
        {
            let mut state = self.state();
            if state.reject_requests {
                return Err(WalletError::UserRejected);
            }
            if !state.known_chains.iter().any(|known| known.matches(chain_id)) {
                return Err(WalletError::UnrecognizedChain(chain_id.clone()));
            }
            state.chain_id = chain_id.clone();
        }
        let _ = self
            .wallet_tx
            .send(WalletEvent::ChainChanged(chain_id.clone()));
        Ok(())
    }

    async fn add_chain(&self, params: &NetworkParams) -> Result<(), WalletError> {
        {
            let mut state = self.state();
            if state.reject_requests {
                return Err(WalletError::UserRejected);
            }
            state.known_chains.push(params.chain_id.clone());
            state.chain_id = params.chain_id.clone();
        }
        let _ = self
            .wallet_tx
            .send(WalletEvent::ChainChanged(params.chain_id.clone()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.wallet_tx.subscribe()
    }
}

#[async_trait]
impl GameReader for MockChain {
    async fn player_game_code(&self, player: &Address) -> Result<GameCode, ContractError> {
        let state = self.begin_read()?;
        if state.index_lag {
            return Ok(GameCode::zero());
        }
        Ok(state
            .player_codes
            .get(player)
            .cloned()
            .unwrap_or_else(GameCode::zero))
    }

    async fn get_game(&self, code: &GameCode) -> Result<GameInfo, ContractError> {
        let state = self.begin_read()?;
        state
            .games
            .get(code)
            .copied()
            .ok_or_else(|| ContractError::Reverted("Game not found".to_string()))
    }

    async fn last_combat_outcome(&self) -> Result<CombatOutcome, ContractError> {
        let state = self.begin_read()?;
        if !state.combat_started {
            return Err(ContractError::NotAvailable(
                "no combat has taken place".to_string(),
            ));
        }
        Ok(state.last_outcome)
    }
}

#[async_trait]
impl GameWriter for MockChain {
    async fn create_game(&self) -> Result<PendingTransaction, ContractError> {
        self.write(|state, signer| {
            state.games_created += 1;
            let code = game_code(state.games_created);
            state.games.insert(
                code.clone(),
                GameInfo {
                    creator: signer,
                    player2: Address::ZERO,
                },
            );
            state.player_codes.insert(signer, code.clone());
            state.combat_started = false;
            state.last_outcome = CombatOutcome::NoCombat;
            Ok(vec![ContractEvent::GameCreated {
                code,
                creator: signer,
            }])
        })
    }

    async fn join_game(&self, code: &GameCode) -> Result<PendingTransaction, ContractError> {
        self.write(|state, signer| {
            apply_join(state, signer, code)?;
            Ok(vec![ContractEvent::PlayerJoined {
                code: code.clone(),
                player: signer,
            }])
        })
    }

    async fn deploy_unit(
        &self,
        _encrypted_attack: &EncryptedInput,
        _attack_proof: &InputProof,
        _encrypted_defense: &EncryptedInput,
        _defense_proof: &InputProof,
    ) -> Result<PendingTransaction, ContractError> {
        self.write(|state, signer| {
            if !state.player_codes.contains_key(&signer) {
                return Err(ContractError::Reverted("Player not in a game".to_string()));
            }
            state.deployed.insert(signer);
            Ok(Vec::new())
        })
    }

    async fn attack(
        &self,
        attacker: &Address,
        defender: &Address,
    ) -> Result<PendingTransaction, ContractError> {
        let (attacker, defender) = (*attacker, *defender);
        self.write(move |state, _signer| {
            let same_game = match (
                state.player_codes.get(&attacker),
                state.player_codes.get(&defender),
            ) {
                (Some(a), Some(d)) => a == d,
                _ => false,
            };
            if !same_game {
                return Err(ContractError::Reverted(
                    "Players are not in the same game".to_string(),
                ));
            }
            state.combat_started = true;
            Ok(Vec::new())
        })
    }

    async fn submit_combat_outcome(
        &self,
        outcome: CombatOutcome,
    ) -> Result<PendingTransaction, ContractError> {
        self.write(move |state, _signer| {
            state.combat_started = true;
            state.last_outcome = outcome;
            Ok(Vec::new())
        })
    }

    async fn wait_for_receipt(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionReceipt, ContractError> {
        let receipt = self.state().receipts.get(transaction_id).cloned();
        if receipt.is_none() {
            tracing::warn!("Mock chain has no receipt for {}", transaction_id);
        }
        receipt.ok_or_else(|| ContractError::TransactionNotFound(transaction_id.clone()))
    }
}

impl ContractEvents for MockChain {
    fn subscribe(&self) -> broadcast::Receiver<ContractEvent> {
        self.contract_tx.subscribe()
    }
}

impl GameContract for MockChain {
    fn name(&self) -> &str {
        "MockEncryptedWarriors"
    }

    fn network(&self) -> &str {
        "mock-network"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_bytes([0xa1; 20])
    }

    fn bob() -> Address {
        Address::from_bytes([0xb0; 20])
    }

    #[tokio::test]
    async fn test_mock_game_lifecycle() {
        let chain = MockChain::new(vec![alice()]);

        let pending = chain.create_game().await.unwrap();
        let receipt = chain.wait_for_receipt(&pending.transaction_id).await.unwrap();
        assert!(matches!(receipt.status, TransactionStatus::Confirmed { .. }));
        let code = receipt.created_game().cloned().expect("GameCreated event");

        assert_eq!(chain.player_game_code(&alice()).await.unwrap(), code);
        let info = chain.get_game(&code).await.unwrap();
        assert_eq!(info.creator, alice());
        assert!(info.player2.is_zero());

        // Outcome unavailable before any combat
        assert!(matches!(
            chain.last_combat_outcome().await,
            Err(ContractError::NotAvailable(_))
        ));

        chain.join_as(bob(), &code).unwrap();
        assert_eq!(chain.get_game(&code).await.unwrap().player2, bob());

        let pending = chain.attack(&alice(), &bob()).await.unwrap();
        chain.wait_for_receipt(&pending.transaction_id).await.unwrap();
        assert_eq!(
            chain.last_combat_outcome().await.unwrap(),
            CombatOutcome::NoCombat
        );

        chain
            .submit_combat_outcome(CombatOutcome::AttackerWins)
            .await
            .unwrap();
        assert_eq!(
            chain.last_combat_outcome().await.unwrap(),
            CombatOutcome::AttackerWins
        );
    }

    #[tokio::test]
    async fn test_creator_join_reverts_in_receipt() {
        let chain = MockChain::new(vec![alice()]);
        let pending = chain.create_game().await.unwrap();
        let code = chain
            .wait_for_receipt(&pending.transaction_id)
            .await
            .unwrap()
            .created_game()
            .cloned()
            .unwrap();

        let pending = chain.join_game(&code).await.unwrap();
        let receipt = chain.wait_for_receipt(&pending.transaction_id).await.unwrap();
        assert_eq!(
            receipt.status,
            TransactionStatus::Failed {
                error: CREATOR_JOIN_REVERT.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_switch_chain_requires_known_chain() {
        let chain = MockChain::new(vec![alice()]).with_chain(ChainId::new("0x1"));
        let params = NetworkParams::sepolia();
        chain.forget_chain(&params.chain_id);

        let err = chain.switch_chain(&params.chain_id).await.unwrap_err();
        assert!(matches!(err, WalletError::UnrecognizedChain(_)));

        let mut events = WalletProvider::subscribe(&chain);
        chain.add_chain(&params).await.unwrap();
        assert!(chain.current_chain().matches(&params.chain_id));
        assert_eq!(
            events.recv().await.unwrap(),
            WalletEvent::ChainChanged(params.chain_id.clone())
        );
    }

    #[tokio::test]
    async fn test_index_lag_hides_player_code() {
        let chain = MockChain::new(vec![alice()]);
        let code = GameCode::parse("0xFEED").unwrap();
        chain.insert_game(code.clone(), alice(), None);
        chain.set_index_lag(true);

        assert!(chain.player_game_code(&alice()).await.unwrap().is_zero());
        assert_eq!(chain.get_game(&code).await.unwrap().creator, alice());
        assert_eq!(chain.read_calls(), 2);
    }

    #[test]
    fn test_mock_contract_identity() {
        let chain = MockChain::default();
        assert_eq!(chain.name(), "MockEncryptedWarriors");
        assert_eq!(chain.network(), "mock-network");
    }
}
