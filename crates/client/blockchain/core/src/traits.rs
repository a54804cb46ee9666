//! Wallet and contract abstraction traits.
//!
//! - [`WalletProvider`]: account access, network selection, notifications
//! - Layer 1: [`GameReader`], [`GameWriter`], [`ContractEvents`] (game domain)
//! - Layer 2: [`GameContract`] (composite trait)

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::types::{
    Address, ChainId, CombatOutcome, ContractEvent, EncryptedInput, GameCode, GameInfo,
    InputProof, NetworkParams, PendingTransaction, TransactionId, TransactionReceipt, WalletEvent,
};

// ============================================================================
// Error Types
// ============================================================================

/// Wallet capability errors.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(ChainId),

    #[error("Signer unavailable: {0}")]
    SignerUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Wallet request failed: {0}")]
    Request(String),
}

/// Contract call errors.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("User rejected the transaction")]
    UserRejected,

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("Value not available: {0}")]
    NotAvailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

// ============================================================================
// Wallet
// ============================================================================

/// Injected wallet capability (browser extension, hardware signer, ...).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to expose accounts. The first account is the active one.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Address of the signer the wallet would use right now.
    async fn current_address(&self) -> Result<Address, WalletError>;

    /// Chain the wallet is connected to.
    async fn chain_id(&self) -> Result<ChainId, WalletError>;

    /// Switch to a known chain.
    ///
    /// Fails with [`WalletError::UnrecognizedChain`] when the wallet does not
    /// know the chain; callers then fall back to [`WalletProvider::add_chain`].
    async fn switch_chain(&self, chain_id: &ChainId) -> Result<(), WalletError>;

    /// Register a network with the wallet.
    async fn add_chain(&self, params: &NetworkParams) -> Result<(), WalletError>;

    /// Subscribe to account and chain notifications.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

// ============================================================================
// Layer 1: Game Domain Traits
// ============================================================================

/// Read-only contract queries.
#[async_trait]
pub trait GameReader: Send + Sync {
    /// Game the player takes part in; the zero code means "none".
    async fn player_game_code(&self, player: &Address) -> Result<GameCode, ContractError>;

    /// Participants of a game.
    async fn get_game(&self, code: &GameCode) -> Result<GameInfo, ContractError>;

    /// Most recent combat outcome. May fail before the first combat.
    async fn last_combat_outcome(&self) -> Result<CombatOutcome, ContractError>;
}

/// State-changing contract calls, signed by the wallet's current account.
#[async_trait]
pub trait GameWriter: Send + Sync {
    /// Create a game; the receipt carries a `GameCreated` event.
    async fn create_game(&self) -> Result<PendingTransaction, ContractError>;

    /// Join an existing game. Reverts when the signer created it.
    async fn join_game(&self, code: &GameCode) -> Result<PendingTransaction, ContractError>;

    /// Deploy a unit from encrypted attack and defense stats.
    async fn deploy_unit(
        &self,
        encrypted_attack: &EncryptedInput,
        attack_proof: &InputProof,
        encrypted_defense: &EncryptedInput,
        defense_proof: &InputProof,
    ) -> Result<PendingTransaction, ContractError>;

    /// Resolve combat between two players.
    async fn attack(
        &self,
        attacker: &Address,
        defender: &Address,
    ) -> Result<PendingTransaction, ContractError>;

    /// Publish a combat outcome.
    async fn submit_combat_outcome(
        &self,
        outcome: CombatOutcome,
    ) -> Result<PendingTransaction, ContractError>;

    /// Wait until a submitted transaction is confirmed or fails.
    async fn wait_for_receipt(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<TransactionReceipt, ContractError>;
}

/// Contract event subscription.
pub trait ContractEvents: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<ContractEvent>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Complete contract interface consumed by the client.
pub trait GameContract: GameReader + GameWriter + ContractEvents + Send + Sync {
    /// Contract name (e.g., "EncryptedWarriors").
    fn name(&self) -> &str;

    /// Network name (e.g., "sepolia", "local").
    fn network(&self) -> &str;
}
