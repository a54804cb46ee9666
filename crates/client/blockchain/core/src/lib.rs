//! Blockchain abstraction layer for the Encrypted Warriors client.
//!
//! The client never talks to a chain directly. It consumes two external
//! capabilities through the traits in this crate:
//!
//! # Architecture
//!
//! ```text
//! Layer 2: GameContract (composite trait)
//!          ├── GameReader
//!          ├── GameWriter
//!          └── ContractEvents
//!
//! Layer 1: Domain Traits (game concepts)
//!
//! WalletProvider (accounts, chain selection, notifications)
//! ```
//!
//! - **WalletProvider**: account access and network selection, owned by the
//!   wallet extension
//! - **GameContract**: reads, writes and notifications of the deployed
//!   Encrypted Warriors contract, bound to the wallet's current signer
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{GameContract, WalletProvider};
//!
//! async fn play(wallet: &dyn WalletProvider, contract: &dyn GameContract) {
//!     let accounts = wallet.request_accounts().await?;
//!     let pending = contract.create_game().await?;
//!     let receipt = contract.wait_for_receipt(&pending.transaction_id).await?;
//! }
//! ```

pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits
pub use traits::{
    ContractError, ContractEvents, GameContract, GameReader, GameWriter, WalletError,
    WalletProvider,
};

// Re-export all types
pub use types::{
    Address, AddressParseError, BlockchainConfig, ChainId, CombatOutcome, ContractEvent,
    EncryptedInput, GameCode, GameCodeError, GameInfo, InputProof, NativeCurrency, NetworkParams,
    PendingTransaction, TransactionId, TransactionReceipt, TransactionStatus, WalletEvent,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockChain;
