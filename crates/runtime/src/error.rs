//! Error taxonomy surfaced by client operations.
//!
//! Wallet and contract failures are classified here once, so every action
//! boundary reports them the same way and the frontend can turn them into a
//! readable notification with [`RuntimeError::user_message`].

use client_blockchain_core::{ChainId, ContractError, GameCodeError, WalletError};
use thiserror::Error;

use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Revert reason the contract uses when a creator tries to join their game.
pub const CREATOR_JOIN_REVERT: &str = "Creator cannot join their own game";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no wallet capability available")]
    NoWalletCapability,

    #[error("request rejected by the user")]
    UserRejected,

    #[error("wallet session is no longer valid: {0}")]
    SessionInvalid(String),

    #[error("wallet is not connected")]
    NotConnected,

    #[error("connected to chain {actual}, expected {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("failed to read game state: {0}")]
    Sync(String),

    #[error("invalid game code: {0}")]
    InvalidCode(String),

    #[error("no opponent in the current game")]
    NoOpponent,

    #[error("invalid unit: {0}")]
    InvalidUnit(String),

    #[error("{CREATOR_JOIN_REVERT}")]
    CreatorCannotJoin,

    #[error("contract error: {0}")]
    Contract(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to switch network: {0}")]
    SwitchNetwork(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("client requires a game contract to be configured before building")]
    MissingContract,
}

impl RuntimeError {
    /// Classify a failed contract read.
    ///
    /// Reads never surface as contract errors: anything that is not a broken
    /// session is a sync failure.
    pub fn from_read(err: ContractError) -> Self {
        match err {
            ContractError::UnknownAccount(message) => Self::SessionInvalid(message),
            ContractError::UserRejected => Self::UserRejected,
            other => Self::Sync(other.to_string()),
        }
    }

    /// Classify a revert reason from a failed receipt.
    pub fn from_revert(reason: &str) -> Self {
        if reason.contains(CREATOR_JOIN_REVERT) {
            Self::CreatorCannotJoin
        } else {
            Self::Contract(reason.to_string())
        }
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid(_))
    }

    /// Text shown to the player for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoWalletCapability => {
                "No wallet found. Please install a wallet extension and try again.".to_string()
            }
            Self::UserRejected => "Transaction was rejected by the user.".to_string(),
            Self::SessionInvalid(_) => {
                "Wallet connection lost. Please reconnect your wallet.".to_string()
            }
            Self::NotConnected => "Please connect your wallet first.".to_string(),
            Self::WrongNetwork { expected, .. } => {
                format!("Wrong network. Please switch to chain {}.", expected)
            }
            Self::Sync(_) => "Failed to fetch game state.".to_string(),
            Self::InvalidCode(reason) => format!("Please enter a valid game code ({}).", reason),
            Self::NoOpponent => "Waiting for an opponent to join the game.".to_string(),
            Self::InvalidUnit(reason) => reason.clone(),
            Self::CreatorCannotJoin => {
                "You cannot join your own game. Please share the code with a friend!".to_string()
            }
            Self::Contract(reason) => format!("Transaction failed: {}", reason),
            Self::Network(_) => {
                "Network connection error. Please check your internet connection and wallet network."
                    .to_string()
            }
            Self::SwitchNetwork(reason) => format!("Failed to switch network: {}", reason),
            Self::Repository(err) => format!("Failed to save game code: {}", err),
            Self::MissingContract => "Contract not initialized.".to_string(),
        }
    }
}

impl From<ContractError> for RuntimeError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Reverted(reason) => Self::from_revert(&reason),
            ContractError::UserRejected => Self::UserRejected,
            ContractError::UnknownAccount(message) => Self::SessionInvalid(message),
            ContractError::Network(message) => Self::Network(message),
            other => Self::Contract(other.to_string()),
        }
    }
}

impl From<WalletError> for RuntimeError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => Self::UserRejected,
            WalletError::SignerUnavailable(message) => Self::SessionInvalid(message),
            WalletError::UnrecognizedChain(chain) => {
                Self::SwitchNetwork(format!("unrecognized chain {}", chain))
            }
            WalletError::Network(message) => Self::Network(message),
            WalletError::Request(message) => Self::Network(message),
        }
    }
}

impl From<GameCodeError> for RuntimeError {
    fn from(err: GameCodeError) -> Self {
        Self::InvalidCode(err.to_string())
    }
}
