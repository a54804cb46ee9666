//! Event types for different topics.

use client_blockchain_core::{Address, ChainId, CombatOutcome, GameCode, TransactionId};
use serde::{Deserialize, Serialize};

use crate::state::UnitType;

/// Wallet session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Connected {
        address: Address,
        chain_id: ChainId,
        chain_valid: bool,
    },

    /// Session cleared (explicit disconnect or empty account list).
    Disconnected,

    /// Wallet exposed a different first account.
    AccountSwitched { address: Address },

    ChainChanged { chain_id: ChainId, chain_valid: bool },
}

/// Game progress as observed by this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameCreated { code: GameCode },

    GameJoined { code: GameCode },

    /// Contract reported a `PlayerJoined` event.
    PlayerJoined { code: GameCode, player: Address },

    /// A refresh observed the 1 -> 2 player transition.
    SecondPlayerJoined { code: GameCode, player2: Address },

    UnitDeployed {
        unit_type: UnitType,
        attack: u8,
        defense: u8,
    },

    Attacked { attacker: Address, defender: Address },

    OutcomeRevealed { outcome: CombatOutcome },

    /// A manual refresh completed.
    StateRefreshed,

    /// Game state replaced with the empty snapshot.
    StateReset,
}

/// Contract write that produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum TxAction {
    #[strum(to_string = "Create game")]
    CreateGame,
    #[strum(to_string = "Join game")]
    JoinGame,
    #[strum(to_string = "Deploy unit")]
    DeployUnit,
    #[strum(to_string = "Attack")]
    Attack,
    #[strum(to_string = "Reveal outcome")]
    RevealOutcome,
}

/// Transaction lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEvent {
    Pending {
        action: TxAction,
        transaction_id: TransactionId,
        explorer_url: Option<String>,
    },

    Confirmed {
        action: TxAction,
        transaction_id: TransactionId,
    },

    Failed { action: TxAction, reason: String },
}

impl TransactionEvent {
    pub fn action(&self) -> TxAction {
        match self {
            Self::Pending { action, .. }
            | Self::Confirmed { action, .. }
            | Self::Failed { action, .. } => *action,
        }
    }
}
