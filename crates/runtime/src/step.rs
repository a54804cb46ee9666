//! Phase derivation.
//!
//! The current step is a pure function of the session and the game state,
//! recomputed on every change. Rules are checked in table order; the first
//! match wins and the last row matches everything left, so the function is
//! total.

use client_blockchain_core::CombatOutcome;
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::state::GameState;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum Step {
    #[strum(to_string = "Join Game")]
    JoinGame = 0,
    #[strum(to_string = "Deploy Unit")]
    DeployUnit = 1,
    #[strum(to_string = "Attack")]
    Attack = 2,
    #[strum(to_string = "Reveal Outcome")]
    RevealOutcome = 3,
}

impl Step {
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

/// Inputs the rules look at.
#[derive(Debug, Clone, Copy)]
struct Facts {
    has_address: bool,
    players_joined: u8,
    deployed: bool,
    outcome: Option<CombatOutcome>,
}

type Rule = (fn(&Facts) -> bool, Step);

const RULES: [Rule; 5] = [
    (|f| !f.has_address, Step::JoinGame),
    (|f| f.players_joined < 2, Step::JoinGame),
    (|f| !f.deployed, Step::DeployUnit),
    (|f| f.outcome.is_none(), Step::Attack),
    (|_| true, Step::RevealOutcome),
];

/// Phase the player is in.
pub fn derive_step(session: Option<&Session>, state: &GameState) -> Step {
    let facts = Facts {
        has_address: session.is_some(),
        players_joined: state.players_joined,
        deployed: state.unit_deployed(),
        outcome: state.last_combat_outcome,
    };

    RULES
        .iter()
        .find(|(applies, _)| applies(&facts))
        .map(|(_, step)| *step)
        .unwrap_or(Step::RevealOutcome)
}
