//! Normalized local view of one match.
//!
//! [`GameState`] is rebuilt from chain reads on every refresh. The only fact
//! that does not come from the chain is [`GameState::my_unit`]: the contract
//! never returns plaintext stats, so the unit is recorded locally once its
//! deployment is confirmed and carried over while the game code stays the
//! same. A future encrypted-stats integration must reconcile it through a
//! commitment or an event instead.

use std::collections::BTreeSet;

use client_blockchain_core::{Address, CombatOutcome, GameCode, GameInfo};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Maximum attack + defense points of a unit, bonuses included.
pub const POINT_BUDGET: u16 = 100;

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
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum UnitType {
    Warrior,
    Mage,
    Tank,
    Assassin,
}

impl UnitType {
    /// (attack, defense) bonus applied on top of the base stats.
    pub const fn bonuses(self) -> (i16, i16) {
        match self {
            UnitType::Warrior => (0, 10),
            UnitType::Mage => (15, -5),
            UnitType::Tank => (-5, 20),
            UnitType::Assassin => (20, -10),
        }
    }
}

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
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Ability {
    #[strum(to_string = "Critical Strike", serialize = "critical-strike", serialize = "critical")]
    CriticalStrike,
    #[strum(to_string = "Shield Wall", serialize = "shield-wall", serialize = "shield")]
    ShieldWall,
    #[strum(to_string = "Magic Burst", serialize = "magic-burst", serialize = "magic")]
    MagicBurst,
}

/// A player's unit as known to this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub attack: u8,
    pub defense: u8,
    pub unit_type: UnitType,
    pub abilities: BTreeSet<Ability>,
    pub deployed: bool,
}

/// Stats chosen by the player before deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLoadout {
    pub attack: u8,
    pub defense: u8,
    pub unit_type: UnitType,
    pub abilities: BTreeSet<Ability>,
}

impl UnitLoadout {
    pub fn new(attack: u8, defense: u8, unit_type: UnitType) -> Self {
        Self {
            attack,
            defense,
            unit_type,
            abilities: BTreeSet::new(),
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.insert(ability);
        self
    }

    /// Attack and defense after the unit type bonus, floored at zero.
    pub fn effective_stats(&self) -> (u16, u16) {
        let (attack_bonus, defense_bonus) = self.unit_type.bonuses();
        let apply = |base: u8, bonus: i16| (i16::from(base) + bonus).max(0) as u16;
        (apply(self.attack, attack_bonus), apply(self.defense, defense_bonus))
    }

    pub fn total_points(&self) -> u16 {
        let (attack, defense) = self.effective_stats();
        attack + defense
    }

    /// Reject loadouts over the point budget.
    pub fn validate(&self) -> Result<()> {
        let total = self.total_points();
        if total > POINT_BUDGET {
            return Err(RuntimeError::InvalidUnit(format!(
                "Total points ({}) exceed the budget of {}",
                total, POINT_BUDGET
            )));
        }
        Ok(())
    }

    /// Unit recorded once the deployment is confirmed.
    pub fn into_deployed(self) -> Unit {
        Unit {
            attack: self.attack,
            defense: self.defense,
            unit_type: self.unit_type,
            abilities: self.abilities,
            deployed: true,
        }
    }
}

/// Snapshot of the current match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Game the snapshot was derived from.
    pub game_code: Option<GameCode>,
    /// 0, 1 or 2; 2 iff both players are set.
    pub players_joined: u8,
    pub player1: Option<Address>,
    pub player2: Option<Address>,
    pub my_unit: Option<Unit>,
    /// Reserved; opponent stats stay confidential.
    pub opponent_unit: Option<Unit>,
    pub last_combat_outcome: Option<CombatOutcome>,
}

impl GameState {
    /// Empty state: no game, nobody joined.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Build the next snapshot from chain reads.
    ///
    /// `my_unit` carries over from `previous` only for the same game code. The
    /// outcome read is best-effort: when it is missing, a value already known
    /// for the same game is kept.
    pub fn observed(
        previous: &GameState,
        code: GameCode,
        info: GameInfo,
        outcome: Option<CombatOutcome>,
    ) -> Self {
        let same_game = previous.game_code.as_ref() == Some(&code);

        // The creator is always present once a code resolves
        let player2 = Some(info.player2).filter(|address| !address.is_zero());
        let players_joined = if player2.is_some() { 2 } else { 1 };

        let (my_unit, last_combat_outcome) = if same_game {
            (
                previous.my_unit.clone(),
                outcome.or(previous.last_combat_outcome),
            )
        } else {
            (None, outcome)
        };

        Self {
            game_code: Some(code),
            players_joined,
            player1: Some(info.creator),
            player2,
            my_unit,
            opponent_unit: None,
            last_combat_outcome,
        }
    }

    /// The other participant, seen from `me`.
    pub fn opponent_of(&self, me: &Address) -> Option<Address> {
        match (self.player1, self.player2) {
            (Some(p1), Some(p2)) if p1 == *me => Some(p2),
            (Some(p1), Some(p2)) if p2 == *me => Some(p1),
            _ => None,
        }
    }

    pub fn unit_deployed(&self) -> bool {
        self.my_unit.as_ref().is_some_and(|unit| unit.deployed)
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

    fn code(value: &str) -> GameCode {
        GameCode::parse(value).unwrap()
    }

    #[test]
    fn players_joined_follows_player2() {
        let waiting = GameState::observed(
            &GameState::empty(),
            code("0x01"),
            GameInfo {
                creator: alice(),
                player2: Address::ZERO,
            },
            None,
        );
        assert_eq!(waiting.players_joined, 1);
        assert_eq!(waiting.player1, Some(alice()));
        assert_eq!(waiting.player2, None);

        let full = GameState::observed(
            &waiting,
            code("0x01"),
            GameInfo {
                creator: alice(),
                player2: bob(),
            },
            None,
        );
        assert_eq!(full.players_joined, 2);
        assert_eq!(full.opponent_of(&alice()), Some(bob()));
        assert_eq!(full.opponent_of(&bob()), Some(alice()));
    }

    #[test]
    fn local_unit_and_outcome_carry_over_within_a_game() {
        let info = GameInfo {
            creator: alice(),
            player2: bob(),
        };
        let mut previous = GameState::observed(&GameState::empty(), code("0x01"), info, None);
        previous.my_unit = Some(UnitLoadout::new(40, 40, UnitType::Warrior).into_deployed());
        previous.last_combat_outcome = Some(CombatOutcome::Draw);

        let same = GameState::observed(&previous, code("0x01"), info, None);
        assert!(same.unit_deployed());
        assert_eq!(same.last_combat_outcome, Some(CombatOutcome::Draw));

        let other = GameState::observed(&previous, code("0x02"), info, None);
        assert!(other.my_unit.is_none());
        assert!(other.last_combat_outcome.is_none());
    }

    #[test]
    fn loadout_budget_includes_type_bonus() {
        assert_eq!(UnitLoadout::new(50, 40, UnitType::Warrior).total_points(), 100);
        assert!(UnitLoadout::new(50, 40, UnitType::Warrior).validate().is_ok());

        let err = UnitLoadout::new(50, 40, UnitType::Tank).validate().unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidUnit(_)));

        // Penalties never push a stat below zero
        assert_eq!(UnitLoadout::new(0, 5, UnitType::Assassin).effective_stats(), (20, 0));
    }

    #[test]
    fn unit_types_and_abilities_parse_from_input() {
        assert_eq!("mage".parse::<UnitType>().unwrap(), UnitType::Mage);
        assert_eq!("shield".parse::<Ability>().unwrap(), Ability::ShieldWall);
        assert_eq!(Ability::CriticalStrike.to_string(), "Critical Strike");
    }
}
