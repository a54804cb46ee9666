//! Read-only projection of the client state for rendering.
use runtime::{GameState, Session, Step, Unit};

/// Everything a status panel shows, already formatted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusView {
    pub account: Option<String>,
    pub chain_valid: bool,
    pub game_code: Option<String>,
    pub players_joined: u8,
    pub opponent: Option<String>,
    pub step: Step,
    pub my_unit: Option<String>,
    pub outcome: Option<String>,
}

impl StatusView {
    pub fn new(session: Option<&Session>, state: &GameState, step: Step) -> Self {
        let opponent = session
            .and_then(|session| state.opponent_of(&session.address))
            .map(|address| address.short());

        Self {
            account: session.map(|session| session.address.short()),
            chain_valid: session.is_some_and(|session| session.chain_valid),
            game_code: state.game_code.as_ref().map(ToString::to_string),
            players_joined: state.players_joined,
            opponent,
            step,
            my_unit: state.my_unit.as_ref().map(describe_unit),
            outcome: state.last_combat_outcome.map(|outcome| outcome.to_string()),
        }
    }

    /// Render as `label: value` lines.
    pub fn lines(&self) -> Vec<String> {
        let account = match &self.account {
            Some(account) if self.chain_valid => account.clone(),
            Some(account) => format!("{} (wrong network)", account),
            None => "not connected".to_string(),
        };

        let mut lines = vec![
            format!("Account: {}", account),
            format!("Step {}: {}", self.step.index() + 1, self.step.label()),
        ];

        if let Some(code) = &self.game_code {
            lines.push(format!("Game: {}", code));
            lines.push(format!("Players: {}/2", self.players_joined));
        }
        if let Some(opponent) = &self.opponent {
            lines.push(format!("Opponent: {}", opponent));
        }
        if let Some(unit) = &self.my_unit {
            lines.push(format!("Unit: {}", unit));
        }
        if let Some(outcome) = &self.outcome {
            lines.push(format!("Outcome: {}", outcome));
        }
        lines
    }
}

fn describe_unit(unit: &Unit) -> String {
    let mut text = format!(
        "{} ATK {} / DEF {}",
        unit.unit_type, unit.attack, unit.defense
    );
    if !unit.abilities.is_empty() {
        let abilities: Vec<_> = unit.abilities.iter().map(ToString::to_string).collect();
        text.push_str(&format!(" [{}]", abilities.join(", ")));
    }
    text
}
