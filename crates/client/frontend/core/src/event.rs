//! Utilities for reacting to client events inside UI layers.
use std::time::Instant;

use runtime::{Event, GameEvent, RuntimeError, SessionEvent, TransactionEvent, TxAction};

use crate::config::MessageConfig;
use crate::message::{MessageEntry, MessageLevel, MessageLog, Notifications};

#[derive(Clone, Copy, Debug, Default)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event, now: Instant) -> EventImpact;

    /// Report a failed action to the player.
    fn on_error(&mut self, error: &RuntimeError, now: Instant) -> EventImpact;

    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Turns client events into notifications and combat log entries.
#[derive(Clone, Debug)]
pub struct GameEventConsumer {
    notifications: Notifications,
    combat_log: MessageLog,
    /// Transaction waiting for confirmation, if any.
    pending: Option<TxAction>,
}

impl GameEventConsumer {
    pub fn new(config: &MessageConfig) -> Self {
        Self {
            notifications: Notifications::new(config.capacity, config.notification_ttl),
            combat_log: MessageLog::new(config.capacity),
            pending: None,
        }
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn pending(&self) -> Option<TxAction> {
        self.pending
    }

    /// Report an unexpected failure outside any action (panics, task errors).
    pub fn on_unexpected(&mut self, message: &str, now: Instant) -> EventImpact {
        tracing::error!("Unexpected failure: {}", message);
        self.notifications.push(
            format!("Unexpected error: {}", message),
            MessageLevel::Error,
            now,
        );
        EventImpact::redraw()
    }

    fn notify(&mut self, text: impl Into<String>, level: MessageLevel, now: Instant) {
        self.notifications.push(text, level, now);
    }

    fn record(&mut self, text: impl Into<String>, now: Instant) {
        self.combat_log
            .push(MessageEntry::new(text, MessageLevel::Info, now));
    }

    fn on_session(&mut self, event: &SessionEvent, now: Instant) {
        match event {
            SessionEvent::Connected {
                address,
                chain_valid,
                ..
            } => {
                self.notify(
                    format!("Wallet connected: {}", address.short()),
                    MessageLevel::Success,
                    now,
                );
                if !chain_valid {
                    self.notify(WRONG_NETWORK, MessageLevel::Warning, now);
                }
            }
            SessionEvent::Disconnected => {
                self.pending = None;
                self.notify("Wallet disconnected", MessageLevel::Info, now);
            }
            SessionEvent::AccountSwitched { address } => {
                self.notify(
                    format!("Switched to account {}", address.short()),
                    MessageLevel::Info,
                    now,
                );
            }
            SessionEvent::ChainChanged { chain_valid, .. } => {
                if *chain_valid {
                    self.notify("Connected to the game network", MessageLevel::Success, now);
                } else {
                    self.notify(WRONG_NETWORK, MessageLevel::Warning, now);
                }
            }
        }
    }

    fn on_game(&mut self, event: &GameEvent, now: Instant) {
        match event {
            GameEvent::GameCreated { code } => {
                self.record(format!("Game created: {}", code), now);
                self.notify(
                    format!("Game created! Share this code with your opponent: {}", code),
                    MessageLevel::Success,
                    now,
                );
            }
            GameEvent::GameJoined { code } => {
                self.record(format!("Joined game {}", code), now);
                self.notify("Successfully joined the game!", MessageLevel::Success, now);
            }
            GameEvent::PlayerJoined { player, .. } => {
                self.notify(
                    format!("Player {} joined the game", player.short()),
                    MessageLevel::Info,
                    now,
                );
            }
            GameEvent::SecondPlayerJoined { player2, .. } => {
                self.record(format!("{} joined the battle", player2.short()), now);
                self.notify(
                    "Second player joined! Deploy your unit.",
                    MessageLevel::Success,
                    now,
                );
            }
            GameEvent::UnitDeployed {
                unit_type,
                attack,
                defense,
            } => {
                self.record(
                    format!("Deployed {} (ATK {}, DEF {})", unit_type, attack, defense),
                    now,
                );
            }
            GameEvent::Attacked { attacker, defender } => {
                self.record(
                    format!("{} attacked {}", attacker.short(), defender.short()),
                    now,
                );
            }
            GameEvent::OutcomeRevealed { outcome } => {
                self.record(format!("Combat outcome: {}", outcome), now);
                self.notify(format!("Outcome revealed: {}", outcome), MessageLevel::Success, now);
            }
            GameEvent::StateRefreshed => {
                self.notify("Game state refreshed", MessageLevel::Success, now);
            }
            GameEvent::StateReset => {}
        }
    }

    fn on_transaction(&mut self, event: &TransactionEvent, now: Instant) {
        match event {
            TransactionEvent::Pending {
                action,
                explorer_url,
                ..
            } => {
                self.pending = Some(*action);
                let text = match explorer_url {
                    Some(url) => format!("{}: transaction pending. View on explorer: {}", action, url),
                    None => format!("{}: transaction pending", action),
                };
                self.notify(text, MessageLevel::Info, now);
            }
            TransactionEvent::Confirmed { action, .. } => {
                self.pending = None;
                self.notify(format!("{} confirmed", action), MessageLevel::Success, now);
            }
            TransactionEvent::Failed { .. } => {
                // The action boundary reports the error itself
                self.pending = None;
            }
        }
    }
}

const WRONG_NETWORK: &str = "Wrong network. Switch networks before sending transactions.";

impl EventConsumer for GameEventConsumer {
    fn on_event(&mut self, event: &Event, now: Instant) -> EventImpact {
        match event {
            Event::Session(event) => self.on_session(event, now),
            Event::Game(GameEvent::StateReset) => return EventImpact::redraw(),
            Event::Game(event) => self.on_game(event, now),
            Event::Transaction(event) => self.on_transaction(event, now),
        }
        EventImpact::redraw()
    }

    fn on_error(&mut self, error: &RuntimeError, now: Instant) -> EventImpact {
        tracing::warn!("Action failed: {}", error);
        self.notify(error.user_message(), MessageLevel::Error, now);
        EventImpact::redraw()
    }

    fn message_log(&self) -> &MessageLog {
        &self.combat_log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.combat_log
    }

    fn take_message_log(self) -> MessageLog {
        self.combat_log
    }
}
