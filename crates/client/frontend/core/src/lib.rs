//! Cross-frontend primitives for presenting the game.
//!
//! Houses notifications, the combat log, event handling, and view-model types
//! that both CLI and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod frontend;
pub mod message;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig};
pub use event::{EventConsumer, EventImpact, GameEventConsumer};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLevel, MessageLog, Notifications};
pub use view_model::StatusView;
