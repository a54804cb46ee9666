//! Client runtime for Encrypted Warriors.
//!
//! This crate reconciles asynchronous, possibly stale contract reads into a
//! consistent local [`GameState`] and decides which [`Step`] the player is in.
//! Frontends embed [`GameClient`] to connect a wallet, drive the game's
//! transactions and subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`client`] hosts the orchestrator and builder
//! - [`session`] owns the wallet connection lifecycle
//! - [`sync`] folds chain reads into snapshots and submits transactions
//! - [`step`] derives the current phase from a snapshot
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] caches the last game code across restarts
pub mod client;
pub mod error;
pub mod events;
pub mod repository;
pub mod session;
pub mod state;
pub mod step;
pub mod sync;

pub use client::{ClientConfig, ClientEvent, GameClient, GameClientBuilder};
pub use error::{CREATOR_JOIN_REVERT, Result, RuntimeError};
pub use events::{Event, EventBus, GameEvent, SessionEvent, Topic, TransactionEvent, TxAction};
pub use repository::{
    FileGameCodeRepository, GameCodeRepository, InMemoryGameCodeRepository, RepositoryError,
};
pub use session::{Session, SessionManager};
pub use state::{Ability, GameState, POINT_BUDGET, Unit, UnitLoadout, UnitType};
pub use step::{Step, derive_step};
pub use sync::{DEMO_OUTCOME, GameSynchronizer, normalize_join_code};
