//! Topic-based event bus for client events.
//!
//! Events are published to specific topics, and consumers can subscribe only
//! to the topics they need. Delivery is best-effort: slow subscribers lag and
//! skip events rather than blocking the client.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{GameEvent, SessionEvent, TransactionEvent, TxAction};
