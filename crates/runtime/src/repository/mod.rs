//! Repository layer for data that outlives a session.
//!
//! The only durable client data is the last game code this client created
//! or joined. Everything else is re-derived from the chain.

mod error;
mod file;
mod memory;
mod traits;

pub use error::RepositoryError;
pub use file::FileGameCodeRepository;
pub use memory::InMemoryGameCodeRepository;
pub use traits::GameCodeRepository;
