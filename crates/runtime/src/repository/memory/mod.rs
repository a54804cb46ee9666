//! In-memory repository implementations for testing and development.

mod game_code;

pub use game_code::InMemoryGameCodeRepository;
