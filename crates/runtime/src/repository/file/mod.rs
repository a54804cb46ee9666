//! File-based repository implementations.

mod game_code;

pub use game_code::FileGameCodeRepository;
