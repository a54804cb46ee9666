//! Repository contract for the cached game code.

use client_blockchain_core::GameCode;

use super::error::Result;

/// Single-slot store for the most recent game code.
///
/// Used as a fallback when the contract's per-player index lags behind a
/// write this client just made. Writes are last-write-wins; the slot survives
/// restarts for durable implementations.
pub trait GameCodeRepository: Send + Sync {
    /// Load the cached code, if any.
    fn load(&self) -> Result<Option<GameCode>>;

    /// Replace the cached code.
    fn save(&self, code: &GameCode) -> Result<()>;
}
