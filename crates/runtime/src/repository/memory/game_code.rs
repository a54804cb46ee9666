use std::sync::RwLock;

use client_blockchain_core::GameCode;

use crate::repository::error::Result;
use crate::repository::{GameCodeRepository, RepositoryError};

/// In-memory implementation of GameCodeRepository
#[derive(Default)]
pub struct InMemoryGameCodeRepository {
    slot: RwLock<Option<GameCode>>,
}

impl InMemoryGameCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-seeded with a cached code.
    pub fn with_code(code: GameCode) -> Self {
        Self {
            slot: RwLock::new(Some(code)),
        }
    }
}

impl GameCodeRepository for InMemoryGameCodeRepository {
    fn load(&self) -> Result<Option<GameCode>> {
        let slot = self.slot.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, code: &GameCode) -> Result<()> {
        let mut slot = self.slot.write().map_err(|_| RepositoryError::LockPoisoned)?;
        *slot = Some(code.clone());
        Ok(())
    }
}
