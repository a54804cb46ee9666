//! File-based GameCodeRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use client_blockchain_core::GameCode;
use serde::{Deserialize, Serialize};

use crate::repository::error::Result;
use crate::repository::{GameCodeRepository, RepositoryError};

/// On-disk shape of the cache file.
#[derive(Debug, Serialize, Deserialize)]
struct CachedGameCode {
    #[serde(rename = "gameCode")]
    game_code: GameCode,
}

/// File-based implementation of GameCodeRepository.
///
/// Stores the code as a small JSON document (`{"gameCode": "0x..."}`).
/// Saves go through a temp file and an atomic rename, so a crash never
/// leaves a truncated cache behind.
pub struct FileGameCodeRepository {
    path: PathBuf,
}

impl FileGameCodeRepository {
    /// Create a repository backed by `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameCodeRepository for FileGameCodeRepository {
    fn load(&self) -> Result<Option<GameCode>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path)?;
        let cached: CachedGameCode = serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(e.to_string()))?;

        tracing::debug!("Loaded game code {} from {}", cached.game_code, self.path.display());

        Ok(Some(cached.game_code))
    }

    fn save(&self, code: &GameCode) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let bytes = serde_json::to_vec(&CachedGameCode {
            game_code: code.clone(),
        })
        .map_err(|e| RepositoryError::Json(e.to_string()))?;

        // Write to temp file
        fs::write(&temp_path, bytes)?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved game code {} to {}", code, self.path.display());

        Ok(())
    }
}
