//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache and data directories.

use std::path::PathBuf;

const APP_NAME: &str = "encrypted-warriors";

/// Get the platform-specific log directory
///
/// Follows platform conventions:
/// - macOS: `~/Library/Caches/encrypted-warriors/logs`
/// - Linux: `~/.cache/encrypted-warriors/logs` (or `$XDG_CACHE_HOME/...`)
/// - Windows: `%LOCALAPPDATA%\encrypted-warriors\logs`
/// - Fallback: `/tmp/encrypted-warriors/logs`
pub fn log_dir() -> PathBuf {
    let base_dir = directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_NAME));

    base_dir.join("logs")
}

/// Get the platform-specific data directory
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/encrypted-warriors`
/// - Linux: `~/.local/share/encrypted-warriors` (or `$XDG_DATA_HOME/...`)
/// - Windows: `%APPDATA%\encrypted-warriors`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Default location of the game code cache.
pub fn game_code_file() -> PathBuf {
    data_dir().join("game_code.json")
}
