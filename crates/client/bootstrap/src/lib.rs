//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, wallet/contract assembly, and client setup
//! that can be reused by CLI, UI, or other front-end crates.
pub mod builder;
pub mod chain;
pub mod config;
pub mod dirs;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use chain::{ChainBundle, ChainFactory, LocalChainFactory};
pub use config::{CacheConfig, RuntimeConfig, WalletBackend};
