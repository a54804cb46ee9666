//! Terminal frontend for Encrypted Warriors.
//!
//! This crate provides a line-oriented terminal interface for the game.
//! It implements the `client_frontend_core::Frontend` trait.
//!
//! # Architecture
//!
//! CliFrontend is a pure UI layer that:
//! - Receives the GameClient built by bootstrap
//! - Reads commands from stdin and races them against wallet and contract
//!   notifications
//! - Prints notifications, the combat log and the status panel

mod app;
mod command;
mod config;
pub mod logging;
mod shell;

pub use app::CliFrontend;
pub use command::{Command, CommandError, DeployArgs};
pub use config::{CliConfig, UiConfig};

// Re-export for convenience (used in main.rs)
pub use client_frontend_core::FrontendConfig;
