//! Frontend configuration structures and loaders.
//!
//! This module contains UI-specific configuration that is shared across
//! different frontend implementations (CLI, GUI, etc.).

use std::env;
use std::time::Duration;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
}

impl FrontendConfig {
    pub const fn new(messages: MessageConfig) -> Self {
        Self { messages }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MESSAGE_CAPACITY` - Combat log and notification capacity (default: 64)
    /// - `NOTIFICATION_TTL_MS` - Notification lifetime in milliseconds (default: 5000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }

        if let Some(ttl) = read_env::<u64>("NOTIFICATION_TTL_MS") {
            config.messages.notification_ttl = Duration::from_millis(ttl.max(1));
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            notification_ttl: Duration::from_millis(5000),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
