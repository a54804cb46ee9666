//! CLI-specific configuration for the terminal frontend.
use std::env;
use std::time::Duration;

/// CLI terminal configuration.
///
/// This contains settings specific to the terminal interface,
/// separate from cross-frontend client configuration.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub ui: UiConfig,
}

impl CliConfig {
    /// Construct CLI configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CLI_PROMPT` - Input prompt (default: "warriors> ")
    /// - `CLI_AUTO_STATUS` - Print the status panel after each action (default: true)
    /// - `CLI_LOG_LINES` - Combat log entries shown by `log` (default: 10)
    /// - `CLI_TICK_MS` - Notification housekeeping interval (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(prompt) = env::var("CLI_PROMPT") {
            config.ui.prompt = prompt;
        }

        if let Some(auto_status) = read_env_bool("CLI_AUTO_STATUS") {
            config.ui.auto_status = auto_status;
        }

        if let Some(lines) = read_env::<usize>("CLI_LOG_LINES") {
            config.ui.log_lines = lines.max(1);
        }

        if let Some(ms) = read_env::<u64>("CLI_TICK_MS") {
            config.ui.tick_interval = Duration::from_millis(ms.max(50));
        }

        config
    }
}

/// Display and pacing settings.
#[derive(Clone, Debug)]
pub struct UiConfig {
    pub prompt: String,
    pub auto_status: bool,
    pub log_lines: usize,
    pub tick_interval: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            prompt: "warriors> ".to_string(),
            auto_status: true,
            log_lines: 10,
            tick_interval: Duration::from_millis(1000),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}
