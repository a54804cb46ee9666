//! Client runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use client_blockchain_core::{Address, ChainId, NetworkParams};

use crate::dirs;

/// Which wallet capability the client starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WalletBackend {
    /// Simulated wallet and contract held in memory.
    #[default]
    Local,
    /// No wallet installed; connecting fails with a readable error.
    None,
}

impl std::str::FromStr for WalletBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "mock" => Ok(Self::Local),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown wallet backend: {}", other)),
        }
    }
}

/// Game code cache settings.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Keep the cache on disk; otherwise it lives for one process.
    pub persist: bool,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist: true,
            path: dirs::game_code_file(),
        }
    }
}

/// Configuration required to bootstrap a game client.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub network: NetworkParams,
    pub cache: CacheConfig,
    pub wallet: WalletBackend,
    /// Accounts exposed by the local wallet; first is active.
    pub local_accounts: Vec<Address>,
    pub event_buffer_size: usize,
    pub session_id: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::sepolia(),
            cache: CacheConfig::default(),
            wallet: WalletBackend::default(),
            local_accounts: default_local_accounts(),
            event_buffer_size: 64,
            session_id: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `REQUIRED_CHAIN_ID` - Chain writes are allowed on (default: 0xaa36a7)
    /// - `CHAIN_NAME` - Network name for add-chain requests (default: Sepolia)
    /// - `CHAIN_RPC_URLS` - Comma separated RPC URLs
    /// - `CHAIN_EXPLORER_URL` - Block explorer base URL
    /// - `CHAIN_CURRENCY_NAME` / `CHAIN_CURRENCY_SYMBOL` - Native currency
    /// - `GAME_CODE_FILE` - Game code cache path (default: platform data dir)
    /// - `PERSIST_GAME_CODE` - Keep the cache on disk (default: true)
    /// - `WALLET` - `local` or `none` (default: local)
    /// - `LOCAL_ACCOUNTS` - Comma separated addresses for the local wallet
    /// - `EVENT_BUFFER` - Event bus capacity per topic (default: 64)
    /// - `GAME_SESSION_ID` - Session identifier for log files (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Network
        if let Some(chain_id) = read_env::<String>("REQUIRED_CHAIN_ID") {
            config.network.chain_id = ChainId::new(chain_id.trim());
        }
        if let Some(name) = read_env::<String>("CHAIN_NAME") {
            config.network.chain_name = name;
        }
        if let Some(urls) = read_list("CHAIN_RPC_URLS") {
            config.network.rpc_urls = urls;
        }
        if let Some(url) = read_env::<String>("CHAIN_EXPLORER_URL") {
            config.network.block_explorer_urls = vec![url];
        }
        if let Some(name) = read_env::<String>("CHAIN_CURRENCY_NAME") {
            config.network.native_currency.name = name;
        }
        if let Some(symbol) = read_env::<String>("CHAIN_CURRENCY_SYMBOL") {
            config.network.native_currency.symbol = symbol;
        }

        // Game code cache
        if let Some(path) = read_env::<PathBuf>("GAME_CODE_FILE") {
            config.cache.path = path;
        }
        if let Some(persist) = read_env_bool("PERSIST_GAME_CODE") {
            config.cache.persist = persist;
        }

        // Wallet
        match env::var("WALLET").ok().map(|value| value.parse::<WalletBackend>()) {
            Some(Ok(backend)) => config.wallet = backend,
            Some(Err(e)) => tracing::warn!("Ignoring WALLET: {}", e),
            None => {}
        }
        if let Some(accounts) = read_list("LOCAL_ACCOUNTS") {
            let parsed: Vec<Address> = accounts
                .iter()
                .filter_map(|account| match account.parse() {
                    Ok(address) => Some(address),
                    Err(e) => {
                        tracing::warn!("Ignoring local account {}: {}", account, e);
                        None
                    }
                })
                .collect();
            if !parsed.is_empty() {
                config.local_accounts = parsed;
            }
        }

        // Channels
        if let Some(capacity) = read_env::<usize>("EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        // Session ID (optional)
        config.session_id = env::var("GAME_SESSION_ID").ok();

        config
    }

    /// Settings consumed by the game client itself.
    pub fn client_config(&self) -> runtime::ClientConfig {
        runtime::ClientConfig {
            network: self.network.clone(),
            event_buffer_size: self.event_buffer_size,
        }
    }
}

fn default_local_accounts() -> Vec<Address> {
    vec![
        Address::from_bytes([0x1a; 20]),
        Address::from_bytes([0x2b; 20]),
    ]
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_list(key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = env::var(key)
        .ok()?
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_sepolia() {
        let config = RuntimeConfig::default();
        assert_eq!(config.network.chain_id, ChainId::new("0xaa36a7"));
        assert_eq!(config.wallet, WalletBackend::Local);
        assert!(config.cache.persist);
        assert!(config.cache.path.ends_with("game_code.json"));
        assert_eq!(config.local_accounts.len(), 2);
    }

    #[test]
    fn wallet_backend_parses_loosely() {
        assert_eq!(" Local ".parse::<WalletBackend>(), Ok(WalletBackend::Local));
        assert_eq!("NONE".parse::<WalletBackend>(), Ok(WalletBackend::None));
        assert!("metamask".parse::<WalletBackend>().is_err());
    }

    #[test]
    fn client_config_carries_network() {
        let config = RuntimeConfig {
            event_buffer_size: 8,
            ..RuntimeConfig::default()
        };
        let client = config.client_config();
        assert_eq!(client.network, config.network);
        assert_eq!(client.event_buffer_size, 8);
    }
}
