//! Common types for wallet and contract interactions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 20-byte account address.
///
/// Parsing accepts any hex casing, so checksummed and lowercase forms of the
/// same account compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// `0x1234...abcd` form used in status lines and log entries.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),

    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        let bytes = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|raw: Vec<u8>| AddressParseError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Opaque game identifier returned by the contract ("game code").
///
/// Stored as `0x`-prefixed hex text exactly as entered or emitted. Equality
/// ignores hex casing, and the "no game" sentinel is detected by value: any
/// code whose digits are all zero is the zero identifier, whatever its length.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameCode(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameCodeError {
    #[error("game code is empty")]
    Empty,

    #[error("game code must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("game code contains non-hex characters: {0}")]
    InvalidHex(String),
}

impl GameCode {
    /// Width of the identifier the contract emits.
    pub const BYTE_LEN: usize = 32;

    /// Parse a `0x`-prefixed hex identifier.
    pub fn parse(value: &str) -> Result<Self, GameCodeError> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| GameCodeError::MissingPrefix(value.to_string()))?;

        if digits.is_empty() {
            return Err(GameCodeError::Empty);
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GameCodeError::InvalidHex(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn from_bytes(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Canonical zero identifier (full width).
    pub fn zero() -> Self {
        Self::from_bytes([0u8; Self::BYTE_LEN])
    }

    pub fn is_zero(&self) -> bool {
        self.digits().chars().all(|c| c == '0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digits(&self) -> &str {
        &self.0[2..]
    }

    fn normalized(&self) -> String {
        self.digits().to_ascii_lowercase()
    }
}

impl PartialEq for GameCode {
    fn eq(&self, other: &Self) -> bool {
        self.digits().eq_ignore_ascii_case(other.digits())
    }
}

impl Eq for GameCode {}

impl Hash for GameCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl TryFrom<String> for GameCode {
    type Error = GameCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.0
    }
}

impl FromStr for GameCode {
    type Err = GameCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameCode({})", self.0)
    }
}

/// Chain identifier as reported by the wallet (e.g. `0xaa36a7`).
///
/// Wallets report ids with arbitrary hex casing; [`ChainId::matches`] is the
/// comparison to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &ChainId) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generic transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Vec<u8>);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Transaction status on the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is pending in mempool
    Pending,

    /// Transaction is confirmed on-chain
    Confirmed { block_height: u64 },

    /// Transaction failed on-chain
    Failed { error: String },
}

/// A submitted, not yet confirmed transaction.
///
/// Submission is not cancellable; dropping this value leaves the transaction
/// outstanding on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub transaction_id: TransactionId,
}

/// Outcome of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    /// Contract events emitted by this transaction, in log order.
    pub events: Vec<ContractEvent>,
}

impl TransactionReceipt {
    /// Code carried by the first `GameCreated` event, if any.
    pub fn created_game(&self) -> Option<&GameCode> {
        self.events.iter().find_map(|event| match event {
            ContractEvent::GameCreated { code, .. } => Some(code),
            _ => None,
        })
    }
}

/// Participants of one match as stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub creator: Address,
    /// [`Address::ZERO`] until a second player joins.
    pub player2: Address,
}

/// Combat outcome code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum CombatOutcome {
    #[strum(to_string = "No Combat")]
    NoCombat = 0,
    #[strum(to_string = "Attacker Wins")]
    AttackerWins = 1,
    #[strum(to_string = "Defender Wins")]
    DefenderWins = 2,
    #[strum(to_string = "Draw")]
    Draw = 3,
}

impl CombatOutcome {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Ciphertext handle for one encrypted stat.
///
/// Encryption is not performed by this client: every handle submitted is the
/// zero-filled [`EncryptedInput::placeholder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedInput(pub [u8; 32]);

impl EncryptedInput {
    pub const fn placeholder() -> Self {
        Self([0u8; 32])
    }
}

/// Input proof accompanying an [`EncryptedInput`]; zero-filled placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProof(pub Vec<u8>);

impl InputProof {
    pub fn placeholder() -> Self {
        Self(vec![0u8; 32])
    }
}

/// Notifications pushed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Exposed accounts changed; an empty list means the wallet disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
}

/// Events emitted by the game contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    GameCreated { code: GameCode, creator: Address },
    PlayerJoined { code: GameCode, player: Address },
}

/// Native currency descriptor used when asking a wallet to add a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of the single network the client accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkParams {
    /// Sepolia test network.
    pub fn sepolia() -> Self {
        Self {
            chain_id: ChainId::new("0xaa36a7"),
            chain_name: "Sepolia".to_string(),
            rpc_urls: vec!["https://rpc.sepolia.org".to_string()],
            native_currency: NativeCurrency {
                name: "SepoliaETH".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            block_explorer_urls: vec!["https://sepolia.etherscan.io".to_string()],
        }
    }

    /// Explorer link for a transaction, when an explorer is configured.
    pub fn transaction_url(&self, tx: &TransactionId) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx))
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::sepolia()
    }
}

/// Chain-specific configuration.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "Sepolia")
    fn network_name(&self) -> &str;

    /// Primary RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration
    fn validate(&self) -> Result<(), String>;
}

impl BlockchainConfig for NetworkParams {
    fn network_name(&self) -> &str {
        &self.chain_name
    }

    fn rpc_url(&self) -> &str {
        self.rpc_urls.first().map(String::as_str).unwrap_or("")
    }

    fn validate(&self) -> Result<(), String> {
        if !self.chain_id.as_str().starts_with("0x") {
            return Err(format!("Chain id must be 0x-prefixed hex: {}", self.chain_id));
        }

        if self.rpc_urls.is_empty() {
            return Err("At least one RPC URL is required".to_string());
        }

        for url in &self.rpc_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("Invalid RPC URL format: {}", url));
            }
        }

        if self.native_currency.symbol.is_empty() {
            return Err("Native currency symbol cannot be empty".to_string());
        }

        Ok(())
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
