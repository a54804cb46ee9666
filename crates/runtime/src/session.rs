//! Wallet session lifecycle.

use std::sync::Arc;

use client_blockchain_core::{Address, ChainId, NetworkParams, WalletError, WalletEvent, WalletProvider};
use tokio::sync::broadcast;

use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, SessionEvent};

/// Active wallet connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub address: Address,
    pub chain_id: ChainId,
    /// Whether `chain_id` is the required network. Writes need this.
    pub chain_valid: bool,
}

/// Owns the wallet handle, the current [`Session`] and the wallet
/// notification subscription.
pub struct SessionManager {
    wallet: Option<Arc<dyn WalletProvider>>,
    network: NetworkParams,
    session: Option<Session>,
    subscription: Option<broadcast::Receiver<WalletEvent>>,
    bus: EventBus,
}

impl SessionManager {
    /// `wallet` is `None` when no wallet capability is installed.
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        network: NetworkParams,
        bus: EventBus,
    ) -> Self {
        Self {
            wallet,
            network,
            session: None,
            subscription: None,
            bus,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    fn wallet(&self) -> Result<&Arc<dyn WalletProvider>> {
        self.wallet.as_ref().ok_or(RuntimeError::NoWalletCapability)
    }

    fn chain_valid(&self, chain_id: &ChainId) -> bool {
        chain_id.matches(&self.network.chain_id)
    }

    /// Request accounts, take the first and subscribe to wallet notifications.
    pub async fn connect(&mut self) -> Result<Session> {
        let wallet = Arc::clone(self.wallet()?);

        let accounts = wallet.request_accounts().await?;
        let address = *accounts.first().ok_or(RuntimeError::NotConnected)?;
        let chain_id = wallet.chain_id().await?;

        let session = Session {
            address,
            chain_valid: self.chain_valid(&chain_id),
            chain_id,
        };

        // Subscribe after the request so the account exposure itself is not
        // replayed as a switch.
        self.subscription = Some(wallet.subscribe());
        self.session = Some(session.clone());

        tracing::info!(
            "Wallet connected: {} on chain {} (valid: {})",
            session.address,
            session.chain_id,
            session.chain_valid
        );
        self.bus.publish(SessionEvent::Connected {
            address: session.address,
            chain_id: session.chain_id.clone(),
            chain_valid: session.chain_valid,
        });

        Ok(session)
    }

    /// Clear the session and drop the notification subscription.
    ///
    /// Returns whether a session was active.
    pub fn disconnect(&mut self) -> bool {
        self.subscription = None;
        let was_connected = self.session.take().is_some();
        if was_connected {
            tracing::info!("Wallet disconnected");
            self.bus.publish(SessionEvent::Disconnected);
        }
        was_connected
    }

    /// Replace the active address after the wallet exposed another account.
    pub fn switch_account(&mut self, address: Address) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.address == address {
            return;
        }

        tracing::info!("Wallet account switched: {} -> {}", session.address, address);
        session.address = address;
        self.bus.publish(SessionEvent::AccountSwitched { address });
    }

    /// Recompute chain validity after a chain change notification.
    pub fn on_chain_changed(&mut self, chain_id: ChainId) {
        let chain_valid = self.chain_valid(&chain_id);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        tracing::info!("Wallet chain changed to {} (valid: {})", chain_id, chain_valid);
        session.chain_id = chain_id.clone();
        session.chain_valid = chain_valid;
        self.bus.publish(SessionEvent::ChainChanged {
            chain_id,
            chain_valid,
        });
    }

    /// Check that the wallet still signs as the session address.
    pub async fn verify(&self) -> Result<()> {
        let session = self.require_session()?;
        let wallet = self.wallet()?;

        let current = wallet.current_address().await.map_err(|err| match err {
            WalletError::SignerUnavailable(reason) => RuntimeError::SessionInvalid(reason),
            other => RuntimeError::from(other),
        })?;

        if current != session.address {
            return Err(RuntimeError::SessionInvalid(format!(
                "wallet signs as {}, session is {}",
                current, session.address
            )));
        }
        Ok(())
    }

    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(RuntimeError::NotConnected)
    }

    /// Session allowed to send transactions.
    pub fn require_writable(&self) -> Result<&Session> {
        let session = self.require_session()?;
        if !session.chain_valid {
            return Err(RuntimeError::WrongNetwork {
                expected: self.network.chain_id.clone(),
                actual: session.chain_id.clone(),
            });
        }
        Ok(session)
    }

    /// Ask the wallet to switch to the required network, registering it first
    /// when the wallet does not know it.
    pub async fn switch_network(&mut self) -> Result<()> {
        let wallet = Arc::clone(self.wallet()?);
        let required = self.network.chain_id.clone();

        match wallet.switch_chain(&required).await {
            Ok(()) => {}
            Err(WalletError::UnrecognizedChain(_)) => {
                tracing::info!("Wallet does not know chain {}, adding it", required);
                wallet
                    .add_chain(&self.network)
                    .await
                    .map_err(|err| match err {
                        WalletError::UserRejected => RuntimeError::UserRejected,
                        other => RuntimeError::SwitchNetwork(other.to_string()),
                    })?;
            }
            Err(WalletError::UserRejected) => return Err(RuntimeError::UserRejected),
            Err(other) => return Err(RuntimeError::SwitchNetwork(other.to_string())),
        }

        // The wallet also notifies; applying here keeps writes unblocked even
        // if that notification is delayed.
        let chain_id = wallet.chain_id().await?;
        self.on_chain_changed(chain_id);
        Ok(())
    }

    /// Next wallet notification; pending forever while disconnected.
    pub async fn next_event(&mut self) -> WalletEvent {
        loop {
            let Some(receiver) = self.subscription.as_mut() else {
                return std::future::pending::<WalletEvent>().await;
            };
            match recv_or_pending(receiver).await {
                Some(event) => return event,
                None => self.subscription = None,
            }
        }
    }
}

/// Receive from a broadcast channel, skipping over lag.
///
/// Returns `None` once the sender is gone.
pub(crate) async fn recv_or_pending<T: Clone>(receiver: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Notification receiver lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::MockChain;

    fn alice() -> Address {
        Address::from_bytes([0xa1; 20])
    }

    fn bob() -> Address {
        Address::from_bytes([0xb0; 20])
    }

    fn manager(chain: &MockChain) -> SessionManager {
        SessionManager::new(
            Some(Arc::new(chain.clone())),
            NetworkParams::sepolia(),
            EventBus::default(),
        )
    }

    #[tokio::test]
    async fn test_connect_without_wallet() {
        let mut sessions = SessionManager::new(None, NetworkParams::sepolia(), EventBus::default());
        assert!(matches!(
            sessions.connect().await,
            Err(RuntimeError::NoWalletCapability)
        ));
        assert!(sessions.session().is_none());
    }

    #[tokio::test]
    async fn test_connect_takes_first_account() {
        let chain = MockChain::new(vec![alice(), bob()]);
        let mut sessions = manager(&chain);

        let session = sessions.connect().await.unwrap();
        assert_eq!(session.address, alice());
        assert!(session.chain_valid);
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let chain = MockChain::new(vec![alice()]);
        chain.set_reject_requests(true);
        let mut sessions = manager(&chain);

        assert!(matches!(sessions.connect().await, Err(RuntimeError::UserRejected)));
    }

    #[tokio::test]
    async fn test_wrong_chain_blocks_writes() {
        let chain = MockChain::new(vec![alice()]).with_chain(ChainId::new("0x1"));
        let mut sessions = manager(&chain);

        let session = sessions.connect().await.unwrap();
        assert!(!session.chain_valid);
        assert!(matches!(
            sessions.require_writable(),
            Err(RuntimeError::WrongNetwork { .. })
        ));

        // Wallets report ids in any casing
        sessions.on_chain_changed(ChainId::new("0xAA36A7"));
        assert!(sessions.require_writable().is_ok());
    }

    #[tokio::test]
    async fn test_switch_network_adds_unknown_chain() {
        let chain = MockChain::new(vec![alice()]).with_chain(ChainId::new("0x1"));
        chain.forget_chain(&NetworkParams::sepolia().chain_id);
        let mut sessions = manager(&chain);
        sessions.connect().await.unwrap();

        sessions.switch_network().await.unwrap();
        assert!(sessions.require_writable().is_ok());
        assert!(chain.current_chain().matches(&NetworkParams::sepolia().chain_id));
    }

    #[tokio::test]
    async fn test_verify_detects_signer_mismatch() {
        let chain = MockChain::new(vec![alice()]);
        let mut sessions = manager(&chain);
        sessions.connect().await.unwrap();
        assert!(sessions.verify().await.is_ok());

        chain.set_signer_unavailable(true);
        assert!(sessions.verify().await.unwrap_err().is_session_invalid());

        chain.set_signer_unavailable(false);
        chain.set_accounts(vec![bob()]);
        assert!(sessions.verify().await.unwrap_err().is_session_invalid());
    }

    #[tokio::test]
    async fn test_notifications_after_connect() {
        let chain = MockChain::new(vec![alice()]);
        let mut sessions = manager(&chain);
        sessions.connect().await.unwrap();

        chain.set_accounts(vec![bob()]);
        assert_eq!(
            sessions.next_event().await,
            WalletEvent::AccountsChanged(vec![bob()])
        );

        assert!(sessions.disconnect());
        assert!(!sessions.disconnect());
    }
}
