//! Helpers for constructing the wallet and contract handles a client uses.
use std::sync::Arc;

use client_blockchain_core::{Address, GameContract, MockChain, WalletProvider};

use crate::config::WalletBackend;

/// Wallet and contract handles for one client.
#[derive(Clone)]
pub struct ChainBundle {
    /// `None` when no wallet capability is installed.
    pub wallet: Option<Arc<dyn WalletProvider>>,
    pub contract: Arc<dyn GameContract>,
    /// Scripting handle when the chain is simulated in-process.
    pub local: Option<MockChain>,
}

pub trait ChainFactory: Send + Sync {
    fn build(&self) -> ChainBundle;
}

/// Factory for the in-process simulated chain.
///
/// The contract is always available; the wallet is only installed for
/// [`WalletBackend::Local`].
#[derive(Clone, Debug)]
pub struct LocalChainFactory {
    backend: WalletBackend,
    accounts: Vec<Address>,
}

impl LocalChainFactory {
    pub fn new(backend: WalletBackend, accounts: Vec<Address>) -> Self {
        Self { backend, accounts }
    }
}

impl ChainFactory for LocalChainFactory {
    fn build(&self) -> ChainBundle {
        let chain = MockChain::new(self.accounts.clone());

        let wallet: Option<Arc<dyn WalletProvider>> = match self.backend {
            WalletBackend::Local => Some(Arc::new(chain.clone())),
            WalletBackend::None => None,
        };

        ChainBundle {
            wallet,
            contract: Arc::new(chain.clone()),
            local: Some(chain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_backend_installs_no_wallet() {
        let bundle = LocalChainFactory::new(WalletBackend::None, Vec::new()).build();
        assert!(bundle.wallet.is_none());
        assert_eq!(bundle.contract.name(), "MockEncryptedWarriors");
    }

    #[test]
    fn local_backend_shares_one_chain() {
        let accounts = vec![Address::from_bytes([0x1a; 20])];
        let bundle = LocalChainFactory::new(WalletBackend::Local, accounts).build();
        assert!(bundle.wallet.is_some());
        assert!(bundle.local.is_some());
    }
}
