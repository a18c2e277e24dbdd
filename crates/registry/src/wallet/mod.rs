//! Wallet session provider
//!
//! The signer is modelled as a capability (`WalletProvider`) injected into
//! whatever needs it, mirroring the EIP-1193 surface a browser wallet
//! exposes. `connect` drives the chain check and account request against
//! that capability and produces an explicit `WalletSession`.

pub mod local;
pub mod rpc;

use crate::error::{RegistryError, Result};
use crate::networks::ChainParams;
use crate::types::TransactionReceiptInfo;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, error, info, warn};

pub use local::LocalKeyWallet;
pub use rpc::RpcWallet;

/// EIP-1193 / EIP-3085 provider error codes
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    /// MetaMask's "unrecognized chain" answer to `wallet_switchEthereumChain`
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Failure reported by a wallet provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(codes::USER_REJECTED, message)
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(codes::DISCONNECTED, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == codes::USER_REJECTED
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self.code, codes::DISCONNECTED | codes::CHAIN_DISCONNECTED)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == codes::UNRECOGNIZED_CHAIN
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => Self::new(payload.code, payload.message.to_string()),
            RpcError::Transport(kind) => Self::disconnected(kind.to_string()),
            other => Self::new(codes::INTERNAL_ERROR, other.to_string()),
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Capability interface of an injected signer
///
/// Implementations must be substitutable: the registry client only ever
/// talks to the chain through this trait.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain the wallet is currently on
    async fn chain_id(&self) -> ProviderResult<u64>;

    /// Ask the wallet to switch to `chain_id`
    async fn switch_chain(&self, chain_id: u64) -> ProviderResult<()>;

    /// Ask the wallet to register a chain it does not know
    async fn add_chain(&self, chain: &ChainParams) -> ProviderResult<()>;

    /// Ask for account access; the first account is the active one
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Read-only contract call against the latest block
    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes>;

    /// Sign and submit a state-changing call; returns without waiting for inclusion
    async fn send_transaction(&self, from: Address, to: Address, data: Bytes)
    -> ProviderResult<TxHash>;

    /// Receipt of a transaction, `None` while it is still pending
    async fn transaction_receipt(&self, tx_hash: TxHash)
    -> ProviderResult<Option<TransactionReceiptInfo>>;
}

/// An authorised account on the expected chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSession {
    pub account: Address,
    pub chain_id: u64,
}

/// Connect to the wallet, making sure it is on `chain`
///
/// May prompt the user twice: once to switch (or add) the chain and once
/// for account access.
///
/// # Errors
///
/// - `NoProvider` if the wallet cannot be reached
/// - `UserRejected` if the user declines either prompt, or authorises no account
/// - `ChainMismatch` if the wallet cannot be moved to the expected chain
pub async fn connect(provider: &dyn WalletProvider, chain: &ChainParams) -> Result<WalletSession> {
    let current = provider
        .chain_id()
        .await
        .map_err(|e| RegistryError::NoProvider(e.to_string()))?;

    let chain_id = if current == chain.chain_id {
        current
    } else {
        info!(
            "Wallet is on chain {}, switching to {} ({})",
            current, chain.chain_id, chain.name
        );
        ensure_chain(provider, chain, current).await?;

        let switched = provider.chain_id().await.map_err(|e| {
            RegistryError::NoProvider(format!("lost wallet after chain switch: {}", e))
        })?;
        if switched != chain.chain_id {
            error!(
                "Wallet still on chain {} after switching to {}",
                switched, chain.chain_id
            );
            return Err(RegistryError::ChainMismatch {
                expected: chain.chain_id,
                actual: switched,
            });
        }
        switched
    };

    let accounts = provider.request_accounts().await.map_err(|e| {
        if e.is_user_rejection() {
            RegistryError::UserRejected(e.message)
        } else if e.is_disconnected() {
            RegistryError::NoProvider(e.to_string())
        } else {
            RegistryError::UserRejected(format!("account access failed: {}", e))
        }
    })?;

    let account = accounts
        .first()
        .copied()
        .ok_or_else(|| RegistryError::UserRejected("wallet authorized no accounts".to_string()))?;

    info!("Connected account 0x{:x} on chain {}", account, chain_id);
    Ok(WalletSession { account, chain_id })
}

async fn ensure_chain(provider: &dyn WalletProvider, chain: &ChainParams, current: u64) -> Result<()> {
    let mismatch = || RegistryError::ChainMismatch {
        expected: chain.chain_id,
        actual: current,
    };

    match provider.switch_chain(chain.chain_id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_unrecognized_chain() => {
            debug!("Chain {} unknown to wallet, adding it", chain.chain_id);
            provider.add_chain(chain).await.map_err(|add_err| {
                warn!("Failed to add chain {}: {}", chain.chain_id, add_err);
                if add_err.is_user_rejection() {
                    RegistryError::UserRejected(add_err.message)
                } else {
                    mismatch()
                }
            })
        }
        Err(e) if e.is_user_rejection() => {
            warn!("Failed to switch network: {}", e);
            Err(RegistryError::UserRejected(e.message))
        }
        Err(e) => {
            warn!("Failed to switch network: {}", e);
            Err(mismatch())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::sync::Mutex;

    /// Scripted wallet: answers chain queries from a queue
    struct ScriptedWallet {
        chain_ids: Mutex<Vec<ProviderResult<u64>>>,
        switch_result: ProviderResult<()>,
        add_result: ProviderResult<()>,
        accounts: ProviderResult<Vec<Address>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedWallet {
        fn new(chain_ids: Vec<ProviderResult<u64>>) -> Self {
            Self {
                chain_ids: Mutex::new(chain_ids.into_iter().rev().collect()),
                switch_result: Ok(()),
                add_result: Ok(()),
                accounts: Ok(vec![address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")]),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedWallet {
        async fn chain_id(&self) -> ProviderResult<u64> {
            self.calls.lock().unwrap().push("chain_id");
            self.chain_ids
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ProviderError::disconnected("script exhausted")))
        }

        async fn switch_chain(&self, _chain_id: u64) -> ProviderResult<()> {
            self.calls.lock().unwrap().push("switch_chain");
            self.switch_result.clone()
        }

        async fn add_chain(&self, _chain: &ChainParams) -> ProviderResult<()> {
            self.calls.lock().unwrap().push("add_chain");
            self.add_result.clone()
        }

        async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
            self.calls.lock().unwrap().push("request_accounts");
            self.accounts.clone()
        }

        async fn call(&self, _to: Address, _data: Bytes) -> ProviderResult<Bytes> {
            unreachable!("connect never calls contracts")
        }

        async fn send_transaction(
            &self,
            _from: Address,
            _to: Address,
            _data: Bytes,
        ) -> ProviderResult<TxHash> {
            unreachable!("connect never sends transactions")
        }

        async fn transaction_receipt(
            &self,
            _tx_hash: TxHash,
        ) -> ProviderResult<Option<TransactionReceiptInfo>> {
            unreachable!("connect never polls receipts")
        }
    }

    #[tokio::test]
    async fn test_connect_on_expected_chain() {
        let wallet = ScriptedWallet::new(vec![Ok(31337)]);
        let session = connect(&wallet, &ChainParams::hardhat()).await.unwrap();

        assert_eq!(session.chain_id, 31337);
        assert_eq!(
            session.account,
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(wallet.calls(), vec!["chain_id", "request_accounts"]);
    }

    #[tokio::test]
    async fn test_connect_switches_chain() {
        let wallet = ScriptedWallet::new(vec![Ok(1), Ok(31337)]);
        let session = connect(&wallet, &ChainParams::hardhat()).await.unwrap();

        assert_eq!(session.chain_id, 31337);
        assert_eq!(
            wallet.calls(),
            vec!["chain_id", "switch_chain", "chain_id", "request_accounts"]
        );
    }

    #[tokio::test]
    async fn test_connect_adds_unknown_chain() {
        let mut wallet = ScriptedWallet::new(vec![Ok(1), Ok(31337)]);
        wallet.switch_result = Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "unknown chain"));

        let session = connect(&wallet, &ChainParams::hardhat()).await.unwrap();

        assert_eq!(session.chain_id, 31337);
        assert_eq!(
            wallet.calls(),
            vec!["chain_id", "switch_chain", "add_chain", "chain_id", "request_accounts"]
        );
    }

    #[tokio::test]
    async fn test_connect_rejected_add_chain() {
        let mut wallet = ScriptedWallet::new(vec![Ok(1)]);
        wallet.switch_result = Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "unknown chain"));
        wallet.add_result = Err(ProviderError::user_rejected("User rejected the request."));

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(err, RegistryError::UserRejected(_)));
        assert_eq!(wallet.calls(), vec!["chain_id", "switch_chain", "add_chain"]);
    }

    #[tokio::test]
    async fn test_connect_add_chain_failure_is_chain_mismatch() {
        let mut wallet = ScriptedWallet::new(vec![Ok(1)]);
        wallet.switch_result = Err(ProviderError::new(codes::UNRECOGNIZED_CHAIN, "unknown chain"));
        wallet.add_result = Err(ProviderError::new(codes::UNSUPPORTED_METHOD, "method not supported"));

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(
            err,
            RegistryError::ChainMismatch {
                expected: 31337,
                actual: 1
            }
        ));
        assert!(!wallet.calls().contains(&"request_accounts"));
    }

    #[tokio::test]
    async fn test_connect_rejected_switch_aborts() {
        let mut wallet = ScriptedWallet::new(vec![Ok(1)]);
        wallet.switch_result = Err(ProviderError::user_rejected("User rejected the request."));

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(err, RegistryError::UserRejected(_)));
        assert_eq!(wallet.calls(), vec!["chain_id", "switch_chain"]);
    }

    #[tokio::test]
    async fn test_connect_switch_failure_is_chain_mismatch() {
        let mut wallet = ScriptedWallet::new(vec![Ok(1)]);
        wallet.switch_result = Err(ProviderError::new(codes::UNSUPPORTED_METHOD, "unsupported"));

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(
            err,
            RegistryError::ChainMismatch {
                expected: 31337,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_connect_chain_unchanged_after_switch() {
        let wallet = ScriptedWallet::new(vec![Ok(1), Ok(1)]);
        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(err, RegistryError::ChainMismatch { actual: 1, .. }));
        assert!(!wallet.calls().contains(&"request_accounts"));
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let wallet = ScriptedWallet::new(vec![Err(ProviderError::disconnected("connection refused"))]);
        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();

        assert!(matches!(err, RegistryError::NoProvider(_)));
    }

    #[tokio::test]
    async fn test_connect_rejected_accounts() {
        let mut wallet = ScriptedWallet::new(vec![Ok(31337)]);
        wallet.accounts = Err(ProviderError::user_rejected("User rejected the request."));

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();
        assert!(matches!(err, RegistryError::UserRejected(_)));
    }

    #[tokio::test]
    async fn test_connect_no_accounts() {
        let mut wallet = ScriptedWallet::new(vec![Ok(31337)]);
        wallet.accounts = Ok(Vec::new());

        let err = connect(&wallet, &ChainParams::hardhat()).await.unwrap_err();
        assert!(err.is_user_rejection());
    }
}
