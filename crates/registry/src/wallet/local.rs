//! Wallet backed by a locally held private key
//!
//! For headless use against a dev chain. Transactions are signed in-process
//! through an alloy `EthereumWallet`; there is nothing to prompt, so chain
//! switching is impossible and account access is always granted.

use super::{ProviderError, ProviderResult, WalletProvider, codes};
use crate::error::{RegistryError, Result};
use crate::networks::ChainParams;
use crate::types::TransactionReceiptInfo;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;

pub struct LocalKeyWallet {
    provider: DynProvider,
    address: Address,
}

impl LocalKeyWallet {
    /// Create a signing wallet for the node at `rpc_url`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The private key is invalid
    /// - The RPC URL is invalid
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self> {
        let signer = private_key.parse::<PrivateKeySigner>().map_err(|e| {
            RegistryError::Configuration(format!("Invalid private key: {}", e))
        })?;
        let address = signer.address();

        let wallet = EthereumWallet::from(signer);

        let url = rpc_url
            .parse()
            .map_err(|e| RegistryError::NoProvider(format!("Invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        Ok(Self { provider, address })
    }

    /// Address derived from the private key
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletProvider for LocalKeyWallet {
    async fn chain_id(&self) -> ProviderResult<u64> {
        self.provider.get_chain_id().await.map_err(ProviderError::from)
    }

    async fn switch_chain(&self, chain_id: u64) -> ProviderResult<()> {
        let current = self.chain_id().await?;
        if current == chain_id {
            Ok(())
        } else {
            Err(ProviderError::new(
                codes::UNRECOGNIZED_CHAIN,
                format!("node serves chain {}, cannot switch to {}", current, chain_id),
            ))
        }
    }

    async fn add_chain(&self, chain: &ChainParams) -> ProviderResult<()> {
        Err(ProviderError::new(
            codes::UNSUPPORTED_METHOD,
            format!("a local key wallet cannot add chain {}", chain.name),
        ))
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(vec![self.address])
    }

    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(tx).await.map_err(ProviderError::from)
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> ProviderResult<TxHash> {
        if from != self.address {
            return Err(ProviderError::new(
                codes::UNAUTHORIZED,
                format!("account 0x{:x} is not held by this wallet", from),
            ));
        }

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(ProviderError::from)?;

        let tx_hash = *pending_tx.tx_hash();
        debug!("Submitted transaction 0x{:x}", tx_hash);
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ProviderResult<Option<TransactionReceiptInfo>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(ProviderError::from)?;

        Ok(receipt.map(|r| TransactionReceiptInfo {
            tx_hash: r.transaction_hash,
            block_number: r.block_number,
            gas_used: r.gas_used,
            success: r.status(),
        }))
    }
}
