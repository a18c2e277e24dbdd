//! EIP-1193 wallet reached over HTTP JSON-RPC
//!
//! Every capability is forwarded verbatim as the JSON-RPC method a browser
//! wallet would receive, so the wallet on the other end keeps control of
//! prompts and signing. Works with wallets exposing an RPC endpoint (Frame)
//! and with dev nodes that hold unlocked accounts (Hardhat, Anvil).

use super::{ProviderError, ProviderResult, WalletProvider};
use crate::error::{RegistryError, Result};
use crate::networks::ChainParams;
use crate::types::TransactionReceiptInfo;
use alloy::primitives::{Address, Bytes, TxHash, U64};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::json_rpc::RpcRecv;
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

pub struct RpcWallet {
    provider: DynProvider,
    url: String,
}

impl RpcWallet {
    /// Create a wallet handle for the endpoint at `url`
    ///
    /// No request is made until the first capability is used.
    pub fn new(url: &str) -> Result<Self> {
        let rpc_url = url
            .parse()
            .map_err(|e| RegistryError::NoProvider(format!("Invalid wallet URL '{}': {}", url, e)))?;

        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();

        Ok(Self {
            provider,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<R>(&self, method: &'static str, params: Value) -> ProviderResult<R>
    where
        R: RpcRecv,
    {
        debug!("wallet request {} {}", method, params);
        self.provider
            .raw_request::<Value, R>(method.into(), params)
            .await
            .map_err(ProviderError::from)
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn chain_id(&self) -> ProviderResult<u64> {
        let chain_id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(chain_id.to::<u64>())
    }

    async fn switch_chain(&self, chain_id: u64) -> ProviderResult<()> {
        let _: Value = self
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("0x{:x}", chain_id) }]),
            )
            .await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainParams) -> ProviderResult<()> {
        let _: Value = self
            .request("wallet_addEthereumChain", json!([chain.add_chain_parameter()]))
            .await?;
        Ok(())
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        self.request("eth_requestAccounts", json!([])).await
    }

    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> ProviderResult<TxHash> {
        self.request(
            "eth_sendTransaction",
            json!([{ "from": from, "to": to, "data": data }]),
        )
        .await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ProviderResult<Option<TransactionReceiptInfo>> {
        let receipt: Option<TransactionReceipt> = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;

        Ok(receipt.map(|r| TransactionReceiptInfo {
            tx_hash: r.transaction_hash,
            block_number: r.block_number,
            gas_used: r.gas_used,
            success: r.status(),
        }))
    }
}
