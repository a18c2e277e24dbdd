//! Target chain parameters
//!
//! The registry is deployed on a local development chain. These are the
//! parameters a wallet needs to switch to it, or to register it when the
//! wallet has never seen it.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain the registry contract lives on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub native_currency: NativeCurrency,
}

/// Payload of `wallet_addEthereumChain` (EIP-3085)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameter {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
}

impl ChainParams {
    /// Hardhat node on its default port
    pub fn hardhat() -> Self {
        Self {
            name: "Hardhat".to_string(),
            chain_id: 31337,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            native_currency: NativeCurrency {
                name: "Hardhat ETH".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        }
    }

    /// Look up a known local network by name
    pub fn get_network(name: &str) -> Option<&'static ChainParams> {
        NETWORKS.get(name)
    }

    /// Names accepted by [`ChainParams::get_network`], sorted
    pub fn list_networks() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = NETWORKS.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Chain id as the 0x-prefixed hex quantity wallets expect
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn add_chain_parameter(&self) -> AddChainParameter {
        AddChainParameter {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::hardhat()
    }
}

static NETWORKS: Lazy<HashMap<String, ChainParams>> = Lazy::new(|| {
    let mut networks = HashMap::new();

    networks.insert("hardhat".to_string(), ChainParams::hardhat());

    // Anvil defaults to chain id 31337 as well, but is usually named separately
    networks.insert(
        "anvil".to_string(),
        ChainParams {
            name: "Anvil".to_string(),
            chain_id: 31337,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        },
    );

    networks.insert(
        "ganache".to_string(),
        ChainParams {
            name: "Ganache".to_string(),
            chain_id: 1337,
            rpc_url: "http://127.0.0.1:7545".to_string(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        },
    );

    networks
});
