//! Configuration for the registry client

use crate::networks::ChainParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Address of the first contract Hardhat deploys from its default account
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

pub const DEFAULT_PINATA_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

pub const DEFAULT_GATEWAY_URL: &str = "https://dweb.link/ipfs/";

/// Pinning service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    /// Multipart upload endpoint
    pub endpoint: String,

    /// Bearer credential (Pinata JWT)
    pub jwt: String,

    /// CID version requested from the pinning service (0 or 1)
    pub cid_version: u8,

    /// Gateway prefix used to build links to pinned content
    pub gateway_url: String,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PINATA_ENDPOINT.to_string(),
            jwt: String::new(),
            cid_version: 0,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

/// Configuration for the registry client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// EIP-1193 JSON-RPC endpoint of the wallet (or an unlocked dev node)
    /// Example: "http://127.0.0.1:1248" for Frame
    pub wallet_url: String,

    /// Private key for local signing (optional)
    /// When set, transactions are signed locally instead of by the wallet endpoint
    /// Format: 0x-prefixed hex string (64 hex chars + 0x prefix = 66 chars)
    pub private_key: Option<String>,

    /// Deployed DocumentRegistry contract address
    pub contract_address: String,

    /// Chain the contract is deployed on
    pub chain: ChainParams,

    /// Pinning service settings
    pub pinning: PinningConfig,

    /// How long to wait for a transaction to be included
    pub confirmation_timeout_secs: u64,

    /// Delay between receipt polls
    pub poll_interval_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            wallet_url: "http://127.0.0.1:8545".to_string(),
            private_key: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            chain: ChainParams::hardhat(),
            pinning: PinningConfig::default(),
            confirmation_timeout_secs: 120,
            poll_interval_ms: 500,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use doc_registry::RegistryConfig;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = RegistryConfig::from_file("docreg.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, anyhow::Error> {
        let config: Self = toml::from_str(toml)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
        Ok(config)
    }

    /// Override settings from the process environment
    ///
    /// A `.env` file is not read here; binaries load it once at startup.
    ///
    /// ## Environment Variables
    ///
    /// - `DOCREG_WALLET_URL`
    /// - `DOCREG_PRIVATE_KEY`
    /// - `DOCREG_CONTRACT_ADDRESS`
    /// - `PINATA_JWT`
    /// - `PINATA_ENDPOINT`
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = env::var("DOCREG_WALLET_URL") {
            self.wallet_url = url;
        }
        if let Ok(key) = env::var("DOCREG_PRIVATE_KEY") {
            self.private_key = Some(key);
        }
        if let Ok(address) = env::var("DOCREG_CONTRACT_ADDRESS") {
            self.contract_address = address;
        }
        if let Ok(jwt) = env::var("PINATA_JWT") {
            self.pinning.jwt = jwt;
        }
        if let Ok(endpoint) = env::var("PINATA_ENDPOINT") {
            self.pinning.endpoint = endpoint;
        }
        self
    }

    /// Target one of the named local networks instead of the configured `chain`
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the known networks if `name` is unknown
    pub fn with_network(mut self, name: &str) -> crate::error::Result<Self> {
        let chain = ChainParams::get_network(&name.to_lowercase()).ok_or_else(|| {
            crate::error::RegistryError::Configuration(format!(
                "Unknown network '{}', expected one of: {}",
                name,
                ChainParams::list_networks().join(", ")
            ))
        })?;
        self.chain = chain.clone();
        Ok(self)
    }

    /// Validate configuration
    ///
    /// Returns `Ok(())` if valid, otherwise returns error message
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url("wallet_url", &self.wallet_url)?;
        validate_http_url("chain.rpc_url", &self.chain.rpc_url)?;
        validate_http_url("pinning.endpoint", &self.pinning.endpoint)?;

        if self.contract_address.is_empty() {
            return Err("contract_address cannot be empty".to_string());
        }

        if !self.contract_address.starts_with("0x") {
            return Err("contract_address must start with 0x".to_string());
        }

        if self.contract_address.len() != 42 {
            return Err(format!(
                "contract_address must be 42 characters (0x + 40 hex), got {}",
                self.contract_address.len()
            ));
        }

        if !self.contract_address[2..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
        {
            return Err("contract_address must contain only hex characters after 0x".to_string());
        }

        if let Some(ref pk) = self.private_key {
            if !pk.is_empty() {
                if !pk.starts_with("0x") {
                    return Err("private_key must start with 0x".to_string());
                }

                if pk.len() != 66 {
                    return Err(format!(
                        "private_key must be 66 characters (0x + 64 hex), got {}",
                        pk.len()
                    ));
                }

                if !pk[2..].chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err("private_key must contain only hex characters after 0x".to_string());
                }
            }
        }

        if self.chain.chain_id == 0 {
            return Err("chain.chain_id must be > 0".to_string());
        }

        if self.pinning.cid_version > 1 {
            return Err(format!(
                "pinning.cid_version must be 0 or 1, got {}",
                self.pinning.cid_version
            ));
        }

        if self.confirmation_timeout_secs == 0 {
            return Err("confirmation_timeout_secs must be > 0".to_string());
        }

        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be > 0".to_string());
        }

        if self.poll_interval_ms > self.confirmation_timeout_secs * 1000 {
            return Err("poll_interval_ms must not exceed the confirmation timeout".to_string());
        }

        Ok(())
    }

    /// Check if transactions are signed locally (has private key)
    pub fn signs_locally(&self) -> bool {
        self.private_key.as_deref().is_some_and(|pk| !pk.is_empty())
    }

    /// Check if a pinning credential is configured
    pub fn can_pin(&self) -> bool {
        !self.pinning.jwt.is_empty()
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn validate_http_url(field: &str, url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("{} must start with http:// or https://", field));
    }

    Ok(())
}
