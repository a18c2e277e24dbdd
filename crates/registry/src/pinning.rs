//! Content pinning client
//!
//! Uploads a file plus side-metadata to an IPFS pinning service and returns
//! the content identifier. Uploads are single-shot: no retry, no chunking.
//! A failure after the body was sent may still have pinned the file
//! server-side; callers accept that the pin can be orphaned.

use crate::config::PinningConfig;
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// File contents to pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PinFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after its last path component
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinKeyValues {
    pub category: String,
    pub authors: String,
    pub uploaded_by: String,
}

/// `pinataMetadata` form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMetadata {
    pub name: String,
    pub keyvalues: PinKeyValues,
}

/// `pinataOptions` form field
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinOptions {
    cid_version: u8,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: Option<String>,
    #[serde(rename = "PinSize")]
    pin_size: Option<u64>,
}

/// A service that retains content-addressed files
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pin `file` and return its content identifier
    async fn pin(&self, file: &PinFile, metadata: &PinMetadata) -> Result<String>;
}

pub struct PinataClient {
    config: PinningConfig,
    client: reqwest::Client,
}

impl PinataClient {
    pub fn new(config: PinningConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: PinningConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn form(&self, file: &PinFile, metadata: &PinMetadata) -> Result<Form> {
        let options = PinOptions {
            cid_version: self.config.cid_version,
        };

        Ok(Form::new()
            .part(
                "file",
                Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
            )
            .text("pinataMetadata", serde_json::to_string(metadata)?)
            .text("pinataOptions", serde_json::to_string(&options)?))
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin(&self, file: &PinFile, metadata: &PinMetadata) -> Result<String> {
        let form = self.form(file, metadata)?;

        info!("Uploading {} ({} bytes) to IPFS", file.name, file.bytes.len());
        let start = Instant::now();

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RegistryError::PinUpload(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        info!("Uploaded in {:?}", start.elapsed());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "pinFileToIPFS failed: {} {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            );
            return Err(RegistryError::PinUpload(format!("HTTP {}: {}", status, body)));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::PinUpload(format!("Failed to parse response: {}", e)))?;

        match pinned.ipfs_hash {
            Some(hash) if !hash.is_empty() => {
                info!(
                    "IPFS hash: {} (pin size {})",
                    hash,
                    pinned.pin_size.unwrap_or_default()
                );
                Ok(hash)
            }
            _ => Err(RegistryError::PinUpload(
                "No IPFS hash returned from pinning service".to_string(),
            )),
        }
    }
}
