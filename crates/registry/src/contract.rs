//! Registry contract client
//!
//! Wraps the calls the client makes against the deployed DocumentRegistry:
//! one write (`uploadDocument`) and the reads used to enumerate records.
//! Everything is routed through the injected wallet capability.

use crate::abi::DocumentRegistry::{
    documentsCall, getDocumentsByCategoryCall, getDocumentsByOwnerCall, getTotalDocumentsCall,
    uploadDocumentCall,
};
use crate::conversions::{ids_to_u64, record_from_getter, tx_hash_to_string, u256_to_u64};
use crate::error::{RegistryError, Result};
use crate::types::{DocumentRecord, NewDocument, TransactionReceiptInfo};
use crate::wallet::{WalletProvider, WalletSession};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct RegistryContract {
    wallet: Arc<dyn WalletProvider>,
    address: Address,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RegistryContract {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        address: Address,
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            wallet,
            address,
            confirmation_timeout,
            poll_interval,
        }
    }

    /// Creates a client from the configured contract address string
    ///
    /// # Errors
    ///
    /// Returns an error if the contract address is invalid
    pub fn from_address_str(
        wallet: Arc<dyn WalletProvider>,
        address: &str,
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        let address = Address::from_str(address).map_err(|e| {
            RegistryError::Configuration(format!("Invalid contract address '{}': {}", address, e))
        })?;
        Ok(Self::new(wallet, address, confirmation_timeout, poll_interval))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Submit `uploadDocument` from the session account
    ///
    /// Returns as soon as the wallet hands back a transaction hash; inclusion
    /// is awaited separately with [`RegistryContract::await_confirmation`].
    pub async fn write_upload_document(
        &self,
        session: &WalletSession,
        document: &NewDocument,
    ) -> Result<TxHash> {
        debug!(
            "Submitting uploadDocument({}, {}, {}, {}) from 0x{:x}",
            document.content_hash, document.category, document.authors, document.deadline, session.account
        );

        let call = uploadDocumentCall {
            docHash: document.content_hash.clone(),
            category: document.category.clone(),
            authors: document.authors.clone(),
            deadline: U256::from(document.deadline),
        };

        let tx_hash = self
            .wallet
            .send_transaction(session.account, self.address, Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    RegistryError::TransactionRejected(e.message)
                } else {
                    RegistryError::Submission(e.to_string())
                }
            })?;

        info!("Transaction sent: {}", tx_hash_to_string(tx_hash));
        Ok(tx_hash)
    }

    /// Wait until `tx_hash` is included
    ///
    /// The timeout is advisory: the transaction may still land after this
    /// returns `ConfirmationTimeout`.
    pub async fn await_confirmation(&self, tx_hash: TxHash) -> Result<TransactionReceiptInfo> {
        let receipt = tokio::time::timeout(self.confirmation_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| {
                warn!(
                    "Gave up waiting for {} after {:?}",
                    tx_hash_to_string(tx_hash),
                    self.confirmation_timeout
                );
                RegistryError::ConfirmationTimeout {
                    tx_hash: tx_hash_to_string(tx_hash),
                    seconds: self.confirmation_timeout.as_secs(),
                }
            })??;

        if !receipt.success {
            return Err(RegistryError::Reverted {
                tx_hash: tx_hash_to_string(tx_hash),
                reason: match receipt.block_number {
                    Some(block) => format!("execution reverted in block {}", block),
                    None => "execution reverted".to_string(),
                },
            });
        }

        info!("Transaction confirmed: {}", receipt);
        Ok(receipt)
    }

    async fn poll_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceiptInfo> {
        loop {
            let receipt = self
                .wallet
                .transaction_receipt(tx_hash)
                .await
                .map_err(|e| RegistryError::Submission(format!("Failed to fetch receipt: {}", e)))?;

            match receipt {
                Some(receipt) => return Ok(receipt),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    async fn read<C: SolCall>(&self, call: C) -> std::result::Result<C::Return, String> {
        let output = self
            .wallet
            .call(self.address, Bytes::from(call.abi_encode()))
            .await
            .map_err(|e| e.to_string())?;

        C::abi_decode_returns(&output).map_err(|e| format!("ABI decode of {}: {}", C::SIGNATURE, e))
    }

    /// Number of documents registered so far; ids run from 1 to this value
    pub async fn read_total(&self) -> Result<u64> {
        let total = self
            .read(getTotalDocumentsCall {})
            .await
            .map_err(RegistryError::ContractCall)?;

        debug!("Total documents: {}", total);
        Ok(u256_to_u64(total))
    }

    pub async fn read_by_id(&self, id: u64) -> Result<DocumentRecord> {
        let raw = self
            .read(documentsCall { id: U256::from(id) })
            .await
            .map_err(|message| RegistryError::ReadResolution { id, message })?;

        // The public mapping getter answers unassigned ids with a zeroed struct
        let record = record_from_getter(raw);
        if record.id != id {
            return Err(RegistryError::ReadResolution {
                id,
                message: "no such document".to_string(),
            });
        }
        Ok(record)
    }

    /// Ids of the documents submitted by `owner`
    pub async fn read_by_owner(&self, owner: Address) -> Result<Vec<u64>> {
        let ids = self
            .read(getDocumentsByOwnerCall { owner })
            .await
            .map_err(RegistryError::ContractCall)?;

        Ok(ids_to_u64(ids))
    }

    /// Ids of the documents registered under exactly `category`
    pub async fn read_by_category(&self, category: &str) -> Result<Vec<u64>> {
        let ids = self
            .read(getDocumentsByCategoryCall {
                category: category.to_string(),
            })
            .await
            .map_err(RegistryError::ContractCall)?;

        Ok(ids_to_u64(ids))
    }
}
