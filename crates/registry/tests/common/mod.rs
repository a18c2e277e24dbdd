//! In-memory wallet and pinning doubles shared by the integration tests

#![allow(dead_code)]

use alloy::primitives::{Address, B256, Bytes, TxHash, U256, address};
use alloy::sol_types::{SolInterface, SolValue};
use async_trait::async_trait;
use doc_registry::abi::DocumentRegistry::DocumentRegistryCalls;
use doc_registry::networks::ChainParams;
use doc_registry::pinning::{PinFile, PinMetadata, PinningService};
use doc_registry::wallet::codes;
use doc_registry::{
    DocumentRecord, ProviderError, RegistryContract, RegistryError, TransactionReceiptInfo,
    WalletProvider,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const OTHER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Timestamp the fake registry stamps on the first upload
pub const FIRST_UPLOAD: u64 = 1_700_000_000;

#[derive(Default)]
pub struct RegistryState {
    documents: Vec<DocumentRecord>,
    receipts: HashMap<TxHash, TransactionReceiptInfo>,
}

/// A wallet connected to an in-memory DocumentRegistry
#[derive(Default)]
pub struct FakeRegistry {
    pub state: Mutex<RegistryState>,
    /// Ids whose `documents(id)` read fails
    pub failing_ids: Mutex<HashSet<u64>>,
    /// Make `getDocumentsByOwner`/`getDocumentsByCategory` fail
    pub fail_scoped_lookups: bool,
    /// Make `getTotalDocuments` fail
    pub fail_total: bool,
    /// Decline every signature request
    pub reject_signing: bool,
    /// Include transactions as reverted
    pub revert: bool,
    /// Never return a receipt
    pub never_confirm: bool,
    /// Refuse `send_transaction` with this error
    pub fail_send: Option<ProviderError>,
    /// Account handed out by `request_accounts`, `ACCOUNT` when unset
    pub account: Mutex<Option<Address>>,
    pub sends: AtomicUsize,
    pub receipt_polls: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry already holding `documents`, ids assigned in order
    pub fn with_documents(documents: Vec<(Address, &str)>) -> Self {
        let registry = Self::new();
        {
            let mut state = registry.state.lock().unwrap();
            for (owner, category) in documents {
                let id = state.documents.len() as u64 + 1;
                state.documents.push(DocumentRecord {
                    id,
                    content_hash: format!("QmSeed{}", id),
                    owner,
                    category: category.to_string(),
                    authors: String::new(),
                    deadline: 0,
                    upload_timestamp: FIRST_UPLOAD + id,
                });
            }
        }
        registry
    }

    pub fn switch_account(&self, account: Address) {
        *self.account.lock().unwrap() = Some(account);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_id(&self, id: u64) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.state.lock().unwrap().documents.clone()
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn receipt_polls(&self) -> usize {
        self.receipt_polls.load(Ordering::SeqCst)
    }

    fn reverted() -> ProviderError {
        ProviderError::new(codes::INTERNAL_ERROR, "execution reverted")
    }
}

#[async_trait]
impl WalletProvider for FakeRegistry {
    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(ChainParams::hardhat().chain_id)
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn add_chain(&self, _chain: &ChainParams) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(vec![self.account.lock().unwrap().unwrap_or(ACCOUNT)])
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(to, CONTRACT);

        let call = DocumentRegistryCalls::abi_decode(&data).map_err(|_| Self::reverted())?;
        let state = self.state.lock().unwrap();

        let encoded = match call {
            DocumentRegistryCalls::getTotalDocuments(_) => {
                if self.fail_total {
                    return Err(Self::reverted());
                }
                (U256::from(state.documents.len()),).abi_encode_params()
            }
            DocumentRegistryCalls::documents(c) => {
                let id = c.id.to::<u64>();
                if self.failing_ids.lock().unwrap().contains(&id) {
                    return Err(Self::reverted());
                }
                // Unassigned ids read as the zeroed struct, like a public mapping
                let doc = state
                    .documents
                    .iter()
                    .find(|d| d.id == id)
                    .cloned()
                    .unwrap_or(DocumentRecord {
                        id: 0,
                        content_hash: String::new(),
                        owner: Address::ZERO,
                        category: String::new(),
                        authors: String::new(),
                        deadline: 0,
                        upload_timestamp: 0,
                    });
                (
                    U256::from(doc.id),
                    doc.content_hash,
                    doc.owner,
                    doc.category,
                    doc.authors,
                    U256::from(doc.deadline),
                    U256::from(doc.upload_timestamp),
                )
                    .abi_encode_params()
            }
            DocumentRegistryCalls::getDocumentsByOwner(c) => {
                if self.fail_scoped_lookups {
                    return Err(Self::reverted());
                }
                let ids: Vec<U256> = state
                    .documents
                    .iter()
                    .filter(|d| d.owner == c.owner)
                    .map(|d| U256::from(d.id))
                    .collect();
                (ids,).abi_encode_params()
            }
            DocumentRegistryCalls::getDocumentsByCategory(c) => {
                if self.fail_scoped_lookups {
                    return Err(Self::reverted());
                }
                let ids: Vec<U256> = state
                    .documents
                    .iter()
                    .filter(|d| d.category == c.category)
                    .map(|d| U256::from(d.id))
                    .collect();
                (ids,).abi_encode_params()
            }
            DocumentRegistryCalls::uploadDocument(_) => return Err(Self::reverted()),
        };

        Ok(Bytes::from(encoded))
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ProviderError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        assert_eq!(to, CONTRACT);

        if self.reject_signing {
            return Err(ProviderError::user_rejected("User denied transaction signature."));
        }
        if let Some(err) = &self.fail_send {
            return Err(err.clone());
        }

        let DocumentRegistryCalls::uploadDocument(upload) =
            DocumentRegistryCalls::abi_decode(&data).map_err(|_| Self::reverted())?
        else {
            return Err(Self::reverted());
        };

        let mut state = self.state.lock().unwrap();
        let id = state.documents.len() as u64 + 1;
        let tx_hash = B256::with_last_byte(id as u8);

        if !self.revert {
            state.documents.push(DocumentRecord {
                id,
                content_hash: upload.docHash,
                owner: from,
                category: upload.category,
                authors: upload.authors,
                deadline: upload.deadline.to::<u64>(),
                upload_timestamp: FIRST_UPLOAD + id,
            });
        }

        state.receipts.insert(
            tx_hash,
            TransactionReceiptInfo {
                tx_hash,
                block_number: Some(id + 1),
                gas_used: 150_000,
                success: !self.revert,
            },
        );

        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceiptInfo>, ProviderError> {
        let polls = self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        if self.never_confirm {
            return Ok(None);
        }
        // The first poll always finds the transaction pending
        if polls == 0 {
            return Ok(None);
        }
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).cloned())
    }
}

/// Pinning double returning a fixed content identifier
pub struct FakePinner {
    pub hash: String,
    pub fail: bool,
    pub pins: AtomicUsize,
    pub last_metadata: Mutex<Option<PinMetadata>>,
}

impl FakePinner {
    pub fn new(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            fail: false,
            pins: AtomicUsize::new(0),
            last_metadata: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn pins(&self) -> usize {
        self.pins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PinningService for FakePinner {
    async fn pin(&self, _file: &PinFile, metadata: &PinMetadata) -> doc_registry::Result<String> {
        self.pins.fetch_add(1, Ordering::SeqCst);
        *self.last_metadata.lock().unwrap() = Some(metadata.clone());
        if self.fail {
            return Err(RegistryError::PinUpload("HTTP 500 Internal Server Error: down".to_string()));
        }
        Ok(self.hash.clone())
    }
}

pub fn contract(wallet: Arc<FakeRegistry>) -> Arc<RegistryContract> {
    contract_with_timeout(wallet, Duration::from_secs(5))
}

pub fn contract_with_timeout(wallet: Arc<FakeRegistry>, timeout: Duration) -> Arc<RegistryContract> {
    Arc::new(RegistryContract::new(
        wallet,
        CONTRACT,
        timeout,
        Duration::from_millis(5),
    ))
}
