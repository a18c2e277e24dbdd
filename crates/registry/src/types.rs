//! Registry record types

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document anchored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registry-assigned id, 1-based and increasing in creation order
    pub id: u64,

    /// Content identifier returned by the pinning service
    pub content_hash: String,

    /// Account that submitted the document
    pub owner: Address,

    pub category: String,

    /// Free-form author list, possibly empty
    pub authors: String,

    /// Unix seconds, 0 when the document has no deadline
    pub deadline: u64,

    /// Unix seconds, set by the registry at write time
    pub upload_timestamp: u64,
}

impl DocumentRecord {
    pub fn has_deadline(&self) -> bool {
        self.deadline > 0
    }

    /// Owner as lowercase 0x-prefixed hex, the form used for substring filtering
    pub fn owner_hex(&self) -> String {
        format!("0x{:x}", self.owner)
    }
}

/// The arguments of one `uploadDocument` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub content_hash: String,
    pub category: String,
    pub authors: String,
    pub deadline: u64,
}

/// What the chain reported once a transaction was included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceiptInfo {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

impl fmt::Display for TransactionReceiptInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block_number {
            Some(block) => write!(f, "0x{:x} in block {} (gas {})", self.tx_hash, block, self.gas_used),
            None => write!(f, "0x{:x} (gas {})", self.tx_hash, self.gas_used),
        }
    }
}
