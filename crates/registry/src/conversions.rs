//! Helper functions for type conversions between Solidity and Rust types

use crate::abi::DocumentRegistry::documentsReturn;
use crate::types::DocumentRecord;
use alloy::primitives::{Address, TxHash, U256};

/// Convert Alloy Address to lowercase hex string with 0x prefix
pub fn address_to_string(addr: Address) -> String {
    format!("0x{:x}", addr)
}

pub fn tx_hash_to_string(hash: TxHash) -> String {
    format!("0x{:x}", hash)
}

/// Convert a Solidity uint256 to u64
/// Safely handles overflow by capping at u64::MAX
pub fn u256_to_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.to::<u64>()
    }
}

/// Convert a list of Solidity ids to u64
pub fn ids_to_u64(ids: Vec<U256>) -> Vec<u64> {
    ids.into_iter().map(u256_to_u64).collect()
}

/// Convert the `documents(uint256)` getter tuple into a record
pub fn record_from_getter(raw: documentsReturn) -> DocumentRecord {
    DocumentRecord {
        id: u256_to_u64(raw.id),
        content_hash: raw.docHash,
        owner: raw.owner,
        category: raw.category,
        authors: raw.authors,
        deadline: u256_to_u64(raw.deadline),
        upload_timestamp: u256_to_u64(raw.uploadTimestamp),
    }
}
