//! Listing & filter view
//!
//! Two filter layers apply together: an on-chain scope that decides which
//! ids are fetched, and case-insensitive substring filters applied to
//! whatever was fetched.

use crate::contract::RegistryContract;
use crate::error::Result;
use crate::types::DocumentRecord;
use alloy::primitives::Address;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilters {
    /// Category substring
    pub category: String,
    /// Owner substring; a complete address also scopes the on-chain fetch
    pub owner: String,
}

/// Where the ids of a refresh come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    Owner(Address),
    Category(String),
    All,
}

impl ListingFilters {
    pub fn new(category: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            owner: owner.into(),
        }
    }

    /// Owner filter parsed as an address, when it is a complete one
    pub fn owner_address(&self) -> Option<Address> {
        let owner = self.owner.trim();
        if owner.starts_with("0x") {
            Address::from_str(owner).ok()
        } else {
            None
        }
    }

    pub fn scope(&self) -> ListingScope {
        if let Some(owner) = self.owner_address() {
            ListingScope::Owner(owner)
        } else if !self.category.trim().is_empty() {
            ListingScope::Category(self.category.trim().to_string())
        } else {
            ListingScope::All
        }
    }

    /// Client-side match, independent of how the record was fetched
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        let category = self.category.trim().to_lowercase();
        let owner = self.owner.trim().to_lowercase();

        (category.is_empty() || record.category.to_lowercase().contains(&category))
            && (owner.is_empty() || record.owner_hex().contains(&owner))
    }
}

/// Documents as last fetched from the registry, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListing {
    records: Vec<DocumentRecord>,
}

impl DocumentListing {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self { records }
    }

    /// Fetch the records selected by `filters`' on-chain scope
    ///
    /// Ids are resolved one by one in ascending order. A record that fails
    /// to resolve is logged and dropped; it never blanks the listing. If
    /// the scoped id lookup fails, every id is enumerated instead.
    pub async fn refresh(contract: &RegistryContract, filters: &ListingFilters) -> Result<Self> {
        let ids = match scoped_ids(contract, &filters.scope()).await {
            Some(ids) => ids,
            None => {
                let total = contract.read_total().await?;
                (1..=total).collect()
            }
        };

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match contract.read_by_id(id).await {
                Ok(record) => {
                    debug!("Document {}: {:?}", id, record);
                    records.push(record);
                }
                Err(e) => error!("Error reading document {}: {}", id, e),
            }
        }

        records.reverse();
        info!("Fetched {} documents", records.len());
        Ok(Self { records })
    }

    /// Every fetched record, newest first
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Fetched records that pass the client-side filters
    pub fn visible<'a>(&'a self, filters: &'a ListingFilters) -> impl Iterator<Item = &'a DocumentRecord> + 'a {
        self.records.iter().filter(move |r| filters.matches(r))
    }

    pub fn get(&self, id: u64) -> Option<&DocumentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

async fn scoped_ids(contract: &RegistryContract, scope: &ListingScope) -> Option<Vec<u64>> {
    let result = match scope {
        ListingScope::All => return None,
        ListingScope::Owner(owner) => contract.read_by_owner(*owner).await,
        ListingScope::Category(category) => contract.read_by_category(category).await,
    };

    match result {
        Ok(ids) => Some(ids),
        Err(e) => {
            warn!("Scoped lookup {:?} failed, enumerating all documents: {}", scope, e);
            None
        }
    }
}
