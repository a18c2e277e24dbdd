//! Explicit session state tying wallet, pinning, contract and listing together
//!
//! There is no ambient state: the application owns its wallet session,
//! pipeline status, last error, listing and filters, and every component
//! receives its dependencies at construction.

use crate::config::RegistryConfig;
use crate::contract::RegistryContract;
use crate::error::{RegistryError, Result};
use crate::listing::{DocumentListing, ListingFilters};
use crate::networks::ChainParams;
use crate::orchestrator::{RegistrationForm, RegistrationState, Registrar};
use crate::pinning::{PinataClient, PinningService};
use crate::types::{DocumentRecord, TransactionReceiptInfo};
use crate::wallet::{self, LocalKeyWallet, RpcWallet, WalletProvider, WalletSession};
use std::sync::Arc;
use tracing::{error, info};

/// Maximum length of the diagnostic detail kept for the last error
const MAX_ERROR_DETAIL_LENGTH: usize = 999;

fn truncate_detail(message: &str) -> String {
    if message.len() <= MAX_ERROR_DETAIL_LENGTH {
        message.to_string()
    } else {
        let mut end = MAX_ERROR_DETAIL_LENGTH - 14;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &message[..end])
    }
}

pub struct RegistryApp {
    wallet: Arc<dyn WalletProvider>,
    contract: Arc<RegistryContract>,
    registrar: Registrar,
    chain: ChainParams,
    gateway_url: String,
    session: Option<WalletSession>,
    last_error: Option<String>,
    listing: DocumentListing,
    filters: ListingFilters,
}

impl RegistryApp {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        pinner: Arc<dyn PinningService>,
        contract: Arc<RegistryContract>,
        chain: ChainParams,
        gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            registrar: Registrar::new(pinner, contract.clone()),
            contract,
            chain,
            gateway_url: gateway_url.into(),
            session: None,
            last_error: None,
            listing: DocumentListing::default(),
            filters: ListingFilters::default(),
        }
    }

    /// Build the wallet, pinning client and contract client described by `config`
    ///
    /// A configured private key selects local signing; otherwise requests go
    /// to the EIP-1193 endpoint at `wallet_url`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        config.validate().map_err(RegistryError::Configuration)?;

        let wallet: Arc<dyn WalletProvider> = match config.private_key.as_deref() {
            Some(key) if config.signs_locally() => {
                Arc::new(LocalKeyWallet::new(&config.chain.rpc_url, key)?)
            }
            _ => Arc::new(RpcWallet::new(&config.wallet_url)?),
        };

        let pinner: Arc<dyn PinningService> = Arc::new(PinataClient::new(config.pinning.clone()));

        let contract = Arc::new(RegistryContract::from_address_str(
            wallet.clone(),
            &config.contract_address,
            config.confirmation_timeout(),
            config.poll_interval(),
        )?);

        Ok(Self::new(
            wallet,
            pinner,
            contract,
            config.chain.clone(),
            config.pinning.gateway_url.clone(),
        ))
    }

    /// Print (or otherwise surface) every pipeline state as it is entered
    pub fn with_status_observer(
        mut self,
        observer: impl Fn(&RegistrationState) + Send + Sync + 'static,
    ) -> Self {
        self.registrar = self.registrar.with_observer(observer);
        self
    }

    /// Connect the wallet; the listing is refetched when the account changes
    pub async fn connect(&mut self) -> Result<WalletSession> {
        let session = match wallet::connect(self.wallet.as_ref(), &self.chain).await {
            Ok(session) => session,
            Err(e) => {
                error!("Wallet connection failed: {}", e);
                self.last_error = Some(truncate_detail(&e.to_string()));
                return Err(e);
            }
        };

        let changed = self.session.map(|s| s.account) != Some(session.account);
        self.session = Some(session);
        if changed {
            self.refresh().await;
        }
        Ok(session)
    }

    /// Run the registration pipeline; on success the listing is refreshed
    pub async fn register(&mut self, form: &RegistrationForm) -> Result<TransactionReceiptInfo> {
        match self.registrar.submit(self.session.as_ref(), form).await {
            Ok(receipt) => {
                self.last_error = None;
                self.refresh().await;
                Ok(receipt)
            }
            Err(e) => {
                self.last_error = Some(truncate_detail(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Refetch the listing for the current filters
    ///
    /// A failed refresh keeps the previous listing and records the error.
    pub async fn refresh(&mut self) {
        match DocumentListing::refresh(&self.contract, &self.filters).await {
            Ok(listing) => self.listing = listing,
            Err(e) => {
                error!("Failed to fetch documents: {}", e);
                self.last_error = Some(truncate_detail(&e.to_string()));
            }
        }
    }

    /// Resolve a single record straight from the registry
    pub async fn document(&self, id: u64) -> Result<DocumentRecord> {
        self.contract.read_by_id(id).await
    }

    pub fn set_category_filter(&mut self, category: impl Into<String>) {
        self.filters.category = category.into();
    }

    pub fn set_owner_filter(&mut self, owner: impl Into<String>) {
        self.filters.owner = owner.into();
    }

    pub fn filters(&self) -> &ListingFilters {
        &self.filters
    }

    /// Records passing both filter layers, newest first
    pub fn visible_documents(&self) -> Vec<&DocumentRecord> {
        self.listing.visible(&self.filters).collect()
    }

    pub fn listing(&self) -> &DocumentListing {
        &self.listing
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> &RegistrationState {
        self.registrar.state()
    }

    pub fn history(&self) -> &[RegistrationState] {
        self.registrar.history()
    }

    /// Submission is disabled while a registration is in flight
    pub fn can_submit(&self) -> bool {
        self.session.is_some() && !self.registrar.state().is_in_flight()
    }

    pub fn status_line(&self) -> Option<String> {
        self.registrar.state().status_line()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Disconnected account 0x{:x}", session.account);
        }
    }
}
