//! Document registry client
//!
//! Registers files in an on-chain DocumentRegistry: the file is pinned to
//! IPFS, its content identifier and metadata are written to the contract
//! from a connected wallet, and the registry's records are listed back
//! with owner and category filters.
//!
//! # Example
//!
//! ```ignore
//! use doc_registry::{RegistryApp, RegistryConfig, RegistrationForm, PinFile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig::default().apply_env();
//! let mut app = RegistryApp::from_config(&config)?;
//! app.connect().await?;
//!
//! let form = RegistrationForm {
//!     file: Some(PinFile::from_path("paper.pdf").await?),
//!     category: "research".to_string(),
//!     authors: "Alice, Bob".to_string(),
//!     deadline: "2030-01-15".to_string(),
//! };
//! let receipt = app.register(&form).await?;
//! println!("{}", receipt);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod app;
pub mod config;
pub mod contract;
pub mod conversions;
pub mod display;
pub mod error;
pub mod listing;
pub mod networks;
pub mod orchestrator;
pub mod pinning;
pub mod types;
pub mod wallet;

pub use app::RegistryApp;
pub use config::{PinningConfig, RegistryConfig};
pub use contract::RegistryContract;
pub use error::{RegistryError, Result};
pub use listing::{DocumentListing, ListingFilters, ListingScope};
pub use networks::ChainParams;
pub use orchestrator::{RegistrationEvent, RegistrationForm, RegistrationState, Registrar, transition};
pub use pinning::{PinFile, PinMetadata, PinataClient, PinningService};
pub use types::{DocumentRecord, NewDocument, TransactionReceiptInfo};
pub use wallet::{LocalKeyWallet, ProviderError, RpcWallet, WalletProvider, WalletSession};
