//! Error types for the document registry client

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while connecting, pinning, anchoring or listing documents
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No wallet provider is available (missing endpoint or disconnected)
    #[error("No wallet provider available: {0}")]
    NoProvider(String),

    /// The wallet is on a different chain and could not be switched
    #[error("Chain mismatch: expected chain {expected}, wallet is on {actual}")]
    ChainMismatch {
        /// Chain id the registry is deployed on
        expected: u64,
        /// Chain id reported by the wallet
        actual: u64,
    },

    /// The user declined a wallet prompt (chain switch, chain add or account access)
    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    /// Upload to the pinning service failed or returned no content identifier
    #[error("Pin upload failed: {0}")]
    PinUpload(String),

    /// The user declined to sign the registry transaction
    #[error("Transaction rejected by user: {0}")]
    TransactionRejected(String),

    /// RPC-level failure while submitting the registry transaction
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    /// Gave up waiting for the transaction to be included
    #[error("Timed out after {seconds} seconds waiting for transaction {tx_hash}")]
    ConfirmationTimeout {
        /// Hash of the transaction that was being awaited
        tx_hash: String,
        /// Configured timeout
        seconds: u64,
    },

    /// The transaction was included but reverted
    #[error("Transaction {tx_hash} reverted: {reason}")]
    Reverted {
        /// Hash of the reverted transaction
        tx_hash: String,
        /// Whatever the node reported about the revert
        reason: String,
    },

    /// Resolving a single document record failed
    #[error("Failed to read document {id}: {message}")]
    ReadResolution {
        /// Document id that could not be resolved
        id: u64,
        /// Underlying failure
        message: String,
    },

    /// Contract call (read operation) failed
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Submission attempted without the required input
    #[error("{0}")]
    MissingInput(String),

    /// Deadline text could not be parsed
    #[error("Invalid deadline '{0}': expected YYYY-MM-DD, RFC 3339 or unix seconds")]
    InvalidDeadline(String),

    /// A registration is already in flight
    #[error("A registration is already in progress")]
    SubmissionInProgress,

    /// The registration state machine refused an event
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition {
        /// State name the machine was in
        from: &'static str,
        /// Event name that was refused
        event: &'static str,
    },

    /// ABI encoding/decoding error
    #[error("ABI error: {0}")]
    Abi(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegistryError {
    /// Check if this error came from the wallet side of a connection attempt
    pub fn is_wallet_error(&self) -> bool {
        matches!(
            self,
            Self::NoProvider(_) | Self::ChainMismatch { .. } | Self::UserRejected(_)
        )
    }

    /// Check if the user declined a prompt, as opposed to something breaking
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_) | Self::TransactionRejected(_))
    }

    /// Check if this error indicates a configuration problem
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Toml(_))
    }
}
