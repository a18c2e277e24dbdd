//! Registration pipeline
//!
//! `pin → sign → confirm` as an explicit state machine. [`transition`] is a
//! pure function over [`RegistrationState`] and [`RegistrationEvent`];
//! [`Registrar`] drives it against the pinning service and the registry
//! contract, one step at a time. Nothing is retried and nothing is rolled
//! back: a failure after pinning leaves the pinned content orphaned.

use crate::contract::RegistryContract;
use crate::conversions::{address_to_string, tx_hash_to_string};
use crate::display::parse_deadline;
use crate::error::{RegistryError, Result};
use crate::pinning::{PinFile, PinKeyValues, PinMetadata, PinningService};
use crate::types::{NewDocument, TransactionReceiptInfo};
use crate::wallet::WalletSession;
use alloy::primitives::TxHash;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Prompt shown when a submission lacks a file or a connected account
pub const MISSING_INPUT_PROMPT: &str = "Please connect wallet and select a file.";

/// Status line shown for any failure; details go to the log
pub const FAILURE_NOTICE: &str = "An error occurred. See the logs for details.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Idle,
    Pinning,
    AwaitingSignature {
        content_hash: String,
    },
    AwaitingConfirmation {
        content_hash: String,
        tx_hash: TxHash,
    },
    Succeeded {
        content_hash: String,
        receipt: TransactionReceiptInfo,
    },
    Failed {
        message: String,
    },
}

impl RegistrationState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Pinning => "Pinning",
            Self::AwaitingSignature { .. } => "AwaitingSignature",
            Self::AwaitingConfirmation { .. } => "AwaitingConfirmation",
            Self::Succeeded { .. } => "Succeeded",
            Self::Failed { .. } => "Failed",
        }
    }

    /// A pipeline step is running; the submit control must stay disabled
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Pinning | Self::AwaitingSignature { .. } | Self::AwaitingConfirmation { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// The rolling status line for this state, `None` when idle
    pub fn status_line(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Pinning => Some("1/3: Uploading file to IPFS...".to_string()),
            Self::AwaitingSignature { content_hash } => Some(format!(
                "2/3: File uploaded! Hash: {}. Please confirm the transaction in your wallet...",
                content_hash
            )),
            Self::AwaitingConfirmation { .. } => {
                Some("3/3: Transaction sent! Waiting for confirmation...".to_string())
            }
            Self::Succeeded { receipt, .. } => Some(format!(
                "Success! Document registered on the blockchain. Tx: {}",
                tx_hash_to_string(receipt.tx_hash)
            )),
            Self::Failed { .. } => Some(FAILURE_NOTICE.to_string()),
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    Submit,
    Pinned { content_hash: String },
    Submitted { tx_hash: TxHash },
    Confirmed { receipt: TransactionReceiptInfo },
    Failed { message: String },
}

impl RegistrationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit => "Submit",
            Self::Pinned { .. } => "Pinned",
            Self::Submitted { .. } => "Submitted",
            Self::Confirmed { .. } => "Confirmed",
            Self::Failed { .. } => "Failed",
        }
    }
}

/// Next state for `event` in `state`
///
/// Illegal pairs are refused and the caller keeps its current state.
pub fn transition(
    state: &RegistrationState,
    event: RegistrationEvent,
) -> Result<RegistrationState> {
    use RegistrationEvent as E;
    use RegistrationState as S;

    match (state, event) {
        (S::Idle | S::Succeeded { .. } | S::Failed { .. }, E::Submit) => Ok(S::Pinning),
        (s, E::Submit) if s.is_in_flight() => Err(RegistryError::SubmissionInProgress),
        (S::Pinning, E::Pinned { content_hash }) => Ok(S::AwaitingSignature { content_hash }),
        (S::AwaitingSignature { content_hash }, E::Submitted { tx_hash }) => {
            Ok(S::AwaitingConfirmation {
                content_hash: content_hash.clone(),
                tx_hash,
            })
        }
        (S::AwaitingConfirmation { content_hash, tx_hash }, E::Confirmed { receipt })
            if receipt.tx_hash == *tx_hash =>
        {
            Ok(S::Succeeded {
                content_hash: content_hash.clone(),
                receipt,
            })
        }
        (s, E::Failed { message }) if s.is_in_flight() => Ok(S::Failed { message }),
        (s, e) => Err(RegistryError::InvalidTransition {
            from: s.name(),
            event: e.name(),
        }),
    }
}

/// Form input for one registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub file: Option<PinFile>,
    pub category: String,
    pub authors: String,
    /// Raw deadline text; empty means no deadline
    pub deadline: String,
}

impl RegistrationForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

type Observer = Box<dyn Fn(&RegistrationState) + Send + Sync>;

/// Drives one registration at a time through the pipeline
pub struct Registrar {
    pinner: Arc<dyn PinningService>,
    contract: Arc<RegistryContract>,
    state: RegistrationState,
    history: Vec<RegistrationState>,
    observer: Option<Observer>,
}

impl Registrar {
    pub fn new(pinner: Arc<dyn PinningService>, contract: Arc<RegistryContract>) -> Self {
        Self {
            pinner,
            contract,
            state: RegistrationState::Idle,
            history: vec![RegistrationState::Idle],
            observer: None,
        }
    }

    /// Call `observer` on every state entered, e.g. to print the status line
    pub fn with_observer(mut self, observer: impl Fn(&RegistrationState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    /// States visited by the current (or last) run, starting state included
    pub fn history(&self) -> &[RegistrationState] {
        &self.history
    }

    fn apply(&mut self, event: RegistrationEvent) -> Result<()> {
        let next = transition(&self.state, event)?;
        info!("Registration: {} -> {}", self.state, next);
        if let Some(observer) = &self.observer {
            observer(&next);
        }
        self.history.push(next.clone());
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, err: RegistryError) -> RegistryError {
        error!("Registration failed in {}: {}", self.state, err);
        // Only in-flight states accept Failed; the error is returned either way
        let _ = self.apply(RegistrationEvent::Failed {
            message: err.to_string(),
        });
        err
    }

    /// Run the whole pipeline for `form`
    ///
    /// Rejected without any state change when no file is selected, no
    /// account is connected, the deadline does not parse, or a run is
    /// already in flight.
    pub async fn submit(
        &mut self,
        session: Option<&WalletSession>,
        form: &RegistrationForm,
    ) -> Result<TransactionReceiptInfo> {
        let (Some(session), Some(file)) = (session, form.file.as_ref()) else {
            return Err(RegistryError::MissingInput(MISSING_INPUT_PROMPT.to_string()));
        };

        if self.state.is_in_flight() {
            return Err(RegistryError::SubmissionInProgress);
        }

        let deadline = parse_deadline(&form.deadline)?;

        self.history = vec![self.state.clone()];
        self.apply(RegistrationEvent::Submit)?;

        let metadata = PinMetadata {
            name: file.name.clone(),
            keyvalues: PinKeyValues {
                category: form.category.clone(),
                authors: form.authors.clone(),
                uploaded_by: address_to_string(session.account),
            },
        };

        let content_hash = match self.pinner.pin(file, &metadata).await {
            Ok(hash) => hash,
            Err(e) => return Err(self.fail(e)),
        };
        self.apply(RegistrationEvent::Pinned {
            content_hash: content_hash.clone(),
        })?;

        let document = NewDocument {
            content_hash: content_hash.clone(),
            category: form.category.clone(),
            authors: form.authors.clone(),
            deadline,
        };

        let tx_hash = match self.contract.write_upload_document(session, &document).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!("Pinned content {} is orphaned: no transaction was sent", content_hash);
                return Err(self.fail(e));
            }
        };
        self.apply(RegistrationEvent::Submitted { tx_hash })?;

        let receipt = match self.contract.await_confirmation(tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(e)),
        };
        self.apply(RegistrationEvent::Confirmed {
            receipt: receipt.clone(),
        })?;

        Ok(receipt)
    }
}
