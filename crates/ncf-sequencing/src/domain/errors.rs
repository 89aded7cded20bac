//! # Domain Errors
//!
//! Error taxonomy for NCF sequencing.
//!
//! | Category | Raised when | Caller action |
//! |----------|-------------|---------------|
//! | Configuration | No eligible active sequence, unknown type | Operator creates/activates one |
//! | Validation | Malformed, overlapping or retroactive range | Fix the range, never persisted |
//! | SequenceState | `NotActive`, `Expired`, `Depleted` | Abort document posting |
//! | LockConflict | Row busy or CAS lost | Retry the whole posting operation |
//! | Integrity | Identifier already in the ledger | Halt and alert an operator |

use chrono::NaiveDate;
use thiserror::Error;

use super::value_objects::{CompanyId, SequenceId, SequenceState};

/// Range validation failures, raised only at configuration time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `range_from < 1` or `range_to <= range_from`.
    #[error("Malformed range {range_from}-{range_to}: range_from must be >= 1 and range_to greater than range_from")]
    MalformedRange {
        /// Proposed start
        range_from: u64,
        /// Proposed end
        range_to: u64,
    },

    /// `range_to` does not fit in the numeric body of the identifier.
    #[error("Range end {range_to} exceeds the {digits}-digit capacity ({max}) of prefix {prefix}")]
    ExceedsFormatCapacity {
        /// Type prefix
        prefix: String,
        /// Proposed end
        range_to: u64,
        /// Body width of the format
        digits: usize,
        /// Largest representable number
        max: u64,
    },

    /// The candidate intersects an existing sequence of the same company and type.
    #[error("[{prefix}] Range {range_from}-{range_to} overlaps sequence {existing_id} ({existing_from}-{existing_to})")]
    Overlap {
        /// Type prefix
        prefix: String,
        /// Proposed start
        range_from: u64,
        /// Proposed end
        range_to: u64,
        /// Conflicting sequence
        existing_id: SequenceId,
        /// Conflicting start
        existing_from: u64,
        /// Conflicting end
        existing_to: u64,
    },

    /// The candidate would re-issue a number already consumed by a document.
    #[error("[{prefix}] Range start {range_from} must be greater than the last issued number {last_consumed} ({last_identifier}); minimum allowed start is {}", .last_consumed + 1)]
    Retroactive {
        /// Type prefix
        prefix: String,
        /// Proposed start
        range_from: u64,
        /// Highest consumed number
        last_consumed: u64,
        /// Identifier that carried the highest consumed number
        last_identifier: String,
    },

    /// Ranges must be authorized in strictly ascending order.
    #[error("[{prefix}] Range start {range_from} must be greater than the last authorized range end {previous_to}")]
    NonAscending {
        /// Type prefix
        prefix: String,
        /// Proposed start
        range_from: u64,
        /// Highest `range_to` among prior sequences
        previous_to: u64,
    },
}

impl ValidationError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRange { .. } => "malformed",
            Self::ExceedsFormatCapacity { .. } => "capacity",
            Self::Overlap { .. } => "overlap",
            Self::Retroactive { .. } => "retroactive",
            Self::NonAscending { .. } => "non_ascending",
        }
    }
}

/// Type catalog registration failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Code is not exactly two ASCII digits.
    #[error("Invalid document type code {0:?}: expected 2 digits")]
    InvalidCode(String),

    /// Prefix is not exactly three uppercase alphanumeric characters.
    #[error("Invalid prefix {0:?}: expected 3 uppercase alphanumeric characters")]
    InvalidPrefix(String),

    /// Validity must be at least one year.
    #[error("Invalid validity of {0} years for document type")]
    InvalidValidity(u32),

    /// Code already registered.
    #[error("Document type code {0} already registered")]
    DuplicateCode(String),

    /// Prefix already registered.
    #[error("Prefix {0} already registered")]
    DuplicatePrefix(String),
}

/// Broad classification of [`NcfError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Operator must create or activate configuration.
    Configuration,
    /// Rejected range; nothing persisted.
    Validation,
    /// Sequence lifecycle refuses the operation.
    SequenceState,
    /// Transient contention; retry the whole operation.
    LockConflict,
    /// Duplicate identifier detected; fatal.
    Integrity,
    /// Backing store failure.
    Storage,
}

/// NCF sequencing error type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NcfError {
    /// No active sequence for the requested company and type.
    #[error("No active NCF sequence for type {type_code} in company {company}")]
    NoActiveSequence {
        /// Company
        company: CompanyId,
        /// Document type code
        type_code: String,
    },

    /// Document type code not in the catalog.
    #[error("Unknown document type code {0}")]
    UnknownDocumentType(String),

    /// Catalog registration failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Sequence id not found in the store.
    #[error("Sequence {0} not found")]
    SequenceNotFound(SequenceId),

    /// Range rejected at configuration time.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Sequence is not active (draft).
    #[error("[{prefix}] Sequence {sequence_id} is not active (state: {state})")]
    NotActive {
        /// Sequence
        sequence_id: SequenceId,
        /// Type prefix
        prefix: String,
        /// Current state
        state: SequenceState,
    },

    /// Sequence validity window has elapsed.
    #[error("[{prefix}] Sequence {sequence_id} expired on {expiration_date}")]
    Expired {
        /// Sequence
        sequence_id: SequenceId,
        /// Type prefix
        prefix: String,
        /// Expiration date
        expiration_date: NaiveDate,
    },

    /// No numbers left in the authorized range.
    #[error("[{prefix}] Sequence {sequence_id} depleted: authorized {range_from}-{range_to}, last used {current_number}")]
    Depleted {
        /// Sequence
        sequence_id: SequenceId,
        /// Type prefix
        prefix: String,
        /// Authorized start
        range_from: u64,
        /// Authorized end
        range_to: u64,
        /// Last issued number
        current_number: u64,
    },

    /// Lifecycle transition not permitted.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: SequenceState,
        /// Attempted state
        to: SequenceState,
    },

    /// Sequence configuration incomplete or locked for editing.
    #[error("Sequence {sequence_id} cannot be changed: {reason}")]
    NotEditable {
        /// Sequence
        sequence_id: SequenceId,
        /// Why
        reason: String,
    },

    /// Another allocation holds or changed the sequence row.
    #[error("Lock conflict on sequence {sequence_id}: another allocation is in flight, retry the operation")]
    LockConflict {
        /// Sequence
        sequence_id: SequenceId,
    },

    /// Identifier already present in the issued-document ledger.
    #[error("CRITICAL: duplicate NCF {identifier} already issued on document {document_ref} (company {company})")]
    IntegrityViolation {
        /// Company
        company: CompanyId,
        /// Duplicate identifier
        identifier: String,
        /// Document already carrying it
        document_ref: String,
    },

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NcfError {
    /// Classify the error into the taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoActiveSequence { .. }
            | Self::UnknownDocumentType(_)
            | Self::Catalog(_)
            | Self::SequenceNotFound(_)
            | Self::NotEditable { .. } => ErrorCategory::Configuration,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::NotActive { .. }
            | Self::Expired { .. }
            | Self::Depleted { .. }
            | Self::InvalidTransition { .. } => ErrorCategory::SequenceState,
            Self::LockConflict { .. } => ErrorCategory::LockConflict,
            Self::IntegrityViolation { .. } => ErrorCategory::Integrity,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }

    /// Only lock conflicts are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::LockConflict
    }

    /// Integrity violations must halt allocation and reach an operator.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Integrity
    }

    /// Label used for allocation outcome metrics.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::NotActive { .. } => "not_active",
            Self::Expired { .. } => "expired",
            Self::Depleted { .. } => "depleted",
            Self::LockConflict { .. } => "lock_conflict",
            Self::IntegrityViolation { .. } => "integrity",
            _ => "error",
        }
    }
}
