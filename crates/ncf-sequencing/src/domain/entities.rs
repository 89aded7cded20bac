//! # Domain Entities
//!
//! Core entities for NCF sequencing: the document type reference data, the
//! mutable sequence row and the documents that bind issued identifiers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::value_objects::{CompanyId, IdentifierFormat, SequenceId, SequenceState};

/// Default regulatory validity of a sequence, in years.
pub const DEFAULT_VALIDITY_YEARS: u32 = 2;

/// Longest validity a document type may declare, in years.
pub const MAX_VALIDITY_YEARS: u32 = 99;

/// Default warning threshold (numbers left) for new sequences.
pub const DEFAULT_WARNING_THRESHOLD: u64 = 50;

/// Fiscal document type (reference data).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// 2-digit regulatory code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// 3-character prefix embedded in every identifier.
    pub prefix: String,
    /// Electronic (e-CF) documents use a 10-digit body.
    pub is_electronic: bool,
    /// Whether sequences of this type expire.
    pub applies_expiration: bool,
    /// Validity window in years.
    pub validity_years: u32,
    /// Usable on sales documents.
    pub for_sale: bool,
    /// Usable on purchase documents.
    pub for_purchase: bool,
    /// Customer tax id required on the document.
    pub requires_tax_id: bool,
}

impl DocumentType {
    /// Create a sales-side type with regulatory defaults.
    pub fn new(code: &str, name: &str, prefix: &str, is_electronic: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            prefix: prefix.to_string(),
            is_electronic,
            applies_expiration: true,
            validity_years: DEFAULT_VALIDITY_YEARS,
            for_sale: true,
            for_purchase: false,
            requires_tax_id: true,
        }
    }

    /// Exempt the type from expiration.
    pub fn without_expiration(mut self) -> Self {
        self.applies_expiration = false;
        self
    }

    /// Mark the type as purchase-side only.
    pub fn for_purchases(mut self) -> Self {
        self.for_sale = false;
        self.for_purchase = true;
        self
    }

    /// Drop the customer tax id requirement.
    pub fn without_tax_id(mut self) -> Self {
        self.requires_tax_id = false;
        self
    }

    /// Identifier layout for this type.
    pub fn format(&self) -> IdentifierFormat {
        IdentifierFormat::for_electronic(self.is_electronic)
    }
}

/// Authorized numeric range for one (company, document type).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Store-assigned id.
    pub id: SequenceId,
    /// Owning company.
    pub company: CompanyId,
    /// Document type code.
    pub type_code: String,
    /// Type prefix, copied from the catalog at creation.
    pub prefix: String,
    /// Identifier layout, copied from the catalog at creation.
    pub format: IdentifierFormat,
    /// Whether the type applies expiration.
    pub applies_expiration: bool,
    /// First authorized number (inclusive, 1-based).
    pub range_from: u64,
    /// Last authorized number (inclusive).
    pub range_to: u64,
    /// Last issued number, 0 when nothing was allocated.
    pub current_number: u64,
    /// Date the authority authorized the range.
    pub authorization_date: NaiveDate,
    /// Fixed when the sequence is created or its draft is edited.
    pub expiration_date: Option<NaiveDate>,
    /// Alert when fewer numbers than this remain.
    pub warning_threshold: u64,
    /// Explicit operator activation flag.
    pub activated: bool,
    /// Persisted lifecycle state.
    pub state: SequenceState,
}

impl Sequence {
    /// `"{prefix} ({range_from}-{range_to})"`.
    pub fn display_name(&self) -> String {
        format!("{} ({}-{})", self.prefix, self.range_from, self.range_to)
    }

    /// Number the next allocation would issue.
    pub fn peek_next_number(&self) -> u64 {
        if self.current_number == 0 {
            self.range_from
        } else {
            self.current_number + 1
        }
    }

    /// A usable range has been configured.
    pub fn is_configured(&self) -> bool {
        self.range_to > self.range_from
    }

    /// Total numbers authorized.
    pub fn total(&self) -> u64 {
        if self.is_configured() {
            self.range_to - self.range_from + 1
        } else {
            0
        }
    }
}

/// Request to authorize a new range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSequence {
    /// Owning company.
    pub company: CompanyId,
    /// Document type code.
    pub type_code: String,
    /// First authorized number.
    pub range_from: u64,
    /// Last authorized number.
    pub range_to: u64,
    /// Authorization date.
    pub authorization_date: NaiveDate,
    /// Threshold override; config default otherwise.
    pub warning_threshold: Option<u64>,
}

impl NewSequence {
    /// Build a request with the default warning threshold.
    pub fn new(
        company: CompanyId,
        type_code: &str,
        range_from: u64,
        range_to: u64,
        authorization_date: NaiveDate,
    ) -> Self {
        Self {
            company,
            type_code: type_code.to_string(),
            range_from,
            range_to,
            authorization_date,
            warning_threshold: None,
        }
    }

    /// Override the warning threshold.
    pub fn with_warning_threshold(mut self, threshold: u64) -> Self {
        self.warning_threshold = Some(threshold);
        self
    }
}

/// Edit of a draft sequence; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceUpdate {
    /// New start.
    pub range_from: Option<u64>,
    /// New end.
    pub range_to: Option<u64>,
    /// New authorization date (recomputes expiration).
    pub authorization_date: Option<NaiveDate>,
    /// New warning threshold.
    pub warning_threshold: Option<u64>,
}

/// Lifecycle of a document in the issued-document ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Posted with its identifier.
    Posted,
    /// Cancelled; its identifier no longer counts for duplicate checks.
    Cancelled,
}

/// A document bearing an issued identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedDocument {
    /// Owning company.
    pub company: CompanyId,
    /// Caller's document reference (invoice number, UUID, ...).
    pub document_ref: String,
    /// Formatted identifier.
    pub identifier: String,
    /// Sequence that issued it, if known.
    pub sequence_id: Option<SequenceId>,
    /// Posted or cancelled.
    pub status: DocumentStatus,
}

impl IssuedDocument {
    /// A posted document bound to `identifier`.
    pub fn posted(
        company: CompanyId,
        document_ref: &str,
        identifier: &str,
        sequence_id: Option<SequenceId>,
    ) -> Self {
        Self {
            company,
            document_ref: document_ref.to_string(),
            identifier: identifier.to_string(),
            sequence_id,
            status: DocumentStatus::Posted,
        }
    }

    /// Whether the document still counts in ledger checks.
    pub fn is_cancelled(&self) -> bool {
        self.status == DocumentStatus::Cancelled
    }
}
