//! # NCF Sequencing
//!
//! Allocation of legally sequential fiscal document identifiers (NCF).
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every identifier must be unique, gapless within its authorized range,
//! monotonically increasing, and bound to the expiration policy of its
//! document type. This crate owns:
//! - the sequence entity and its configuration-time range validation
//! - the expiration policy and the lifecycle state machine
//! - the locked, compare-and-swap next-number allocator
//!
//! ## Guarantees
//!
//! | Hazard | Defense |
//! |--------|---------|
//! | Two writers, one counter | Non-blocking row lock plus conditional write |
//! | Lost update between read and write | CAS re-verified at commit |
//! | Identifier burned without a document | Counter write and document commit together |
//! | Corrupted data behind the allocator | Ledger duplicate check, fatal error |
//! | Overlapping or retroactive ranges | Validation inside the store's exclusive window |
//!
//! ## Module Structure
//!
//! ```text
//! ncf-sequencing/
//! ├── domain/      # Sequence, DocumentType, catalog, errors, invariants
//! ├── algorithms/  # Expiration, range validation, state machine, formatting, status, alerts
//! ├── ports/       # SequenceApi (inbound) + store, ledger, catalog, clock (outbound)
//! ├── adapters/    # In-memory transactional store, clocks
//! ├── service.rs   # SequenceService
//! └── config.rs    # SequencingConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{FixedClock, InMemorySequenceStore, SystemClock};
pub use algorithms::{
    available, days_until_expiration, derive_state, evaluate_alerts, expiration_date,
    format_identifier, is_expired, stock_level, usage_percent, validate_range, AlertPolicy,
    RangeCandidate, SequenceAlert, SequenceStatus,
};
pub use config::SequencingConfig;
pub use domain::{
    CatalogError, CompanyId, DocumentStatus, DocumentType, ErrorCategory, IdentifierFormat,
    IssuedDocument, NcfError, NewSequence, Sequence, SequenceId, SequenceState, SequenceUpdate,
    StockLevel, TypeCatalog, ValidationError, DEFAULT_VALIDITY_YEARS, DEFAULT_WARNING_THRESHOLD,
    MAX_VALIDITY_YEARS,
};
pub use ports::{
    DocumentTypeProvider, IssuedDocumentLedger, SequenceApi, SequenceStore, StoreTransaction,
    TimeSource,
};
pub use service::SequenceService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
