//! # Ports Module
//!
//! Hexagonal architecture ports: the API this crate offers (inbound) and the
//! collaborators it depends on (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::SequenceApi;
pub use outbound::{
    DocumentTypeProvider, IssuedDocumentLedger, RowUpdate, SequenceStore, StoreTransaction,
    TimeSource, WriteGuard,
};
