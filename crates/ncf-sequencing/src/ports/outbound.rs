//! # Outbound Ports
//!
//! Traits for the durable store, the issued-document ledger, the type
//! catalog and the clock.
//!
//! The store is the only serialization point: every allocation re-reads the
//! counter inside its own transaction, takes a non-blocking row lock, and
//! persists through a conditional write. Nothing here may cache
//! `current_number` across transactions.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    CompanyId, DocumentType, IssuedDocument, NcfError, Sequence, SequenceId, SequenceState,
    TypeCatalog,
};

/// Check run by the store inside its exclusive write window.
///
/// Receives the row as it would be written and every sibling row of the same
/// (company, type), excluding the row itself.
pub type WriteGuard<'a> = &'a (dyn Fn(&Sequence, &[Sequence]) -> Result<(), NcfError> + Send + Sync);

/// Transform applied to a committed row inside the store's exclusive window.
///
/// Receives the committed row and its siblings; returns the row to persist.
pub type RowUpdate<'a> =
    &'a (dyn Fn(&Sequence, &[Sequence]) -> Result<Sequence, NcfError> + Send + Sync);

/// Durable sequence store - outbound port.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Open an allocation transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, NcfError>;

    /// Committed row by id.
    async fn get(&self, id: SequenceId) -> Result<Sequence, NcfError>;

    /// Every row of (company, type), historical ones included, ordered by id.
    async fn list(&self, company: CompanyId, type_code: &str) -> Result<Vec<Sequence>, NcfError>;

    /// Assign an id to `seq` and insert it if `guard` accepts it against the
    /// committed siblings. Two concurrent inserts never both see a stale
    /// sibling set.
    async fn insert_exclusive(
        &self,
        seq: Sequence,
        guard: WriteGuard<'_>,
    ) -> Result<Sequence, NcfError>;

    /// Apply `update` to the committed row of `id` and persist the result.
    async fn update_exclusive(
        &self,
        id: SequenceId,
        update: RowUpdate<'_>,
    ) -> Result<Sequence, NcfError>;
}

/// One allocation transaction.
///
/// Writes are staged and become visible only on [`commit`](Self::commit).
/// Dropping the transaction without committing releases its row locks and
/// discards staged writes.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Row as seen by this transaction (committed state plus staged writes).
    async fn load(&mut self, id: SequenceId) -> Result<Sequence, NcfError>;

    /// Exclusive row lock, waiting at most `timeout`.
    ///
    /// Fails with [`NcfError::LockConflict`] when another transaction holds
    /// the row. Re-locking a row already held by this transaction succeeds.
    async fn lock_nowait(&mut self, id: SequenceId, timeout: Duration) -> Result<(), NcfError>;

    /// Stage `current_number = next` only if it still equals `expected`.
    /// Returns the number of rows affected (0 or 1).
    async fn compare_and_swap(
        &mut self,
        id: SequenceId,
        expected: u64,
        next: u64,
    ) -> Result<u64, NcfError>;

    /// Stage a derived state change for a row this transaction has locked.
    async fn set_state(&mut self, id: SequenceId, state: SequenceState) -> Result<(), NcfError>;

    /// Stage the document that binds an issued identifier.
    async fn attach_document(&mut self, document: IssuedDocument) -> Result<(), NcfError>;

    /// Apply every staged write atomically, or none of them.
    async fn commit(self: Box<Self>) -> Result<(), NcfError>;

    /// Discard staged writes and release locks.
    async fn rollback(self: Box<Self>);
}

/// Issued-document ledger - outbound port (read-only).
///
/// Cancelled documents never count.
#[async_trait]
pub trait IssuedDocumentLedger: Send + Sync {
    /// Highest number issued under `prefix` for `company`, with its identifier.
    async fn last_issued(
        &self,
        company: CompanyId,
        prefix: &str,
    ) -> Result<Option<(u64, String)>, NcfError>;

    /// The non-cancelled document carrying `identifier`, if any.
    async fn find_identifier(
        &self,
        company: CompanyId,
        identifier: &str,
    ) -> Result<Option<IssuedDocument>, NcfError>;
}

/// Document type reference data - outbound port.
pub trait DocumentTypeProvider: Send + Sync {
    /// Type by 2-digit code.
    fn document_type(&self, code: &str) -> Option<DocumentType>;
}

impl DocumentTypeProvider for TypeCatalog {
    fn document_type(&self, code: &str) -> Option<DocumentType> {
        self.get(code).cloned()
    }
}

/// Calendar source - outbound port.
pub trait TimeSource: Send + Sync {
    /// Current date in the fiscal authority's calendar.
    fn today(&self) -> NaiveDate;
}
