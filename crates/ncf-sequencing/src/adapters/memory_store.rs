//! In-memory transactional store and issued-document ledger.
//!
//! Row locks are per-sequence async mutexes held by the owning transaction;
//! committed tables sit behind one `RwLock` whose write guard is the store's
//! exclusive window. Counter writes are staged as compare-and-swap entries
//! and re-verified against committed state at commit.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as RowMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::algorithms::parse_identifier_number;
use crate::domain::{
    check_sequence_write, CompanyId, DocumentStatus, IssuedDocument, NcfError, Sequence,
    SequenceId, SequenceState,
};
use crate::ports::outbound::{
    IssuedDocumentLedger, RowUpdate, SequenceStore, StoreTransaction, WriteGuard,
};

#[derive(Default)]
struct Tables {
    sequences: BTreeMap<SequenceId, Sequence>,
    documents: Vec<IssuedDocument>,
    last_id: u64,
}

impl Tables {
    fn row(&self, id: SequenceId) -> Result<&Sequence, NcfError> {
        self.sequences.get(&id).ok_or(NcfError::SequenceNotFound(id))
    }

    fn siblings(&self, of: &Sequence) -> Vec<Sequence> {
        self.sequences
            .values()
            .filter(|s| s.id != of.id && s.company == of.company && s.type_code == of.type_code)
            .cloned()
            .collect()
    }

    fn live_document(&self, company: CompanyId, identifier: &str) -> Option<&IssuedDocument> {
        self.documents
            .iter()
            .find(|d| !d.is_cancelled() && d.company == company && d.identifier == identifier)
    }
}

#[derive(Default)]
struct Inner {
    tables: RwLock<Tables>,
    row_locks: Mutex<HashMap<SequenceId, Arc<RowMutex<()>>>>,
}

impl Inner {
    fn row_lock(&self, id: SequenceId) -> Arc<RowMutex<()>> {
        Arc::clone(self.row_locks.lock().entry(id).or_default())
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemorySequenceStore {
    inner: Arc<Inner>,
}

impl InMemorySequenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document straight into the ledger, bypassing allocation.
    ///
    /// Stands in for documents migrated from another system.
    pub fn record_document(&self, document: IssuedDocument) {
        self.inner.tables.write().documents.push(document);
    }

    /// Cancel the live document carrying `identifier`. Returns whether one
    /// was found.
    pub fn cancel_document(&self, company: CompanyId, identifier: &str) -> bool {
        let mut tables = self.inner.tables.write();
        match tables
            .documents
            .iter_mut()
            .find(|d| !d.is_cancelled() && d.company == company && d.identifier == identifier)
        {
            Some(doc) => {
                doc.status = DocumentStatus::Cancelled;
                true
            }
            None => false,
        }
    }

    /// Every ledger entry of `company`, cancelled ones included.
    pub fn documents(&self, company: CompanyId) -> Vec<IssuedDocument> {
        self.inner
            .tables
            .read()
            .documents
            .iter()
            .filter(|d| d.company == company)
            .cloned()
            .collect()
    }

    /// Edit a committed row without locks or invariant checks.
    ///
    /// Simulates direct data manipulation outside the allocator.
    pub fn apply_external_edit(
        &self,
        id: SequenceId,
        edit: impl FnOnce(&mut Sequence),
    ) -> Result<(), NcfError> {
        let mut tables = self.inner.tables.write();
        let row = tables
            .sequences
            .get_mut(&id)
            .ok_or(NcfError::SequenceNotFound(id))?;
        edit(row);
        warn!(sequence_id = %id, "[ncf] sequence row edited outside the allocator");
        Ok(())
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, NcfError> {
        Ok(Box::new(InMemoryTransaction::new(Arc::clone(&self.inner))))
    }

    async fn get(&self, id: SequenceId) -> Result<Sequence, NcfError> {
        self.inner.tables.read().row(id).cloned()
    }

    async fn list(&self, company: CompanyId, type_code: &str) -> Result<Vec<Sequence>, NcfError> {
        Ok(self
            .inner
            .tables
            .read()
            .sequences
            .values()
            .filter(|s| s.company == company && s.type_code == type_code)
            .cloned()
            .collect())
    }

    async fn insert_exclusive(
        &self,
        mut seq: Sequence,
        guard: WriteGuard<'_>,
    ) -> Result<Sequence, NcfError> {
        let mut tables = self.inner.tables.write();
        seq.id = SequenceId(tables.last_id + 1);
        let siblings = tables.siblings(&seq);
        guard(&seq, &siblings)?;
        check_sequence_write(None, &seq)?;

        tables.last_id = seq.id.0;
        tables.sequences.insert(seq.id, seq.clone());
        debug!(sequence_id = %seq.id, prefix = %seq.prefix, "[ncf] sequence row inserted");
        Ok(seq)
    }

    async fn update_exclusive(
        &self,
        id: SequenceId,
        update: RowUpdate<'_>,
    ) -> Result<Sequence, NcfError> {
        // Never rewrite a row an allocation currently holds
        let row_lock = self.inner.row_lock(id);
        let _held = row_lock
            .try_lock_owned()
            .map_err(|_| NcfError::LockConflict { sequence_id: id })?;

        let mut tables = self.inner.tables.write();
        let current = tables.row(id)?.clone();
        let siblings = tables.siblings(&current);
        let mut next = update(&current, &siblings)?;
        next.id = id;
        check_sequence_write(Some(&current), &next)?;

        tables.sequences.insert(id, next.clone());
        Ok(next)
    }
}

#[async_trait]
impl IssuedDocumentLedger for InMemorySequenceStore {
    async fn last_issued(
        &self,
        company: CompanyId,
        prefix: &str,
    ) -> Result<Option<(u64, String)>, NcfError> {
        Ok(self
            .inner
            .tables
            .read()
            .documents
            .iter()
            .filter(|d| !d.is_cancelled() && d.company == company)
            .filter_map(|d| {
                parse_identifier_number(&d.identifier, prefix).map(|n| (n, d.identifier.clone()))
            })
            .max_by_key(|(n, _)| *n))
    }

    async fn find_identifier(
        &self,
        company: CompanyId,
        identifier: &str,
    ) -> Result<Option<IssuedDocument>, NcfError> {
        Ok(self
            .inner
            .tables
            .read()
            .live_document(company, identifier)
            .cloned())
    }
}

#[derive(Clone, Copy, Debug)]
struct StagedCounter {
    /// Committed value the first CAS of this transaction was based on.
    base: u64,
    value: u64,
}

/// Transaction over [`InMemorySequenceStore`].
pub struct InMemoryTransaction {
    inner: Arc<Inner>,
    held: HashMap<SequenceId, OwnedMutexGuard<()>>,
    counters: HashMap<SequenceId, StagedCounter>,
    states: HashMap<SequenceId, SequenceState>,
    documents: Vec<IssuedDocument>,
}

impl InMemoryTransaction {
    fn new(inner: Arc<Inner>) -> Self {
        Self {
            inner,
            held: HashMap::new(),
            counters: HashMap::new(),
            states: HashMap::new(),
            documents: Vec::new(),
        }
    }

    fn committed(&self, id: SequenceId) -> Result<Sequence, NcfError> {
        self.inner.tables.read().row(id).cloned()
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn load(&mut self, id: SequenceId) -> Result<Sequence, NcfError> {
        let mut row = self.committed(id)?;
        if let Some(staged) = self.counters.get(&id) {
            row.current_number = staged.value;
        }
        if let Some(state) = self.states.get(&id) {
            row.state = *state;
        }
        Ok(row)
    }

    async fn lock_nowait(&mut self, id: SequenceId, timeout: Duration) -> Result<(), NcfError> {
        if self.held.contains_key(&id) {
            return Ok(());
        }
        self.committed(id)?;

        let row_lock = self.inner.row_lock(id);
        let guard = if timeout.is_zero() {
            row_lock.try_lock_owned().ok()
        } else {
            tokio::time::timeout(timeout, row_lock.lock_owned()).await.ok()
        };

        match guard {
            Some(guard) => {
                self.held.insert(id, guard);
                Ok(())
            }
            None => Err(NcfError::LockConflict { sequence_id: id }),
        }
    }

    async fn compare_and_swap(
        &mut self,
        id: SequenceId,
        expected: u64,
        next: u64,
    ) -> Result<u64, NcfError> {
        let committed = self.committed(id)?.current_number;
        let staged = self.counters.get(&id).copied();
        let current = staged.map_or(committed, |s| s.value);
        if current != expected {
            return Ok(0);
        }

        let base = staged.map_or(committed, |s| s.base);
        self.counters.insert(id, StagedCounter { base, value: next });
        Ok(1)
    }

    async fn set_state(&mut self, id: SequenceId, state: SequenceState) -> Result<(), NcfError> {
        if !self.held.contains_key(&id) {
            return Err(NcfError::Storage(format!(
                "state change on sequence {id} without holding its row lock"
            )));
        }
        self.states.insert(id, state);
        Ok(())
    }

    async fn attach_document(&mut self, document: IssuedDocument) -> Result<(), NcfError> {
        self.documents.push(document);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), NcfError> {
        let mut tables = self.inner.tables.write();

        for (id, staged) in &self.counters {
            if tables.row(*id)?.current_number != staged.base {
                return Err(NcfError::LockConflict { sequence_id: *id });
            }
        }

        let touched: BTreeSet<SequenceId> =
            self.counters.keys().chain(self.states.keys()).copied().collect();
        let mut rows = Vec::with_capacity(touched.len());
        for id in touched {
            let previous = tables.row(id)?;
            let mut next = previous.clone();
            if let Some(staged) = self.counters.get(&id) {
                next.current_number = staged.value;
            }
            if let Some(state) = self.states.get(&id) {
                next.state = *state;
            }
            check_sequence_write(Some(previous), &next)?;
            rows.push(next);
        }

        for (i, doc) in self.documents.iter().enumerate() {
            let clash = tables.live_document(doc.company, &doc.identifier).or_else(|| {
                self.documents[..i]
                    .iter()
                    .find(|d| d.company == doc.company && d.identifier == doc.identifier)
            });
            if let Some(existing) = clash {
                return Err(NcfError::IntegrityViolation {
                    company: doc.company,
                    identifier: doc.identifier.clone(),
                    document_ref: existing.document_ref.clone(),
                });
            }
        }

        for row in rows {
            tables.sequences.insert(row.id, row);
        }
        tables.documents.extend(self.documents.iter().cloned());
        Ok(())
    }

    async fn rollback(self: Box<Self>) {
        debug!(
            staged = self.counters.len(),
            "[ncf] allocation transaction rolled back"
        );
    }
}
