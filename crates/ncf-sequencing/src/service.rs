//! # Sequence Service
//!
//! Application service: the allocator plus configuration-time operations.
//!
//! ## Allocation protocol
//!
//! ```text
//! load row ──ineligible──→ NotActive / Expired / Depleted (no lock taken)
//!    │
//! lock_nowait ──busy──→ LockConflict
//!    │
//! re-read under lock ──next > range_to──→ Depleted
//!    │
//! format identifier ──already in ledger──→ IntegrityViolation
//!    │
//! compare_and_swap ──0 rows──→ LockConflict
//!    │
//! identifier (caller binds it and commits)
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use ncf_telemetry::{
    log_sequence_event, metric_inc, register_metrics, ALLOCATIONS, ALLOCATION_DURATION,
    INTEGRITY_VIOLATIONS, LOCK_CONFLICTS, NUMBERS_AVAILABLE, VALIDATION_REJECTIONS,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::InMemorySequenceStore;
use crate::algorithms::state_machine::depleted_error;
use crate::algorithms::{
    available, check_activation, check_allocatable, derive_state, evaluate_alerts,
    expiration_date, format_identifier, validate_range, AlertPolicy, RangeCandidate,
    SequenceAlert, SequenceStatus,
};
use crate::config::SequencingConfig;
use crate::domain::{
    CompanyId, DocumentType, IssuedDocument, NcfError, NewSequence, Sequence, SequenceId,
    SequenceState, SequenceUpdate, TypeCatalog,
};
use crate::ports::inbound::SequenceApi;
use crate::ports::outbound::{
    DocumentTypeProvider, IssuedDocumentLedger, SequenceStore, StoreTransaction, TimeSource,
};

/// NCF sequencing service.
pub struct SequenceService {
    store: Arc<dyn SequenceStore>,
    ledger: Arc<dyn IssuedDocumentLedger>,
    types: Arc<dyn DocumentTypeProvider>,
    clock: Arc<dyn TimeSource>,
    config: SequencingConfig,
}

impl SequenceService {
    /// Wire the service to its collaborators.
    pub fn new(
        store: Arc<dyn SequenceStore>,
        ledger: Arc<dyn IssuedDocumentLedger>,
        types: Arc<dyn DocumentTypeProvider>,
        clock: Arc<dyn TimeSource>,
        config: SequencingConfig,
    ) -> Self {
        if let Err(e) = register_metrics() {
            warn!("[ncf] metrics unavailable: {}", e);
        }
        Self {
            store,
            ledger,
            types,
            clock,
            config,
        }
    }

    /// Service over a fresh in-memory store that also serves as the ledger.
    pub fn in_memory(
        catalog: TypeCatalog,
        clock: Arc<dyn TimeSource>,
        config: SequencingConfig,
    ) -> (Self, InMemorySequenceStore) {
        let store = InMemorySequenceStore::new();
        let service = Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(catalog),
            clock,
            config,
        );
        (service, store)
    }

    /// Active configuration.
    pub fn config(&self) -> &SequencingConfig {
        &self.config
    }

    /// Alert thresholds derived from the configuration.
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            low_stock_threshold: None,
            expiring_days: self.config.expiring_alert_days,
        }
    }

    fn document_type(&self, code: &str) -> Result<DocumentType, NcfError> {
        self.types
            .document_type(code)
            .ok_or_else(|| NcfError::UnknownDocumentType(code.to_string()))
    }

    fn validity_years(&self, doc_type: &DocumentType) -> u32 {
        if doc_type.validity_years == 0 {
            self.config.default_validity_years
        } else {
            doc_type.validity_years
        }
    }

    async fn last_consumed(&self, company: CompanyId, prefix: &str) -> Result<u64, NcfError> {
        Ok(self
            .ledger
            .last_issued(company, prefix)
            .await?
            .map_or(0, |(number, _)| number))
    }

    fn record_rejection(&self, err: &NcfError) {
        if let NcfError::Validation(validation) = err {
            metric_inc!(VALIDATION_REJECTIONS, &[validation.kind()]);
            warn!("[ncf] range rejected: {}", validation);
        }
    }

    /// Count and log a refused allocation, handing the error back.
    fn refuse(&self, seq: &Sequence, err: NcfError) -> NcfError {
        metric_inc!(ALLOCATIONS, &[seq.prefix.as_str(), err.outcome_label()]);
        self.report_failure(seq, &err);
        err
    }

    /// Conflict and integrity accounting. Leaves the allocation outcome alone:
    /// a failed commit follows an allocation already counted as issued.
    fn report_failure(&self, seq: &Sequence, err: &NcfError) {
        match err {
            NcfError::LockConflict { .. } => {
                metric_inc!(LOCK_CONFLICTS);
                log_sequence_event!(
                    warn,
                    "[ncf] allocation lost the row, caller should retry",
                    seq.id,
                    seq.prefix
                );
            }
            NcfError::IntegrityViolation {
                identifier,
                document_ref,
                ..
            } => {
                metric_inc!(INTEGRITY_VIOLATIONS);
                log_sequence_event!(
                    error,
                    "[ncf] CRITICAL duplicate identifier, allocation halted",
                    seq.id,
                    seq.prefix,
                    identifier = %identifier,
                    document_ref = %document_ref
                );
            }
            other => {
                info!(
                    sequence_id = %seq.id,
                    prefix = %seq.prefix,
                    "[ncf] allocation refused: {}",
                    other
                );
            }
        }
    }
}

/// Run the range validator for a row about to be written.
fn validate_row(row: &Sequence, siblings: &[Sequence], last_consumed: u64) -> Result<(), NcfError> {
    let candidate = RangeCandidate {
        company: row.company,
        type_code: &row.type_code,
        prefix: &row.prefix,
        format: row.format,
        range_from: row.range_from,
        range_to: row.range_to,
        exclude: Some(row.id),
    };
    validate_range(&candidate, siblings, last_consumed)?;
    Ok(())
}

#[async_trait]
impl SequenceApi for SequenceService {
    async fn create_sequence(&self, request: NewSequence) -> Result<Sequence, NcfError> {
        let doc_type = self.document_type(&request.type_code)?;
        let last_consumed = self.last_consumed(request.company, &doc_type.prefix).await?;

        let draft = Sequence {
            id: SequenceId(0),
            company: request.company,
            type_code: doc_type.code.clone(),
            prefix: doc_type.prefix.clone(),
            format: doc_type.format(),
            applies_expiration: doc_type.applies_expiration,
            range_from: request.range_from,
            range_to: request.range_to,
            current_number: 0,
            authorization_date: request.authorization_date,
            expiration_date: expiration_date(
                request.authorization_date,
                doc_type.applies_expiration,
                self.validity_years(&doc_type),
            )?,
            warning_threshold: request
                .warning_threshold
                .unwrap_or(self.config.default_warning_threshold),
            activated: false,
            state: SequenceState::Draft,
        };

        let guard = move |row: &Sequence, siblings: &[Sequence]| -> Result<(), NcfError> {
            validate_row(row, siblings, last_consumed)
        };
        let seq = self
            .store
            .insert_exclusive(draft, &guard)
            .await
            .inspect_err(|e| self.record_rejection(e))?;

        info!(
            sequence_id = %seq.id,
            company = %seq.company,
            expiration = ?seq.expiration_date,
            "[ncf] sequence {} authorized as draft",
            seq.display_name()
        );
        Ok(seq)
    }

    async fn update_draft(
        &self,
        id: SequenceId,
        update: SequenceUpdate,
    ) -> Result<Sequence, NcfError> {
        let current = self.store.get(id).await?;
        let doc_type = self.document_type(&current.type_code)?;
        let validity = self.validity_years(&doc_type);
        let last_consumed = self.last_consumed(current.company, &current.prefix).await?;

        let edit = move |row: &Sequence, siblings: &[Sequence]| -> Result<Sequence, NcfError> {
            if row.state != SequenceState::Draft {
                return Err(NcfError::NotEditable {
                    sequence_id: row.id,
                    reason: format!("only draft sequences can be edited (state: {})", row.state),
                });
            }
            let mut next = row.clone();
            next.range_from = update.range_from.unwrap_or(row.range_from);
            next.range_to = update.range_to.unwrap_or(row.range_to);
            next.authorization_date = update.authorization_date.unwrap_or(row.authorization_date);
            next.warning_threshold = update.warning_threshold.unwrap_or(row.warning_threshold);
            next.expiration_date =
                expiration_date(next.authorization_date, next.applies_expiration, validity)?;
            validate_row(&next, siblings, last_consumed)?;
            Ok(next)
        };
        let seq = self
            .store
            .update_exclusive(id, &edit)
            .await
            .inspect_err(|e| self.record_rejection(e))?;

        log_sequence_event!(
            info,
            "[ncf] draft sequence updated",
            seq.id,
            seq.prefix,
            range = %seq.display_name()
        );
        Ok(seq)
    }

    async fn activate(&self, id: SequenceId) -> Result<Sequence, NcfError> {
        let today = self.clock.today();
        let activate = move |row: &Sequence, _: &[Sequence]| -> Result<Sequence, NcfError> {
            check_activation(row, today)?;
            let mut next = row.clone();
            next.activated = true;
            next.state = SequenceState::Active;
            Ok(next)
        };
        let seq = self.store.update_exclusive(id, &activate).await?;

        NUMBERS_AVAILABLE
            .with_label_values(&[seq.prefix.as_str()])
            .set(available(&seq) as f64);
        log_sequence_event!(
            info,
            "[ncf] sequence activated",
            seq.id,
            seq.prefix,
            range = %seq.display_name()
        );
        Ok(seq)
    }

    async fn refresh_state(&self, id: SequenceId) -> Result<Sequence, NcfError> {
        let today = self.clock.today();
        let refresh = move |row: &Sequence, _: &[Sequence]| -> Result<Sequence, NcfError> {
            let state = derive_state(row, today);
            if state == row.state {
                return Ok(row.clone());
            }
            if !row.state.can_transition_to(state) {
                return Err(NcfError::InvalidTransition {
                    from: row.state,
                    to: state,
                });
            }
            let mut next = row.clone();
            next.state = state;
            Ok(next)
        };

        let before = self.store.get(id).await?.state;
        let seq = self.store.update_exclusive(id, &refresh).await?;
        if seq.state != before {
            info!(
                sequence_id = %seq.id,
                prefix = %seq.prefix,
                "[ncf] sequence state {} -> {}",
                before,
                seq.state
            );
        }
        Ok(seq)
    }

    async fn resolve_active(
        &self,
        company: CompanyId,
        type_code: &str,
    ) -> Result<Sequence, NcfError> {
        self.document_type(type_code)?;
        self.store
            .list(company, type_code)
            .await?
            .into_iter()
            .filter(|s| s.state == SequenceState::Active)
            .max_by(|a, b| {
                a.authorization_date
                    .cmp(&b.authorization_date)
                    .then(a.id.cmp(&b.id))
            })
            .ok_or_else(|| NcfError::NoActiveSequence {
                company,
                type_code: type_code.to_string(),
            })
    }

    async fn list_sequences(
        &self,
        company: CompanyId,
        type_code: &str,
    ) -> Result<Vec<Sequence>, NcfError> {
        self.store.list(company, type_code).await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, NcfError> {
        self.store.begin().await
    }

    async fn next_number(
        &self,
        tx: &mut dyn StoreTransaction,
        id: SequenceId,
    ) -> Result<String, NcfError> {
        let started = Instant::now();
        let today = self.clock.today();

        let seq = tx.load(id).await?;
        if let Err(e) = check_allocatable(&seq, today) {
            return Err(self.refuse(&seq, e));
        }

        if let Err(e) = tx.lock_nowait(id, self.config.lock_timeout()).await {
            return Err(self.refuse(&seq, e));
        }

        // Authoritative values under the lock
        let locked = tx.load(id).await?;
        if let Err(e) = check_allocatable(&locked, today) {
            return Err(self.refuse(&locked, e));
        }
        let expected = locked.current_number;
        let next = locked.peek_next_number();
        if next > locked.range_to {
            return Err(self.refuse(&locked, depleted_error(&locked)));
        }

        let identifier = format_identifier(&locked.prefix, next, locked.format)?;

        if let Some(existing) = self.ledger.find_identifier(locked.company, &identifier).await? {
            let err = NcfError::IntegrityViolation {
                company: locked.company,
                identifier,
                document_ref: existing.document_ref,
            };
            return Err(self.refuse(&locked, err));
        }

        if tx.compare_and_swap(id, expected, next).await? == 0 {
            return Err(self.refuse(&locked, NcfError::LockConflict { sequence_id: id }));
        }
        if next >= locked.range_to {
            tx.set_state(id, SequenceState::Depleted).await?;
            log_sequence_event!(
                info,
                "[ncf] last number of range issued, sequence depleted",
                id,
                locked.prefix
            );
        }

        ALLOCATION_DURATION.observe(started.elapsed().as_secs_f64());
        metric_inc!(ALLOCATIONS, &[locked.prefix.as_str(), "issued"]);
        NUMBERS_AVAILABLE
            .with_label_values(&[locked.prefix.as_str()])
            .set((locked.range_to - next) as f64);
        debug!(sequence_id = %id, identifier = %identifier, "[ncf] identifier allocated");
        Ok(identifier)
    }

    async fn issue(
        &self,
        company: CompanyId,
        type_code: &str,
        document_ref: &str,
    ) -> Result<IssuedDocument, NcfError> {
        let correlation_id = Uuid::new_v4();
        let seq = self.resolve_active(company, type_code).await?;

        let mut tx = self.store.begin().await?;
        let identifier = match self.next_number(tx.as_mut(), seq.id).await {
            Ok(identifier) => identifier,
            Err(e) => {
                tx.rollback().await;
                return Err(e);
            }
        };

        let document = IssuedDocument::posted(company, document_ref, &identifier, Some(seq.id));
        tx.attach_document(document.clone()).await?;
        tx.commit()
            .await
            .inspect_err(|e| self.report_failure(&seq, e))?;

        info!(
            %correlation_id,
            sequence_id = %seq.id,
            company = %company,
            identifier = %document.identifier,
            document_ref = %document.document_ref,
            "[ncf] identifier issued"
        );
        Ok(document)
    }

    async fn status(&self, id: SequenceId) -> Result<SequenceStatus, NcfError> {
        let seq = self.store.get(id).await?;
        Ok(SequenceStatus::project(&seq, self.clock.today()))
    }

    async fn alerts(
        &self,
        company: CompanyId,
        type_code: &str,
        policy: &AlertPolicy,
    ) -> Result<Vec<SequenceAlert>, NcfError> {
        let today = self.clock.today();
        let mut alerts = Vec::new();
        for seq in self.store.list(company, type_code).await? {
            let status = SequenceStatus::project(&seq, today);
            for alert in evaluate_alerts(&seq, &status, today, policy) {
                warn!(sequence_id = %seq.id, prefix = %seq.prefix, "[ncf] alert: {:?}", alert);
                alerts.push(alert);
            }
        }
        Ok(alerts)
    }
}
