//! # Inbound Ports
//!
//! API trait defining what the sequencing subsystem offers to document
//! posting, configuration and dashboard collaborators.

use async_trait::async_trait;

use crate::algorithms::{AlertPolicy, SequenceAlert, SequenceStatus};
use crate::domain::{
    CompanyId, IssuedDocument, NcfError, NewSequence, Sequence, SequenceId, SequenceUpdate,
};
use crate::ports::outbound::StoreTransaction;

/// NCF sequencing API - inbound port.
#[async_trait]
pub trait SequenceApi: Send + Sync {
    /// Authorize a new range. Validated, then stored as a draft.
    async fn create_sequence(&self, request: NewSequence) -> Result<Sequence, NcfError>;

    /// Change the range, authorization date or threshold of a draft.
    async fn update_draft(
        &self,
        id: SequenceId,
        update: SequenceUpdate,
    ) -> Result<Sequence, NcfError>;

    /// Operator activation: `draft → active`.
    async fn activate(&self, id: SequenceId) -> Result<Sequence, NcfError>;

    /// Recompute and persist the derived state.
    async fn refresh_state(&self, id: SequenceId) -> Result<Sequence, NcfError>;

    /// The most recently authorized active sequence of (company, type).
    async fn resolve_active(
        &self,
        company: CompanyId,
        type_code: &str,
    ) -> Result<Sequence, NcfError>;

    /// Every sequence of (company, type), historical ones included.
    async fn list_sequences(
        &self,
        company: CompanyId,
        type_code: &str,
    ) -> Result<Vec<Sequence>, NcfError>;

    /// Open a transaction for [`next_number`](Self::next_number).
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, NcfError>;

    /// Allocate the next identifier of `id` inside `tx`.
    ///
    /// The caller binds the identifier with `tx.attach_document` and commits;
    /// dropping `tx` instead releases the number.
    async fn next_number(
        &self,
        tx: &mut dyn StoreTransaction,
        id: SequenceId,
    ) -> Result<String, NcfError>;

    /// Resolve, allocate, bind and commit in one call.
    async fn issue(
        &self,
        company: CompanyId,
        type_code: &str,
        document_ref: &str,
    ) -> Result<IssuedDocument, NcfError>;

    /// Dashboard projection of one sequence.
    async fn status(&self, id: SequenceId) -> Result<SequenceStatus, NcfError>;

    /// Alerts across the active sequences of (company, type).
    async fn alerts(
        &self,
        company: CompanyId,
        type_code: &str,
        policy: &AlertPolicy,
    ) -> Result<Vec<SequenceAlert>, NcfError>;
}
