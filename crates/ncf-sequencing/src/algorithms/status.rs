//! Read-only status projections for dashboards and alerting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Sequence, SequenceId, SequenceState, StockLevel};

use super::state_machine::derive_state;

/// Numbers still issuable: `range_to - max(current_number, range_from - 1)`.
pub fn available(seq: &Sequence) -> u64 {
    if !seq.is_configured() {
        return 0;
    }
    let consumed_up_to = seq.current_number.max(seq.range_from - 1);
    seq.range_to.saturating_sub(consumed_up_to)
}

/// Numbers already issued.
pub fn used(seq: &Sequence) -> u64 {
    if seq.current_number == 0 || !seq.is_configured() {
        0
    } else {
        seq.current_number.saturating_sub(seq.range_from) + 1
    }
}

/// Share of the range consumed, 0.0..=100.0.
pub fn usage_percent(seq: &Sequence) -> f64 {
    let total = seq.total();
    if total == 0 {
        return 0.0;
    }
    used(seq) as f64 / total as f64 * 100.0
}

/// Three-level indicator against the warning threshold.
pub fn stock_level(state: SequenceState, available: u64, warning_threshold: u64) -> StockLevel {
    if state.is_terminal() || available == 0 || available <= warning_threshold / 2 {
        StockLevel::Critical
    } else if available <= warning_threshold {
        StockLevel::Low
    } else {
        StockLevel::Ample
    }
}

/// Snapshot of one sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceStatus {
    /// Sequence
    pub sequence_id: SequenceId,
    /// `"{prefix} ({range_from}-{range_to})"`
    pub display_name: String,
    /// Type prefix
    pub prefix: String,
    /// Derived state
    pub state: SequenceState,
    /// Next number, only while active
    pub next_number: Option<u64>,
    /// Numbers left
    pub available: u64,
    /// Numbers authorized
    pub total: u64,
    /// Share consumed
    pub usage_percent: f64,
    /// Indicator
    pub stock_level: StockLevel,
    /// Expiration, if the type applies it
    pub expiration_date: Option<NaiveDate>,
}

impl SequenceStatus {
    /// Project `seq` as of `today`.
    pub fn project(seq: &Sequence, today: NaiveDate) -> Self {
        let state = derive_state(seq, today);
        let available = available(seq);
        Self {
            sequence_id: seq.id,
            display_name: seq.display_name(),
            prefix: seq.prefix.clone(),
            state,
            next_number: (state == SequenceState::Active).then(|| seq.peek_next_number()),
            available,
            total: seq.total(),
            usage_percent: usage_percent(seq),
            stock_level: stock_level(state, available, seq.warning_threshold),
            expiration_date: seq.expiration_date,
        }
    }
}
