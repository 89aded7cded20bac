//! # Sequence State Machine
//!
//! ```text
//! draft ──activate──→ active ──counter reaches range_to──→ depleted
//!                        └──────expiration passed──────→ expired
//! ```
//!
//! State is derived from persisted primitives (range, counter, dates and the
//! operator's `activated` flag). Terminal states are sticky: once a row is
//! stored as depleted or expired, no recompute returns it to active.

use chrono::NaiveDate;

use crate::domain::{NcfError, Sequence, SequenceState};

use super::expiration::is_expired;

/// Recompute the lifecycle state of `seq` as of `today`.
///
/// Expiration is checked before depletion so an exhausted sequence whose
/// validity also lapsed reports the regulatory reason.
pub fn derive_state(seq: &Sequence, today: NaiveDate) -> SequenceState {
    if seq.state.is_terminal() {
        return seq.state;
    }
    if !seq.is_configured() || !seq.activated {
        return SequenceState::Draft;
    }
    if seq.applies_expiration && is_expired(seq.expiration_date, today) {
        return SequenceState::Expired;
    }
    if seq.current_number >= seq.range_to {
        return SequenceState::Depleted;
    }
    SequenceState::Active
}

/// Preconditions for the operator's `draft → active` transition.
pub fn check_activation(seq: &Sequence, today: NaiveDate) -> Result<(), NcfError> {
    if seq.state != SequenceState::Draft {
        return Err(NcfError::InvalidTransition {
            from: seq.state,
            to: SequenceState::Active,
        });
    }
    if !seq.is_configured() {
        return Err(NcfError::NotEditable {
            sequence_id: seq.id,
            reason: format!(
                "range_to ({}) must be greater than range_from ({}) before activation",
                seq.range_to, seq.range_from
            ),
        });
    }
    if seq.applies_expiration && is_expired(seq.expiration_date, today) {
        return Err(expired_error(seq));
    }
    Ok(())
}

/// Eligibility gate run before any lock is taken.
pub fn check_allocatable(seq: &Sequence, today: NaiveDate) -> Result<(), NcfError> {
    match derive_state(seq, today) {
        SequenceState::Active => Ok(()),
        SequenceState::Expired => Err(expired_error(seq)),
        SequenceState::Depleted => Err(depleted_error(seq)),
        state @ SequenceState::Draft => Err(NcfError::NotActive {
            sequence_id: seq.id,
            prefix: seq.prefix.clone(),
            state,
        }),
    }
}

pub(crate) fn depleted_error(seq: &Sequence) -> NcfError {
    NcfError::Depleted {
        sequence_id: seq.id,
        prefix: seq.prefix.clone(),
        range_from: seq.range_from,
        range_to: seq.range_to,
        current_number: seq.current_number,
    }
}

fn expired_error(seq: &Sequence) -> NcfError {
    match seq.expiration_date {
        Some(expiration_date) => NcfError::Expired {
            sequence_id: seq.id,
            prefix: seq.prefix.clone(),
            expiration_date,
        },
        // Stored as expired without a date (imported rows)
        None => NcfError::NotActive {
            sequence_id: seq.id,
            prefix: seq.prefix.clone(),
            state: SequenceState::Expired,
        },
    }
}
