//! # Domain Invariants
//!
//! Rules that must hold for every persisted sequence. The store adapter
//! checks them before committing a write; tests assert them after every
//! allocation.

use super::entities::Sequence;
use super::errors::NcfError;

/// Invariant: `range_from >= 1` and `range_to > range_from` once configured.
pub fn invariant_range_well_formed(seq: &Sequence) -> bool {
    seq.range_from >= 1 && seq.range_to > seq.range_from
}

/// Invariant: `current_number ∈ {0} ∪ [range_from, range_to]`.
pub fn invariant_counter_within_range(seq: &Sequence) -> bool {
    seq.current_number == 0
        || (seq.range_from..=seq.range_to).contains(&seq.current_number)
}

/// Invariant: the counter never moves backwards.
pub fn invariant_counter_monotonic(previous: u64, next: u64) -> bool {
    next >= previous
}

/// Invariant: no two sequences of the same (company, type) overlap.
pub fn invariant_no_overlap(sequences: &[Sequence]) -> bool {
    sequences.iter().enumerate().all(|(i, a)| {
        sequences[i + 1..].iter().all(|b| {
            a.company != b.company
                || a.type_code != b.type_code
                || a.range_from > b.range_to
                || a.range_to < b.range_from
        })
    })
}

/// Check every per-row invariant for a write moving `previous` to `next`.
pub fn check_sequence_write(previous: Option<&Sequence>, next: &Sequence) -> Result<(), NcfError> {
    if !invariant_range_well_formed(next) {
        return Err(NcfError::Storage(format!(
            "sequence {} violates range invariant ({}-{})",
            next.id, next.range_from, next.range_to
        )));
    }
    if !invariant_counter_within_range(next) {
        return Err(NcfError::Storage(format!(
            "sequence {} counter {} outside {}-{}",
            next.id, next.current_number, next.range_from, next.range_to
        )));
    }
    if let Some(prev) = previous {
        if !invariant_counter_monotonic(prev.current_number, next.current_number) {
            return Err(NcfError::Storage(format!(
                "sequence {} counter regressed {} -> {}",
                next.id, prev.current_number, next.current_number
            )));
        }
    }
    Ok(())
}
