//! # Range Validator
//!
//! Configuration-time checks for a proposed range. Pure: no side effects and
//! never consulted on the allocation path.
//!
//! Checks run in order, each with its own error:
//! 1. well-formed (`range_from >= 1`, `range_to > range_from`)
//! 2. `range_to` fits the identifier body
//! 3. no overlap with any sibling sequence, historical ones included
//! 4. not retroactive against the highest consumed number
//! 5. strictly ascending against every prior `range_to`

use crate::domain::{CompanyId, IdentifierFormat, Sequence, SequenceId, ValidationError};

use super::formatting::format_identifier;

/// A proposed range for one (company, type).
#[derive(Clone, Copy, Debug)]
pub struct RangeCandidate<'a> {
    /// Owning company.
    pub company: CompanyId,
    /// Document type code.
    pub type_code: &'a str,
    /// Type prefix, used in messages.
    pub prefix: &'a str,
    /// Identifier layout of the type.
    pub format: IdentifierFormat,
    /// Proposed start.
    pub range_from: u64,
    /// Proposed end.
    pub range_to: u64,
    /// The sequence being edited, excluded from sibling checks.
    pub exclude: Option<SequenceId>,
}

/// Validate `candidate` against its siblings and the ledger's last consumed
/// number for the same type and company.
pub fn validate_range(
    candidate: &RangeCandidate<'_>,
    existing: &[Sequence],
    last_consumed: u64,
) -> Result<(), ValidationError> {
    let RangeCandidate {
        prefix,
        format,
        range_from,
        range_to,
        ..
    } = *candidate;

    if range_from < 1 || range_to <= range_from {
        return Err(ValidationError::MalformedRange {
            range_from,
            range_to,
        });
    }

    if range_to > format.max_number() {
        return Err(ValidationError::ExceedsFormatCapacity {
            prefix: prefix.to_string(),
            range_to,
            digits: format.body_digits(),
            max: format.max_number(),
        });
    }

    let siblings: Vec<&Sequence> = existing
        .iter()
        .filter(|seq| {
            seq.company == candidate.company
                && seq.type_code == candidate.type_code
                && Some(seq.id) != candidate.exclude
        })
        .collect();

    if let Some(overlapping) = siblings
        .iter()
        .find(|seq| range_from <= seq.range_to && range_to >= seq.range_from)
    {
        return Err(ValidationError::Overlap {
            prefix: prefix.to_string(),
            range_from,
            range_to,
            existing_id: overlapping.id,
            existing_from: overlapping.range_from,
            existing_to: overlapping.range_to,
        });
    }

    if last_consumed > 0 && range_from <= last_consumed {
        return Err(ValidationError::Retroactive {
            prefix: prefix.to_string(),
            range_from,
            last_consumed,
            last_identifier: format_identifier(prefix, last_consumed, format)
                .unwrap_or_else(|_| format!("{prefix}{last_consumed}")),
        });
    }

    if let Some(previous_to) = siblings.iter().map(|seq| seq.range_to).max() {
        if range_from <= previous_to {
            return Err(ValidationError::NonAscending {
                prefix: prefix.to_string(),
                range_from,
                previous_to,
            });
        }
    }

    Ok(())
}
