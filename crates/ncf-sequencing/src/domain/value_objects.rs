//! # Domain Value Objects
//!
//! Immutable value types for NCF sequencing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Company (tenant) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub u64);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence identifier assigned by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence lifecycle.
///
/// `draft → active → {depleted, expired}`; the last two are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceState {
    /// Configured but not (yet) activated by an operator.
    #[default]
    Draft,
    /// Eligible for allocation.
    Active,
    /// Counter reached `range_to`.
    Depleted,
    /// Regulatory validity elapsed.
    Expired,
}

impl SequenceState {
    /// Check if transition to next state is valid.
    pub fn can_transition_to(&self, next: SequenceState) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Active) | (Self::Active, Self::Depleted) | (Self::Active, Self::Expired)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Depleted | Self::Expired)
    }

    /// Lowercase name as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Depleted => "depleted",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier layout, selected by `DocumentType::is_electronic`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierFormat {
    /// 3-char prefix + 8-digit body (11 characters).
    Physical,
    /// 3-char prefix + 10-digit body (13 characters).
    Electronic,
}

/// Length of every prefix.
pub const PREFIX_LEN: usize = 3;

impl IdentifierFormat {
    /// Select the format for a type.
    pub fn for_electronic(is_electronic: bool) -> Self {
        if is_electronic {
            Self::Electronic
        } else {
            Self::Physical
        }
    }

    /// Digits in the zero-padded numeric body.
    pub fn body_digits(&self) -> usize {
        match self {
            Self::Physical => 8,
            Self::Electronic => 10,
        }
    }

    /// Total identifier length including prefix.
    pub fn total_len(&self) -> usize {
        PREFIX_LEN + self.body_digits()
    }

    /// Largest number the body can represent.
    pub fn max_number(&self) -> u64 {
        10u64.pow(self.body_digits() as u32) - 1
    }
}

/// Three-level availability indicator for dashboards and alerting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Comfortably above the warning threshold.
    Ample,
    /// At or below the warning threshold.
    Low,
    /// Unusable or nearly exhausted.
    Critical,
}
