//! Alert evaluation for active sequences. Delivery is left to collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Sequence, SequenceId, SequenceState};

use super::expiration::days_until_expiration;
use super::status::SequenceStatus;

/// Default look-ahead for expiring sequences, in days.
pub const DEFAULT_EXPIRING_DAYS: i64 = 30;

/// Thresholds for alert evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    /// Overrides the sequence's own warning threshold when set.
    pub low_stock_threshold: Option<u64>,
    /// Alert this many days before expiration.
    pub expiring_days: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: None,
            expiring_days: DEFAULT_EXPIRING_DAYS,
        }
    }
}

/// Condition an operator should hear about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceAlert {
    /// Few numbers left.
    LowStock {
        /// Sequence
        sequence_id: SequenceId,
        /// Numbers left
        available: u64,
        /// Threshold crossed
        threshold: u64,
    },
    /// Validity ends soon.
    ExpiringSoon {
        /// Sequence
        sequence_id: SequenceId,
        /// Days left
        days: i64,
        /// Expiration date
        expiration_date: NaiveDate,
    },
    /// Validity already ended.
    Expired {
        /// Sequence
        sequence_id: SequenceId,
        /// Expiration date
        expiration_date: NaiveDate,
    },
}

/// Alerts raised by `seq` as of `today`. Only sequences stored as active are
/// evaluated.
pub fn evaluate_alerts(
    seq: &Sequence,
    status: &SequenceStatus,
    today: NaiveDate,
    policy: &AlertPolicy,
) -> Vec<SequenceAlert> {
    let mut alerts = Vec::new();
    if seq.state != SequenceState::Active {
        return alerts;
    }

    let threshold = policy.low_stock_threshold.unwrap_or(seq.warning_threshold);
    if status.available <= threshold {
        alerts.push(SequenceAlert::LowStock {
            sequence_id: seq.id,
            available: status.available,
            threshold,
        });
    }

    if let (Some(expiration_date), Some(days)) = (
        seq.expiration_date.filter(|_| seq.applies_expiration),
        days_until_expiration(seq.expiration_date, today),
    ) {
        if days <= 0 {
            alerts.push(SequenceAlert::Expired {
                sequence_id: seq.id,
                expiration_date,
            });
        } else if days <= policy.expiring_days {
            alerts.push(SequenceAlert::ExpiringSoon {
                sequence_id: seq.id,
                days,
                expiration_date,
            });
        }
    }

    alerts
}
