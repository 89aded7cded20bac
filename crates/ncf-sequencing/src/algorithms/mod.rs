//! # Algorithms Module
//!
//! Pure functions over persisted sequence fields. Expiration and range
//! validation run at configuration time; the state machine and formatting
//! also run on the allocation path.

pub mod alerts;
pub mod expiration;
pub mod formatting;
pub mod range_validation;
pub mod state_machine;
pub mod status;

pub use alerts::{evaluate_alerts, AlertPolicy, SequenceAlert, DEFAULT_EXPIRING_DAYS};
pub use expiration::{days_until_expiration, expiration_date, is_expired};
pub use formatting::{format_identifier, parse_identifier_number};
pub use range_validation::{validate_range, RangeCandidate};
pub use state_machine::{check_activation, check_allocatable, derive_state};
pub use status::{available, stock_level, usage_percent, used, SequenceStatus};
