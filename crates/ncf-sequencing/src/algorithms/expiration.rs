//! # Expiration Policy
//!
//! A sequence authorized any day in year Y with a validity of V years
//! expires on December 31 of Y + V - 1. Types exempt by administrative
//! guidance never expire.

use chrono::{Datelike, NaiveDate};

use crate::domain::{CatalogError, MAX_VALIDITY_YEARS};

/// Expiration date for an authorization, or `None` when exempt.
///
/// `validity_years` must already be resolved: callers substitute their
/// configured default for types that declare none.
///
/// # Errors
///
/// `InvalidValidity` when the validity is outside `1..=MAX_VALIDITY_YEARS`
/// or the year-end falls outside the calendar.
pub fn expiration_date(
    authorization_date: NaiveDate,
    applies_expiration: bool,
    validity_years: u32,
) -> Result<Option<NaiveDate>, CatalogError> {
    if !applies_expiration {
        return Ok(None);
    }
    if !(1..=MAX_VALIDITY_YEARS).contains(&validity_years) {
        return Err(CatalogError::InvalidValidity(validity_years));
    }
    i32::try_from(validity_years)
        .ok()
        .and_then(|v| authorization_date.year().checked_add(v - 1))
        .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31))
        .map(Some)
        .ok_or(CatalogError::InvalidValidity(validity_years))
}

/// Strictly past the expiration date. A sequence is usable on the day it
/// expires.
pub fn is_expired(expiration_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    matches!(expiration_date, Some(date) if date < today)
}

/// Days from `today` until expiration; negative once expired.
pub fn days_until_expiration(expiration_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expiration_date.map(|date| (date - today).num_days())
}
