//! Identifier rendering and parsing.
//!
//! | Format | Layout | Length |
//! |--------|--------|--------|
//! | Physical | prefix + 8-digit body | 11 |
//! | Electronic | prefix + 10-digit body | 13 |

use crate::domain::{IdentifierFormat, NcfError, PREFIX_LEN};

/// Render `number` as `prefix || zero-pad(number)`.
pub fn format_identifier(
    prefix: &str,
    number: u64,
    format: IdentifierFormat,
) -> Result<String, NcfError> {
    if prefix.len() != PREFIX_LEN {
        return Err(NcfError::Storage(format!("prefix {prefix:?} is not {PREFIX_LEN} characters")));
    }
    if number > format.max_number() {
        return Err(NcfError::Storage(format!(
            "number {number} does not fit a {}-digit body",
            format.body_digits()
        )));
    }
    Ok(format!("{prefix}{number:0width$}", width = format.body_digits()))
}

/// Numeric body of `identifier` if it carries `prefix` and an all-digit body.
pub fn parse_identifier_number(identifier: &str, prefix: &str) -> Option<u64> {
    let body = identifier.strip_prefix(prefix)?;
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse().ok()
}
