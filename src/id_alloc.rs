//! Sequential issue identifiers (`AD-1`, `AD-2`, ...).
//!
//! The sheet has no counter primitive, so every allocation scans the whole
//! table for the highest numeric suffix and adds one. Cost is linear in the
//! number of rows.

use crate::codec::{self, Row};
use crate::error::{Error, Result};

/// Separator between the prefix and the sequence number.
pub const ID_DELIM: char = '-';

/// Next unused id for `prefix`, given every sheet row including the header.
///
/// Only the part after the last delimiter is considered, whatever the prefix
/// in front of it. Rows with an empty, undelimited or non-numeric id are
/// skipped. Fails rather than reuse a suffix once the highest one is
/// `u64::MAX`.
pub fn next_id(prefix: &str, rows: &[Row]) -> Result<String> {
    let max = rows
        .iter()
        .skip(1)
        .filter_map(|row| sequence_number(codec::id_cell(row)))
        .max()
        .unwrap_or(0);
    let next = max.checked_add(1).ok_or_else(|| {
        Error::InvalidArgument(format!("id sequence exhausted: {prefix}{ID_DELIM}{max} is taken"))
    })?;
    Ok(format!("{}{}{}", prefix, ID_DELIM, next))
}

/// Numeric suffix of an id, if it has one.
pub fn sequence_number(id: &str) -> Option<u64> {
    if !id.contains(ID_DELIM) {
        return None;
    }
    id.rsplit(ID_DELIM).next()?.parse().ok()
}
