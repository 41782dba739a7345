//! Record store: create/list/update/delete for each persisted entity.
//!
//! Every function takes a borrowed [`rusqlite::Connection`] and returns the
//! crate [`Result`](crate::error::Result). Input validation happens here,
//! before anything touches the database, so a rejected write never leaves a
//! partial row behind.

pub mod balances;
pub mod donations;
pub mod donors;
pub mod expenses;
pub mod users;

use chrono::{Datelike, NaiveDate};

use crate::error::{FundError, Result};

pub(crate) fn require_finite(amount: f64) -> Result<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(FundError::validation("Amount must be a number"))
    }
}

pub(crate) fn trimmed(s: Option<&str>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Fill in month/year from `date` unless both were supplied explicitly.
pub fn normalize_period(date: NaiveDate, month: Option<u32>, year: Option<i32>) -> Result<(u32, i32)> {
    let (month, year) = match (month, year) {
        (Some(m), Some(y)) => (m, y),
        _ => (date.month(), date.year()),
    };
    validate_period(month, year)?;
    Ok((month, year))
}

pub fn validate_period(month: u32, year: i32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(FundError::validation(format!("Invalid month: {month} (expected 1-12)")));
    }
    if !(1000..=9999).contains(&year) {
        return Err(FundError::validation(format!("Invalid year: {year} (expected YYYY)")));
    }
    Ok(())
}
