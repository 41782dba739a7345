use chrono::Local;
use rusqlite::{Connection, OptionalExtension};

use crate::db::{column_date, column_parse, format_date, new_id};
use crate::error::{FundError, Result};
use crate::models::{Donation, Donor, DonorRef, NewDonation, PaymentMethod};

use super::{normalize_period, require_finite, trimmed, validate_period};

// Donor columns come from a LEFT JOIN so the reference is resolved in the
// same query that loads the donation.
const SELECT_DONATION: &str = "\
    SELECT d.id, d.donor_id, d.amount, d.date, d.month, d.year, d.payment_method, \
           d.is_monthly, d.notes, d.created_at, \
           p.id, p.name, p.phone, p.address, p.pledge, p.notes, p.created_at \
    FROM donations d LEFT JOIN donors p ON d.donor_id = p.id";

fn map_donation(row: &rusqlite::Row) -> rusqlite::Result<Donation> {
    let donor_id: Option<String> = row.get(1)?;
    let resolved_id: Option<String> = row.get(10)?;
    let donor = match (donor_id, resolved_id) {
        (None, _) => DonorRef::Anonymous,
        (Some(_), Some(id)) => DonorRef::Resolved(Donor {
            id,
            name: row.get(11)?,
            phone: row.get(12)?,
            address: row.get(13)?,
            pledge: row.get(14)?,
            notes: row.get(15)?,
            created_at: row.get(16)?,
        }),
        (Some(id), None) => DonorRef::Unresolved(id),
    };
    Ok(Donation {
        id: row.get(0)?,
        donor,
        amount: row.get(2)?,
        date: column_date(row, 3)?,
        month: row.get(4)?,
        year: row.get(5)?,
        payment_method: column_parse(row, 6)?,
        is_monthly: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Donations newest first, optionally restricted to one stored month/year.
pub fn list_donations(conn: &Connection, period: Option<(u32, i32)>) -> Result<Vec<Donation>> {
    let order = "ORDER BY d.date DESC, d.created_at DESC, d.rowid DESC";
    let rows = match period {
        Some((month, year)) => {
            validate_period(month, year)?;
            let mut stmt = conn.prepare(&format!(
                "{SELECT_DONATION} WHERE d.month = ?1 AND d.year = ?2 {order}"
            ))?;
            let rows = stmt.query_map(rusqlite::params![month, year], map_donation)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_DONATION} {order}"))?;
            let rows = stmt.query_map([], map_donation)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(rows)
}

/// Donations flagged as monthly pledge payments for `(month, year)`.
pub fn monthly_payments(conn: &Connection, month: u32, year: i32) -> Result<Vec<Donation>> {
    Ok(list_donations(conn, Some((month, year)))?
        .into_iter()
        .filter(|d| d.is_monthly_payment_for(month, year))
        .collect())
}

pub fn get_donation(conn: &Connection, id: &str) -> Result<Donation> {
    conn.query_row(&format!("{SELECT_DONATION} WHERE d.id = ?1"), [id], map_donation)
        .optional()?
        .ok_or_else(|| FundError::not_found("Donation not found"))
}

pub(crate) fn validate_amount(amount: f64) -> Result<f64> {
    let amount = require_finite(amount)?;
    if amount < 0.0 {
        return Err(FundError::validation("Amount cannot be negative"));
    }
    Ok(amount)
}

pub fn create_donation(conn: &Connection, new: &NewDonation) -> Result<Donation> {
    let amount = validate_amount(new.amount)?;
    let date = new.date.unwrap_or_else(|| Local::now().date_naive());
    let (month, year) = normalize_period(date, new.month, new.year)?;
    let method = new.payment_method.unwrap_or(PaymentMethod::Cash);

    let id = new_id();
    conn.execute(
        "INSERT INTO donations (id, donor_id, amount, date, month, year, payment_method, is_monthly, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            new.donor_id,
            amount,
            format_date(date),
            month,
            year,
            method.as_str(),
            new.is_monthly,
            trimmed(new.notes.as_deref()),
        ],
    )?;
    tracing::info!(donation_id = %id, amount, month, year, "donation recorded");
    get_donation(conn, &id)
}

/// Donations are never edited in place; a mistake is fixed by deleting and re-adding.
pub fn delete_donation(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM donations WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(FundError::not_found("Donation not found"));
    }
    tracing::info!(donation_id = %id, "donation deleted");
    Ok(())
}
