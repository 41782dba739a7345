use rusqlite::{Connection, OptionalExtension};

use crate::db::new_id;
use crate::error::{FundError, Result};
use crate::models::Donor;

use super::{require_finite, trimmed};

/// Operator input for creating or replacing a donor.
#[derive(Debug, Clone, Default)]
pub struct DonorInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub pledge: Option<f64>,
    pub notes: Option<String>,
}

const SELECT_DONOR: &str =
    "SELECT id, name, phone, address, pledge, notes, created_at FROM donors";

pub(crate) fn map_donor(row: &rusqlite::Row) -> rusqlite::Result<Donor> {
    Ok(Donor {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        pledge: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn validate(input: &DonorInput) -> Result<(String, Option<f64>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(FundError::validation("Donor name is required"));
    }
    let pledge = match input.pledge {
        None => None,
        Some(p) => {
            let p = require_finite(p)?;
            if p < 0.0 {
                return Err(FundError::validation("Monthly pledge cannot be negative"));
            }
            // A zero pledge means "not a monthly donor"
            (p > 0.0).then_some(p)
        }
    };
    Ok((name.to_string(), pledge))
}

/// All donors, newest first.
pub fn list_donors(conn: &Connection) -> Result<Vec<Donor>> {
    let mut stmt = conn.prepare(&format!("{SELECT_DONOR} ORDER BY created_at DESC, rowid DESC"))?;
    let rows = stmt.query_map([], map_donor)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_donor(conn: &Connection, id: &str) -> Result<Donor> {
    conn.query_row(&format!("{SELECT_DONOR} WHERE id = ?1"), [id], map_donor)
        .optional()?
        .ok_or_else(|| FundError::not_found("Donor not found"))
}

pub fn create_donor(conn: &Connection, input: &DonorInput) -> Result<Donor> {
    let (name, pledge) = validate(input)?;
    let id = new_id();
    conn.execute(
        "INSERT INTO donors (id, name, phone, address, pledge, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            id,
            name,
            trimmed(input.phone.as_deref()),
            trimmed(input.address.as_deref()),
            pledge,
            trimmed(input.notes.as_deref()),
        ],
    )?;
    tracing::info!(donor_id = %id, "donor created");
    get_donor(conn, &id)
}

/// Replace every editable field of an existing donor.
pub fn update_donor(conn: &Connection, id: &str, input: &DonorInput) -> Result<Donor> {
    let (name, pledge) = validate(input)?;
    let changed = conn.execute(
        "UPDATE donors SET name = ?1, phone = ?2, address = ?3, pledge = ?4, notes = ?5 WHERE id = ?6",
        rusqlite::params![
            name,
            trimmed(input.phone.as_deref()),
            trimmed(input.address.as_deref()),
            pledge,
            trimmed(input.notes.as_deref()),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(FundError::not_found("Donor not found"));
    }
    tracing::info!(donor_id = %id, "donor updated");
    get_donor(conn, id)
}

/// Remove a donor. Their past donations are kept.
pub fn delete_donor(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM donors WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(FundError::not_found("Donor not found"));
    }
    tracing::info!(donor_id = %id, "donor deleted");
    Ok(())
}
