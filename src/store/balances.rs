use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension};

use crate::db::{column_date, column_parse, format_date, new_id};
use crate::error::{FundError, Result};
use crate::models::{Balance, BalanceKind};

use super::{require_finite, trimmed};

#[derive(Debug, Clone)]
pub struct BalanceInput {
    pub kind: Option<BalanceKind>,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub struct BalanceTotals {
    /// Most recent opening balance, or 0 when none was recorded.
    pub opening: f64,
    /// Sum of every balance record.
    pub running_total: f64,
}

fn map_balance(row: &rusqlite::Row) -> rusqlite::Result<Balance> {
    Ok(Balance {
        id: row.get(0)?,
        kind: column_parse(row, 1)?,
        amount: row.get(2)?,
        date: column_date(row, 3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const SELECT_BALANCE: &str = "SELECT id, kind, amount, date, notes, created_at FROM balances";

/// Balance records, most recent date first.
pub fn list_balances(conn: &Connection) -> Result<Vec<Balance>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_BALANCE} ORDER BY date DESC, created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], map_balance)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn create_balance(conn: &Connection, input: &BalanceInput) -> Result<Balance> {
    let amount = require_finite(input.amount)?;
    let kind = input.kind.unwrap_or(BalanceKind::Adjustment);
    let date = input.date.unwrap_or_else(|| Local::now().date_naive());

    let id = new_id();
    conn.execute(
        "INSERT INTO balances (id, kind, amount, date, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, kind.as_str(), amount, format_date(date), trimmed(input.notes.as_deref())],
    )?;
    tracing::info!(balance_id = %id, kind = kind.as_str(), amount, "balance record added");

    Ok(conn.query_row(&format!("{SELECT_BALANCE} WHERE id = ?1"), [&id], map_balance)?)
}

pub fn delete_balance(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM balances WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(FundError::not_found("Balance record not found"));
    }
    tracing::info!(balance_id = %id, "balance record deleted");
    Ok(())
}

pub fn balance_totals(conn: &Connection) -> Result<BalanceTotals> {
    let running_total: f64 =
        conn.query_row("SELECT COALESCE(SUM(amount), 0) FROM balances", [], |r| r.get(0))?;
    let opening: Option<f64> = conn
        .query_row(
            "SELECT amount FROM balances WHERE kind = 'opening' \
             ORDER BY date DESC, created_at DESC, rowid DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(BalanceTotals {
        opening: opening.unwrap_or(0.0),
        running_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn input(kind: Option<BalanceKind>, amount: f64) -> BalanceInput {
        BalanceInput {
            kind,
            amount,
            date: None,
            notes: None,
        }
    }

    #[test]
    fn test_default_kind_is_adjustment() {
        let (_dir, conn) = test_db();
        let b = create_balance(&conn, &input(None, -250.0)).unwrap();
        assert_eq!(b.kind, BalanceKind::Adjustment);
        assert_eq!(b.amount, -250.0);
    }

    #[test]
    fn test_totals() {
        let (_dir, conn) = test_db();
        let empty = balance_totals(&conn).unwrap();
        assert_eq!((empty.opening, empty.running_total), (0.0, 0.0));

        create_balance(&conn, &input(Some(BalanceKind::Opening), 10_000.0)).unwrap();
        create_balance(&conn, &input(None, -1_500.0)).unwrap();
        let totals = balance_totals(&conn).unwrap();
        assert_eq!(totals.opening, 10_000.0);
        assert_eq!(totals.running_total, 8_500.0);
    }

    #[test]
    fn test_nan_rejected() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            create_balance(&conn, &input(None, f64::NAN)),
            Err(FundError::Validation(_))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, conn) = test_db();
        let b = create_balance(&conn, &input(None, 5.0)).unwrap();
        assert_eq!(list_balances(&conn).unwrap().len(), 1);
        delete_balance(&conn, &b.id).unwrap();
        assert!(list_balances(&conn).unwrap().is_empty());
        assert!(matches!(delete_balance(&conn, &b.id), Err(FundError::NotFound(_))));
    }
}
