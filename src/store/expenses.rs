use chrono::{Local, NaiveDate};
use rusqlite::Connection;

use crate::db::{column_date, column_parse, format_date, new_id};
use crate::error::{FundError, Result};
use crate::models::{Expense, ExpenseCategory};

use super::{normalize_period, require_finite};

#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub amount: f64,
    pub category: Option<ExpenseCategory>,
    pub description: String,
    pub date: Option<NaiveDate>,
}

fn map_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: column_parse(row, 2)?,
        description: row.get(3)?,
        date: column_date(row, 4)?,
        month: row.get(5)?,
        year: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const SELECT_EXPENSE: &str =
    "SELECT id, amount, category, description, date, month, year, created_at FROM expenses";

pub fn list_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_EXPENSE} ORDER BY date DESC, created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map([], map_expense)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn create_expense(conn: &Connection, input: &ExpenseInput) -> Result<Expense> {
    let amount = require_finite(input.amount)?;
    if amount <= 0.0 {
        return Err(FundError::validation("Amount must be greater than 0"));
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(FundError::validation("Description is required"));
    }
    let category = input.category.unwrap_or(ExpenseCategory::Bills);
    let date = input.date.unwrap_or_else(|| Local::now().date_naive());
    let (month, year) = normalize_period(date, None, None)?;

    let id = new_id();
    conn.execute(
        "INSERT INTO expenses (id, amount, category, description, date, month, year) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![id, amount, category.as_str(), description, format_date(date), month, year],
    )?;
    tracing::info!(expense_id = %id, amount, "expense recorded");

    Ok(conn.query_row(&format!("{SELECT_EXPENSE} WHERE id = ?1"), [&id], map_expense)?)
}

pub fn delete_expense(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(FundError::not_found("Expense not found"));
    }
    tracing::info!(expense_id = %id, "expense deleted");
    Ok(())
}

pub fn total_expenses(conn: &Connection) -> Result<f64> {
    Ok(conn.query_row("SELECT COALESCE(SUM(amount), 0) FROM expenses", [], |r| r.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn input(amount: f64, description: &str) -> ExpenseInput {
        ExpenseInput {
            amount,
            category: None,
            description: description.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 9),
        }
    }

    #[test]
    fn test_create_defaults_to_bills() {
        let (_dir, conn) = test_db();
        let e = create_expense(&conn, &input(1200.0, "Electricity")).unwrap();
        assert_eq!(e.category, ExpenseCategory::Bills);
        assert_eq!((e.month, e.year), (6, 2025));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let (_dir, conn) = test_db();
        let err = create_expense(&conn, &input(0.0, "Nothing")).unwrap_err();
        assert!(matches!(err, FundError::Validation(ref m) if m == "Amount must be greater than 0"));
    }

    #[test]
    fn test_description_required() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            create_expense(&conn, &input(10.0, "  ")),
            Err(FundError::Validation(_))
        ));
    }

    #[test]
    fn test_list_total_and_delete() {
        let (_dir, conn) = test_db();
        let a = create_expense(&conn, &input(100.0, "Soap")).unwrap();
        create_expense(
            &conn,
            &ExpenseInput {
                category: Some(ExpenseCategory::Salary),
                ..input(900.0, "Imam salary")
            },
        )
        .unwrap();
        assert_eq!(list_expenses(&conn).unwrap().len(), 2);
        assert_eq!(total_expenses(&conn).unwrap(), 1000.0);

        delete_expense(&conn, &a.id).unwrap();
        assert_eq!(total_expenses(&conn).unwrap(), 900.0);
        assert!(matches!(delete_expense(&conn, &a.id), Err(FundError::NotFound(_))));
    }
}
