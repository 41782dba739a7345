use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{resolve_id, short_id, Context};
use crate::db::parse_date;
use crate::error::Result;
use crate::fmt::{capitalize, money, short_date};
use crate::models::ExpenseCategory;
use crate::store::expenses::{self, ExpenseInput};

pub fn add(
    ctx: &Context,
    amount: f64,
    description: String,
    category: &str,
    date: Option<&str>,
) -> Result<()> {
    let category: ExpenseCategory = category.parse()?;
    let date = date.map(parse_date).transpose()?;
    let expense = expenses::create_expense(
        &ctx.conn,
        &ExpenseInput {
            amount,
            category: Some(category),
            description,
            date,
        },
    )?;
    println!(
        "Expense added successfully: {} for {} [{}]",
        money(expense.amount, &ctx.settings.currency),
        expense.description,
        short_id(&expense.id)
    );
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let rows = expenses::list_expenses(&ctx.conn)?;
    let currency = &ctx.settings.currency;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Category", "Description", "Amount"]);
    for e in &rows {
        table.add_row(vec![
            Cell::new(short_id(&e.id)),
            Cell::new(short_date(e.date)),
            Cell::new(capitalize(e.category.as_str())),
            Cell::new(&e.description),
            Cell::new(money(e.amount, currency)),
        ]);
    }
    let total: f64 = rows.iter().map(|e| e.amount).sum();
    println!("Expenses\n{table}");
    println!("{} {}", "Total:".bold(), money(total, currency).red());
    Ok(())
}

pub fn delete(ctx: &Context, id: &str) -> Result<()> {
    let id = resolve_id(&ctx.conn, "expenses", id, "Expense")?;
    expenses::delete_expense(&ctx.conn, &id)?;
    println!("Expense deleted");
    Ok(())
}
