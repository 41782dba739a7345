use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{resolve_id, short_id, Context};
use crate::db::parse_date;
use crate::error::Result;
use crate::fmt::{capitalize, money, short_date};
use crate::models::BalanceKind;
use crate::store::balances::{self, BalanceInput};

pub fn add(
    ctx: &Context,
    amount: f64,
    kind: &str,
    date: Option<&str>,
    notes: Option<String>,
) -> Result<()> {
    let kind: BalanceKind = kind.parse()?;
    let date = date.map(parse_date).transpose()?;
    let balance = balances::create_balance(
        &ctx.conn,
        &BalanceInput {
            kind: Some(kind),
            amount,
            date,
            notes,
        },
    )?;
    println!(
        "{} recorded: {} [{}]",
        capitalize(balance.kind.as_str()),
        money(balance.amount, &ctx.settings.currency),
        short_id(&balance.id)
    );
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let rows = balances::list_balances(&ctx.conn)?;
    let totals = balances::balance_totals(&ctx.conn)?;
    let currency = &ctx.settings.currency;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Amount", "Notes"]);
    for b in &rows {
        table.add_row(vec![
            Cell::new(short_id(&b.id)),
            Cell::new(short_date(b.date)),
            Cell::new(capitalize(b.kind.as_str())),
            Cell::new(money(b.amount, currency)),
            Cell::new(&b.notes),
        ]);
    }
    println!("Balance records\n{table}");
    println!("{} {}", "Opening balance:".bold(), money(totals.opening, currency));
    println!("{} {}", "Running total:".bold(), money(totals.running_total, currency));
    Ok(())
}

pub fn delete(ctx: &Context, id: &str) -> Result<()> {
    let id = resolve_id(&ctx.conn, "balances", id, "Balance record")?;
    balances::delete_balance(&ctx.conn, &id)?;
    println!("Balance record deleted");
    Ok(())
}
