use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::donations::write_receipt;
use crate::cli::{parse_period, resolve_id, short_id, Context, DocFormat};
use crate::error::{FundError, Result};
use crate::fmt::{money, short_date};
use crate::receipt::render_receipt;
use crate::reconciler::{load_reconciliation, record_monthly_payment};
use crate::store::{donations, donors};

pub fn status(ctx: &Context, month: Option<&str>) -> Result<()> {
    let (m, y) = parse_period(month)?;
    let rec = load_reconciliation(&ctx.conn, m, y)?;
    let currency = &ctx.settings.currency;

    println!("{}", format!("Monthly donors for {}/{}", rec.month, rec.year).bold());

    let mut paid = Table::new();
    paid.set_header(vec!["ID", "Donor", "Pledge", "Paid", "Date"]);
    for p in &rec.paid {
        paid.add_row(vec![
            Cell::new(short_id(&p.donor.id)),
            Cell::new(&p.donor.name),
            Cell::new(p.donor.pledge.map(|v| money(v, currency)).unwrap_or_default()),
            Cell::new(money(p.donation.amount, currency)),
            Cell::new(short_date(p.donation.date)),
        ]);
    }
    println!("\n{} ({})\n{paid}", "Paid".green().bold(), rec.paid.len());

    let mut pending = Table::new();
    pending.set_header(vec!["ID", "Donor", "Phone", "Pledge"]);
    for d in &rec.unpaid {
        pending.add_row(vec![
            Cell::new(short_id(&d.id)),
            Cell::new(&d.name),
            Cell::new(&d.phone),
            Cell::new(d.pledge.map(|v| money(v, currency)).unwrap_or_default()),
        ]);
    }
    println!("\n{} ({})\n{pending}", "Pending".yellow().bold(), rec.unpaid.len());

    println!(
        "\n{} {}",
        "Total collected:".bold(),
        money(rec.total_collected, currency)
    );
    Ok(())
}

pub fn pay(
    ctx: &Context,
    donor: &str,
    amount: Option<f64>,
    month: Option<&str>,
    receipt: bool,
) -> Result<()> {
    let (m, y) = parse_period(month)?;
    let id = resolve_id(&ctx.conn, "donors", donor, "Donor")?;
    let donor = donors::get_donor(&ctx.conn, &id)?;
    if !donor.has_pledge() {
        return Err(FundError::validation(format!(
            "{} has no monthly pledge (set one with `fundbook donors edit --pledge`)",
            donor.name
        )));
    }
    let amount = amount.or(donor.pledge).unwrap_or(0.0);

    let donation = record_monthly_payment(&ctx.conn, &donor, amount, m, y)?;
    println!(
        "{} {} paid {} for {m}/{y}",
        "✓".green(),
        donor.name,
        money(donation.amount, &ctx.settings.currency)
    );

    if receipt {
        let r = render_receipt(&ctx.settings.organization(), &donor, &donation)?;
        write_receipt(ctx, &r, DocFormat::Html, None)?;
    }
    Ok(())
}

/// Receipt for the donor's recorded payment. Looks the payment up directly,
/// so it still works after the donor's pledge has been removed.
pub fn receipt(
    ctx: &Context,
    donor: &str,
    month: Option<&str>,
    format: DocFormat,
    output: Option<String>,
) -> Result<()> {
    let (m, y) = parse_period(month)?;
    let id = resolve_id(&ctx.conn, "donors", donor, "Donor")?;
    let donor = donors::get_donor(&ctx.conn, &id)?;
    let donation = donations::monthly_payments(&ctx.conn, m, y)?
        .into_iter()
        .find(|d| d.donor.id() == Some(id.as_str()))
        .ok_or_else(|| FundError::not_found(format!("No monthly payment recorded for {m}/{y}")))?;
    let r = render_receipt(&ctx.settings.organization(), &donor, &donation)?;
    write_receipt(ctx, &r, format, output)
}
