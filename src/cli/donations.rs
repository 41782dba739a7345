use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{parse_period, resolve_id, short_id, write_output, Context, DocFormat};
use crate::db::parse_date;
use crate::error::{FundError, Result};
use crate::fmt::{capitalize, money, short_date};
use crate::models::{NewDonation, PaymentMethod};
use crate::receipt::{render_receipt, Receipt};
use crate::store::donations;

#[allow(clippy::too_many_arguments)]
pub fn add(
    ctx: &Context,
    amount: f64,
    donor: Option<&str>,
    date: Option<&str>,
    method: &str,
    monthly: bool,
    period: Option<&str>,
    notes: Option<String>,
) -> Result<()> {
    let donor_id = donor
        .map(|key| resolve_id(&ctx.conn, "donors", key, "Donor"))
        .transpose()?;
    let date = date.map(parse_date).transpose()?;
    let (month, year) = match period {
        Some(p) => {
            let (m, y) = parse_period(Some(p))?;
            (Some(m), Some(y))
        }
        None => (None, None),
    };
    let payment_method: PaymentMethod = method.parse()?;

    let donation = donations::create_donation(
        &ctx.conn,
        &NewDonation {
            donor_id,
            amount,
            date,
            month,
            year,
            payment_method: Some(payment_method),
            is_monthly: monthly,
            notes,
        },
    )?;
    println!(
        "Donation added successfully: {} from {} [{}]",
        money(donation.amount, &ctx.settings.currency),
        donation.donor.display_name(),
        short_id(&donation.id)
    );
    Ok(())
}

pub fn list(ctx: &Context, month: Option<&str>) -> Result<()> {
    let period = month.map(|m| parse_period(Some(m))).transpose()?;
    let rows = donations::list_donations(&ctx.conn, period)?;
    let currency = &ctx.settings.currency;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Donor", "Amount", "Method", "Period", "Notes"]);
    for d in &rows {
        let period = if d.is_monthly {
            format!("{}/{} (monthly)", d.month, d.year)
        } else {
            format!("{}/{}", d.month, d.year)
        };
        table.add_row(vec![
            Cell::new(short_id(&d.id)),
            Cell::new(short_date(d.date)),
            Cell::new(d.donor.display_name()),
            Cell::new(money(d.amount, currency)),
            Cell::new(capitalize(d.payment_method.as_str())),
            Cell::new(period),
            Cell::new(&d.notes),
        ]);
    }
    let total: f64 = rows.iter().map(|d| d.amount).sum();
    println!("Donations\n{table}");
    println!("{} {}", "Total:".bold(), money(total, currency));
    Ok(())
}

pub fn delete(ctx: &Context, id: &str) -> Result<()> {
    let id = resolve_id(&ctx.conn, "donations", id, "Donation")?;
    donations::delete_donation(&ctx.conn, &id)?;
    println!("Donation deleted");
    Ok(())
}

pub fn receipt(ctx: &Context, id: &str, format: DocFormat, output: Option<String>) -> Result<()> {
    let id = resolve_id(&ctx.conn, "donations", id, "Donation")?;
    let donation = donations::get_donation(&ctx.conn, &id)?;
    let donor = donation
        .donor
        .donor()
        .cloned()
        .ok_or_else(|| FundError::validation("Receipts can only be issued for donations with a known donor"))?;
    let receipt = render_receipt(&ctx.settings.organization(), &donor, &donation)?;
    write_receipt(ctx, &receipt, format, output)
}

/// Write `receipt` to `output`, or to the exports directory when no path is given.
pub(crate) fn write_receipt(
    ctx: &Context,
    receipt: &Receipt,
    format: DocFormat,
    output: Option<String>,
) -> Result<()> {
    let path = output.map(PathBuf::from).unwrap_or_else(|| {
        ctx.exports_dir()
            .join(format!("{}.{}", receipt.file_stem(), format.ext()))
    });
    let bytes = match format {
        DocFormat::Html => receipt.to_html().into_bytes(),
        #[cfg(feature = "pdf")]
        DocFormat::Pdf => crate::pdf::render_receipt(receipt)?,
    };
    write_output(&bytes, &path)?;
    println!("Receipt {} for {} ({})", receipt.receipt_id, receipt.donor_name, receipt.amount);
    Ok(())
}
