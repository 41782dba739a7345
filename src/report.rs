use std::path::Path;

use chrono::{DateTime, Local};
use comfy_table::{Cell, CellAlignment, Table};
use rusqlite::Connection;

use crate::error::{FundError, Result};
use crate::fmt::{amount, capitalize, money, short_date};
use crate::models::Donation;
use crate::settings::Organization;
use crate::store::{balances, expenses};

// ---------------------------------------------------------------------------
// Donations report
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ReportRow {
    pub donor_name: String,
    pub amount: f64,
    pub payment_method: String,
    pub date: String,
}

#[derive(Debug)]
pub struct DonationReport {
    pub org_name: String,
    pub currency: String,
    pub month: u32,
    pub year: i32,
    pub rows: Vec<ReportRow>,
    pub total: f64,
    pub donor_count: usize,
    pub generated_at: String,
}

pub fn render_report(
    org: &Organization,
    donations: &[Donation],
    month: u32,
    year: i32,
) -> Result<DonationReport> {
    build_donation_report(org, donations, month, year, Local::now())
}

/// Summarize `donations` for a period. Rows keep the input order.
pub fn build_donation_report(
    org: &Organization,
    donations: &[Donation],
    month: u32,
    year: i32,
    now: DateTime<Local>,
) -> Result<DonationReport> {
    let mut rows = Vec::with_capacity(donations.len());
    for d in donations {
        if !d.amount.is_finite() {
            return Err(FundError::validation(format!(
                "Donation {} has a non-numeric amount",
                d.id
            )));
        }
        rows.push(ReportRow {
            donor_name: d
                .donor
                .donor()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            amount: d.amount,
            payment_method: capitalize(d.payment_method.as_str()),
            date: short_date(d.date),
        });
    }
    let total = rows.iter().map(|r| r.amount).sum();

    Ok(DonationReport {
        org_name: org.name.clone(),
        currency: org.currency.clone(),
        month,
        year,
        donor_count: rows.len(),
        rows,
        total,
        generated_at: now.format("%Y-%m-%d %H:%M").to_string(),
    })
}

impl DonationReport {
    pub fn title(&self) -> String {
        format!("{} - Donations Report", self.org_name)
    }

    pub fn period_label(&self) -> String {
        format!("Month: {} / Year: {}", self.month, self.year)
    }

    /// Export file name for this period, e.g. `Donations_3_2025.pdf`.
    pub fn file_name(&self, ext: &str) -> String {
        format!("Donations_{}_{}.{ext}", self.month, self.year)
    }

    pub fn to_text(&self) -> String {
        let mut table = Table::new();
        table.set_header(vec![
            "Donor Name".to_string(),
            format!("Amount ({})", self.currency),
            "Payment Method".to_string(),
            "Date".to_string(),
        ]);
        for r in &self.rows {
            table.add_row(vec![
                Cell::new(&r.donor_name),
                Cell::new(amount(r.amount)).set_alignment(CellAlignment::Right),
                Cell::new(&r.payment_method),
                Cell::new(&r.date),
            ]);
        }
        format!(
            "{}\n{}\nTotal Donations: {}\nTotal Donors: {}\n{table}\nGenerated on: {}",
            self.title(),
            self.period_label(),
            money(self.total, &self.currency),
            self.donor_count,
            self.generated_at,
        )
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["donor_name", "amount", "payment_method", "date"])?;
        for r in &self.rows {
            let amt = amount(r.amount);
            wtr.write_record([
                r.donor_name.as_str(),
                amt.as_str(),
                r.payment_method.as_str(),
                r.date.as_str(),
            ])?;
        }
        let total = amount(self.total);
        wtr.write_record(["Total", total.as_str(), "", ""])?;
        wtr.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fund summary
// ---------------------------------------------------------------------------

pub struct FundSummary {
    pub total_donations: f64,
    pub donation_count: i64,
    pub total_expenses: f64,
    pub opening_balance: f64,
    pub balance_total: f64,
    /// Donations minus expenses.
    pub net: f64,
}

pub fn fund_summary(conn: &Connection) -> Result<FundSummary> {
    let (total_donations, donation_count): (f64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM donations",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let total_expenses = expenses::total_expenses(conn)?;
    let totals = balances::balance_totals(conn)?;
    Ok(FundSummary {
        total_donations,
        donation_count,
        total_expenses,
        opening_balance: totals.opening,
        balance_total: totals.running_total,
        net: total_donations - total_expenses,
    })
}
