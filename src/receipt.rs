use chrono::{DateTime, Datelike, Local};

use crate::error::{FundError, Result};
use crate::fmt::{amount, capitalize, id_tail, long_date};
use crate::models::{Donation, Donor};
use crate::settings::Organization;

pub const TITLE: &str = "DONATION RECEIPT";
pub const THANKS: &str = "Thank you for your generous contribution!";
pub const BLESSING: &str = "May Allah accept from all of us - Ameen";

/// A single-donation receipt with every field already formatted for print.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub org_name: String,
    pub org_subtitle: String,
    pub donor_name: String,
    /// e.g. "Rs 500.00"
    pub amount: String,
    pub date: String,
    pub payment_method: String,
    pub receipt_id: String,
    pub reference: String,
    pub stamp_year: i32,
    pub generated_at: String,
}

/// Build a receipt using the local clock for the stamp and footer.
pub fn render_receipt(org: &Organization, donor: &Donor, donation: &Donation) -> Result<Receipt> {
    build_receipt(org, donor, donation, Local::now())
}

pub fn build_receipt(
    org: &Organization,
    donor: &Donor,
    donation: &Donation,
    now: DateTime<Local>,
) -> Result<Receipt> {
    if !donation.amount.is_finite() || donation.amount < 0.0 {
        return Err(FundError::validation(format!(
            "Donation {} has an invalid amount",
            donation.id
        )));
    }
    if donation.id.trim().is_empty() {
        return Err(FundError::validation("Donation id is missing"));
    }
    if donor.id.trim().is_empty() {
        return Err(FundError::validation("Donor id is missing"));
    }
    if donor.name.trim().is_empty() {
        return Err(FundError::validation("Donor name is missing"));
    }
    if let Some(owner) = donation.donor.id() {
        if owner != donor.id {
            return Err(FundError::validation(format!(
                "Donation {} does not belong to {}",
                donation.id, donor.name
            )));
        }
    }

    Ok(Receipt {
        org_name: org.name.clone(),
        org_subtitle: org.subtitle.clone(),
        donor_name: donor.name.clone(),
        amount: format!("{} {}", org.currency, amount(donation.amount)),
        date: long_date(donation.date),
        payment_method: capitalize(donation.payment_method.as_str()),
        receipt_id: id_tail(&donation.id, 8),
        reference: format!(
            "{}-{}-{}",
            org.prefix,
            id_tail(&donor.id, 6),
            id_tail(&donation.id, 6)
        ),
        stamp_year: now.year(),
        generated_at: now.format("%Y-%m-%d %H:%M").to_string(),
    })
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const RECEIPT_CSS: &str = "\
body { font-family: Arial, sans-serif; margin: 0; padding: 20px; }
.receipt { max-width: 600px; margin: 0 auto; background: white; padding: 40px; border: 2px solid #22c55e; border-radius: 8px; }
.header { text-align: center; margin-bottom: 30px; }
h1 { color: #065f46; margin: 0; font-size: 24px; }
.subtitle { color: #6b7280; margin: 5px 0; }
.title-section { border-top: 2px solid #22c55e; border-bottom: 2px solid #22c55e; padding: 20px; margin: 20px 0; text-align: center; }
.title-section h2 { color: #1f2937; margin: 0; font-size: 18px; }
.detail-row { display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #e5e7eb; margin: 10px 0; }
.label { color: #6b7280; font-weight: bold; }
.value { color: #1f2937; font-weight: bold; }
.amount { color: #22c55e; font-size: 18px; }
.reference { text-align: center; margin: 30px 0; padding: 20px; background: #f9fafb; border-radius: 8px; color: #6b7280; font-size: 12px; }
.stamp-wrap { display: flex; justify-content: center; margin-top: 30px; }
.stamp { width: 160px; height: 160px; border: 5px solid #16a34a; border-radius: 50%; color: #16a34a; font-size: 26px; font-weight: 900; display: flex; flex-direction: column; align-items: center; justify-content: center; transform: rotate(-15deg); opacity: 0.75; text-transform: uppercase; box-sizing: border-box; text-align: center; }
.stamp-year { font-size: 12px; font-weight: 700; letter-spacing: 2px; margin-top: 6px; }
.footer { text-align: center; margin-top: 30px; color: #6b7280; font-size: 12px; }
@media print { body { padding: 0; } }
";

impl Receipt {
    pub fn file_stem(&self) -> String {
        format!("receipt-{}", self.receipt_id)
    }

    /// Standalone printable HTML page.
    pub fn to_html(&self) -> String {
        let rows = [
            ("Donor Name", escape(&self.donor_name), ""),
            ("Amount", escape(&self.amount), " amount"),
            ("Date", escape(&self.date), ""),
            ("Payment Method", escape(&self.payment_method), ""),
            ("Receipt ID", escape(&self.receipt_id), ""),
        ]
        .iter()
        .map(|(label, value, class)| {
            format!(
                "      <div class=\"detail-row\"><span class=\"label\">{label}:</span>\
                 <span class=\"value{class}\">{value}</span></div>\n"
            )
        })
        .collect::<String>();

        let subtitle = if self.org_subtitle.is_empty() {
            String::new()
        } else {
            format!("      <p class=\"subtitle\">{}</p>\n", escape(&self.org_subtitle))
        };

        format!(
            "<!DOCTYPE html>
<html>
<head>
  <meta charset=\"utf-8\">
  <title>Donation Receipt</title>
  <style>
{RECEIPT_CSS}  </style>
</head>
<body>
  <div class=\"receipt\">
    <div class=\"header\">
      <h1>{org}</h1>
{subtitle}    </div>
    <div class=\"title-section\"><h2>{TITLE}</h2></div>
    <div class=\"details\">
{rows}    </div>
    <div class=\"reference\">Reference for verification purpose: {reference}</div>
    <div class=\"stamp-wrap\">
      <div class=\"stamp\">Verified Receipt<div class=\"stamp-year\">{year}</div></div>
    </div>
    <div class=\"footer\">
      <p>{THANKS}</p>
      <p>{BLESSING}</p>
      <p style=\"margin-top: 20px;\">Generated: {generated}</p>
    </div>
  </div>
</body>
</html>
",
            org = escape(&self.org_name),
            reference = escape(&self.reference),
            year = self.stamp_year,
            generated = escape(&self.generated_at),
        )
    }
}
