pub mod auth;
pub mod balances;
pub mod donations;
pub mod donors;
pub mod expenses;
pub mod init;
pub mod monthly;
pub mod report;
pub mod status;

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{FundError, Result};
use crate::session::{self, Session};
use crate::settings::{db_path, load_settings, Settings};

/// Everything a record-touching command runs with: the operator's session,
/// the loaded settings and an open database.
pub struct Context {
    pub session: Session,
    pub settings: Settings,
    pub data_dir: PathBuf,
    pub conn: Connection,
}

impl Context {
    pub fn open() -> Result<Self> {
        let settings = load_settings();
        let data_dir = PathBuf::from(&settings.data_dir);
        let conn = open_database(&data_dir)?;
        let session = session::verify(&conn, &data_dir)?;
        Ok(Self {
            session,
            settings,
            data_dir,
            conn,
        })
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

/// Open the fund database in `data_dir`; it must already exist.
pub(crate) fn open_database(data_dir: &Path) -> Result<Connection> {
    let db = db_path(data_dir);
    if !db.exists() {
        return Err(FundError::Settings(format!(
            "database not found at {} (run `fundbook init`)",
            db.display()
        )));
    }
    get_connection(&db)
}

/// Parse `YYYY-MM`, defaulting to the current month.
pub(crate) fn parse_period(month: Option<&str>) -> Result<(u32, i32)> {
    let Some(raw) = month else {
        let today = Local::now().date_naive();
        return Ok((today.month(), today.year()));
    };
    let invalid = || FundError::validation(format!("Invalid month '{raw}' (expected YYYY-MM)"));
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    crate::store::validate_period(month, year)?;
    Ok((month, year))
}

/// Resolve an id typed by the operator: the full id or a unique prefix of one.
pub(crate) fn resolve_id(conn: &Connection, table: &str, key: &str, what: &str) -> Result<String> {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        return Err(FundError::validation(format!("{what} ID is required")));
    }
    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM {table} WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2"
    ))?;
    let ids: Vec<String> = stmt
        .query_map([&key], |r| r.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match ids.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(FundError::not_found(format!("{what} not found"))),
        _ if ids.iter().any(|id| *id == key) => Ok(key),
        _ => Err(FundError::validation(format!(
            "{what} ID '{key}' is ambiguous, type more characters"
        ))),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn write_output(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[derive(Parser)]
#[command(name = "fundbook", about = "Donor, donation and expense records for a charity fund.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up fundbook: choose a data directory, create the database and the admin user.
    Init {
        /// Path for fundbook data (default: ~/Documents/fundbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Organization name printed on receipts and reports
        #[arg(long = "org-name")]
        org_name: Option<String>,
        /// Admin login email
        #[arg(long = "admin-email", default_value = "admin@fund.local")]
        admin_email: String,
        /// Admin password (prompted when omitted)
        #[arg(long = "admin-password", env = "FUNDBOOK_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },
    /// Log in as the admin user.
    Login {
        /// Login email
        email: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "FUNDBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the current session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Manage donors.
    Donors {
        #[command(subcommand)]
        command: DonorsCommands,
    },
    /// Record, list and delete donations.
    Donations {
        #[command(subcommand)]
        command: DonationsCommands,
    },
    /// Track monthly pledges: who has paid, who is pending.
    Monthly {
        #[command(subcommand)]
        command: MonthlyCommands,
    },
    /// Record, list and delete expenses.
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommands,
    },
    /// Record opening balances and adjustments.
    Balances {
        #[command(subcommand)]
        command: BalancesCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show totals for donations, expenses and balance.
    Status,
}

#[derive(Subcommand)]
pub enum DonorsCommands {
    /// Add a donor.
    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Default monthly pledge amount (omit for one-off donors)
        #[arg(long)]
        pledge: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List donors, newest first.
    List,
    /// Edit a donor. Fields not given keep their current value.
    Edit {
        /// Donor ID (or a unique prefix)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// New monthly pledge; 0 removes the donor from the monthly roster
        #[arg(long)]
        pledge: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a donor. Their past donations are kept.
    Delete {
        /// Donor ID (or a unique prefix)
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DocFormat {
    Html,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl DocFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Html => "html",
            #[cfg(feature = "pdf")]
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Subcommand)]
pub enum DonationsCommands {
    /// Record a donation.
    Add {
        amount: f64,
        /// Donor ID (or a unique prefix); omit for an anonymous donation
        #[arg(long)]
        donor: Option<String>,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Payment method: cash, bank, wallet, monthly
        #[arg(long, default_value = "cash")]
        method: String,
        /// Mark as a monthly pledge payment
        #[arg(long)]
        monthly: bool,
        /// Pledge period this payment covers: YYYY-MM (default: from the date)
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List donations, newest first.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// Delete a donation.
    Delete {
        /// Donation ID (or a unique prefix)
        id: String,
    },
    /// Write a printable receipt for a donation.
    Receipt {
        /// Donation ID (or a unique prefix)
        id: String,
        #[arg(long, value_enum, default_value = "html")]
        format: DocFormat,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum MonthlyCommands {
    /// Show paid and pending monthly donors.
    Status {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Mark a monthly donor as paid.
    Pay {
        /// Donor ID (or a unique prefix)
        donor: String,
        /// Amount received (default: the donor's pledge)
        #[arg(long)]
        amount: Option<f64>,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Also write an HTML receipt
        #[arg(long)]
        receipt: bool,
    },
    /// Write the receipt for a donor's monthly payment.
    Receipt {
        /// Donor ID (or a unique prefix)
        donor: String,
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum, default_value = "html")]
        format: DocFormat,
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesCommands {
    /// Record an expense.
    Add {
        amount: f64,
        /// What the money was spent on
        #[arg(long)]
        description: String,
        /// bills, salary, repair, maintenance, food, supplies, utilities, other
        #[arg(long, default_value = "bills")]
        category: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List expenses, newest first.
    List,
    /// Delete an expense.
    Delete {
        /// Expense ID (or a unique prefix)
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BalancesCommands {
    /// Record an opening balance or an adjustment.
    Add {
        /// Signed amount
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        /// opening or adjustment
        #[arg(long = "type", default_value = "adjustment")]
        kind: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List balance records and the running total.
    List,
    /// Delete a balance record.
    Delete {
        /// Balance ID (or a unique prefix)
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Text,
    Csv,
    #[cfg(feature = "pdf")]
    Pdf,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Donations for one month: totals plus one row per donation.
    Donations {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
        /// Output file path (default: <data_dir>/exports/Donations_<M>_<YYYY>.<ext>)
        #[arg(long)]
        output: Option<String>,
    },
}
