mod cli;
mod db;
mod error;
mod fmt;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod receipt;
mod reconciler;
mod report;
mod session;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    BalancesCommands, Cli, Commands, Context, DonationsCommands, DonorsCommands, ExpensesCommands,
    MonthlyCommands, ReportCommands,
};
use error::Result;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FUNDBOOK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!("fundbook={}", settings::load_settings().log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli.command) {
        if e.is_internal() {
            tracing::error!(error = %e, "command failed");
        }
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            data_dir,
            org_name,
            admin_email,
            admin_password,
        } => cli::init::run(data_dir, org_name, &admin_email, admin_password),
        Commands::Login { email, password } => cli::auth::login(&email, password),
        Commands::Logout => cli::auth::logout(),
        Commands::Whoami => cli::auth::whoami(),
        Commands::Donors { command } => {
            let ctx = Context::open()?;
            match command {
                DonorsCommands::Add {
                    name,
                    phone,
                    address,
                    pledge,
                    notes,
                } => cli::donors::add(&ctx, name, phone, address, pledge, notes),
                DonorsCommands::List => cli::donors::list(&ctx),
                DonorsCommands::Edit {
                    id,
                    name,
                    phone,
                    address,
                    pledge,
                    notes,
                } => cli::donors::edit(&ctx, &id, name, phone, address, pledge, notes),
                DonorsCommands::Delete { id } => cli::donors::delete(&ctx, &id),
            }
        }
        Commands::Donations { command } => {
            let ctx = Context::open()?;
            match command {
                DonationsCommands::Add {
                    amount,
                    donor,
                    date,
                    method,
                    monthly,
                    period,
                    notes,
                } => cli::donations::add(
                    &ctx,
                    amount,
                    donor.as_deref(),
                    date.as_deref(),
                    &method,
                    monthly,
                    period.as_deref(),
                    notes,
                ),
                DonationsCommands::List { month } => cli::donations::list(&ctx, month.as_deref()),
                DonationsCommands::Delete { id } => cli::donations::delete(&ctx, &id),
                DonationsCommands::Receipt { id, format, output } => {
                    cli::donations::receipt(&ctx, &id, format, output)
                }
            }
        }
        Commands::Monthly { command } => {
            let ctx = Context::open()?;
            match command {
                MonthlyCommands::Status { month } => cli::monthly::status(&ctx, month.as_deref()),
                MonthlyCommands::Pay {
                    donor,
                    amount,
                    month,
                    receipt,
                } => cli::monthly::pay(&ctx, &donor, amount, month.as_deref(), receipt),
                MonthlyCommands::Receipt {
                    donor,
                    month,
                    format,
                    output,
                } => cli::monthly::receipt(&ctx, &donor, month.as_deref(), format, output),
            }
        }
        Commands::Expenses { command } => {
            let ctx = Context::open()?;
            match command {
                ExpensesCommands::Add {
                    amount,
                    description,
                    category,
                    date,
                } => cli::expenses::add(&ctx, amount, description, &category, date.as_deref()),
                ExpensesCommands::List => cli::expenses::list(&ctx),
                ExpensesCommands::Delete { id } => cli::expenses::delete(&ctx, &id),
            }
        }
        Commands::Balances { command } => {
            let ctx = Context::open()?;
            match command {
                BalancesCommands::Add {
                    amount,
                    kind,
                    date,
                    notes,
                } => cli::balances::add(&ctx, amount, &kind, date.as_deref(), notes),
                BalancesCommands::List => cli::balances::list(&ctx),
                BalancesCommands::Delete { id } => cli::balances::delete(&ctx, &id),
            }
        }
        Commands::Report { command } => {
            let ctx = Context::open()?;
            match command {
                ReportCommands::Donations {
                    month,
                    format,
                    output,
                } => cli::report::donations(&ctx, month.as_deref(), format, output),
            }
        }
        Commands::Status => cli::status::run(&Context::open()?),
    }
}
