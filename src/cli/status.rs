use colored::Colorize;

use crate::cli::Context;
use crate::db::get_metadata;
use crate::error::Result;
use crate::fmt::money;
use crate::report::fund_summary;
use crate::settings::db_path;

pub fn run(ctx: &Context) -> Result<()> {
    let summary = fund_summary(&ctx.conn)?;
    let currency = &ctx.settings.currency;

    println!("Organization: {}", ctx.settings.org_name);
    println!(
        "User:         {} <{}>",
        ctx.session.user.name, ctx.session.user.email
    );
    println!("Data dir:     {}", ctx.data_dir.display());
    println!("Database:     {}", db_path(&ctx.data_dir).display());
    if let Some(version) = get_metadata(&ctx.conn, "schema_version") {
        println!("Schema:       v{version}");
    }

    let donors: i64 = ctx.conn.query_row("SELECT count(*) FROM donors", [], |r| r.get(0))?;
    let pledged: i64 = ctx.conn.query_row(
        "SELECT count(*) FROM donors WHERE pledge IS NOT NULL AND pledge > 0",
        [],
        |r| r.get(0),
    )?;

    println!();
    println!("Donors:          {donors} ({pledged} monthly)");
    println!(
        "Donations:       {} ({} records)",
        money(summary.total_donations, currency).green(),
        summary.donation_count
    );
    println!("Expenses:        {}", money(summary.total_expenses, currency).red());
    println!("Net:             {}", money(summary.net, currency).bold());
    println!("Opening balance: {}", money(summary.opening_balance, currency));
    println!("Balance records: {}", money(summary.balance_total, currency));
    Ok(())
}
