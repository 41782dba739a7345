use comfy_table::{Cell, Table};

use crate::cli::{resolve_id, short_id, Context};
use crate::error::Result;
use crate::fmt::money;
use crate::store::donors::{self, DonorInput};

pub fn add(
    ctx: &Context,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    pledge: Option<f64>,
    notes: Option<String>,
) -> Result<()> {
    let donor = donors::create_donor(
        &ctx.conn,
        &DonorInput {
            name,
            phone,
            address,
            pledge,
            notes,
        },
    )?;
    println!("Donor added successfully: {} [{}]", donor.name, short_id(&donor.id));
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let rows = donors::list_donors(&ctx.conn)?;
    let currency = &ctx.settings.currency;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Phone", "Address", "Monthly Pledge", "Notes"]);
    for d in &rows {
        table.add_row(vec![
            Cell::new(short_id(&d.id)),
            Cell::new(&d.name),
            Cell::new(&d.phone),
            Cell::new(&d.address),
            Cell::new(d.pledge.map(|p| money(p, currency)).unwrap_or_default()),
            Cell::new(&d.notes),
        ]);
    }
    println!("Donors ({})\n{table}", rows.len());
    Ok(())
}

pub fn edit(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    pledge: Option<f64>,
    notes: Option<String>,
) -> Result<()> {
    let id = resolve_id(&ctx.conn, "donors", id, "Donor")?;
    let current = donors::get_donor(&ctx.conn, &id)?;
    let input = DonorInput {
        name: name.unwrap_or(current.name),
        phone: phone.or(Some(current.phone)),
        address: address.or(Some(current.address)),
        pledge: pledge.or(current.pledge),
        notes: notes.or(Some(current.notes)),
    };
    let donor = donors::update_donor(&ctx.conn, &id, &input)?;
    println!("Donor updated successfully: {}", donor.name);
    Ok(())
}

pub fn delete(ctx: &Context, id: &str) -> Result<()> {
    let id = resolve_id(&ctx.conn, "donors", id, "Donor")?;
    let donor = donors::get_donor(&ctx.conn, &id)?;
    donors::delete_donor(&ctx.conn, &id)?;
    println!("Donor deleted successfully: {}", donor.name);
    Ok(())
}
