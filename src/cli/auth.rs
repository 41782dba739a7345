use zeroize::Zeroize;

use crate::cli::open_database;
use crate::error::Result;
use crate::session::{self, Session};
use crate::settings::get_data_dir;
use crate::store::users;

pub fn login(email: &str, password: Option<String>) -> Result<()> {
    let data_dir = get_data_dir();
    let conn = open_database(&data_dir)?;

    let mut password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    let result = users::authenticate(&conn, email, &password);
    password.zeroize();
    let user = result?;

    if let Some(previous) = session::load(&data_dir) {
        session::revoke(&conn, &previous)?;
    }
    let session = Session::issue(user);
    session::register(&conn, &session)?;
    session::save(&data_dir, &session)?;
    println!("Logged in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

pub fn logout() -> Result<()> {
    let data_dir = get_data_dir();
    if let Some(current) = session::load(&data_dir) {
        if let Ok(conn) = open_database(&data_dir) {
            session::revoke(&conn, &current)?;
        }
    }
    if session::clear(&data_dir)? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    let data_dir = get_data_dir();
    let conn = open_database(&data_dir)?;
    let session = session::verify(&conn, &data_dir)?;
    println!(
        "{} <{}> ({}), logged in since {}",
        session.user.name, session.user.email, session.user.role, session.issued_at
    );
    Ok(())
}
