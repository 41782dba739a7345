use std::path::PathBuf;

use zeroize::Zeroize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{db_path, load_settings, save_settings, shellexpand_path};
use crate::store::users;

pub fn run(
    data_dir: Option<String>,
    org_name: Option<String>,
    admin_email: &str,
    admin_password: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = org_name {
        settings.org_name = name.trim().to_string();
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&db_path(&resolved))?;
    init_db(&conn)?;

    if users::user_count(&conn)? == 0 {
        let mut password = match admin_password {
            Some(p) => p,
            None => rpassword::prompt_password(format!("Password for {admin_email}: "))?,
        };
        let created = users::create_user(&conn, "Admin User", admin_email, &password);
        password.zeroize();
        let user = created?;
        println!("Created admin user {}", user.email);
    } else {
        println!("Admin user already exists");
    }

    println!("Initialized fundbook at {}", resolved.display());
    Ok(())
}
