use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rusqlite::{Connection, OptionalExtension};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::db::new_id;
use crate::error::{FundError, Result};
use crate::models::UserProfile;

pub const ADMIN_ROLE: &str = "admin";

/// PBKDF2-HMAC-SHA256 rounds for new passwords. Stored per user so it can be
/// raised later without invalidating existing hashes.
#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 100_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, password: &str, iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations.max(1), &mut key);
    key
}

// Runs over every byte regardless of where the first mismatch is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn verify_password(password: &str, salt: &str, iterations: u32, stored_hex: &str) -> bool {
    let Ok(stored) = hex::decode(stored_hex) else {
        return false;
    };
    let mut key = hash_password(salt, password, iterations);
    let ok = constant_time_eq(&key, &stored);
    key.zeroize();
    ok
}

pub fn user_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?)
}

pub fn create_user(conn: &Connection, name: &str, email: &str, password: &str) -> Result<UserProfile> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(FundError::validation("Please provide email and password"));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(FundError::validation("Name is required"));
    }
    let exists: bool = conn
        .prepare("SELECT 1 FROM users WHERE email = ?1")?
        .exists([&email])?;
    if exists {
        return Err(FundError::validation(format!("A user with email {email} already exists")));
    }

    let id = new_id();
    let salt = new_salt();
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, salt, iterations, role) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id,
            name,
            email,
            hex::encode(hash_password(&salt, password, PBKDF2_ITERATIONS)),
            salt,
            PBKDF2_ITERATIONS,
            ADMIN_ROLE
        ],
    )?;
    tracing::info!(user_id = %id, "user created");
    Ok(UserProfile {
        id,
        name: name.to_string(),
        email,
        role: ADMIN_ROLE.to_string(),
    })
}

/// Check credentials. Unknown email and wrong password fail identically.
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<UserProfile> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(FundError::validation("Please provide email and password"));
    }
    let row: Option<(UserProfile, String, String, u32)> = conn
        .query_row(
            "SELECT id, name, email, role, password_hash, salt, iterations FROM users WHERE email = ?1",
            [&email],
            |row| {
                Ok((
                    UserProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        role: row.get(3)?,
                    },
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((user, stored, salt, iterations))
            if verify_password(password, &salt, iterations, &stored) =>
        {
            tracing::info!(user_id = %user.id, "login succeeded");
            Ok(user)
        }
        _ => {
            tracing::warn!("login failed");
            Err(FundError::Auth)
        }
    }
}
