//! Explicit login session, persisted next to the database.
//!
//! `login` writes the token to `session.json` and its SHA-256 hash to the
//! `sessions` table. Commands that read or write records call [`verify`] first
//! and receive the [`Session`] they run under; a session file whose token is
//! not registered for that user is treated as no session at all.

use std::path::{Path, PathBuf};

use rand::RngCore;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{FundError, Result};
use crate::models::UserProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub issued_at: String,
}

impl Session {
    pub fn issue(user: UserProfile) -> Self {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            token: hex::encode(bytes),
            user,
            issued_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

pub fn save(data_dir: &Path, session: &Session) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| FundError::Settings(e.to_string()))?;
    std::fs::write(session_path(data_dir), format!("{json}\n"))?;
    Ok(())
}

pub fn load(data_dir: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(session_path(data_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// The session file's contents, or `SessionRequired` when there is none.
/// This does not check the token; use [`verify`] for that.
pub fn require(data_dir: &Path) -> Result<Session> {
    load(data_dir)
        .filter(|s| !s.token.is_empty())
        .ok_or(FundError::SessionRequired)
}

fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Record a freshly issued session so [`verify`] accepts it.
pub fn register(conn: &Connection, session: &Session) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, issued_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![token_hash(&session.token), session.user.id, session.issued_at],
    )?;
    tracing::info!(user_id = %session.user.id, "session started");
    Ok(())
}

/// The active session, checked against the database: the token must be
/// registered for the same user, and that user must still exist.
pub fn verify(conn: &Connection, data_dir: &Path) -> Result<Session> {
    let session = require(data_dir)?;
    let known = conn
        .prepare(
            "SELECT 1 FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.token_hash = ?1 AND s.user_id = ?2",
        )?
        .exists(rusqlite::params![token_hash(&session.token), session.user.id])?;
    if !known {
        tracing::warn!("session file does not match a registered session");
        return Err(FundError::SessionRequired);
    }
    Ok(session)
}

/// Forget `session` in the database. Returns whether it was registered.
pub fn revoke(conn: &Connection, session: &Session) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        [token_hash(&session.token)],
    )?;
    Ok(removed > 0)
}

/// Remove the session file. Returns whether one existed.
pub fn clear(data_dir: &Path) -> Result<bool> {
    let path = session_path(data_dir);
    if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
