use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{Result, VerbaError};
use crate::models::User;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    user_id INTEGER NOT NULL REFERENCES users(id)
);
";

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Create tables and seed the default admin account when the user table is
/// empty. The seeded password is meant to be changed on first login.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM users", [], |row| row.get(0))?;
    if count == 0 {
        conn.execute(
            "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, 'admin')",
            rusqlite::params!["Administrador", "admin@verba.local", hash_password("admin")],
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// User repository
// ---------------------------------------------------------------------------

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at, id",
    )?;
    let users: Vec<User> = stmt
        .query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn get_user(conn: &Connection, email: &str) -> Result<User> {
    conn.query_row(
        "SELECT id, name, email, role, created_at FROM users WHERE email = ?1",
        [email],
        |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .map_err(|_| VerbaError::UnknownUser(email.to_string()))
}

/// Insert or update by email.
pub fn save_user(conn: &Connection, name: &str, email: &str, password: &str, role: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (name, email, password_hash, role) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(email) DO UPDATE SET name = ?1, password_hash = ?3, role = ?4",
        rusqlite::params![name, email, hash_password(password), role],
    )?;
    Ok(())
}

pub fn delete_user(conn: &Connection, email: &str) -> Result<()> {
    let user = get_user(conn, email)?;
    conn.execute("DELETE FROM session WHERE user_id = ?1", [user.id])?;
    let deleted = conn.execute("DELETE FROM users WHERE email = ?1", [email])?;
    if deleted == 0 {
        return Err(VerbaError::UnknownUser(email.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session accessor
// ---------------------------------------------------------------------------

pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE email = ?1",
            [email],
            |row| row.get(0),
        )
        .map_err(|_| VerbaError::UnknownUser(email.to_string()))?;
    if stored != hash_password(password) {
        return Err(VerbaError::Other("Senha incorreta".to_string()));
    }
    get_user(conn, email)
}

pub fn set_session(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO session (id, user_id) VALUES (1, ?1) \
         ON CONFLICT(id) DO UPDATE SET user_id = ?1",
        [user_id],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection) -> Result<Option<User>> {
    let user_id: Option<i64> = conn
        .query_row("SELECT user_id FROM session WHERE id = 1", [], |row| row.get(0))
        .map(Some)
        .unwrap_or(None);
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(
        "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
    )?;
    let user = stmt
        .query_row([user_id], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .map(Some)
        .unwrap_or(None);
    Ok(user)
}

pub fn clear_session(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM session", [])?;
    Ok(())
}
