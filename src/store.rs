use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

// Both tables are single-row: there is exactly one pending login session and
// one stored bearer token at a time.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS login_session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    verifier TEXT NOT NULL,
    state TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    access_token TEXT NOT NULL,
    saved_at INTEGER NOT NULL
);
";

pub fn open_or_create(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    Ok(conn)
}

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Persist the PKCE verifier/state pair created at login initiation.
/// Overwrites any previous, unconsumed session.
pub fn save_login_session(conn: &Connection, verifier: &str, state: &str) -> rusqlite::Result<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT INTO login_session (id, verifier, state, created_at) VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET verifier = excluded.verifier, state = excluded.state, created_at = excluded.created_at",
        params![verifier, state, now],
    )?;
    Ok(())
}

pub fn load_login_session(conn: &Connection) -> rusqlite::Result<Option<(String, String)>> {
    let mut stmt = conn.prepare("SELECT verifier, state FROM login_session WHERE id = 1")?;
    stmt.query_row([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
        .optional()
}

pub fn clear_login_session(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM login_session", [])?;
    Ok(())
}

/// Persist the bearer token. The token is opaque; no expiry is tracked.
pub fn save_access_token(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT INTO credentials (id, access_token, saved_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET access_token = excluded.access_token, saved_at = excluded.saved_at",
        params![token, now],
    )?;
    Ok(())
}

pub fn load_access_token(conn: &Connection) -> rusqlite::Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT access_token FROM credentials WHERE id = 1")?;
    stmt.query_row([], |r| r.get::<_, String>(0)).optional()
}

pub fn clear_access_token(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM credentials", [])?;
    Ok(())
}
