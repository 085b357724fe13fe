//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use ama_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Sessions: one row per AMA, four fixed-role token columns
        CREATE TABLE sessions (
            session_id BLOB PRIMARY KEY,      -- 16 bytes
            title TEXT NOT NULL,
            description TEXT,
            published INTEGER NOT NULL DEFAULT 0,  -- 0=draft, 1=published
            host_token TEXT NOT NULL UNIQUE,
            ask_token TEXT NOT NULL UNIQUE,
            answer_token TEXT NOT NULL UNIQUE,
            digest_token TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL       -- Unix ms
        );

        -- Questions belong to exactly one session
        CREATE TABLE questions (
            question_id BLOB PRIMARY KEY,     -- 16 bytes
            session_id BLOB NOT NULL REFERENCES sessions(session_id),
            text TEXT NOT NULL,
            vote_count INTEGER NOT NULL DEFAULT 0,
            hidden INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        -- Vote ledger: at most one row per (question, voter)
        CREATE TABLE question_voters (
            question_id BLOB NOT NULL REFERENCES questions(question_id),
            voter_id TEXT NOT NULL,
            voted_at INTEGER NOT NULL,
            PRIMARY KEY (question_id, voter_id)
        );

        -- Answers: at most one per question
        CREATE TABLE answers (
            answer_id BLOB PRIMARY KEY,       -- 16 bytes
            question_id BLOB NOT NULL UNIQUE REFERENCES questions(question_id),
            core TEXT NOT NULL,
            steps TEXT NOT NULL,
            limits TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX idx_questions_session ON questions(session_id, vote_count DESC, created_at);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"sessions".to_string()));
        assert!(tables.contains(&"questions".to_string()));
        assert!(tables.contains(&"question_voters".to_string()));
        assert!(tables.contains(&"answers".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }
}
