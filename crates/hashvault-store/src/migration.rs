//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system. Each migration transforms the
//! schema from version N to N+1.

use rusqlite::Connection;

use hashvault_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent.
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
        }

        tx.commit()?;
        tracing::info!(from = current, to = CURRENT_VERSION, "schema migrated");
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
        -- Submission ledger: one row per committed record, in anchor order
        CREATE TABLE submissions (
            seq INTEGER PRIMARY KEY,             -- 1-based ledger position
            submission_id TEXT NOT NULL UNIQUE,  -- HV-<hex>
            owner TEXT NOT NULL,                 -- submitting team
            filename TEXT NOT NULL,
            content_type TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            file_hash TEXT NOT NULL,             -- 64 lowercase hex
            created_at INTEGER NOT NULL,         -- Unix ms
            submitted_by TEXT,                   -- authenticated username
            anchored_at INTEGER NOT NULL,        -- Unix ms
            prev_anchor_hash TEXT,               -- NULL for seq = 1
            anchor_hash TEXT NOT NULL UNIQUE
        );

        CREATE TRIGGER submissions_no_update BEFORE UPDATE ON submissions
        BEGIN
            SELECT RAISE(ABORT, 'submissions are append-only');
        END;

        CREATE TRIGGER submissions_no_delete BEFORE DELETE ON submissions
        BEGIN
            SELECT RAISE(ABORT, 'submissions are append-only');
        END;

        -- User accounts
        CREATE TABLE accounts (
            username TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,          -- lowercased
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,                  -- operator | admin
            created_at INTEGER NOT NULL
        );

        CREATE INDEX idx_submissions_owner ON submissions(owner);
        CREATE INDEX idx_submissions_created ON submissions(created_at);
        "#,
    )?;

    Ok(())
}
