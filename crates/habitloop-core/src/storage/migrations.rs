//! Database schema migrations for habitloop.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

use crate::habit::{DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    Ok(conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: habits, categories and the completion log.
///
/// `completions` has one row per habit per day; the composite primary key
/// enforces that. `habits.category` must name an existing category; renames
/// go through `HabitDb::rename_category`, which re-points habits itself.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(indoc::indoc! {"
        CREATE TABLE IF NOT EXISTS categories (
            name        TEXT PRIMARY KEY,
            color       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            reminder_time   TEXT,
            category        TEXT NOT NULL
                REFERENCES categories(name),
            weekly_target   INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS completions (
            habit_id    TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            log_date    TEXT NOT NULL,
            PRIMARY KEY (habit_id, log_date)
        );

        CREATE INDEX IF NOT EXISTS idx_habits_category ON habits(category);
        CREATE INDEX IF NOT EXISTS idx_completions_log_date ON completions(log_date);
    "})?;

    tx.execute(
        "INSERT OR IGNORE INTO categories (name, color) VALUES (?1, ?2)",
        params![DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR],
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: key/value table for small pieces of application state.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
