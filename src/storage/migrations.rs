/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// Every habit and log entry has a base row plus one row in the sub-table of
/// its kind.

use rusqlite::{Connection, OptionalExtension};
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current_version, CURRENT_VERSION
        )));
    }

    if current_version < CURRENT_VERSION {
        let tx = conn.unchecked_transaction()?;
        run_migrations(&tx, current_version)?;
        set_version(&tx, CURRENT_VERSION)?;
        tx.commit()?;
    }

    Ok(())
}

/// Get the current database schema version, 0 for a fresh database
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get::<_, i32>(0))
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration to version 1: habits, options and log entries
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            habit_type TEXT NOT NULL CHECK (habit_type IN ('completion', 'measurable', 'choice'))
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_habits (
            habit_id INTEGER PRIMARY KEY,
            completion_target INTEGER NOT NULL,
            target_timeframe TEXT NOT NULL,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS measurable_habits (
            habit_id INTEGER PRIMARY KEY,
            target INTEGER NOT NULL,
            unit TEXT NOT NULL,
            period TEXT,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS choice_options (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id INTEGER NOT NULL,
            option_text TEXT NOT NULL,
            color TEXT,
            icon TEXT,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS habit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id INTEGER NOT NULL,
            recorded_at TEXT NOT NULL,
            habit_type TEXT NOT NULL CHECK (habit_type IN ('completion', 'measurable', 'choice')),
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_logs (
            log_id INTEGER PRIMARY KEY,
            status BOOLEAN NOT NULL,
            FOREIGN KEY (log_id) REFERENCES habit_logs (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS measurable_logs (
            log_id INTEGER PRIMARY KEY,
            value INTEGER NOT NULL,
            FOREIGN KEY (log_id) REFERENCES habit_logs (id) ON DELETE CASCADE
        )",
        [],
    )?;

    // No cascade on option_id: an option still picked by an entry can't be deleted
    conn.execute(
        "CREATE TABLE IF NOT EXISTS choice_logs (
            log_id INTEGER PRIMARY KEY,
            option_id INTEGER NOT NULL,
            FOREIGN KEY (log_id) REFERENCES habit_logs (id) ON DELETE CASCADE,
            FOREIGN KEY (option_id) REFERENCES choice_options (id)
        )",
        [],
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Options and entries are always listed per habit
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_choice_options_habit
         ON choice_options (habit_id, id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_logs_habit
         ON habit_logs (habit_id, id)",
        [],
    )?;

    // Reference checks before deleting an option
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_choice_logs_option
         ON choice_logs (option_id)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}
