/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use crate::domain::{
    ChoiceOption, EntryId, Habit, HabitId, HabitKind, HabitType, LogEntry, LogKind, NewChoiceOption,
    NewHabit, NewHabitKind, NewLogEntry, NewLogKind, OptionId, Timeframe,
};
use crate::storage::{migrations, DeletedHabit, HabitStorage, StorageError};

const HABIT_SELECT: &str = "SELECT h.id, h.name, h.habit_type,
        c.completion_target, c.target_timeframe,
        m.target, m.unit, m.period
    FROM habits h
    LEFT JOIN completion_habits c ON c.habit_id = h.id
    LEFT JOIN measurable_habits m ON m.habit_id = h.id";

const OPTION_SELECT: &str = "SELECT id, habit_id, option_text, color, icon FROM choice_options";

/// How long a write waits for another connection to release the database
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const ENTRY_SELECT: &str = "SELECT l.id, l.habit_id, l.recorded_at, l.habit_type,
        c.status, m.value,
        o.id, o.habit_id, o.option_text, o.color, o.icon
    FROM habit_logs l
    LEFT JOIN completion_logs c ON c.log_id = l.id
    LEFT JOIN measurable_logs m ON m.log_id = l.id
    LEFT JOIN choice_logs ch ON ch.log_id = l.id
    LEFT JOIN choice_options o ON o.id = ch.option_id";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Storage backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized in memory");
        Ok(storage)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Cascades and the option reference check rely on this
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Change how long writes wait for a lock held by another connection
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<(), StorageError> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Insert a habit with its attribute row or options; the caller owns the transaction
    fn insert_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError> {
        let conn = &self.conn;

        conn.execute(
            "INSERT INTO habits (name, habit_type) VALUES (?1, ?2)",
            params![habit.name, habit.habit_type()],
        )?;
        let habit_id = HabitId(conn.last_insert_rowid());

        let mut options = Vec::new();
        match &habit.kind {
            NewHabitKind::Completion { completion_target, target_timeframe } => {
                conn.execute(
                    "INSERT INTO completion_habits (habit_id, completion_target, target_timeframe)
                     VALUES (?1, ?2, ?3)",
                    params![habit_id, completion_target, target_timeframe],
                )?;
            }
            NewHabitKind::Measurable { target, unit, period } => {
                conn.execute(
                    "INSERT INTO measurable_habits (habit_id, target, unit, period) VALUES (?1, ?2, ?3, ?4)",
                    params![habit_id, target, unit, period],
                )?;
            }
            NewHabitKind::Choice { options: new_options } => {
                for option in new_options {
                    options.push(insert_option(conn, habit_id, option)?);
                }
            }
        }

        tracing::debug!("Created {} habit: {} ({})", habit.habit_type(), habit.name, habit_id);
        Ok(Habit::from_new(habit_id, habit.clone(), options))
    }
}

/// Insert one option row; `conn` may be an open transaction
fn insert_option(conn: &Connection, habit_id: HabitId, option: &NewChoiceOption) -> Result<ChoiceOption, StorageError> {
    conn.execute(
        "INSERT INTO choice_options (habit_id, option_text, color, icon) VALUES (?1, ?2, ?3, ?4)",
        params![habit_id, option.option_text, option.color, option.icon],
    )?;

    let option_id = OptionId(conn.last_insert_rowid());
    Ok(ChoiceOption::from_new(option_id, habit_id, option.clone()))
}

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<ChoiceOption> {
    Ok(ChoiceOption {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        option_text: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

/// A habit row joined with both attribute tables
struct HabitRow {
    id: HabitId,
    name: String,
    habit_type: HabitType,
    completion_target: Option<i64>,
    target_timeframe: Option<Timeframe>,
    target: Option<i64>,
    unit: Option<String>,
    period: Option<Timeframe>,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            habit_type: row.get(2)?,
            completion_target: row.get(3)?,
            target_timeframe: row.get(4)?,
            target: row.get(5)?,
            unit: row.get(6)?,
            period: row.get(7)?,
        })
    }

    /// Assemble the habit; `options` are only used for choice habits
    fn into_habit(self, options: Vec<ChoiceOption>) -> Result<Habit, StorageError> {
        let id = self.id;
        let missing = || StorageError::Corrupt(format!("{} habit {} has no attribute row", self.habit_type, id));

        let kind = match self.habit_type {
            HabitType::Completion => match (self.completion_target, self.target_timeframe) {
                (Some(completion_target), Some(target_timeframe)) => {
                    HabitKind::Completion { completion_target, target_timeframe }
                }
                _ => return Err(missing()),
            },
            HabitType::Measurable => match (self.target, self.unit.clone()) {
                (Some(target), Some(unit)) => HabitKind::Measurable { target, unit, period: self.period },
                _ => return Err(missing()),
            },
            HabitType::Choice => HabitKind::Choice { options },
        };

        Ok(Habit { id, name: self.name, kind })
    }
}

/// A log entry row joined with the attribute tables and the picked option
struct EntryRow {
    id: EntryId,
    habit_id: HabitId,
    recorded_at: NaiveDateTime,
    habit_type: HabitType,
    status: Option<bool>,
    value: Option<i64>,
    option: Option<ChoiceOption>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let option_id: Option<OptionId> = row.get(6)?;
        let option = match option_id {
            Some(id) => Some(ChoiceOption {
                id,
                habit_id: row.get(7)?,
                option_text: row.get(8)?,
                color: row.get(9)?,
                icon: row.get(10)?,
            }),
            None => None,
        };

        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            recorded_at: row.get(2)?,
            habit_type: row.get(3)?,
            status: row.get(4)?,
            value: row.get(5)?,
            option,
        })
    }

    fn into_entry(self) -> Result<LogEntry, StorageError> {
        let kind = match (self.habit_type, self.status, self.value, self.option) {
            (HabitType::Completion, Some(status), _, _) => LogKind::Completion { status },
            (HabitType::Measurable, _, Some(value), _) => LogKind::Measurable { value },
            (HabitType::Choice, _, _, Some(option)) => LogKind::Choice { option_id: option.id, option },
            (habit_type, ..) => {
                return Err(StorageError::Corrupt(format!(
                    "{} entry {} has no attribute row",
                    habit_type, self.id
                )))
            }
        };

        Ok(LogEntry {
            id: self.id,
            habit_id: self.habit_id,
            recorded_at: self.recorded_at,
            kind,
        })
    }
}

impl HabitStorage for SqliteStorage {
    /// Opens an immediate transaction, so the write lock is taken before the
    /// first read and a concurrent writer waits for the whole unit
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>,
    {
        if !self.conn.is_autocommit() {
            return f(self);
        }

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate).map_err(StorageError::from)?;
        let value = f(self)?;
        tx.commit().map_err(StorageError::from)?;

        Ok(value)
    }

    /// Insert the habit, its attribute row and any options in one transaction
    fn create_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError> {
        self.in_transaction(|storage| storage.insert_habit(habit))
    }


    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError> {
        let row = self
            .conn
            .query_row(&format!("{} WHERE h.id = ?1", HABIT_SELECT), params![habit_id], HabitRow::from_row)
            .optional()?
            .ok_or(StorageError::HabitNotFound { habit_id })?;

        let options = match row.habit_type {
            HabitType::Choice => self.list_options(habit_id)?,
            _ => Vec::new(),
        };

        row.into_habit(options)
    }

    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY h.id", HABIT_SELECT))?;
        let rows = stmt
            .query_map([], HabitRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut habits = Vec::with_capacity(rows.len());
        for row in rows {
            let options = match row.habit_type {
                HabitType::Choice => self.list_options(row.id)?,
                _ => Vec::new(),
            };
            habits.push(row.into_habit(options)?);
        }

        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.in_transaction(|storage| -> Result<_, StorageError> {
            let conn = &storage.conn;

            let rows_affected = conn.execute(
                "UPDATE habits SET name = ?2 WHERE id = ?1",
                params![habit.id, habit.name],
            )?;
            if rows_affected == 0 {
                return Err(StorageError::HabitNotFound { habit_id: habit.id });
            }

            match &habit.kind {
                HabitKind::Completion { completion_target, target_timeframe } => {
                    conn.execute(
                        "UPDATE completion_habits SET completion_target = ?2, target_timeframe = ?3
                         WHERE habit_id = ?1",
                        params![habit.id, completion_target, target_timeframe],
                    )?;
                }
                HabitKind::Measurable { target, unit, period } => {
                    conn.execute(
                        "UPDATE measurable_habits SET target = ?2, unit = ?3, period = ?4 WHERE habit_id = ?1",
                        params![habit.id, target, unit, period],
                    )?;
                }
                HabitKind::Choice { .. } => {}
            }

            Ok(())
        })?;

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Delete entries, then options, then the habit in one transaction
    fn delete_habit(&self, habit_id: HabitId) -> Result<DeletedHabit, StorageError> {
        let (entries, options) = self.in_transaction(|storage| -> Result<_, StorageError> {
            let conn = &storage.conn;

            let entries = conn.execute("DELETE FROM habit_logs WHERE habit_id = ?1", params![habit_id])?;
            let options = conn.execute("DELETE FROM choice_options WHERE habit_id = ?1", params![habit_id])?;
            let rows_affected = conn.execute("DELETE FROM habits WHERE id = ?1", params![habit_id])?;
            if rows_affected == 0 {
                // Returning an error rolls the deletes back
                return Err(StorageError::HabitNotFound { habit_id });
            }

            Ok((entries, options))
        })?;

        tracing::debug!(
            "Deleted habit {} with {} options and {} entries",
            habit_id,
            options,
            entries
        );
        Ok(DeletedHabit { options, entries })
    }

    fn create_option(&self, habit_id: HabitId, option: &NewChoiceOption) -> Result<ChoiceOption, StorageError> {
        let created = insert_option(&self.conn, habit_id, option)?;
        tracing::debug!("Created option {} for habit {}", created.id, habit_id);
        Ok(created)
    }

    fn get_option(&self, option_id: OptionId) -> Result<ChoiceOption, StorageError> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", OPTION_SELECT), params![option_id], option_from_row)
            .optional()?
            .ok_or(StorageError::OptionNotFound { option_id })
    }

    fn list_options(&self, habit_id: HabitId) -> Result<Vec<ChoiceOption>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE habit_id = ?1 ORDER BY id", OPTION_SELECT))?;
        let options = stmt
            .query_map(params![habit_id], option_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(options)
    }

    fn update_option(&self, option: &ChoiceOption) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE choice_options SET option_text = ?2, color = ?3, icon = ?4 WHERE id = ?1",
            params![option.id, option.option_text, option.color, option.icon],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::OptionNotFound { option_id: option.id });
        }

        tracing::debug!("Updated option: {} ({})", option.option_text, option.id);
        Ok(())
    }

    fn delete_option(&self, option_id: OptionId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM choice_options WHERE id = ?1", params![option_id])?;

        if rows_affected == 0 {
            return Err(StorageError::OptionNotFound { option_id });
        }

        tracing::debug!("Deleted option: {}", option_id);
        Ok(())
    }

    fn count_entries_for_option(&self, option_id: OptionId) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM choice_logs WHERE option_id = ?1",
            params![option_id],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as usize)
    }

    fn create_entry(&self, habit_id: HabitId, entry: &NewLogEntry) -> Result<LogEntry, StorageError> {
        let entry_id = self.in_transaction(|storage| -> Result<_, StorageError> {
            let conn = &storage.conn;

            conn.execute(
                "INSERT INTO habit_logs (habit_id, recorded_at, habit_type) VALUES (?1, ?2, ?3)",
                params![habit_id, entry.recorded_at, entry.habit_type()],
            )?;
            let entry_id = EntryId(conn.last_insert_rowid());

            match entry.kind {
                NewLogKind::Completion { status } => {
                    conn.execute(
                        "INSERT INTO completion_logs (log_id, status) VALUES (?1, ?2)",
                        params![entry_id, status],
                    )?;
                }
                NewLogKind::Measurable { value } => {
                    conn.execute(
                        "INSERT INTO measurable_logs (log_id, value) VALUES (?1, ?2)",
                        params![entry_id, value],
                    )?;
                }
                NewLogKind::Choice { option_id } => {
                    conn.execute(
                        "INSERT INTO choice_logs (log_id, option_id) VALUES (?1, ?2)",
                        params![entry_id, option_id],
                    )?;
                }
            }

            Ok(entry_id)
        })?;

        tracing::debug!("Created log entry: {} for habit {}", entry_id, habit_id);
        self.get_entry(entry_id)
    }

    fn get_entry(&self, entry_id: EntryId) -> Result<LogEntry, StorageError> {
        self.conn
            .query_row(&format!("{} WHERE l.id = ?1", ENTRY_SELECT), params![entry_id], EntryRow::from_row)
            .optional()?
            .ok_or(StorageError::EntryNotFound { entry_id })?
            .into_entry()
    }

    fn list_entries_for_habit(&self, habit_id: HabitId) -> Result<Vec<LogEntry>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE l.habit_id = ?1 ORDER BY l.id", ENTRY_SELECT))?;
        let rows = stmt
            .query_map(params![habit_id], EntryRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    fn update_entry(&self, entry: &LogEntry) -> Result<(), StorageError> {
        self.in_transaction(|storage| -> Result<_, StorageError> {
            let conn = &storage.conn;

            let rows_affected = conn.execute(
                "UPDATE habit_logs SET recorded_at = ?2 WHERE id = ?1",
                params![entry.id, entry.recorded_at],
            )?;
            if rows_affected == 0 {
                return Err(StorageError::EntryNotFound { entry_id: entry.id });
            }

            match &entry.kind {
                LogKind::Completion { status } => {
                    conn.execute(
                        "UPDATE completion_logs SET status = ?2 WHERE log_id = ?1",
                        params![entry.id, status],
                    )?;
                }
                LogKind::Measurable { value } => {
                    conn.execute(
                        "UPDATE measurable_logs SET value = ?2 WHERE log_id = ?1",
                        params![entry.id, value],
                    )?;
                }
                // The picked option never changes
                LogKind::Choice { .. } => {}
            }

            Ok(())
        })?;

        tracing::debug!("Updated log entry: {}", entry.id);
        Ok(())
    }

    fn delete_entry(&self, entry_id: EntryId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM habit_logs WHERE id = ?1", params![entry_id])?;

        if rows_affected == 0 {
            return Err(StorageError::EntryNotFound { entry_id });
        }

        tracing::debug!("Deleted log entry: {}", entry_id);
        Ok(())
    }
}

impl ToSql for HabitId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for HabitId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(HabitId)
    }
}

impl ToSql for OptionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for OptionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(OptionId)
    }
}

impl ToSql for EntryId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for EntryId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(EntryId)
    }
}

impl ToSql for HabitType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for HabitType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for Timeframe {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Timeframe {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
