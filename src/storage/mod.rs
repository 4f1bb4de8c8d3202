/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits, their choice options
/// and their log entries.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use crate::domain::{
    ChoiceOption, EntryId, Habit, HabitId, LogEntry, NewChoiceOption, NewHabit, NewLogEntry, OptionId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Option not found: {option_id}")]
    OptionNotFound { option_id: OptionId },

    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: EntryId },

    /// A stored row does not match its declared type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// What a habit deletion removed along with the habit itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeletedHabit {
    pub options: usize,
    pub entries: usize,
}

/// Trait defining the storage interface for habits
///
/// The services only talk to storage through this trait, so tests can run
/// them against an in-memory database. Every method is one atomic unit:
/// writes spanning several tables run inside a single transaction. A service
/// operation that reads before it writes wraps both in `in_transaction`.
pub trait HabitStorage {
    /// Run `f` as one unit of work holding the write lock
    ///
    /// Everything `f` does through the handle it receives commits together
    /// when it returns `Ok` and is rolled back when it returns `Err`. Calls
    /// made while a unit is already open join that unit.
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>;

    /// Store a new habit, together with its options for a choice habit
    fn create_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError>;

    /// Get a habit by ID, including its options
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// All habits in creation order
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Persist name and kind attributes; options are left alone
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit with all its log entries and options
    fn delete_habit(&self, habit_id: HabitId) -> Result<DeletedHabit, StorageError>;

    fn create_option(&self, habit_id: HabitId, option: &NewChoiceOption) -> Result<ChoiceOption, StorageError>;

    fn get_option(&self, option_id: OptionId) -> Result<ChoiceOption, StorageError>;

    /// Options of a habit in the order they were added
    fn list_options(&self, habit_id: HabitId) -> Result<Vec<ChoiceOption>, StorageError>;

    fn update_option(&self, option: &ChoiceOption) -> Result<(), StorageError>;

    fn delete_option(&self, option_id: OptionId) -> Result<(), StorageError>;

    /// Number of log entries that picked this option
    fn count_entries_for_option(&self, option_id: OptionId) -> Result<usize, StorageError>;

    /// Store a new log entry; its type is the one stated in `entry`
    fn create_entry(&self, habit_id: HabitId, entry: &NewLogEntry) -> Result<LogEntry, StorageError>;

    fn get_entry(&self, entry_id: EntryId) -> Result<LogEntry, StorageError>;

    /// Entries of a habit in creation order
    fn list_entries_for_habit(&self, habit_id: HabitId) -> Result<Vec<LogEntry>, StorageError>;

    /// Persist timestamp and kind attributes of an entry
    fn update_entry(&self, entry: &LogEntry) -> Result<(), StorageError>;

    fn delete_entry(&self, entry_id: EntryId) -> Result<(), StorageError>;
}
