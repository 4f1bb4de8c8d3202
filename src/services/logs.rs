/// Log service
///
/// Record, read, update and delete log entries. An entry always has the type
/// of its habit, and a choice entry always picks an option of its own habit.

use serde_json::{Map, Value};

use crate::domain::{EntryId, HabitId, LogEntry, NewLogKind};
use crate::services::ServiceError;
use crate::storage::HabitStorage;
use crate::validation;

/// Record a log entry for a habit
///
/// The caller states the entry's `type`, which must equal the habit's type.
/// For a choice entry the option must exist and belong to the habit.
pub fn create_entry<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    input: &Map<String, Value>,
) -> Result<LogEntry, ServiceError> {
    let entry = storage.in_transaction(|storage| record_entry(storage, habit_id, input))?;

    tracing::info!("Logged {} entry {} for habit {}", entry.habit_type(), entry.id, habit_id);
    Ok(entry)
}

/// Checks and insert of `create_entry`; the caller holds the transaction
fn record_entry<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    input: &Map<String, Value>,
) -> Result<LogEntry, ServiceError> {
    let habit = storage.get_habit(habit_id)?;
    let new_entry = validation::new_log_entry(input)?;

    if new_entry.habit_type() != habit.habit_type() {
        tracing::warn!(
            "Rejected {} log entry for {} habit {}",
            new_entry.habit_type(),
            habit.habit_type(),
            habit_id
        );
        return Err(ServiceError::LogTypeMismatch);
    }

    if let NewLogKind::Choice { option_id } = new_entry.kind {
        let option = storage.get_option(option_id)?;
        if option.habit_id != habit_id {
            tracing::warn!("Option {} belongs to habit {}, not {}", option_id, option.habit_id, habit_id);
            return Err(ServiceError::ForeignOption { habit_id, option_id });
        }
    }

    Ok(storage.create_entry(habit_id, &new_entry)?)
}

pub fn get_entry<S: HabitStorage>(storage: &S, entry_id: EntryId) -> Result<LogEntry, ServiceError> {
    Ok(storage.get_entry(entry_id)?)
}

/// Entries of an existing habit in creation order
pub fn list_entries<S: HabitStorage>(storage: &S, habit_id: HabitId) -> Result<Vec<LogEntry>, ServiceError> {
    storage.get_habit(habit_id)?;
    Ok(storage.list_entries_for_habit(habit_id)?)
}

/// Apply a partial update to a log entry
///
/// `type`, when present, must equal the entry's type. A choice entry's
/// option can't be changed.
pub fn update_entry<S: HabitStorage>(
    storage: &S,
    entry_id: EntryId,
    input: &Map<String, Value>,
) -> Result<LogEntry, ServiceError> {
    let entry = storage.in_transaction(|storage| -> Result<_, ServiceError> {
        let mut entry = storage.get_entry(entry_id)?;

        if let Some(requested) = validation::discriminator(input, "log entry")? {
            if requested != entry.habit_type() {
                return Err(ServiceError::LogTypeMismatch);
            }
        }

        let patch = validation::log_entry_patch(input, entry.habit_type())?;
        entry.apply(patch)?;
        storage.update_entry(&entry)?;

        Ok(entry)
    })?;

    tracing::info!("Updated log entry {}", entry.id);
    Ok(entry)
}

pub fn delete_entry<S: HabitStorage>(storage: &S, entry_id: EntryId) -> Result<(), ServiceError> {
    storage.delete_entry(entry_id)?;

    tracing::info!("Deleted log entry {}", entry_id);
    Ok(())
}
