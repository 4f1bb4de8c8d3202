/// Habit service
///
/// Create, read, update and delete habits. A habit's type is fixed at
/// creation; updates only touch the fields they mention.

use serde_json::{Map, Value};

use crate::domain::{Habit, HabitId};
use crate::services::ServiceError;
use crate::storage::{DeletedHabit, HabitStorage};
use crate::validation;

/// Key of the option list on choice habit input
const OPTIONS_FIELD: &str = "options";

/// Create a habit from raw input
///
/// A choice habit is stored together with its options; if any option is
/// invalid nothing is stored.
pub fn create_habit<S: HabitStorage>(storage: &S, input: &Map<String, Value>) -> Result<Habit, ServiceError> {
    let new_habit = validation::new_habit(input)?;
    let habit = storage.create_habit(&new_habit)?;

    tracing::info!(
        "Created {} habit: {} ({}) with {} options",
        habit.habit_type(),
        habit.name,
        habit.id,
        habit.options().len()
    );
    Ok(habit)
}

pub fn get_habit<S: HabitStorage>(storage: &S, habit_id: HabitId) -> Result<Habit, ServiceError> {
    Ok(storage.get_habit(habit_id)?)
}

/// All habits in creation order
pub fn list_habits<S: HabitStorage>(storage: &S) -> Result<Vec<Habit>, ServiceError> {
    Ok(storage.list_habits()?)
}

/// Apply a partial update to a habit
///
/// Checks run in order: the habit must exist, `type` (if given) must match
/// the stored type, `options` must be absent, then the remaining fields are
/// validated against the stored type. The read and the write happen in one
/// transaction, so a concurrent update can't be overwritten.
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    input: &Map<String, Value>,
) -> Result<Habit, ServiceError> {
    let habit = storage.in_transaction(|storage| patch_habit(storage, habit_id, input))?;

    tracing::info!("Updated habit: {} ({})", habit.name, habit.id);
    Ok(habit)
}

fn patch_habit<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    input: &Map<String, Value>,
) -> Result<Habit, ServiceError> {
    let mut habit = storage.get_habit(habit_id)?;

    if let Some(requested) = validation::discriminator(input, "habit")? {
        if requested != habit.habit_type() {
            tracing::warn!(
                "Rejected type change of habit {} from {} to {}",
                habit_id,
                habit.habit_type(),
                requested
            );
            return Err(ServiceError::HabitTypeChange);
        }
    }

    if input.contains_key(OPTIONS_FIELD) {
        return Err(ServiceError::OptionsNotPatchable);
    }

    let patch = validation::habit_patch(input, habit.habit_type())?;
    habit.apply(patch)?;
    storage.update_habit(&habit)?;

    Ok(habit)
}

/// Delete a habit together with its options and log entries
pub fn delete_habit<S: HabitStorage>(storage: &S, habit_id: HabitId) -> Result<DeletedHabit, ServiceError> {
    let deleted = storage.delete_habit(habit_id)?;

    tracing::info!(
        "Deleted habit {} along with {} options and {} log entries",
        habit_id,
        deleted.options,
        deleted.entries
    );
    Ok(deleted)
}
