/// Option service
///
/// Options only exist under choice habits. Every operation names the habit
/// and the option, and an option of another habit is treated as missing.

use serde_json::{Map, Value};

use crate::domain::{ChoiceOption, Habit, HabitId, OptionId};
use crate::services::ServiceError;
use crate::storage::{HabitStorage, StorageError};
use crate::validation;

/// Load a habit and make sure it is a choice habit
fn choice_habit<S: HabitStorage>(storage: &S, habit_id: HabitId) -> Result<Habit, ServiceError> {
    let habit = storage.get_habit(habit_id)?;
    if !habit.is_choice() {
        return Err(ServiceError::NotChoiceHabit { habit_id });
    }
    Ok(habit)
}

fn owned_option<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    option_id: OptionId,
) -> Result<ChoiceOption, ServiceError> {
    match storage.get_option(option_id) {
        Ok(option) if option.habit_id == habit_id => Ok(option),
        Ok(_) | Err(StorageError::OptionNotFound { .. }) => {
            Err(ServiceError::OptionNotOwned { habit_id, option_id })
        }
        Err(other) => Err(other.into()),
    }
}

/// Append an option to a choice habit
pub fn add_option<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    input: &Map<String, Value>,
) -> Result<ChoiceOption, ServiceError> {
    let option = storage.in_transaction(|storage| -> Result<_, ServiceError> {
        choice_habit(storage, habit_id)?;
        let new_option = validation::new_option(input)?;
        Ok(storage.create_option(habit_id, &new_option)?)
    })?;

    tracing::info!("Added option {} ({}) to habit {}", option.option_text, option.id, habit_id);
    Ok(option)
}

pub fn update_option<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    option_id: OptionId,
    input: &Map<String, Value>,
) -> Result<ChoiceOption, ServiceError> {
    let option = storage.in_transaction(|storage| -> Result<_, ServiceError> {
        choice_habit(storage, habit_id)?;
        let mut option = owned_option(storage, habit_id, option_id)?;

        let patch = validation::option_patch(input)?;
        option.apply(patch);
        storage.update_option(&option)?;

        Ok(option)
    })?;

    tracing::info!("Updated option {} of habit {}", option_id, habit_id);
    Ok(option)
}

/// Remove an option that no log entry has picked
///
/// The reference count and the delete share one transaction, so an entry
/// logged in between can't leave a dangling reference.
pub fn delete_option<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    option_id: OptionId,
) -> Result<(), ServiceError> {
    storage.in_transaction(|storage| -> Result<_, ServiceError> {
        choice_habit(storage, habit_id)?;
        owned_option(storage, habit_id, option_id)?;

        let entries = storage.count_entries_for_option(option_id)?;
        if entries > 0 {
            tracing::warn!("Refused to delete option {}: picked by {} log entries", option_id, entries);
            return Err(ServiceError::OptionInUse { option_id, entries });
        }

        storage.delete_option(option_id)?;
        Ok(())
    })?;

    tracing::info!("Deleted option {} of habit {}", option_id, habit_id);
    Ok(())
}

/// Options of a choice habit in the order they were added
pub fn list_options<S: HabitStorage>(storage: &S, habit_id: HabitId) -> Result<Vec<ChoiceOption>, ServiceError> {
    let habit = choice_habit(storage, habit_id)?;
    Ok(habit.options().to_vec())
}
