/// Wire records for habits, options and log entries
///
/// Records are the serde form of the domain types: a habit is `id`, `name`,
/// `habit_type` plus the fields of its kind, and a choice log entry embeds the
/// option it picked.

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::{EntryId, HabitId, OptionId};
use crate::storage::DeletedHabit;

pub fn record<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value)
}

pub fn records<T: Serialize>(values: &[T]) -> Result<Value, serde_json::Error> {
    values.iter().map(record).collect::<Result<Vec<_>, _>>().map(Value::Array)
}

pub fn habit_deleted(habit_id: HabitId, deleted: DeletedHabit) -> Value {
    json!({
        "message": "Habit deleted",
        "id": habit_id,
        "deleted_options": deleted.options,
        "deleted_entries": deleted.entries,
    })
}

pub fn option_deleted(option_id: OptionId) -> Value {
    json!({"message": "Option deleted", "id": option_id})
}

pub fn entry_deleted(entry_id: EntryId) -> Value {
    json!({"message": "Log entry deleted", "id": entry_id})
}
