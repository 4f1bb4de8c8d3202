/// Shared fixtures for the integration tests
use habit_tracker::services::habits;
use habit_tracker::*;
use serde_json::{json, Map, Value};

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("fixture input must be an object")
}

pub fn storage() -> SqliteStorage {
    SqliteStorage::in_memory().expect("Failed to create storage")
}

/// Habits 1-3 are completion, 4-5 measurable and 6 is the "Mood" choice
/// habit with options 1 (Happy), 2 (Sad) and 3 (Neutral)
pub fn example_habits(storage: &SqliteStorage) {
    let inputs = [
        json!({"type": "completion", "name": "Medicine", "completion_target": 1, "target_timeframe": "day"}),
        json!({"type": "completion", "name": "Exercise", "completion_target": 3, "target_timeframe": "week"}),
        json!({"type": "completion", "name": "Flossing", "completion_target": 2, "target_timeframe": "day"}),
        json!({"type": "measurable", "name": "Water Intake", "target": 2000, "completion_target": "day", "unit": "ml"}),
        json!({"type": "measurable", "name": "Pages Read", "target": 1000, "completion_target": "month", "unit": "pages"}),
        json!({
            "type": "choice",
            "name": "Mood",
            "options": [
                {"option_text": "Happy", "color": "yellow", "icon": "smile"},
                {"option_text": "Sad", "color": "blue", "icon": "frown"},
                {"option_text": "Neutral", "color": "gray", "icon": "meh"},
            ],
        }),
    ];

    for input in inputs {
        habits::create_habit(storage, &object(input)).expect("Failed to create example habit");
    }
}

pub fn present<T: serde::Serialize>(value: &T) -> Value {
    presentation::record(value).expect("Failed to present record")
}
