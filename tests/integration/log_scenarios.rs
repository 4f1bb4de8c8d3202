/// Log entry scenarios for every habit kind

use habit_tracker::services::{habits, logs};
use habit_tracker::*;
use serde_json::{json, Value};

use crate::common::{example_habits, object, present, storage};

fn completion_log() -> Value {
    json!({"type": "completion", "recorded_at": "2024-01-01 08:00:00", "status": true})
}

fn measurable_log() -> Value {
    json!({"type": "measurable", "recorded_at": "2024-01-01 12:00:00", "amount": 500})
}

fn choice_log(option_id: i64) -> Value {
    json!({"type": "choice", "recorded_at": "2024-01-01 20:00:00", "option_id": option_id})
}

#[cfg(test)]
mod log_scenario_tests {
    use super::*;

    #[test]
    fn test_completion_log() {
        let storage = storage();
        example_habits(&storage);

        let entry = logs::create_entry(&storage, HabitId(1), &object(completion_log())).expect("Failed to log");

        assert_eq!(
            present(&entry),
            json!({
                "id": 1,
                "habit_id": 1,
                "recorded_at": "2024-01-01 08:00:00",
                "habit_type": "completion",
                "status": true,
            })
        );
    }

    #[test]
    fn test_measurable_log_accepts_value_and_log_date() {
        let storage = storage();
        example_habits(&storage);

        let entry = logs::create_entry(&storage, HabitId(4), &object(measurable_log())).expect("Failed to log");
        assert_eq!(entry.kind, LogKind::Measurable { value: 500 });

        let entry = logs::create_entry(
            &storage,
            HabitId(4),
            &object(json!({"type": "measurable", "log_date": "2024-01-02T07:30:00", "value": 250})),
        )
        .expect("Failed to log with aliases");
        assert_eq!(
            present(&entry),
            json!({
                "id": 2,
                "habit_id": 4,
                "recorded_at": "2024-01-02 07:30:00",
                "habit_type": "measurable",
                "value": 250,
            })
        );
    }

    #[test]
    fn test_choice_log_embeds_the_option() {
        let storage = storage();
        example_habits(&storage);

        let entry = logs::create_entry(&storage, HabitId(6), &object(choice_log(1))).expect("Failed to log");

        let record = present(&entry);
        assert_eq!(record["habit_type"], json!("choice"));
        assert_eq!(record["option_id"], json!(1));
        assert_eq!(
            record["option"],
            json!({"id": 1, "habit_id": 6, "option_text": "Happy", "color": "yellow", "icon": "smile"})
        );
    }

    #[test]
    fn test_log_type_must_match_the_habit() {
        let storage = storage();
        example_habits(&storage);

        let cases = [
            (HabitId(1), measurable_log()),
            (HabitId(1), choice_log(1)),
            (HabitId(4), completion_log()),
            (HabitId(4), choice_log(1)),
            (HabitId(6), completion_log()),
            (HabitId(6), measurable_log()),
        ];

        for (habit_id, input) in cases {
            let error = logs::create_entry(&storage, habit_id, &object(input)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::TypeMismatch);
            assert_eq!(error.to_string(), "Habit type mismatch");
        }

        for habit_id in [1, 4, 6] {
            assert!(logs::list_entries(&storage, HabitId(habit_id)).expect("Failed to list").is_empty());
        }
    }

    #[test]
    fn test_log_for_missing_habit_is_not_found() {
        let storage = storage();
        example_habits(&storage);

        let error = logs::create_entry(&storage, HabitId(999), &object(completion_log())).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "Habit not found");

        let error = logs::list_entries(&storage, HabitId(999)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_log_without_payload_is_a_validation_failure() {
        let storage = storage();
        example_habits(&storage);

        let error = logs::create_entry(
            &storage,
            HabitId(1),
            &object(json!({"type": "completion", "recorded_at": "2024-01-01 08:00:00"})),
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
        assert_eq!(error.validation().map(|errors| errors.fields()), Some(vec!["status"]));

        let error = logs::create_entry(
            &storage,
            HabitId(1),
            &object(json!({"type": "completion", "recorded_at": "yesterday", "status": true})),
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
        assert_eq!(error.validation().map(|errors| errors.fields()), Some(vec!["recorded_at"]));
    }

    #[test]
    fn test_choice_log_with_missing_option() {
        let storage = storage();
        example_habits(&storage);

        let error = logs::create_entry(&storage, HabitId(6), &object(choice_log(999))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "Option not found");
    }

    #[test]
    fn test_choice_log_with_option_of_another_habit() {
        let storage = storage();
        example_habits(&storage);
        habits::create_habit(
            &storage,
            &object(json!({"type": "choice", "name": "Weather", "options": [{"option_text": "Sunny"}]})),
        )
        .expect("Failed to create habit");

        let error = logs::create_entry(&storage, HabitId(6), &object(choice_log(4))).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        assert_eq!(error.to_string(), "Option does not belong to the specified habit");
        assert!(logs::list_entries(&storage, HabitId(6)).expect("Failed to list").is_empty());
    }

    #[test]
    fn test_entries_are_listed_in_creation_order() {
        let storage = storage();
        example_habits(&storage);

        for option_id in [3, 1, 2] {
            logs::create_entry(&storage, HabitId(6), &object(choice_log(option_id))).expect("Failed to log");
        }
        logs::create_entry(&storage, HabitId(1), &object(completion_log())).expect("Failed to log");

        let entries = logs::list_entries(&storage, HabitId(6)).expect("Failed to list");
        let picked: Vec<i64> = entries
            .iter()
            .map(|entry| match &entry.kind {
                LogKind::Choice { option_id, .. } => option_id.0,
                other => panic!("unexpected entry kind {:?}", other),
            })
            .collect();
        assert_eq!(picked, [3, 1, 2]);
    }

    #[test]
    fn test_update_entry_applies_only_given_fields() {
        let storage = storage();
        example_habits(&storage);
        logs::create_entry(&storage, HabitId(4), &object(measurable_log())).expect("Failed to log");

        let entry = logs::update_entry(&storage, EntryId(1), &object(json!({"type": "measurable", "value": 750})))
            .expect("Failed to update entry");
        assert_eq!(entry.kind, LogKind::Measurable { value: 750 });
        assert_eq!(present(&entry)["recorded_at"], json!("2024-01-01 12:00:00"));

        let stored = logs::get_entry(&storage, EntryId(1)).expect("Failed to get entry");
        assert_eq!(stored, entry);
    }

    #[test]
    fn test_update_entry_rejects_other_type_and_option_change() {
        let storage = storage();
        example_habits(&storage);
        let logged = logs::create_entry(&storage, HabitId(6), &object(choice_log(1))).expect("Failed to log");

        let error = logs::update_entry(&storage, EntryId(1), &object(json!({"type": "completion", "status": false})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);

        let error = logs::update_entry(&storage, EntryId(1), &object(json!({"option_id": 2}))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);

        let error = logs::update_entry(
            &storage,
            EntryId(1),
            &object(json!({"type": "completion", "recorded_at": "2024-03-01 09:00:00"})),
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);

        let stored = logs::get_entry(&storage, EntryId(1)).expect("Failed to get entry");
        assert_eq!(stored, logged);
        assert_eq!(present(&stored)["recorded_at"], json!("2024-01-01 20:00:00"));

        let entry = logs::update_entry(&storage, EntryId(1), &object(json!({"recorded_at": "2024-02-01 06:00:00"})))
            .expect("Failed to move entry");
        assert_eq!(present(&entry)["recorded_at"], json!("2024-02-01 06:00:00"));
        assert_eq!(present(&entry)["option"]["option_text"], json!("Happy"));
    }

    #[test]
    fn test_log_keeps_fractional_seconds_and_reads_bare_dates() {
        let storage = storage();
        example_habits(&storage);

        let precise = logs::create_entry(
            &storage,
            HabitId(1),
            &object(json!({"type": "completion", "recorded_at": "2024-01-01T08:30:00.250Z", "status": true})),
        )
        .expect("Failed to log with fractional seconds");
        assert_eq!(present(&precise)["recorded_at"], json!("2024-01-01 08:30:00.250"));

        let stored = logs::get_entry(&storage, precise.id).expect("Failed to get entry");
        assert_eq!(stored, precise);

        let midnight = logs::create_entry(
            &storage,
            HabitId(1),
            &object(json!({"type": "completion", "recorded_at": "2024-01-02", "status": false})),
        )
        .expect("Failed to log with a bare date");
        assert_eq!(present(&midnight)["recorded_at"], json!("2024-01-02 00:00:00"));
    }

    #[test]
    fn test_delete_entry() {
        let storage = storage();
        example_habits(&storage);
        logs::create_entry(&storage, HabitId(1), &object(completion_log())).expect("Failed to log");

        logs::delete_entry(&storage, EntryId(1)).expect("Failed to delete entry");

        assert_eq!(logs::get_entry(&storage, EntryId(1)).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(logs::delete_entry(&storage, EntryId(1)).unwrap_err().to_string(), "Log entry not found");
    }
}
