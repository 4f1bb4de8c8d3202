/// Choice option scenarios

use habit_tracker::services::{habits, logs, options};
use habit_tracker::*;
use serde_json::json;

use crate::common::{example_habits, object, present, storage};

#[cfg(test)]
mod option_scenario_tests {
    use super::*;

    #[test]
    fn test_add_option_appends_to_the_habit() {
        let storage = storage();
        example_habits(&storage);

        let option = options::add_option(
            &storage,
            HabitId(6),
            &object(json!({"option_text": "Excited", "color": "orange", "icon": "star"})),
        )
        .expect("Failed to add option");

        assert_eq!(
            present(&option),
            json!({"id": 4, "habit_id": 6, "option_text": "Excited", "color": "orange", "icon": "star"})
        );

        let listed = options::list_options(&storage, HabitId(6)).expect("Failed to list options");
        let texts: Vec<&str> = listed.iter().map(|option| option.option_text.as_str()).collect();
        assert_eq!(texts, ["Happy", "Sad", "Neutral", "Excited"]);
    }

    #[test]
    fn test_add_option_without_color_or_icon() {
        let storage = storage();
        example_habits(&storage);

        let option = options::add_option(&storage, HabitId(6), &object(json!({"option_text": "Tired"})))
            .expect("Failed to add option");

        assert_eq!(option.color, None);
        assert_eq!(option.icon, None);
    }

    #[test]
    fn test_update_option_only_touches_given_fields() {
        let storage = storage();
        example_habits(&storage);

        let option = options::update_option(
            &storage,
            HabitId(6),
            OptionId(1),
            &object(json!({"option_text": "Very Happy", "icon": null})),
        )
        .expect("Failed to update option");

        assert_eq!(option.option_text, "Very Happy");
        assert_eq!(option.color.as_deref(), Some("yellow"));
        assert_eq!(option.icon, None);

        let habit = habits::get_habit(&storage, HabitId(6)).expect("Failed to get habit");
        assert_eq!(habit.options()[0], option);
    }

    #[test]
    fn test_delete_first_option_leaves_the_rest() {
        let storage = storage();
        habits::create_habit(
            &storage,
            &object(json!({"type": "choice", "name": "Mood", "options": [{"option_text": "Happy"}, {"option_text": "Sad"}]})),
        )
        .expect("Failed to create habit");

        let first = habits::get_habit(&storage, HabitId(1)).expect("Failed to get habit").options()[0].id;
        options::delete_option(&storage, HabitId(1), first).expect("Failed to delete option");

        let remaining = habits::get_habit(&storage, HabitId(1)).expect("Failed to get habit");
        let texts: Vec<&str> = remaining.options().iter().map(|option| option.option_text.as_str()).collect();
        assert_eq!(texts, ["Sad"]);
    }

    #[test]
    fn test_option_picked_by_a_log_cannot_be_deleted() {
        let storage = storage();
        example_habits(&storage);
        logs::create_entry(
            &storage,
            HabitId(6),
            &object(json!({"type": "choice", "recorded_at": "2024-01-01 08:00:00", "option_id": 1})),
        )
        .expect("Failed to log mood");

        let error = options::delete_option(&storage, HabitId(6), OptionId(1)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        assert_eq!(error.to_string(), "Option is still referenced by 1 log entries");

        assert_eq!(options::list_options(&storage, HabitId(6)).expect("Failed to list options").len(), 3);
        options::delete_option(&storage, HabitId(6), OptionId(2)).expect("Unused option should be deletable");
    }

    #[test]
    fn test_options_require_a_choice_habit() {
        let storage = storage();
        example_habits(&storage);

        let error = options::add_option(&storage, HabitId(1), &object(json!({"option_text": "Yes"}))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        assert_eq!(error.to_string(), "Habit is not a choice habit");

        let error = options::list_options(&storage, HabitId(4)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_missing_habit_or_option_is_not_found() {
        let storage = storage();
        example_habits(&storage);

        let error = options::add_option(&storage, HabitId(999), &object(json!({"option_text": "Yes"}))).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "Habit not found");

        let error = options::update_option(&storage, HabitId(6), OptionId(999), &object(json!({"color": "red"})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = options::delete_option(&storage, HabitId(6), OptionId(999)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_option_of_another_habit_is_not_found() {
        let storage = storage();
        example_habits(&storage);
        habits::create_habit(
            &storage,
            &object(json!({"type": "choice", "name": "Weather", "options": [{"option_text": "Sunny"}]})),
        )
        .expect("Failed to create habit");

        let error = options::update_option(&storage, HabitId(6), OptionId(4), &object(json!({"color": "gold"})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "Option not found for this habit");

        let error = options::delete_option(&storage, HabitId(6), OptionId(4)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(options::list_options(&storage, HabitId(7)).expect("Failed to list options").len(), 1);
    }

    #[test]
    fn test_invalid_option_input_is_rejected() {
        let storage = storage();
        example_habits(&storage);

        let error = options::add_option(&storage, HabitId(6), &object(json!({"option_text": "", "shape": "round"})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
        let mut fields = error.validation().map(|errors| errors.fields()).unwrap_or_default();
        fields.sort();
        assert_eq!(fields, ["option_text", "shape"]);

        let error = options::update_option(&storage, HabitId(6), OptionId(1), &object(json!({"option_text": null})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailure);
    }
}
