/// Integration tests for server startup and persistence

use habit_tracker::services::{habits, logs, options};
use habit_tracker::*;
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

use crate::common::{example_habits, object, present};

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation_with_temp_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let server = HabitTrackerServer::new(db_path).await.expect("Failed to create server");

        let habits = server.storage().list_habits().expect("Failed to list habits");
        assert!(habits.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_server_starts_empty() {
        let server = HabitTrackerServer::in_memory().await.expect("Failed to create server");
        assert!(server.storage().list_habits().expect("Failed to list habits").is_empty());
    }

    #[test]
    fn test_data_survives_reopening_the_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("habits.db");

        {
            let storage = SqliteStorage::new(db_path.clone()).expect("Failed to open storage");
            example_habits(&storage);
            logs::create_entry(
                &storage,
                HabitId(6),
                &object(json!({"type": "choice", "recorded_at": "2024-03-01 09:00:00", "option_id": 2})),
            )
            .expect("Failed to log mood");
        }

        let storage = SqliteStorage::new(db_path).expect("Failed to reopen storage");

        let habits = habits::list_habits(&storage).expect("Failed to list habits");
        let names: Vec<&str> = habits.iter().map(|habit| habit.name.as_str()).collect();
        assert_eq!(names, ["Medicine", "Exercise", "Flossing", "Water Intake", "Pages Read", "Mood"]);

        let options = options::list_options(&storage, HabitId(6)).expect("Failed to list options");
        assert_eq!(options.len(), 3);

        let entries = logs::list_entries(&storage, HabitId(6)).expect("Failed to list entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(present(&entries[0])["option"]["option_text"], json!("Sad"));
        assert_eq!(present(&entries[0])["recorded_at"], json!("2024-03-01 09:00:00"));
    }

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let storage = crate::common::storage();
        example_habits(&storage);

        let habits = habits::list_habits(&storage).expect("Failed to list habits");
        let ids: Vec<i64> = habits.iter().map(|habit| habit.id.0).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6]);

        let option_ids: Vec<i64> = habits[5].options().iter().map(|option| option.id.0).collect();
        assert_eq!(option_ids, [1, 2, 3]);
    }
}
