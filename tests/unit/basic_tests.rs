/// Basic unit tests to verify core functionality
use habit_tracker::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn medicine() -> Habit {
        Habit {
            id: HabitId(1),
            name: "Medicine".to_string(),
            kind: HabitKind::Completion { completion_target: 1, target_timeframe: Timeframe::Day },
        }
    }

    #[test]
    fn test_habit_type_parsing() {
        assert_eq!("measurable".parse::<HabitType>(), Ok(HabitType::Measurable));
        assert_eq!(HabitType::Choice.to_string(), "choice");

        let error = "streak".parse::<HabitType>().unwrap_err();
        assert_eq!(error.to_string(), "unknown habit type 'streak'");
    }

    #[test]
    fn test_timeframe_parsing() {
        for timeframe in Timeframe::ALL {
            assert_eq!(timeframe.as_str().parse::<Timeframe>(), Ok(timeframe));
        }
        assert!("year".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_patch_leaves_unset_fields_alone() {
        let mut name = "Medicine".to_string();
        Patch::Unset.apply_to(&mut name);
        assert_eq!(name, "Medicine");

        Patch::Set("Vitamins".to_string()).apply_to(&mut name);
        assert_eq!(name, "Vitamins");

        let mut icon = Some("pill".to_string());
        Patch::<String>::Unset.apply_to_option(&mut icon);
        assert_eq!(icon.as_deref(), Some("pill"));
        Patch::<String>::Null.apply_to_option(&mut icon);
        assert_eq!(icon, None);
    }

    #[test]
    fn test_habit_patch_for_another_kind_is_refused() {
        let mut habit = medicine();
        let patch = HabitPatch {
            name: Patch::Set("Water".to_string()),
            kind: HabitKindPatch::Measurable { target: Patch::Set(8), unit: Patch::Unset, period: Patch::Unset },
        };

        let error = habit.apply(patch).unwrap_err();
        assert_eq!(
            error,
            DomainError::KindMismatch { stored: HabitType::Completion, requested: HabitType::Measurable }
        );
        assert_eq!(habit, medicine());
    }

    #[test]
    fn test_habit_patch_applies_supplied_fields() {
        let mut habit = medicine();
        let patch = HabitPatch {
            name: Patch::Unset,
            kind: HabitKindPatch::Completion {
                completion_target: Patch::Set(2),
                target_timeframe: Patch::Unset,
            },
        };

        habit.apply(patch).expect("Failed to apply patch");
        assert_eq!(habit.name, "Medicine");
        assert_eq!(
            habit.kind,
            HabitKind::Completion { completion_target: 2, target_timeframe: Timeframe::Day }
        );
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = timestamp::parse("2024-01-01 08:30:00").expect("Failed to parse timestamp");
        assert_eq!(timestamp::parse("2024-01-01T08:30:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-01-01T08:30:00.000"), Some(expected));
        assert_eq!(timestamp::parse("2024-01-01T10:30:00+02:00"), Some(expected));
        assert_eq!(timestamp::format(&expected), "2024-01-01 08:30:00");
        assert_eq!(timestamp::parse("01/01/2024"), None);
    }

    #[tokio::test]
    async fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf()).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());

        let storage = storage.expect("Failed to create storage");
        let _: &dyn HabitStorage = &storage;
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ServiceError::HabitTypeChange.kind(), ErrorKind::TypeMismatch);
        assert_eq!(ServiceError::OptionsNotPatchable.kind(), ErrorKind::InvalidOperation);
        assert_eq!(ErrorKind::ValidationFailure.as_str(), "validation_failure");

        let error: ServiceError = StorageError::EntryNotFound { entry_id: EntryId(9) }.into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "Log entry not found");
    }
}
