/// Habit, option and log entry services
///
/// Each operation is a free function over any `HabitStorage`, so callers
/// choose the storage handle explicitly. Services validate raw input, check
/// the cross-entity rules and only then write.

pub mod habits;
pub mod options;
pub mod logs;

use thiserror::Error;

use crate::domain::{DomainError, EntryId, HabitId, OptionId};
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Classification of service failures for the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TypeMismatch,
    InvalidOperation,
    ValidationFailure,
    /// Storage or other failures the caller can't fix
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::InvalidOperation => "invalid_operation",
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors returned by service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Habit not found")]
    HabitNotFound { habit_id: HabitId },

    #[error("Option not found")]
    OptionNotFound { option_id: OptionId },

    #[error("Option not found for this habit")]
    OptionNotOwned { habit_id: HabitId, option_id: OptionId },

    #[error("Log entry not found")]
    EntryNotFound { entry_id: EntryId },

    #[error("Changing habit type is not supported")]
    HabitTypeChange,

    #[error("Habit type mismatch")]
    LogTypeMismatch,

    #[error("Habit is not a choice habit")]
    NotChoiceHabit { habit_id: HabitId },

    #[error("Updating options through this endpoint is not supported")]
    OptionsNotPatchable,

    #[error("Option does not belong to the specified habit")]
    ForeignOption { habit_id: HabitId, option_id: OptionId },

    #[error("Option is still referenced by {entries} log entries")]
    OptionInUse { option_id: OptionId, entries: usize },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::HabitNotFound { .. }
            | ServiceError::OptionNotFound { .. }
            | ServiceError::OptionNotOwned { .. }
            | ServiceError::EntryNotFound { .. } => ErrorKind::NotFound,
            ServiceError::HabitTypeChange | ServiceError::LogTypeMismatch | ServiceError::Domain(_) => {
                ErrorKind::TypeMismatch
            }
            ServiceError::NotChoiceHabit { .. }
            | ServiceError::OptionsNotPatchable
            | ServiceError::ForeignOption { .. }
            | ServiceError::OptionInUse { .. } => ErrorKind::InvalidOperation,
            ServiceError::Validation(_) => ErrorKind::ValidationFailure,
            ServiceError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Offending fields of a validation failure
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::HabitNotFound { habit_id } => ServiceError::HabitNotFound { habit_id },
            StorageError::OptionNotFound { option_id } => ServiceError::OptionNotFound { option_id },
            StorageError::EntryNotFound { entry_id } => ServiceError::EntryNotFound { entry_id },
            other => ServiceError::Storage(other),
        }
    }
}
