/// LogEntry entity for recording habit occurrences
///
/// Every log entry belongs to one habit and has the same kind as that habit:
/// a completion status, a measured value, or the option that was picked.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::domain::{timestamp, ChoiceOption, DomainError, EntryId, HabitId, HabitType, OptionId, Patch};

/// A record of a habit occurrence
///
/// The kind is fixed when the entry is created (copied from the habit) and
/// never revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// When the occurrence happened
    #[serde(with = "timestamp")]
    pub recorded_at: NaiveDateTime,
    #[serde(flatten)]
    pub kind: LogKind,
}

/// Kind-specific payload of a log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "habit_type", rename_all = "lowercase")]
pub enum LogKind {
    Completion {
        status: bool,
    },
    Measurable {
        value: i64,
    },
    /// The picked option is embedded so callers don't need a second lookup
    Choice {
        option_id: OptionId,
        option: ChoiceOption,
    },
}

impl LogKind {
    pub fn habit_type(&self) -> HabitType {
        match self {
            LogKind::Completion { .. } => HabitType::Completion,
            LogKind::Measurable { .. } => HabitType::Measurable,
            LogKind::Choice { .. } => HabitType::Choice,
        }
    }
}

/// Validated data for a log entry that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub recorded_at: NaiveDateTime,
    pub kind: NewLogKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewLogKind {
    Completion { status: bool },
    Measurable { value: i64 },
    Choice { option_id: OptionId },
}

impl NewLogEntry {
    /// The kind the caller stated for this entry
    pub fn habit_type(&self) -> HabitType {
        match self.kind {
            NewLogKind::Completion { .. } => HabitType::Completion,
            NewLogKind::Measurable { .. } => HabitType::Measurable,
            NewLogKind::Choice { .. } => HabitType::Choice,
        }
    }
}

/// Validated partial update of a log entry
///
/// The option of a choice entry is immutable, so a choice patch can only
/// move the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntryPatch {
    pub recorded_at: Patch<NaiveDateTime>,
    pub kind: LogKindPatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogKindPatch {
    Completion { status: Patch<bool> },
    Measurable { value: Patch<i64> },
    Choice,
}

impl LogKindPatch {
    pub fn habit_type(&self) -> HabitType {
        match self {
            LogKindPatch::Completion { .. } => HabitType::Completion,
            LogKindPatch::Measurable { .. } => HabitType::Measurable,
            LogKindPatch::Choice => HabitType::Choice,
        }
    }
}

impl LogEntry {
    pub fn habit_type(&self) -> HabitType {
        self.kind.habit_type()
    }

    /// Apply a partial update built for this entry's kind
    pub fn apply(&mut self, patch: LogEntryPatch) -> Result<(), DomainError> {
        let stored = self.habit_type();
        let requested = patch.kind.habit_type();
        if stored != requested {
            return Err(DomainError::KindMismatch { stored, requested });
        }

        match (&mut self.kind, patch.kind) {
            (LogKind::Completion { status }, LogKindPatch::Completion { status: new_status }) => {
                new_status.apply_to(status);
            }
            (LogKind::Measurable { value }, LogKindPatch::Measurable { value: new_value }) => {
                new_value.apply_to(value);
            }
            (LogKind::Choice { .. }, LogKindPatch::Choice) => {}
            _ => return Err(DomainError::KindMismatch { stored, requested }),
        }

        patch.recorded_at.apply_to(&mut self.recorded_at);

        Ok(())
    }
}
