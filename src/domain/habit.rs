/// Habit entity and related functionality
///
/// A habit has a name and exactly one kind. The kind-specific attributes live
/// inside the `HabitKind` variant, so a completion habit can never carry a
/// unit and a measurable habit can never carry options.

use serde::{Deserialize, Serialize};
use crate::domain::{ChoiceOption, DomainError, HabitId, HabitType, NewChoiceOption, Patch, Timeframe};

/// A habit the user wants to track
///
/// Serializes to a flat record: `id`, `name`, `habit_type` and the fields of
/// the active kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Medicine", "Water Intake")
    pub name: String,
    /// Kind-specific attributes
    #[serde(flatten)]
    pub kind: HabitKind,
}

/// Kind-specific attributes of a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "habit_type", rename_all = "lowercase")]
pub enum HabitKind {
    /// Done `completion_target` times per `target_timeframe`
    Completion {
        completion_target: i64,
        target_timeframe: Timeframe,
    },
    /// Reach `target` units, optionally per period
    Measurable {
        target: i64,
        unit: String,
        /// Exposed on the wire as `completion_target`
        #[serde(rename = "completion_target", default, skip_serializing_if = "Option::is_none")]
        period: Option<Timeframe>,
    },
    /// Pick one of the options, in the order they were added
    Choice {
        options: Vec<ChoiceOption>,
    },
}

impl HabitKind {
    pub fn habit_type(&self) -> HabitType {
        match self {
            HabitKind::Completion { .. } => HabitType::Completion,
            HabitKind::Measurable { .. } => HabitType::Measurable,
            HabitKind::Choice { .. } => HabitType::Choice,
        }
    }
}

/// Validated data for a habit that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub kind: NewHabitKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewHabitKind {
    Completion {
        completion_target: i64,
        target_timeframe: Timeframe,
    },
    Measurable {
        target: i64,
        unit: String,
        period: Option<Timeframe>,
    },
    Choice {
        options: Vec<NewChoiceOption>,
    },
}

impl NewHabit {
    pub fn habit_type(&self) -> HabitType {
        match self.kind {
            NewHabitKind::Completion { .. } => HabitType::Completion,
            NewHabitKind::Measurable { .. } => HabitType::Measurable,
            NewHabitKind::Choice { .. } => HabitType::Choice,
        }
    }
}

/// Validated partial update of a habit
///
/// The kind part is built for one specific habit type; options are never
/// part of a habit update.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitPatch {
    pub name: Patch<String>,
    pub kind: HabitKindPatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HabitKindPatch {
    Completion {
        completion_target: Patch<i64>,
        target_timeframe: Patch<Timeframe>,
    },
    Measurable {
        target: Patch<i64>,
        unit: Patch<String>,
        period: Patch<Timeframe>,
    },
    Choice,
}

impl HabitKindPatch {
    pub fn habit_type(&self) -> HabitType {
        match self {
            HabitKindPatch::Completion { .. } => HabitType::Completion,
            HabitKindPatch::Measurable { .. } => HabitType::Measurable,
            HabitKindPatch::Choice => HabitType::Choice,
        }
    }
}

impl Habit {
    /// Build a habit from its creation data and storage-assigned identity
    ///
    /// `options` must be the stored versions of the new habit's options, in
    /// the same order. They are ignored for non-choice habits.
    pub fn from_new(id: HabitId, habit: NewHabit, options: Vec<ChoiceOption>) -> Self {
        let kind = match habit.kind {
            NewHabitKind::Completion { completion_target, target_timeframe } => {
                HabitKind::Completion { completion_target, target_timeframe }
            }
            NewHabitKind::Measurable { target, unit, period } => {
                HabitKind::Measurable { target, unit, period }
            }
            NewHabitKind::Choice { .. } => HabitKind::Choice { options },
        };

        Self { id, name: habit.name, kind }
    }

    pub fn habit_type(&self) -> HabitType {
        self.kind.habit_type()
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, HabitKind::Choice { .. })
    }

    /// Options of a choice habit; empty for the other kinds
    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            HabitKind::Choice { options } => options,
            _ => &[],
        }
    }

    /// Apply a partial update
    ///
    /// Only supplied fields change. The patch must have been built for this
    /// habit's type; nothing is modified when it wasn't.
    pub fn apply(&mut self, patch: HabitPatch) -> Result<(), DomainError> {
        let stored = self.habit_type();
        let requested = patch.kind.habit_type();
        if stored != requested {
            return Err(DomainError::KindMismatch { stored, requested });
        }

        match (&mut self.kind, patch.kind) {
            (
                HabitKind::Completion { completion_target, target_timeframe },
                HabitKindPatch::Completion {
                    completion_target: new_target,
                    target_timeframe: new_timeframe,
                },
            ) => {
                new_target.apply_to(completion_target);
                new_timeframe.apply_to(target_timeframe);
            }
            (
                HabitKind::Measurable { target, unit, period },
                HabitKindPatch::Measurable {
                    target: new_target,
                    unit: new_unit,
                    period: new_period,
                },
            ) => {
                new_target.apply_to(target);
                new_unit.apply_to(unit);
                new_period.apply_to_option(period);
            }
            (HabitKind::Choice { .. }, HabitKindPatch::Choice) => {}
            // Ruled out by the type check above
            _ => return Err(DomainError::KindMismatch { stored, requested }),
        }

        // Shared fields last, so a refused patch leaves the habit untouched
        patch.name.apply_to(&mut self.name);

        Ok(())
    }
}
