/// Choice options belonging to a choice habit
///
/// An option is one of the answers a choice habit offers (e.g. "Happy" for a
/// mood habit). Options keep the order in which they were added.

use serde::{Deserialize, Serialize};
use crate::domain::{HabitId, OptionId, Patch};

/// A selectable answer of a choice habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: OptionId,
    /// The choice habit that owns this option
    pub habit_id: HabitId,
    pub option_text: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Validated data for an option that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChoiceOption {
    pub option_text: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Validated partial update of an option
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChoiceOptionPatch {
    pub option_text: Patch<String>,
    pub color: Patch<String>,
    pub icon: Patch<String>,
}

impl ChoiceOption {
    /// Attach storage-assigned identity to a new option
    pub fn from_new(id: OptionId, habit_id: HabitId, option: NewChoiceOption) -> Self {
        Self {
            id,
            habit_id,
            option_text: option.option_text,
            color: option.color,
            icon: option.icon,
        }
    }

    /// Apply the supplied fields, leaving everything else untouched
    pub fn apply(&mut self, patch: ChoiceOptionPatch) {
        patch.option_text.apply_to(&mut self.option_text);
        patch.color.apply_to_option(&mut self.color);
        patch.icon.apply_to_option(&mut self.icon);
    }
}
