/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, ChoiceOption, LogEntry) as
/// sum types over the three habit kinds, together with the values used to
/// create and partially update them.

pub mod habit;
pub mod option;
pub mod entry;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use option::*;
pub use entry::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot apply a {requested} update to a {stored} record")]
    KindMismatch {
        stored: HabitType,
        requested: HabitType,
    },
}
