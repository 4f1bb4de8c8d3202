/// Core types and enums used throughout the domain layer
///
/// This module defines the closed sets of habit kinds and timeframes, the
/// integer ID types for habits, options and log entries, and the `Patch`
/// wrapper used for partial updates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a habit
///
/// This is a wrapper around the integer row ID to provide type safety - you
/// can't accidentally pass a habit ID where an option ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub i64);

/// Unique identifier for a choice option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub i64);

/// Unique identifier for a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a stored or submitted enum value is not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what} '{value}'")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

/// The kind of a habit
///
/// The kind decides which extra attributes a habit carries and which shape
/// its log entries take. It never changes once the habit is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    /// Simple checkbox (took medicine: yes/no)
    Completion,
    /// A measured amount (water in ml, pages read)
    Measurable,
    /// One pick from a list of options (mood: happy, sad, neutral)
    Choice,
}

impl HabitType {
    pub const ALL: [HabitType; 3] = [HabitType::Completion, HabitType::Measurable, HabitType::Choice];

    /// Wire and database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Completion => "completion",
            HabitType::Measurable => "measurable",
            HabitType::Choice => "choice",
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HabitType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant { what: "habit type", value: s.to_string() })
    }
}

/// The period a target refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Day, Timeframe::Week, Timeframe::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == s)
            .ok_or_else(|| UnknownVariant { what: "timeframe", value: s.to_string() })
    }
}

/// A single field of a partial update
///
/// `Unset` means the caller did not mention the field and the stored value
/// stays as it is. `Null` means the caller explicitly cleared the field,
/// which validation only allows for nullable fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unset,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Overwrite a required attribute when a new value was supplied
    pub fn apply_to(self, slot: &mut T) {
        if let Patch::Set(value) = self {
            *slot = value;
        }
    }

    /// Overwrite or clear an optional attribute
    pub fn apply_to_option(self, slot: &mut Option<T>) {
        match self {
            Patch::Unset => {}
            Patch::Null => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    /// Collapse into an `Option`, treating `Null` like an absent value
    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Null | Patch::Unset => None,
        }
    }
}

/// Wire format for log timestamps
///
/// Timestamps are written as `YYYY-MM-DD HH:MM:SS`, followed by fractional
/// seconds only when there are any. Reading additionally accepts the ISO `T`
/// separator, full RFC 3339 values with an offset (converted to UTC) and a
/// bare date, which means midnight.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    /// `%.f` prints nothing for whole seconds
    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    const DATE_FORMAT: &str = "%Y-%m-%d";

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc()))
            .or_else(|| {
                NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", text)))
    }
}
