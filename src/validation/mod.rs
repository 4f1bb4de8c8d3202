/// Input validation for habits, options and log entries
///
/// Raw key-value input (a JSON object) is checked against a declarative
/// `Shape` and turned into the typed creation and patch values of the domain
/// layer. Every offending field is reported, not just the first one.

pub mod shape;
pub mod inputs;

pub use shape::*;
pub use inputs::*;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::{OptionId, Patch, Timeframe};

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required field is absent
    Missing,
    /// The field is not part of this shape
    Unknown,
    /// The field exists but cannot be changed after creation
    Immutable,
    /// `null` was supplied for a field that can't be cleared
    NotNullable,
    /// The field was supplied under both its name and its alias
    Duplicate,
    /// The JSON value has the wrong type
    WrongType { expected: &'static str },
    /// The value has the right type but is not acceptable
    Invalid(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => f.write_str("field required"),
            Problem::Unknown => f.write_str("unknown field"),
            Problem::Immutable => f.write_str("field cannot be changed"),
            Problem::NotNullable => f.write_str("field cannot be null"),
            Problem::Duplicate => f.write_str("field supplied more than once"),
            Problem::WrongType { expected } => write!(f, "expected {}", expected),
            Problem::Invalid(reason) => f.write_str(reason),
        }
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field path, e.g. `name` or `options[1].option_text`
    pub field: String,
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Validation failure listing every offending field of one input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Which shape the input was checked against (e.g. "completion habit")
    pub shape: &'static str,
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: ", self.shape)?;
        let issues = self.issues.iter().map(|issue| issue.to_string()).collect::<Vec<_>>();
        f.write_str(&issues.join("; "))
    }
}

impl ValidationErrors {
    pub fn new(shape: &'static str) -> Self {
        Self { shape, issues: Vec::new() }
    }

    /// Shorthand for a failure with exactly one issue
    pub fn single(shape: &'static str, field: impl Into<String>, problem: Problem) -> Self {
        let mut errors = Self::new(shape);
        errors.push(field, problem);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, problem: Problem) {
        self.issues.push(FieldIssue { field: field.into(), problem });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Names of all offending fields, in the order they were found
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// A single validated value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit `null` for a nullable field
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Timeframe(Timeframe),
    Timestamp(NaiveDateTime),
    Reference(i64),
    /// Nested records, each validated against their own shape
    List(Vec<Fields>),
}

/// Validated fields of one input, keyed by canonical field name
///
/// A field that is not in the map was not supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    /// Name of the shape these fields were validated against
    shape: &'static str,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Fields {
    pub(crate) fn new(shape: &'static str) -> Self {
        Self { shape, values: BTreeMap::new() }
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take a field out as a typed patch value
    ///
    /// Fails when the stored value is not of the requested kind, which means
    /// the shape and its constructor disagree about the field.
    pub fn take<T: FromField>(&mut self, name: &str) -> Result<Patch<T>, ValidationErrors> {
        match self.values.remove(name) {
            None => Ok(Patch::Unset),
            Some(FieldValue::Null) => Ok(Patch::Null),
            Some(value) => T::from_field(value).map(Patch::Set).ok_or_else(|| {
                tracing::error!(shape = self.shape, field = name, "Validated field has an unexpected kind");
                ValidationErrors::single(
                    self.shape,
                    name.to_string(),
                    Problem::Invalid("value has an unexpected kind".to_string()),
                )
            }),
        }
    }
}

/// Conversion from a validated field value into a domain type
pub trait FromField: Sized {
    fn from_field(value: FieldValue) -> Option<Self>;
}

impl FromField for String {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl FromField for i64 {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(number) => Some(number),
            _ => None,
        }
    }
}

impl FromField for bool {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Boolean(flag) => Some(flag),
            _ => None,
        }
    }
}

impl FromField for Timeframe {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timeframe(timeframe) => Some(timeframe),
            _ => None,
        }
    }
}

impl FromField for NaiveDateTime {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timestamp(at) => Some(at),
            _ => None,
        }
    }
}

impl FromField for OptionId {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Reference(id) => Some(OptionId(id)),
            _ => None,
        }
    }
}

impl FromField for Vec<Fields> {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}
