/// Declarative input shapes
///
/// Each entity variant has one `Shape`: the list of fields its creation input
/// takes. The patch shape is never written out separately. It is derived from
/// the same list by `Mode::Patch`, where every field becomes optional and
/// immutable fields are rejected.

use serde_json::{json, Map, Value};

use crate::domain::{timestamp, HabitType, Timeframe};
use crate::validation::{FieldValue, Fields, Problem, ValidationErrors};

/// Input key that selects the variant
pub const DISCRIMINATOR: &str = "type";

pub const NAME_MAX_LEN: usize = 100;
pub const UNIT_MAX_LEN: usize = 50;
pub const OPTION_TEXT_MAX_LEN: usize = 255;
pub const COLOR_MAX_LEN: usize = 20;
pub const ICON_MAX_LEN: usize = 50;

/// The kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string of at most `max_len` characters
    Text { max_len: usize },
    Integer,
    Boolean,
    Timeframe,
    Timestamp,
    /// Positive integer id of another record
    Reference,
    /// Array of choice option inputs
    OptionList,
}

/// Specification for a single input field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical field name
    pub name: &'static str,
    /// Alternative key accepted on input
    pub alias: Option<&'static str>,
    pub kind: FieldKind,
    /// Required when creating
    pub required: bool,
    /// Accepts explicit `null`
    pub nullable: bool,
    /// Cannot appear in a patch
    pub immutable: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            alias: None,
            kind,
            required,
            nullable: false,
            immutable: false,
        }
    }

    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, true)
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, false)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.alias == Some(key)
    }
}

/// Whether an input creates a record or partially updates one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Patch,
}

/// The set of fields one entity variant accepts
#[derive(Debug)]
pub struct Shape {
    /// Human-readable name used in error messages
    pub name: &'static str,
    /// Literal value of the `type` key, for variant shapes
    pub discriminator: Option<HabitType>,
    pub fields: &'static [FieldSpec],
}

pub static COMPLETION_HABIT: Shape = Shape {
    name: "completion habit",
    discriminator: Some(HabitType::Completion),
    fields: &[
        FieldSpec::required("name", FieldKind::Text { max_len: NAME_MAX_LEN }),
        FieldSpec::required("completion_target", FieldKind::Integer),
        FieldSpec::required("target_timeframe", FieldKind::Timeframe),
    ],
};

pub static MEASURABLE_HABIT: Shape = Shape {
    name: "measurable habit",
    discriminator: Some(HabitType::Measurable),
    fields: &[
        FieldSpec::required("name", FieldKind::Text { max_len: NAME_MAX_LEN }),
        FieldSpec::required("target", FieldKind::Integer),
        FieldSpec::required("unit", FieldKind::Text { max_len: UNIT_MAX_LEN }),
        // The measurable habit's period; named like the completion count on the wire
        FieldSpec::optional("completion_target", FieldKind::Timeframe).nullable(),
    ],
};

pub static CHOICE_HABIT: Shape = Shape {
    name: "choice habit",
    discriminator: Some(HabitType::Choice),
    fields: &[
        FieldSpec::required("name", FieldKind::Text { max_len: NAME_MAX_LEN }),
        // Options have their own endpoints once the habit exists
        FieldSpec::required("options", FieldKind::OptionList).immutable(),
    ],
};

pub static CHOICE_OPTION: Shape = Shape {
    name: "choice option",
    discriminator: None,
    fields: &[
        FieldSpec::required("option_text", FieldKind::Text { max_len: OPTION_TEXT_MAX_LEN }),
        FieldSpec::optional("color", FieldKind::Text { max_len: COLOR_MAX_LEN }).nullable(),
        FieldSpec::optional("icon", FieldKind::Text { max_len: ICON_MAX_LEN }).nullable(),
    ],
};

pub static COMPLETION_LOG: Shape = Shape {
    name: "completion log entry",
    discriminator: Some(HabitType::Completion),
    fields: &[
        FieldSpec::required("recorded_at", FieldKind::Timestamp).alias("log_date"),
        FieldSpec::required("status", FieldKind::Boolean),
    ],
};

pub static MEASURABLE_LOG: Shape = Shape {
    name: "measurable log entry",
    discriminator: Some(HabitType::Measurable),
    fields: &[
        FieldSpec::required("recorded_at", FieldKind::Timestamp).alias("log_date"),
        FieldSpec::required("amount", FieldKind::Integer).alias("value"),
    ],
};

pub static CHOICE_LOG: Shape = Shape {
    name: "choice log entry",
    discriminator: Some(HabitType::Choice),
    fields: &[
        FieldSpec::required("recorded_at", FieldKind::Timestamp).alias("log_date"),
        FieldSpec::required("option_id", FieldKind::Reference).immutable(),
    ],
};

/// Creation shape of a habit of the given type
pub fn habit_shape(habit_type: HabitType) -> &'static Shape {
    match habit_type {
        HabitType::Completion => &COMPLETION_HABIT,
        HabitType::Measurable => &MEASURABLE_HABIT,
        HabitType::Choice => &CHOICE_HABIT,
    }
}

/// Creation shape of a log entry of the given type
pub fn log_shape(habit_type: HabitType) -> &'static Shape {
    match habit_type {
        HabitType::Completion => &COMPLETION_LOG,
        HabitType::Measurable => &MEASURABLE_LOG,
        HabitType::Choice => &CHOICE_LOG,
    }
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Boolean => "a boolean",
            FieldKind::Timeframe => "one of day, week, month",
            FieldKind::Timestamp => "a timestamp string",
            FieldKind::Reference => "an integer id",
            FieldKind::OptionList => "a list of options",
        }
    }

    /// Parse a non-null JSON value, recording problems under `path`
    fn parse(&self, value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<FieldValue> {
        let wrong_type = Problem::WrongType { expected: self.expected() };

        match self {
            FieldKind::Text { max_len } => {
                let Some(text) = value.as_str() else {
                    errors.push(path, wrong_type);
                    return None;
                };
                if text.trim().is_empty() {
                    errors.push(path, Problem::Invalid("must not be empty".to_string()));
                    return None;
                }
                if text.chars().count() > *max_len {
                    errors.push(path, Problem::Invalid(format!("must be at most {} characters", max_len)));
                    return None;
                }
                Some(FieldValue::Text(text.to_string()))
            }
            FieldKind::Integer => match value.as_i64() {
                Some(number) => Some(FieldValue::Integer(number)),
                None => {
                    errors.push(path, wrong_type);
                    None
                }
            },
            FieldKind::Boolean => match value.as_bool() {
                Some(flag) => Some(FieldValue::Boolean(flag)),
                None => {
                    errors.push(path, wrong_type);
                    None
                }
            },
            FieldKind::Timeframe => match value.as_str().map(str::parse::<Timeframe>) {
                Some(Ok(timeframe)) => Some(FieldValue::Timeframe(timeframe)),
                Some(Err(err)) => {
                    errors.push(path, Problem::Invalid(format!("{}, expected one of day, week, month", err)));
                    None
                }
                None => {
                    errors.push(path, wrong_type);
                    None
                }
            },
            FieldKind::Timestamp => match value.as_str() {
                Some(text) => match timestamp::parse(text) {
                    Some(at) => Some(FieldValue::Timestamp(at)),
                    None => {
                        errors.push(path, Problem::Invalid(format!("'{}' is not a valid timestamp", text)));
                        None
                    }
                },
                None => {
                    errors.push(path, wrong_type);
                    None
                }
            },
            FieldKind::Reference => match value.as_i64() {
                Some(id) if id > 0 => Some(FieldValue::Reference(id)),
                Some(_) => {
                    errors.push(path, Problem::Invalid("must be a positive id".to_string()));
                    None
                }
                None => {
                    errors.push(path, wrong_type);
                    None
                }
            },
            FieldKind::OptionList => {
                let Some(items) = value.as_array() else {
                    errors.push(path, wrong_type);
                    return None;
                };
                let before = errors.issues.len();
                let mut options = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    let Some(object) = item.as_object() else {
                        errors.push(item_path, Problem::WrongType { expected: "an object" });
                        continue;
                    };
                    match CHOICE_OPTION.validate(object, Mode::Create) {
                        Ok(fields) => options.push(fields),
                        Err(nested) => {
                            for issue in nested.issues {
                                errors.push(format!("{}.{}", item_path, issue.field), issue.problem);
                            }
                        }
                    }
                }
                (errors.issues.len() == before).then_some(FieldValue::List(options))
            }
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            FieldKind::Text { max_len } => json!({"type": "string", "minLength": 1, "maxLength": max_len}),
            FieldKind::Integer => json!({"type": "integer"}),
            FieldKind::Boolean => json!({"type": "boolean"}),
            FieldKind::Timeframe => json!({
                "type": "string",
                "enum": Timeframe::ALL.iter().map(Timeframe::as_str).collect::<Vec<_>>(),
            }),
            FieldKind::Timestamp => json!({
                "type": "string",
                "description": "Timestamp, e.g. 2024-01-01 08:30:00",
            }),
            FieldKind::Reference => json!({"type": "integer", "minimum": 1}),
            FieldKind::OptionList => json!({
                "type": "array",
                "items": CHOICE_OPTION.json_schema(Mode::Create),
            }),
        }
    }
}

impl Shape {
    /// Look up the field a key refers to, by name or alias
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.matches(key))
    }

    /// Canonical names of the fields a patch may contain
    pub fn patchable_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().filter(|spec| !spec.immutable).map(|spec| spec.name)
    }

    /// Check raw input against this shape
    ///
    /// In `Mode::Create` required fields must be present. In `Mode::Patch`
    /// every field is optional and immutable fields are rejected. Unknown
    /// keys are always rejected. The `type` key, when present, must name
    /// this shape's variant.
    pub fn validate(&self, input: &Map<String, Value>, mode: Mode) -> Result<Fields, ValidationErrors> {
        let mut fields = Fields::new(self.name);
        let mut errors = ValidationErrors::new(self.name);
        let mut seen: Vec<&'static str> = Vec::with_capacity(input.len());

        for (key, value) in input {
            if key == DISCRIMINATOR {
                self.check_discriminator(value, &mut errors);
                continue;
            }

            let Some(spec) = self.field(key) else {
                errors.push(key.as_str(), Problem::Unknown);
                continue;
            };
            if mode == Mode::Patch && spec.immutable {
                errors.push(key.as_str(), Problem::Immutable);
                continue;
            }
            if seen.contains(&spec.name) {
                errors.push(key.as_str(), Problem::Duplicate);
                continue;
            }
            seen.push(spec.name);

            if value.is_null() {
                if spec.nullable {
                    fields.insert(spec.name, FieldValue::Null);
                } else {
                    errors.push(key.as_str(), Problem::NotNullable);
                }
                continue;
            }

            if let Some(parsed) = spec.kind.parse(value, key, &mut errors) {
                fields.insert(spec.name, parsed);
            }
        }

        if mode == Mode::Create {
            if self.discriminator.is_some() && !input.contains_key(DISCRIMINATOR) {
                errors.push(DISCRIMINATOR, Problem::Missing);
            }
            for spec in self.fields.iter().filter(|spec| spec.required) {
                if !seen.contains(&spec.name) {
                    errors.push(spec.name, Problem::Missing);
                }
            }
        }

        errors.into_result(fields)
    }

    fn check_discriminator(&self, value: &Value, errors: &mut ValidationErrors) {
        let Some(expected) = self.discriminator else {
            errors.push(DISCRIMINATOR, Problem::Unknown);
            return;
        };

        match value.as_str() {
            Some(text) if text == expected.as_str() => {}
            Some(text) => errors.push(
                DISCRIMINATOR,
                Problem::Invalid(format!("'{}' does not match '{}'", text, expected)),
            ),
            None => errors.push(DISCRIMINATOR, Problem::WrongType { expected: "a habit type string" }),
        }
    }

    /// JSON schema describing the input this shape accepts in `mode`
    pub fn json_schema(&self, mode: Mode) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        if let Some(kind) = self.discriminator {
            properties.insert(DISCRIMINATOR.to_string(), json!({"const": kind.as_str()}));
            if mode == Mode::Create {
                required.push(DISCRIMINATOR);
            }
        }

        for spec in self.fields {
            if mode == Mode::Patch && spec.immutable {
                continue;
            }
            let schema = if spec.nullable {
                json!({"anyOf": [spec.kind.json_schema(), {"type": "null"}]})
            } else {
                spec.kind.json_schema()
            };
            properties.insert(spec.name.to_string(), schema);
            if mode == Mode::Create && spec.required {
                required.push(spec.name);
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
