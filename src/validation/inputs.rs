/// Typed constructors for validated input
///
/// These functions run raw JSON objects through the matching `Shape` and turn
/// the resulting `Fields` into the domain's creation and patch values.

use serde_json::{Map, Value};

use crate::domain::{
    ChoiceOptionPatch, HabitKindPatch, HabitPatch, HabitType, LogEntryPatch, LogKindPatch,
    NewChoiceOption, NewHabit, NewHabitKind, NewLogEntry, NewLogKind, Patch,
};
use crate::validation::{
    habit_shape, log_shape, Fields, FromField, Mode, Problem, Shape, ValidationErrors, CHOICE_OPTION,
    DISCRIMINATOR,
};

/// Read the optional `type` key of an input
///
/// `what` names the input in the error ("habit", "log entry").
pub fn discriminator(input: &Map<String, Value>, what: &'static str) -> Result<Option<HabitType>, ValidationErrors> {
    match input.get(DISCRIMINATOR) {
        None => Ok(None),
        Some(Value::String(text)) => text.parse().map(Some).map_err(|err| {
            ValidationErrors::single(
                what,
                DISCRIMINATOR,
                Problem::Invalid(format!("{}, expected one of completion, measurable, choice", err)),
            )
        }),
        Some(_) => Err(ValidationErrors::single(
            what,
            DISCRIMINATOR,
            Problem::WrongType { expected: "a habit type string" },
        )),
    }
}

fn required_discriminator(input: &Map<String, Value>, what: &'static str) -> Result<HabitType, ValidationErrors> {
    discriminator(input, what)?
        .ok_or_else(|| ValidationErrors::single(what, DISCRIMINATOR, Problem::Missing))
}

/// Take a field that create-mode validation has already proven present
fn required<T: FromField>(fields: &mut Fields, shape: &Shape, name: &'static str) -> Result<T, ValidationErrors> {
    match fields.take(name)? {
        Patch::Set(value) => Ok(value),
        Patch::Null => Err(ValidationErrors::single(shape.name, name, Problem::NotNullable)),
        Patch::Unset => Err(ValidationErrors::single(shape.name, name, Problem::Missing)),
    }
}

fn option_from_fields(mut fields: Fields) -> Result<NewChoiceOption, ValidationErrors> {
    Ok(NewChoiceOption {
        option_text: required(&mut fields, &CHOICE_OPTION, "option_text")?,
        color: fields.take("color")?.into_option(),
        icon: fields.take("icon")?.into_option(),
    })
}

/// Validate a habit creation input; its `type` selects the variant
pub fn new_habit(input: &Map<String, Value>) -> Result<NewHabit, ValidationErrors> {
    let habit_type = required_discriminator(input, "habit")?;
    let shape = habit_shape(habit_type);
    let mut fields = shape.validate(input, Mode::Create)?;

    let name = required(&mut fields, shape, "name")?;
    let kind = match habit_type {
        HabitType::Completion => NewHabitKind::Completion {
            completion_target: required(&mut fields, shape, "completion_target")?,
            target_timeframe: required(&mut fields, shape, "target_timeframe")?,
        },
        HabitType::Measurable => NewHabitKind::Measurable {
            target: required(&mut fields, shape, "target")?,
            unit: required(&mut fields, shape, "unit")?,
            period: fields.take("completion_target")?.into_option(),
        },
        HabitType::Choice => {
            let items: Vec<Fields> = required(&mut fields, shape, "options")?;
            let options = items
                .into_iter()
                .map(option_from_fields)
                .collect::<Result<Vec<_>, _>>()?;
            NewHabitKind::Choice { options }
        }
    };

    Ok(NewHabit { name, kind })
}

/// Validate a habit patch against the stored habit's variant
///
/// Callers check the `type` key and the `options` key beforehand, since
/// those map to their own error kinds.
pub fn habit_patch(input: &Map<String, Value>, stored: HabitType) -> Result<HabitPatch, ValidationErrors> {
    let mut fields = habit_shape(stored).validate(input, Mode::Patch)?;

    let name = fields.take("name")?;
    let kind = match stored {
        HabitType::Completion => HabitKindPatch::Completion {
            completion_target: fields.take("completion_target")?,
            target_timeframe: fields.take("target_timeframe")?,
        },
        HabitType::Measurable => HabitKindPatch::Measurable {
            target: fields.take("target")?,
            unit: fields.take("unit")?,
            period: fields.take("completion_target")?,
        },
        HabitType::Choice => HabitKindPatch::Choice,
    };

    Ok(HabitPatch { name, kind })
}

pub fn new_option(input: &Map<String, Value>) -> Result<NewChoiceOption, ValidationErrors> {
    option_from_fields(CHOICE_OPTION.validate(input, Mode::Create)?)
}

pub fn option_patch(input: &Map<String, Value>) -> Result<ChoiceOptionPatch, ValidationErrors> {
    let mut fields = CHOICE_OPTION.validate(input, Mode::Patch)?;
    Ok(ChoiceOptionPatch {
        option_text: fields.take("option_text")?,
        color: fields.take("color")?,
        icon: fields.take("icon")?,
    })
}

/// Validate a log entry creation input
///
/// The caller states the entry's type explicitly; whether it matches the
/// habit is checked by the log service.
pub fn new_log_entry(input: &Map<String, Value>) -> Result<NewLogEntry, ValidationErrors> {
    let habit_type = required_discriminator(input, "log entry")?;
    let shape = log_shape(habit_type);
    let mut fields = shape.validate(input, Mode::Create)?;

    let recorded_at = required(&mut fields, shape, "recorded_at")?;
    let kind = match habit_type {
        HabitType::Completion => NewLogKind::Completion {
            status: required(&mut fields, shape, "status")?,
        },
        HabitType::Measurable => NewLogKind::Measurable {
            value: required(&mut fields, shape, "amount")?,
        },
        HabitType::Choice => NewLogKind::Choice {
            option_id: required(&mut fields, shape, "option_id")?,
        },
    };

    Ok(NewLogEntry { recorded_at, kind })
}

pub fn log_entry_patch(input: &Map<String, Value>, stored: HabitType) -> Result<LogEntryPatch, ValidationErrors> {
    let mut fields = log_shape(stored).validate(input, Mode::Patch)?;

    let recorded_at = fields.take("recorded_at")?;
    let kind = match stored {
        HabitType::Completion => LogKindPatch::Completion { status: fields.take("status")? },
        HabitType::Measurable => LogKindPatch::Measurable { value: fields.take("amount")? },
        HabitType::Choice => LogKindPatch::Choice,
    };

    Ok(LogEntryPatch { recorded_at, kind })
}
