/// MCP tools exposing the habit, option and log services
///
/// Every tool takes plain JSON arguments, runs one service operation and
/// returns the presented record. Habit and log inputs use the same shapes as
/// validation, so the advertised schemas can't drift from what is accepted.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::{EntryId, HabitId, HabitType, OptionId};
use crate::mcp::protocol::ToolDefinition;
use crate::presentation;
use crate::services::{habits, logs, options, ServiceError};
use crate::storage::HabitStorage;
use crate::validation::{habit_shape, log_shape, Mode, Problem, ValidationErrors, CHOICE_OPTION};

/// Shape name used for argument errors
const ARGUMENTS: &str = "tool arguments";

/// Why a tool call produced no record
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ValidationErrors> for ToolError {
    fn from(errors: ValidationErrors) -> Self {
        ToolError::Service(ServiceError::Validation(errors))
    }
}

fn id_arg(args: &Map<String, Value>, name: &'static str) -> Result<i64, ValidationErrors> {
    match args.get(name) {
        None => Err(ValidationErrors::single(ARGUMENTS, name, Problem::Missing)),
        Some(value) => value
            .as_i64()
            .filter(|id| *id > 0)
            .ok_or_else(|| ValidationErrors::single(ARGUMENTS, name, Problem::WrongType { expected: "a positive integer id" })),
    }
}

fn object_arg<'a>(args: &'a Map<String, Value>, name: &'static str) -> Result<&'a Map<String, Value>, ValidationErrors> {
    match args.get(name) {
        None => Err(ValidationErrors::single(ARGUMENTS, name, Problem::Missing)),
        Some(value) => value
            .as_object()
            .ok_or_else(|| ValidationErrors::single(ARGUMENTS, name, Problem::WrongType { expected: "an object" })),
    }
}

fn habit_id(args: &Map<String, Value>) -> Result<HabitId, ValidationErrors> {
    id_arg(args, "habit_id").map(HabitId)
}

fn option_id(args: &Map<String, Value>) -> Result<OptionId, ValidationErrors> {
    id_arg(args, "option_id").map(OptionId)
}

fn entry_id(args: &Map<String, Value>) -> Result<EntryId, ValidationErrors> {
    id_arg(args, "entry_id").map(EntryId)
}

/// Run the named tool against `storage`
pub fn call<S: HabitStorage>(storage: &S, name: &str, args: &Map<String, Value>) -> Result<Value, ToolError> {
    let value = match name {
        "habit_create" => presentation::record(&habits::create_habit(storage, args)?)?,
        "habit_get" => presentation::record(&habits::get_habit(storage, habit_id(args)?)?)?,
        "habit_list" => presentation::records(&habits::list_habits(storage)?)?,
        "habit_update" => {
            let habit = habits::update_habit(storage, habit_id(args)?, object_arg(args, "changes")?)?;
            presentation::record(&habit)?
        }
        "habit_delete" => {
            let habit_id = habit_id(args)?;
            let deleted = habits::delete_habit(storage, habit_id)?;
            presentation::habit_deleted(habit_id, deleted)
        }
        "option_add" => {
            let option = options::add_option(storage, habit_id(args)?, object_arg(args, "option")?)?;
            presentation::record(&option)?
        }
        "option_update" => {
            let option = options::update_option(
                storage,
                habit_id(args)?,
                option_id(args)?,
                object_arg(args, "changes")?,
            )?;
            presentation::record(&option)?
        }
        "option_delete" => {
            let option_id = option_id(args)?;
            options::delete_option(storage, habit_id(args)?, option_id)?;
            presentation::option_deleted(option_id)
        }
        "option_list" => presentation::records(&options::list_options(storage, habit_id(args)?)?)?,
        "log_create" => {
            let entry = logs::create_entry(storage, habit_id(args)?, object_arg(args, "entry")?)?;
            presentation::record(&entry)?
        }
        "log_get" => presentation::record(&logs::get_entry(storage, entry_id(args)?)?)?,
        "log_list" => presentation::records(&logs::list_entries(storage, habit_id(args)?)?)?,
        "log_update" => {
            let entry = logs::update_entry(storage, entry_id(args)?, object_arg(args, "changes")?)?;
            presentation::record(&entry)?
        }
        "log_delete" => {
            let entry_id = entry_id(args)?;
            logs::delete_entry(storage, entry_id)?;
            presentation::entry_deleted(entry_id)
        }
        _ => return Err(ToolError::UnknownTool(name.to_string())),
    };

    Ok(value)
}

fn id_schema(description: &str) -> Value {
    json!({"type": "integer", "minimum": 1, "description": description})
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({"type": "object", "properties": properties, "required": required})
}

/// Schemas of every habit type in one mode
fn habit_variants(mode: Mode) -> Value {
    HabitType::ALL.iter().map(|kind| habit_shape(*kind).json_schema(mode)).collect()
}

fn log_variants(mode: Mode) -> Value {
    HabitType::ALL.iter().map(|kind| log_shape(*kind).json_schema(mode)).collect()
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Definitions advertised by `tools/list`
pub fn definitions() -> Vec<ToolDefinition> {
    let habit = || id_schema("ID of the habit");
    let option = || id_schema("ID of the choice option");
    let entry = || id_schema("ID of the log entry");

    vec![
        tool(
            "habit_create",
            "Create a completion, measurable or choice habit. Choice habits take their initial options.",
            json!({"type": "object", "oneOf": habit_variants(Mode::Create)}),
        ),
        tool(
            "habit_get",
            "Get one habit with its type-specific fields",
            object_schema(json!({"habit_id": habit()}), &["habit_id"]),
        ),
        tool("habit_list", "List all habits in creation order", object_schema(json!({}), &[])),
        tool(
            "habit_update",
            "Change some fields of a habit. The type can't change and options have their own tools.",
            object_schema(
                json!({"habit_id": habit(), "changes": {"anyOf": habit_variants(Mode::Patch)}}),
                &["habit_id", "changes"],
            ),
        ),
        tool(
            "habit_delete",
            "Delete a habit with all its options and log entries",
            object_schema(json!({"habit_id": habit()}), &["habit_id"]),
        ),
        tool(
            "option_add",
            "Add an option to a choice habit",
            object_schema(
                json!({"habit_id": habit(), "option": CHOICE_OPTION.json_schema(Mode::Create)}),
                &["habit_id", "option"],
            ),
        ),
        tool(
            "option_update",
            "Change some fields of a choice option",
            object_schema(
                json!({
                    "habit_id": habit(),
                    "option_id": option(),
                    "changes": CHOICE_OPTION.json_schema(Mode::Patch),
                }),
                &["habit_id", "option_id", "changes"],
            ),
        ),
        tool(
            "option_delete",
            "Delete a choice option that no log entry has picked",
            object_schema(json!({"habit_id": habit(), "option_id": option()}), &["habit_id", "option_id"]),
        ),
        tool(
            "option_list",
            "List the options of a choice habit in order",
            object_schema(json!({"habit_id": habit()}), &["habit_id"]),
        ),
        tool(
            "log_create",
            "Log an occurrence of a habit. The entry's type must equal the habit's type.",
            object_schema(
                json!({"habit_id": habit(), "entry": {"oneOf": log_variants(Mode::Create)}}),
                &["habit_id", "entry"],
            ),
        ),
        tool(
            "log_get",
            "Get one log entry; choice entries include the picked option",
            object_schema(json!({"entry_id": entry()}), &["entry_id"]),
        ),
        tool(
            "log_list",
            "List the log entries of a habit in creation order",
            object_schema(json!({"habit_id": habit()}), &["habit_id"]),
        ),
        tool(
            "log_update",
            "Change the timestamp or value of a log entry",
            object_schema(
                json!({"entry_id": entry(), "changes": {"anyOf": log_variants(Mode::Patch)}}),
                &["entry_id", "changes"],
            ),
        ),
        tool(
            "log_delete",
            "Delete a log entry",
            object_schema(json!({"entry_id": entry()}), &["entry_id"]),
        ),
    ]
}
