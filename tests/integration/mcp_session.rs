/// End-to-end MCP session driven through JSON-RPC lines

use habit_tracker::mcp::protocol::error_codes;
use habit_tracker::mcp::McpServer;
use habit_tracker::*;
use serde_json::{json, Value};

async fn server() -> McpServer {
    let habit_tracker = HabitTrackerServer::in_memory().await.expect("Failed to create server");
    McpServer::new(habit_tracker)
}

fn send(server: &mut McpServer, id: i64, method: &str, params: Value) -> Value {
    let line = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string();
    let response = server.handle_line(&line).expect("Request should get a response");
    serde_json::to_value(response).expect("Failed to encode response")
}

/// Call a tool and return (is_error, parsed text content)
fn call(server: &mut McpServer, id: i64, name: &str, arguments: Value) -> (bool, Value) {
    let response = send(server, id, "tools/call", json!({"name": name, "arguments": arguments}));
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().expect("Tool result should carry text");
    let is_error = result["isError"].as_bool().expect("Tool result should flag errors");
    (is_error, serde_json::from_str(text).expect("Tool text should be JSON"))
}

#[cfg(test)]
mod mcp_session_tests {
    use super::*;

    #[tokio::test]
    async fn test_mood_tracking_session() {
        let mut server = server().await;

        let response = send(&mut server, 1, "initialize", json!({"protocolVersion": "2024-11-05"}));
        assert_eq!(response["result"]["serverInfo"]["name"], json!("Habit Tracker"));
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
        assert!(server.is_initialized());

        let (is_error, habit) = call(
            &mut server,
            2,
            "habit_create",
            json!({"type": "choice", "name": "Mood", "options": [{"option_text": "Happy"}, {"option_text": "Sad"}]}),
        );
        assert!(!is_error);
        assert_eq!(habit["id"], json!(1));

        let (is_error, entry) = call(
            &mut server,
            3,
            "log_create",
            json!({"habit_id": 1, "entry": {"type": "choice", "recorded_at": "2024-05-01 21:00:00", "option_id": 2}}),
        );
        assert!(!is_error);
        assert_eq!(entry["option"]["option_text"], json!("Sad"));

        let (is_error, failure) = call(&mut server, 4, "option_delete", json!({"habit_id": 1, "option_id": 2}));
        assert!(is_error);
        assert_eq!(failure["error"]["kind"], json!("invalid_operation"));
        assert_eq!(failure["error"]["code"], json!(error_codes::INVALID_OPERATION));

        let (is_error, entries) = call(&mut server, 5, "log_list", json!({"habit_id": 1}));
        assert!(!is_error);
        assert_eq!(entries.as_array().map(Vec::len), Some(1));

        let (is_error, deleted) = call(&mut server, 6, "habit_delete", json!({"habit_id": 1}));
        assert!(!is_error);
        assert_eq!(deleted["deleted_options"], json!(2));
        assert_eq!(deleted["deleted_entries"], json!(1));

        let (is_error, failure) = call(&mut server, 7, "habit_get", json!({"habit_id": 1}));
        assert!(is_error);
        assert_eq!(failure["error"]["message"], json!("Habit not found"));
    }

    #[tokio::test]
    async fn test_validation_failure_lists_fields() {
        let mut server = server().await;

        let (is_error, failure) = call(
            &mut server,
            1,
            "habit_create",
            json!({"type": "measurable", "name": "", "target": "lots"}),
        );

        assert!(is_error);
        assert_eq!(failure["error"]["kind"], json!("validation_failure"));
        let mut fields: Vec<&str> = failure["error"]["fields"]
            .as_array()
            .expect("fields should be listed")
            .iter()
            .filter_map(|issue| issue["field"].as_str())
            .collect();
        fields.sort();
        assert_eq!(fields, ["name", "target", "unit"]);
    }

    #[tokio::test]
    async fn test_habit_update_through_tools() {
        let mut server = server().await;
        call(
            &mut server,
            1,
            "habit_create",
            json!({"type": "completion", "name": "Medicine", "completion_target": 1, "target_timeframe": "day"}),
        );

        let (is_error, habit) = call(
            &mut server,
            2,
            "habit_update",
            json!({"habit_id": 1, "changes": {"target_timeframe": "week"}}),
        );
        assert!(!is_error);
        assert_eq!(habit["target_timeframe"], json!("week"));
        assert_eq!(habit["completion_target"], json!(1));

        let (is_error, failure) = call(
            &mut server,
            3,
            "habit_update",
            json!({"habit_id": 1, "changes": {"type": "choice"}}),
        );
        assert!(is_error);
        assert_eq!(failure["error"]["kind"], json!("type_mismatch"));
    }

    #[tokio::test]
    async fn test_unknown_method_and_tool() {
        let mut server = server().await;

        let response = send(&mut server, 1, "habits/explode", json!({}));
        assert_eq!(response["error"]["code"], json!(error_codes::METHOD_NOT_FOUND));

        let response = send(&mut server, 2, "tools/call", json!({"name": "habit_explode", "arguments": {}}));
        assert_eq!(response["error"]["code"], json!(error_codes::INVALID_PARAMS));
    }
}
