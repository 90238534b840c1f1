//! Message pipeline routing
//!
//! Handles the send pipeline and extraction commands:
//! send_message, extract_suggestions

use crate::commands;
use crate::models::SendMessageRequest;
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_async, route_sync, ServerAppState};

/// Check if a command is a message route
pub fn is_message_command(cmd: &str) -> bool {
    matches!(cmd, "send_message" | "extract_suggestions")
}

/// Route message pipeline commands
pub async fn route_message_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "send_message" => {
            let chat_id: String = get_arg(&args, "chatId")?;
            let message: String = get_arg(&args, "message")?;
            let country: Option<String> = get_opt_arg(&args, "country")?;
            let language: Option<String> = get_opt_arg(&args, "language")?;

            let request = SendMessageRequest {
                chat_id,
                message,
                country,
                language,
            };

            route_async!(commands::send_message(
                &state.chat_store,
                &state.webhook,
                request
            ))
        }

        "extract_suggestions" => {
            let content: String = get_arg(&args, "content")?;
            let role: Option<String> = get_opt_arg(&args, "role")?;
            let role = role.unwrap_or_else(|| "assistant".to_string());

            route_sync!(commands::extract_suggestions(&role, &content))
        }

        _ => Err(format!("Unknown message route: {}", cmd)),
    }
}
