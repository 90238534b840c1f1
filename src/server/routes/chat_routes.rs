//! Chat transcript routing
//!
//! Handles transcript management commands:
//! get_chats, get_chat, save_chat, delete_chat, new_chat, clear_chats,
//! get_current_chat, set_current_chat

use crate::commands;
use crate::models::Chat;
use serde_json::Value;

use super::{get_arg, route_sync, route_unit, ServerAppState};

/// Check if a command is a chat route
pub fn is_chat_command(cmd: &str) -> bool {
    matches!(
        cmd,
        "get_chats"
            | "get_chat"
            | "save_chat"
            | "delete_chat"
            | "new_chat"
            | "clear_chats"
            | "get_current_chat"
            | "set_current_chat"
    )
}

/// Route chat transcript commands
pub async fn route_chat_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "get_chats" => route_sync!(commands::get_chats(&state.chat_store)),

        "get_chat" => {
            let chat_id: String = get_arg(&args, "chatId")?;
            route_sync!(commands::get_chat(&state.chat_store, &chat_id))
        }

        "save_chat" => {
            let chat: Chat = get_arg(&args, "chat")?;
            route_sync!(commands::save_chat(&state.chat_store, chat))
        }

        "delete_chat" => {
            let chat_id: String = get_arg(&args, "chatId")?;
            route_unit!(commands::delete_chat(&state.chat_store, &chat_id))
        }

        "new_chat" => route_sync!(commands::new_chat(&state.chat_store)),

        "clear_chats" => route_unit!(commands::clear_chats(&state.chat_store)),

        "get_current_chat" => route_sync!(commands::get_current_chat(&state.chat_store)),

        "set_current_chat" => {
            let chat_id: String = get_arg(&args, "chatId")?;
            route_unit!(commands::set_current_chat(&state.chat_store, &chat_id))
        }

        _ => Err(format!("Unknown chat route: {}", cmd)),
    }
}
