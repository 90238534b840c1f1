//! Command routing modules
//!
//! This module organizes command routing into focused sub-modules by domain:
//! - chat_routes: transcript management commands
//! - message_routes: send pipeline and extraction commands
//! - export_routes: document export commands

pub mod chat_routes;
pub mod export_routes;
pub mod message_routes;

use serde_json::Value;

use super::ServerAppState;

/// Extract a required argument from JSON args
pub fn get_arg<T: serde::de::DeserializeOwned>(args: &Value, name: &str) -> Result<T, String> {
    serde_json::from_value(
        args.get(name)
            .ok_or_else(|| format!("Missing argument: {}", name))?
            .clone(),
    )
    .map_err(|e| format!("Invalid argument {}: {}", name, e))
}

/// Extract an optional argument from JSON args
pub fn get_opt_arg<T: serde::de::DeserializeOwned>(
    args: &Value,
    name: &str,
) -> Result<Option<T>, String> {
    match args.get(name) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("Invalid argument {}: {}", name, e)),
        _ => Ok(None),
    }
}

/// Routes a simple async command: awaits the handler, serializes the result
#[macro_export]
macro_rules! route_async {
    ($handler:expr) => {{
        let result = $handler.await?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

/// Routes a sync command
#[macro_export]
macro_rules! route_sync {
    ($handler:expr) => {{
        let result = $handler?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }};
}

/// Routes a command that returns ()
#[macro_export]
macro_rules! route_unit {
    ($handler:expr) => {{
        $handler?;
        Ok(serde_json::Value::Null)
    }};
}

// Re-export macros for use in route modules
pub use route_async;
pub use route_sync;
pub use route_unit;

/// Route a command to its implementation by dispatching to the appropriate
/// sub-router
pub async fn route_command(
    cmd: &str,
    args: Value,
    state: &ServerAppState,
) -> Result<Value, String> {
    if chat_routes::is_chat_command(cmd) {
        return chat_routes::route_chat_command(cmd, args, state).await;
    }

    if message_routes::is_message_command(cmd) {
        return message_routes::route_message_command(cmd, args, state).await;
    }

    if export_routes::is_export_command(cmd) {
        return export_routes::route_export_command(cmd, args, state).await;
    }

    Err(format!("Unknown command: {}", cmd))
}
