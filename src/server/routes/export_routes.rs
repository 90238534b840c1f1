//! Document export routing
//!
//! Handles export commands: export_document

use crate::commands;
use crate::models::ExportDocumentRequest;
use serde_json::Value;

use super::{get_arg, get_opt_arg, route_sync, ServerAppState};

/// Check if a command is an export route
pub fn is_export_command(cmd: &str) -> bool {
    matches!(cmd, "export_document")
}

/// Route export commands
pub async fn route_export_command(
    cmd: &str,
    args: Value,
    _state: &ServerAppState,
) -> Result<Value, String> {
    match cmd {
        "export_document" => {
            let message_id: String = get_arg(&args, "messageId")?;
            let content: String = get_arg(&args, "content")?;
            let title: Option<String> = get_opt_arg(&args, "title")?;

            let request = ExportDocumentRequest {
                message_id,
                content,
                title,
            };

            route_sync!(commands::export_document(request))
        }

        _ => Err(format!("Unknown export route: {}", cmd)),
    }
}
