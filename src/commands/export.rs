// Document export command

use crate::export::{render_with_fallback, suggested_filename, PaginatedDocument};
use crate::models::ExportDocumentRequest;
use chrono::Utc;
use serde::Serialize;

/// Default document title when the request does not provide one
const DEFAULT_TITLE: &str = "Assistant Response";

/// Export command result: the paginated document plus its filename label
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub suggested_filename: String,
    pub document: PaginatedDocument,
}

/// Build a paginated document from one message body. Rendering cannot fail
/// from the caller's point of view: a structured-render failure silently
/// produces the plain-text fallback document instead.
pub fn export_document(request: ExportDocumentRequest) -> Result<ExportResult, String> {
    let title = request.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let document = render_with_fallback(&title, &request.content, Utc::now());

    log::debug!(
        "Exported document for message {}: {} pages",
        request.message_id,
        document.total_pages()
    );

    Ok(ExportResult {
        suggested_filename: suggested_filename(&request.message_id),
        document,
    })
}
