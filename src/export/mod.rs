//! Document reconstruction for chat exports
//!
//! Converts a cleaned assistant message body into a fixed-style paginated
//! document. Two renderers sit behind one trait: the structured renderer
//! (tables, headings, emphasis, code, lists) and a plain-text fallback that
//! always succeeds. Callers go through `render_with_fallback`.

pub mod markup;
pub mod paginate;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use markup::{build_document_body, DocBlock, Span, SpanStyle};
pub use paginate::{page_count, PlainTextRenderer, StructuredRenderer, PAGE_HEIGHT, PAGE_WIDTH};

/// Error type for document rendering
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("measurement failed: {0}")]
    Measurement(String),
}

/// Kind of a rendered page line, used by consumers to pick fixed styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Title,
    Timestamp,
    Heading1,
    Heading2,
    Heading3,
    Body,
    ListItem,
    Code,
    TableHeader,
    TableRow,
}

/// One positioned line on a page. `offset` is relative to the top of the
/// page the line belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLine {
    pub offset: f64,
    pub kind: LineKind,
    pub text: String,
}

/// One fixed-size page of the export artifact
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub lines: Vec<PageLine>,
}

/// The export artifact: a sequence of fixed-size pages sliced from the
/// rendered content without gap or overlap
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Total rendered height in page units
    pub total_height: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl PaginatedDocument {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }
}

/// Render markup to paginated output
pub trait DocumentRenderer {
    fn render(
        &self,
        title: &str,
        content: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<PaginatedDocument, RenderError>;
}

/// Render with the structured renderer, falling back to plain-text
/// pagination if structured rendering fails. The fallback is total, so this
/// always produces a document; the failure is logged, not surfaced.
pub fn render_with_fallback(
    title: &str,
    content: &str,
    generated_at: DateTime<Utc>,
) -> PaginatedDocument {
    match StructuredRenderer.render(title, content, generated_at) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("Structured rendering failed, using plain-text fallback: {}", e);
            PlainTextRenderer
                .render(title, content, generated_at)
                .expect("plain-text fallback is infallible")
        }
    }
}

/// Filename fragment contract: documents are labeled with the first 8
/// characters of the originating message id
pub fn suggested_filename(message_id: &str) -> String {
    let fragment: String = message_id.chars().take(8).collect();
    format!("response-{}.pdf", fragment)
}
