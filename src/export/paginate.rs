// Measurement and pagination
//
// Blocks are laid out top-to-bottom with fixed metrics (A4-equivalent
// geometry: 210 wide, page break every 295 units of rendered height), then
// sliced into consecutive vertical bands. The plain-text fallback paginates
// with a cursor instead and succeeds for any finite input.

use super::markup::{build_document_body, spans_to_text, DocBlock};
use super::{DocumentRenderer, LineKind, Page, PageLine, PaginatedDocument, RenderError};
use crate::parsers::normalize::unescape_entities;
use chrono::{DateTime, Utc};

/// Content width in page units (A4 width in mm)
pub const PAGE_WIDTH: f64 = 210.0;

/// Page break interval in page units (A4 height in mm, as used for slicing)
pub const PAGE_HEIGHT: f64 = 295.0;

// Fixed line metrics for the structured renderer
const TITLE_HEIGHT: f64 = 12.0;
const TIMESTAMP_HEIGHT: f64 = 12.0;
const HEADING_HEIGHTS: [f64; 3] = [14.0, 12.0, 10.0];
const HEADING_WRAPS: [usize; 3] = [48, 56, 64];
const BODY_LINE_HEIGHT: f64 = 6.0;
const BODY_WRAP: usize = 90;
const CODE_LINE_HEIGHT: f64 = 5.0;
const CODE_WRAP: usize = 96;
const LIST_WRAP: usize = 88;
const TABLE_ROW_HEIGHT: f64 = 8.0;
const BLOCK_SPACING: f64 = 4.0;

// Fixed metrics for the plain-text fallback
const FALLBACK_MARGIN: f64 = 20.0;
const FALLBACK_WRAP: usize = 80;
const FALLBACK_LINE_HEIGHT: f64 = 6.0;

/// Upper bound on produced pages; beyond this the measurement is treated as
/// failed and the caller falls back to plain text
const MAX_PAGES: usize = 10_000;

/// Number of fixed-size pages needed for the given rendered height
pub fn page_count(total_height: f64) -> usize {
    (total_height / PAGE_HEIGHT).ceil().max(1.0) as usize
}

/// A line positioned at an absolute vertical offset, before page slicing
struct MeasuredLine {
    y: f64,
    kind: LineKind,
    text: String,
}

/// Structured renderer: block model -> measured lines -> page bands
pub struct StructuredRenderer;

impl DocumentRenderer for StructuredRenderer {
    fn render(
        &self,
        title: &str,
        content: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<PaginatedDocument, RenderError> {
        let blocks = build_document_body(content);
        let (lines, total_height) = layout(title, generated_at, &blocks);

        if !total_height.is_finite() {
            return Err(RenderError::Measurement(
                "non-finite rendered height".to_string(),
            ));
        }
        let total_pages = page_count(total_height);
        if total_pages > MAX_PAGES {
            return Err(RenderError::Measurement(format!(
                "{} pages exceeds the {} page limit",
                total_pages, MAX_PAGES
            )));
        }

        Ok(PaginatedDocument {
            title: title.to_string(),
            generated_at,
            total_height,
            page_height: PAGE_HEIGHT,
            pages: slice_into_pages(lines, total_pages),
        })
    }
}

/// Lay out the fixed header block and every document block into positioned
/// lines. Returns the lines and the total rendered height.
fn layout(
    title: &str,
    generated_at: DateTime<Utc>,
    blocks: &[DocBlock],
) -> (Vec<MeasuredLine>, f64) {
    let mut lines: Vec<MeasuredLine> = Vec::new();
    let mut y = 0.0;

    let mut emit = |y: &mut f64, kind: LineKind, height: f64, text: String| {
        lines.push(MeasuredLine { y: *y, kind, text });
        *y += height;
    };

    // Fixed header: document title + generation timestamp
    emit(&mut y, LineKind::Title, TITLE_HEIGHT, title.to_string());
    emit(
        &mut y,
        LineKind::Timestamp,
        TIMESTAMP_HEIGHT,
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    );

    for block in blocks {
        match block {
            DocBlock::Heading { level, spans } => {
                let idx = (*level as usize - 1).min(2);
                let kind = match *level {
                    1 => LineKind::Heading1,
                    2 => LineKind::Heading2,
                    _ => LineKind::Heading3,
                };
                let text = unescape_entities(&spans_to_text(spans));
                for wrapped in wrap_text(&text, HEADING_WRAPS[idx]) {
                    emit(&mut y, kind, HEADING_HEIGHTS[idx], wrapped);
                }
            }
            DocBlock::Paragraph { lines: para_lines } => {
                for para_line in para_lines {
                    let text = unescape_entities(&spans_to_text(para_line));
                    for wrapped in wrap_text(&text, BODY_WRAP) {
                        emit(&mut y, LineKind::Body, BODY_LINE_HEIGHT, wrapped);
                    }
                }
                y += BLOCK_SPACING;
            }
            DocBlock::Table { headers, rows } => {
                emit(
                    &mut y,
                    LineKind::TableHeader,
                    TABLE_ROW_HEIGHT,
                    join_cells(headers),
                );
                for row in rows {
                    emit(&mut y, LineKind::TableRow, TABLE_ROW_HEIGHT, join_cells(row));
                }
                y += BLOCK_SPACING;
            }
            DocBlock::Code { text } => {
                for code_line in text.split('\n') {
                    for wrapped in wrap_text(&unescape_entities(code_line), CODE_WRAP) {
                        emit(&mut y, LineKind::Code, CODE_LINE_HEIGHT, wrapped);
                    }
                }
                y += BLOCK_SPACING;
            }
            DocBlock::List { items } => {
                for item in items {
                    let text = unescape_entities(&spans_to_text(item));
                    for wrapped in wrap_text(&text, LIST_WRAP) {
                        emit(&mut y, LineKind::ListItem, BODY_LINE_HEIGHT, wrapped);
                    }
                }
                y += BLOCK_SPACING;
            }
        }
    }

    (lines, y)
}

fn join_cells(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| unescape_entities(cell))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Slice measured lines into consecutive vertical bands of one page height
/// each. A line belongs to the band containing its top offset, so bands
/// tile without gap or overlap.
fn slice_into_pages(lines: Vec<MeasuredLine>, total_pages: usize) -> Vec<Page> {
    let mut pages: Vec<Page> = (0..total_pages)
        .map(|i| Page {
            number: i + 1,
            lines: Vec::new(),
        })
        .collect();

    for line in lines {
        let index = ((line.y / PAGE_HEIGHT) as usize).min(total_pages.saturating_sub(1));
        pages[index].lines.push(PageLine {
            offset: line.y - index as f64 * PAGE_HEIGHT,
            kind: line.kind,
            text: line.text,
        });
    }

    pages
}

/// Plain-text fallback: fixed margins, fixed font size, word-wrapped lines,
/// a new page whenever the cursor passes the bottom margin
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(
        &self,
        title: &str,
        content: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<PaginatedDocument, RenderError> {
        let mut pages: Vec<Page> = vec![Page {
            number: 1,
            lines: Vec::new(),
        }];
        let mut y = 30.0;

        pages[0].lines.push(PageLine {
            offset: y,
            kind: LineKind::Title,
            text: title.to_string(),
        });
        y += 10.0;
        pages[0].lines.push(PageLine {
            offset: y,
            kind: LineKind::Timestamp,
            text: format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        });
        y += 20.0;

        for raw_line in content.split('\n') {
            for wrapped in wrap_text(raw_line, FALLBACK_WRAP) {
                if y > PAGE_HEIGHT - FALLBACK_MARGIN {
                    pages.push(Page {
                        number: pages.len() + 1,
                        lines: Vec::new(),
                    });
                    y = FALLBACK_MARGIN;
                }
                let page = pages.last_mut().expect("at least one page");
                page.lines.push(PageLine {
                    offset: y,
                    kind: LineKind::Body,
                    text: wrapped,
                });
                y += FALLBACK_LINE_HEIGHT;
            }
        }

        let total_height = (pages.len() - 1) as f64 * PAGE_HEIGHT + y;
        Ok(PaginatedDocument {
            title: title.to_string(),
            generated_at,
            total_height,
            page_height: PAGE_HEIGHT,
            pages,
        })
    }
}

/// Greedy word wrap at a fixed character width; words longer than the
/// width are hard-split. An empty input yields one empty line so vertical
/// spacing is preserved.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                lines.push(chunk.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
