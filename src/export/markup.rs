// Markdown-like content -> block/span document model
//
// The transformation order is a behavior contract: escape, tables,
// headings, emphasis, code, lists, paragraphs. Each step only sees what the
// previous steps left untransformed.

use crate::parsers::normalize::escape_markup;
use regex::Regex;
use std::sync::OnceLock;

/// Inline span style inside headings, paragraphs, and list items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    Code,
}

/// A run of text with one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A block-level element of the reconstructed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBlock {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph { lines: Vec<Vec<Span>> },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Code { text: String },
    List { items: Vec<Vec<Span>> },
}

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
}

fn italic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").unwrap())
}

fn inline_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap())
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\|[-:]+(\|[-:]+)*\|?$").unwrap())
}

/// Build the document body for one message. The input is raw message
/// content; escaping happens here so callers cannot feed pre-built markup
/// into the block model.
pub fn build_document_body(content: &str) -> Vec<DocBlock> {
    let escaped = escape_markup(content);
    let lines: Vec<&str> = escaped.split('\n').collect();

    let mut blocks: Vec<DocBlock> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        // Fenced code block: consume until the closing fence (or EOF)
        if trimmed.starts_with("```") {
            flush_paragraph(&mut blocks, &mut paragraph);
            let mut code_lines: Vec<&str> = Vec::new();
            let opener_rest = trimmed.trim_start_matches("```");
            if !opener_rest.is_empty() {
                code_lines.push(opener_rest);
            }
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("```") {
                code_lines.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence if present
            if i < lines.len() {
                i += 1;
            }
            blocks.push(DocBlock::Code {
                text: code_lines.join("\n").trim().to_string(),
            });
            continue;
        }

        // Pipe table: a contiguous run of lines each containing `|`
        if trimmed.contains('|') && !trimmed.is_empty() {
            let start = i;
            let mut end = i;
            while end < lines.len() && lines[end].trim().contains('|') && !lines[end].trim().is_empty()
            {
                end += 1;
            }
            let run = &lines[start..end];
            if let Some(table) = parse_table(run) {
                flush_paragraph(&mut blocks, &mut paragraph);
                blocks.push(table);
                i = end;
                continue;
            }
            // Not a valid table: the lines fall through to paragraph text
            for table_line in run {
                push_paragraph_line(&mut blocks, &mut paragraph, table_line);
            }
            i = end;
            continue;
        }

        // Headings: 1-3 leading `#` followed by a space, anchored at the
        // start of the line
        if let Some(heading) = parse_heading(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            blocks.push(heading);
            i += 1;
            continue;
        }

        // Bullet list: consecutive `* ` lines group into one list
        if line.starts_with("* ") {
            flush_paragraph(&mut blocks, &mut paragraph);
            let mut items: Vec<Vec<Span>> = Vec::new();
            while i < lines.len() && lines[i].starts_with("* ") {
                items.push(parse_spans(&lines[i][2..]));
                i += 1;
            }
            blocks.push(DocBlock::List { items });
            continue;
        }

        push_paragraph_line(&mut blocks, &mut paragraph, line);
        i += 1;
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

/// Blank lines close a paragraph; non-blank lines accumulate as soft breaks
fn push_paragraph_line(blocks: &mut Vec<DocBlock>, paragraph: &mut Vec<String>, line: &str) {
    if line.trim().is_empty() {
        flush_paragraph(blocks, paragraph);
    } else {
        paragraph.push(line.to_string());
    }
}

fn flush_paragraph(blocks: &mut Vec<DocBlock>, paragraph: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    let lines = paragraph.drain(..).map(|line| parse_spans(&line)).collect();
    blocks.push(DocBlock::Paragraph { lines });
}

fn parse_heading(line: &str) -> Option<DocBlock> {
    for (prefix, level) in [("### ", 3u8), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(DocBlock::Heading {
                level,
                spans: parse_spans(rest),
            });
        }
    }
    None
}

/// Parse a run of `|` lines into a table.
///
/// The separator line (only `|`, `-`, `:` and whitespace) splits headers
/// from data; without one the first line is the header. Boundary pipes
/// produce empty edge cells which are dropped; short data rows pad to the
/// header width and long rows truncate to it. Returns None when the run
/// does not amount to a table (fewer than two lines, no headers, or no data
/// rows), in which case the caller keeps the lines as plain text.
fn parse_table(run: &[&str]) -> Option<DocBlock> {
    let lines: Vec<&str> = run
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && line.contains('|'))
        .collect();

    if lines.len() < 2 {
        return None;
    }

    let mut separator_index: Option<usize> = None;
    for (idx, line) in lines.iter().enumerate() {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if separator_regex().is_match(&compact) {
            separator_index = Some(idx);
            break;
        }
    }

    // Separator absent (or leading): first line is the header row
    let (header_line, data_lines): (&str, &[&str]) = match separator_index {
        Some(idx) if idx > 0 => (lines[0], &lines[idx + 1..]),
        _ => (lines[0], &lines[1..]),
    };

    let headers: Vec<String> = header_line
        .split('|')
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();

    let mut rows: Vec<Vec<String>> = data_lines
        .iter()
        .map(|line| {
            let cells: Vec<String> = line.split('|').map(|cell| cell.trim().to_string()).collect();
            strip_boundary_cells(cells)
        })
        .filter(|row| !row.is_empty() && row.iter().any(|cell| !cell.is_empty()))
        .collect();

    if headers.is_empty() || rows.is_empty() {
        return None;
    }

    for row in &mut rows {
        while row.len() < headers.len() {
            row.push(String::new());
        }
        row.truncate(headers.len());
    }

    Some(DocBlock::Table { headers, rows })
}

/// Drop the empty edge cells produced by leading/trailing boundary pipes
fn strip_boundary_cells(mut cells: Vec<String>) -> Vec<String> {
    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    cells
}

/// Parse inline emphasis into spans: `**bold**` first, then `*italic*`,
/// then single-backtick code spans inside the remaining plain text
pub fn parse_spans(text: &str) -> Vec<Span> {
    let bold = split_by_regex(text, bold_regex(), SpanStyle::Bold);
    let italic = apply_to_plain(bold, italic_regex(), SpanStyle::Italic);
    apply_to_plain(italic, inline_code_regex(), SpanStyle::Code)
}

fn apply_to_plain(spans: Vec<Span>, re: &Regex, style: SpanStyle) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.style == SpanStyle::Plain {
            out.extend(split_by_regex(&span.text, re, style));
        } else {
            out.push(span);
        }
    }
    out
}

fn split_by_regex(text: &str, re: &Regex, style: SpanStyle) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for cap in re.captures_iter(text) {
        let whole = cap.get(0).unwrap();
        if whole.start() > last {
            spans.push(Span::new(&text[last..whole.start()], SpanStyle::Plain));
        }
        spans.push(Span::new(cap.get(1).unwrap().as_str(), style));
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::new(&text[last..], SpanStyle::Plain));
    }
    spans
}

/// Flatten spans back into display text (styles dropped)
pub fn spans_to_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> (Vec<String>, Vec<Vec<String>>) {
        let blocks = build_document_body(content);
        for block in blocks {
            if let DocBlock::Table { headers, rows } = block {
                return (headers, rows);
            }
        }
        panic!("no table block produced");
    }

    #[test]
    fn test_simple_table() {
        let (headers, rows) = table("| A | B |\n|---|---|\n| 1 | 2 |");
        assert_eq!(headers, vec!["A", "B"]);
        assert_eq!(rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_table_without_separator() {
        let (headers, rows) = table("| Name | Score |\n| alpha | 10 |\n| beta | 20 |");
        assert_eq!(headers, vec!["Name", "Score"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["alpha", "10"]);
    }

    #[test]
    fn test_table_pads_ragged_rows() {
        let (headers, rows) = table("| A | B | C |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 |");
        assert_eq!(headers.len(), 3);
        assert_eq!(rows[0], vec!["1", "", ""]);
        assert_eq!(rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_table_with_alignment_separator() {
        let (headers, rows) = table("| L | R |\n|:---|---:|\n| x | y |");
        assert_eq!(headers, vec!["L", "R"]);
        assert_eq!(rows, vec![vec!["x", "y"]]);
    }

    #[test]
    fn test_single_pipe_line_is_not_a_table() {
        let blocks = build_document_body("just a | in prose");
        assert!(matches!(blocks[0], DocBlock::Paragraph { .. }));
    }

    #[test]
    fn test_headings() {
        let blocks = build_document_body("# One\n## Two\n### Three\n#### Four");
        assert!(matches!(blocks[0], DocBlock::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], DocBlock::Heading { level: 2, .. }));
        assert!(matches!(blocks[2], DocBlock::Heading { level: 3, .. }));
        // Four hashes is not a supported heading level
        assert!(matches!(blocks[3], DocBlock::Paragraph { .. }));
    }

    #[test]
    fn test_heading_without_space_is_text() {
        let blocks = build_document_body("#hashtag");
        assert!(matches!(blocks[0], DocBlock::Paragraph { .. }));
    }

    #[test]
    fn test_bold_and_italic_spans() {
        let spans = parse_spans("plain **bold** and *slanted* end");
        assert_eq!(
            spans,
            vec![
                Span::new("plain ", SpanStyle::Plain),
                Span::new("bold", SpanStyle::Bold),
                Span::new(" and ", SpanStyle::Plain),
                Span::new("slanted", SpanStyle::Italic),
                Span::new(" end", SpanStyle::Plain),
            ]
        );
    }

    #[test]
    fn test_bold_is_non_greedy() {
        let spans = parse_spans("**a** mid **b**");
        let bolds: Vec<&str> = spans
            .iter()
            .filter(|s| s.style == SpanStyle::Bold)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(bolds, vec!["a", "b"]);
    }

    #[test]
    fn test_inline_code_span() {
        let spans = parse_spans("run `cargo fmt` now");
        assert_eq!(spans[1], Span::new("cargo fmt", SpanStyle::Code));
    }

    #[test]
    fn test_heading_keeps_emphasis() {
        let blocks = build_document_body("## The **big** picture");
        match &blocks[0] {
            DocBlock::Heading { level: 2, spans } => {
                assert_eq!(spans[1], Span::new("big", SpanStyle::Bold));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_fenced_code_block() {
        let blocks = build_document_body("before\n```\nlet x = 1;\nlet y = 2;\n```\nafter");
        assert!(matches!(blocks[0], DocBlock::Paragraph { .. }));
        match &blocks[1] {
            DocBlock::Code { text } => assert_eq!(text, "let x = 1;\nlet y = 2;"),
            other => panic!("unexpected block: {:?}", other),
        }
        assert!(matches!(blocks[2], DocBlock::Paragraph { .. }));
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let blocks = build_document_body("```\nno closing fence");
        match &blocks[0] {
            DocBlock::Code { text } => assert_eq!(text, "no closing fence"),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_bullet_lists_group() {
        let blocks = build_document_body("* one\n* two\n\n* three");
        match &blocks[0] {
            DocBlock::List { items } => assert_eq!(items.len(), 2),
            other => panic!("unexpected block: {:?}", other),
        }
        match &blocks[1] {
            DocBlock::List { items } => assert_eq!(items.len(), 1),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_soft_breaks() {
        let blocks = build_document_body("line one\nline two\n\nsecond paragraph");
        match &blocks[0] {
            DocBlock::Paragraph { lines } => assert_eq!(lines.len(), 2),
            other => panic!("unexpected block: {:?}", other),
        }
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_raw_markup_is_escaped() {
        let blocks = build_document_body("a <b>bold</b> & more");
        match &blocks[0] {
            DocBlock::Paragraph { lines } => {
                let text = spans_to_text(&lines[0]);
                assert_eq!(text, "a &lt;b&gt;bold&lt;/b&gt; &amp; more");
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }
}
