//! # Markdown block model
//!
//! A deliberately small line classifier for the markdown-ish text that LLM
//! summaries come back as. It recognises pipe tables, `#`..`###` headings,
//! `-`/`*` bullets, blank lines and plain paragraphs; nothing else.
//!
//! Both renderers in [`crate::render`] consume the same [`Block`] sequence so
//! they can never disagree on what counts as a table line.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*]\s+(.*)$").unwrap());

// `---`, `:---`, `:---:`, and the `-----+-----` runs the text renderer emits
static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*:?-{2,}:?(?:\+:?-{2,}:?)*\s*$").unwrap());

/// One block of a parsed document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Table(TableBlock),
    Line { raw: &'a str, kind: LineKind<'a> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading { level: u8, text: &'a str },
    Bullet(&'a str),
    Blank,
    Paragraph,
}

/// Normalized rows of a pipe table: header first, every row the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
}

/// A line that (ignoring surrounding whitespace) starts and ends with `|`.
pub fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

/// Removes `**` and `__` emphasis markers, keeping the enclosed text.
pub fn strip_emphasis(s: &str) -> String {
    s.replace("**", "").replace("__", "")
}

/// Splits `text` into blocks. Maximal runs of table lines become a single
/// [`Block::Table`]; every other line becomes a [`Block::Line`].
pub fn parse_blocks(text: &str) -> Vec<Block<'_>> {
    let lines = text.lines().collect::<Vec<_>>();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if is_table_line(lines[i]) {
            let start = i;
            while i < lines.len() && is_table_line(lines[i]) {
                i += 1;
            }
            blocks.push(Block::Table(TableBlock::parse(&lines[start..i])));
            continue;
        }

        let raw = lines[i];
        blocks.push(Block::Line {
            raw,
            kind: classify_line(raw),
        });
        i += 1;
    }

    blocks
}

fn classify_line(raw: &str) -> LineKind<'_> {
    let line = raw.trim_end();

    if let Some(caps) = HEADING_RE.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
        let text = caps.get(2).map_or("", |m| m.as_str().trim());
        return LineKind::Heading { level, text };
    }
    if let Some(caps) = BULLET_RE.captures(line) {
        return LineKind::Bullet(caps.get(1).map_or("", |m| m.as_str().trim()));
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    LineKind::Paragraph
}

impl TableBlock {
    /// Parses a run of table lines. Lines that are not table-like end the block.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut rows = lines
            .iter()
            .map(AsRef::as_ref)
            .take_while(|line| is_table_line(line))
            .map(split_row)
            .collect::<Vec<_>>();

        if rows.len() > 1 && is_separator_row(&rows[1]) {
            rows.remove(1);
        }

        let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(ncols, String::new());
        }

        TableBlock { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// All rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| strip_emphasis(cell.trim()))
        .collect()
}

fn is_separator_row(row: &[String]) -> bool {
    !row.is_empty() && row.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell))
}
