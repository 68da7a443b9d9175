//! Plain-text rendering with pipe tables reflowed into aligned monospace
//! blocks, for viewers that show markdown verbatim.

use crate::markdown::{parse_blocks, strip_emphasis, Block, TableBlock};

/// Sizing rules for reflowed tables. Widths are display widths, see [`display_width`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub max_col_width: usize,
    pub padding: usize,
}

impl Default for TableFormat {
    fn default() -> Self {
        TableFormat {
            max_col_width: 48,
            padding: 1,
        }
    }
}

/// Renders `summary_md` as plain text using the default [`TableFormat`].
pub fn render_text(summary_md: &str) -> String {
    render_text_with(summary_md, &TableFormat::default())
}

pub fn render_text_with(summary_md: &str, fmt: &TableFormat) -> String {
    let mut out = Vec::new();

    for block in parse_blocks(summary_md) {
        match block {
            Block::Table(table) => out.extend(format_table(&table, fmt)),
            Block::Line { raw, .. } => out.push(strip_emphasis(raw).trim_end().to_string()),
        }
    }

    let mut cleaned = Vec::with_capacity(out.len());
    let mut blank_run = 0;
    for line in out {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                cleaned.push(String::new());
            }
        } else {
            blank_run = 0;
            cleaned.push(line);
        }
    }

    let mut doc = cleaned.join("\n").trim().to_string();
    doc.push('\n');
    doc
}

fn char_width(ch: char) -> usize {
    if ch.is_ascii() {
        1
    } else {
        2
    }
}

/// Approximate monospace width: ASCII counts 1, everything else 2.
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Wraps `s` into lines of at most `max_width` display columns, breaking
/// between characters. A single character wider than the limit gets a line
/// of its own rather than being split.
pub fn wrap_cell(s: &str, max_width: usize) -> Vec<String> {
    let s = s.trim();
    if s.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in s.chars() {
        let w = char_width(ch);
        if !current.is_empty() && current_width + w > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(fill))
}

fn format_table(table: &TableBlock, fmt: &TableFormat) -> Vec<String> {
    if table.is_empty() {
        return Vec::new();
    }

    let wrapped = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| wrap_cell(cell, fmt.max_col_width))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let col_widths = (0..table.column_count())
        .map(|ci| {
            let widest = wrapped
                .iter()
                .flat_map(|row| row[ci].iter())
                .map(|line| display_width(line))
                .max()
                .unwrap_or(0);
            widest.min(fmt.max_col_width)
        })
        .collect::<Vec<_>>();

    let gap = " ".repeat(fmt.padding);
    let joiner = format!("{gap}|{gap}");

    let render_row = |cells: &[Vec<String>]| -> Vec<String> {
        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        (0..height)
            .map(|li| {
                let parts = cells
                    .iter()
                    .zip(&col_widths)
                    .map(|(lines, &w)| pad(lines.get(li).map_or("", String::as_str), w))
                    .collect::<Vec<_>>();
                format!("|{gap}{}{gap}|", parts.join(&joiner))
            })
            .collect()
    };

    let separator = format!(
        "|{}|",
        col_widths
            .iter()
            .map(|w| "-".repeat(w + 2 * fmt.padding))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = render_row(&wrapped[0]);
    out.push(separator);
    for row in &wrapped[1..] {
        out.extend(render_row(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_lines(doc: &str) -> Vec<&str> {
        doc.lines().filter(|l| l.starts_with('|')).collect()
    }

    #[test]
    fn display_width_counts_wide_chars_double() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("重點"), 4);
        assert_eq!(display_width("a重"), 3);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn wrap_respects_display_width() {
        assert_eq!(wrap_cell("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_cell("重點重點", 5), vec!["重點", "重點"]);
        assert_eq!(wrap_cell("   ", 4), vec![""]);
        assert_eq!(wrap_cell("重", 1), vec!["重"]);
    }

    #[test]
    fn renders_aligned_table() {
        let md = "Intro **bold**  \n\n| Name | Qty |\n|---|---|\n| apple | 3 |\n| kiwi | 12 |\n\nOutro";
        let doc = render_text(md);

        assert_eq!(
            doc,
            "Intro bold\n\n\
             | Name  | Qty |\n\
             |-------+-----|\n\
             | apple | 3   |\n\
             | kiwi  | 12  |\n\
             \n\
             Outro\n"
        );
    }

    #[test]
    fn header_only_table_renders_header_and_separator() {
        let doc = render_text("| a | bb |");
        assert_eq!(doc, "| a | bb |\n|---+----|\n");
    }

    #[test]
    fn short_rows_are_padded() {
        let doc = render_text("| a | b | c |\n|---|---|---|\n| 1 |");
        let lines = table_lines(&doc);
        assert_eq!(lines[2], "| 1 |   |   |");
        for line in &lines {
            assert_eq!(line.matches('|').count() + line.matches('+').count(), 4);
        }
    }

    #[test]
    fn separator_row_never_rendered_as_data() {
        let doc = render_text("| h |\n| :---: |\n| v |");
        assert!(!doc.contains(":---:"));
        assert_eq!(table_lines(&doc).len(), 3);
    }

    #[test]
    fn long_cells_wrap_onto_multiple_lines() {
        let fmt = TableFormat {
            max_col_width: 4,
            padding: 1,
        };
        let doc = render_text_with("| k | v |\n|---|---|\n| a | abcdefghij |", &fmt);
        assert_eq!(
            doc,
            "| k | v    |\n\
             |---+------|\n\
             | a | abcd |\n\
             |   | efgh |\n\
             |   | ij   |\n"
        );
    }

    #[test]
    fn wide_chars_align() {
        let doc = render_text("| 項目 | x |\n|---|---|\n| ab | 重點 |");
        assert_eq!(
            doc,
            "| 項目 | x    |\n\
             |------+------|\n\
             | ab   | 重點 |\n"
        );
    }

    #[test]
    fn blank_runs_collapse_and_document_is_trimmed() {
        let doc = render_text("\n\n\na\n\n\n\n\nb\n\n\n");
        assert_eq!(doc, "a\n\n\nb\n");
    }

    #[test]
    fn empty_input_gives_single_newline() {
        assert_eq!(render_text(""), "\n");
    }

    #[test]
    fn reflow_is_structurally_idempotent() {
        use crate::markdown::{parse_blocks, Block};

        let md = "| Topic | Detail |\n|:--|--:|\n| **rates** | held |\n| jobs |";
        let once = render_text(md);
        let twice = render_text(&once);

        let tables = |doc: &str| {
            parse_blocks(doc)
                .into_iter()
                .filter_map(|b| match b {
                    Block::Table(t) => Some(t),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let original = tables(md);
        assert_eq!(tables(&once), original);
        assert_eq!(tables(&twice), original);
        assert_eq!(once, twice);
    }
}
