//! Self-contained HTML rendering with pipe tables turned into real `<table>`
//! markup. The output can be opened in any browser; it never contains script.

use std::sync::LazyLock;

use regex::Regex;

use crate::markdown::{parse_blocks, Block, LineKind, TableBlock};

static LINE_BREAK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

const DEFAULT_CSS: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "PingFang TC", "PingFang SC", "Microsoft YaHei", Arial, sans-serif; line-height: 1.55; padding: 16px; }
h1,h2,h3 { margin: 16px 0 8px; }
p { margin: 8px 0; white-space: pre-wrap; }
table { border-collapse: collapse; width: 100%; margin: 12px 0; }
th, td { border: 1px solid #333; padding: 6px 8px; vertical-align: top; }
th { background: #f2f2f2; }
code, pre { font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace; }
"#;

/// Escapes `&`, `<` and `>`. Quotes are left alone; body text never lands in
/// an attribute.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_with_quotes(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#x27;")
}

/// Inline formatting for every piece of body text: model-written `<br>` tags
/// become line breaks, everything else is escaped, `**bold**` becomes `<b>`.
pub fn inline_format(s: &str) -> String {
    // must run before escaping, otherwise the tags survive as `&lt;br&gt;`
    let s = LINE_BREAK_TAG_RE.replace_all(s, "\n");
    let escaped = escape_text(&s);
    let bolded = BOLD_RE.replace_all(&escaped, "<b>$1</b>");
    bolded.replace('\n', "<br/>")
}

fn table_to_html(table: &TableBlock) -> String {
    let Some(header) = table.header() else {
        return String::new();
    };

    let cells = |row: &[String], tag: &str| {
        row.iter()
            .map(|c| format!("<{tag}>{}</{tag}>", inline_format(c)))
            .collect::<String>()
    };

    let thead = format!("<thead><tr>{}</tr></thead>", cells(header, "th"));
    let tbody = table
        .body()
        .iter()
        .map(|row| format!("<tr>{}</tr>", cells(row, "td")))
        .collect::<String>();

    format!("<table>{thead}<tbody>{tbody}</tbody></table>")
}

fn render_body(summary_md: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_list = false;

    let close_list = |out: &mut Vec<String>, in_list: &mut bool| {
        if *in_list {
            out.push("</ul>".to_string());
            *in_list = false;
        }
    };

    for block in parse_blocks(summary_md) {
        match block {
            Block::Table(table) => {
                close_list(&mut out, &mut in_list);
                out.push(table_to_html(&table));
            }
            Block::Line { raw, kind } => match kind {
                LineKind::Heading { level, text } => {
                    close_list(&mut out, &mut in_list);
                    out.push(format!("<h{level}>{}</h{level}>", inline_format(text)));
                }
                LineKind::Bullet(text) => {
                    if !in_list {
                        out.push("<ul>".to_string());
                        in_list = true;
                    }
                    out.push(format!("<li>{}</li>", inline_format(text)));
                }
                LineKind::Blank => close_list(&mut out, &mut in_list),
                LineKind::Paragraph => {
                    close_list(&mut out, &mut in_list);
                    out.push(format!("<p>{}</p>", inline_format(raw.trim_end())));
                }
            },
        }
    }
    close_list(&mut out, &mut in_list);

    out
}

/// Renders `summary_md` as a complete HTML document titled `title`.
/// Each of `meta_lines` (e.g. the video URL) becomes a paragraph above the body.
pub fn render_html(summary_md: &str, title: &str, meta_lines: &[&str]) -> String {
    let mut parts = Vec::new();

    if !meta_lines.is_empty() {
        parts.push("<div class='meta'>".to_string());
        parts.extend(
            meta_lines
                .iter()
                .map(|line| format!("<p>{}</p>", inline_format(line))),
        );
        parts.push("</div>".to_string());
    }
    parts.extend(render_body(summary_md));

    let body = parts.join("\n");
    let title = escape_with_quotes(title);

    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>{title}</title>
  <style>{DEFAULT_CSS}</style>
</head>
<body>
  <h1>{title}</h1>
  {body}
</body>
</html>
"#
    )
}
