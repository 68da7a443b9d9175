//! Local copies of every transcript and summary, grouped per channel and day.
//!
//! Writes here are advisory: the processor logs a failed write and moves on,
//! it never lets one stand in the way of delivering a summary.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{
    render::{render_html, render_text},
    types::DiscoveredItem,
};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9._-]+").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Outcome of a best-effort write. Callers may log and drop it.
pub type Advisory<T = PathBuf> = Result<T, ArtifactError>;

/// Reduces `s` to `[A-Za-z0-9._-]` for use in a file name. A leading `@` is
/// dropped, whitespace and other characters become `_`, and `fallback` is used
/// when nothing is left.
pub fn safe_filename_base(s: &str, fallback: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('@').unwrap_or(s);
    let s = WHITESPACE_RE.replace_all(s, "_");
    let s = DISALLOWED_RE.replace_all(&s, "_");
    match s.trim_matches(|c| matches!(c, '.' | '_' | '-')) {
        "" => fallback.to_string(),
        cleaned => cleaned.to_string(),
    }
}

/// `YYYY_MM_DD` of the upload time, or of today (UTC) when it is unknown.
pub fn date_stamp(published_at: Option<DateTime<Utc>>) -> String {
    published_at
        .unwrap_or_else(Utc::now)
        .format("%Y_%m_%d")
        .to_string()
}

/// File-name base for an item: its own channel if discovery reported one,
/// otherwise the channel it was discovered under.
pub fn channel_base(item: &DiscoveredItem, discovered_under: &str) -> String {
    safe_filename_base(item.channel().unwrap_or(discovered_under), "channel")
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    transcripts_dir: PathBuf,
    summaries_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        ArtifactStore {
            transcripts_dir: root.join("transcripts"),
            summaries_dir: root.join("summaries"),
        }
    }

    /// Appends the transcript to `transcripts/{base}_{date}.txt`.
    pub fn save_transcript(
        &self,
        base: &str,
        date: &str,
        item: &DiscoveredItem,
        transcript: &str,
    ) -> Advisory {
        let path = self.transcripts_dir.join(format!("{base}_{date}.txt"));
        let entry = format!(
            "{}\n{}\n\n{}\n\n{}\n\n",
            item.title(),
            item.url(),
            transcript.trim(),
            "-".repeat(80)
        );
        append(&self.transcripts_dir, &path, &entry)
    }

    /// Writes the summary in every local format:
    /// - appended to `summaries/{base}_{date}.md` as written by the model
    /// - appended to `summaries/{base}_{date}.txt` with tables reflowed
    /// - `summaries/{base}_{date}_{id}.html` as a standalone document
    ///
    /// Each write succeeds or fails on its own.
    pub fn save_summary(
        &self,
        base: &str,
        date: &str,
        item: &DiscoveredItem,
        summary_md: &str,
    ) -> Vec<Advisory> {
        let summary_md = summary_md.trim();
        let stem = format!("{base}_{date}");

        let md_path = self.summaries_dir.join(format!("{stem}.md"));
        let md_entry = format!(
            "## {}\n\n{}\n\n{summary_md}\n\n---\n\n",
            item.title(),
            item.url()
        );

        let txt_path = self.summaries_dir.join(format!("{stem}.txt"));
        let txt_entry = format!(
            "{}\n{}\n\n{}\n{}\n\n",
            item.title(),
            item.url(),
            render_text(summary_md),
            "-".repeat(80)
        );

        let html_path = self.summaries_dir.join(format!(
            "{stem}_{}.html",
            safe_filename_base(item.id(), "video")
        ));
        let html_doc = render_html(summary_md, item.title(), &[item.url()]);

        vec![
            append(&self.summaries_dir, &md_path, &md_entry),
            append(&self.summaries_dir, &txt_path, &txt_entry),
            overwrite(&self.summaries_dir, &html_path, &html_doc),
        ]
    }
}

fn ensure_dir(dir: &Path) -> Advisory<()> {
    fs::create_dir_all(dir).map_err(|source| ArtifactError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn append(dir: &Path, path: &Path, content: &str) -> Advisory {
    ensure_dir(dir)?;
    let write_err = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;

    Ok(path.to_path_buf())
}

fn overwrite(dir: &Path, path: &Path, content: &str) -> Advisory {
    ensure_dir(dir)?;
    fs::write(path, content).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitizes_file_name_bases() {
        assert_eq!(safe_filename_base("@Rhino Finance", "channel"), "Rhino_Finance");
        assert_eq!(safe_filename_base("  a  b\tc ", "channel"), "a_b_c");
        assert_eq!(safe_filename_base("財經 News!", "channel"), "News");
        assert_eq!(safe_filename_base("..-_x.y_-..", "channel"), "x.y");
        assert_eq!(safe_filename_base("a/b\\c", "channel"), "a_b_c");
        assert_eq!(safe_filename_base("   ", "channel"), "channel");
        assert_eq!(safe_filename_base("@", "item"), "item");
        assert_eq!(safe_filename_base("重點", "item"), "item");
    }

    #[test]
    fn sanitized_names_use_restricted_charset() {
        for input in ["@x y", "ü∂ƒ©", "a:b*c?d", "tab\there", "..."] {
            let out = safe_filename_base(input, "channel");
            assert!(!out.is_empty());
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
                "{input:?} -> {out:?}"
            );
        }
    }

    #[test]
    fn date_stamp_uses_publish_time() {
        let published = Utc.with_ymd_and_hms(2026, 2, 3, 23, 59, 0).unwrap();
        assert_eq!(date_stamp(Some(published)), "2026_02_03");
        assert_eq!(date_stamp(None), Utc::now().format("%Y_%m_%d").to_string());
    }

    #[test]
    fn channel_base_prefers_item_channel() {
        let item = DiscoveredItem::new("abc12345678", "t");
        assert_eq!(channel_base(&item, "@Configured"), "Configured");

        let item = item.with_channel(Some("@Own Channel".into()));
        assert_eq!(channel_base(&item, "@Configured"), "Own_Channel");
    }

    #[test]
    fn transcripts_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let item = DiscoveredItem::new("abc12345678", "First");

        let path = store.save_transcript("chan", "2026_02_03", &item, "  hello  ").unwrap();
        store.save_transcript("chan", "2026_02_03", &item, "again").unwrap();

        assert_eq!(path, dir.path().join("transcripts/chan_2026_02_03.txt"));
        let content = fs::read_to_string(path).unwrap();
        let separator = "-".repeat(80);
        assert_eq!(
            content,
            format!(
                "First\nhttps://www.youtube.com/watch?v=abc12345678\n\nhello\n\n{separator}\n\n\
                 First\nhttps://www.youtube.com/watch?v=abc12345678\n\nagain\n\n{separator}\n\n"
            )
        );
    }

    #[test]
    fn summaries_are_written_in_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let item = DiscoveredItem::new("abc12345678", "Rates <today>");
        let summary = "- point\n\n| k | v |\n|---|---|\n| a | 1 |\n";

        let results = store.save_summary("chan", "2026_02_03", &item, summary);
        let paths = results
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let md = fs::read_to_string(&paths[0]).unwrap();
        assert!(md.starts_with("## Rates <today>\n\nhttps://www.youtube.com/watch?v=abc12345678\n\n- point"));
        assert!(md.ends_with("| a | 1 |\n\n---\n\n"));

        let txt = fs::read_to_string(&paths[1]).unwrap();
        assert!(txt.contains("| k | v |\n|---+---|\n| a | 1 |\n"));

        assert_eq!(
            paths[2],
            dir.path().join("summaries/chan_2026_02_03_abc12345678.html")
        );
        let html = fs::read_to_string(&paths[2]).unwrap();
        assert!(html.contains("<title>Rates &lt;today&gt;</title>"));
        assert!(html.contains("<td>a</td><td>1</td>"));
    }

    #[test]
    fn unwritable_root_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let store = ArtifactStore::new(&blocker);
        let item = DiscoveredItem::new("abc12345678", "t");

        assert!(matches!(
            store.save_transcript("c", "d", &item, "x"),
            Err(ArtifactError::CreateDir { .. })
        ));
        assert!(store
            .save_summary("c", "d", &item, "x")
            .iter()
            .all(Result::is_err));
    }
}
