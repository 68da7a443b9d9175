use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{LedgerStore, ProcessedLedger};

/// On-disk shape of the ledger: `{"video_ids": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    video_ids: Vec<String>,
}

/// Ledger persisted as a small JSON document.
///
/// There is no locking; only one run is expected to use a given file at a time.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<ProcessedLedger> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let file: LedgerFile =
            serde_json::from_str(&raw).context("Ledger file is not valid JSON")?;
        Ok(file.video_ids.into_iter().collect())
    }
}

impl LedgerStore for JsonFileLedger {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> ProcessedLedger {
        if !self.path.exists() {
            tracing::debug!("No ledger file yet, starting empty");
            return ProcessedLedger::new();
        }

        match self.read() {
            Ok(ledger) => {
                tracing::info!(count = ledger.len(), "Loaded processed ledger");
                ledger
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Could not load processed ledger, starting empty");
                ProcessedLedger::new()
            }
        }
    }

    #[tracing::instrument(skip_all, fields(path = %self.path.display(), count = ledger.len()))]
    fn save(&self, ledger: &ProcessedLedger) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create ledger directory {}", dir.display()))?;

        let file = LedgerFile {
            video_ids: ledger.iter().map(str::to_owned).collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // write-then-rename so readers never observe a half-written ledger
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        tracing::debug!("Persisted processed ledger");
        Ok(())
    }
}
