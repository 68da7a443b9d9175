pub mod builder;

use std::future::Future;

use digest_store::{LedgerStore, ProcessedLedger};

use crate::{
    artifacts::{channel_base, date_stamp, ArtifactStore},
    llm::summarizer::{truncate_chars, Summarizer},
    notify::{deliver, DeliverySink},
    types::DiscoveredItem,
    yt::{DiscoverySource, DiscoveryWindow, TranscriptSource},
};

/// Why an item left the pipeline without being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyProcessed,
    NoTranscript,
    NoSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Skipped(SkipReason),
    /// Summarized, but delivery failed. The item stays out of the ledger and
    /// is retried on the next run.
    Failed,
    Delivered,
}

/// Tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub channels_attempted: usize,
    pub channels_failed: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Delivered => self.delivered += 1,
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }
}

/// Artifact file-name base for on-demand videos whose channel is unknown.
const SINGLE_VIDEO_BASE: &str = "single";

// Channel digest processor: discover -> transcript -> summary -> artifacts -> delivery
pub struct DigestProcessor<L, D, T, S, K>
where
    L: LedgerStore,
{
    ledger_store: L,
    ledger: ProcessedLedger,
    discovery: D,
    transcripts: T,
    summarizer: S,
    sink: K,
    artifacts: ArtifactStore,
    channels: Vec<String>,
    window: DiscoveryWindow,
}

impl<L, D, T, S, K> DigestProcessor<L, D, T, S, K>
where
    L: LedgerStore,
{
    /// IDs delivered so far, including the ones recorded during this run.
    pub fn ledger(&self) -> &ProcessedLedger {
        &self.ledger
    }
}

impl<L, D, T, S, K> DigestProcessor<L, D, T, S, K>
where
    L: LedgerStore,
    T: TranscriptSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    K: DeliverySink + Send + Sync + 'static,
{
    /// Runs one discovered item through the pipeline. Never fails: every
    /// collaborator error is logged and turned into an outcome.
    pub async fn process_item(&mut self, channel: &str, item: &DiscoveredItem) -> ItemOutcome {
        self.process(channel, item, true).await
    }

    #[tracing::instrument(skip(self, item), fields(video_id = item.id()))]
    async fn process(
        &mut self,
        channel: &str,
        item: &DiscoveredItem,
        check_ledger: bool,
    ) -> ItemOutcome {
        if check_ledger && self.ledger.contains(item.id()) {
            tracing::debug!("Already processed, skipping");
            return ItemOutcome::Skipped(SkipReason::AlreadyProcessed);
        }

        let transcript = match self.transcripts.fetch(item.id()).await {
            Ok(Some(transcript)) if !transcript.trim().is_empty() => transcript,
            Ok(_) => {
                tracing::info!("No transcript available, skipping");
                return ItemOutcome::Skipped(SkipReason::NoTranscript);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch transcript, skipping");
                return ItemOutcome::Skipped(SkipReason::NoTranscript);
            }
        };

        let base = channel_base(item, channel);
        let date = date_stamp(item.published_at());

        if let Err(e) = self
            .artifacts
            .save_transcript(&base, &date, item, &transcript)
        {
            tracing::warn!(error = %e, "Failed to save transcript artifact");
        }

        let content = truncate_chars(&transcript, S::CONTEXT_WINDOW_LIMIT);
        if content.len() < transcript.len() {
            tracing::debug!(
                limit = S::CONTEXT_WINDOW_LIMIT,
                "Transcript truncated before summarization"
            );
        }

        let summary = match self.summarizer.summarize(content).await {
            Ok(resp) if !resp.summary.trim().is_empty() => resp.summary.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Summarizer returned an empty summary, skipping");
                return ItemOutcome::Skipped(SkipReason::NoSummary);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to summarize transcript, skipping");
                return ItemOutcome::Skipped(SkipReason::NoSummary);
            }
        };

        for result in self.artifacts.save_summary(&base, &date, item, &summary) {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to save summary artifact");
            }
        }

        if !deliver(&self.sink, item.title(), item.url(), &summary).await {
            tracing::error!("Delivery failed, item will be retried on the next run");
            return ItemOutcome::Failed;
        }

        self.ledger.record(item.id());
        tracing::info!(title = item.title(), "Delivered summary");
        ItemOutcome::Delivered
    }

    /// Processes the given videos regardless of the ledger, for on-demand
    /// summaries. Successful deliveries are still recorded. Fails unless every
    /// video was delivered.
    #[tracing::instrument(skip_all, fields(count = items.len()))]
    pub async fn run_videos(mut self, items: Vec<DiscoveredItem>) -> anyhow::Result<RunReport> {
        let mut report = RunReport::default();

        for item in &items {
            let outcome = self.process(SINGLE_VIDEO_BASE, item, false).await;
            report.record(outcome);
        }

        tracing::info!(?report, "Finished processing videos");

        if report.delivered < items.len() {
            anyhow::bail!(
                "{} of {} videos were not delivered",
                items.len() - report.delivered,
                items.len()
            );
        }
        Ok(report)
    }
}

impl<L, D, T, S, K> DigestProcessor<L, D, T, S, K>
where
    L: LedgerStore,
    D: DiscoverySource + Send + Sync + 'static,
    T: TranscriptSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    K: DeliverySink + Send + Sync + 'static,
{
    /// Processes every configured channel in order. A channel whose discovery
    /// fails is logged and skipped; the rest still run.
    #[tracing::instrument(skip(self), fields(channels = self.channels.len(), hours = self.window.hours()))]
    pub async fn run(mut self) -> RunReport {
        let mut report = RunReport::default();
        let channels = std::mem::take(&mut self.channels);

        for channel in &channels {
            report.channels_attempted += 1;

            let items = match self.discovery.find_recent(channel, &self.window).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!(error = %e, %channel, "Failed to discover videos");
                    report.channels_failed += 1;
                    continue;
                }
            };
            tracing::info!(%channel, count = items.len(), "Discovered videos");

            for item in &items {
                let outcome = self.process(channel, item, true).await;
                report.record(outcome);
            }
        }

        tracing::info!(?report, "Run finished");
        report
    }
}

/// Drives `work` until it completes or `shutdown` resolves first, in which
/// case `work` is dropped unfinished and `None` is returned. A processor owned
/// by `work` saves its ledger as it is dropped.
pub async fn until_shutdown<F, S>(work: F, shutdown: S) -> Option<F::Output>
where
    F: Future,
    S: Future,
{
    tokio::select! {
        output = work => Some(output),
        _ = shutdown => None,
    }
}

impl<L, D, T, S, K> Drop for DigestProcessor<L, D, T, S, K>
where
    L: LedgerStore,
{
    fn drop(&mut self) {
        match self.ledger_store.save(&self.ledger) {
            Ok(()) => tracing::info!(count = self.ledger.len(), "Saved processed ledger"),
            Err(e) => tracing::error!(error = ?e, "Failed to save processed ledger"),
        }
    }
}
