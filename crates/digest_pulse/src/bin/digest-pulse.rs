use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use apalis::{layers::sentry::SentryLayer, prelude::*};
use apalis_cron::{CronStream, Tick};
use clap::{Parser, Subcommand, ValueEnum};
use cron::Schedule;
use digest_pulse::{
    gemini::GeminiClient,
    notify::telegram::TelegramBot,
    openai::OpenAIClient,
    parser::video_ids_from_args,
    tracing::init_tracing_subscriber,
    until_shutdown,
    yt::{
        audio_handler::YtDlp, brave::BraveVideoSearch, data_api::VideoLookup,
        data_api::YouTubeDataApi, scraper::CaptionScraper, whisper::WhisperFallback,
        ChannelDiscovery, DiscoveryWindow, TranscriptBackend,
    },
    DigestProcessorBuilder, SummaryBackend,
};
use digest_store::JsonFileLedger;

#[derive(Parser)]
#[command(
    name = "digest-pulse",
    about = "Summarizes new YouTube uploads and posts the digests to Telegram"
)]
struct Cli {
    /// Channel handles or URLs to scan, comma separated
    #[arg(long, env = "YOUTUBE_CHANNELS", value_delimiter = ',')]
    channels: Vec<String>,

    /// Which LLM writes the summaries
    #[arg(long, env = "SUMMARIZER", value_enum, default_value_t = SummarizerKind::Gemini)]
    summarizer: SummarizerKind,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,

    /// Overrides the summarizer's API endpoint, e.g. an OpenAI-compatible proxy
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_bot_token: Option<String>,

    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    /// Bot API server, for self-hosted deployments
    #[arg(long, env = "TELEGRAM_API_URL")]
    telegram_api_url: Option<String>,

    /// YouTube Data API key; preferred for discovery when set
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    /// Brave Search API key; used for discovery when no YouTube key is set
    #[arg(long, env = "BRAVE_API_KEY", hide_env_values = true)]
    brave_api_key: Option<String>,

    /// Upper bound on videos returned per channel by discovery
    #[arg(long, env = "DISCOVERY_MAX_RESULTS", default_value_t = 20)]
    max_results: u8,

    /// Only videos published this many hours back are considered
    #[arg(
        long,
        env = "LOOKBACK_HOURS",
        default_value_t = DiscoveryWindow::DEFAULT_LOOKBACK_HOURS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_LOOKBACK_HOURS)
    )]
    lookback_hours: u32,

    /// What to do for videos without captions; `whisper` needs OPENAI_API_KEY and yt-dlp
    #[arg(long, env = "TRANSCRIPT_FALLBACK", value_enum, default_value_t = TranscriptFallback::None)]
    transcript_fallback: TranscriptFallback,

    /// yt-dlp executable used by the whisper fallback
    #[arg(long, env = "YT_DLP_PATH", default_value = "yt-dlp")]
    yt_dlp_path: PathBuf,

    /// Root directory for transcript and summary artifacts
    #[arg(long, env = "DIGEST_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// Processed-ID ledger file [default: <workdir>/processed_videos.json]
    #[arg(long, env = "LEDGER_PATH")]
    ledger_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and exit
    Run,
    /// Start the cron scheduler
    Cron {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 */4 * * *")]
        schedule: String,
    },
    /// Summarize specific videos now, whether or not they were seen before
    Video {
        /// Watch URLs, youtu.be links or bare video IDs
        #[arg(required = true)]
        videos: Vec<String>,
    },
}

/// Ten years.
const MAX_LOOKBACK_HOURS: i64 = 24 * 3650;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TranscriptFallback {
    None,
    Whisper,
}

#[derive(Clone, Copy, ValueEnum)]
enum SummarizerKind {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
}

#[derive(Clone)]
enum DiscoveryConfig {
    YouTube(String),
    Brave(String),
}

#[derive(Clone)]
struct Config {
    channels: Vec<String>,
    summarizer: SummarizerKind,
    summarizer_key: String,
    summarizer_model: Option<String>,
    llm_base_url: Option<String>,
    telegram_token: String,
    telegram_chat_id: String,
    telegram_api_url: Option<String>,
    discovery: Option<DiscoveryConfig>,
    max_results: u8,
    youtube_api_key: Option<String>,
    lookback_hours: u32,
    whisper_key: Option<String>,
    yt_dlp_path: PathBuf,
    workdir: PathBuf,
    ledger_path: PathBuf,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Validates the settings a command needs. Channel discovery settings are
    /// only required when `needs_discovery` is set.
    fn from_cli(cli: Cli, needs_discovery: bool) -> anyhow::Result<(Self, Command)> {
        let openai_api_key = non_empty(cli.openai_api_key);
        let (summarizer_key, summarizer_model) = match cli.summarizer {
            SummarizerKind::Gemini => (
                non_empty(cli.gemini_api_key).context("GEMINI_API_KEY not set")?,
                non_empty(cli.gemini_model),
            ),
            SummarizerKind::OpenAI => (
                openai_api_key.clone().context("OPENAI_API_KEY not set")?,
                non_empty(cli.openai_model),
            ),
        };

        let whisper_key = match cli.transcript_fallback {
            TranscriptFallback::None => None,
            TranscriptFallback::Whisper => Some(
                openai_api_key.context("TRANSCRIPT_FALLBACK=whisper needs OPENAI_API_KEY")?,
            ),
        };

        let telegram_token =
            non_empty(cli.telegram_bot_token).context("TELEGRAM_BOT_TOKEN not set")?;
        let telegram_chat_id =
            non_empty(cli.telegram_chat_id).context("TELEGRAM_CHAT_ID not set")?;

        let youtube_api_key = non_empty(cli.youtube_api_key);
        let discovery = match (&youtube_api_key, non_empty(cli.brave_api_key)) {
            (Some(key), _) => Some(DiscoveryConfig::YouTube(key.clone())),
            (None, Some(key)) => Some(DiscoveryConfig::Brave(key)),
            (None, None) => None,
        };

        let channels = cli
            .channels
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>();

        if needs_discovery {
            if discovery.is_none() {
                anyhow::bail!("Neither YOUTUBE_API_KEY nor BRAVE_API_KEY is set");
            }
            if channels.is_empty() {
                anyhow::bail!("YOUTUBE_CHANNELS is empty");
            }
        }

        let ledger_path = cli
            .ledger_path
            .unwrap_or_else(|| cli.workdir.join("processed_videos.json"));

        let config = Config {
            channels,
            summarizer: cli.summarizer,
            summarizer_key,
            summarizer_model,
            llm_base_url: non_empty(cli.llm_base_url),
            telegram_token,
            telegram_chat_id,
            telegram_api_url: non_empty(cli.telegram_api_url),
            discovery,
            max_results: cli.max_results,
            youtube_api_key,
            lookback_hours: cli.lookback_hours,
            whisper_key,
            yt_dlp_path: cli.yt_dlp_path,
            workdir: cli.workdir,
            ledger_path,
        };
        Ok((config, cli.command))
    }

    fn summarizer(&self) -> SummaryBackend {
        let model = self.summarizer_model.clone();
        match (self.summarizer, &self.llm_base_url) {
            (SummarizerKind::Gemini, None) => {
                SummaryBackend::Gemini(GeminiClient::new(&self.summarizer_key, model))
            }
            (SummarizerKind::Gemini, Some(url)) => SummaryBackend::Gemini(
                GeminiClient::new(&self.summarizer_key, model).with_base_url(url),
            ),
            (SummarizerKind::OpenAI, None) => {
                SummaryBackend::OpenAI(OpenAIClient::new(&self.summarizer_key, model))
            }
            (SummarizerKind::OpenAI, Some(url)) => SummaryBackend::OpenAI(
                OpenAIClient::new(&self.summarizer_key, model).with_base_url(url),
            ),
        }
    }

    fn discovery(&self) -> anyhow::Result<ChannelDiscovery> {
        match &self.discovery {
            Some(DiscoveryConfig::YouTube(key)) => Ok(ChannelDiscovery::YouTube(
                YouTubeDataApi::new(key).with_max_results(self.max_results),
            )),
            Some(DiscoveryConfig::Brave(key)) => Ok(ChannelDiscovery::Brave(
                BraveVideoSearch::new(key).with_count(self.max_results),
            )),
            None => anyhow::bail!("No discovery backend configured"),
        }
    }

    fn transcripts(&self) -> TranscriptBackend {
        let Some(key) = &self.whisper_key else {
            return TranscriptBackend::Captions(CaptionScraper::default());
        };

        let client = OpenAIClient::new(key, None);
        let client = match (self.summarizer, &self.llm_base_url) {
            (SummarizerKind::OpenAI, Some(url)) => client.with_base_url(url),
            _ => client,
        };
        TranscriptBackend::Whisper(WhisperFallback::new(
            CaptionScraper::default(),
            YtDlp::new(&self.yt_dlp_path),
            client,
        ))
    }

    fn sink(&self) -> TelegramBot {
        let bot = TelegramBot::new(&self.telegram_token, &self.telegram_chat_id);
        match &self.telegram_api_url {
            Some(url) => bot.with_base_url(url),
            None => bot,
        }
    }
}

async fn run_pipeline(config: &Config) -> anyhow::Result<()> {
    let processor = DigestProcessorBuilder::new(&config.workdir)
        .ledger_store(JsonFileLedger::new(&config.ledger_path))
        .discovery(config.discovery()?)
        .transcripts(config.transcripts())
        .summarizer(config.summarizer())
        .sink(config.sink())
        .channels(config.channels.iter().cloned())
        .window(DiscoveryWindow::lookback_hours(config.lookback_hours))
        .build();

    let report = processor.run().await;
    if report.channels_attempted > 0 && report.channels_failed == report.channels_attempted {
        tracing::warn!(?report, "Discovery failed for every channel");
    }
    Ok(())
}

async fn run_videos(config: &Config, inputs: &[String]) -> anyhow::Result<()> {
    let ids = video_ids_from_args(inputs)
        .map_err(|input| anyhow::anyhow!("Not a YouTube video: {input}"))?;

    let lookup = VideoLookup::new(config.youtube_api_key.clone());
    let mut items = Vec::with_capacity(ids.len());
    for id in &ids {
        items.push(lookup.lookup(id).await);
    }

    let processor = DigestProcessorBuilder::new(&config.workdir)
        .ledger_store(JsonFileLedger::new(&config.ledger_path))
        .transcripts(config.transcripts())
        .summarizer(config.summarizer())
        .sink(config.sink())
        .build();

    processor.run_videos(items).await?;
    Ok(())
}

async fn handle_tick(_tick: Tick, config: Data<Config>) -> anyhow::Result<()> {
    tracing::info!(
        channels = config.channels.len(),
        "Running scheduled pipeline..."
    );
    run_pipeline(&config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let needs_discovery = !matches!(cli.command, Command::Video { .. });
    let (config, command) = Config::from_cli(cli, needs_discovery)
        .inspect_err(|e| tracing::error!(error = ?e, "Invalid configuration"))?;

    // Interrupting drops the running processor, which saves its ledger.
    match until_shutdown(run_command(config, command), tokio::signal::ctrl_c()).await {
        Some(result) => result,
        None => {
            tracing::warn!("Interrupted, shutting down");
            Ok(())
        }
    }
}

async fn run_command(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Run => {
            tracing::info!(channels = config.channels.len(), "Running pipeline once...");
            run_pipeline(&config).await?;
        }
        Command::Cron { schedule } => {
            tracing::info!(%schedule, "Starting cron scheduler...");
            let schedule = Schedule::from_str(&schedule)?;

            let worker = WorkerBuilder::new("digest-pulse-cron")
                .backend(CronStream::new(schedule))
                .layer(SentryLayer::new())
                .data(config)
                .build(handle_tick);

            worker.run().await?;
        }
        Command::Video { videos } => {
            tracing::info!(count = videos.len(), "Summarizing requested videos...");
            run_videos(&config, &videos).await?;
        }
    }

    Ok(())
}
