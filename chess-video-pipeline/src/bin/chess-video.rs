//! Command-line entry point for the chess-opening video indexing pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use chess_video_core::video::Opening;
use chess_video_core::{PipelineError, UpstreamClient};
use chess_video_middleware::{GovernedClient, QuotaLedger, RateLimiter};
use chess_video_pipeline::{config, Orchestrator, OpeningCatalog, RunOptions, TracingProgressSink};
use chess_video_types::QuotaConfig;
use chess_video_upstream::YouTubeClient;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chess-video")]
#[command(about = "Channel-first indexing pipeline matching chess openings to instructional videos")]
#[command(version)]
struct Cli {
    /// Path to the pipeline TOML configuration file.
    #[arg(long, default_value = "config/pipeline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full indexing pipeline once.
    Run {
        /// Restrict to openings whose ECO code starts with this letter.
        #[arg(long)]
        eco: Option<char>,
        /// Bypass a recent index snapshot and rebuild from scratch.
        #[arg(long)]
        force_rebuild: bool,
        /// Skip openings that already have a non-empty video file.
        #[arg(long)]
        resume: bool,
    },
}

/// Placeholder opening catalog until the external loader is wired in.
struct EmptyCatalog(Vec<Opening>);

impl OpeningCatalog for EmptyCatalog {
    fn openings(&self) -> &[Opening] {
        &self.0
    }
}

async fn run(cli: Cli) -> i32 {
    let pipeline_config = match config::load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration invalid");
            return 3;
        }
    };
    let channel_file = match config::load_trusted_channels(&pipeline_config.channels_path) {
        Ok(file) => file,
        Err(error) => {
            tracing::error!(%error, "trusted channel file invalid");
            return 3;
        }
    };

    let http_client = match YouTubeClient::new(pipeline_config.api_key.clone(), pipeline_config.request_timeout) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "failed to build upstream client");
            return 3;
        }
    };
    let quota = Arc::new(QuotaLedger::new(QuotaConfig {
        limit: pipeline_config.quota_limit,
        ..QuotaConfig::default()
    }));
    let rate_limiter = Arc::new(RateLimiter::new(pipeline_config.requests_per_second));
    let inner: Arc<dyn UpstreamClient> = Arc::new(http_client);
    let client: Arc<dyn UpstreamClient> = Arc::new(GovernedClient::new(inner, quota, rate_limiter));

    // TODO: wire a real opening catalog once the external loader is available.
    let catalog: Box<dyn OpeningCatalog> = Box::new(EmptyCatalog(Vec::new()));

    let orchestrator = Orchestrator::new(
        pipeline_config,
        channel_file.trusted_channels,
        client,
        catalog,
        Box::new(TracingProgressSink),
    );

    let Command::Run {
        eco,
        force_rebuild,
        resume,
    } = cli.command;

    match orchestrator
        .run(RunOptions {
            eco_filter: eco,
            force_rebuild,
            resume,
        })
        .await
    {
        Ok(summary) => {
            tracing::info!(
                processed = summary.processed,
                skipped = summary.skipped,
                videos_added = summary.videos_added,
                errors = summary.errors.len(),
                "run complete"
            );
            if summary.errors.is_empty() {
                0
            } else {
                1
            }
        }
        Err(PipelineError::QuotaExceeded { remaining, reset_in_ms }) => {
            tracing::error!(remaining, reset_in_ms, "quota exceeded");
            2
        }
        Err(error) => {
            tracing::error!(%error, "run failed");
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let exit_code = run(cli).await;
    std::process::exit(exit_code);
}
