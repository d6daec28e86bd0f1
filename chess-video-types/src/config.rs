//! Configuration types shared across the pipeline, the upstream client, and middleware.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Strategy for consuming units from a quota when handling requests.
///
/// Mirrors the single strategy the upstream video service actually bills under: every
/// call reserves its cost up front, regardless of whether the call succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum QuotaConsumptionStrategy {
    /// Each request deducts exactly `cost` units from the daily budget.
    #[default]
    Unit,
}

/// Configuration for the process-wide quota budget over a single accounting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of units that may be consumed within a single window.
    pub limit: u64,
    /// Duration of the accounting window (one calendar day by default).
    pub window: Duration,
    /// Strategy for how requests consume units from the budget.
    pub strategy: QuotaConsumptionStrategy,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: 10_000,
            window: Duration::from_secs(24 * 60 * 60),
            strategy: QuotaConsumptionStrategy::Unit,
        }
    }
}

/// Snapshot of the quota budget at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaState {
    /// Configured maximum units per window.
    pub limit: u64,
    /// Remaining units available in the current window.
    pub remaining: u64,
    /// Milliseconds remaining until the current window resets.
    pub reset_in_ms: u64,
}

/// Quality tier assigned to a trusted channel; drives pre-filter duration thresholds
/// and the matcher's trusted-channel score boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// High-trust channel: lower duration floor, larger score boost.
    Premium,
    /// Still trusted, but held to a stricter duration floor and smaller boost.
    Standard,
}

/// A single trusted video channel, as loaded from the channel configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedChannel {
    /// Upstream channel id.
    pub channel_id: String,
    /// Human-readable display name.
    pub name: String,
    /// Quality tier, driving pre-filter and scoring behavior.
    pub quality_tier: QualityTier,
    /// Priority; lower values are preferred when ordering is ambiguous.
    pub priority: u32,
}

impl TrustedChannel {
    /// The channel's per-channel Atom feed URL.
    #[must_use]
    pub fn rss_url(&self) -> String {
        format!(
            "https://www.youtube.com/feeds/videos.xml?channel_id={}",
            self.channel_id
        )
    }
}

/// Top-level `{trusted_channels: [...]}` document shape for the channel config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustedChannelFile {
    /// The configured trusted channels.
    pub trusted_channels: Vec<TrustedChannel>,
}

/// Pipeline-wide runtime configuration, loaded from a TOML file with environment
/// overrides applied on top (see `chess-video-pipeline::config::load`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bearer key for the upstream video service. Resolvable from `YOUTUBE_API_KEY`.
    pub api_key: String,
    /// Daily quota ceiling.
    pub quota_limit: u64,
    /// Rate-limiter token rate, in requests per second.
    pub requests_per_second: u32,
    /// Top-N matches kept per opening.
    pub max_results_per_opening: usize,
    /// Enrichment batch size.
    pub batch_size: usize,
    /// History cutoff for channel enumeration.
    pub history_window: Duration,
    /// TTL for enrichment cache entries.
    pub cache_ttl: Duration,
    /// Per-request upstream timeout.
    pub request_timeout: Duration,
    /// Pacing delay inserted between enrichment batches.
    pub batch_pacing_delay: Duration,
    /// Path to the trusted-channel configuration file.
    pub channels_path: PathBuf,
    /// Path to the enrichment cache file.
    pub cache_path: PathBuf,
    /// Path to the local index snapshot file.
    pub index_path: PathBuf,
    /// Directory containing per-opening video files.
    pub videos_dir: PathBuf,
    /// Path to the matches checkpoint file.
    pub checkpoint_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            quota_limit: 10_000,
            requests_per_second: 1,
            max_results_per_opening: 10,
            batch_size: 50,
            history_window: Duration::from_secs(15 * 365 * 24 * 60 * 60),
            cache_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            request_timeout: Duration::from_secs(30),
            batch_pacing_delay: Duration::from_millis(100),
            channels_path: PathBuf::from("config/channels.json"),
            cache_path: PathBuf::from("data/enrichment_cache.json"),
            index_path: PathBuf::from("data/local_index.json"),
            videos_dir: PathBuf::from("data/videos"),
            checkpoint_path: PathBuf::from("data/matches_checkpoint.json"),
        }
    }
}
