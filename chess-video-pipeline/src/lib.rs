//! chess-video-pipeline orchestrates the channel-first indexing pipeline: enumerate
//! trusted channels once, pre-filter and score candidates against the opening
//! catalog, deduplicate and enrich the unique videos, and persist per-opening video
//! files.
//!
//! Overview
//! - `indexer` enumerates every video from each trusted channel, pagination and
//!   history cutoff included, then batches detail fetches.
//! - `rss_delta` polls each channel's Atom feed for uploads the indexer hasn't seen.
//! - `prefilter` applies cheap title/duration/tier gates ahead of scoring.
//! - `matcher` generates search patterns per opening and scores candidates with the
//!   text, quality, and ECO-family-safeguard rubric.
//! - `dedup` collapses per-opening match lists into one unique-video set.
//! - `enrich` derives analysis fields for each unique video, batching against the
//!   persistent enrichment cache.
//! - `persistence` writes per-opening video files, the index snapshot, and the
//!   matches checkpoint, all via atomic write-then-rename.
//! - `orchestrator` sequences the phases above and produces a run summary.
//! - `config` loads the TOML pipeline configuration and the JSON trusted-channel
//!   file.
#![warn(missing_docs)]

/// TOML + environment configuration loading.
pub mod config;
/// Unique-video extraction from per-opening match lists.
pub mod dedup;
/// Derived-analysis enrichment, batched against the persistent cache.
pub mod enrich;
/// Full paginated channel enumeration and batched detail fetch.
pub mod indexer;
/// Pattern generation, scoring rubric, and ECO-family safeguards.
pub mod matcher;
/// Phase sequencing and run summary.
pub mod orchestrator;
/// Content-addressed video files, index snapshot, and matches checkpoint.
pub mod persistence;
/// Title/duration/tier gates applied ahead of scoring.
pub mod prefilter;
/// RSS-based incremental upload discovery.
pub mod rss_delta;

pub use dedup::{deduplicate, DedupResult};
pub use enrich::{enrich_unique_videos, remap_to_opening_groups, EnrichProgress};
pub use indexer::{build_local_index, IndexBuildResult};
pub use matcher::{generate_patterns, match_all, score_opening_video, OpeningMatches};
pub use orchestrator::{NoopProgressSink, Orchestrator, OpeningCatalog, ProgressSink, RunOptions, RunSummary, TracingProgressSink};
pub use persistence::{
    has_existing_videos, is_index_recent, load_checkpoint, load_index, read_video_file,
    save_index, write_checkpoint, write_video_file, MatchesCheckpoint, RunMetrics, VideoFile,
};
pub use prefilter::{parse_duration_seconds, pre_filter_batch, pre_filter_video, PreFilterResult};
pub use rss_delta::{update_from_rss, RssUpdateResult};
