//! Phase sequencing: load-or-build index, RSS delta, pre-filter, match, checkpoint,
//! dedup, enrich, remap, and persist — the thin glue wiring each leaf module together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chess_video_core::video::Opening;
use chess_video_core::{PipelineError, UpstreamClient};
use chess_video_middleware::EnrichmentCache;
use chess_video_types::{PipelineConfig, QualityTier, TrustedChannel};

use crate::persistence::RunMetrics;
use crate::{dedup, enrich, indexer, matcher, persistence, prefilter, rss_delta};

/// Source of the opening catalog the orchestrator matches against. The real loader
/// lives outside this crate; this seam lets tests and the CLI binary supply one.
pub trait OpeningCatalog: Send + Sync {
    /// The full set of openings to consider for this run.
    fn openings(&self) -> &[Opening];
}

/// Sink for orchestrator progress events during the matching phase.
pub trait ProgressSink: Send + Sync {
    /// Called periodically while scoring openings against the candidate pool.
    fn on_progress(&self, processed: usize, total: usize, rate_per_sec: f64, matches_so_far: usize);
}

/// A [`ProgressSink`] that logs through `tracing` when the `tracing` feature is
/// enabled, and does nothing otherwise.
#[derive(Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_progress(&self, processed: usize, total: usize, rate_per_sec: f64, matches_so_far: usize) {
        #[cfg(feature = "tracing")]
        tracing::info!(processed, total, rate_per_sec, matches_so_far, "matching progress");
        #[cfg(not(feature = "tracing"))]
        let _ = (processed, total, rate_per_sec, matches_so_far);
    }
}

/// A [`ProgressSink`] that discards every event, used in tests.
#[derive(Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_progress(&self, _processed: usize, _total: usize, _rate_per_sec: f64, _matches_so_far: usize) {}
}

/// Per-run options controlling which openings are considered and whether state is
/// reused from a prior run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict to openings whose ECO code starts with this letter.
    pub eco_filter: Option<char>,
    /// Bypass a recent index snapshot and rebuild from scratch.
    pub force_rebuild: bool,
    /// Skip openings that already have a non-empty video file.
    pub resume: bool,
}

/// Structured summary returned at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of openings processed (matched and written).
    pub processed: usize,
    /// Per-opening or per-phase error descriptions.
    pub errors: Vec<String>,
    /// Number of openings skipped (already had videos, resume mode).
    pub skipped: usize,
    /// Total EnrichedVideo instances newly added across all opening files.
    pub videos_added: usize,
    /// Aggregate run metrics.
    pub metrics: RunMetrics,
}

/// Owns the long-lived state for a single pipeline run: configuration, the trusted
/// channel set, the governed upstream client, the enrichment cache, and the catalog
/// and progress-sink seams.
pub struct Orchestrator {
    config: PipelineConfig,
    channels: Vec<TrustedChannel>,
    client: Arc<dyn UpstreamClient>,
    cache: EnrichmentCache,
    catalog: Box<dyn OpeningCatalog>,
    progress: Box<dyn ProgressSink>,
}

impl Orchestrator {
    /// Build an orchestrator, loading the enrichment cache from `config.cache_path`.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        channels: Vec<TrustedChannel>,
        client: Arc<dyn UpstreamClient>,
        catalog: Box<dyn OpeningCatalog>,
        progress: Box<dyn ProgressSink>,
    ) -> Self {
        let cache = EnrichmentCache::load(config.cache_path.clone(), config.cache_ttl);
        Self {
            config,
            channels,
            client,
            cache,
            catalog,
            progress,
        }
    }

    fn channel_tiers(&self) -> HashMap<String, QualityTier> {
        self.channels
            .iter()
            .map(|c| (c.channel_id.clone(), c.quality_tier))
            .collect()
    }

    /// Run the full pipeline once: index, pre-filter, match, checkpoint, dedup,
    /// enrich, and persist per-opening video files.
    ///
    /// # Errors
    /// Returns `PipelineError::QuotaExceeded` when index building exhausts quota with
    /// no channels covered; propagates index/checkpoint write `Io` failures at the
    /// boundaries the specification marks as fatal.
    pub async fn run(&self, opts: RunOptions) -> Result<RunSummary, PipelineError> {
        let channel_ids: Vec<String> = self.channels.iter().map(|c| c.channel_id.clone()).collect();
        let tiers = self.channel_tiers();

        let (mut index, mut persisted_enriched) = if !opts.force_rebuild
            && persistence::is_index_recent(&self.config.index_path)
            && let Some(existing) = persistence::load_index(&self.config.index_path)
        {
            existing
        } else {
            let (index, _build_result) =
                indexer::build_local_index(&channel_ids, &self.client, self.config.history_window).await?;
            (index, HashMap::new())
        };

        let rss_result = rss_delta::update_from_rss(&channel_ids, self.client.as_ref(), &mut index).await;

        let mut errors: Vec<String> = rss_result
            .errors
            .iter()
            .map(|(channel_id, error)| format!("rss({channel_id}): {error}"))
            .collect();

        let mut skipped = 0usize;
        let openings: Vec<Opening> = self
            .catalog
            .openings()
            .iter()
            .filter(|o| opts.eco_filter.is_none_or(|letter| o.eco.starts_with(letter)))
            .filter(|o| {
                let already_done = opts.resume && persistence::has_existing_videos(&self.config.videos_dir, &o.fen);
                if already_done {
                    skipped += 1;
                }
                !already_done
            })
            .cloned()
            .collect();

        let all_videos: Vec<chess_video_core::Video> = index.values().flatten().cloned().collect();
        let total_videos_indexed = all_videos.len();

        let pre_filter_result = prefilter::pre_filter_batch(all_videos, &tiers);
        let candidates_after_prefilter = pre_filter_result.candidates.len();

        let start = Instant::now();
        let opening_matches = matcher::match_all(
            &openings,
            &pre_filter_result.candidates,
            &tiers,
            self.config.max_results_per_opening,
        );
        let rate_per_sec = openings.len() as f64 / start.elapsed().as_secs_f64().max(0.001);
        let matches_count = opening_matches.iter().filter(|om| !om.matches.is_empty()).count();
        let total_video_instances: usize = opening_matches.iter().map(|om| om.matches.len()).sum();
        self.progress
            .on_progress(openings.len(), openings.len(), rate_per_sec, matches_count);

        let metrics = RunMetrics {
            total_videos_indexed,
            candidates_after_prefilter,
            quota_used: 0,
        };

        persistence::write_checkpoint(
            &self.config.checkpoint_path,
            &persistence::MatchesCheckpoint {
                timestamp: chrono::Utc::now(),
                phase: "matching".to_string(),
                openings_count: openings.len(),
                matches_count,
                total_video_instances,
                metrics: metrics.clone(),
                matches: opening_matches.clone(),
            },
        )?;

        let dedup_result = dedup::deduplicate(&opening_matches);

        let mut last_log = Instant::now();
        let enriched = enrich::enrich_unique_videos(
            dedup_result.unique_videos,
            &self.cache,
            &tiers,
            self.config.batch_size,
            self.config.batch_pacing_delay,
            |progress| {
                if last_log.elapsed() >= Duration::from_secs(2) || progress.processed == progress.total {
                    self.progress.on_progress(progress.processed, progress.total, 0.0, 0);
                    last_log = Instant::now();
                }
            },
        )
        .await;

        persisted_enriched.extend(enriched.into_iter().map(|v| (v.video.id.clone(), v)));
        let groups = enrich::remap_to_opening_groups(&opening_matches, &persisted_enriched);
        persistence::save_index(&self.config.index_path, &index, &persisted_enriched)?;

        let mut videos_added = 0usize;
        let mut processed = 0usize;
        for opening in &openings {
            let videos = groups.get(&opening.fen).cloned().unwrap_or_default();
            videos_added += videos.len();
            match persistence::write_video_file(
                &self.config.videos_dir,
                &opening.fen,
                &opening.name,
                &opening.eco,
                videos,
            ) {
                Ok(()) => processed += 1,
                Err(error) => errors.push(format!("write({}): {error}", opening.fen)),
            }
        }

        Ok(RunSummary {
            processed,
            errors,
            skipped,
            videos_added,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_video_mock::MockUpstreamClient;
    use chess_video_types::QualityTier;
    use tempfile::tempdir;

    struct FixedCatalog(Vec<Opening>);
    impl OpeningCatalog for FixedCatalog {
        fn openings(&self) -> &[Opening] {
            &self.0
        }
    }

    fn scandinavian() -> Opening {
        Opening {
            fen: "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 2".to_string(),
            eco: "B01".to_string(),
            name: "Scandinavian Defense".to_string(),
            variation: None,
            aliases: vec!["Center Counter Defense".to_string()],
            moves: vec!["e4".to_string(), "d5".to_string()],
        }
    }

    fn sample_video(id: &str) -> chess_video_core::Video {
        chess_video_core::Video {
            id: id.to_string(),
            title: "Center Counter Defense Guide".to_string(),
            description: "opening theory lesson".to_string(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            channel_id: "UC1".to_string(),
            channel_title: "Chess Channel".to_string(),
            thumbnails: HashMap::new(),
            duration: Some("PT20M".to_string()),
            tags: vec!["opening theory".to_string()],
            category_id: Some("27".to_string()),
            language_hint: Some("en".to_string()),
            statistics: chess_video_core::video::Statistics {
                views: 1_000_000,
                likes: 60_000,
                comments: 5_000,
            },
            content_details: chess_video_core::video::ContentDetails {
                definition: chess_video_core::video::Definition::Hd,
                caption: true,
            },
            status: chess_video_core::video::VideoStatus {
                embeddable: true,
                public_stats_viewable: true,
            },
            topic_categories: vec!["chess strategy".to_string()],
            has_enhanced_metadata: true,
        }
    }

    #[tokio::test]
    async fn end_to_end_run_writes_a_video_file_for_a_matched_opening() {
        let dir = tempdir().unwrap();
        let mock = MockUpstreamClient::new();
        mock.set_channel_uploads("UC1", vec![sample_video("v1")]).await;
        mock.set_video_details(vec![sample_video("v1")]).await;

        let mut config = PipelineConfig::default();
        config.index_path = dir.path().join("index.json");
        config.cache_path = dir.path().join("cache.json");
        config.videos_dir = dir.path().join("videos");
        config.checkpoint_path = dir.path().join("checkpoint.json");
        config.max_results_per_opening = 10;

        let channels = vec![TrustedChannel {
            channel_id: "UC1".to_string(),
            name: "Chess Channel".to_string(),
            quality_tier: QualityTier::Standard,
            priority: 0,
        }];

        let orchestrator = Orchestrator::new(
            config.clone(),
            channels,
            Arc::new(mock),
            Box::new(FixedCatalog(vec![scandinavian()])),
            Box::new(NoopProgressSink),
        );

        let summary = orchestrator.run(RunOptions::default()).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.videos_added, 1);

        let file = persistence::read_video_file(&config.videos_dir, &scandinavian().fen).unwrap();
        assert_eq!(file.video_count, 1);
        assert_eq!(file.videos[0].video.id, "v1");
    }
}
