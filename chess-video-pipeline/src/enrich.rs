//! Turns the deduplicated unique-video set into `EnrichedVideo` records: cache lookup,
//! derived analysis fields, batch-boundary cache persistence, and remap back onto the
//! opening groups that referenced each video.

use std::collections::HashMap;
use std::time::Duration;

use chess_video_core::video::{
    ContentType, DifficultyLevel, EngagementMetrics, EnrichedMetadata, Tier, VideoAnalysis,
};
use chess_video_core::{EnrichedVideo, Video};
use chess_video_middleware::EnrichmentCache;
use chess_video_types::QualityTier;
use chrono::Utc;

use crate::matcher::OpeningMatches;

const BEGINNER_CUES: &[&str] = &["beginner", "basics", "introduction", "intro", "101", "fundamentals"];
const ADVANCED_CUES: &[&str] = &["advanced", "master", "expert", "grandmaster", "gm"];
const INTERMEDIATE_CUES: &[&str] = &["intermediate", "improving", "club"];

const GAME_ANALYSIS_CUES: &[&str] = &["game analysis", "analyzing", "annotated game", "my game"];
const TUTORIAL_CUES: &[&str] = &["tutorial", "how to", "lesson", "masterclass", "course"];
const OPENING_THEORY_CUES: &[&str] = &["theory", "repertoire", "preparation", "lines"];
const LIVE_CONTENT_CUES: &[&str] = &["live", "stream", "broadcast"];

const EDUCATIONAL_TAG_KEYWORDS: &[&str] = &["opening", "tactics", "endgame", "strategy", "theory", "lesson"];

const EDUCATION_CATEGORY_ID: &str = "27";

/// One progress tick emitted to the caller-supplied callback during enrichment.
#[derive(Debug, Clone)]
pub struct EnrichProgress {
    /// Videos processed so far, including this one.
    pub processed: usize,
    /// Total videos to process in this call.
    pub total: usize,
    /// Id of the video just processed.
    pub current: String,
    /// Whether this video was served from the cache.
    pub from_cache: bool,
    /// `processed / total * 100`, `100.0` when `total` is zero.
    pub percentage: f64,
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn derive_difficulty(text: &str) -> DifficultyLevel {
    if contains_any(text, BEGINNER_CUES) {
        DifficultyLevel::Beginner
    } else if contains_any(text, ADVANCED_CUES) {
        DifficultyLevel::Advanced
    } else if contains_any(text, INTERMEDIATE_CUES) {
        DifficultyLevel::Intermediate
    } else {
        DifficultyLevel::Intermediate
    }
}

fn derive_content_type(text: &str) -> ContentType {
    if contains_any(text, GAME_ANALYSIS_CUES) {
        ContentType::GameAnalysis
    } else if contains_any(text, TUTORIAL_CUES) {
        ContentType::Tutorial
    } else if contains_any(text, OPENING_THEORY_CUES) {
        ContentType::OpeningTheory
    } else if contains_any(text, LIVE_CONTENT_CUES) {
        ContentType::LiveContent
    } else {
        ContentType::General
    }
}

fn derive_video_quality(video: &Video) -> Tier {
    let mut points = 0;
    if video.content_details.definition == chess_video_core::video::Definition::Hd {
        points += 1;
    }
    if video.content_details.caption {
        points += 1;
    }
    if video.status.embeddable {
        points += 1;
    }
    if video.status.public_stats_viewable {
        points += 1;
    }
    if let Some(secs) = video
        .duration
        .as_deref()
        .and_then(crate::prefilter::parse_duration_seconds)
        && (300..=2_700).contains(&secs)
    {
        points += 1;
    }

    if points >= 5 {
        Tier::High
    } else if points >= 3 {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn derive_engagement(video: &Video) -> EngagementMetrics {
    let views = video.statistics.views;
    if views == 0 {
        return EngagementMetrics::default();
    }
    let likes = video.statistics.likes as f64;
    let comments = video.statistics.comments as f64;
    let views = views as f64;
    EngagementMetrics {
        engagement_rate: round4((likes + comments) / views),
        like_ratio: round4(likes / views),
        comment_ratio: round4(comments / views),
    }
}

fn derive_educational_value(video: &Video, engagement: &EngagementMetrics) -> Tier {
    let mut points = 0;
    if video.category_id.as_deref() == Some(EDUCATION_CATEGORY_ID) {
        points += 1;
    }
    if video.topic_categories.iter().any(|t| {
        let t = t.to_lowercase();
        t.contains("chess") || t.contains("game") || t.contains("strategy")
    }) {
        points += 1;
    }
    let educational_tag_count = video
        .tags
        .iter()
        .filter(|t| {
            let t = t.to_lowercase();
            EDUCATIONAL_TAG_KEYWORDS.iter().any(|kw| t.contains(kw))
        })
        .count()
        .min(3);
    points += educational_tag_count as i32;
    if video.content_details.caption {
        points += 1;
    }
    if engagement.engagement_rate > 0.05 {
        points += 1;
    }

    if points >= 7 {
        Tier::High
    } else if points >= 4 {
        Tier::Medium
    } else {
        Tier::Low
    }
}

fn derive_instructor_quality(channel_tiers: &HashMap<String, QualityTier>, channel_id: &str) -> Tier {
    match channel_tiers.get(channel_id) {
        Some(QualityTier::Premium) => Tier::High,
        Some(QualityTier::Standard) => Tier::Medium,
        None => Tier::Medium,
    }
}

fn build_enriched(video: Video, channel_tiers: &HashMap<String, QualityTier>, now: chrono::DateTime<Utc>) -> EnrichedVideo {
    let text = video.searchable_text();
    let engagement = derive_engagement(&video);
    let analysis = VideoAnalysis {
        relevance_score: 0,
        difficulty_level: derive_difficulty(&text),
        content_type: derive_content_type(&text),
        instructor_quality: derive_instructor_quality(channel_tiers, &video.channel_id),
        video_quality: derive_video_quality(&video),
        engagement_metrics: engagement,
        educational_value: derive_educational_value(&video, &engagement),
    };
    let url = video.watch_url();
    EnrichedVideo {
        video,
        url,
        analysis,
        metadata: EnrichedMetadata {
            indexed_at: now.to_rfc3339(),
            source: "channel-index".to_string(),
            version: 1,
            cached: false,
        },
    }
}

/// Enrich `videos` in fixed-size batches, reusing cache hits and computing the rest.
/// Persists the cache after every batch so a crash loses at most one batch's work, and
/// sleeps `pacing_delay` between batches.
pub async fn enrich_unique_videos(
    videos: Vec<Video>,
    cache: &EnrichmentCache,
    channel_tiers: &HashMap<String, QualityTier>,
    batch_size: usize,
    pacing_delay: Duration,
    mut on_progress: impl FnMut(EnrichProgress),
) -> Vec<EnrichedVideo> {
    let total = videos.len();
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(total);
    let now = Utc::now();
    let chunks: Vec<&[Video]> = videos.chunks(batch_size).collect();
    let last_chunk = chunks.len().saturating_sub(1);

    for (chunk_index, chunk) in chunks.into_iter().enumerate() {
        for video in chunk {
            let (mut enriched, from_cache) = match cache.get(&video.id, now).await {
                Some(cached) => (cached, true),
                None => {
                    let built = build_enriched(video.clone(), channel_tiers, now);
                    cache.insert(video.id.clone(), built.clone()).await;
                    (built, false)
                }
            };
            enriched.metadata.cached = from_cache;
            results.push(enriched);
            let processed = results.len();
            on_progress(EnrichProgress {
                processed,
                total,
                current: video.id.clone(),
                from_cache,
                percentage: if total == 0 {
                    100.0
                } else {
                    (processed as f64 / total as f64) * 100.0
                },
            });
        }

        // Batch boundary is the durability boundary: persist even if this was the last
        // chunk, and swallow IO failures per the cache's recovery policy.
        let _ = cache.persist().await;

        if chunk_index != last_chunk {
            tokio::time::sleep(pacing_delay).await;
        }
    }

    results
}

/// Remap a flat enriched-video set back onto the opening groups that referenced each
/// video, overriding `relevance_score` with that opening's own match score (the same
/// video can carry a different score per opening).
#[must_use]
pub fn remap_to_opening_groups(
    opening_matches: &[OpeningMatches],
    enriched_by_id: &HashMap<String, EnrichedVideo>,
) -> HashMap<String, Vec<EnrichedVideo>> {
    let mut groups: HashMap<String, Vec<EnrichedVideo>> = HashMap::new();
    for om in opening_matches {
        let mut videos = Vec::with_capacity(om.matches.len());
        for m in &om.matches {
            if let Some(enriched) = enriched_by_id.get(&m.video.id) {
                let mut enriched = enriched.clone();
                enriched.analysis.relevance_score = m.score;
                videos.push(enriched);
            }
        }
        groups.insert(om.fen.clone(), videos);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_video_core::video::{ContentDetails, Definition, Statistics, VideoStatus};
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn video(id: &str, title: &str) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            channel_id: "c1".to_string(),
            channel_title: "Chess Channel".to_string(),
            thumbnails: Map::new(),
            duration: Some("PT12M".to_string()),
            tags: vec!["opening theory".to_string()],
            category_id: Some("27".to_string()),
            language_hint: Some("en".to_string()),
            statistics: Statistics {
                views: 10_000,
                likes: 600,
                comments: 50,
            },
            content_details: ContentDetails {
                definition: Definition::Hd,
                caption: true,
            },
            status: VideoStatus {
                embeddable: true,
                public_stats_viewable: true,
            },
            topic_categories: vec!["chess".to_string()],
            has_enhanced_metadata: true,
        }
    }

    #[test]
    fn difficulty_precedence_checks_beginner_before_advanced() {
        assert_eq!(derive_difficulty("beginner grandmaster guide"), DifficultyLevel::Beginner);
        assert_eq!(derive_difficulty("grandmaster masterclass"), DifficultyLevel::Advanced);
        assert_eq!(derive_difficulty("club player improving"), DifficultyLevel::Intermediate);
        assert_eq!(derive_difficulty("totally unrelated text"), DifficultyLevel::Intermediate);
    }

    #[test]
    fn content_type_precedence_favors_game_analysis() {
        assert_eq!(
            derive_content_type("my game analysis vs tutorial content"),
            ContentType::GameAnalysis
        );
        assert_eq!(derive_content_type("opening theory repertoire"), ContentType::OpeningTheory);
        assert_eq!(derive_content_type("nothing chess related"), ContentType::General);
    }

    #[test]
    fn video_quality_reaches_high_with_all_five_signals() {
        let v = video("v1", "Opening Theory Deep Dive");
        assert_eq!(derive_video_quality(&v), Tier::High);
    }

    #[test]
    fn engagement_metrics_are_rounded_to_four_decimals() {
        let v = video("v1", "Opening Theory Deep Dive");
        let metrics = derive_engagement(&v);
        assert_eq!(metrics.engagement_rate, 0.065);
    }

    #[tokio::test]
    async fn batch_boundary_persists_cache_and_reports_progress() {
        let dir = tempdir().unwrap();
        let cache = EnrichmentCache::load(dir.path().join("cache.json"), Duration::from_secs(7 * 24 * 3600));
        let videos = vec![
            video("v1", "Opening Theory One"),
            video("v2", "Opening Theory Two"),
            video("v3", "Opening Theory Three"),
        ];
        let tiers = Map::new();
        let seen = AtomicUsize::new(0);

        let enriched = enrich_unique_videos(videos, &cache, &tiers, 2, Duration::from_millis(1), |p| {
            seen.store(p.processed, Ordering::SeqCst);
        })
        .await;

        assert_eq!(enriched.len(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn warm_cache_hit_is_reported_as_from_cache() {
        let dir = tempdir().unwrap();
        let cache = EnrichmentCache::load(dir.path().join("cache.json"), Duration::from_secs(7 * 24 * 3600));
        let videos = vec![video("v1", "Opening Theory One")];
        let tiers = Map::new();

        let _ = enrich_unique_videos(videos.clone(), &cache, &tiers, 50, Duration::from_millis(1), |_| {}).await;

        let mut from_cache_flags = vec![];
        let _ = enrich_unique_videos(videos, &cache, &tiers, 50, Duration::from_millis(1), |p| {
            from_cache_flags.push(p.from_cache);
        })
        .await;
        assert_eq!(from_cache_flags, vec![true]);
    }

    #[test]
    fn remap_overrides_relevance_score_per_opening() {
        let mut enriched_by_id = Map::new();
        enriched_by_id.insert(
            "v1".to_string(),
            build_enriched(video("v1", "Opening Theory One"), &Map::new(), Utc::now()),
        );
        let opening_matches = vec![OpeningMatches {
            fen: "fen-a".to_string(),
            matches: vec![chess_video_core::Match {
                video: video("v1", "Opening Theory One"),
                score: 77,
                match_type: chess_video_core::video::MatchType::Exact,
            }],
        }];
        let groups = remap_to_opening_groups(&opening_matches, &enriched_by_id);
        let videos = groups.get("fen-a").unwrap();
        assert_eq!(videos[0].analysis.relevance_score, 77);
    }
}
