//! End-to-end scenarios exercising the indexer, matcher, deduplicator, and enricher
//! together against a deterministic mock upstream client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chess_video_core::upstream::UpstreamClient;
use chess_video_core::video::{
    ContentDetails, Definition, Opening, Statistics, VideoStatus,
};
use chess_video_core::{PipelineError, Video};
use chess_video_mock::MockUpstreamClient;
use chess_video_middleware::EnrichmentCache;
use chess_video_pipeline::{build_local_index, deduplicate, enrich_unique_videos, match_all};
use chess_video_types::QualityTier;
use tempfile::tempdir;

fn video(id: &str, channel_id: &str, title: &str) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        published_at: "2024-06-01T00:00:00Z".to_string(),
        channel_id: channel_id.to_string(),
        channel_title: "Chess Channel".to_string(),
        thumbnails: HashMap::new(),
        duration: Some("PT20M".to_string()),
        tags: vec!["opening theory".to_string()],
        category_id: Some("27".to_string()),
        language_hint: Some("en".to_string()),
        statistics: Statistics {
            views: 1_000_000,
            likes: 60_000,
            comments: 5_000,
        },
        content_details: ContentDetails {
            definition: Definition::Hd,
            caption: true,
        },
        status: VideoStatus {
            embeddable: true,
            public_stats_viewable: true,
        },
        topic_categories: vec!["chess strategy".to_string()],
        has_enhanced_metadata: true,
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

fn obscure() -> Opening {
    Opening {
        fen: "startpos".to_string(),
        eco: "A00".to_string(),
        name: "Obscure Opening".to_string(),
        variation: None,
        aliases: vec![],
        moves: vec![],
    }
}

#[tokio::test]
async fn scenario_1_index_build_with_partial_quota_exhaustion() {
    let mock = MockUpstreamClient::new();
    mock.set_channel_uploads(
        "C1",
        vec![video("v1", "C1", "Opening Theory One"), video("v2", "C1", "Opening Theory Two")],
    )
    .await;
    mock.set_video_details(vec![video("v1", "C1", "Opening Theory One"), video("v2", "C1", "Opening Theory Two")])
        .await;
    mock.fail_channel_uploads("C2", PipelineError::RateLimited).await;

    let client: Arc<dyn UpstreamClient> = Arc::new(mock);
    let (index, result) = build_local_index(
        &["C1".to_string(), "C2".to_string()],
        &client,
        Duration::from_secs(60 * 60 * 24 * 365 * 15),
    )
    .await
    .expect("partial failure must not abort the build");

    assert_eq!(result.total_videos, 2);
    assert_eq!(result.channels_covered, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].0, "C2");
    assert_eq!(index.get("C1").unwrap().len(), 2);
}

#[tokio::test]
async fn scenario_2_index_build_with_only_failures_raises_quota_exceeded() {
    let mock = MockUpstreamClient::new();
    mock.fail_channel_uploads("C1", PipelineError::Parse("API rate limit exceeded".to_string()))
        .await;

    let client: Arc<dyn UpstreamClient> = Arc::new(mock);
    let result = build_local_index(&["C1".to_string()], &client, Duration::from_secs(86_400)).await;

    assert!(matches!(result, Err(PipelineError::QuotaExceeded { .. })));
}

#[test]
fn scenario_3_match_with_aliases_yields_exactly_one_positive_match() {
    let candidates = vec![video("v1", "C1", "Center Counter Defense Guide")];
    let tiers: HashMap<String, QualityTier> = [("C1".to_string(), QualityTier::Standard)].into();

    let matches = match_all(&[scandinavian()], &candidates, &tiers, 10);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matches.len(), 1);
    assert!(matches[0].matches[0].score > 0);
}

#[test]
fn scenario_4_no_match_against_unrelated_index() {
    let candidates = vec![
        video("v1", "C1", "Sicilian Defense Theory"),
        video("v2", "C1", "Queens Gambit Declined Masterclass"),
    ];
    let tiers: HashMap<String, QualityTier> = [("C1".to_string(), QualityTier::Standard)].into();

    let matches = match_all(&[obscure()], &candidates, &tiers, 10);

    assert_eq!(matches.len(), 1);
    assert!(matches[0].matches.is_empty());
}

#[test]
fn scenario_5_dedup_saving_across_shared_videos() {
    let shared: Vec<Video> = (1..=5)
        .map(|i| video(&format!("v{i}"), "C1", "Opening Theory Shared"))
        .collect();
    let tiers: HashMap<String, QualityTier> = [("C1".to_string(), QualityTier::Standard)].into();

    let openings = vec![
        Opening {
            fen: "fen-a".to_string(),
            eco: "B01".to_string(),
            name: "Opening Theory Alpha".to_string(),
            variation: None,
            aliases: vec![],
            moves: vec![],
        },
        Opening {
            fen: "fen-b".to_string(),
            eco: "B01".to_string(),
            name: "Opening Theory Beta".to_string(),
            variation: None,
            aliases: vec![],
            moves: vec![],
        },
        Opening {
            fen: "fen-c".to_string(),
            eco: "B01".to_string(),
            name: "Opening Theory Gamma".to_string(),
            variation: None,
            aliases: vec![],
            moves: vec![],
        },
    ];

    let opening_matches = match_all(&openings, &shared, &tiers, 10);
    for om in &opening_matches {
        assert_eq!(om.matches.len(), 5);
    }

    let dedup_result = deduplicate(&opening_matches);
    assert_eq!(dedup_result.unique_videos.len(), 5);

    for fen in ["fen-a", "fen-b", "fen-c"] {
        for video in &dedup_result.unique_videos {
            assert!(dedup_result.video_openings[&video.id].contains(&fen.to_string()));
        }
    }
}

#[tokio::test]
async fn scenario_6_warm_cache_run_reuses_every_entry_with_no_upstream_calls() {
    let dir = tempdir().unwrap();
    let cache = EnrichmentCache::load(dir.path().join("cache.json"), Duration::from_secs(7 * 24 * 3600));
    let tiers: HashMap<String, QualityTier> = [("C1".to_string(), QualityTier::Premium)].into();

    let videos: Vec<Video> = (1..=50)
        .map(|i| video(&format!("v{i}"), "C1", "Opening Theory Warm Cache"))
        .collect();

    let first_pass = enrich_unique_videos(videos.clone(), &cache, &tiers, 50, Duration::from_millis(1), |_| {}).await;
    assert_eq!(first_pass.len(), 50);
    assert!(first_pass.iter().all(|v| !v.metadata.cached));

    let mut from_cache_count = 0usize;
    let second_pass = enrich_unique_videos(videos, &cache, &tiers, 50, Duration::from_millis(1), |progress| {
        if progress.from_cache {
            from_cache_count += 1;
        }
    })
    .await;

    assert_eq!(second_pass.len(), 50);
    assert_eq!(from_cache_count, 50);
}
