//! Collapses per-opening match lists into one unique-video set plus a reverse index
//! of which openings claimed each video, so enrichment runs once per video.

use std::collections::HashMap;

use chess_video_core::Video;

use crate::matcher::OpeningMatches;

/// Result of collapsing a set of per-opening matches into unique videos.
#[derive(Debug, Clone)]
pub struct DedupResult {
    /// Every distinct matched video, in first-seen order.
    pub unique_videos: Vec<Video>,
    /// Video id -> fingerprints of the openings that matched it.
    pub video_openings: HashMap<String, Vec<String>>,
}

/// Deduplicate `opening_matches` by video id. Iterates `opening_matches` in the order
/// given (callers pass an opening-ordered, not hash-ordered, slice) so the resulting
/// `unique_videos` order is deterministic across runs.
#[must_use]
pub fn deduplicate(opening_matches: &[OpeningMatches]) -> DedupResult {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut unique_videos: Vec<Video> = Vec::new();
    let mut video_openings: HashMap<String, Vec<String>> = HashMap::new();

    for om in opening_matches {
        for m in &om.matches {
            let id = m.video.id.clone();
            seen.entry(id.clone()).or_insert_with(|| {
                unique_videos.push(m.video.clone());
                unique_videos.len() - 1
            });
            video_openings.entry(id).or_default().push(om.fen.clone());
        }
    }

    DedupResult {
        unique_videos,
        video_openings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_video_core::video::{
        ContentDetails, MatchType, Statistics, VideoStatus,
    };
    use chess_video_core::Match;
    use std::collections::HashMap as Map;

    fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: "Sicilian Defense Theory".to_string(),
            description: String::new(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            channel_id: "c1".to_string(),
            channel_title: "Chess Channel".to_string(),
            thumbnails: Map::new(),
            duration: Some("PT12M".to_string()),
            tags: vec![],
            category_id: None,
            language_hint: None,
            statistics: Statistics::default(),
            content_details: ContentDetails::default(),
            status: VideoStatus::default(),
            topic_categories: vec![],
            has_enhanced_metadata: true,
        }
    }

    fn opening_matches(fen: &str, ids: &[&str]) -> OpeningMatches {
        OpeningMatches {
            fen: fen.to_string(),
            matches: ids
                .iter()
                .map(|id| Match {
                    video: video(id),
                    score: 75,
                    match_type: MatchType::Exact,
                })
                .collect(),
        }
    }

    #[test]
    fn shared_video_is_counted_once_with_both_openings_recorded() {
        let om = vec![
            opening_matches("fen-a", &["v1", "v2"]),
            opening_matches("fen-b", &["v2", "v3"]),
        ];
        let result = deduplicate(&om);
        assert_eq!(result.unique_videos.len(), 3);
        assert_eq!(
            result.video_openings.get("v2").unwrap(),
            &vec!["fen-a".to_string(), "fen-b".to_string()]
        );
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let om = vec![
            opening_matches("fen-a", &["v3", "v1"]),
            opening_matches("fen-b", &["v2"]),
        ];
        let result = deduplicate(&om);
        let ids: Vec<&str> = result.unique_videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["v3", "v1", "v2"]);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = deduplicate(&[]);
        assert!(result.unique_videos.is_empty());
        assert!(result.video_openings.is_empty());
    }
}
