//! Title/duration/tier gates that eliminate non-educational candidates before any
//! expensive matching or enrichment work.

use std::collections::HashMap;

use chess_video_core::Video;
use chess_video_types::QualityTier;

const TOURNAMENT_LIVE: &[&str] = &["tournament", "live", "stream", "round"];
const NON_CHESS_SPORTS: &[&str] = &["football", "basketball", "soccer", "baseball", "tennis", "golf"];
const CASUAL_FORMATS: &[&str] = &["blitz", "bullet", "rapid", "casual"];
const REACTION_COMMENTARY: &[&str] = &["reaction", "commentary", "react"];
const PODCAST_INTERVIEW: &[&str] = &["podcast", "interview"];
const NON_CHESS_TOPICS: &[&str] = &["cooking", "recipe", "workout", "fitness", "vlog"];
const EDUCATIONAL_FAMILIES: &[&str] = &["opening", "tactics", "endgame", "analysis", "strategy"];

const PREMIUM_DURATION_FLOOR_SECS: u64 = 240;
const STANDARD_DURATION_FLOOR_SECS: u64 = 480;

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Parse a YouTube-style ISO-8601 period duration (`P[nD]T[nH][nM][nS]`) into seconds.
/// Returns `None` on malformed input, in which case the duration check is skipped.
#[must_use]
pub fn parse_duration_seconds(input: &str) -> Option<u64> {
    let rest = input.strip_prefix('P')?;
    let mut total: u64 = 0;
    let mut in_time = false;
    let mut digits = String::new();

    for ch in rest.chars() {
        match ch {
            'T' => {
                if in_time || !digits.is_empty() {
                    return None;
                }
                in_time = true;
            }
            '0'..='9' => digits.push(ch),
            'D' if !in_time => {
                total += digits.parse::<u64>().ok()? * 86_400;
                digits.clear();
            }
            'H' if in_time => {
                total += digits.parse::<u64>().ok()? * 3_600;
                digits.clear();
            }
            'M' if in_time => {
                total += digits.parse::<u64>().ok()? * 60;
                digits.clear();
            }
            'S' if in_time => {
                total += digits.parse::<u64>().ok()?;
                digits.clear();
            }
            _ => return None,
        }
    }

    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

/// Whether `video` survives the pre-filter gates for a channel of the given `tier`.
#[must_use]
pub fn pre_filter_video(video: &Video, tier: QualityTier) -> bool {
    let title = video.title.to_lowercase();

    if contains_any(&title, TOURNAMENT_LIVE)
        || contains_any(&title, NON_CHESS_SPORTS)
        || contains_any(&title, CASUAL_FORMATS)
        || contains_any(&title, REACTION_COMMENTARY)
        || contains_any(&title, PODCAST_INTERVIEW)
        || contains_any(&title, NON_CHESS_TOPICS)
    {
        return false;
    }

    if let Some(duration) = video.duration.as_deref().and_then(parse_duration_seconds) {
        let floor = match tier {
            QualityTier::Premium => PREMIUM_DURATION_FLOOR_SECS,
            QualityTier::Standard => STANDARD_DURATION_FLOOR_SECS,
        };
        if duration < floor {
            return false;
        }
    }

    if tier == QualityTier::Standard && contains_any(&title, CASUAL_FORMATS) {
        return false;
    }

    contains_any(&title, EDUCATIONAL_FAMILIES)
}

/// Batch-level result of running the pre-filter over a set of candidates.
#[derive(Debug, Clone)]
pub struct PreFilterResult {
    /// Videos that survived the gates.
    pub candidates: Vec<Video>,
    /// Number of videos the batch started with.
    pub total_input: usize,
    /// Number of videos rejected.
    pub rejected_count: usize,
    /// Percentage of the input rejected, 0.0 when the input was empty.
    pub reduction_percentage: f64,
}

/// Run the pre-filter over `videos`, looking up each video's channel tier in `tiers`
/// (unknown channels are treated as standard-tier).
#[must_use]
pub fn pre_filter_batch(videos: Vec<Video>, tiers: &HashMap<String, QualityTier>) -> PreFilterResult {
    let total_input = videos.len();
    let candidates: Vec<Video> = videos
        .into_iter()
        .filter(|video| {
            let tier = tiers
                .get(&video.channel_id)
                .copied()
                .unwrap_or(QualityTier::Standard);
            pre_filter_video(video, tier)
        })
        .collect();
    let rejected_count = total_input - candidates.len();
    let reduction_percentage = if total_input == 0 {
        0.0
    } else {
        (rejected_count as f64 / total_input as f64) * 100.0
    };

    PreFilterResult {
        candidates,
        total_input,
        rejected_count,
        reduction_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_video_core::video::{ContentDetails, Statistics, VideoStatus};
    use std::collections::HashMap as Map;

    fn video(title: &str, duration: Option<&str>) -> Video {
        Video {
            id: "v1".to_string(),
            title: title.to_string(),
            description: String::new(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            channel_id: "c1".to_string(),
            channel_title: "Chess Channel".to_string(),
            thumbnails: Map::new(),
            duration: duration.map(str::to_string),
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

    #[test]
    fn malformed_duration_returns_none() {
        assert_eq!(parse_duration_seconds("not-a-duration"), None);
        assert_eq!(parse_duration_seconds("PT10X"), None);
    }

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_duration_seconds("PT1H2M3S"), Some(3_723));
        assert_eq!(parse_duration_seconds("PT14M32S"), Some(872));
    }

    #[test]
    fn rejects_tournament_titles() {
        let v = video("2024 Candidates Tournament Round 5", Some("PT30M"));
        assert!(!pre_filter_video(&v, QualityTier::Premium));
    }

    #[test]
    fn rejects_short_duration_for_standard_tier() {
        let v = video("Sicilian Opening Theory Explained", Some("PT5M"));
        assert!(!pre_filter_video(&v, QualityTier::Standard));
    }

    #[test]
    fn accepts_educational_title_above_floor() {
        let v = video("Sicilian Opening Theory Explained", Some("PT10M"));
        assert!(pre_filter_video(&v, QualityTier::Standard));
    }

    #[test]
    fn skips_duration_check_on_malformed_string() {
        let v = video("Sicilian Opening Theory Explained", Some("garbage"));
        assert!(pre_filter_video(&v, QualityTier::Premium));
    }

    #[test]
    fn is_pure() {
        let v = video("King's Indian Attack Strategy Guide", Some("PT20M"));
        assert_eq!(
            pre_filter_video(&v, QualityTier::Standard),
            pre_filter_video(&v, QualityTier::Standard)
        );
    }

    #[test]
    fn exclusion_families_only_inspect_the_title_not_description_or_tags() {
        let mut v = video("Sicilian Opening Theory Explained", Some("PT10M"));
        v.description = "recorded live at a tournament".to_string();
        v.tags = vec!["blitz".to_string()];
        assert!(pre_filter_video(&v, QualityTier::Standard));
    }

    #[test]
    fn acceptance_gate_only_inspects_the_title_not_tags() {
        let mut v = video("Random Evening Highlights Video", Some("PT10M"));
        v.tags = vec!["tactics".to_string(), "opening theory".to_string()];
        assert!(!pre_filter_video(&v, QualityTier::Standard));
    }
}
