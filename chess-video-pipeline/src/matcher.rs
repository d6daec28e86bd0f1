//! Pattern generation and scoring: matches a catalog of openings against a local
//! index of candidate videos without issuing any further upstream calls.

use std::collections::HashMap;

use chess_video_core::video::{Definition, Match, MatchType, Opening, Video};
use chess_video_core::{family_for_eco, family_from_text, is_severely_incompatible};
use chess_video_types::QualityTier;
use serde::{Deserialize, Serialize};

const STOP_WORDS: &[&str] = &["the", "and", "for", "defense", "attack", "gambit", "opening"];
const CHESS_KEYWORDS: &[&str] = &[
    "opening",
    "theory",
    "repertoire",
    "preparation",
    "strategy",
    "tactics",
    "masterclass",
    "explained",
    "basics",
    "advanced",
    "complete",
    "course",
];

/// YouTube's "Education" category id, used for the category-based scoring bonus.
const EDUCATION_CATEGORY_ID: &str = "27";

/// Minimum total score a (video, opening) pair must reach to survive as a match.
const MIN_ACCEPTANCE_SCORE: i64 = 60;

/// Moderate-mismatch penalty applied when the video's title cues a different, but not
/// severely incompatible, ECO family than the opening.
const FAMILY_MISMATCH_PENALTY: f64 = 30.0;

fn significant_words(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

fn eco_compounds(eco: &str) -> Vec<String> {
    let eco = eco.to_lowercase();
    vec![
        format!("{eco} opening"),
        format!("{eco} chess"),
        format!("{eco} theory"),
    ]
}

/// Generate the deduplicated, length-descending pattern list used to pre-select and
/// score candidate videos for `opening`.
#[must_use]
pub fn generate_patterns(opening: &Opening) -> Vec<String> {
    let mut patterns = vec![opening.name.to_lowercase(), opening.eco.to_lowercase()];
    patterns.extend(opening.aliases.iter().map(|a| a.to_lowercase()));

    let words = significant_words(&opening.name);
    for word in &words {
        patterns.push(word.clone());
        for keyword in CHESS_KEYWORDS {
            patterns.push(format!("{word} {keyword}"));
            patterns.push(format!("{keyword} {word}"));
        }
    }
    patterns.extend(eco_compounds(&opening.eco));

    patterns.retain(|p| p.len() >= 3);
    patterns.sort();
    patterns.dedup();
    patterns.sort_by_key(|p| std::cmp::Reverse(p.len()));
    patterns
}

/// True if `video`'s searchable text contains any of `patterns`.
#[must_use]
pub fn matches_any_pattern(video: &Video, patterns: &[String]) -> bool {
    let haystack = video.searchable_text();
    patterns.iter().any(|p| haystack.contains(p.as_str()))
}

/// Classify the rubric component responsible for `video` matching `opening`. Always
/// returns a type: callers only invoke this once [`matches_any_pattern`] has already
/// confirmed a pattern hit exists somewhere in the video's searchable text, so the
/// final branch falls back to [`MatchType::Pattern`] rather than discarding the match.
fn classify_match_type(video: &Video, opening: &Opening) -> MatchType {
    let title = video.title.to_lowercase();
    let name = opening.name.to_lowercase();

    if title.contains(&name) {
        return MatchType::TitleExact;
    }
    if opening.aliases.iter().any(|a| title.contains(&a.to_lowercase())) {
        return MatchType::Exact;
    }
    if title.contains(&opening.eco.to_lowercase()) {
        return MatchType::Abbreviation;
    }
    if let (Some(video_family), Some(opening_family)) =
        (family_from_text(&video.searchable_text()), family_for_eco(&opening.eco))
        && video_family == opening_family
    {
        return MatchType::Family;
    }
    if significant_words(&opening.name).iter().any(|w| title.contains(w)) {
        return MatchType::PartialTitle;
    }
    if eco_compounds(&opening.eco)
        .iter()
        .any(|p| video.searchable_text().contains(p.as_str()))
    {
        return MatchType::Eco;
    }
    MatchType::Pattern
}

/// Score a single (video, opening) pair. Returns `None` when no pattern matches at
/// all, or when the family safeguard and acceptance threshold reject the pair.
#[must_use]
pub fn score_opening_video(video: &Video, opening: &Opening, tier: QualityTier) -> Option<(i64, MatchType)> {
    let patterns = generate_patterns(opening);
    if !matches_any_pattern(video, &patterns) {
        return None;
    }
    let match_type = classify_match_type(video, opening);

    let title = video.title.to_lowercase();
    let description = video.description.to_lowercase();
    let tags = video.tags.join(" ").to_lowercase();

    let mut score = 0.0f64;
    for pattern in &patterns {
        if title.contains(pattern.as_str()) {
            score += 15.0;
        }
        if tags.contains(pattern.as_str()) {
            score += 12.0;
        }
        if description.contains(pattern.as_str()) {
            score += 5.0;
        }
    }

    let views = video.statistics.views;
    if views > 0 {
        score += 2.0 * (views as f64).log10();
        let engagement_rate =
            (video.statistics.likes + video.statistics.comments) as f64 / views as f64;
        score += (1000.0 * engagement_rate).min(10.0);
    }
    if video.content_details.definition == Definition::Hd {
        score += 3.0;
    }
    if video.content_details.caption {
        score += 2.0;
    }
    if video.category_id.as_deref() == Some(EDUCATION_CATEGORY_ID) {
        score += 5.0;
    }
    if video.topic_categories.iter().any(|t| {
        let t = t.to_lowercase();
        t.contains("chess") || t.contains("game") || t.contains("strategy")
    }) {
        score += 8.0;
    }
    if video
        .language_hint
        .as_deref()
        .is_some_and(|l| l.to_lowercase().starts_with("en"))
    {
        score += 2.0;
    }

    score *= match tier {
        QualityTier::Premium => 1.3,
        QualityTier::Standard => 1.1,
    };

    if let (Some(opening_family), Some(video_family)) =
        (family_for_eco(&opening.eco), family_from_text(&video.searchable_text()))
        && opening_family != video_family
    {
        if is_severely_incompatible(opening_family, video_family) {
            score = 0.0;
        } else {
            score -= FAMILY_MISMATCH_PENALTY;
        }
    }

    let score = score.max(0.0).round() as i64;
    if score < MIN_ACCEPTANCE_SCORE {
        return None;
    }
    Some((score, match_type))
}

fn sort_and_truncate(mut matches: Vec<Match>, max_results: usize) -> Vec<Match> {
    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.video.statistics.views.cmp(&a.video.statistics.views))
            .then_with(|| a.video.id.cmp(&b.video.id))
    });
    matches.truncate(max_results);
    matches
}

/// The matches selected for a single opening, keyed by its position fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningMatches {
    /// The opening's position fingerprint.
    pub fen: String,
    /// Top-N matches for this opening, sorted by score descending.
    pub matches: Vec<Match>,
}

/// Score and select top-N matches for every opening against `candidates`, preserving
/// `openings`' input order.
#[must_use]
pub fn match_all(
    openings: &[Opening],
    candidates: &[Video],
    channel_tiers: &HashMap<String, QualityTier>,
    max_results: usize,
) -> Vec<OpeningMatches> {
    openings
        .iter()
        .map(|opening| {
            let matches: Vec<Match> = candidates
                .iter()
                .filter_map(|video| {
                    let tier = channel_tiers
                        .get(&video.channel_id)
                        .copied()
                        .unwrap_or(QualityTier::Standard);
                    score_opening_video(video, opening, tier).map(|(score, match_type)| Match {
                        video: video.clone(),
                        score,
                        match_type,
                    })
                })
                .collect();
            OpeningMatches {
                fen: opening.fen.clone(),
                matches: sort_and_truncate(matches, max_results),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_video_core::video::{ContentDetails, Statistics, VideoStatus};
    use std::collections::HashMap as Map;

    fn opening() -> Opening {
        Opening {
            fen: "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 2".to_string(),
            eco: "B01".to_string(),
            name: "Scandinavian Defense".to_string(),
            variation: None,
            aliases: vec!["Center Counter Defense".to_string()],
            moves: vec!["e4".to_string(), "d5".to_string()],
        }
    }

    fn video(title: &str) -> Video {
        Video {
            id: "v1".to_string(),
            title: title.to_string(),
            description: String::new(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
            channel_id: "c1".to_string(),
            channel_title: "Chess Channel".to_string(),
            thumbnails: Map::new(),
            duration: Some("PT12M".to_string()),
            tags: vec![],
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
            status: VideoStatus::default(),
            topic_categories: vec!["chess strategy".to_string()],
            has_enhanced_metadata: true,
        }
    }

    #[test]
    fn patterns_are_deduplicated_and_length_sorted() {
        let patterns = generate_patterns(&opening());
        let mut sorted = patterns.clone();
        sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));
        assert_eq!(patterns, sorted);
        let unique: std::collections::HashSet<_> = patterns.iter().collect();
        assert_eq!(unique.len(), patterns.len());
    }

    #[test]
    fn alias_match_scores_positively() {
        let v = video("Center Counter Defense Guide");
        let tiers = Map::new();
        let matched = score_opening_video(&v, &opening(), QualityTier::Standard);
        assert!(matched.is_some());
        assert!(matched.unwrap().0 > 0);
        let _ = tiers;
    }

    #[test]
    fn unrelated_video_does_not_match() {
        let v = video("Queen's Gambit Declined Masterclass");
        let result = score_opening_video(&v, &opening(), QualityTier::Standard);
        assert!(result.is_none());
    }

    #[test]
    fn severe_family_conflict_forces_zero_and_is_rejected() {
        let mut o = opening();
        o.eco = "E20".to_string(); // Nimzo-Indian
        o.name = "Nimzo-Indian Defense".to_string();
        o.aliases = vec![];
        let v = video("Queens Gambit Indian Systems Masterclass");
        // Title cues Queen's Gambit while the opening is Nimzo-Indian: severe pair.
        let result = score_opening_video(&v, &o, QualityTier::Standard);
        assert!(result.is_none());
    }

    #[test]
    fn tag_only_compound_pattern_hit_still_yields_a_match() {
        let o = Opening {
            fen: "fen-trompowsky".to_string(),
            eco: "A45".to_string(),
            name: "Trompowsky Attack".to_string(),
            variation: None,
            aliases: vec![],
            moves: vec![],
        };
        let mut v = video("Unrelated title with no opening cues");
        // The only pattern hit lives in the tags, not the title/description, and the
        // opening name has no ECO-family title cue, so every specific classify branch
        // misses: this exercises the generic pattern-hit fallback.
        v.tags = vec!["trompowsky theory".to_string()];

        let result = score_opening_video(&v, &o, QualityTier::Standard);
        let (score, match_type) = result.expect("a tag-only compound pattern hit must still score a match");
        assert!(score > 0);
        assert_eq!(match_type, MatchType::Pattern);
    }

    #[test]
    fn top_n_tie_break_prefers_views_then_id() {
        let m1 = Match {
            video: video("a"),
            score: 80,
            match_type: MatchType::Exact,
        };
        let mut m2 = Match {
            video: video("b"),
            score: 80,
            match_type: MatchType::Exact,
        };
        m2.video.id = "v0".to_string();
        m2.video.statistics.views = 20_000;
        let sorted = sort_and_truncate(vec![m1, m2], 10);
        assert_eq!(sorted[0].video.id, "v0");
    }
}
