//! Domain types for raw and enriched videos, openings, and matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An immutable catalog entry loaded from the external opening store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    /// Opaque position fingerprint (FEN); primary key.
    pub fen: String,
    /// Three-character ECO classification, e.g. `"B01"`.
    pub eco: String,
    /// Canonical opening name.
    pub name: String,
    /// Optional variation name.
    #[serde(default)]
    pub variation: Option<String>,
    /// Alternative names for the opening.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Move sequence in SAN, e.g. `["e4", "d5"]`.
    #[serde(default)]
    pub moves: Vec<String>,
}

/// HD/SD content definition flag reported by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Definition {
    /// High definition.
    Hd,
    /// Standard definition.
    Sd,
}

/// View/engagement counters for a video.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// View count.
    pub views: u64,
    /// Like count.
    pub likes: u64,
    /// Comment count.
    pub comments: u64,
}

/// Content-details sub-object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentDetails {
    /// Video definition.
    pub definition: Definition,
    /// Whether captions are available.
    pub caption: bool,
}

impl Default for ContentDetails {
    fn default() -> Self {
        Self {
            definition: Definition::Sd,
            caption: false,
        }
    }
}

/// Status sub-object.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VideoStatus {
    /// Whether the video can be embedded elsewhere.
    pub embeddable: bool,
    /// Whether view/like counts are publicly visible.
    pub public_stats_viewable: bool,
}

/// A raw video as produced by the channel indexer, the RSS poller, or a detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// Upstream video id.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Video description.
    #[serde(default)]
    pub description: String,
    /// Publish timestamp, RFC 3339.
    pub published_at: String,
    /// Owning channel id.
    pub channel_id: String,
    /// Owning channel's display title.
    #[serde(default)]
    pub channel_title: String,
    /// Thumbnail URLs keyed by size name (`"default"`, `"medium"`, `"high"`, ...).
    #[serde(default)]
    pub thumbnails: HashMap<String, String>,
    /// ISO-8601-style period duration string, e.g. `"PT14M32S"`. Absent for RSS-derived
    /// partial records until a detail fetch fills it in.
    #[serde(default)]
    pub duration: Option<String>,
    /// Free-text tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Upstream category id.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Best-guess language hint (BCP-47 or a bare 2-letter code).
    #[serde(default)]
    pub language_hint: Option<String>,
    /// View/like/comment counters.
    #[serde(default)]
    pub statistics: Statistics,
    /// Definition/caption flags.
    #[serde(default)]
    pub content_details: ContentDetails,
    /// Embeddability/visibility flags.
    #[serde(default)]
    pub status: VideoStatus,
    /// Topic category URIs/labels.
    #[serde(default)]
    pub topic_categories: Vec<String>,
    /// Whether a detail fetch has populated the fields above beyond the partial record.
    #[serde(default)]
    pub has_enhanced_metadata: bool,
}

impl Video {
    /// The canonical watch URL for this video.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// The concatenated searchable text used by pre-filter and matcher: lower-cased
    /// title, description, and joined tags.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.to_lowercase(),
            self.description.to_lowercase(),
            self.tags.join(" ").to_lowercase()
        )
    }
}

/// Difficulty classification derived during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Suitable for players new to the opening or to chess study.
    Beginner,
    /// Assumes familiarity with basic opening principles.
    Intermediate,
    /// Assumes deep theoretical or competitive-play familiarity.
    Advanced,
}

/// Content-type classification derived during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// A specific game is analyzed move-by-move.
    GameAnalysis,
    /// A structured lesson teaching a concept or line.
    Tutorial,
    /// Theoretical coverage of opening lines without a specific game focus.
    OpeningTheory,
    /// A stream, broadcast, or other live-content recording.
    LiveContent,
    /// Anything not matching the above categories.
    General,
}

/// A generic low/medium/high tier, used by `instructorQuality`, `videoQuality`, and
/// `educationalValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
}

/// Engagement ratios, rounded to 4 decimal places during enrichment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// `(likes + comments) / views`.
    pub engagement_rate: f64,
    /// `likes / views`.
    pub like_ratio: f64,
    /// `comments / views`.
    pub comment_ratio: f64,
}

/// Analysis fields derived purely from already-available raw metadata; no additional
/// upstream call is made to produce these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    /// Relevance score from the last matching pass that touched this video, if any.
    pub relevance_score: i64,
    /// Estimated difficulty.
    pub difficulty_level: DifficultyLevel,
    /// Estimated content type.
    pub content_type: ContentType,
    /// Estimated instructor quality, from the trusted-channel-quality lookup.
    pub instructor_quality: Tier,
    /// Estimated production/video quality.
    pub video_quality: Tier,
    /// Engagement ratios.
    pub engagement_metrics: EngagementMetrics,
    /// Estimated educational value.
    pub educational_value: Tier,
}

/// Stable bookkeeping fields attached to every enriched video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedMetadata {
    /// RFC 3339 timestamp of when this record was produced or refreshed.
    pub indexed_at: String,
    /// Source identifier, e.g. `"channel-index"` or `"rss"`.
    pub source: String,
    /// Schema version of the enrichment record.
    pub version: u32,
    /// Whether this record was served from cache rather than freshly computed.
    pub cached: bool,
}

/// A [`Video`] plus the derived analysis and metadata produced by enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedVideo {
    /// The underlying raw video fields.
    #[serde(flatten)]
    pub video: Video,
    /// Canonical watch URL, precomputed for convenience.
    pub url: String,
    /// Derived analysis fields.
    pub analysis: VideoAnalysis,
    /// Stable bookkeeping metadata.
    pub metadata: EnrichedMetadata,
}

/// The rubric component that produced the largest contribution to a match's score,
/// recorded for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// The opening's exact canonical name appeared in the video title.
    TitleExact,
    /// An exact pattern (name, alias, or ECO compound) matched outside the title.
    Exact,
    /// The match was driven by ECO-family cues rather than a literal name hit.
    Family,
    /// A partial/substring title hit.
    PartialTitle,
    /// The ECO code itself, in abbreviated form, matched.
    Abbreviation,
    /// An ECO-code compound pattern (`"<eco> opening"`, etc.) matched.
    Eco,
    /// A generated pattern matched somewhere in the searchable text (title,
    /// description, or tags) without fitting any of the more specific categories
    /// above — still a real match, just not one worth a finer label.
    Pattern,
}

/// A scored (video, opening) pair, valid only for the pipeline run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// The matched video.
    pub video: Video,
    /// Final integer score after bonuses and family-safeguard adjustments.
    pub score: i64,
    /// The rubric component responsible for the top contribution.
    pub match_type: MatchType,
}

/// In-memory mapping of channel id to its ordered list of indexed videos.
///
/// Invariant: no duplicate video ids within a single channel's list.
pub type LocalIndex = HashMap<String, Vec<Video>>;
