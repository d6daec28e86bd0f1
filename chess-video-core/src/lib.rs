//! chess-video-core
//!
//! Domain types, the ECO-family classification tables, the fingerprint sanitization
//! rule, and the `UpstreamClient` trait shared across the chess-video-index workspace.
#![warn(missing_docs)]

/// ECO-code family interval tables and the severe-incompatibility guard.
pub mod eco;
/// The unified `PipelineError` type.
pub mod error;
/// The FEN-to-filename sanitization rule.
pub mod sanitize;
/// The `UpstreamClient` trait and its request/response types.
pub mod upstream;
/// Domain model: openings, videos, enriched videos, matches.
pub mod video;

pub use eco::{EcoFamily, family_for_eco, family_from_text, is_severely_incompatible};
pub use error::PipelineError;
pub use sanitize::sanitize_fingerprint;
pub use upstream::{
    ChannelSummary, ListUploadsOptions, ListUploadsResult, MaxResults, RssEntry, UploadOrder,
    UpstreamClient,
};
pub use video::{
    ContentDetails, ContentType, Definition, DifficultyLevel, EnrichedMetadata, EnrichedVideo,
    EngagementMetrics, LocalIndex, Match, MatchType, Opening, Statistics, Tier, Video,
    VideoAnalysis, VideoStatus,
};
