//! The `UpstreamClient` trait: the single seam between the pipeline and the video
//! service / RSS feeds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::video::Video;

/// Ordering requested from `list_channel_uploads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UploadOrder {
    /// Sort descending by `publishedAt`.
    #[default]
    Date,
    /// No particular order requested.
    Relevance,
}

/// How many uploads to request from a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaxResults {
    /// Paginate until the channel's upload history is exhausted.
    #[default]
    All,
    /// Stop once at least this many results have been collected.
    Count(usize),
}

/// Options for [`UpstreamClient::list_channel_uploads`].
#[derive(Debug, Clone)]
pub struct ListUploadsOptions {
    /// How many results to collect before stopping pagination.
    pub max_results: MaxResults,
    /// Client-side filter: only videos published at or after this RFC 3339 instant are
    /// kept. Defaults to a 15-year history window.
    pub published_after: String,
    /// Requested ordering.
    pub order: UploadOrder,
}

/// The result of [`UpstreamClient::list_channel_uploads`]: the collected videos plus
/// how many upstream pages were actually fetched to produce them, so a governing
/// layer can charge quota per page rather than per logical call.
#[derive(Debug, Clone, Default)]
pub struct ListUploadsResult {
    /// Videos collected across all fetched pages, already truncated to
    /// `opts.max_results` if requested.
    pub videos: Vec<Video>,
    /// Number of upstream pages actually requested, always at least 1 for a
    /// successful call.
    pub pages_fetched: u64,
}

/// A partial channel record returned by `search_channels`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    /// Upstream channel id.
    pub channel_id: String,
    /// Channel display title.
    pub title: String,
    /// Channel description, if provided by the service.
    #[serde(default)]
    pub description: String,
}

/// A single parsed Atom feed entry from a channel's RSS feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssEntry {
    /// Video id (from `yt:videoId`).
    pub id: String,
    /// Entry title.
    pub title: String,
    /// RFC 3339 publish timestamp (from `published`).
    pub published_at: String,
    /// Uploading channel's display title (from `author/name`).
    pub channel_title: String,
}

/// The seam between the pipeline and the upstream video service and its RSS feeds.
///
/// Every implementation (the real HTTP client, the quota/rate-governed wrapper, and
/// test mocks) honors the same contract: quota is reserved and the rate limiter is
/// consulted before any network call. Implementations that do not themselves enforce
/// quota (the raw HTTP client) are expected to be wrapped by a governing layer before
/// being handed to pipeline code.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Enumerate a channel's uploads, paginating until exhaustion or until
    /// `opts.max_results` is satisfied. Each page costs 1 quota unit.
    async fn list_channel_uploads(
        &self,
        channel_id: &str,
        opts: ListUploadsOptions,
    ) -> Result<ListUploadsResult, PipelineError>;

    /// Fetch full video records for up to 50 ids at a time, internally chunking a
    /// longer list into multiple requests (each costing 1 unit).
    async fn batch_fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<Video>, PipelineError>;

    /// Discovery-fallback full-text search, costing 100 units plus 1 for detail merge.
    /// Reserved for rare use; the channel-first pipeline does not call this in its
    /// normal phases.
    async fn search_videos(
        &self,
        query: &str,
        channel_id: Option<&str>,
    ) -> Result<Vec<Video>, PipelineError>;

    /// Channel discovery search, costing 100 units; used only by tooling, never by the
    /// pipeline's run phases.
    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSummary>, PipelineError>;

    /// Fetch and parse a channel's Atom RSS feed. Zero quota cost. Malformed XML is
    /// tolerated: returns an empty list plus a `PipelineError::Parse` describing the
    /// failure rather than propagating it as a hard error.
    async fn fetch_rss(&self, channel_id: &str) -> Result<(Vec<RssEntry>, Option<PipelineError>), PipelineError>;
}
