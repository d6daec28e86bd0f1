//! A configurable, in-memory `UpstreamClient` for tests: deterministic fixtures with
//! injectable per-channel and per-feed failures.
#![warn(missing_docs)]

use std::collections::HashMap;

use async_trait::async_trait;
use chess_video_core::upstream::{
    ChannelSummary, ListUploadsOptions, ListUploadsResult, MaxResults, RssEntry, UpstreamClient,
};
use chess_video_core::{PipelineError, Video};
use tokio::sync::Mutex;

/// How a configured call should resolve.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return this value.
    Return(T),
    /// Fail with this error.
    Fail(PipelineError),
}

#[derive(Default)]
struct State {
    uploads: HashMap<String, MockBehavior<Vec<Video>>>,
    rss: HashMap<String, MockBehavior<(Vec<RssEntry>, Option<PipelineError>)>>,
    videos_by_id: HashMap<String, Video>,
    channels: HashMap<String, ChannelSummary>,
    call_counts: HashMap<&'static str, u32>,
}

/// An `UpstreamClient` driven entirely by fixtures registered ahead of time.
///
/// Unconfigured channels/feeds behave as empty-but-successful: an empty upload list,
/// an empty RSS feed. This matches the real service's response to a channel with no
/// matching content, rather than surfacing a spurious error.
#[derive(Default)]
pub struct MockUpstreamClient {
    state: Mutex<State>,
}

impl MockUpstreamClient {
    /// Build an empty mock with no fixtures registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the uploads a channel's `list_channel_uploads` call should return.
    pub async fn set_channel_uploads(&self, channel_id: impl Into<String>, videos: Vec<Video>) {
        let mut state = self.state.lock().await;
        state
            .uploads
            .insert(channel_id.into(), MockBehavior::Return(videos));
    }

    /// Make a channel's `list_channel_uploads` call fail with the given error.
    pub async fn fail_channel_uploads(&self, channel_id: impl Into<String>, error: PipelineError) {
        let mut state = self.state.lock().await;
        state
            .uploads
            .insert(channel_id.into(), MockBehavior::Fail(error));
    }

    /// Register the entries a channel's RSS feed should return.
    pub async fn set_rss_feed(&self, channel_id: impl Into<String>, entries: Vec<RssEntry>) {
        let mut state = self.state.lock().await;
        state
            .rss
            .insert(channel_id.into(), MockBehavior::Return((entries, None)));
    }

    /// Make a channel's `fetch_rss` call fail outright (transport-level failure,
    /// distinct from the tolerated malformed-XML soft error).
    pub async fn fail_rss_feed(&self, channel_id: impl Into<String>, error: PipelineError) {
        let mut state = self.state.lock().await;
        state.rss.insert(channel_id.into(), MockBehavior::Fail(error));
    }

    /// Register full video detail records servable by `batch_fetch_video_details`.
    pub async fn set_video_details(&self, videos: Vec<Video>) {
        let mut state = self.state.lock().await;
        for video in videos {
            state.videos_by_id.insert(video.id.clone(), video);
        }
    }

    /// Register a channel discoverable by `search_channels`.
    pub async fn set_channel(&self, channel: ChannelSummary) {
        let mut state = self.state.lock().await;
        state.channels.insert(channel.channel_id.clone(), channel);
    }

    /// Number of times a given trait method has been invoked so far.
    pub async fn call_count(&self, method: &'static str) -> u32 {
        let state = self.state.lock().await;
        state.call_counts.get(method).copied().unwrap_or(0)
    }

    async fn record_call(&self, method: &'static str) {
        let mut state = self.state.lock().await;
        *state.call_counts.entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn list_channel_uploads(
        &self,
        channel_id: &str,
        opts: ListUploadsOptions,
    ) -> Result<ListUploadsResult, PipelineError> {
        self.record_call("list_channel_uploads").await;
        let state = self.state.lock().await;
        let mut videos = match state.uploads.get(channel_id) {
            Some(MockBehavior::Return(videos)) => videos.clone(),
            Some(MockBehavior::Fail(error)) => return Err(error.clone()),
            None => Vec::new(),
        };
        videos.retain(|v| v.published_at.as_str() >= opts.published_after.as_str());
        if let MaxResults::Count(limit) = opts.max_results {
            videos.truncate(limit);
        }
        Ok(ListUploadsResult {
            videos,
            pages_fetched: 1,
        })
    }

    async fn batch_fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<Video>, PipelineError> {
        self.record_call("batch_fetch_video_details").await;
        let state = self.state.lock().await;
        Ok(video_ids
            .iter()
            .filter_map(|id| state.videos_by_id.get(id).cloned())
            .collect())
    }

    async fn search_videos(
        &self,
        _query: &str,
        channel_id: Option<&str>,
    ) -> Result<Vec<Video>, PipelineError> {
        self.record_call("search_videos").await;
        let state = self.state.lock().await;
        Ok(state
            .videos_by_id
            .values()
            .filter(|v| channel_id.is_none_or(|c| v.channel_id == c))
            .cloned()
            .collect())
    }

    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSummary>, PipelineError> {
        self.record_call("search_channels").await;
        let state = self.state.lock().await;
        let needle = query.to_lowercase();
        Ok(state
            .channels
            .values()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_rss(
        &self,
        channel_id: &str,
    ) -> Result<(Vec<RssEntry>, Option<PipelineError>), PipelineError> {
        self.record_call("fetch_rss").await;
        let state = self.state.lock().await;
        match state.rss.get(channel_id) {
            Some(MockBehavior::Return(result)) => Ok(result.clone()),
            Some(MockBehavior::Fail(error)) => Err(error.clone()),
            None => Ok((Vec::new(), None)),
        }
    }
}
