//! [`GovernedClient`]: wraps any [`UpstreamClient`] with quota reservation, rate
//! limiting, and a retry-with-backoff policy for `RateLimited` responses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chess_video_core::upstream::{
    ChannelSummary, ListUploadsOptions, ListUploadsResult, RssEntry, UpstreamClient,
};
use chess_video_core::{PipelineError, Video};
#[cfg(feature = "tracing")]
use tracing::warn;

use crate::quota::QuotaLedger;
use crate::ratelimit::RateLimiter;

/// Quota cost, in units, charged by each upstream endpoint.
pub mod cost {
    /// One page of `listChannelUploads`.
    pub const LIST_UPLOADS_PAGE: u64 = 1;
    /// One chunk (<=50 ids) of `batchFetchVideoDetails`.
    pub const BATCH_DETAILS_CHUNK: u64 = 1;
    /// `searchVideos`: 100 units plus 1 for the detail merge.
    pub const SEARCH_VIDEOS: u64 = 101;
    /// `searchChannels`.
    pub const SEARCH_CHANNELS: u64 = 100;
}

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(1);

/// Wraps an inner [`UpstreamClient`] so every call reserves quota, passes through the
/// shared rate limiter, and retries `RateLimited` responses with exponential backoff
/// before surfacing them as a hard `Upstream` error.
pub struct GovernedClient {
    inner: Arc<dyn UpstreamClient>,
    quota: Arc<QuotaLedger>,
    limiter: Arc<RateLimiter>,
}

impl GovernedClient {
    /// Wrap `inner` with the given shared quota ledger and rate limiter.
    #[must_use]
    pub fn new(inner: Arc<dyn UpstreamClient>, quota: Arc<QuotaLedger>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            inner,
            quota,
            limiter,
        }
    }

    async fn governed<T, F, Fut>(&self, cost: u64, call: F) -> Result<T, PipelineError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, PipelineError>>,
    {
        self.quota.reserve(cost)?;
        self.limiter.acquire().await;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(PipelineError::RateLimited) if attempt < MAX_ATTEMPTS => {
                    let delay = BASE_BACKOFF * 2u32.pow(attempt - 1);
                    #[cfg(feature = "tracing")]
                    warn!(attempt, ?delay, "rate limited, retrying with backoff");
                    tokio::time::sleep(delay).await;
                }
                Err(PipelineError::RateLimited) => return Err(PipelineError::Upstream(429)),
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait]
impl UpstreamClient for GovernedClient {
    async fn list_channel_uploads(
        &self,
        channel_id: &str,
        opts: ListUploadsOptions,
    ) -> Result<ListUploadsResult, PipelineError> {
        // The page count isn't known until the inner client has paginated to
        // exhaustion, so only the first page is reserved up front (admission); the
        // remaining pages actually fetched are charged once the call returns.
        let result = self
            .governed(cost::LIST_UPLOADS_PAGE, || {
                self.inner.list_channel_uploads(channel_id, opts.clone())
            })
            .await?;
        if result.pages_fetched > 1 {
            self.quota
                .reserve(cost::LIST_UPLOADS_PAGE * (result.pages_fetched - 1))?;
        }
        Ok(result)
    }

    async fn batch_fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<Video>, PipelineError> {
        let chunks = video_ids.len().div_ceil(50).max(1) as u64;
        self.governed(cost::BATCH_DETAILS_CHUNK * chunks, || {
            self.inner.batch_fetch_video_details(video_ids)
        })
        .await
    }

    async fn search_videos(
        &self,
        query: &str,
        channel_id: Option<&str>,
    ) -> Result<Vec<Video>, PipelineError> {
        self.governed(cost::SEARCH_VIDEOS, || {
            self.inner.search_videos(query, channel_id)
        })
        .await
    }

    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSummary>, PipelineError> {
        self.governed(cost::SEARCH_CHANNELS, || self.inner.search_channels(query))
            .await
    }

    async fn fetch_rss(
        &self,
        channel_id: &str,
    ) -> Result<(Vec<RssEntry>, Option<PipelineError>), PipelineError> {
        // Zero quota cost; still honors the shared rate limiter.
        self.limiter.acquire().await;
        self.inner.fetch_rss(channel_id).await
    }
}

impl ListUploadsOptions {
    fn clone(&self) -> Self {
        Self {
            max_results: self.max_results,
            published_after: self.published_after.clone(),
            order: self.order,
        }
    }
}
