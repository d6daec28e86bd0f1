//! [`YouTubeClient`]: the raw HTTP implementation of `UpstreamClient` against the
//! video service's REST API and its public Atom feeds. Carries no quota or rate-limit
//! logic of its own — callers are expected to wrap it in
//! `chess_video_middleware::GovernedClient`.

use std::time::Duration;

use async_trait::async_trait;
use chess_video_core::upstream::{
    ChannelSummary, ListUploadsOptions, ListUploadsResult, MaxResults, RssEntry, UpstreamClient,
};
use chess_video_core::{PipelineError, Video};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::models::{
    video_from_resource, ChannelListResponse, PlaylistItemListResponse, VideoListResponse,
};
use crate::rss;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";
const DETAIL_PARTS: &str = "snippet,statistics,contentDetails,status,topicDetails";

/// The production `UpstreamClient`, backed by `reqwest`.
pub struct YouTubeClient {
    http: Client,
    api_key: String,
}

impl YouTubeClient {
    /// Build a client with the given API key and request timeout.
    ///
    /// # Errors
    /// Returns [`PipelineError::ConfigInvalid`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: impl Into<String>, request_timeout: Duration) -> Result<Self, PipelineError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PipelineError::ConfigInvalid(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, PipelineError> {
        let url = format!("{API_BASE}/{path}");
        let mut params = query.to_vec();
        params.push(("key", self.api_key.as_str()));

        let response = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status_error(status));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }

    fn map_transport_error(err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            PipelineError::Timeout
        } else {
            PipelineError::Upstream(0)
        }
    }

    fn map_status_error(status: StatusCode) -> PipelineError {
        match status.as_u16() {
            429 => PipelineError::RateLimited,
            403 => PipelineError::Forbidden,
            other => PipelineError::Upstream(other),
        }
    }

    async fn find_uploads_playlist_id(&self, channel_id: &str) -> Result<String, PipelineError> {
        let value = self
            .get_json(
                "channels",
                &[("part", "contentDetails"), ("id", channel_id)],
            )
            .await?;
        value["items"][0]["contentDetails"]["relatedPlaylists"]["uploads"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::Parse(format!("channel {channel_id} has no uploads playlist")))
    }
}

#[async_trait]
impl UpstreamClient for YouTubeClient {
    async fn list_channel_uploads(
        &self,
        channel_id: &str,
        opts: ListUploadsOptions,
    ) -> Result<ListUploadsResult, PipelineError> {
        let playlist_id = self.find_uploads_playlist_id(channel_id).await?;
        let mut collected = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages_fetched: u64 = 0;

        loop {
            let mut query = vec![
                ("part", "snippet"),
                ("playlistId", playlist_id.as_str()),
                ("maxResults", "50"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let value = self.get_json("playlistItems", &query).await?;
            let parsed: PlaylistItemListResponse = serde_json::from_value(value)
                .map_err(|e| PipelineError::Parse(e.to_string()))?;
            pages_fetched += 1;

            for resource in parsed.items {
                if let Some(video) = video_from_resource(resource) {
                    if video.published_at.as_str() >= opts.published_after.as_str() {
                        collected.push(video);
                    }
                }
            }

            if let MaxResults::Count(limit) = opts.max_results
                && collected.len() >= limit
            {
                collected.truncate(limit);
                break;
            }

            match parsed.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(ListUploadsResult {
            videos: collected,
            pages_fetched,
        })
    }

    async fn batch_fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<Video>, PipelineError> {
        let mut collected = Vec::new();
        for chunk in video_ids.chunks(50) {
            let ids = chunk.join(",");
            let value = self
                .get_json("videos", &[("part", DETAIL_PARTS), ("id", ids.as_str())])
                .await?;
            let parsed: VideoListResponse =
                serde_json::from_value(value).map_err(|e| PipelineError::Parse(e.to_string()))?;
            collected.extend(parsed.items.into_iter().filter_map(video_from_resource));
        }
        Ok(collected)
    }

    async fn search_videos(
        &self,
        query: &str,
        channel_id: Option<&str>,
    ) -> Result<Vec<Video>, PipelineError> {
        let mut params = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", "50"),
        ];
        if let Some(channel_id) = channel_id {
            params.push(("channelId", channel_id));
        }
        let value = self.get_json("search", &params).await?;
        let parsed: VideoListResponse =
            serde_json::from_value(value).map_err(|e| PipelineError::Parse(e.to_string()))?;

        let ids: Vec<String> = parsed
            .items
            .into_iter()
            .filter_map(|r| {
                r.snippet
                    .as_ref()
                    .and_then(|s| s.resource_id.as_ref())
                    .and_then(|r| r.video_id.clone())
                    .or(Some(r.id))
            })
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.batch_fetch_video_details(&ids).await
    }

    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSummary>, PipelineError> {
        let value = self
            .get_json(
                "search",
                &[("part", "snippet"), ("q", query), ("type", "channel"), ("maxResults", "25")],
            )
            .await?;
        let parsed: ChannelListResponse =
            serde_json::from_value(value).map_err(|e| PipelineError::Parse(e.to_string()))?;
        Ok(parsed
            .items
            .into_iter()
            .filter_map(|resource| {
                let snippet = resource.snippet?;
                Some(ChannelSummary {
                    channel_id: resource.id,
                    title: snippet.title,
                    description: snippet.description,
                })
            })
            .collect())
    }

    async fn fetch_rss(
        &self,
        channel_id: &str,
    ) -> Result<(Vec<RssEntry>, Option<PipelineError>), PipelineError> {
        let response = self
            .http
            .get(FEED_BASE)
            .query(&[("channel_id", channel_id)])
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status_error(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))?;

        match rss::parse_feed(&body) {
            Ok(entries) => Ok((entries, None)),
            Err(message) => Ok((Vec::new(), Some(PipelineError::Parse(message)))),
        }
    }
}
