//! JSON response shapes for the video service's REST API, and the mapping into the
//! domain `Video` type.

use std::collections::HashMap;

use chess_video_core::video::{ContentDetails, Definition, Statistics, Video, VideoStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub items: Vec<T>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoResource {
    pub id: String,
    pub snippet: Option<Snippet>,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ContentDetailsResource>,
    pub statistics: Option<StatisticsResource>,
    pub status: Option<StatusResource>,
    #[serde(rename = "topicDetails")]
    pub topic_details: Option<TopicDetailsResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Snippet {
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: HashMap<String, ThumbnailResource>,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<String>,
    #[serde(rename = "defaultAudioLanguage", default)]
    pub default_audio_language: Option<String>,
    #[serde(rename = "resourceId", default)]
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceId {
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThumbnailResource {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDetailsResource {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatisticsResource {
    #[serde(rename = "viewCount", default)]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount", default)]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount", default)]
    pub comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResource {
    #[serde(default)]
    pub embeddable: bool,
    #[serde(rename = "publicStatsViewable", default)]
    pub public_stats_viewable: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicDetailsResource {
    #[serde(rename = "topicCategories", default)]
    pub topic_categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelResource {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub(crate) type VideoListResponse = ListResponse<VideoResource>;
pub(crate) type PlaylistItemListResponse = ListResponse<VideoResource>;
pub(crate) type ChannelListResponse = ListResponse<ChannelResource>;

fn parse_count(raw: Option<String>) -> u64 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Map one `videos.list` resource into the domain `Video`, given that `resourceId`
/// (a search/playlistItem shape) may stand in for a bare `id` field.
pub(crate) fn video_from_resource(resource: VideoResource) -> Option<Video> {
    let snippet = resource.snippet?;
    let id = snippet
        .resource_id
        .as_ref()
        .and_then(|r| r.video_id.clone())
        .unwrap_or(resource.id);

    let thumbnails = snippet
        .thumbnails
        .into_iter()
        .map(|(k, v)| (k, v.url))
        .collect();

    let content_details = resource.content_details;
    let duration = content_details.as_ref().and_then(|c| c.duration.clone());
    let definition = match content_details.as_ref().and_then(|c| c.definition.as_deref()) {
        Some("hd") => Definition::Hd,
        _ => Definition::Sd,
    };
    let caption = content_details
        .as_ref()
        .and_then(|c| c.caption.as_deref())
        .is_some_and(|c| c == "true");

    let statistics = resource.statistics.map_or_else(Statistics::default, |s| Statistics {
        views: parse_count(s.view_count),
        likes: parse_count(s.like_count),
        comments: parse_count(s.comment_count),
    });

    let status = resource.status.map_or_else(VideoStatus::default, |s| VideoStatus {
        embeddable: s.embeddable,
        public_stats_viewable: s.public_stats_viewable,
    });

    let has_enhanced_metadata = statistics.views > 0 || duration.is_some();

    Some(Video {
        id,
        title: snippet.title,
        description: snippet.description,
        published_at: snippet.published_at,
        channel_id: snippet.channel_id,
        channel_title: snippet.channel_title,
        thumbnails,
        duration,
        tags: snippet.tags,
        category_id: snippet.category_id,
        language_hint: snippet.default_audio_language,
        statistics,
        content_details: ContentDetails { definition, caption },
        status,
        topic_categories: resource
            .topic_details
            .map(|t| t.topic_categories)
            .unwrap_or_default(),
        has_enhanced_metadata,
    })
}
