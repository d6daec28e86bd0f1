//! Lightweight incremental discovery: pull each channel's RSS feed and append only
//! genuinely new uploads to the local index, deferring detail fetches to the next
//! indexing pass or to enrichment.

use std::collections::HashMap;
use std::collections::HashSet;

use chess_video_core::upstream::RssEntry;
use chess_video_core::video::{ContentDetails, Statistics, VideoStatus};
use chess_video_core::{LocalIndex, PipelineError, UpstreamClient, Video};

/// Outcome of an `update_from_rss` call.
#[derive(Debug, Clone, Default)]
pub struct RssUpdateResult {
    /// Number of genuinely new videos appended across all channels.
    pub new_videos: usize,
    /// Per-channel RSS failures.
    pub errors: Vec<(String, PipelineError)>,
}

fn partial_video_from_rss(entry: RssEntry, channel_id: &str) -> Video {
    Video {
        id: entry.id,
        title: entry.title,
        description: String::new(),
        published_at: entry.published_at,
        channel_id: channel_id.to_string(),
        channel_title: entry.channel_title,
        thumbnails: HashMap::new(),
        duration: None,
        tags: vec![],
        category_id: None,
        language_hint: None,
        statistics: Statistics::default(),
        content_details: ContentDetails::default(),
        status: VideoStatus::default(),
        topic_categories: vec![],
        has_enhanced_metadata: false,
    }
}

/// Pull each channel's RSS feed, appending only ids not already present in `index`'s
/// list for that channel. Zero quota cost. A channel's parse/transport failure is
/// recorded in `errors`; other channels are still processed.
pub async fn update_from_rss(
    channel_ids: &[String],
    client: &dyn UpstreamClient,
    index: &mut LocalIndex,
) -> RssUpdateResult {
    let mut result = RssUpdateResult::default();

    for channel_id in channel_ids {
        let (entries, soft_error) = match client.fetch_rss(channel_id).await {
            Ok(outcome) => outcome,
            Err(error) => {
                result.errors.push((channel_id.clone(), error));
                continue;
            }
        };
        if let Some(error) = soft_error {
            result.errors.push((channel_id.clone(), error));
        }

        let existing = index.entry(channel_id.clone()).or_default();
        let known_ids: HashSet<&str> = existing.iter().map(|v| v.id.as_str()).collect();
        let new_entries: Vec<Video> = entries
            .into_iter()
            .filter(|e| !known_ids.contains(e.id.as_str()))
            .map(|e| partial_video_from_rss(e, channel_id))
            .collect();

        result.new_videos += new_entries.len();
        existing.extend(new_entries);
    }

    result
}
