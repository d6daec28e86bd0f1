//! Full channel enumeration: pagination to exhaustion, batched detail fetches, and a
//! left-join that preserves partial fields the detail fetch didn't return.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chess_video_core::upstream::{ListUploadsOptions, ListUploadsResult, MaxResults, UploadOrder};
use chess_video_core::{LocalIndex, PipelineError, UpstreamClient, Video};
use chrono::Duration as ChronoDuration;
use futures::stream::{self, StreamExt};

/// Bounded per-channel concurrency used while building the local index.
const CHANNEL_CONCURRENCY: usize = 4;

/// Outcome of a `build_local_index` call.
#[derive(Debug, Clone, Default)]
pub struct IndexBuildResult {
    /// Total videos indexed across every channel that succeeded.
    pub total_videos: usize,
    /// Number of channels that indexed successfully.
    pub channels_covered: usize,
    /// Per-channel failures, preserving the order channels completed in.
    pub errors: Vec<(String, PipelineError)>,
}

fn to_chrono_duration(d: StdDuration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or(ChronoDuration::zero())
}

fn merge_detail(mut partial: Video, detail: Option<&Video>) -> Video {
    match detail {
        Some(detail) => {
            partial.title = detail.title.clone();
            partial.description = detail.description.clone();
            partial.channel_title = detail.channel_title.clone();
            partial.thumbnails = detail.thumbnails.clone();
            partial.duration = detail.duration.clone().or(partial.duration);
            partial.tags = detail.tags.clone();
            partial.category_id = detail.category_id.clone().or(partial.category_id);
            partial.language_hint = detail.language_hint.clone().or(partial.language_hint);
            partial.statistics = detail.statistics;
            partial.content_details = detail.content_details;
            partial.status = detail.status;
            partial.topic_categories = detail.topic_categories.clone();
            partial.has_enhanced_metadata = true;
            partial
        }
        None => {
            partial.has_enhanced_metadata = false;
            partial
        }
    }
}

async fn index_channel(
    channel_id: &str,
    client: &Arc<dyn UpstreamClient>,
    history_window: StdDuration,
) -> Result<Vec<Video>, PipelineError> {
    let published_after = (chrono::Utc::now() - to_chrono_duration(history_window)).to_rfc3339();
    let partials = client
        .list_channel_uploads(
            channel_id,
            ListUploadsOptions {
                max_results: MaxResults::All,
                published_after,
                order: UploadOrder::Date,
            },
        )
        .await?
        .videos;

    let ids: Vec<String> = partials.iter().map(|v| v.id.clone()).collect();
    let details = client.batch_fetch_video_details(&ids).await?;
    let details_by_id: std::collections::HashMap<&str, &Video> =
        details.iter().map(|v| (v.id.as_str(), v)).collect();

    Ok(partials
        .into_iter()
        .map(|partial| {
            let detail = details_by_id.get(partial.id.as_str()).copied();
            merge_detail(partial, detail)
        })
        .collect())
}

/// Build the in-memory local index for `channel_ids`, indexing channels with bounded
/// concurrency. A per-channel failure is recorded in `errors` without aborting the
/// build, except when every channel fails and the first failure looks like a rate
/// limit signal, in which case the whole phase fails with `QuotaExceeded`.
///
/// # Errors
/// Returns `PipelineError::QuotaExceeded` when zero channels succeeded and the first
/// recorded error looks like an upstream rate-limit signal.
pub async fn build_local_index(
    channel_ids: &[String],
    client: &Arc<dyn UpstreamClient>,
    history_window: StdDuration,
) -> Result<(LocalIndex, IndexBuildResult), PipelineError> {
    let results: Vec<(String, Result<Vec<Video>, PipelineError>)> = stream::iter(channel_ids.iter().cloned())
        .map(|channel_id| {
            let client = Arc::clone(client);
            async move {
                let outcome = index_channel(&channel_id, &client, history_window).await;
                (channel_id, outcome)
            }
        })
        .buffer_unordered(CHANNEL_CONCURRENCY)
        .collect()
        .await;

    let mut index = LocalIndex::new();
    let mut build_result = IndexBuildResult::default();

    for (channel_id, outcome) in results {
        match outcome {
            Ok(videos) => {
                build_result.total_videos += videos.len();
                build_result.channels_covered += 1;
                index.insert(channel_id, videos);
            }
            Err(error) => build_result.errors.push((channel_id, error)),
        }
    }

    if build_result.channels_covered == 0
        && build_result
            .errors
            .first()
            .is_some_and(|(_, e)| e.looks_like_rate_limit())
    {
        return Err(PipelineError::QuotaExceeded {
            remaining: 0,
            reset_in_ms: 0,
        });
    }

    Ok((index, build_result))
}
