//! Content-addressed per-opening video files, the local-index snapshot, and the
//! matches checkpoint. All writes go through a write-to-tmp-then-rename path so a
//! crash never leaves a reader observing a half-written file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chess_video_core::{sanitize_fingerprint, EnrichedVideo, LocalIndex, PipelineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matcher::OpeningMatches;

/// Window within which an index snapshot is considered recent enough to skip a rebuild.
const RECENCY_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn write_atomic(path: &Path, contents: &str) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent.display(), e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(|e| PipelineError::io(tmp.display(), e))?;
    fs::rename(&tmp, path).map_err(|e| PipelineError::io(path.display(), e))?;
    Ok(())
}

/// Per-position persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFile {
    /// Position fingerprint.
    pub fen: String,
    /// Opening canonical name.
    pub name: String,
    /// ECO code.
    pub eco: String,
    /// RFC 3339 timestamp of when this file was written.
    pub extracted_at: DateTime<Utc>,
    /// Number of videos in this file.
    pub video_count: usize,
    /// The videos themselves.
    pub videos: Vec<EnrichedVideo>,
}

/// The on-disk path for `fen`'s video file under `videos_dir`.
#[must_use]
pub fn video_file_path(videos_dir: &Path, fen: &str) -> PathBuf {
    videos_dir.join(format!("{}.json", sanitize_fingerprint(fen)))
}

/// Write a [`VideoFile`] for `fen` under `videos_dir`.
///
/// # Errors
/// Returns [`PipelineError::Io`] if the write fails.
pub fn write_video_file(
    videos_dir: &Path,
    fen: &str,
    name: &str,
    eco: &str,
    videos: Vec<EnrichedVideo>,
) -> Result<(), PipelineError> {
    let path = video_file_path(videos_dir, fen);
    let file = VideoFile {
        fen: fen.to_string(),
        name: name.to_string(),
        eco: eco.to_string(),
        extracted_at: Utc::now(),
        video_count: videos.len(),
        videos,
    };
    let serialized =
        serde_json::to_string_pretty(&file).map_err(|e| PipelineError::io(path.display(), e))?;
    write_atomic(&path, &serialized)
}

/// Read back a previously written [`VideoFile`], if present and well-formed.
#[must_use]
pub fn read_video_file(videos_dir: &Path, fen: &str) -> Option<VideoFile> {
    let path = video_file_path(videos_dir, fen);
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Whether `fen` already has a non-empty video file, used to skip re-processed
/// positions on a resumed run.
#[must_use]
pub fn has_existing_videos(videos_dir: &Path, fen: &str) -> bool {
    read_video_file(videos_dir, fen).is_some_and(|f| f.video_count > 0)
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    index: LocalIndex,
    #[serde(default)]
    enriched: HashMap<String, EnrichedVideo>,
}

/// Serialize the local index and its associated enriched-video map to `path`,
/// atomically.
///
/// # Errors
/// Returns [`PipelineError::Io`] if the write fails.
pub fn save_index(
    path: &Path,
    index: &LocalIndex,
    enriched: &HashMap<String, EnrichedVideo>,
) -> Result<(), PipelineError> {
    let snapshot = IndexSnapshot {
        index: index.clone(),
        enriched: enriched.clone(),
    };
    let serialized =
        serde_json::to_string_pretty(&snapshot).map_err(|e| PipelineError::io(path.display(), e))?;
    write_atomic(path, &serialized)
}

/// Load a previously saved local index and its enriched-video map, if present and
/// well-formed.
#[must_use]
pub fn load_index(path: &Path) -> Option<(LocalIndex, HashMap<String, EnrichedVideo>)> {
    let contents = fs::read_to_string(path).ok()?;
    let snapshot: IndexSnapshot = serde_json::from_str(&contents).ok()?;
    Some((snapshot.index, snapshot.enriched))
}

/// True when `path`'s modification time is within the recency window.
#[must_use]
pub fn is_index_recent(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .is_ok_and(|age| age < RECENCY_WINDOW)
}

/// Aggregate run metrics threaded through the checkpoint and final summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Total videos indexed across all channels.
    pub total_videos_indexed: usize,
    /// Candidates remaining after the pre-filter.
    pub candidates_after_prefilter: usize,
    /// Quota units consumed so far this run.
    pub quota_used: u64,
}

/// Checkpoint written at the end of the matching phase, loadable to resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesCheckpoint {
    /// When this checkpoint was written.
    pub timestamp: DateTime<Utc>,
    /// The phase this checkpoint was written from.
    pub phase: String,
    /// Number of openings considered.
    pub openings_count: usize,
    /// Number of openings with at least one match.
    pub matches_count: usize,
    /// Total (opening, video) match instances across all openings.
    pub total_video_instances: usize,
    /// Run metrics at checkpoint time.
    pub metrics: RunMetrics,
    /// The matches themselves.
    pub matches: Vec<OpeningMatches>,
}

/// Write the matches checkpoint, atomically.
///
/// # Errors
/// Returns [`PipelineError::Io`] if the write fails.
pub fn write_checkpoint(path: &Path, checkpoint: &MatchesCheckpoint) -> Result<(), PipelineError> {
    let serialized =
        serde_json::to_string_pretty(checkpoint).map_err(|e| PipelineError::io(path.display(), e))?;
    write_atomic(path, &serialized)
}

/// Load a previously written matches checkpoint, if present and well-formed.
#[must_use]
pub fn load_checkpoint(path: &Path) -> Option<MatchesCheckpoint> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}
