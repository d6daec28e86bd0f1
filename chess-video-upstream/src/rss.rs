//! Parsing of a channel's Atom RSS feed (`/feeds/videos.xml?channel_id=...`).

use chess_video_core::upstream::RssEntry;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(rename = "yt:videoId")]
    video_id: String,
    title: String,
    published: String,
    author: Author,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

/// Parse an Atom feed body into a flat list of entries.
///
/// # Errors
/// Returns the underlying `quick_xml` error message on malformed XML; callers are
/// expected to treat this as a soft failure rather than aborting the run.
pub(crate) fn parse_feed(body: &str) -> Result<Vec<RssEntry>, String> {
    let feed: Feed = quick_xml::de::from_str(body).map_err(|e| e.to_string())?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| RssEntry {
            id: entry.video_id,
            title: entry.title,
            published_at: entry.published,
            channel_title: entry.author.name,
        })
        .collect())
}
