//! The production `UpstreamClient`, backed by the video service's REST API and its
//! public per-channel Atom feeds.
#![warn(missing_docs)]

mod client;
mod models;
mod rss;

pub use crate::client::YouTubeClient;
