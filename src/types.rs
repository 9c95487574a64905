//! Shared candidate model.
//!
//! [`StreamCandidate`] is a network-observed resource believed to be a media
//! stream; [`VideoCandidate`] is a document-observed media element or
//! embedded player. Both are plain data — classification lives in
//! [`crate::ruleset`], session bookkeeping in [`crate::session`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse media container/protocol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Mp4,
    Webm,
    Hls,
    Dash,
    Flv,
    Unknown,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Mp4 => "mp4",
            StreamKind::Webm => "webm",
            StreamKind::Hls => "hls",
            StreamKind::Dash => "dash",
            StreamKind::Flv => "flv",
            StreamKind::Unknown => "unknown",
        }
    }

    /// Segmented-manifest kinds. Their natural access pattern is many small
    /// distinct requests against the same base path, so they are exempt from
    /// the size floor and from near-duplicate collapsing.
    pub fn is_segmented(self) -> bool {
        matches!(self, StreamKind::Hls | StreamKind::Dash)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network-observed media resource.
///
/// Within one session the `url` is the primary identity: the session store
/// never retains two candidates with the same URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamCandidate {
    /// Absolute resource URL.
    pub url: String,
    pub kind: StreamKind,
    /// From a length header, when one was present.
    pub size_bytes: Option<u64>,
    /// Inferred free-text label ("1080p", "HD"). Best effort, not verified.
    pub quality: Option<String>,
    /// Raw MIME string as observed.
    pub content_type: Option<String>,
    /// First observation time.
    pub observed_at: DateTime<Utc>,
}

impl StreamCandidate {
    /// Build a candidate for a URL found embedded in markup (a `<source>`
    /// element) rather than observed on the wire.
    pub fn from_markup(url: String, kind: StreamKind, quality: Option<String>, content_type: Option<String>) -> Self {
        Self {
            url,
            kind,
            size_bytes: None,
            quality,
            content_type,
            observed_at: Utc::now(),
        }
    }
}

/// Hosting platform of a document-observed video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Vimeo,
    Html5,
    Unknown,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Vimeo => "vimeo",
            Platform::Html5 => "html5",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document-observed media element or embedded player.
///
/// Candidates are immutable snapshots: every scan pass produces a fresh
/// list and callers replace their previous one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub platform: Platform,
    /// Platform-native identifier (e.g. a YouTube video id).
    pub external_id: Option<String>,
    /// Best-effort extracted label. `None` when nothing resolvable was
    /// found; presentation layers supply their own placeholder.
    pub title: Option<String>,
    pub duration_seconds: Option<f64>,
    /// URL of the hosting document.
    pub page_url: String,
    /// Direct playable URL. Absent for platform embeds and for ephemeral
    /// `blob:` sources, which cannot be handed to an external consumer.
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Stream entries extracted directly from nested `<source>` markup.
    pub nested_streams: Vec<StreamCandidate>,
}

impl VideoCandidate {
    /// Minimal candidate for a platform embed with no direct file.
    pub fn embed(platform: Platform, external_id: Option<String>, page_url: &str) -> Self {
        Self {
            platform,
            external_id,
            title: None,
            duration_seconds: None,
            page_url: page_url.to_string(),
            source_url: None,
            thumbnail_url: None,
            nested_streams: Vec::new(),
        }
    }
}
