//! Document media scanner.
//!
//! Extracts [`VideoCandidate`]s from a parsed HTML document, independent of
//! any network signal. Strategies run in a fixed order — platform-specific
//! scanners, generic `<video>` elements, iframe embeds, orphaned `<source>`
//! declarations — and the concatenated results are deduplicated once, so
//! higher-confidence detections win ties.
//!
//! # Architecture
//!
//! - [`PlatformScanner`]: trait for platform-specific extraction
//! - [`Scanner`]: runs every strategy and merges the results
//!
//! Scanning is a pure read: no side effects, safe to call repeatedly. Rate
//! limiting under DOM-mutation storms is the caller's concern.

pub mod embeds;
pub mod html5;
pub mod vimeo;
pub mod youtube;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::DetectorConfig;
use crate::types::VideoCandidate;

/// Platform-specific extraction of the page's own primary video.
pub trait PlatformScanner: Send + Sync {
    /// Short lowercase name (e.g. `"youtube"`).
    fn name(&self) -> &'static str;

    /// Whether this scanner understands the given page URL.
    fn matches(&self, page_url: &str) -> bool;

    /// Extract the page's primary video, if the markup supports it.
    fn scan(&self, page_url: &str, doc: &Html) -> Option<VideoCandidate>;
}

/// Runs every scan strategy over one document snapshot.
///
/// Platform scanners are checked in registration order; the first match
/// contributes at most one candidate, ahead of everything the generic
/// strategies find.
pub struct Scanner {
    platforms: Vec<Box<dyn PlatformScanner>>,
    min_video_area: u32,
}

impl Scanner {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&DetectorConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &DetectorConfig) -> Self {
        let platforms: Vec<Box<dyn PlatformScanner>> = vec![
            Box::new(youtube::YouTubeScanner),
            Box::new(vimeo::VimeoScanner),
        ];
        Self {
            platforms,
            min_video_area: config.min_video_area,
        }
    }

    /// Produce a fresh candidate snapshot for the document.
    pub fn scan(&self, page_url: &str, doc: &Html) -> Vec<VideoCandidate> {
        let mut found = Vec::new();

        for platform in &self.platforms {
            if platform.matches(page_url) {
                debug!(scanner = platform.name(), "platform scanner matched");
                if let Some(candidate) = platform.scan(page_url, doc) {
                    found.push(candidate);
                }
                break;
            }
        }

        found.extend(html5::scan_video_elements(page_url, doc, self.min_video_area));
        found.extend(embeds::scan_iframes(page_url, doc));
        found.extend(embeds::scan_orphan_sources(page_url, doc));

        dedup_candidates(found)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Dedup key priority: platform-native id, then direct source URL, then the
/// hosting page. Keyed collisions keep the first (highest-confidence)
/// occurrence.
fn candidate_key(candidate: &VideoCandidate) -> String {
    if let Some(id) = &candidate.external_id {
        return format!("{}:{id}", candidate.platform);
    }
    if let Some(src) = &candidate.source_url {
        return src.clone();
    }
    candidate.page_url.clone()
}

fn dedup_candidates(candidates: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(candidate_key(c)))
        .collect()
}

// ---------------------------------------------------------------------------
// Shared extraction helpers
// ---------------------------------------------------------------------------

static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("title selector"));

/// The document `<title>`, trimmed, when non-empty.
pub(crate) fn document_title(doc: &Html) -> Option<String> {
    let el = doc.select(&TITLE_SEL).next()?;
    let text = el.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Resolve a possibly-relative attribute value against the page URL.
/// `blob:` and `data:` values pass through untouched.
pub(crate) fn resolve_url(page_url: &str, raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("blob:") || raw.starts_with("data:") {
        return raw.to_string();
    }
    Url::parse(page_url)
        .ok()
        .and_then(|base| base.join(raw).ok())
        .map_or_else(|| raw.to_string(), Into::into)
}
