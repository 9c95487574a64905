//! Vimeo page scanner.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::{document_title, PlatformScanner};
use crate::types::{Platform, VideoCandidate};

pub struct VimeoScanner;

static VIMEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:player\.)?vimeo\.com/(?:video/)?(\d+)").expect("vimeo id pattern")
});

static H1_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector"));

static SCRIPT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("script selector"));

/// `"duration":245` inside the player config JSON.
static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""duration"\s*:\s*(\d+)"#).expect("duration pattern"));

impl PlatformScanner for VimeoScanner {
    fn name(&self) -> &'static str {
        "vimeo"
    }

    fn matches(&self, page_url: &str) -> bool {
        video_id(page_url).is_some()
    }

    fn scan(&self, page_url: &str, doc: &Html) -> Option<VideoCandidate> {
        let id = video_id(page_url)?;
        let mut candidate = VideoCandidate::embed(Platform::Vimeo, Some(id), page_url);
        candidate.title = extract_title(doc);
        candidate.duration_seconds = extract_duration(doc);
        Some(candidate)
    }
}

/// Numeric video id from `vimeo.com/123`, `vimeo.com/video/123`, or the
/// player embed URL.
pub(crate) fn video_id(url: &str) -> Option<String> {
    VIMEO_ID
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_title(doc: &Html) -> Option<String> {
    if let Some(el) = doc.select(&H1_SEL).next() {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }
    document_title(doc).map(|t| t.trim_end_matches(" on Vimeo").to_string())
}

fn extract_duration(doc: &Html) -> Option<f64> {
    for script in doc.select(&SCRIPT_SEL) {
        let text = script.text().collect::<String>();
        if let Some(cap) = DURATION.captures(&text) {
            return cap.get(1)?.as_str().parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_canonical_url() {
        assert_eq!(video_id("https://vimeo.com/76979871"), Some("76979871".to_string()));
        assert_eq!(
            video_id("https://vimeo.com/video/76979871"),
            Some("76979871".to_string())
        );
    }

    #[test]
    fn id_from_player_url() {
        assert_eq!(
            video_id("https://player.vimeo.com/video/76979871?h=abc"),
            Some("76979871".to_string())
        );
    }

    #[test]
    fn non_video_urls_yield_nothing() {
        assert_eq!(video_id("https://vimeo.com/channels/staffpicks"), None);
        assert_eq!(video_id("https://example.com/76979871"), None);
    }

    #[test]
    fn scan_prefers_heading_title() {
        let doc = Html::parse_document(
            r#"<html><head><title>The Mountain on Vimeo</title></head>
            <body><h1>The Mountain</h1>
            <script>window.config = {"video":{"duration":193}};</script></body></html>"#,
        );
        let c = VimeoScanner.scan("https://vimeo.com/76979871", &doc).unwrap();
        assert_eq!(c.external_id.as_deref(), Some("76979871"));
        assert_eq!(c.title.as_deref(), Some("The Mountain"));
        assert_eq!(c.duration_seconds, Some(193.0));
        assert!(c.source_url.is_none());
    }
}
