//! Embedded player iframes and orphaned `<source>` declarations.
//!
//! Embeds never yield a direct playable URL — an iframe player is not
//! capturable from outside — so these candidates carry platform identity
//! and titles only. Orphaned `<source>` elements (declared outside any
//! `<video>` parent) do carry a URL, gated through the ruleset.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{document_title, resolve_url, vimeo, youtube};
use crate::ruleset;
use crate::types::{Platform, StreamCandidate, VideoCandidate};

static IFRAME_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("iframe").expect("iframe selector"));

static SOURCE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("source").expect("source selector"));

/// Generic embed hint for iframes that are not a known platform player.
const EMBED_KEYWORDS: &[&str] = &["video", "player", "stream", "media", "embed"];

/// Scan `<iframe>` elements for known embed shapes and media-ish URLs.
pub fn scan_iframes(page_url: &str, doc: &Html) -> Vec<VideoCandidate> {
    doc.select(&IFRAME_SEL)
        .filter_map(|el| iframe_candidate(page_url, el))
        .collect()
}

fn iframe_candidate(page_url: &str, el: ElementRef<'_>) -> Option<VideoCandidate> {
    let raw = el
        .value()
        .attr("src")
        .or_else(|| el.value().attr("data-src"))
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "about:blank")?;
    let src = resolve_url(page_url, raw);
    let lower = src.to_ascii_lowercase();

    let mut candidate = if let Some(id) = youtube::video_id(&src) {
        let mut c = VideoCandidate::embed(Platform::Youtube, Some(id.clone()), page_url);
        c.thumbnail_url = Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"));
        c
    } else if lower.contains("player.vimeo.com/video/") {
        VideoCandidate::embed(Platform::Vimeo, vimeo::video_id(&src), page_url)
    } else if EMBED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        VideoCandidate::embed(Platform::Unknown, None, page_url)
    } else {
        return None;
    };
    candidate.title = el
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);
    Some(candidate)
}

/// Scan `<source>` elements declared outside any `<video>`/`<audio>`
/// parent. `<picture>` sources are responsive images, not media.
pub fn scan_orphan_sources(page_url: &str, doc: &Html) -> Vec<VideoCandidate> {
    doc.select(&SOURCE_SEL)
        .filter(|el| !has_media_parent(el))
        .filter_map(|el| orphan_candidate(page_url, doc, el))
        .collect()
}

fn has_media_parent(el: &ElementRef<'_>) -> bool {
    el.ancestors().any(|node| {
        ElementRef::wrap(node)
            .is_some_and(|anc| matches!(anc.value().name(), "video" | "audio" | "picture"))
    })
}

fn orphan_candidate(page_url: &str, doc: &Html, el: ElementRef<'_>) -> Option<VideoCandidate> {
    let raw = el.value().attr("src").map(str::trim).filter(|s| !s.is_empty())?;
    let url = resolve_url(page_url, raw);
    let type_attr = el.value().attr("type");
    let classification = ruleset::classify_embedded(&url, type_attr)?;

    let stream = StreamCandidate::from_markup(
        url.clone(),
        classification.kind,
        classification.quality,
        type_attr.map(ToString::to_string),
    );
    Some(VideoCandidate {
        platform: Platform::Html5,
        external_id: None,
        title: document_title(doc),
        duration_seconds: None,
        page_url: page_url.to_string(),
        source_url: (!url.starts_with("blob:")).then_some(url),
        thumbnail_url: None,
        nested_streams: vec![stream],
    })
}
