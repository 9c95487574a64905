//! Generic `<video>` element scanning.
//!
//! Walks every `<video>` on the page, resolves a playable URL from the
//! element or its nested `<source>` children, and derives a title from the
//! closest thing the markup offers. `blob:` sources keep their descriptor
//! but lose the direct URL — a blob cannot be handed to anything outside
//! the page that minted it.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{document_title, resolve_url};
use crate::ruleset;
use crate::types::{Platform, StreamCandidate, VideoCandidate};

static VIDEO_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("video").expect("video selector"));

static SOURCE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("source").expect("source selector"));

static HEADING_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("heading selector"));

static STYLE_WIDTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"width\s*:\s*(\d+)px").expect("style width pattern"));

static STYLE_HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"height\s*:\s*(\d+)px").expect("style height pattern"));

/// Scan every `<video>` element. Elements whose declared area falls below
/// `min_area` square pixels are treated as decorative and skipped; elements
/// with no declared geometry are kept, since parsed markup carries no
/// layout.
pub fn scan_video_elements(page_url: &str, doc: &Html, min_area: u32) -> Vec<VideoCandidate> {
    doc.select(&VIDEO_SEL)
        .filter(|el| match declared_area(el) {
            Some(area) => area >= min_area,
            None => true,
        })
        .map(|el| candidate_for(page_url, doc, el))
        .collect()
}

fn candidate_for(page_url: &str, doc: &Html, el: ElementRef<'_>) -> VideoCandidate {
    let own_src = el
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| resolve_url(page_url, s));

    let nested_src = el
        .select(&SOURCE_SEL)
        .filter_map(|s| s.value().attr("src"))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(|s| resolve_url(page_url, s));

    let playable = own_src.clone().or(nested_src);
    // A blob URL keeps the descriptor but cannot be shared outward.
    let source_url = playable.filter(|u| !u.starts_with("blob:"));

    let mut nested_streams = Vec::new();
    if let Some(src) = &own_src {
        if !src.starts_with("blob:") {
            nested_streams.push(markup_stream(src, None));
        }
    }
    for source in el.select(&SOURCE_SEL) {
        let Some(raw) = source.value().attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        if raw.starts_with("blob:") {
            continue;
        }
        let url = resolve_url(page_url, raw);
        nested_streams.push(markup_stream(&url, source.value().attr("type")));
    }

    VideoCandidate {
        platform: Platform::Html5,
        external_id: None,
        title: element_title(doc, el),
        duration_seconds: None,
        page_url: page_url.to_string(),
        source_url,
        thumbnail_url: el
            .value()
            .attr("poster")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| resolve_url(page_url, s)),
        nested_streams,
    }
}

fn markup_stream(url: &str, type_attr: Option<&str>) -> StreamCandidate {
    StreamCandidate::from_markup(
        url.to_string(),
        ruleset::stream_kind(url, type_attr),
        ruleset::quality_label(url),
        type_attr.map(ToString::to_string),
    )
}

/// Title priority: `title` attribute, `aria-label`, the nearest heading
/// inside an article/section/player-like ancestor, then the document title.
fn element_title(doc: &Html, el: ElementRef<'_>) -> Option<String> {
    for attr in ["title", "aria-label"] {
        if let Some(value) = el.value().attr(attr) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    if let Some(heading) = nearest_heading(el) {
        return Some(heading);
    }
    document_title(doc)
}

fn nearest_heading(el: ElementRef<'_>) -> Option<String> {
    for node in el.ancestors() {
        let Some(ancestor) = ElementRef::wrap(node) else {
            continue;
        };
        if !looks_like_media_container(ancestor) {
            continue;
        }
        if let Some(heading) = ancestor.select(&HEADING_SEL).next() {
            let text = heading.text().collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

fn looks_like_media_container(el: ElementRef<'_>) -> bool {
    if matches!(el.value().name(), "article" | "section" | "main" | "figure") {
        return true;
    }
    let class = el.value().attr("class").unwrap_or_default();
    let id = el.value().attr("id").unwrap_or_default();
    let hints = format!("{class} {id}").to_ascii_lowercase();
    hints.contains("player") || hints.contains("video") || hints.contains("media")
}

/// Pixel area from width/height attributes or inline style. `None` when
/// either dimension is undeclared or non-numeric (percentages, auto).
fn declared_area(el: &ElementRef<'_>) -> Option<u32> {
    let width = declared_dimension(el, "width", &STYLE_WIDTH)?;
    let height = declared_dimension(el, "height", &STYLE_HEIGHT)?;
    Some(width.saturating_mul(height))
}

fn declared_dimension(el: &ElementRef<'_>, attr: &str, style_pattern: &Regex) -> Option<u32> {
    if let Some(value) = el.value().attr(attr) {
        let value = value.trim().trim_end_matches("px");
        if let Ok(n) = value.parse() {
            return Some(n);
        }
    }
    let style = el.value().attr("style")?;
    style_pattern
        .captures(style)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamKind;

    fn scan(html: &str) -> Vec<VideoCandidate> {
        let doc = Html::parse_document(html);
        scan_video_elements("https://example.com/page", &doc, 10_000)
    }

    #[test]
    fn tiny_declared_videos_are_skipped() {
        let candidates = scan(
            r#"<video src="decor.mp4" width="48" height="48"></video>
               <video src="main.mp4" width="1280" height="720"></video>"#,
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].source_url.as_deref(),
            Some("https://example.com/main.mp4")
        );
    }

    #[test]
    fn undeclared_geometry_is_kept() {
        let candidates = scan(r#"<video src="main.mp4"></video>"#);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn inline_style_geometry_counts() {
        let candidates = scan(r#"<video src="decor.mp4" style="width: 60px; height: 40px"></video>"#);
        assert!(candidates.is_empty());
    }

    #[test]
    fn blob_source_omits_direct_url_but_keeps_candidate() {
        let candidates = scan(r#"<video src="blob:https://example.com/f3a1"></video>"#);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].source_url.is_none());
        assert!(candidates[0].nested_streams.is_empty());
    }

    #[test]
    fn nested_source_supplies_playable_url() {
        let candidates = scan(
            r#"<video><source src="/v/clip.webm" type="video/webm"></video>"#,
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].source_url.as_deref(),
            Some("https://example.com/v/clip.webm")
        );
        assert_eq!(candidates[0].nested_streams.len(), 1);
        assert_eq!(candidates[0].nested_streams[0].kind, StreamKind::Webm);
        assert_eq!(
            candidates[0].nested_streams[0].content_type.as_deref(),
            Some("video/webm")
        );
    }

    #[test]
    fn own_src_and_nested_sources_all_become_streams() {
        let candidates = scan(
            r#"<video src="a.mp4">
                 <source src="b.webm" type="video/webm">
                 <source src="c.m3u8" type="application/x-mpegURL">
               </video>"#,
        );
        let kinds: Vec<StreamKind> =
            candidates[0].nested_streams.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StreamKind::Mp4, StreamKind::Webm, StreamKind::Hls]);
    }

    #[test]
    fn title_attribute_wins() {
        let candidates = scan(
            r#"<html><head><title>Page</title></head><body>
               <video src="a.mp4" title="Attr Title" aria-label="Label"></video>
               </body></html>"#,
        );
        assert_eq!(candidates[0].title.as_deref(), Some("Attr Title"));
    }

    #[test]
    fn container_heading_beats_document_title() {
        let candidates = scan(
            r#"<html><head><title>Site</title></head><body>
               <article><h2>Episode 4</h2><div><video src="a.mp4"></video></div></article>
               </body></html>"#,
        );
        assert_eq!(candidates[0].title.as_deref(), Some("Episode 4"));
    }

    #[test]
    fn document_title_is_last_resort() {
        let candidates = scan(
            r#"<html><head><title>Site Page</title></head><body>
               <video src="a.mp4"></video>
               </body></html>"#,
        );
        assert_eq!(candidates[0].title.as_deref(), Some("Site Page"));
    }

    #[test]
    fn poster_becomes_thumbnail() {
        let candidates = scan(r#"<video src="a.mp4" poster="/img/cover-art"></video>"#);
        assert_eq!(
            candidates[0].thumbnail_url.as_deref(),
            Some("https://example.com/img/cover-art")
        );
    }
}
