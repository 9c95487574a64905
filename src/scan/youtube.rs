//! YouTube page scanner.
//!
//! Works from the page URL (watch, short-link, embed, shorts, live shapes)
//! plus whatever markup the watch page exposes: title headings, Open Graph
//! tags, and the player-response JSON inside script tags for the duration.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{document_title, PlatformScanner};
use crate::types::{Platform, VideoCandidate};

pub struct YouTubeScanner;

/// Title selectors on a watch page, most specific first.
static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h1.ytd-watch-metadata", "h1.title", "#title h1"]
        .iter()
        .map(|s| Selector::parse(s).expect("youtube title selector"))
        .collect()
});

static OG_TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("og:title selector"));

static SCRIPT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("script selector"));

/// `"lengthSeconds":"245"` inside the embedded player-response JSON.
static LENGTH_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""lengthSeconds"\s*:\s*"?(\d+)"#).expect("lengthSeconds pattern"));

impl PlatformScanner for YouTubeScanner {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn matches(&self, page_url: &str) -> bool {
        video_id(page_url).is_some()
    }

    fn scan(&self, page_url: &str, doc: &Html) -> Option<VideoCandidate> {
        let id = video_id(page_url)?;
        let mut candidate = VideoCandidate::embed(Platform::Youtube, Some(id.clone()), page_url);
        candidate.title = extract_title(doc);
        candidate.duration_seconds = extract_duration(doc);
        candidate.thumbnail_url = Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"));
        Some(candidate)
    }
}

/// Extract the video id from any of the known URL shapes: `/watch?v=`,
/// `youtu.be/`, `/embed/`, `/shorts/`, `/live/`, `/v/`.
pub(crate) fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host == "youtu.be" {
        let id = parsed.path_segments()?.next()?;
        return valid_id(id);
    }
    if host != "youtube.com"
        && host != "m.youtube.com"
        && host != "music.youtube.com"
        && host != "youtube-nocookie.com"
    {
        return None;
    }
    if parsed.path() == "/watch" {
        let id = parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())?;
        return valid_id(&id);
    }
    let mut segments = parsed.path_segments()?;
    match segments.next() {
        Some("embed" | "shorts" | "live" | "v") => valid_id(segments.next()?),
        _ => None,
    }
}

fn valid_id(id: &str) -> Option<String> {
    let ok = id.len() >= 6
        && id.len() <= 20
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    ok.then(|| id.to_string())
}

fn extract_title(doc: &Html) -> Option<String> {
    for sel in TITLE_SELECTORS.iter() {
        if let Some(el) = doc.select(sel).next() {
            let text = el.text().collect::<String>();
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    if let Some(meta) = doc.select(&OG_TITLE_SEL).next() {
        if let Some(content) = meta.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    document_title(doc).map(|t| t.trim_end_matches(" - YouTube").to_string())
}

fn extract_duration(doc: &Html) -> Option<f64> {
    for script in doc.select(&SCRIPT_SEL) {
        let text = script.text().collect::<String>();
        if let Some(cap) = LENGTH_SECONDS.captures(&text) {
            return cap.get(1)?.as_str().parse().ok();
        }
    }
    None
}
