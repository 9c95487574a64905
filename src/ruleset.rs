//! URL/MIME heuristic ruleset.
//!
//! Classifies an observed `(url, content type, resource kind)` triple as a
//! media stream or not, using a layered funnel evaluated in a fixed order:
//!
//! 1. **Exclusion rules** — ad/tracking hosts, analytics paths, static
//!    asset extensions, thumbnail paths, and known non-media MIME types
//!    veto everything else. This runs first so a tracking pixel served as
//!    `application/octet-stream` can never sneak through a later layer.
//! 2. **MIME allow-list** — video/audio types, HLS/DASH manifest types,
//!    and the permissive octet-stream catch-all.
//! 3. **URL allow-list** — stream file extensions, manifest path
//!    conventions, and known video-CDN hostnames.
//! 4. **Weak keyword fallback** — media-ish keywords in the URL, only for
//!    `media`/`xhr`/`other` resource kinds. Deliberately loose; callers can
//!    switch it off (see [`crate::config::DetectorConfig`]).
//!
//! Everything here is a pure function over strings. Pattern tables are
//! compiled once and shared.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::ResourceKind;
use crate::types::StreamKind;

/// Which funnel layer accepted a resource. Useful for tuning: weak-keyword
/// acceptances are the ones worth double-checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLayer {
    Mime,
    UrlPattern,
    WeakKeyword,
}

/// Funnel outcome for one accepted resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: StreamKind,
    pub layer: MatchLayer,
    pub quality: Option<String>,
}

// ---------------------------------------------------------------------------
// Exclusion tables
// ---------------------------------------------------------------------------

/// Ad, tracking, and telemetry hostnames.
static AD_HOSTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:doubleclick\.net|googlesyndication\.com|googleadservices\.com|google-analytics\.com|googletagmanager\.com|adservice\.google\.|scorecardresearch\.com|adnxs\.com|adsrvr\.org|criteo\.(?:com|net)|taboola\.com|outbrain\.com|moatads\.com|quantserve\.com|hotjar\.com|sentry\.io|mixpanel\.com|amplitude\.com)",
    )
    .expect("ad host pattern")
});

/// Analytics/telemetry path segments.
static ANALYTICS_PATHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)/(?:ads?|adview|adserver|banners?|sponsored|track(?:ing|er)?|analytics|telemetry|metrics?|pixel|beacon|impressions?|collect|logs?)(?:[/?#]|$)",
    )
    .expect("analytics path pattern")
});

/// Static asset extensions: images, fonts, stylesheets, scripts, favicons.
static STATIC_ASSET_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(?:png|jpe?g|gif|webp|avif|bmp|svg|ico|css|js|mjs|woff2?|ttf|otf|eot)(?:[?#]|$)")
        .expect("static asset pattern")
});

/// Thumbnail/preview/poster imagery, regardless of extension.
const PREVIEW_TOKENS: &[&str] = &["thumb", "preview", "poster", "sprite", "storyboard", "favicon"];

/// Content types that are definitively not media, whatever the URL claims.
const MIME_DENY_PREFIXES: &[&str] = &[
    "image/",
    "font/",
    "application/font",
    "text/css",
    "text/html",
    "text/javascript",
    "application/javascript",
    "application/x-javascript",
];

/// Returns `true` if the resource is known non-media and must be rejected
/// before any inclusion rule is consulted.
pub fn is_excluded(url: &str, content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        let ct = ct.trim().to_ascii_lowercase();
        if MIME_DENY_PREFIXES.iter().any(|p| ct.starts_with(p)) {
            return true;
        }
    }
    if AD_HOSTS.is_match(url) || ANALYTICS_PATHS.is_match(url) || STATIC_ASSET_EXT.is_match(url) {
        return true;
    }
    let lower = url.to_ascii_lowercase();
    PREVIEW_TOKENS.iter().any(|t| lower.contains(t))
}

// ---------------------------------------------------------------------------
// Inclusion tables
// ---------------------------------------------------------------------------

/// MIME tokens that mark a response as a stream. Octet-stream is the
/// deliberate catch-all: CDNs routinely serve media under it.
const MIME_ALLOW_TOKENS: &[&str] = &[
    "video/",
    "audio/",
    "application/x-mpegurl",
    "application/vnd.apple.mpegurl",
    "application/dash+xml",
    "application/mp4",
    "application/mpeg",
    "application/octet-stream",
];

/// Stream file extensions, query string and fragment tolerated.
static STREAM_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mp4|m4v|m4s|webm|m3u8|mpd|flv|mov|avi|mkv|3gp|ts)(?:[?#]|$)")
        .expect("stream extension pattern")
});

/// Manifest/playlist path conventions beyond plain extensions.
static MANIFEST_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:/manifest(?:[/.?(]|$)|format=m3u8|format=mpd|/playlist(?:[/.?]|$)|/hls/|/dash/|\.isml?(?:[/?]|$))")
        .expect("manifest path pattern")
});

/// Known video-CDN / platform media hostnames.
static CDN_HOSTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\.googlevideo\.com|\.vimeocdn\.com|\.ttvnw\.net|\.nflxvideo\.net|\.akamaized\.net|\.akamaihd\.net|\.dmcdn\.net|brightcove|\.llnwd\.net)",
    )
    .expect("cdn host pattern")
});

/// Keywords for the weak fallback layer. Loose on purpose; this is the
/// layer to tune when a deployment sees too many false positives.
const WEAK_URL_KEYWORDS: &[&str] = &["video", "media", "stream", "play", "watch", "clip", "movie"];

fn mime_allows(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    MIME_ALLOW_TOKENS.iter().any(|t| ct.contains(t))
}

fn url_allows(url: &str) -> bool {
    STREAM_EXT.is_match(url) || MANIFEST_PATH.is_match(url) || CDN_HOSTS.is_match(url)
}

/// Weak keyword fallback, the loosest funnel layer. Only consulted for
/// resource kinds where ambiguity is plausible (`media`/`xhr`/`other`).
pub fn weak_keyword_match(url: &str, kind: ResourceKind) -> bool {
    if !kind.weakly_classifiable() {
        return false;
    }
    let lower = url.to_ascii_lowercase();
    WEAK_URL_KEYWORDS.iter().any(|k| lower.contains(k))
}

// ---------------------------------------------------------------------------
// Funnel
// ---------------------------------------------------------------------------

/// Run the full classification funnel.
///
/// Returns `None` when no layer accepts or an exclusion rule vetoes. The
/// size floor is the caller's job — it needs the length header and the
/// segmented-kind exemption, which live with the session classifier.
pub fn classify(
    url: &str,
    content_type: Option<&str>,
    kind: ResourceKind,
    weak_fallback: bool,
) -> Option<Classification> {
    if is_excluded(url, content_type) {
        return None;
    }
    let layer = if content_type.is_some_and(mime_allows) {
        MatchLayer::Mime
    } else if url_allows(url) {
        MatchLayer::UrlPattern
    } else if weak_fallback && weak_keyword_match(url, kind) {
        MatchLayer::WeakKeyword
    } else {
        return None;
    };
    Some(Classification {
        kind: stream_kind(url, content_type),
        layer,
        quality: quality_label(url),
    })
}

/// Classify a URL found embedded in markup (a `<source>` element, an
/// orphaned declaration). No resource kind exists there and the weak
/// fallback does not apply.
pub fn classify_embedded(url: &str, content_type: Option<&str>) -> Option<Classification> {
    if is_excluded(url, content_type) {
        return None;
    }
    if !content_type.is_some_and(mime_allows) && !url_allows(url) {
        return None;
    }
    Some(Classification {
        kind: stream_kind(url, content_type),
        layer: if content_type.is_some_and(mime_allows) {
            MatchLayer::Mime
        } else {
            MatchLayer::UrlPattern
        },
        quality: quality_label(url),
    })
}

// ---------------------------------------------------------------------------
// Stream kind resolution
// ---------------------------------------------------------------------------

/// Resolve the coarse container/protocol kind.
///
/// URL evidence wins over the MIME header when both are present and
/// disagree: CDNs mislabel content types far more often than they rename
/// files. `.ts`/`.m4s` segments resolve to `hls` — segments belong to the
/// manifest family, not a kind of their own.
pub fn stream_kind(url: &str, content_type: Option<&str>) -> StreamKind {
    if let Some(cap) = STREAM_EXT.captures(url) {
        let ext = cap
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "m4v" | "mov" => return StreamKind::Mp4,
            "webm" | "mkv" => return StreamKind::Webm,
            "m3u8" | "ts" | "m4s" => return StreamKind::Hls,
            "mpd" => return StreamKind::Dash,
            "flv" => return StreamKind::Flv,
            _ => {}
        }
    }
    let lower = url.to_ascii_lowercase();
    if lower.contains("format=m3u8") || lower.contains("/hls/") {
        return StreamKind::Hls;
    }
    if lower.contains("format=mpd") || lower.contains("/dash/") {
        return StreamKind::Dash;
    }
    if let Some(ct) = content_type {
        let ct = ct.trim().to_ascii_lowercase();
        if ct.contains("mpegurl") || ct.contains("mp2t") {
            return StreamKind::Hls;
        }
        if ct.contains("dash+xml") {
            return StreamKind::Dash;
        }
        if ct.contains("webm") {
            return StreamKind::Webm;
        }
        if ct.contains("flv") {
            return StreamKind::Flv;
        }
        if ct.contains("video/mp4") || ct.contains("audio/mp4") || ct.contains("application/mp4") {
            return StreamKind::Mp4;
        }
    }
    StreamKind::Unknown
}

// ---------------------------------------------------------------------------
// Quality inference
// ---------------------------------------------------------------------------

static RES_P_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^0-9])([0-9]{3,4})p(?:[^a-z0-9]|$)").expect("NNNp pattern")
});

static RES_WXH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{3,4})x([0-9]{3,4})(?:[^0-9]|$)").expect("WxH pattern")
});

static QUALITY_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[?&](?:quality|res)=([A-Za-z0-9]+)").expect("quality param pattern")
});

static QUALITY_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[/_\-.=])(4k|uhd|fhd|hq|hd|sd)(?:[/_\-.?&]|$)").expect("quality word pattern")
});

static ITAG_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:[?&]itag=|/itag/)([0-9]+)").expect("itag pattern"));

/// Platform format id → human label. Progressive and adaptive ids for the
/// formats actually seen in the wild.
const ITAG_LABELS: &[(u32, &str)] = &[
    (5, "240p"),
    (6, "270p"),
    (17, "144p"),
    (18, "360p"),
    (22, "720p"),
    (34, "360p"),
    (35, "480p"),
    (36, "180p"),
    (37, "1080p"),
    (38, "3072p"),
    (43, "360p"),
    (44, "480p"),
    (45, "720p"),
    (46, "1080p"),
    (59, "480p"),
    (133, "240p"),
    (134, "360p"),
    (135, "480p"),
    (136, "720p"),
    (137, "1080p"),
    (160, "144p"),
    (242, "240p"),
    (243, "360p"),
    (244, "480p"),
    (247, "720p"),
    (248, "1080p"),
    (264, "1440p"),
    (266, "2160p"),
    (271, "1440p"),
    (298, "720p60"),
    (299, "1080p60"),
    (302, "720p60"),
    (303, "1080p60"),
    (308, "1440p60"),
    (313, "2160p"),
    (315, "2160p60"),
];

/// Infer a quality label from URL structure. First matching rule wins; no
/// match yields `None`, never a made-up default.
pub fn quality_label(url: &str) -> Option<String> {
    if let Some(cap) = RES_P_TOKEN.captures(url) {
        return cap.get(1).map(|m| format!("{}p", m.as_str()));
    }
    if let Some(cap) = RES_WXH_TOKEN.captures(url) {
        return cap.get(2).map(|m| format!("{}p", m.as_str()));
    }
    if let Some(cap) = QUALITY_PARAM.captures(url) {
        return cap.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(cap) = QUALITY_WORD.captures(url) {
        let word = cap.get(1)?.as_str().to_ascii_lowercase();
        return Some(
            match word.as_str() {
                "4k" | "uhd" => "4K",
                "fhd" => "1080p",
                "hd" => "HD",
                "sd" => "SD",
                "hq" => "HQ",
                _ => return None,
            }
            .to_string(),
        );
    }
    if let Some(cap) = ITAG_PARAM.captures(url) {
        let itag: u32 = cap.get(1)?.as_str().parse().ok()?;
        return ITAG_LABELS
            .iter()
            .find(|(id, _)| *id == itag)
            .map(|(_, label)| (*label).to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_known_ad_hosts() {
        assert!(is_excluded("https://ad.doubleclick.net/ddm/clk/video.mp4", None));
        assert!(is_excluded("https://www.google-analytics.com/collect?v=1", None));
    }

    #[test]
    fn excludes_analytics_paths_before_extension_match() {
        // An extension match alone must never override the exclusion layer.
        assert!(is_excluded("https://cdn.example.com/ad/tracking/video.mp4?x=1", None));
        assert!(classify(
            "https://cdn.example.com/ad/tracking/video.mp4?x=1",
            Some("video/mp4"),
            ResourceKind::Media,
            true,
        )
        .is_none());
    }

    #[test]
    fn excludes_static_assets() {
        assert!(is_excluded("https://example.com/app.js", None));
        assert!(is_excluded("https://example.com/style.css?v=3", None));
        assert!(is_excluded("https://example.com/logo.svg", None));
        assert!(is_excluded("https://example.com/font.woff2", None));
    }

    #[test]
    fn excludes_non_media_content_types_regardless_of_url() {
        assert!(is_excluded("https://example.com/watch/video.mp4", Some("image/png")));
        assert!(classify(
            "https://example.com/watch/video.mp4",
            Some("image/png"),
            ResourceKind::Media,
            true,
        )
        .is_none());
    }

    #[test]
    fn excludes_preview_imagery() {
        assert!(is_excluded("https://i.example.com/thumbnails/v123.jpg", None));
        assert!(is_excluded("https://example.com/video/poster_large", None));
    }

    #[test]
    fn does_not_exclude_plain_stream_urls() {
        assert!(!is_excluded("https://cdn.example.com/content/movie.mp4", None));
        assert!(!is_excluded("https://cdn.example.com/live/master.m3u8", None));
    }

    #[test]
    fn mime_layer_accepts_video_types() {
        let c = classify(
            "https://example.com/asset",
            Some("video/mp4"),
            ResourceKind::Xhr,
            false,
        )
        .unwrap();
        assert_eq!(c.layer, MatchLayer::Mime);
        assert_eq!(c.kind, StreamKind::Mp4);
    }

    #[test]
    fn mime_layer_accepts_manifest_types() {
        let c = classify(
            "https://example.com/asset",
            Some("application/vnd.apple.mpegURL"),
            ResourceKind::Xhr,
            false,
        )
        .unwrap();
        assert_eq!(c.kind, StreamKind::Hls);
    }

    #[test]
    fn url_layer_accepts_stream_extensions() {
        let c = classify("https://example.com/v/movie.webm", None, ResourceKind::Other, false).unwrap();
        assert_eq!(c.layer, MatchLayer::UrlPattern);
        assert_eq!(c.kind, StreamKind::Webm);
    }

    #[test]
    fn url_layer_accepts_cdn_hosts() {
        assert!(classify(
            "https://r4---sn-aigl6nze.googlevideo.com/videoplayback?expire=1",
            None,
            ResourceKind::Xhr,
            false,
        )
        .is_some());
    }

    #[test]
    fn weak_layer_respects_resource_kind() {
        // Same URL: accepted for xhr, refused for script.
        let url = "https://example.com/api/clip/next";
        assert!(classify(url, None, ResourceKind::Xhr, true).is_some());
        assert!(classify(url, None, ResourceKind::Script, true).is_none());
    }

    #[test]
    fn weak_layer_can_be_disabled() {
        let url = "https://example.com/api/clip/next";
        assert!(classify(url, None, ResourceKind::Xhr, false).is_none());
    }

    #[test]
    fn nothing_matches_plain_pages() {
        assert!(classify("https://example.com/about", None, ResourceKind::Document, true).is_none());
    }

    #[test]
    fn url_extension_beats_mime_on_conflict() {
        // Mislabeled CDN response: .webm served as video/mp4.
        assert_eq!(
            stream_kind("https://example.com/a.webm", Some("video/mp4")),
            StreamKind::Webm
        );
    }

    #[test]
    fn segment_extensions_resolve_to_hls() {
        assert_eq!(stream_kind("https://example.com/seg/00042.ts", None), StreamKind::Hls);
        assert_eq!(stream_kind("https://example.com/seg/init.m4s", None), StreamKind::Hls);
    }

    #[test]
    fn kind_from_mime_when_url_is_opaque() {
        assert_eq!(
            stream_kind("https://example.com/playback?id=9", Some("application/dash+xml")),
            StreamKind::Dash
        );
        assert_eq!(
            stream_kind("https://example.com/playback?id=9", Some("video/x-flv")),
            StreamKind::Flv
        );
        assert_eq!(stream_kind("https://example.com/playback?id=9", None), StreamKind::Unknown);
    }

    #[test]
    fn quality_from_p_token() {
        assert_eq!(quality_label("https://e.com/clips/abc_720p_h264.mp4"), Some("720p".into()));
        assert_eq!(quality_label("https://e.com/v/1080p/index.m3u8"), Some("1080p".into()));
    }

    #[test]
    fn quality_from_resolution_token() {
        assert_eq!(quality_label("https://e.com/v/1920x1080/seg1.ts"), Some("1080p".into()));
    }

    #[test]
    fn quality_from_query_param() {
        assert_eq!(quality_label("https://e.com/play?quality=hd720"), Some("hd720".into()));
        assert_eq!(quality_label("https://e.com/play?res=480"), Some("480".into()));
    }

    #[test]
    fn quality_from_word_token() {
        assert_eq!(quality_label("https://e.com/v/trailer_hd.mp4"), Some("HD".into()));
        assert_eq!(quality_label("https://e.com/v/4k/main.mpd"), Some("4K".into()));
    }

    #[test]
    fn quality_word_needs_boundaries() {
        // "hd" inside a hostname is not a quality signal.
        assert_eq!(quality_label("https://vod.akamaihdcdn.example/a"), None);
    }

    #[test]
    fn quality_from_itag_table() {
        assert_eq!(quality_label("https://y.example/videoplayback?itag=37"), Some("1080p".into()));
        assert_eq!(quality_label("https://y.example/videoplayback/itag/22/sig/x"), Some("720p".into()));
        assert_eq!(quality_label("https://y.example/videoplayback?itag=9999"), None);
    }

    #[test]
    fn quality_absent_when_nothing_matches() {
        assert_eq!(quality_label("https://example.com/content/movie.mp4"), None);
    }

    #[test]
    fn embedded_classification_skips_weak_layer() {
        assert!(classify_embedded("https://e.com/v/a.mp4", None).is_some());
        assert!(classify_embedded("https://e.com/api/clip/next", None).is_none());
        assert!(classify_embedded("https://e.com/t/thumb.mp4", None).is_none());
    }
}
