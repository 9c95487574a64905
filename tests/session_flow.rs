//! End-to-end flows across the classifier, session store, scanner, and
//! aggregation seam.

use scraper::Html;

use vidscout::{
    merge, DetectorConfig, Platform, ResourceKind, ResponseEvent, Scanner, SessionStore, StreamKind,
};

fn media_event(session: u64, url: &str, length: Option<u64>) -> ResponseEvent {
    ResponseEvent {
        session_id: Some(session),
        url: url.to_string(),
        resource_kind: ResourceKind::Media,
        status: Some(200),
        content_type: None,
        content_length: length,
    }
}

#[test]
fn stream_list_stays_unique_and_bounded() {
    let store = SessionStore::new(DetectorConfig::default());
    // Feed each URL twice; duplicates never land.
    for _round in 0..2 {
        for i in 0..40 {
            store.observe(&media_event(1, &format!("https://cdn.test/v/clip{i}.mp4"), Some(50_000)));
        }
    }
    let streams = store.streams(1);
    assert_eq!(streams.len(), 30);

    let mut urls: Vec<_> = streams.iter().map(|s| s.url.clone()).collect();
    urls.dedup();
    assert_eq!(urls.len(), 30);

    // Oldest evicted first: clips 0-9 are gone, 10-39 remain in order.
    assert_eq!(streams[0].url, "https://cdn.test/v/clip10.mp4");
    assert_eq!(streams[29].url, "https://cdn.test/v/clip39.mp4");
}

#[test]
fn mixed_traffic_keeps_only_plausible_streams() {
    let store = SessionStore::new(DetectorConfig::default());
    let events = [
        // Accepted: plain progressive download.
        media_event(1, "https://cdn.test/v/movie_1080p.mp4", Some(2_000_000)),
        // Rejected: tracking path wins over the extension.
        media_event(1, "https://cdn.test/ad/tracking/video.mp4?x=1", Some(2_000_000)),
        // Rejected: static asset.
        media_event(1, "https://cdn.test/app.js", Some(2_000_000)),
        // Accepted: tiny manifest is exempt from the size floor.
        media_event(1, "https://cdn.test/live/playlist.m3u8", Some(900)),
        // Rejected: tiny progressive file.
        media_event(1, "https://cdn.test/v/stub.mp4", Some(900)),
    ];
    for event in &events {
        store.observe(event);
    }

    let streams = store.streams(1);
    let urls: Vec<&str> = streams.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.test/v/movie_1080p.mp4",
            "https://cdn.test/live/playlist.m3u8",
        ]
    );
    assert_eq!(streams[0].quality.as_deref(), Some("1080p"));
    assert_eq!(streams[1].kind, StreamKind::Hls);
}

#[test]
fn image_content_type_is_rejected_whatever_the_url_says() {
    let store = SessionStore::new(DetectorConfig::default());
    let mut event = media_event(1, "https://cdn.test/watch/video.mp4", Some(2_000_000));
    event.content_type = Some("image/png".into());
    assert!(!store.observe(&event));
    assert!(store.streams(1).is_empty());
}

#[test]
fn aggregation_merges_scanner_and_network_views() {
    let page_url = "https://example.com/episode-4";
    let doc = Html::parse_document(
        r#"<html><head><title>Episode 4</title></head><body>
        <video src="https://cdn.test/v/episode4.mp4" width="1280" height="720"></video>
        </body></html>"#,
    );
    let scanner = Scanner::new();
    let page_candidates = scanner.scan(page_url, &doc);
    assert_eq!(page_candidates.len(), 1);

    let store = SessionStore::new(DetectorConfig::default());
    // The same file observed on the wire, plus one the scanner never saw.
    store.observe(&media_event(9, "https://cdn.test/v/episode4.mp4", Some(4_000_000)));
    store.observe(&media_event(9, "https://cdn.test/hls/master.m3u8", None));

    let merged = merge(page_url, page_candidates, &store.streams(9));
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].platform, Platform::Html5);
    assert_eq!(merged[0].title.as_deref(), Some("Episode 4"));
    assert_eq!(merged[1].title.as_deref(), Some("master.m3u8"));
    assert_eq!(merged[1].nested_streams[0].kind, StreamKind::Hls);
}

#[tokio::test]
async fn notification_followed_by_full_refetch_sees_consistent_state() {
    let store = SessionStore::new(DetectorConfig::default());
    let mut rx = store.subscribe();

    store.observe(&media_event(3, "https://cdn.test/v/a.mp4", Some(90_000)));
    store.observe(&media_event(3, "https://cdn.test/v/b.mp4", Some(90_000)));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.stream.url, "https://cdn.test/v/a.mp4");
    // Whatever notifications were missed, the list itself is complete.
    assert_eq!(store.streams(3).len(), 2);
}
