//! Merge seam between the document scanner and the network classifier.
//!
//! Produces one display list per session: document-derived candidates
//! first (they carry richer identity), then network-observed streams that
//! no document candidate already represents, wrapped as minimal
//! candidates. Consumers replace their previous list wholesale.

use std::collections::HashSet;

use crate::types::{Platform, StreamCandidate, VideoCandidate};

/// Merge a scan snapshot with a session's network streams.
pub fn merge(
    page_url: &str,
    page_candidates: Vec<VideoCandidate>,
    network_streams: &[StreamCandidate],
) -> Vec<VideoCandidate> {
    let mut represented: HashSet<String> = HashSet::new();
    for candidate in &page_candidates {
        if let Some(src) = &candidate.source_url {
            represented.insert(src.clone());
        }
        for stream in &candidate.nested_streams {
            represented.insert(stream.url.clone());
        }
    }

    let mut merged = page_candidates;
    for stream in network_streams {
        if !represented.insert(stream.url.clone()) {
            continue;
        }
        merged.push(wrap_stream(page_url, stream));
    }
    merged
}

/// A network stream the scanner never saw becomes a minimal candidate
/// titled after its file name.
fn wrap_stream(page_url: &str, stream: &StreamCandidate) -> VideoCandidate {
    VideoCandidate {
        platform: Platform::Unknown,
        external_id: None,
        title: file_name(&stream.url),
        duration_seconds: None,
        page_url: page_url.to_string(),
        source_url: Some(stream.url.clone()),
        thumbnail_url: None,
        nested_streams: vec![stream.clone()],
    }
}

/// Last path segment without query/fragment, when non-empty.
fn file_name(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if name.is_empty() || name.contains("://") {
        None
    } else {
        Some(name.to_string())
    }
}
