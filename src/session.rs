//! Per-session stream classification and lifecycle.
//!
//! [`SessionStore`] owns every session's stream list and is its only
//! mutator. Network observers push [`ResponseEvent`]s in observation order;
//! the store runs the classification funnel, dedups, bounds capacity, and
//! fans out best-effort "stream added" notifications. `streams()` is always
//! the authoritative view — a missed notification loses nothing.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::config::DetectorConfig;
use crate::event::{CapturedRecord, ResponseEvent, SessionId};
use crate::ruleset;
use crate::types::StreamCandidate;

/// Notification payload for one accepted stream.
#[derive(Debug, Clone)]
pub struct StreamAdded {
    pub session_id: SessionId,
    pub stream: StreamCandidate,
}

#[derive(Debug, Default)]
struct SessionState {
    streams: VecDeque<StreamCandidate>,
    page_url: Option<String>,
}

/// Keyed store of per-session classifier state.
///
/// Sessions are created lazily on first observation, cleared on navigation,
/// and discarded on close. A session id seen again after close starts from
/// scratch.
pub struct SessionStore {
    config: DetectorConfig,
    sessions: RwLock<HashMap<SessionId, SessionState>>,
    added: broadcast::Sender<StreamAdded>,
}

impl SessionStore {
    pub fn new(config: DetectorConfig) -> Self {
        let (added, _) = broadcast::channel(64);
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            added,
        }
    }

    /// Subscribe to "stream added" notifications. Delivery is best-effort:
    /// lagging receivers miss entries and should re-read `streams()`.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamAdded> {
        self.added.subscribe()
    }

    /// Feed one observed response through the funnel. Returns whether a
    /// candidate was retained.
    pub fn observe(&self, event: &ResponseEvent) -> bool {
        let Some(session_id) = event.session_id else {
            trace!(url = %event.url, "dropping event without session id");
            return false;
        };
        if !event.succeeded() {
            trace!(url = %event.url, status = ?event.status, "dropping failed response");
            return false;
        }

        let Some(classification) = ruleset::classify(
            &event.url,
            event.content_type.as_deref(),
            event.resource_kind,
            self.config.weak_heuristics,
        ) else {
            return false;
        };

        // Size floor. Segment/manifest fetches are legitimately tiny.
        if let Some(len) = event.content_length {
            if len < self.config.min_stream_bytes && !classification.kind.is_segmented() {
                trace!(url = %event.url, len, "below size floor");
                return false;
            }
        }

        let Ok(mut sessions) = self.sessions.write() else {
            return false;
        };
        let state = sessions.entry(session_id).or_default();

        if state.streams.iter().any(|s| s.url == event.url) {
            return false;
        }
        // Same resource re-requested with a different cache-buster collapses
        // to one entry. Segmented kinds are exempt: many distinct same-base
        // URLs are their normal shape.
        if !classification.kind.is_segmented() {
            let base = strip_query(&event.url);
            if state
                .streams
                .iter()
                .any(|s| s.kind == classification.kind && strip_query(&s.url) == base)
            {
                trace!(url = %event.url, "near-duplicate of an existing entry");
                return false;
            }
        }

        let candidate = StreamCandidate {
            url: event.url.clone(),
            kind: classification.kind,
            size_bytes: event.content_length,
            quality: classification.quality,
            content_type: event.content_type.clone(),
            observed_at: Utc::now(),
        };
        debug!(
            session = session_id,
            url = %candidate.url,
            kind = %candidate.kind,
            layer = ?classification.layer,
            "stream accepted"
        );

        state.streams.push_back(candidate.clone());
        while state.streams.len() > self.config.max_streams_per_session {
            if let Some(evicted) = state.streams.pop_front() {
                debug!(session = session_id, url = %evicted.url, "evicting oldest stream");
            }
        }

        // Fire-and-forget: no receivers is fine.
        let _ = self.added.send(StreamAdded {
            session_id,
            stream: candidate,
        });
        true
    }

    /// Feed one captured record — observation or lifecycle signal — into
    /// the store.
    pub fn apply(&self, record: &CapturedRecord) {
        match record {
            CapturedRecord::Response(event) => {
                self.observe(event);
            }
            CapturedRecord::NavigationStart { session_id, url } => {
                self.begin_navigation(*session_id, url);
            }
            CapturedRecord::SessionClose { session_id } => self.close(*session_id),
        }
    }

    /// A session's top-level document started loading a new URL: clear all
    /// accumulated state before any further event is accepted.
    pub fn begin_navigation(&self, session_id: SessionId, new_url: &str) {
        let Ok(mut sessions) = self.sessions.write() else {
            return;
        };
        let state = sessions.entry(session_id).or_default();
        if !state.streams.is_empty() {
            info!(session = session_id, url = new_url, cleared = state.streams.len(), "navigation reset");
        }
        state.streams.clear();
        state.page_url = Some(new_url.to_string());
    }

    /// The session ended. All of its state is discarded.
    pub fn close(&self, session_id: SessionId) {
        let Ok(mut sessions) = self.sessions.write() else {
            return;
        };
        if sessions.remove(&session_id).is_some() {
            info!(session = session_id, "session closed");
        }
    }

    /// Current bounded stream list for a session, in insertion order.
    /// Unknown sessions yield an empty list.
    pub fn streams(&self, session_id: SessionId) -> Vec<StreamCandidate> {
        self.sessions
            .read()
            .ok()
            .and_then(|s| s.get(&session_id).map(|st| st.streams.iter().cloned().collect()))
            .unwrap_or_default()
    }

    /// Last navigation URL recorded for a session, if any.
    pub fn page_url(&self, session_id: SessionId) -> Option<String> {
        self.sessions
            .read()
            .ok()
            .and_then(|s| s.get(&session_id).and_then(|st| st.page_url.clone()))
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Session ids with at least one retained stream.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions
            .read()
            .map(|s| {
                let mut ids: Vec<SessionId> =
                    s.iter().filter(|(_, st)| !st.streams.is_empty()).map(|(id, _)| *id).collect();
                ids.sort_unstable();
                ids
            })
            .unwrap_or_default()
    }
}

/// Identity ignoring query string and fragment.
fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
