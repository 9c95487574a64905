//! Observed-response input model.
//!
//! A [`ResponseEvent`] is one HTTP response as reported by whatever watches
//! the session's traffic — a devtools bridge, a proxy tap, or a JSONL
//! capture replayed through the CLI. Events are noisy, high-volume
//! telemetry: anything malformed is dropped by the classifier, never raised
//! as an error.

use serde::{Deserialize, Serialize};

/// Session identifier — one browsing tab.
pub type SessionId = u64;

/// Coarse resource kind as reported by the traffic source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
    Xhr,
    #[default]
    Other,
}

impl ResourceKind {
    /// Kinds eligible for the weak keyword fallback. Scripts, styles and
    /// images never are — the fallback exists for ambiguous XHR and media
    /// fetches, not for page furniture.
    pub fn weakly_classifiable(self) -> bool {
        matches!(self, ResourceKind::Media | ResourceKind::Xhr | ResourceKind::Other)
    }
}

/// One observed HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEvent {
    /// Owning session. Events without one are dropped silently.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Absolute resource URL.
    pub url: String,
    #[serde(default)]
    pub resource_kind: ResourceKind,
    /// HTTP status, when the source reports one.
    #[serde(default)]
    pub status: Option<u16>,
    /// `content-type` header value, when present.
    #[serde(default)]
    pub content_type: Option<String>,
    /// `content-length` header value, when present.
    #[serde(default)]
    pub content_length: Option<u64>,
}

impl ResponseEvent {
    /// Succeeded in the sense the classifier cares about: 2xx/3xx, or no
    /// status reported at all.
    pub fn succeeded(&self) -> bool {
        match self.status {
            Some(code) => (200..400).contains(&code),
            None => true,
        }
    }
}

/// One line of a captured session log: a response observation or a
/// lifecycle signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapturedRecord {
    Response(ResponseEvent),
    NavigationStart { session_id: SessionId, url: String },
    SessionClose { session_id: SessionId },
}

/// Failure to decode a captured record line.
#[derive(Debug, thiserror::Error)]
#[error("invalid captured record: {0}")]
pub struct RecordDecodeError(#[from] serde_json::Error);

impl std::str::FromStr for CapturedRecord {
    type Err = RecordDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
