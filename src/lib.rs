//! `vidscout` - Passive media-stream detection
//!
//! Classifies a browsing session's observed traffic and parsed documents
//! into playable media candidates.
//!
//! # Features
//!
//! - **Heuristic ruleset**: layered URL/MIME classification with an
//!   exclusion-first funnel and quality-label inference
//! - **Document scanner**: platform pages, `<video>` elements, iframe
//!   embeds, orphaned `<source>` declarations
//! - **Session store**: per-tab deduplicated, capacity-bounded stream
//!   lists with navigation resets and best-effort notifications
//! - **Aggregation**: one merged display list across both sources
//!
//! # Example
//!
//! ```rust
//! use vidscout::{DetectorConfig, ResponseEvent, SessionStore};
//!
//! let store = SessionStore::new(DetectorConfig::default());
//! let event: ResponseEvent = serde_json::from_str(
//!     r#"{"session_id":1,"url":"https://cdn.example.com/v/movie.mp4","status":200}"#,
//! ).unwrap();
//! store.observe(&event);
//! assert_eq!(store.streams(1).len(), 1);
//! ```

pub mod aggregate;
pub mod config;
pub mod event;
pub mod ruleset;
pub mod scan;
pub mod session;
pub mod types;

pub use aggregate::merge;
pub use config::DetectorConfig;
pub use event::{CapturedRecord, ResourceKind, ResponseEvent, SessionId};
pub use ruleset::{classify, quality_label, stream_kind, Classification, MatchLayer};
pub use scan::{PlatformScanner, Scanner};
pub use session::{SessionStore, StreamAdded};
pub use types::{Platform, StreamCandidate, StreamKind, VideoCandidate};

/// Version of vidscout
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
