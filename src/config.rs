//! Detector configuration loaded from an optional TOML file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tunable knobs for the classifier and scanner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Capacity bound per session; oldest entries evicted first.
    pub max_streams_per_session: usize,
    /// Size floor in bytes. Smaller responses are discarded unless the
    /// resolved kind is a segmented-manifest kind.
    pub min_stream_bytes: u64,
    /// Whether the weak keyword fallback layer runs at all. The loosest,
    /// most false-positive-prone layer; deployments that only care about
    /// well-labeled streams switch it off.
    pub weak_heuristics: bool,
    /// Minimum declared pixel area for a `<video>` element to count as
    /// primary media rather than decoration.
    pub min_video_area: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_streams_per_session: 30,
            min_stream_bytes: 5000,
            weak_heuristics: true,
            min_video_area: 10_000,
        }
    }
}

impl DetectorConfig {
    /// Load from a TOML file. A missing file yields the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }
}
