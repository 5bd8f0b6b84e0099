//! C3 data model: per-recording `Metadata` and its `State`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a recording's artifact/metadata (§3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    Unknown,
    Preparing,
    Ready,
    Failed,
    Missing,
}

impl Default for State {
    fn default() -> Self {
        Self::Unknown
    }
}

/// One entry in the process-wide metadata cache (§3). `UpdatedAt` is a
/// monotonic nanosecond counter, never wall-clock time — see
/// `crate::cache::monotonic_now_nanos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub state: State,
    pub resolved_path: Option<String>,
    pub artifact_path: Option<String>,
    /// Seconds; `Some` only when `> 0`.
    pub duration: Option<i64>,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub interlaced: Option<bool>,
    pub error: String,
    pub updated_at: u64,
}

impl Metadata {
    #[must_use]
    pub fn has_artifact(&self) -> bool {
        self.artifact_path.is_some()
    }

    #[must_use]
    pub fn codec_complete(&self) -> bool {
        !self.container.is_empty() && !self.video_codec.is_empty() && !self.audio_codec.is_empty()
    }

    #[must_use]
    pub fn has_positive_duration(&self) -> bool {
        self.duration.is_some_and(|d| d > 0)
    }
}
