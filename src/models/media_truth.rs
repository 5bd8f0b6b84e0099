//! The decision engine's input: an immutable, possibly-partial snapshot of
//! a recording's media properties and readiness (§3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TruthState {
    Ready,
    Preparing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeState {
    Unknown,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeBlockedReason {
    /// No prober is configured and no local path is known (§4.5 step 7).
    Disabled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTruth {
    pub state: Option<TruthState>,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub duration: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub interlaced: Option<bool>,
    pub probe_state: Option<ProbeState>,
    pub probe_blocked_reason: Option<ProbeBlockedReason>,
    pub retry_after_seconds: Option<u64>,
}

impl MediaTruth {
    #[must_use]
    pub fn ready(
        container: impl Into<String>,
        video_codec: impl Into<String>,
        audio_codec: impl Into<String>,
        duration: Option<i64>,
        width: Option<u32>,
        height: Option<u32>,
        fps: Option<f64>,
        interlaced: Option<bool>,
    ) -> Self {
        Self {
            state: Some(TruthState::Ready),
            container: container.into(),
            video_codec: video_codec.into(),
            audio_codec: audio_codec.into(),
            duration,
            width,
            height,
            fps,
            interlaced,
            probe_state: None,
            probe_blocked_reason: None,
            retry_after_seconds: None,
        }
    }

    #[must_use]
    pub fn preparing(probe_state: ProbeState, retry_after_seconds: u64) -> Self {
        Self {
            state: Some(TruthState::Preparing),
            probe_state: Some(probe_state),
            retry_after_seconds: Some(retry_after_seconds),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn preparing_blocked(reason: ProbeBlockedReason, retry_after_seconds: u64) -> Self {
        Self {
            state: Some(TruthState::Preparing),
            probe_state: Some(ProbeState::Blocked),
            probe_blocked_reason: Some(reason),
            retry_after_seconds: Some(retry_after_seconds),
            ..Self::default()
        }
    }

    /// A terminal-failure truth that still carries previously-known media
    /// fields, per §4.5 step 6 and §7 ("terminal metadata failures are
    /// sticky").
    #[must_use]
    pub fn failed_with_known_fields(meta: &crate::models::Metadata) -> Self {
        Self {
            state: Some(TruthState::Failed),
            container: meta.container.clone(),
            video_codec: meta.video_codec.clone(),
            audio_codec: meta.audio_codec.clone(),
            duration: meta.duration,
            width: meta.width,
            height: meta.height,
            fps: meta.fps,
            interlaced: meta.interlaced,
            probe_state: None,
            probe_blocked_reason: None,
            retry_after_seconds: None,
        }
    }

    /// `codec_complete` per §4.5 step 8: container/video/audio tokens are
    /// all nonempty and none is the literal `"unknown"`.
    #[must_use]
    pub fn is_codec_complete(&self) -> bool {
        [&self.container, &self.video_codec, &self.audio_codec]
            .into_iter()
            .all(|t| !t.is_empty() && !t.eq_ignore_ascii_case("unknown"))
    }
}
