//! Decision-engine output (§3, §4.6, §6's wire tokens).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    DirectPlay,
    DirectStream,
    /// Wire token is `transcoder`, not `transcode` — see §6.
    #[serde(rename = "transcoder")]
    Transcode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Hls,
    Mp4,
}

/// Reason codes a client/operator can key UI or alerting off of (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    DirectplaySupported,
    DirectstreamRemux,
    TranscodeVideo,
    TranscodeAudio,
    TranscodeRequired,
    ProbeFailed,
    ForceHls,
    SafariTsNeedsHls,
    SafariDirectMp4,
    ChromeDirectMp4,
    UnknownContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackPlan {
    pub mode: Mode,
    pub protocol: Protocol,
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub decision_reason: DecisionReason,
    /// Short tag mirroring the matched condition, e.g. `all_compatible`.
    pub truth_reason: String,
    pub duration: Option<i64>,
}
