//! Client capability declarations (§3). Servers may constrain these lists
//! but must never extend them — that invariant is enforced in
//! `service::capability_resolver`, not here; this module is pure data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Tvos,
    Safari,
    AndroidTv,
    StbEnigma2,
    VlcDesktop,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxVideo {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackCapabilities {
    pub capabilities_version: u32,
    pub containers: Vec<String>,
    pub video_codecs: Vec<String>,
    pub audio_codecs: Vec<String>,
    pub supports_hls: bool,
    pub device_type: Option<DeviceType>,
    pub allow_transcode: Option<bool>,
    pub max_video: Option<MaxVideo>,
}

impl PlaybackCapabilities {
    #[must_use]
    pub fn supports_container(&self, token: &str) -> bool {
        self.containers.iter().any(|c| c.eq_ignore_ascii_case(token))
    }

    #[must_use]
    pub fn supports_video_codec(&self, token: &str) -> bool {
        self.video_codecs
            .iter()
            .any(|c| c.eq_ignore_ascii_case(token))
    }

    #[must_use]
    pub fn supports_audio_codec(&self, token: &str) -> bool {
        self.audio_codecs
            .iter()
            .any(|c| c.eq_ignore_ascii_case(token))
    }

    /// Lowercases and dedupes every codec/container token, preserving first
    /// occurrence order (§4.7 "canonicalize").
    #[must_use]
    pub fn canonicalized(mut self) -> Self {
        self.containers = canonicalize_tokens(self.containers);
        self.video_codecs = canonicalize_tokens(self.video_codecs);
        self.audio_codecs = canonicalize_tokens(self.audio_codecs);
        self
    }
}

fn canonicalize_tokens(tokens: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let lower = t.to_lowercase();
        if seen.insert(lower.clone()) {
            out.push(lower);
        }
    }
    out
}
