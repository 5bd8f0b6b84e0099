//! Prober seams (§6 "Upstream (consumed)"). The truth provider never talks
//! to ffprobe or an OpenWebIF-fronted receiver directly — it calls through
//! these traits, which keeps it unit-testable (§9 "dynamic dispatch over
//! collaborators").

use async_trait::async_trait;
use thiserror::Error;

/// Normalized probe output (§3's Metadata media fields).
#[derive(Debug, Clone, Default)]
pub struct StreamInfo {
    pub container: String,
    pub video_codec: String,
    pub audio_codec: String,
    /// Seconds; `None` when unknown.
    pub duration: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub interlaced: Option<bool>,
}

#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// The prober returned a nil/empty result for a local file (§6).
    #[error("probe returned no usable stream information")]
    Corrupt,
    /// A remote probe explicitly declined to produce info (§6, §9 — this
    /// must never be synthesized into fabricated codecs).
    #[error("remote probe unsupported")]
    RemoteUnsupported,
    #[error("probe timed out")]
    Timeout,
    #[error("probe transport error: {0}")]
    Transport(String),
}

/// Probes a local file path.
#[async_trait]
pub trait LocalProber: Send + Sync {
    async fn probe(&self, local_path: &str) -> Result<StreamInfo, ProbeError>;
}

/// Probes a remote (receiver-hosted) URL. `Ok(None)` means "probe
/// succeeded but returned no info", which the truth provider maps to
/// `ProbeError::RemoteUnsupported` semantics without persisting a failure.
#[async_trait]
pub trait RemoteProber: Send + Sync {
    async fn probe(&self, source_url: &str) -> Result<Option<StreamInfo>, ProbeError>;
}
