//! C9: the preparation driver — owns artifact lifecycle transitions, drives
//! HLS build jobs for transcode plans, and gates serving on proven
//! readiness (§4.8).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::Digest;

use crate::cache::MetadataCache;
use crate::collaborators::{ArtifactFs, BuildManager, BuildSpec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Job, Mode, Metadata, PlaybackPlan, Protocol, State, Status};
use crate::service::source_resolver::{ResolvedSource, SourceKind};
use crate::service::truth_provider::TruthProvider;

/// `hls_root/<sha256-hex-of-ref>/` (§6 "Persisted state layout").
#[must_use]
pub fn recording_cache_dir(hls_root: &Path, reference: &str) -> PathBuf {
    let digest = sha2::Sha256::digest(reference.as_bytes());
    hls_root.join(hex::encode(digest))
}

/// `index.m3u8` for a file source, `index.live.m3u8` for a receiver source
/// (§4.8-A).
#[must_use]
pub fn playlist_name_for(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Local => "index.m3u8",
        SourceKind::Receiver => "index.live.m3u8",
    }
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub ready: bool,
    pub local_path: Option<String>,
    pub state: Option<Status>,
    pub retry_after_s: Option<u64>,
}

pub struct PreparationDriver {
    config: Arc<Config>,
    metadata_cache: Arc<MetadataCache>,
    truth_provider: Arc<TruthProvider>,
    build_manager: Arc<dyn BuildManager>,
    artifact_fs: Arc<dyn ArtifactFs>,
}

impl PreparationDriver {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        metadata_cache: Arc<MetadataCache>,
        truth_provider: Arc<TruthProvider>,
        build_manager: Arc<dyn BuildManager>,
        artifact_fs: Arc<dyn ArtifactFs>,
    ) -> Self {
        Self {
            config,
            metadata_cache,
            truth_provider,
            build_manager,
            artifact_fs,
        }
    }

    /// Maps a transcode/HLS plan to an idempotent build request (§4.8-A).
    /// No-op for every other `(mode, protocol)` combination.
    pub async fn ensure_prepared(&self, reference: &str, source: &ResolvedSource, plan: &PlaybackPlan) -> Result<()> {
        if !(plan.mode == Mode::Transcode && plan.protocol == Protocol::Hls) {
            return Ok(());
        }

        let cache_dir = recording_cache_dir(&self.config.hls_root, reference);
        let playlist_name = playlist_name_for(source.kind);
        let final_path = cache_dir.join(playlist_name);

        let spec = BuildSpec {
            work_dir: self.config.hls_root.to_string_lossy().into_owned(),
            recording_ref: reference.to_string(),
            source_url: source.source_url.clone(),
            cache_dir: cache_dir.to_string_lossy().into_owned(),
            playlist_name: playlist_name.to_string(),
            final_path: final_path.to_string_lossy().into_owned(),
            profile: "default".to_string(),
        };

        self.build_manager.ensure_spec(&spec).await?;
        tracing::info!(reference, cache_dir = %spec.cache_dir, "hls build ensured");
        Ok(())
    }

    /// Serve-readiness gate (§4.8-B). Fails closed: any doubt about the
    /// artifact being intact reports `Upstream` and demotes the cached
    /// state so the next request re-enters preparation.
    pub async fn stream(&self, reference: &str) -> Result<StreamResult> {
        let meta = self.metadata_cache.get(reference);

        if meta.state != State::Ready {
            let _ = self.truth_provider.get_media_truth(reference).await;
            return Ok(StreamResult {
                ready: false,
                local_path: None,
                state: Some(wire_status_for_preparing(&meta)),
                retry_after_s: Some(5),
            });
        }

        let Some(artifact_path) = meta.artifact_path.clone() else {
            self.metadata_cache.demote_on_open_failure(reference);
            let _ = self.truth_provider.get_media_truth(reference).await;
            return Ok(StreamResult {
                ready: false,
                local_path: None,
                state: Some(Status::Repair),
                retry_after_s: Some(5),
            });
        };

        match self.artifact_fs.open_and_stat(&artifact_path).await {
            Ok(()) => Ok(StreamResult {
                ready: true,
                local_path: Some(artifact_path),
                state: Some(Status::Ready),
                retry_after_s: None,
            }),
            Err(err) => {
                self.metadata_cache.demote_on_open_failure(reference);
                Err(Error::Upstream(format!("artifact open failed: {err}")))
            }
        }
    }
}

fn wire_status_for_preparing(meta: &Metadata) -> Status {
    match meta.state {
        State::Failed => Status::Failed,
        State::Preparing => Status::Preparing,
        State::Missing => Status::Unknown,
        State::Unknown | State::Ready => Status::Idle,
    }
}

/// §4.8-C status precedence: an active/terminal build job overrides cached
/// metadata state; otherwise metadata maps `READY`/`FAILED` directly, else
/// `IDLE`. Job `reason` is preferred over `Metadata.error`.
#[must_use]
pub fn status_of(job: Option<&Job>, metadata: &Metadata) -> (Status, Option<String>) {
    if let Some(job) = job {
        if job.is_active() {
            return (Status::Running, non_empty(&job.reason));
        }
        match job.state {
            Some(crate::models::JobState::Succeeded) => return (Status::Ready, non_empty(&job.reason)),
            Some(crate::models::JobState::Failed) => return (Status::Failed, non_empty(&job.reason)),
            _ => {}
        }
    }

    match metadata.state {
        State::Ready => (Status::Ready, non_empty(&metadata.error)),
        State::Failed => (Status::Failed, non_empty(&metadata.error)),
        _ => (Status::Idle, None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
