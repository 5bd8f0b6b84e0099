//! C3: the process-wide `ref -> Metadata` map (§4.2). Only the mutators
//! below may change a row — there is no public field-level setter, mirroring
//! the teacher's `cache/user_cache.rs` "typed mutators only" discipline so a
//! future per-tenant split needs no call-site changes (§9).

use dashmap::DashMap;

use crate::collaborators::StreamInfo;
use crate::models::{Metadata, State};

use super::monotonic_now_nanos;

#[derive(Default)]
pub struct MetadataCache {
    rows: DashMap<String, Metadata>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing ref behaves as `{state: Unknown}` for lookup purposes
    /// (§4.2).
    #[must_use]
    pub fn get(&self, reference: &str) -> Metadata {
        self.rows
            .get(reference)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn bump(meta: &mut Metadata) {
        let candidate = monotonic_now_nanos();
        meta.updated_at = candidate.max(meta.updated_at.saturating_add(1));
    }

    fn update_size_gauge(&self) {
        crate::metrics::METADATA_CACHE_SIZE.set(self.rows.len() as i64);
    }

    /// Records a successful probe: State=READY, clears Error, overwrites
    /// media fields, preserves any prior `ResolvedPath` when none is
    /// supplied here.
    pub fn mark_probed(
        &self,
        reference: &str,
        resolved_path: Option<String>,
        info: &StreamInfo,
    ) -> Metadata {
        let mut entry = self.rows.entry(reference.to_string()).or_default();
        if resolved_path.is_some() {
            entry.resolved_path = resolved_path;
        }
        entry.state = State::Ready;
        entry.error.clear();
        entry.container = info.container.clone();
        entry.video_codec = info.video_codec.clone();
        entry.audio_codec = info.audio_codec.clone();
        entry.duration = info.duration.filter(|d| *d > 0);
        entry.width = info.width;
        entry.height = info.height;
        entry.fps = info.fps;
        entry.interlaced = info.interlaced;
        Self::bump(&mut entry);
        let result = entry.clone();
        drop(entry);
        self.update_size_gauge();
        result
    }

    /// Records a probe/resolve failure, preserving `ResolvedPath` and any
    /// previously-known media fields. Defaults the terminal state to
    /// `FAILED`; use `mark_failed` to choose a different terminal state
    /// (e.g. `MISSING`).
    pub fn mark_failure(&self, reference: &str, error: impl Into<String>) -> Metadata {
        self.mark_failed(reference, error, State::Failed)
    }

    pub fn mark_failed(
        &self,
        reference: &str,
        error: impl Into<String>,
        terminal_state: State,
    ) -> Metadata {
        let mut entry = self.rows.entry(reference.to_string()).or_default();
        entry.state = terminal_state;
        entry.error = error.into();
        Self::bump(&mut entry);
        let result = entry.clone();
        drop(entry);
        self.update_size_gauge();
        result
    }

    /// Open-question decision #2 (DESIGN.md): transitions READY -> UNKNOWN,
    /// clears `ArtifactPath` only, and preserves every other media field
    /// and `Error` untouched.
    pub fn demote_on_open_failure(&self, reference: &str) -> Metadata {
        let mut entry = self.rows.entry(reference.to_string()).or_default();
        entry.state = State::Unknown;
        entry.artifact_path = None;
        Self::bump(&mut entry);
        entry.clone()
    }

    /// Marks the final artifact as ready (set by the preparation driver once
    /// a build job succeeds). Not an operation named verbatim in §4.2, but
    /// required for `HasArtifact()` to ever become true — see DESIGN.md.
    pub fn mark_artifact_ready(&self, reference: &str, artifact_path: impl Into<String>) -> Metadata {
        let mut entry = self.rows.entry(reference.to_string()).or_default();
        entry.artifact_path = Some(artifact_path.into());
        entry.state = State::Ready;
        Self::bump(&mut entry);
        entry.clone()
    }

    #[must_use]
    pub fn has_artifact(&self, reference: &str) -> bool {
        self.get(reference).has_artifact()
    }
}
