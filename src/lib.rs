//! xg2g-core: the playback decision & preparation core of the xg2g media
//! gateway (see `SPEC_FULL.md`). A library crate with no network listener —
//! the HTTP layer, OpenWebIF client, XMLTV exporter, HDHomeRun emulation,
//! and WebUI are out of scope and modeled only as the trait seams in
//! `collaborators`.

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod service;

pub use config::Config;
pub use error::{Error, Result};

use std::sync::Arc;

use cache::MetadataCache;
use collaborators::{
    ArtifactFs, BuildManager, DirectoryEntry, DurationStore, LocalProber, PathResolver,
    ReceiverClient, RemoteProber,
};
use models::{MediaTruth, PathMapping, PlaybackCapabilities, PlaybackPlan, Status};
use service::preparation_driver::{recording_cache_dir, status_of, StreamResult};
use service::source_resolver::{resolve_source, ResolvedSource};
use service::{capability_resolver, decision_engine, PreparationDriver, TruthProvider};

/// Output of `PlaybackCore::resolve` (§6 "Resolve").
#[derive(Debug, Clone)]
pub struct PlaybackInfoResult {
    pub plan: PlaybackPlan,
    pub source: ResolvedSourceInfo,
}

#[derive(Debug, Clone)]
pub struct ResolvedSourceInfo {
    pub source_url: String,
    pub display_name: String,
    pub is_local: bool,
}

/// `List` result shape (§10.8 — a thin pass-through; directory walking and
/// OpenWebIF listing live in the out-of-scope receiver client).
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub roots: Vec<String>,
    pub current_root: Option<String>,
    pub current_path: Option<String>,
    pub recordings: Vec<DirectoryEntry>,
    pub directories: Vec<DirectoryEntry>,
    pub breadcrumbs: Vec<String>,
}

/// Wires C1-C9 together behind the downstream interfaces named in §6. The
/// HTTP/WebUI layer that would sit on top of this is out of scope.
pub struct PlaybackCore {
    config: Arc<Config>,
    path_mapping: PathMapping,
    metadata_cache: Arc<MetadataCache>,
    truth_provider: Arc<TruthProvider>,
    preparation_driver: Arc<PreparationDriver>,
    build_manager: Arc<dyn BuildManager>,
    receiver_client: Option<Arc<dyn ReceiverClient>>,
}

impl PlaybackCore {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        path_resolver: Arc<dyn PathResolver>,
        duration_store: Arc<dyn DurationStore>,
        local_prober: Option<Arc<dyn LocalProber>>,
        remote_prober: Option<Arc<dyn RemoteProber>>,
        build_manager: Arc<dyn BuildManager>,
        artifact_fs: Arc<dyn ArtifactFs>,
        receiver_client: Option<Arc<dyn ReceiverClient>>,
    ) -> Self {
        let path_mapping = PathMapping::new(config.path_mappings.clone());
        let metadata_cache = Arc::new(MetadataCache::new());

        let truth_provider = Arc::new(TruthProvider::new(
            config.clone(),
            path_mapping.clone(),
            path_resolver,
            duration_store,
            metadata_cache.clone(),
            local_prober,
            remote_prober,
            build_manager.clone(),
        ));

        let preparation_driver = Arc::new(PreparationDriver::new(
            config.clone(),
            metadata_cache.clone(),
            truth_provider.clone(),
            build_manager.clone(),
            artifact_fs,
        ));

        Self {
            config,
            path_mapping,
            metadata_cache,
            truth_provider,
            preparation_driver,
            build_manager,
            receiver_client,
        }
    }

    /// `Resolve(ctx, ref, intent, profile) -> PlaybackInfoResult` (§6): the
    /// full request-time pipeline — resolve source, read truth, resolve
    /// capabilities, decide, and (for transcode/HLS) ensure preparation has
    /// started.
    pub async fn resolve(
        &self,
        reference: &str,
        protocol_hint: Option<&str>,
        profile_name: &str,
        client_caps: Option<PlaybackCapabilities>,
    ) -> Result<PlaybackInfoResult> {
        models::validate_recording_ref(reference)?;

        let source = resolve_source(reference, &self.config, &self.path_mapping)?;
        let truth = self.truth_provider.get_media_truth(reference).await?;
        let caps = capability_resolver::resolve_capabilities(profile_name, client_caps, None);
        let hint = decision_engine::ProtocolHint::parse(protocol_hint);
        let plan = decision_engine::decide(&truth, &caps, hint)?;

        self.preparation_driver
            .ensure_prepared(reference, &source, &plan)
            .await?;

        Ok(PlaybackInfoResult {
            plan,
            source: ResolvedSourceInfo {
                source_url: source.source_url,
                display_name: source.display_name,
                is_local: source.kind == service::source_resolver::SourceKind::Local,
            },
        })
    }

    /// `GetMediaTruth(ctx, ref) -> MediaTruth | error` (§6).
    pub async fn get_media_truth(&self, reference: &str) -> Result<MediaTruth> {
        self.truth_provider.get_media_truth(reference).await
    }

    /// `Stream(ctx, ref) -> StreamResult` (§6, §4.8-B).
    pub async fn stream(&self, reference: &str) -> Result<StreamResult> {
        self.preparation_driver.stream(reference).await
    }

    /// `GetStatus(ctx, ref) -> {State, Error?}` (§6, §4.8-C).
    pub async fn get_status(&self, reference: &str) -> (Status, Option<String>) {
        let cache_dir = recording_cache_dir(&self.config.hls_root, reference);
        let job = self
            .build_manager
            .job_state(&cache_dir.to_string_lossy())
            .await;
        let meta = self.metadata_cache.get(reference);
        status_of(job.as_ref(), &meta)
    }

    /// `List(ctx, rootID?, path?, principal?) -> Listing` (§6, §10.8). Only
    /// implemented up to calling through the `ReceiverClient` stub seam;
    /// directory-tree assembly belongs to the out-of-scope HTTP/WebUI layer.
    pub async fn list(&self, root_id: Option<&str>, path: Option<&str>) -> Result<Listing> {
        let Some(client) = &self.receiver_client else {
            return Err(Error::Internal("no receiver client configured".into()));
        };
        let entries = client
            .list_recordings(root_id, path)
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        let (directories, recordings) = entries.into_iter().partition(|e| e.is_directory);
        Ok(Listing {
            roots: root_id.map(str::to_string).into_iter().collect(),
            current_root: root_id.map(str::to_string),
            current_path: path.map(str::to_string),
            recordings,
            directories,
            breadcrumbs: path
                .map(|p| p.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    /// `Delete(ctx, ref) -> {deleted}` (§6).
    pub async fn delete(&self, reference: &str) -> Result<bool> {
        models::validate_recording_ref(reference)?;
        let Some(client) = &self.receiver_client else {
            return Err(Error::Internal("no receiver client configured".into()));
        };
        client
            .delete_recording(reference)
            .await
            .map_err(|e| Error::Upstream(e.to_string()))
    }

    #[must_use]
    pub fn metadata_cache(&self) -> &Arc<MetadataCache> {
        &self.metadata_cache
    }
}
