//! End-to-end scenario tests exercising the truth provider, decision
//! engine, and source resolver together against fake collaborators.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use xg2g_core::collaborators::{
    InMemoryBuildManager, InMemoryDurationStore, LocalProber, MappingPathResolver, ProbeError,
    RemoteProber, StreamInfo,
};
use xg2g_core::config::{Config, SourcePolicy};
use xg2g_core::models::{PathMapping, PlaybackCapabilities};
use xg2g_core::service::decision_engine::{decide, ProtocolHint};
use xg2g_core::service::TruthProvider;
use xg2g_core::Error;

fn generic_caps() -> PlaybackCapabilities {
    PlaybackCapabilities {
        capabilities_version: 1,
        containers: vec!["ts".into(), "mp4".into()],
        video_codecs: vec!["h264".into()],
        audio_codecs: vec!["aac".into()],
        supports_hls: true,
        device_type: None,
        allow_transcode: Some(true),
        max_video: None,
    }
}

struct FakeLocalProber {
    result: StreamInfo,
}

#[async_trait]
impl LocalProber for FakeLocalProber {
    async fn probe(&self, _local_path: &str) -> Result<StreamInfo, ProbeError> {
        Ok(self.result.clone())
    }
}

struct CountingRemoteProber {
    calls: Arc<AtomicU32>,
    outcome: fn() -> Result<Option<StreamInfo>, ProbeError>,
}

#[async_trait]
impl RemoteProber for CountingRemoteProber {
    async fn probe(&self, _source_url: &str) -> Result<Option<StreamInfo>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }
}

fn base_config(policy: SourcePolicy, path_mappings: Vec<(String, String)>) -> Arc<Config> {
    let mut config = Config::from_defaults();
    config.policy = policy;
    config.path_mappings = path_mappings;
    config.receiver.base_url = "http://receiver.local".to_string();
    config.probe_ttl_secs = 3600;
    Arc::new(config)
}

/// Store-known duration wins over a still-stale cached `Duration=0`, and
/// the capability mismatch on audio forces a transcode decision.
#[tokio::test]
async fn store_known_duration_wins_and_forces_audio_transcode() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("movie.ts"), b"data").unwrap();

    let mapping_pairs = vec![(
        "/media/hdd/movie".to_string(),
        tmp.path().to_string_lossy().into_owned(),
    )];
    let mapping = PathMapping::new(mapping_pairs.clone());
    let config = base_config(SourcePolicy::Any, mapping_pairs);

    let path_resolver = Arc::new(MappingPathResolver::new(mapping.clone()));
    let duration_store = Arc::new(InMemoryDurationStore::default());

    let service_ref = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/movie.ts";
    let resolved = xg2g_core::collaborators::PathResolver::resolve(
        path_resolver.as_ref(),
        "/media/hdd/movie/movie.ts",
    )
    .expect("path mapping should resolve to an existing file");
    duration_store
        .set_duration(&resolved.root_id, &resolved.rel_path, 3600)
        .await
        .unwrap();

    let metadata_cache = Arc::new(xg2g_core::cache::MetadataCache::new());
    metadata_cache.mark_probed(
        service_ref,
        Some(resolved.local_path.clone()),
        &StreamInfo {
            container: "ts".into(),
            video_codec: "h264".into(),
            audio_codec: "ac3".into(),
            duration: None,
            ..Default::default()
        },
    );

    let build_manager = Arc::new(InMemoryBuildManager::default());
    let truth_provider = TruthProvider::new(
        config,
        mapping,
        path_resolver,
        duration_store,
        metadata_cache,
        None,
        None,
        build_manager,
    );

    let truth = truth_provider.get_media_truth(service_ref).await.unwrap();
    assert_eq!(truth.duration, Some(3600));

    let plan = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap();
    assert_eq!(plan.decision_reason, xg2g_core::models::DecisionReason::TranscodeAudio);
}

/// An empty cache triggers an async probe: the first call reports
/// `Preparing` (which the decision engine turns into a retryable error),
/// and once the probe completes the second call reports the healed codec
/// set and duration.
#[tokio::test]
async fn codec_heals_after_async_probe_completes() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("movie.ts"), b"data").unwrap();

    let mapping_pairs = vec![(
        "/media/hdd/movie".to_string(),
        tmp.path().to_string_lossy().into_owned(),
    )];
    let mapping = PathMapping::new(mapping_pairs.clone());
    let config = base_config(SourcePolicy::Any, mapping_pairs);

    let path_resolver = Arc::new(MappingPathResolver::new(mapping.clone()));
    let duration_store = Arc::new(InMemoryDurationStore::default());
    let metadata_cache = Arc::new(xg2g_core::cache::MetadataCache::new());
    let build_manager = Arc::new(InMemoryBuildManager::default());

    let local_prober = Arc::new(FakeLocalProber {
        result: StreamInfo {
            container: "ts".into(),
            video_codec: "h264".into(),
            audio_codec: "mp2".into(),
            duration: Some(3600),
            ..Default::default()
        },
    });

    let service_ref = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/movie.ts";

    let truth_provider = TruthProvider::new(
        config,
        mapping,
        path_resolver,
        duration_store,
        metadata_cache.clone(),
        Some(local_prober),
        None,
        build_manager,
    );

    let first = truth_provider.get_media_truth(service_ref).await.unwrap();
    let first_err = decide(&first, &generic_caps(), ProtocolHint::Hls).unwrap_err();
    assert!(matches!(first_err, Error::Preparing { .. }));

    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if metadata_cache.get(service_ref).state == xg2g_core::models::State::Ready {
            break;
        }
    }

    let second = truth_provider.get_media_truth(service_ref).await.unwrap();
    assert_eq!(second.duration, Some(3600));
    assert_eq!(second.container, "ts");

    let plan = decide(&second, &generic_caps(), ProtocolHint::Hls).unwrap();
    assert_eq!(plan.decision_reason, xg2g_core::models::DecisionReason::TranscodeAudio);
}

/// A remote prober that declines to produce info leaves the ref stuck in
/// `Preparing`/`Unknown` and is only ever invoked once per TTL window.
#[tokio::test]
async fn remote_unsupported_probe_is_throttled_within_ttl() {
    let config = base_config(SourcePolicy::ReceiverOnly, vec![]);
    let path_resolver = Arc::new(MappingPathResolver::new(PathMapping::new(vec![])));
    let duration_store = Arc::new(InMemoryDurationStore::default());
    let metadata_cache = Arc::new(xg2g_core::cache::MetadataCache::new());
    let build_manager = Arc::new(InMemoryBuildManager::default());

    let calls = Arc::new(AtomicU32::new(0));
    let remote_prober = Arc::new(CountingRemoteProber {
        calls: calls.clone(),
        outcome: || Err(ProbeError::RemoteUnsupported),
    });

    let service_ref = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/movie.ts";

    let truth_provider = TruthProvider::new(
        config,
        PathMapping::new(vec![]),
        path_resolver,
        duration_store,
        metadata_cache.clone(),
        None,
        Some(remote_prober),
        build_manager,
    );

    let first = truth_provider.get_media_truth(service_ref).await.unwrap();
    assert_eq!(first.state, Some(xg2g_core::models::TruthState::Preparing));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = truth_provider.get_media_truth(service_ref).await.unwrap();
    assert_eq!(second.state, Some(xg2g_core::models::TruthState::Preparing));
    assert_eq!(metadata_cache.get(service_ref).state, xg2g_core::models::State::Unknown);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// A hard remote probe failure persists as `Failed`; any subsequent call
/// against the cached entry returns a terminal error that still carries
/// the previously-known media fields.
#[tokio::test]
async fn terminal_failure_is_sticky_and_carries_known_fields() {
    let config = base_config(SourcePolicy::ReceiverOnly, vec![]);
    let path_resolver = Arc::new(MappingPathResolver::new(PathMapping::new(vec![])));
    let duration_store = Arc::new(InMemoryDurationStore::default());
    let metadata_cache = Arc::new(xg2g_core::cache::MetadataCache::new());
    let build_manager = Arc::new(InMemoryBuildManager::default());

    let service_ref = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/movie.ts";

    // Simulate a previously-successful probe, then a later hard failure
    // that must preserve the codec/duration fields it already knew.
    metadata_cache.mark_probed(
        service_ref,
        None,
        &StreamInfo {
            container: "ts".into(),
            video_codec: "h264".into(),
            audio_codec: "aac".into(),
            duration: Some(1800),
            ..Default::default()
        },
    );
    metadata_cache.mark_failure(service_ref, "remote_probe_error: connection refused");

    let remote_prober = Arc::new(CountingRemoteProber {
        calls: Arc::new(AtomicU32::new(0)),
        outcome: || Err(ProbeError::Transport("connection refused".into())),
    });

    let truth_provider = TruthProvider::new(
        config,
        PathMapping::new(vec![]),
        path_resolver,
        duration_store,
        metadata_cache,
        None,
        Some(remote_prober),
        build_manager,
    );

    let err = truth_provider.get_media_truth(service_ref).await.unwrap_err();
    match err {
        Error::UpstreamTerminal { truth, .. } => {
            assert_eq!(truth.state, Some(xg2g_core::models::TruthState::Failed));
            assert_eq!(truth.container, "ts");
            assert_eq!(truth.video_codec, "h264");
            assert_eq!(truth.audio_codec, "aac");
            assert_eq!(truth.duration, Some(1800));
        }
        other => panic!("expected UpstreamTerminal, got {other:?}"),
    }
}

/// A reference containing a space, resolved under `receiver_only` policy,
/// produces a URL with the space encoded exactly once and the service-ref
/// colons left untouched.
#[tokio::test]
async fn receiver_only_url_encodes_space_once_and_preserves_colons() {
    let config = base_config(SourcePolicy::ReceiverOnly, vec![]);
    let mapping = PathMapping::new(vec![]);

    let source = xg2g_core::service::resolve_source(
        "1:0:1:1:1:1:1:0:0:0:/media/hdd/movie/My Recording.ts",
        &config,
        &mapping,
    )
    .unwrap();

    assert!(source
        .source_url
        .contains("/1:0:1:1:1:1:1:0:0:0:/media/hdd/movie/My%20Recording.ts"));
    assert!(!source.source_url.contains("%3A"));
    assert!(!source.source_url.contains("%2520"));
}
