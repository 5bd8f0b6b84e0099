//! C10: the verification worker — a periodic configuration/runtime drift
//! checker with change-only persistence, a heartbeat floor, edge-triggered
//! logging, and per-kind gauges (§4.10).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cache::monotonic_now_nanos;
use crate::config::VerificationConfig;
use crate::models::PathMapping;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mismatch {
    pub kind: String,
    pub key: String,
    pub expected: String,
    pub actual: String,
}

/// A registered drift checker (§4.10 "registered checkers").
#[async_trait]
pub trait DriftChecker: Send + Sync {
    fn kind(&self) -> &'static str;
    async fn check(&self) -> Vec<Mismatch>;
}

/// Re-validates that every configured path mapping still resolves, flagging
/// any `(receiver_root, local_root)` pair whose local side has disappeared
/// since startup (§10.8 — the spec names the checker mechanism, not a
/// concrete checker, so this one is the example instance).
pub struct PathMappingDriftChecker {
    mapping: PathMapping,
    probe_paths: Vec<(String, String)>,
}

impl PathMappingDriftChecker {
    #[must_use]
    pub fn new(mapping: PathMapping, probe_paths: Vec<(String, String)>) -> Self {
        Self { mapping, probe_paths }
    }
}

#[async_trait]
impl DriftChecker for PathMappingDriftChecker {
    fn kind(&self) -> &'static str {
        "path_mapping"
    }

    async fn check(&self) -> Vec<Mismatch> {
        self.probe_paths
            .iter()
            .filter_map(|(receiver_path, expected_local_root)| {
                let resolved = self.mapping.resolve_local_existing(receiver_path);
                let actual = resolved
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "<unresolved>".to_string());
                if actual == "<unresolved>" {
                    Some(Mismatch {
                        kind: "path_mapping".to_string(),
                        key: receiver_path.clone(),
                        expected: expected_local_root.clone(),
                        actual,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[derive(Default)]
struct PersistedState {
    hash: Option<u64>,
    last_check_nanos: u64,
    mismatches: Vec<Mismatch>,
}

pub struct VerificationWorker {
    checkers: Vec<Arc<dyn DriftChecker>>,
    cadence: Duration,
    heartbeat_multiplier: u64,
    busy: AtomicBool,
    state: Mutex<PersistedState>,
}

impl VerificationWorker {
    #[must_use]
    pub fn new(checkers: Vec<Arc<dyn DriftChecker>>, config: &VerificationConfig) -> Self {
        Self {
            checkers,
            cadence: Duration::from_secs(config.cadence_secs),
            heartbeat_multiplier: config.heartbeat_multiplier,
            busy: AtomicBool::new(false),
            state: Mutex::new(PersistedState::default()),
        }
    }

    /// Current persisted mismatch set (test/inspection hook).
    #[must_use]
    pub fn current_mismatches(&self) -> Vec<Mismatch> {
        self.state.lock().mismatches.clone()
    }

    /// Runs every registered checker once, under a 30s bound, and persists
    /// the combined result per the change-only/heartbeat rule. Returns
    /// `false` without doing any work if a prior tick is still running.
    pub async fn tick(&self) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("verification tick skipped: previous run still busy");
            return false;
        }

        self.run_checkers().await;
        self.busy.store(false, Ordering::SeqCst);
        true
    }

    async fn run_checkers(&self) {
        let checks = self.checkers.iter().map(|c| {
            let checker = c.clone();
            async move { (checker.kind(), checker.check().await) }
        });

        let results = tokio::time::timeout(Duration::from_secs(30), futures::future::join_all(checks)).await;

        let per_kind: Vec<(&'static str, Vec<Mismatch>)> = match results {
            Ok(r) => r,
            Err(_) => {
                tracing::warn!("verification run exceeded its 30s bound; skipping this tick");
                return;
            }
        };

        let mut all_mismatches: Vec<Mismatch> = per_kind.iter().flat_map(|(_, m)| m.clone()).collect();
        normalize(&mut all_mismatches);

        let hash = content_hash(&all_mismatches);
        let now = monotonic_now_nanos();

        let (should_persist, previous) = {
            let state = self.state.lock();
            let heartbeat_due =
                now.saturating_sub(state.last_check_nanos) > self.cadence.as_nanos() as u64 * self.heartbeat_multiplier;
            (
                state.hash != Some(hash) || heartbeat_due,
                state.mismatches.clone(),
            )
        };

        if should_persist {
            let is_heartbeat_only = {
                let state = self.state.lock();
                state.hash == Some(hash)
            };
            {
                let mut state = self.state.lock();
                state.hash = Some(hash);
                state.last_check_nanos = now;
                state.mismatches = all_mismatches.clone();
            }
            if is_heartbeat_only {
                crate::metrics::VERIFICATION_HEARTBEAT_TOTAL.inc();
            }
            log_edge_transitions(&previous, &all_mismatches);
        }

        for kind in self.checkers.iter().map(|c| c.kind()) {
            let present = all_mismatches.iter().any(|m| m.kind == kind);
            crate::metrics::VERIFICATION_DRIFT
                .with_label_values(&[kind])
                .set(i64::from(present));
        }
    }
}

/// Deterministic sort: kind, key, expected, actual (§4.10).
fn normalize(mismatches: &mut Vec<Mismatch>) {
    mismatches.sort();
    mismatches.dedup();
}

fn content_hash(mismatches: &[Mismatch]) -> u64 {
    let mut hasher = DefaultHasher::new();
    mismatches.hash(&mut hasher);
    hasher.finish()
}

fn log_edge_transitions(previous: &[Mismatch], current: &[Mismatch]) {
    for m in current {
        if !previous.contains(m) {
            tracing::info!(kind = %m.kind, key = %m.key, expected = %m.expected, actual = %m.actual, "drift introduced");
        }
    }
    for m in previous {
        if !current.contains(m) {
            tracing::info!(kind = %m.kind, key = %m.key, "drift resolved");
        }
    }
}
