//! HLS build-manager seam (§4.1, §4.8-A, §6). The actual ffmpeg invocation
//! is explicitly out of scope (§1); this trait is the boundary the
//! preparation driver calls through.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Job, JobState};

#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("build manager rejected spec: {0}")]
    Rejected(String),
    #[error("build manager unavailable: {0}")]
    Unavailable(String),
}

/// Inputs to an idempotent HLS build request (§4.8-A).
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub work_dir: String,
    pub recording_ref: String,
    pub source_url: String,
    pub cache_dir: String,
    pub playlist_name: String,
    pub final_path: String,
    pub profile: String,
}

#[async_trait]
pub trait BuildManager: Send + Sync {
    /// Idempotent: repeated calls with identical inputs must not start a
    /// duplicate build.
    async fn ensure_spec(&self, spec: &BuildSpec) -> Result<(), BuildError>;

    /// Current job state for a cache directory, if any job has ever been
    /// started for it (§4.8-C).
    async fn job_state(&self, cache_dir: &str) -> Option<Job>;
}

/// In-process `BuildManager` for tests: records `ensure_spec` calls and
/// lets the test drive job-state transitions directly.
#[derive(Default)]
pub struct InMemoryBuildManager {
    jobs: dashmap::DashMap<String, Job>,
    ensure_calls: dashmap::DashMap<String, u32>,
}

impl InMemoryBuildManager {
    #[must_use]
    pub fn ensure_call_count(&self, cache_dir: &str) -> u32 {
        self.ensure_calls.get(cache_dir).map_or(0, |v| *v)
    }

    pub fn set_job(&self, cache_dir: &str, state: JobState, reason: impl Into<String>) {
        self.jobs.insert(
            cache_dir.to_string(),
            Job {
                state: Some(state),
                reason: reason.into(),
            },
        );
    }
}

#[async_trait]
impl BuildManager for InMemoryBuildManager {
    async fn ensure_spec(&self, spec: &BuildSpec) -> Result<(), BuildError> {
        *self
            .ensure_calls
            .entry(spec.cache_dir.clone())
            .or_insert(0) += 1;
        self.jobs
            .entry(spec.cache_dir.clone())
            .or_insert_with(|| Job {
                state: Some(JobState::Building),
                reason: String::new(),
            });
        Ok(())
    }

    async fn job_state(&self, cache_dir: &str) -> Option<Job> {
        self.jobs.get(cache_dir).map(|j| j.clone())
    }
}
