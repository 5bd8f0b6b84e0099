//! Per-cache-directory build job state (§3, §4.8-C).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Building,
    Finalizing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub state: Option<JobState>,
    pub reason: String,
}

impl Job {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, Some(JobState::Building | JobState::Finalizing))
    }
}

/// Wire-facing overall status reported by `GetStatus` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Idle,
    Running,
    Ready,
    Failed,
    Preparing,
    Repair,
    Unknown,
}
