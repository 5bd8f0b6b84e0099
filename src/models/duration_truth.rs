//! C5 data types: `DurationTruth`, its reason-code vocabulary with a fixed
//! priority table, `Source`, and `Confidence` (§3, §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    UnknownDeniedSeek,
    InconsistentClamped,
    ProbeFailed,
    ContainerMissing,
    PrimaryMissing,
    FromHeuristic,
    FromContainer,
    FromFfprobe,
    FromSourceMetadata,
    ResumeClamped,
}

impl ReasonCode {
    /// Fixed priority rank from the §4.4 table; lower sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::UnknownDeniedSeek => 0,
            Self::InconsistentClamped => 1,
            Self::ProbeFailed => 2,
            Self::ContainerMissing => 3,
            Self::PrimaryMissing => 4,
            Self::FromHeuristic => 5,
            Self::FromContainer => 6,
            Self::FromFfprobe => 7,
            Self::FromSourceMetadata => 8,
            Self::ResumeClamped => 9,
        }
    }

    /// Lexicographic tiebreaker key — the wire/serde token.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::UnknownDeniedSeek => "unknown_denied_seek",
            Self::InconsistentClamped => "inconsistent_clamped",
            Self::ProbeFailed => "probe_failed",
            Self::ContainerMissing => "container_missing",
            Self::PrimaryMissing => "primary_missing",
            Self::FromHeuristic => "from_heuristic",
            Self::FromContainer => "from_container",
            Self::FromFfprobe => "from_ffprobe",
            Self::FromSourceMetadata => "from_source_metadata",
            Self::ResumeClamped => "resume_clamped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Metadata,
    Ffprobe,
    Container,
    Heuristic,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationTruth {
    pub duration_ms: Option<i64>,
    pub source: Source,
    pub confidence: Confidence,
    /// Deduplicated, sorted by `ReasonCode::rank` then token (§4.4, §8.7).
    pub reasons: Vec<ReasonCode>,
}

impl DurationTruth {
    /// Deduplicates and sorts `reasons` in place; idempotent (§8.7).
    pub fn normalize_reasons(&mut self) {
        self.reasons.sort_by_key(|r| (r.rank(), r.token()));
        self.reasons.dedup();
    }

    /// The reason with the smallest rank, ties broken lexicographically by
    /// token (§4.4's `DurationReasonPrimaryFrom`).
    #[must_use]
    pub fn primary_reason(&self) -> Option<ReasonCode> {
        self.reasons
            .iter()
            .copied()
            .min_by_key(|r| (r.rank(), r.token()))
    }
}

/// The upper clamp bound: 30 days in milliseconds (§4.4).
pub const MAX_DURATION_MS: i64 = 30 * 24 * 3600 * 1000;
