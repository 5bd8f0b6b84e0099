//! C5: the duration-truth resolver — a pure, total priority function
//! (§4.4). No I/O: every candidate duration is handed in by the caller
//! (the truth provider, or a test).

use crate::models::duration_truth::MAX_DURATION_MS;
use crate::models::{Confidence, DurationTruth, ReasonCode};
use crate::models::DurationSource as Source;

/// Which concrete collaborator supplied the "secondary" candidate — decides
/// whether a hit is tagged `from_ffprobe` or `from_container`, and (on a
/// miss) whether the miss reason is `probe_failed` or `container_missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryKind {
    Ffprobe,
    Container,
}

/// Every candidate the resolver considers, in priority order (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationCandidates {
    pub primary_duration_seconds: Option<i64>,
    pub secondary_duration_seconds: Option<i64>,
    pub secondary_kind: Option<SecondaryKind>,
    /// Only meaningful when `secondary_duration_seconds` is `None`: did the
    /// secondary probe actively fail (-> `probe_failed`) versus simply have
    /// nothing to report (-> `container_missing`)?
    pub secondary_failed: bool,
    pub heuristic_duration_seconds: Option<i64>,
    /// An optional resume-position hint (seconds) to validate against the
    /// resolved duration; out-of-range values are clamped and flagged
    /// `resume_clamped` rather than rejected outright.
    pub resume_position_seconds: Option<i64>,
}

struct Normalized {
    ms: i64,
    clamped: bool,
}

/// Rejects non-positive seconds; clamps above the 30-day ceiling, flagging
/// the clamp.
fn normalize(seconds: i64) -> Option<Normalized> {
    if seconds <= 0 {
        return None;
    }
    let ms = seconds.saturating_mul(1000);
    if ms > MAX_DURATION_MS {
        Some(Normalized {
            ms: MAX_DURATION_MS,
            clamped: true,
        })
    } else {
        Some(Normalized { ms, clamped: false })
    }
}

/// Resolves `DurationTruth` from the candidates per the fixed priority:
/// primary -> secondary -> heuristic -> unknown (§4.4, §8.6).
#[must_use]
pub fn resolve_duration_truth(candidates: &DurationCandidates) -> DurationTruth {
    let mut reasons = Vec::new();

    let (duration_ms, source, confidence) =
        if let Some(primary) = candidates.primary_duration_seconds.and_then(normalize) {
            reasons.push(ReasonCode::FromSourceMetadata);
            if primary.clamped {
                reasons.push(ReasonCode::InconsistentClamped);
            }
            (Some(primary.ms), Source::Metadata, Confidence::High)
        } else {
            reasons.push(ReasonCode::PrimaryMissing);

            if let Some(secondary) = candidates.secondary_duration_seconds.and_then(normalize) {
                let (from_reason, source) = match candidates.secondary_kind {
                    Some(SecondaryKind::Container) => {
                        (ReasonCode::FromContainer, Source::Container)
                    }
                    _ => (ReasonCode::FromFfprobe, Source::Ffprobe),
                };
                reasons.push(from_reason);
                if secondary.clamped {
                    reasons.push(ReasonCode::InconsistentClamped);
                }
                (Some(secondary.ms), source, Confidence::Medium)
            } else {
                reasons.push(if candidates.secondary_failed {
                    ReasonCode::ProbeFailed
                } else {
                    ReasonCode::ContainerMissing
                });

                if let Some(heuristic) =
                    candidates.heuristic_duration_seconds.and_then(normalize)
                {
                    reasons.push(ReasonCode::FromHeuristic);
                    if heuristic.clamped {
                        reasons.push(ReasonCode::InconsistentClamped);
                    }
                    (Some(heuristic.ms), Source::Heuristic, Confidence::Low)
                } else {
                    reasons.push(ReasonCode::UnknownDeniedSeek);
                    (None, Source::Unknown, Confidence::Low)
                }
            }
        };

    if let (Some(total_ms), Some(resume_s)) = (duration_ms, candidates.resume_position_seconds) {
        let resume_ms = resume_s.saturating_mul(1000);
        if resume_s < 0 || resume_ms > total_ms {
            reasons.push(ReasonCode::ResumeClamped);
        }
    }

    let mut truth = DurationTruth {
        duration_ms,
        source,
        confidence,
        reasons,
    };
    truth.normalize_reasons();
    truth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_wins_when_present() {
        let candidates = DurationCandidates {
            primary_duration_seconds: Some(3600),
            ..Default::default()
        };
        let truth = resolve_duration_truth(&candidates);
        assert_eq!(truth.source, Source::Metadata);
        assert_eq!(truth.confidence, Confidence::High);
        assert_eq!(truth.duration_ms, Some(3_600_000));
    }

    #[test]
    fn clamp_above_thirty_days_flags_reason() {
        let candidates = DurationCandidates {
            primary_duration_seconds: Some(i64::MAX / 1000 + 1),
            ..Default::default()
        };
        let truth = resolve_duration_truth(&candidates);
        assert_eq!(truth.duration_ms, Some(MAX_DURATION_MS));
        assert!(truth.reasons.contains(&ReasonCode::InconsistentClamped));
    }

    #[test]
    fn falls_back_to_secondary_ffprobe() {
        let candidates = DurationCandidates {
            secondary_duration_seconds: Some(1800),
            secondary_kind: Some(SecondaryKind::Ffprobe),
            ..Default::default()
        };
        let truth = resolve_duration_truth(&candidates);
        assert_eq!(truth.source, Source::Ffprobe);
        assert_eq!(truth.confidence, Confidence::Medium);
        assert!(truth.reasons.contains(&ReasonCode::PrimaryMissing));
        assert!(truth.reasons.contains(&ReasonCode::FromFfprobe));
    }

    #[test]
    fn falls_back_to_heuristic_when_secondary_failed() {
        let candidates = DurationCandidates {
            secondary_failed: true,
            heuristic_duration_seconds: Some(900),
            ..Default::default()
        };
        let truth = resolve_duration_truth(&candidates);
        assert_eq!(truth.source, Source::Heuristic);
        assert!(truth.reasons.contains(&ReasonCode::ProbeFailed));
        assert!(truth.reasons.contains(&ReasonCode::FromHeuristic));
    }

    #[test]
    fn container_missing_when_secondary_absent_without_failure() {
        let candidates = DurationCandidates::default();
        let truth = resolve_duration_truth(&candidates);
        assert!(truth.reasons.contains(&ReasonCode::ContainerMissing));
        assert_eq!(truth.source, Source::Unknown);
        assert!(truth.duration_ms.is_none());
        assert!(truth.reasons.contains(&ReasonCode::UnknownDeniedSeek));
    }

    #[test]
    fn all_missing_yields_unknown() {
        let truth = resolve_duration_truth(&DurationCandidates::default());
        assert_eq!(truth.source, Source::Unknown);
        assert!(truth.duration_ms.is_none());
        assert_eq!(
            truth.reasons,
            vec![
                ReasonCode::UnknownDeniedSeek,
                ReasonCode::ContainerMissing,
                ReasonCode::PrimaryMissing,
            ]
        );
    }

    #[test]
    fn primary_reason_picks_smallest_rank() {
        let candidates = DurationCandidates {
            primary_duration_seconds: Some(i64::MAX / 1000 + 1),
            ..Default::default()
        };
        let truth = resolve_duration_truth(&candidates);
        assert_eq!(truth.primary_reason(), Some(ReasonCode::InconsistentClamped));
    }
}
