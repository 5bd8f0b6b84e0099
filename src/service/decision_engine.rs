//! C7: the decision engine — a pure, total function mapping
//! `(MediaTruth, PlaybackCapabilities, ProtocolHint) -> PlaybackPlan` under
//! the fixed matrix in §4.6. No I/O, no side effects: callers own the
//! consequences of the gates it returns.

use crate::error::{Error, Result};
use crate::models::{DecisionReason, MediaTruth, Mode, PlaybackCapabilities, PlaybackPlan, Protocol, TruthState};

/// Client-declared protocol preference, normalized per §4.6 Phase 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolHint {
    Mp4,
    Hls,
}

impl ProtocolHint {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("mp4") => Self::Mp4,
            _ => Self::Hls,
        }
    }
}

const MP4_LIKE_CONTAINERS: [&str; 3] = ["mp4", "mov", "m4v"];

/// Applies the §4.6 gates and decision matrix. `truth.state` must be
/// populated; `Ready` is the only state this function fully decides —
/// `Preparing`/`Failed` short-circuit into the matching error per the gate
/// order.
pub fn decide(truth: &MediaTruth, caps: &PlaybackCapabilities, hint: ProtocolHint) -> Result<PlaybackPlan> {
    match truth.state {
        Some(TruthState::Preparing) => {
            return Err(Error::Preparing {
                state: truth.probe_state.unwrap_or(crate::models::ProbeState::Unknown),
                retry_after_s: truth.retry_after_seconds.unwrap_or(5),
            });
        }
        Some(TruthState::Failed) => {
            return Err(Error::UpstreamTerminal {
                message: "recording's media truth is in a terminal failed state".into(),
                truth: Box::new(truth.clone()),
            });
        }
        Some(TruthState::Ready) => {}
        None => {
            return Err(Error::Internal("media truth has no state".into()));
        }
    }

    if !truth.is_codec_complete() {
        return Err(Error::DecisionAmbiguous(
            "container or codec is empty/unknown".into(),
        ));
    }

    let protocol = match hint {
        ProtocolHint::Mp4 => Protocol::Mp4,
        ProtocolHint::Hls => Protocol::Hls,
    };

    let video_compatible = caps.supports_video_codec(&truth.video_codec);
    let audio_compatible = caps.supports_audio_codec(&truth.audio_codec);

    let container_compatible = match protocol {
        Protocol::Mp4 => {
            is_mp4_like(&truth.container) && caps.supports_container(&truth.container)
        }
        Protocol::Hls => caps.supports_hls && caps.supports_container(&truth.container),
    };

    let (mode, decision_reason, truth_reason) = if !video_compatible {
        (Mode::Transcode, DecisionReason::TranscodeVideo, "codec_video_mismatch")
    } else if !audio_compatible {
        (Mode::Transcode, DecisionReason::TranscodeAudio, "codec_audio_mismatch")
    } else if !container_compatible {
        (Mode::DirectStream, DecisionReason::DirectstreamRemux, "container_mismatch")
    } else if matches!(protocol, Protocol::Mp4) && !is_mp4_like(&truth.container) {
        (Mode::DirectStream, DecisionReason::DirectstreamRemux, "container_mismatch")
    } else {
        (Mode::DirectPlay, DecisionReason::DirectplaySupported, "all_compatible")
    };

    Ok(PlaybackPlan {
        mode,
        protocol,
        container: truth.container.clone(),
        video_codec: truth.video_codec.clone(),
        audio_codec: truth.audio_codec.clone(),
        decision_reason,
        truth_reason: truth_reason.to_string(),
        duration: truth.duration,
    })
}

fn is_mp4_like(container: &str) -> bool {
    MP4_LIKE_CONTAINERS
        .iter()
        .any(|c| c.eq_ignore_ascii_case(container))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeState;

    fn generic_caps() -> PlaybackCapabilities {
        PlaybackCapabilities {
            capabilities_version: 1,
            containers: vec!["mp4".into(), "ts".into()],
            video_codecs: vec!["h264".into()],
            audio_codecs: vec!["aac".into()],
            supports_hls: true,
            device_type: None,
            allow_transcode: Some(true),
            max_video: None,
        }
    }

    fn ready_truth(container: &str, video: &str, audio: &str) -> MediaTruth {
        MediaTruth::ready(container, video, audio, Some(3600), None, None, None, None)
    }

    #[test]
    fn preparing_surfaces_preparing_error() {
        let truth = MediaTruth::preparing(ProbeState::Unknown, 5);
        let err = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap_err();
        assert!(matches!(err, Error::Preparing { retry_after_s: 5, .. }));
    }

    #[test]
    fn failed_surfaces_upstream_error() {
        let truth = MediaTruth {
            state: Some(TruthState::Failed),
            ..Default::default()
        };
        let err = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap_err();
        assert!(matches!(err, Error::UpstreamTerminal { .. }));
    }

    #[test]
    fn unknown_codec_is_decision_ambiguous() {
        let truth = ready_truth("ts", "", "aac");
        let err = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap_err();
        assert!(matches!(err, Error::DecisionAmbiguous(_)));
    }

    #[test]
    fn literal_unknown_token_is_decision_ambiguous() {
        let truth = ready_truth("unknown", "h264", "aac");
        let err = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap_err();
        assert!(matches!(err, Error::DecisionAmbiguous(_)));
    }

    #[test]
    fn incompatible_video_forces_transcode() {
        let truth = ready_truth("ts", "hevc", "aac");
        let plan = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap();
        assert_eq!(plan.mode, Mode::Transcode);
        assert_eq!(plan.decision_reason, DecisionReason::TranscodeVideo);
    }

    #[test]
    fn incompatible_audio_forces_transcode() {
        let truth = ready_truth("ts", "h264", "ac3");
        let plan = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap();
        assert_eq!(plan.mode, Mode::Transcode);
        assert_eq!(plan.decision_reason, DecisionReason::TranscodeAudio);
    }

    #[test]
    fn ts_over_hls_with_ts_capable_client_is_direct_play() {
        let truth = ready_truth("ts", "h264", "aac");
        let plan = decide(&truth, &generic_caps(), ProtocolHint::Hls).unwrap();
        assert_eq!(plan.mode, Mode::DirectPlay);
        assert_eq!(plan.decision_reason, DecisionReason::DirectplaySupported);
    }

    #[test]
    fn mp4_only_client_needs_remux_for_ts_over_hls() {
        let mut caps = generic_caps();
        caps.containers = vec!["mp4".into()];
        let truth = ready_truth("ts", "h264", "aac");
        let plan = decide(&truth, &caps, ProtocolHint::Hls).unwrap();
        assert_eq!(plan.mode, Mode::DirectStream);
        assert_eq!(plan.decision_reason, DecisionReason::DirectstreamRemux);
    }

    #[test]
    fn no_hls_support_is_never_container_compatible_over_hls() {
        let mut caps = generic_caps();
        caps.supports_hls = false;
        let truth = ready_truth("ts", "h264", "aac");
        let plan = decide(&truth, &caps, ProtocolHint::Hls).unwrap();
        assert_eq!(plan.mode, Mode::DirectStream);
    }

    #[test]
    fn mp4_protocol_with_non_mp4_like_container_remuxes() {
        let truth = ready_truth("ts", "h264", "aac");
        let plan = decide(&truth, &generic_caps(), ProtocolHint::Mp4).unwrap();
        assert_eq!(plan.mode, Mode::DirectStream);
        assert_eq!(plan.protocol, Protocol::Mp4);
    }

    #[test]
    fn mp4_protocol_with_mp4_container_is_direct_play() {
        let truth = ready_truth("mp4", "h264", "aac");
        let plan = decide(&truth, &generic_caps(), ProtocolHint::Mp4).unwrap();
        assert_eq!(plan.mode, Mode::DirectPlay);
    }

    #[test]
    fn protocol_hint_defaults_to_hls_on_unrecognized_value() {
        assert_eq!(ProtocolHint::parse(Some("weird")), ProtocolHint::Hls);
        assert_eq!(ProtocolHint::parse(None), ProtocolHint::Hls);
        assert_eq!(ProtocolHint::parse(Some("MP4")), ProtocolHint::Mp4);
    }
}
