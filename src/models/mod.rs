pub mod capabilities;
pub mod duration_truth;
pub mod job;
pub mod media_truth;
pub mod metadata;
pub mod plan;
pub mod reference;

pub use capabilities::{DeviceType, MaxVideo, PlaybackCapabilities};
pub use duration_truth::{Confidence, DurationTruth, ReasonCode, Source as DurationSource, MAX_DURATION_MS};
pub use job::{Job, JobState, Status};
pub use media_truth::{MediaTruth, ProbeBlockedReason, ProbeState, TruthState};
pub use metadata::{Metadata, State};
pub use plan::{DecisionReason, Mode, PlaybackPlan, Protocol};
pub use reference::{
    decode_recording_id, encode_recording_id, escape_service_ref_path, extract_receiver_path,
    is_allowed_video_segment, sanitize_recording_rel_path, validate_live_ref,
    validate_recording_ref, PathMapping,
};
