//! The playback-decision/preparation services (C2, C5-C10). Each module is
//! a pure function or a narrow coordinator over the `collaborators` trait
//! seams and the `cache` layer — see `crate::PlaybackCore` for how they're
//! wired together.

pub mod capability_resolver;
pub mod decision_engine;
pub mod duration_resolver;
pub mod preparation_driver;
pub mod source_resolver;
pub mod truth_provider;
pub mod verification;

pub use capability_resolver::{resolve_capabilities, ProfileName};
pub use decision_engine::decide;
pub use duration_resolver::resolve_duration_truth;
pub use preparation_driver::{status_of, PreparationDriver, StreamResult};
pub use source_resolver::{resolve_source, ResolvedSource, SourceKind};
pub use truth_provider::TruthProvider;
pub use verification::{DriftChecker, Mismatch, PathMappingDriftChecker, VerificationWorker};
