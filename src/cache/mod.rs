pub mod metadata_cache;
pub mod probe_throttle;
pub mod singleflight;

pub use metadata_cache::MetadataCache;
pub use probe_throttle::ProbeThrottle;
pub use singleflight::{ProbeSingleFlight, SingleFlight, SingleFlightError};

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// A process-wide monotonic nanosecond clock (§3 "UpdatedAt is a monotonic
/// nanosecond timestamp"). Never wraps wall-clock time, so it is immune to
/// NTP adjustments — callers only ever compare values from this function
/// against each other.
#[must_use]
pub fn monotonic_now_nanos() -> u64 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    Instant::now().saturating_duration_since(epoch).as_nanos() as u64
}
