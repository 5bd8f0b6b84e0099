//! Per-fingerprint probe TTL throttle (§4.5 step 9, §5 "singleflight + TTL
//! throttle"). A singleflight alone only dedupes *concurrent* probes; this
//! throttle additionally prevents a new probe from starting for a
//! fingerprint that was attempted within the last `probe_ttl`, even once the
//! prior attempt has completed — so a flaky/slow upstream doesn't get
//! hammered by a steady stream of polling clients.

use std::time::Duration;

use moka::sync::Cache;

/// Write-through TTL set keyed by fingerprint: presence means "a probe was
/// started for this key within the configured window".
pub struct ProbeThrottle {
    seen: Cache<String, ()>,
}

impl ProbeThrottle {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            seen: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Records an attempt for `key`. Returns `true` if this call is the one
    /// that should proceed (the key was not already throttled), `false` if
    /// a prior attempt is still within its TTL window and the caller must
    /// not re-enter the probe.
    #[must_use]
    pub fn try_enter(&self, key: &str) -> bool {
        if self.seen.get(&key.to_string()).is_some() {
            return false;
        }
        self.seen.insert(key.to_string(), ());
        true
    }
}

impl Default for ProbeThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
