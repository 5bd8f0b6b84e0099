//! Singleflight for probe-stampede protection (§4.5 step 9, §8 invariant 1).
//!
//! Wraps the `async_singleflight` crate so that, for a given fingerprint key,
//! only one probe task is ever in flight — concurrent callers against the
//! same ref/source-URL pair observe at most one underlying probe execution.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SingleFlightError<E> {
    #[error("singleflight worker failed - leader dropped or panicked")]
    WorkerFailed,
    #[error("{0}")]
    Inner(E),
}

/// Deduplicates concurrent executions keyed by `K`.
#[derive(Clone)]
pub struct SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    group: Arc<async_singleflight::Group<K, V, E>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            group: Arc::new(async_singleflight::Group::new()),
        }
    }

    /// Runs `f` only once per `key` among concurrent callers; the rest wait
    /// for the leader's result.
    pub async fn do_work<Fut>(&self, key: K, f: Fut) -> Result<V, SingleFlightError<E>>
    where
        Fut: std::future::Future<Output = Result<V, E>> + Send,
    {
        self.group
            .work(&key, f)
            .await
            .map_err(|opt_err| match opt_err {
                Some(inner) => SingleFlightError::Inner(inner),
                None => SingleFlightError::WorkerFailed,
            })
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The specific instantiation the truth provider needs: keyed by the hashed
/// `(kind, source_url)` fingerprint (§4.5 step 9), racing detached probe
/// tasks that report back `()` on success.
pub type ProbeSingleFlight = SingleFlight<String, (), String>;
