//! C4: optional per-library duration persistence (§4.3). Errors are
//! non-fatal to callers — the truth provider treats a store failure the
//! same as a miss.

use async_trait::async_trait;

#[async_trait]
pub trait DurationStore: Send + Sync {
    /// `Ok((seconds, true))` only when a stored value `> 0` exists.
    async fn get_duration(
        &self,
        root_id: &str,
        rel_path: &str,
    ) -> Result<(i64, bool), anyhow::Error>;

    /// Never overwrites an existing nonzero stored duration.
    async fn set_duration(
        &self,
        root_id: &str,
        rel_path: &str,
        seconds: i64,
    ) -> Result<(), anyhow::Error>;
}

/// In-process `DurationStore` for tests and single-node deployments that
/// don't wire up a real library database.
#[derive(Default)]
pub struct InMemoryDurationStore {
    inner: dashmap::DashMap<(String, String), i64>,
}

#[async_trait]
impl DurationStore for InMemoryDurationStore {
    async fn get_duration(
        &self,
        root_id: &str,
        rel_path: &str,
    ) -> Result<(i64, bool), anyhow::Error> {
        match self.inner.get(&(root_id.to_string(), rel_path.to_string())) {
            Some(v) if *v > 0 => Ok((*v, true)),
            _ => Ok((0, false)),
        }
    }

    async fn set_duration(
        &self,
        root_id: &str,
        rel_path: &str,
        seconds: i64,
    ) -> Result<(), anyhow::Error> {
        if seconds <= 0 {
            return Ok(());
        }
        self.inner
            .entry((root_id.to_string(), rel_path.to_string()))
            .or_insert(seconds);
        Ok(())
    }
}
