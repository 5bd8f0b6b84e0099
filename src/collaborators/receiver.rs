//! Stub seam for the OpenWebIF-style receiver client (§6 "Upstream
//! (consumed)"). The real HTTP client is explicitly out of scope (§1); this
//! trait only exists so `PlaybackCore::list`/`delete` (§10.8) have
//! something to call through.

use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct DirectoryEntry {
    pub name: String,
    pub service_ref: String,
    pub is_directory: bool,
}

#[async_trait]
pub trait ReceiverClient: Send + Sync {
    async fn list_recordings(
        &self,
        root_id: Option<&str>,
        path: Option<&str>,
    ) -> Result<Vec<DirectoryEntry>, anyhow::Error>;

    async fn delete_recording(&self, service_ref: &str) -> Result<bool, anyhow::Error>;
}
