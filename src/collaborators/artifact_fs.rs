//! Artifact-filesystem seam: "open + stat" the final deliverable (§4.8-B).
//! Kept narrow and swappable so the preparation driver's readiness gate is
//! testable without a real filesystem.

use async_trait::async_trait;

#[async_trait]
pub trait ArtifactFs: Send + Sync {
    /// Succeeds only if the path exists, is readable, and is non-empty
    /// (a truncated artifact must fail closed per §4.8-B/§7).
    async fn open_and_stat(&self, path: &str) -> std::io::Result<()>;
}

#[derive(Default)]
pub struct TokioArtifactFs;

#[async_trait]
impl ArtifactFs for TokioArtifactFs {
    async fn open_and_stat(&self, path: &str) -> std::io::Result<()> {
        let meta = tokio::fs::metadata(path).await?;
        if meta.len() == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "artifact file is empty",
            ));
        }
        Ok(())
    }
}

/// In-process fake for tests: a set of paths considered present/non-empty.
#[derive(Default)]
pub struct FakeArtifactFs {
    present: dashmap::DashSet<String>,
}

impl FakeArtifactFs {
    pub fn mark_present(&self, path: impl Into<String>) {
        self.present.insert(path.into());
    }
}

#[async_trait]
impl ArtifactFs for FakeArtifactFs {
    async fn open_and_stat(&self, path: &str) -> std::io::Result<()> {
        if self.present.contains(path) {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "artifact not present",
            ))
        }
    }
}
