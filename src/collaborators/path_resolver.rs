//! Local path resolution seam backing §4.5 step 3.

/// Resolved local filesystem location for a receiver-side path, plus the
/// library-root identity needed to key the duration store (§4.3).
#[derive(Debug, Clone)]
pub struct ResolvedLocalPath {
    pub local_path: String,
    pub root_id: String,
    pub rel_path: String,
}

pub trait PathResolver: Send + Sync {
    fn resolve(&self, receiver_path: &str) -> Option<ResolvedLocalPath>;
}

/// `PathResolver` backed by a configured `PathMapping` table, assigning a
/// synthetic `root_id` per distinct local root (stable for the process
/// lifetime, which is all §4.3 requires).
pub struct MappingPathResolver {
    mapping: crate::models::PathMapping,
    root_ids: dashmap::DashMap<String, String>,
}

impl MappingPathResolver {
    #[must_use]
    pub fn new(mapping: crate::models::PathMapping) -> Self {
        Self {
            mapping,
            root_ids: dashmap::DashMap::new(),
        }
    }

    fn root_id_for(&self, local_root: &str) -> String {
        self.root_ids
            .entry(local_root.to_string())
            .or_insert_with(|| {
                let digest = sha2::Sha256::digest(local_root.as_bytes());
                hex::encode(&digest[..8])
            })
            .clone()
    }
}

use sha2::Digest;

impl PathResolver for MappingPathResolver {
    fn resolve(&self, receiver_path: &str) -> Option<ResolvedLocalPath> {
        let local = self.mapping.resolve_local_existing(receiver_path)?;
        let local_str = local.to_string_lossy().into_owned();
        // Best-effort rel_path: filename-only fallback keeps the duration
        // store keyable even when the exact mapping prefix can't be
        // recovered from a canonicalized path.
        let rel_path = std::path::Path::new(receiver_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| receiver_path.to_string());
        let root_id = self.root_id_for(
            std::path::Path::new(&local_str)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| local_str.clone())
                .as_str(),
        );
        Some(ResolvedLocalPath {
            local_path: local_str,
            root_id,
            rel_path,
        })
    }
}
