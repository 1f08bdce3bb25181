//! In-memory, append-only patch registry.

use std::{
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::debug;

use topoform_core::{
    application::{ApplicationError, ports::PatchRegistry},
    domain::PatchFragment,
    error::TopoResult,
};

/// Thread-safe append-only patch registry.
///
/// Registration order is preserved per point and across points; the composer
/// relies on it for deterministic fragment placement. There is no removal:
/// a registry is built up for one generation run and then dropped.
#[derive(Clone, Default)]
pub struct InMemoryPatchRegistry {
    inner: Arc<RwLock<Vec<(String, PatchFragment)>>>,
}

impl InMemoryPatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to a patch point.
    pub fn register(
        &self,
        point: impl Into<String>,
        fragment: PatchFragment,
    ) -> TopoResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;
        inner.push((point.into(), fragment));
        Ok(())
    }

    /// Register every `<patch-point>.yml` / `<patch-point>.yaml` file in a
    /// directory, in lexicographic filename order. The file stem names the
    /// patch point and the file body is the opaque fragment; the origin label
    /// is the file name.
    pub fn register_dir(&self, dir: &Path) -> TopoResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| ApplicationError::RegistryFailure {
            reason: format!("cannot read patches directory '{}': {}", dir.display(), e),
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yml") | Some("yaml")
                )
            })
            .collect();
        paths.sort();

        let mut registered = 0;
        for path in paths {
            let Some(point) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let body =
                std::fs::read_to_string(&path).map_err(|e| ApplicationError::RegistryFailure {
                    reason: format!("cannot read patch file '{}': {}", path.display(), e),
                })?;
            let origin = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(point)
                .to_string();
            self.register(point.to_string(), PatchFragment::new(origin, body))?;
            registered += 1;
        }
        debug!(dir = %dir.display(), registered, "patch directory loaded");
        Ok(registered)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PatchRegistry for InMemoryPatchRegistry {
    fn fragments_for(&self, point: &str) -> TopoResult<Vec<PatchFragment>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner
            .iter()
            .filter(|(p, _)| p == point)
            .map(|(_, f)| f.clone())
            .collect())
    }

    fn registered_points(&self) -> TopoResult<Vec<String>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        let mut points: Vec<String> = Vec::new();
        for (point, _) in inner.iter() {
            if !points.contains(point) {
                points.push(point.clone());
            }
        }
        Ok(points)
    }
}

fn lock_error() -> ApplicationError {
    ApplicationError::LockPoisoned {
        context: "patch registry".into(),
    }
}
