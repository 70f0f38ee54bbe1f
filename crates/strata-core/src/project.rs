use std::path::Path;

use serde::{Deserialize, Serialize};

use strata_util::errors::StrataError;
use strata_util::fs::write_file;
use strata_util::hash::sha256_bytes;

use crate::lockfile::Lockfile;
use crate::manifest::Manifest;
use crate::{LOCK_FILE, MANIFEST_FILE};

/// A project: its manifest and, once resolved, its lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub manifest: Manifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<Lockfile>,
}

impl Project {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            lock: None,
        }
    }

    /// Load `Strata.toml` (and `Strata.lock` when present) from a project directory.
    pub fn from_dir(dir: &Path) -> miette::Result<Self> {
        let manifest = Manifest::from_path(&dir.join(MANIFEST_FILE))?;
        let lock_path = dir.join(LOCK_FILE);
        let lock = if lock_path.is_file() {
            Some(Lockfile::from_path(&lock_path)?)
        } else {
            None
        };
        Ok(Self { manifest, lock })
    }

    pub fn name(&self) -> &str {
        &self.manifest.project.name
    }

    /// A copy of this project pinned to the given lock.
    pub fn with_lock(&self, lock: Lockfile) -> Self {
        Self {
            manifest: self.manifest.clone(),
            lock: Some(lock),
        }
    }

    /// Structured map form of the project. Object keys come out sorted.
    pub fn to_value(&self) -> Result<serde_json::Value, StrataError> {
        serde_json::to_value(self).map_err(|e| StrataError::Serialization {
            message: format!("Failed to convert project {} to JSON: {e}", self.name()),
        })
    }

    /// Sorted, pretty-printed JSON form of [`Project::to_value`].
    pub fn to_json_pretty(&self) -> Result<String, StrataError> {
        let value = self.to_value()?;
        serde_json::to_string_pretty(&value).map_err(|e| StrataError::Serialization {
            message: format!("Failed to render project {}: {e}", self.name()),
        })
    }

    /// Write the manifest and lock to the given paths. A missing lock is written empty.
    pub fn to_files(&self, manifest_path: &Path, lock_path: &Path) -> miette::Result<()> {
        let manifest = self
            .manifest
            .to_string_pretty()
            .map_err(|e| StrataError::Serialization {
                message: format!("Failed to serialize {MANIFEST_FILE}: {e}"),
            })?;
        let lock = self
            .lock
            .clone()
            .unwrap_or_default()
            .to_string_pretty()
            .map_err(|e| StrataError::Serialization {
                message: format!("Failed to serialize {LOCK_FILE}: {e}"),
            })?;
        write_file(manifest_path, &manifest).map_err(StrataError::Io)?;
        write_file(lock_path, &lock).map_err(StrataError::Io)?;
        Ok(())
    }

    /// SHA-256 of the canonical manifest serialization.
    ///
    /// Pipeline units receive this to decide inclusion without re-reading the manifest.
    pub fn fingerprint(&self) -> String {
        match self.manifest.to_string_pretty() {
            Ok(canonical) => sha256_bytes(canonical.as_bytes()),
            Err(e) => {
                tracing::warn!("Cannot serialize manifest for fingerprint: {e}");
                sha256_bytes(self.name().as_bytes())
            }
        }
    }
}
