//! File-backed credential store.
//!
//! One JSON record (`creds.json`) under the data directory. Saves go
//! through a sibling temp file and an atomic rename, so a crash mid-write
//! leaves either the old record or the new one, never a torn file.

use std::path::{Path, PathBuf};

use tracing::debug;

use wagenie_core::credstore::CredentialStore;
use wagenie_types::creds::Credentials;
use wagenie_types::error::CredentialError;

/// File name of the credential record inside the data directory.
const CREDS_FILE: &str = "creds.json";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `WAGENIE_DATA_DIR` environment variable
/// 2. `~/.wagenie`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WAGENIE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".wagenie");
    }

    // Last resort: current directory
    PathBuf::from(".wagenie")
}

/// Credential store persisting to `{data_dir}/creds.json`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDS_FILE),
        }
    }

    /// Location of the record on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the persisted record. Missing file is not an error.
    pub async fn reset(&self) -> Result<(), CredentialError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Credentials, CredentialError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| CredentialError::Corrupt(e.to_string())),
            // First run: no record yet means an unregistered identity.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Credentials::empty()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, creds: &Credentials) -> Result<(), CredentialError> {
        let serialized = serde_json::to_vec_pretty(creds)
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?;

        // Idempotent: an unchanged record is not rewritten.
        if let Ok(existing) = tokio::fs::read(&self.path).await {
            if existing == serialized {
                debug!(path = %self.path.display(), "credentials unchanged, skipping write");
                return Ok(());
            }
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &serialized).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "credentials persisted");
        Ok(())
    }
}
