use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// A JSON document on disk holding one piece of client state.
///
/// Writes go to a sibling temp file first and are renamed into place so a
/// crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct StateFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Builds `<dir>/<file_name>` when a state directory is configured.
    pub fn in_dir(dir: Option<&Path>, file_name: &str) -> Option<Self> {
        dir.map(|d| Self::new(d.join(file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing files load as `None`; unreadable ones are logged and treated
    /// the same way.
    pub async fn load(&self) -> Option<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt state file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub async fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
