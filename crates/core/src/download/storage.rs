//! Temporary storage for downloaded subtitle files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::SubtitleError;

/// Where downloaded payloads are written.
///
/// The pipeline only ever adds files; it never deletes or cleans a directory
/// it was given.
#[async_trait]
pub trait TempStorage: Send + Sync {
    /// Provide a writable directory for one pipeline run.
    async fn allocate_directory(&self) -> Result<PathBuf, SubtitleError>;

    /// Save `bytes` as `dir/filename` and return the full path.
    async fn save(&self, bytes: &[u8], dir: &Path, filename: &str)
        -> Result<PathBuf, SubtitleError>;
}

/// File system backed storage rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct FsTempStorage {
    root: PathBuf,
}

impl FsTempStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TempStorage for FsTempStorage {
    async fn allocate_directory(&self) -> Result<PathBuf, SubtitleError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SubtitleError::local_io(&self.root, e))?;
        Ok(self.root.clone())
    }

    async fn save(
        &self,
        bytes: &[u8],
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, SubtitleError> {
        let path = dir.join(filename);
        fs::write(&path, bytes)
            .await
            .map_err(|e| SubtitleError::local_io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved subtitle file");
        Ok(path)
    }
}
