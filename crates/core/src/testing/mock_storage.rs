//! In-memory temp storage for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::TempStorage;
use crate::error::SubtitleError;

/// Storage that keeps saved payloads in memory.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    directory: PathBuf,
    saved: Arc<RwLock<Vec<(PathBuf, Vec<u8>)>>>,
    fail_saves: Arc<RwLock<bool>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            directory: PathBuf::from("/memory/subgrab"),
            saved: Arc::new(RwLock::new(Vec::new())),
            fail_saves: Arc::new(RwLock::new(false)),
        }
    }

    /// Every saved file in save order.
    pub async fn saved(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.saved.read().await.clone()
    }

    /// Make every save fail with a local I/O error.
    pub async fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.write().await = fail;
    }
}

#[async_trait]
impl TempStorage for MemoryStorage {
    async fn allocate_directory(&self) -> Result<PathBuf, SubtitleError> {
        Ok(self.directory.clone())
    }

    async fn save(
        &self,
        bytes: &[u8],
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, SubtitleError> {
        let path = dir.join(filename);
        if *self.fail_saves.read().await {
            return Err(SubtitleError::local_io(
                &path,
                std::io::Error::other("simulated disk full"),
            ));
        }
        self.saved.write().await.push((path.clone(), bytes.to_vec()));
        Ok(path)
    }
}
