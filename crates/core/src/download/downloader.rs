//! Download orchestrator for resolved candidates.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::HttpConfig;
use crate::error::SubtitleError;
use crate::provider::http::build_client;
use crate::provider::{PayloadTarget, RemoteFile, SubtitleCandidate};

use super::filename::{indexed_file_name, local_file_name, parse_content_disposition};
use super::storage::TempStorage;

/// Fetches every file of a candidate and saves it to local storage.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    storage: Arc<dyn TempStorage>,
}

impl Downloader {
    /// Create a downloader with its own HTTP client.
    pub fn new(http: &HttpConfig, storage: Arc<dyn TempStorage>) -> Result<Self, SubtitleError> {
        Ok(Self::with_client(build_client(http)?, storage))
    }

    pub fn with_client(client: Client, storage: Arc<dyn TempStorage>) -> Self {
        Self { client, storage }
    }

    pub fn storage(&self) -> &Arc<dyn TempStorage> {
        &self.storage
    }

    /// Download all files of `candidate` into `dir`.
    ///
    /// Multi-file candidates are fetched concurrently and succeed only if
    /// every file succeeds. Nothing is saved until every fetch has finished,
    /// and two files of one candidate that map to the same local name fail
    /// the candidate instead of overwriting each other. Returned paths
    /// follow the candidate's file order.
    pub async fn download(
        &self,
        candidate: &SubtitleCandidate,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, SubtitleError> {
        let fetched = match &candidate.target {
            PayloadTarget::Unresolved => {
                return Err(SubtitleError::InvalidRequest(format!(
                    "candidate {} from {} has no download target",
                    candidate.index, candidate.provider
                )))
            }
            PayloadTarget::SingleFile { file } => vec![fetch_file(&self.client, file).await?],
            PayloadTarget::MultiFile { files } => self.fetch_all(candidate.index, files).await?,
        };

        let paths = self.save_all(candidate.index, fetched, dir).await?;

        info!(
            provider = %candidate.provider,
            index = candidate.index,
            files = paths.len(),
            "Subtitle downloaded"
        );
        Ok(paths)
    }

    /// Spawn one task per file and wait until all succeed or one fails.
    async fn fetch_all(
        &self,
        index: usize,
        files: &[RemoteFile],
    ) -> Result<Vec<FetchedFile>, SubtitleError> {
        let mut tasks = JoinSet::new();

        for (position, file) in files.iter().cloned().enumerate() {
            let client = self.client.clone();
            tasks.spawn(async move { (position, fetch_file(&client, &file).await) });
        }

        let mut fetched: Vec<Option<FetchedFile>> = (0..files.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let (position, result) = joined.map_err(|e| {
                SubtitleError::NetworkFailure(format!("download task failed: {}", e))
            })?;

            match result {
                Ok(file) => fetched[position] = Some(file),
                Err(e) => {
                    warn!(index, position, error = %e, "File download failed, abandoning candidate");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(fetched.into_iter().flatten().collect())
    }

    /// Save fetched files as `[index]name`, in entry order.
    async fn save_all(
        &self,
        index: usize,
        fetched: Vec<FetchedFile>,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, SubtitleError> {
        let mut seen = HashSet::new();
        for file in &fetched {
            if !seen.insert(file.name.as_str()) {
                return Err(SubtitleError::MalformedResponse(format!(
                    "candidate {} has more than one file named '{}'",
                    index, file.name
                )));
            }
        }

        let mut paths = Vec::with_capacity(fetched.len());
        for file in fetched {
            let path = self
                .storage
                .save(&file.bytes, dir, &indexed_file_name(index, &file.name))
                .await?;
            paths.push(path);
        }
        Ok(paths)
    }
}

/// A downloaded payload and the local name it will be saved under.
struct FetchedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Fetch one remote file and work out its local name.
async fn fetch_file(client: &Client, file: &RemoteFile) -> Result<FetchedFile, SubtitleError> {
    debug!(url = %file.url, "Fetching subtitle file");

    let response = client
        .get(&file.url)
        .send()
        .await
        .map_err(|e| download_error(&file.url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SubtitleError::NetworkFailure(format!(
            "{}: HTTP {}",
            file.url, status
        )));
    }

    let remote_name = match &file.filename {
        Some(name) => name.clone(),
        None => response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| parse_content_disposition(v.as_bytes()))
            .ok_or_else(|| {
                SubtitleError::MalformedResponse(format!(
                    "{}: missing or unparsable Content-Disposition",
                    file.url
                ))
            })?,
    };

    let name = local_file_name(&remote_name).ok_or_else(|| {
        SubtitleError::MalformedResponse(format!("unusable file name '{}'", remote_name))
    })?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_error(&file.url, e))?;

    Ok(FetchedFile {
        name,
        bytes: bytes.to_vec(),
    })
}

fn download_error(url: &str, e: reqwest::Error) -> SubtitleError {
    if e.is_timeout() {
        SubtitleError::NetworkFailure(format!("{}: request timed out", url))
    } else {
        SubtitleError::NetworkFailure(format!("{}: {}", url, e))
    }
}
