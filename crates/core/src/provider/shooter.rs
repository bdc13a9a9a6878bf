//! Shooter provider: fingerprint lookup that returns download links directly.
//!
//! The response is a bare JSON array. File names are not part of it; the
//! downloader takes them from each download's `Content-Disposition` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{HttpConfig, ShooterConfig};
use crate::error::SubtitleError;

use super::http::{build_client, read_json, transport_error};
use super::{PayloadTarget, RemoteFile, SearchCriteria, SubtitleCandidate, SubtitleProvider};

const PROVIDER: &str = "shooter";

/// Shooter API client.
pub struct ShooterProvider {
    client: Client,
    config: ShooterConfig,
}

impl ShooterProvider {
    pub fn new(config: ShooterConfig, http: &HttpConfig) -> Result<Self, SubtitleError> {
        Ok(Self {
            client: build_client(http)?,
            config,
        })
    }
}

#[async_trait]
impl SubtitleProvider for ShooterProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, criteria: &SearchCriteria) -> bool {
        matches!(criteria, SearchCriteria::Fingerprint(_))
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, SubtitleError> {
        let fingerprint = match criteria {
            SearchCriteria::Fingerprint(fp) => fp,
            SearchCriteria::Query(_) => {
                return Err(SubtitleError::InvalidRequest(
                    "shooter only searches by media fingerprint".to_string(),
                ))
            }
        };

        debug!(path = %fingerprint.source_path.display(), "Searching shooter");

        let form = [
            ("filehash", fingerprint.signature.clone()),
            (
                "pathinfo",
                fingerprint.source_path.to_string_lossy().into_owned(),
            ),
            ("format", "json".to_string()),
        ];

        let response = self
            .client
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let items: Vec<ShooterItem> = read_json(PROVIDER, response).await?;

        let candidates: Vec<SubtitleCandidate> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let candidate = item.into_candidate(index);
                if candidate.is_none() {
                    warn!(index, "Shooter result has no files, skipping");
                }
                candidate
            })
            .collect();

        debug!(results = candidates.len(), "Shooter search complete");

        Ok(candidates)
    }
}

// Shooter API response types

#[derive(Debug, Deserialize)]
struct ShooterItem {
    #[serde(rename = "Desc", default)]
    desc: Option<String>,
    #[serde(rename = "Delay", default)]
    delay: Option<i64>,
    #[serde(rename = "Files")]
    files: Vec<ShooterFile>,
}

#[derive(Debug, Deserialize)]
struct ShooterFile {
    #[serde(rename = "Ext")]
    ext: String,
    #[serde(rename = "Link")]
    link: String,
}

impl ShooterItem {
    fn into_candidate(self, index: usize) -> Option<SubtitleCandidate> {
        let mut files = self.files;
        let format_hint = files.first()?.ext.clone();

        let target = if files.len() == 1 {
            PayloadTarget::SingleFile {
                file: RemoteFile::from_header(files.remove(0).link),
            }
        } else {
            PayloadTarget::MultiFile {
                files: files
                    .into_iter()
                    .map(|f| RemoteFile::from_header(f.link))
                    .collect(),
            }
        };

        let mut candidate = SubtitleCandidate::new(index, PROVIDER);
        candidate.title = self.desc.unwrap_or_default();
        candidate.delay_ms = self.delay.unwrap_or(0);
        candidate.format_hint = format_hint;
        candidate.target = target;
        Some(candidate)
    }
}
