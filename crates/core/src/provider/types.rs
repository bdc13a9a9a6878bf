//! Provider-agnostic types for subtitle search results.

use serde::{Deserialize, Serialize};

use crate::error::SubtitleError;
use crate::fingerprint::MediaFingerprint;

/// What to search for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCriteria {
    /// Free-text query.
    Query(String),
    /// Content fingerprint of a local media file.
    Fingerprint(MediaFingerprint),
}

impl SearchCriteria {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Query(q) => format!("query '{}'", q),
            Self::Fingerprint(fp) => format!("fingerprint of {}", fp.source_path.display()),
        }
    }
}

/// One remote file belonging to a subtitle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Download URL.
    pub url: String,
    /// File name to save under.
    /// `None` means the name comes from the `Content-Disposition` header of
    /// the download response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl RemoteFile {
    pub fn named(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: Some(filename.into()),
        }
    }

    pub fn from_header(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
        }
    }
}

/// Where a candidate's payload lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayloadTarget {
    /// Needs a detail fetch before it can be downloaded.
    Unresolved,
    SingleFile { file: RemoteFile },
    MultiFile { files: Vec<RemoteFile> },
}

impl PayloadTarget {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Files to fetch, in entry order. Empty when unresolved.
    pub fn files(&self) -> &[RemoteFile] {
        match self {
            Self::Unresolved => &[],
            Self::SingleFile { file } => std::slice::from_ref(file),
            Self::MultiFile { files } => files,
        }
    }
}

/// One discovered subtitle, independent of the provider that found it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleCandidate {
    /// Position in the originating search result. Only used to keep local
    /// file names apart; not stable across searches.
    pub index: usize,
    /// Name of the provider that produced this candidate.
    pub provider: String,
    /// Provider record id, needed by two-step providers for the detail fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
    pub title: String,
    pub uploaded_at: String,
    pub format_hint: String,
    pub language_hint: String,
    /// Timing offset suggested by the provider, in milliseconds.
    #[serde(default)]
    pub delay_ms: i64,
    pub target: PayloadTarget,
}

impl SubtitleCandidate {
    /// Create an unresolved candidate with empty metadata.
    pub fn new(index: usize, provider: impl Into<String>) -> Self {
        Self {
            index,
            provider: provider.into(),
            provider_id: None,
            title: String::new(),
            uploaded_at: String::new(),
            format_hint: String::new(),
            language_hint: String::new(),
            delay_ms: 0,
            target: PayloadTarget::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_resolved()
    }

    /// Move from `Unresolved` to a concrete target. Allowed exactly once.
    pub fn resolve(&mut self, target: PayloadTarget) -> Result<(), SubtitleError> {
        if self.is_resolved() {
            return Err(SubtitleError::InvalidRequest(format!(
                "candidate {} from {} is already resolved",
                self.index, self.provider
            )));
        }
        if !target.is_resolved() {
            return Err(SubtitleError::InvalidRequest(
                "cannot resolve a candidate to an unresolved target".to_string(),
            ));
        }
        self.target = target;
        Ok(())
    }
}
