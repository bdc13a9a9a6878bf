//! Assrt provider: text search followed by a per-subtitle detail fetch.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::{AssrtConfig, HttpConfig};
use crate::error::SubtitleError;

use super::credentials::CredentialProvider;
use super::http::{build_client, read_json, transport_error};
use super::{PayloadTarget, RemoteFile, SearchCriteria, SubtitleCandidate, SubtitleProvider};

const PROVIDER: &str = "assrt";

/// Status codes documented by the assrt API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssrtStatus {
    Ok,
    NoSuchUser,
    QueryTooShort,
    MissingArgument,
    InvalidToken,
    EndpointNotFound,
    SubtitleNotFound,
    ServerError,
    DatabaseError,
    SearchEngineError,
    TemporarilyUnavailable,
    ExceededLimit,
    Unknown(i64),
}

impl AssrtStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::NoSuchUser,
            101 => Self::QueryTooShort,
            20000 => Self::MissingArgument,
            20001 => Self::InvalidToken,
            20400 => Self::EndpointNotFound,
            20900 => Self::SubtitleNotFound,
            30000 => Self::ServerError,
            30001 => Self::DatabaseError,
            30002 => Self::SearchEngineError,
            30300 => Self::TemporarilyUnavailable,
            30900 => Self::ExceededLimit,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::NoSuchUser => 1,
            Self::QueryTooShort => 101,
            Self::MissingArgument => 20000,
            Self::InvalidToken => 20001,
            Self::EndpointNotFound => 20400,
            Self::SubtitleNotFound => 20900,
            Self::ServerError => 30000,
            Self::DatabaseError => 30001,
            Self::SearchEngineError => 30002,
            Self::TemporarilyUnavailable => 30300,
            Self::ExceededLimit => 30900,
            Self::Unknown(code) => *code,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoSuchUser => "no such user",
            Self::QueryTooShort => "query too short",
            Self::MissingArgument => "missing argument",
            Self::InvalidToken => "invalid token",
            Self::EndpointNotFound => "endpoint not found",
            Self::SubtitleNotFound => "subtitle not found",
            Self::ServerError => "server error",
            Self::DatabaseError => "database error",
            Self::SearchEngineError => "search engine error",
            Self::TemporarilyUnavailable => "temporarily unavailable",
            Self::ExceededLimit => "exceeded request limit",
            Self::Unknown(_) => "unknown status",
        }
    }

    /// The normalized error for this status, or `None` on success.
    pub fn to_error(&self) -> Option<SubtitleError> {
        let message = self.description().to_string();
        let error = match self {
            Self::Ok => return None,
            Self::NoSuchUser | Self::InvalidToken | Self::ExceededLimit => {
                SubtitleError::auth(PROVIDER, message)
            }
            Self::SubtitleNotFound => SubtitleError::NotFound(format!("{}: {}", PROVIDER, message)),
            Self::QueryTooShort
            | Self::MissingArgument
            | Self::EndpointNotFound
            | Self::ServerError
            | Self::DatabaseError
            | Self::SearchEngineError
            | Self::TemporarilyUnavailable
            | Self::Unknown(_) => SubtitleError::ServerFailure {
                provider: PROVIDER.to_string(),
                code: Some(self.code()),
                message,
            },
        };
        Some(error)
    }
}

/// Assrt API client.
pub struct AssrtProvider {
    client: Client,
    config: AssrtConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl AssrtProvider {
    pub fn new(
        config: AssrtConfig,
        http: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, SubtitleError> {
        Ok(Self {
            client: build_client(http)?,
            config,
            credentials,
        })
    }

    /// POST a form and unwrap the status envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<T, SubtitleError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.credentials.credential())
            .form(form)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let envelope: Envelope<T> = read_json(PROVIDER, response).await?;

        if let Some(err) = AssrtStatus::from_code(envelope.status).to_error() {
            debug!(status = envelope.status, error = %err, "Assrt returned error status");
            return Err(err);
        }

        envelope.sub.ok_or_else(|| {
            SubtitleError::MalformedResponse(format!("{}: response has no 'sub' object", PROVIDER))
        })
    }
}

#[async_trait]
impl SubtitleProvider for AssrtProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, SubtitleError> {
        let query = match criteria {
            SearchCriteria::Query(q) => q.clone(),
            // Fall back to the media file's name
            SearchCriteria::Fingerprint(fp) => fp
                .source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    SubtitleError::InvalidRequest(format!(
                        "cannot derive a query from {}",
                        fp.source_path.display()
                    ))
                })?,
        };

        debug!(query = %query, "Searching assrt");

        let sub: SearchSub = self
            .call(&self.config.search_url, &[("q", query)])
            .await?;

        let candidates: Vec<SubtitleCandidate> = sub
            .subs
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.into_candidate(index))
            .collect();

        debug!(results = candidates.len(), "Assrt search complete");

        Ok(candidates)
    }

    async fn fetch_detail(
        &self,
        mut candidate: SubtitleCandidate,
    ) -> Result<SubtitleCandidate, SubtitleError> {
        if candidate.is_resolved() {
            return Err(SubtitleError::InvalidRequest(format!(
                "candidate {} is already resolved",
                candidate.index
            )));
        }
        let id = candidate.provider_id.ok_or_else(|| {
            SubtitleError::InvalidRequest(format!(
                "candidate {} has no assrt id",
                candidate.index
            ))
        })?;

        debug!(id, index = candidate.index, "Fetching assrt detail");

        let sub: DetailSub = self
            .call(&self.config.detail_url, &[("id", id.to_string())])
            .await?;

        let mut subs = sub.subs;
        if subs.len() != 1 {
            return Err(SubtitleError::MalformedResponse(format!(
                "{}: expected exactly one detail result for id {}, got {}",
                PROVIDER,
                id,
                subs.len()
            )));
        }
        let detail = subs.remove(0);

        candidate.resolve(detail.into_target()?)?;
        Ok(candidate)
    }
}

fn checked_url(raw: &str) -> Result<String, SubtitleError> {
    Url::parse(raw).map(|u| u.to_string()).map_err(|e| {
        SubtitleError::MalformedResponse(format!("{}: invalid URL '{}': {}", PROVIDER, raw, e))
    })
}

// Assrt API response types

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: i64,
    sub: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchSub {
    #[serde(default)]
    subs: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: i64,
    #[serde(default)]
    native_name: String,
    #[serde(default)]
    upload_time: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    lang: Option<Lang>,
}

#[derive(Debug, Deserialize)]
struct Lang {
    #[serde(default)]
    desc: String,
}

impl SearchItem {
    fn into_candidate(self, index: usize) -> SubtitleCandidate {
        let mut candidate = SubtitleCandidate::new(index, PROVIDER);
        candidate.provider_id = Some(self.id);
        candidate.title = if self.native_name.is_empty() {
            "[No title]".to_string()
        } else {
            self.native_name
        };
        candidate.uploaded_at = self.upload_time;
        candidate.format_hint = self.subtype.unwrap_or_else(|| "Unknown".to_string());
        candidate.language_hint = self.lang.map(|l| l.desc).unwrap_or_default();
        candidate
    }
}

#[derive(Debug, Deserialize)]
struct DetailSub {
    #[serde(default)]
    subs: Vec<DetailItem>,
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    url: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    filelist: Vec<DetailFile>,
}

#[derive(Debug, Deserialize)]
struct DetailFile {
    url: String,
    f: String,
}

impl DetailItem {
    fn into_target(self) -> Result<PayloadTarget, SubtitleError> {
        let url = checked_url(&self.url)?;

        if self.filelist.is_empty() {
            if self.filename.is_empty() {
                return Err(SubtitleError::MalformedResponse(format!(
                    "{}: detail has no filename",
                    PROVIDER
                )));
            }
            return Ok(PayloadTarget::SingleFile {
                file: RemoteFile::named(url, self.filename),
            });
        }

        let files = self
            .filelist
            .into_iter()
            .map(|f| -> Result<RemoteFile, SubtitleError> {
                Ok(RemoteFile::named(checked_url(&f.url)?, f.f))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PayloadTarget::MultiFile { files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_status_code_table() {
        let table = [
            (1, ErrorKind::AuthOrQuotaFailure),
            (101, ErrorKind::ServerFailure),
            (20000, ErrorKind::ServerFailure),
            (20001, ErrorKind::AuthOrQuotaFailure),
            (20400, ErrorKind::ServerFailure),
            (20900, ErrorKind::NotFound),
            (30000, ErrorKind::ServerFailure),
            (30001, ErrorKind::ServerFailure),
            (30002, ErrorKind::ServerFailure),
            (30300, ErrorKind::ServerFailure),
            (30900, ErrorKind::AuthOrQuotaFailure),
        ];
        for (code, kind) in table {
            let status = AssrtStatus::from_code(code);
            assert!(!matches!(status, AssrtStatus::Unknown(_)), "code {}", code);
            assert_eq!(status.code(), code);
            assert_eq!(status.to_error().unwrap().kind(), kind, "code {}", code);
        }
    }

    #[test]
    fn test_ok_status_is_not_an_error() {
        assert!(AssrtStatus::from_code(0).to_error().is_none());
    }

    #[test]
    fn test_unknown_status_is_server_failure() {
        let status = AssrtStatus::from_code(42424);
        assert_eq!(status, AssrtStatus::Unknown(42424));
        let err = status.to_error().unwrap();
        assert!(matches!(
            err,
            SubtitleError::ServerFailure {
                code: Some(42424),
                ..
            }
        ));
    }

    #[test]
    fn test_query_too_short_message() {
        let err = AssrtStatus::QueryTooShort.to_error().unwrap();
        assert!(err.to_string().contains("query too short"));
    }

    #[test]
    fn test_search_item_defaults() {
        let item: SearchItem = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let candidate = item.into_candidate(2);
        assert_eq!(candidate.index, 2);
        assert_eq!(candidate.provider_id, Some(7));
        assert_eq!(candidate.title, "[No title]");
        assert_eq!(candidate.format_hint, "Unknown");
        assert_eq!(candidate.language_hint, "");
        assert!(!candidate.is_resolved());
    }

    #[test]
    fn test_search_item_full() {
        let item: SearchItem = serde_json::from_str(
            r#"{"id": 602333, "native_name": "Movie.2020", "upload_time": "2020-05-01 10:00:00",
                "subtype": "ASS", "lang": {"desc": "chs"}}"#,
        )
        .unwrap();
        let candidate = item.into_candidate(0);
        assert_eq!(candidate.title, "Movie.2020");
        assert_eq!(candidate.uploaded_at, "2020-05-01 10:00:00");
        assert_eq!(candidate.format_hint, "ASS");
        assert_eq!(candidate.language_hint, "chs");
    }

    #[test]
    fn test_detail_single_file() {
        let item: DetailItem = serde_json::from_str(
            r#"{"url": "http://file.assrt.net/download/1/movie.srt", "filename": "movie.srt", "filelist": []}"#,
        )
        .unwrap();
        let target = item.into_target().unwrap();
        assert_eq!(
            target,
            PayloadTarget::SingleFile {
                file: RemoteFile::named("http://file.assrt.net/download/1/movie.srt", "movie.srt")
            }
        );
    }

    #[test]
    fn test_detail_file_list() {
        let item: DetailItem = serde_json::from_str(
            r#"{"url": "http://file.assrt.net/download/1/pack.zip", "filename": "pack.zip",
                "filelist": [
                    {"url": "http://file.assrt.net/onthefly/1/a.srt", "f": "a.srt", "s": "10KB"},
                    {"url": "http://file.assrt.net/onthefly/1/b.ass", "f": "b.ass", "s": "12KB"}
                ]}"#,
        )
        .unwrap();
        match item.into_target().unwrap() {
            PayloadTarget::MultiFile { files } => {
                assert_eq!(files.len(), 2);
                assert_eq!(files[0].filename.as_deref(), Some("a.srt"));
                assert_eq!(files[1].filename.as_deref(), Some("b.ass"));
            }
            other => panic!("expected multi file, got {:?}", other),
        }
    }

    #[test]
    fn test_detail_invalid_url() {
        let item: DetailItem =
            serde_json::from_str(r#"{"url": "not a url", "filename": "x.srt"}"#).unwrap();
        assert!(matches!(
            item.into_target(),
            Err(SubtitleError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_detail_missing_filename() {
        let item: DetailItem =
            serde_json::from_str(r#"{"url": "http://file.assrt.net/x"}"#).unwrap();
        assert!(matches!(
            item.into_target(),
            Err(SubtitleError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_envelope_error_without_sub() {
        let envelope: Envelope<SearchSub> = serde_json::from_str(r#"{"status": 101}"#).unwrap();
        assert_eq!(envelope.status, 101);
        assert!(envelope.sub.is_none());
    }

    fn decode_envelope<T: DeserializeOwned>(body: &str) -> Envelope<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_envelope_decodes_for_any_payload() {
        let envelope: Envelope<DetailSub> = decode_envelope(r#"{"status": 20900}"#);
        assert!(envelope.sub.is_none());

        let envelope: Envelope<SearchSub> =
            decode_envelope(r#"{"status": 0, "sub": {"subs": [{"id": 1}]}}"#);
        assert_eq!(envelope.sub.map(|s| s.subs.len()), Some(1));
    }
}
