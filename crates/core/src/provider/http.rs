//! HTTP plumbing shared by provider clients and the downloader.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;
use crate::error::SubtitleError;

/// Build a client with the configured timeout and user agent.
pub(crate) fn build_client(config: &HttpConfig) -> Result<Client, SubtitleError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs as u64))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| SubtitleError::NetworkFailure(format!("Failed to create HTTP client: {}", e)))
}

/// Map a reqwest transport error into the taxonomy.
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> SubtitleError {
    if e.is_timeout() {
        SubtitleError::NetworkFailure(format!("{}: request timed out", provider))
    } else if e.is_decode() {
        SubtitleError::MalformedResponse(format!("{}: {}", provider, e))
    } else {
        SubtitleError::NetworkFailure(format!("{}: {}", provider, e))
    }
}

/// Map a non-success HTTP status of an API call into the taxonomy.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> SubtitleError {
    let message = format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    );
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            SubtitleError::auth(provider, message)
        }
        StatusCode::NOT_FOUND => SubtitleError::NotFound(format!("{}: {}", provider, message)),
        _ => SubtitleError::server(provider, message),
    }
}

/// Check the transport status and decode the body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T, SubtitleError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(status_error(provider, status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        SubtitleError::MalformedResponse(format!("{}: failed to parse response: {}", provider, e))
    })
}
