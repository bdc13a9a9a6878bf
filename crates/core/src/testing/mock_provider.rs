//! Mock subtitle provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::SubtitleError;
use crate::provider::{PayloadTarget, SearchCriteria, SubtitleCandidate, SubtitleProvider};

/// Mock implementation of the SubtitleProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Resolve candidates to configured targets by provider id
/// - Track searches and detail fetches for assertions
/// - Inject one-shot failures
pub struct MockProvider {
    name: String,
    /// Configured results to return.
    results: Arc<RwLock<Vec<SubtitleCandidate>>>,
    /// Recorded search criteria.
    searches: Arc<RwLock<Vec<SearchCriteria>>>,
    /// If set, the next search will fail with this error.
    next_search_error: Arc<RwLock<Option<SubtitleError>>>,
    /// Detail targets by provider id.
    detail_targets: Arc<RwLock<HashMap<i64, PayloadTarget>>>,
    /// One-shot detail errors by provider id.
    detail_errors: Arc<RwLock<HashMap<i64, SubtitleError>>>,
    /// Provider ids passed to fetch_detail.
    detail_calls: Arc<RwLock<Vec<i64>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("results", &"<results>")
            .finish()
    }
}

impl MockProvider {
    /// Create a mock provider with empty results.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_search_error: Arc::new(RwLock::new(None)),
            detail_targets: Arc::new(RwLock::new(HashMap::new())),
            detail_errors: Arc::new(RwLock::new(HashMap::new())),
            detail_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<SubtitleCandidate>) {
        *self.results.write().await = results;
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_search_error(&self, error: SubtitleError) {
        *self.next_search_error.write().await = Some(error);
    }

    /// Resolve candidates with `provider_id` to `target`.
    pub async fn set_detail_target(&self, provider_id: i64, target: PayloadTarget) {
        self.detail_targets.write().await.insert(provider_id, target);
    }

    /// Fail the next detail fetch for `provider_id`.
    pub async fn set_detail_error(&self, provider_id: i64, error: SubtitleError) {
        self.detail_errors.write().await.insert(provider_id, error);
    }

    /// Get recorded search criteria.
    pub async fn recorded_searches(&self) -> Vec<SearchCriteria> {
        self.searches.read().await.clone()
    }

    /// Get provider ids of every detail fetch.
    pub async fn detail_calls(&self) -> Vec<i64> {
        self.detail_calls.read().await.clone()
    }
}

#[async_trait]
impl SubtitleProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, SubtitleError> {
        if let Some(err) = self.next_search_error.write().await.take() {
            return Err(err);
        }

        self.searches.write().await.push(criteria.clone());
        Ok(self.results.read().await.clone())
    }

    async fn fetch_detail(
        &self,
        mut candidate: SubtitleCandidate,
    ) -> Result<SubtitleCandidate, SubtitleError> {
        if candidate.is_resolved() {
            return Ok(candidate);
        }

        let id = candidate.provider_id.ok_or_else(|| {
            SubtitleError::InvalidRequest(format!("candidate {} has no id", candidate.index))
        })?;
        self.detail_calls.write().await.push(id);

        if let Some(err) = self.detail_errors.write().await.remove(&id) {
            return Err(err);
        }

        let target = self
            .detail_targets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SubtitleError::NotFound(format!("no detail for id {}", id)))?;

        candidate.resolve(target)?;
        Ok(candidate)
    }
}
