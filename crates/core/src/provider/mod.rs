//! Subtitle provider abstraction.
//!
//! This module provides a `SubtitleProvider` trait implemented once per
//! remote subtitle directory. Providers differ in how they search
//! (text vs. fingerprint), whether a detail fetch is needed before download,
//! and how their responses are shaped; callers only see candidates and the
//! normalized error taxonomy.

mod assrt;
mod credentials;
pub(crate) mod http;
mod shooter;
mod types;

pub use assrt::{AssrtProvider, AssrtStatus};
pub use credentials::{CredentialProvider, StaticCredential};
pub use shooter::ShooterProvider;
pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{validate_config, Config};
use crate::error::SubtitleError;

/// Trait for remote subtitle directories.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Provider name for logging and candidate attribution.
    fn name(&self) -> &str;

    /// Whether this provider can search with the given criteria.
    fn supports(&self, _criteria: &SearchCriteria) -> bool {
        true
    }

    /// Search for candidates. Each call yields a fresh list.
    async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SubtitleCandidate>, SubtitleError>;

    /// Resolve an unresolved candidate into a downloadable target.
    ///
    /// Providers whose search already returns download targets keep this
    /// default, which only accepts resolved candidates.
    async fn fetch_detail(
        &self,
        candidate: SubtitleCandidate,
    ) -> Result<SubtitleCandidate, SubtitleError> {
        if candidate.is_resolved() {
            Ok(candidate)
        } else {
            Err(SubtitleError::InvalidRequest(format!(
                "{} cannot resolve candidate {}",
                self.name(),
                candidate.index
            )))
        }
    }
}

/// Factory function to create every configured provider.
///
/// The config is validated first; an invalid config is `InvalidRequest`.
pub fn create_providers(config: &Config) -> Result<Vec<Arc<dyn SubtitleProvider>>, SubtitleError> {
    validate_config(config).map_err(|e| SubtitleError::InvalidRequest(e.to_string()))?;

    let mut providers: Vec<Arc<dyn SubtitleProvider>> = Vec::new();

    if let Some(assrt) = &config.assrt {
        let credentials = Arc::new(StaticCredential::new(assrt.token.clone()));
        providers.push(Arc::new(AssrtProvider::new(
            assrt.clone(),
            &config.http,
            credentials,
        )?));
    }

    if let Some(shooter) = &config.shooter {
        providers.push(Arc::new(ShooterProvider::new(shooter.clone(), &config.http)?));
    }

    Ok(providers)
}

/// Candidates returned by one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResults {
    pub provider: String,
    pub candidates: Vec<SubtitleCandidate>,
}

/// Search every provider that supports `criteria` concurrently.
///
/// Succeeds only if every search succeeds; the first failure is returned and
/// the remaining results are discarded.
pub async fn search_providers(
    providers: &[Arc<dyn SubtitleProvider>],
    criteria: &SearchCriteria,
) -> Result<Vec<ProviderResults>, SubtitleError> {
    let searches = providers
        .iter()
        .filter(|p| {
            let supported = p.supports(criteria);
            if !supported {
                debug!(provider = p.name(), criteria = %criteria.describe(), "Provider skipped");
            }
            supported
        })
        .map(|provider| async move {
            let candidates = provider.search(criteria).await?;
            Ok::<_, SubtitleError>(ProviderResults {
                provider: provider.name().to_string(),
                candidates,
            })
        });

    futures::future::try_join_all(searches).await
}
