//! End-to-end flow: search, select, resolve detail, download.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::download::{Downloader, FsTempStorage};
use crate::error::SubtitleError;
use crate::provider::{create_providers, SearchCriteria, SubtitleCandidate, SubtitleProvider};
use crate::selection::{Chooser, SelectionGate};

use super::types::{CandidateOutcome, PipelineError, PipelineProgress, PipelineReport, PipelineStage};

/// Drives one provider through the whole acquisition flow.
///
/// The coordinator does not know which provider it talks to; a candidate that
/// comes back unresolved from selection gets a detail fetch, one that is
/// already resolved goes straight to download.
pub struct SubtitlePipeline {
    provider: Arc<dyn SubtitleProvider>,
    gate: SelectionGate,
    downloader: Downloader,
}

impl SubtitlePipeline {
    pub fn new(
        provider: Arc<dyn SubtitleProvider>,
        chooser: Arc<dyn Chooser>,
        downloader: Downloader,
    ) -> Self {
        Self {
            provider,
            gate: SelectionGate::new(chooser),
            downloader,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run the pipeline.
    ///
    /// Search and selection failures end the run. Past selection, each chosen
    /// candidate is processed on its own and gets its own outcome.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<PipelineReport, PipelineError> {
        self.execute(criteria, None).await
    }

    /// Run the pipeline, reporting every stage transition on `progress_tx`.
    ///
    /// If the receiver is dropped, the run continues without reporting.
    pub async fn run_with_progress(
        &self,
        criteria: &SearchCriteria,
        progress_tx: mpsc::Sender<PipelineProgress>,
    ) -> Result<PipelineReport, PipelineError> {
        self.execute(criteria, Some(&progress_tx)).await
    }

    async fn execute(
        &self,
        criteria: &SearchCriteria,
        progress: Option<&mpsc::Sender<PipelineProgress>>,
    ) -> Result<PipelineReport, PipelineError> {
        let provider = self.provider.name().to_string();

        report(progress, PipelineStage::Searching, None).await;
        info!(provider = %provider, criteria = %criteria.describe(), "Searching for subtitles");

        let candidates = match self.provider.search(criteria).await {
            Ok(c) => c,
            Err(e) => return Err(fail(progress, PipelineStage::Searching, e).await),
        };
        debug!(provider = %provider, found = candidates.len(), "Search finished");

        report(progress, PipelineStage::Selecting, None).await;
        let chosen = match self.gate.select(candidates).await {
            Ok(c) => c,
            Err(e) => return Err(fail(progress, PipelineStage::Selecting, e).await),
        };

        if chosen.is_empty() {
            info!(provider = %provider, "Nothing to download");
            report(progress, PipelineStage::Done, None).await;
            return Ok(PipelineReport {
                provider,
                directory: None,
                outcomes: Vec::new(),
            });
        }

        let directory = match self.downloader.storage().allocate_directory().await {
            Ok(d) => d,
            Err(e) => return Err(fail(progress, PipelineStage::Downloading, e).await),
        };

        let outcomes = futures::future::join_all(
            chosen
                .into_iter()
                .map(|candidate| self.process_candidate(candidate, &directory, progress)),
        )
        .await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            provider = %provider,
            succeeded = outcomes.len() - failed,
            failed,
            "Pipeline finished"
        );
        report(progress, PipelineStage::Done, None).await;

        Ok(PipelineReport {
            provider,
            directory: Some(directory),
            outcomes,
        })
    }

    /// Resolve (if needed) and download one candidate.
    async fn process_candidate(
        &self,
        candidate: SubtitleCandidate,
        directory: &Path,
        progress: Option<&mpsc::Sender<PipelineProgress>>,
    ) -> CandidateOutcome {
        let index = candidate.index;
        let title = candidate.title.clone();

        let result = self
            .resolve_and_download(candidate, directory, progress)
            .await;

        if let Err(e) = &result {
            warn!(index, stage = %e.stage, error = %e.source, "Candidate failed");
            report_failure(progress, Some(index), e).await;
        }

        CandidateOutcome {
            index,
            title,
            result,
        }
    }

    async fn resolve_and_download(
        &self,
        candidate: SubtitleCandidate,
        directory: &Path,
        progress: Option<&mpsc::Sender<PipelineProgress>>,
    ) -> Result<Vec<std::path::PathBuf>, PipelineError> {
        let index = candidate.index;

        let candidate = if candidate.is_resolved() {
            candidate
        } else {
            report(progress, PipelineStage::ResolvingDetail, Some(index)).await;
            self.provider
                .fetch_detail(candidate)
                .await
                .map_err(|e| PipelineError::new(PipelineStage::ResolvingDetail, e))?
        };

        report(progress, PipelineStage::Downloading, Some(index)).await;
        self.downloader
            .download(&candidate, directory)
            .await
            .map_err(|e| PipelineError::new(PipelineStage::Downloading, e))
    }
}

/// Build one pipeline per configured provider, all sharing `chooser` and the
/// configured temp directory. Fails with `InvalidRequest` on an invalid config.
pub fn create_pipelines(
    config: &Config,
    chooser: Arc<dyn Chooser>,
) -> Result<Vec<SubtitlePipeline>, SubtitleError> {
    let providers = create_providers(config)?;
    let storage = Arc::new(FsTempStorage::new(config.storage.temp_dir.clone()));
    let downloader = Downloader::new(&config.http, storage)?;

    Ok(providers
        .into_iter()
        .map(|provider| SubtitlePipeline::new(provider, chooser.clone(), downloader.clone()))
        .collect())
}

async fn report(
    progress: Option<&mpsc::Sender<PipelineProgress>>,
    stage: PipelineStage,
    candidate: Option<usize>,
) {
    if let Some(tx) = progress {
        let _ = tx
            .send(PipelineProgress {
                stage,
                candidate,
                error: None,
            })
            .await;
    }
}

async fn report_failure(
    progress: Option<&mpsc::Sender<PipelineProgress>>,
    candidate: Option<usize>,
    error: &PipelineError,
) {
    if let Some(tx) = progress {
        let _ = tx
            .send(PipelineProgress {
                stage: PipelineStage::Failed,
                candidate,
                error: Some(error.kind()),
            })
            .await;
    }
}

/// Wrap a run-level failure and report it.
async fn fail(
    progress: Option<&mpsc::Sender<PipelineProgress>>,
    stage: PipelineStage,
    error: SubtitleError,
) -> PipelineError {
    let error = PipelineError::new(stage, error);
    warn!(stage = %stage, error = %error.source, "Pipeline failed");
    report_failure(progress, None, &error).await;
    error
}
