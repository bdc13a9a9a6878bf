//! Types for pipeline runs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ErrorKind, SubtitleError};

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Searching,
    Selecting,
    ResolvingDetail,
    Downloading,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Selecting => "selecting",
            Self::ResolvingDetail => "resolving_detail",
            Self::Downloading => "downloading",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether a run or a candidate can leave this stage.
    ///
    /// On the progress stream, `Failed` with a candidate index only ends that
    /// candidate; see [`PipelineProgress::ends_run`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure annotated with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: SubtitleError,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, source: SubtitleError) -> Self {
        Self { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Progress update emitted on every stage transition.
///
/// Per-candidate events carry `candidate: Some(index)`. A candidate failure
/// is `Failed` with that index and is followed by more events; the run
/// itself ends with exactly one event for which [`ends_run`] is true.
///
/// [`ends_run`]: PipelineProgress::ends_run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineProgress {
    pub stage: PipelineStage,
    /// Candidate the transition belongs to, for per-candidate stages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<usize>,
    /// Error tag when `stage` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl PipelineProgress {
    /// Whether this is the last event of the run.
    pub fn ends_run(&self) -> bool {
        self.stage.is_terminal() && self.candidate.is_none()
    }
}

/// Terminal result for one chosen candidate.
#[derive(Debug)]
pub struct CandidateOutcome {
    pub index: usize,
    pub title: String,
    pub result: Result<Vec<PathBuf>, PipelineError>,
}

impl CandidateOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a pipeline run that got past search and selection.
#[derive(Debug)]
pub struct PipelineReport {
    pub provider: String,
    /// Directory files were written to; `None` when nothing was chosen.
    pub directory: Option<PathBuf>,
    pub outcomes: Vec<CandidateOutcome>,
}

impl PipelineReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Every downloaded path across successful candidates.
    pub fn downloaded_paths(&self) -> Vec<&PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CandidateOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
