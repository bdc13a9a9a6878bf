//! Pipeline coordinator.
//!
//! Composes a provider, the selection gate and the downloader into the
//! `Searching -> Selecting -> ResolvingDetail -> Downloading -> Done | Failed`
//! flow. Stages never retry; every failure carries the stage it came from.

mod coordinator;
mod types;

pub use coordinator::{create_pipelines, SubtitlePipeline};
pub use types::{CandidateOutcome, PipelineError, PipelineProgress, PipelineReport, PipelineStage};
