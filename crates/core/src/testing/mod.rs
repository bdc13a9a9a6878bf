//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the provider, chooser and
//! storage seams, allowing pipeline tests without real subtitle services.
//!
//! # Example
//!
//! ```rust,ignore
//! use subgrab_core::testing::{fixtures, MemoryStorage, MockProvider, ScriptedChooser};
//!
//! let provider = MockProvider::new("mock");
//! provider.set_results(vec![fixtures::unresolved_candidate(0, "mock", 42, "Movie")]).await;
//! provider.set_detail_target(42, fixtures::single_file("http://host/movie.srt", "movie.srt")).await;
//!
//! let chooser = ScriptedChooser::choosing(vec![0]);
//! let storage = MemoryStorage::new();
//! ```

mod mock_chooser;
mod mock_provider;
mod mock_storage;

pub use mock_chooser::ScriptedChooser;
pub use mock_provider::MockProvider;
pub use mock_storage::MemoryStorage;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::provider::{PayloadTarget, RemoteFile, SubtitleCandidate};

    /// Candidate as a two-step provider returns it from search.
    pub fn unresolved_candidate(
        index: usize,
        provider: &str,
        provider_id: i64,
        title: &str,
    ) -> SubtitleCandidate {
        let mut candidate = SubtitleCandidate::new(index, provider);
        candidate.provider_id = Some(provider_id);
        candidate.title = title.to_string();
        candidate.uploaded_at = "2024-01-01 00:00:00".to_string();
        candidate.format_hint = "SRT".to_string();
        candidate.language_hint = "eng".to_string();
        candidate
    }

    /// Candidate that already points at one named file.
    pub fn resolved_candidate(
        index: usize,
        provider: &str,
        url: &str,
        filename: &str,
    ) -> SubtitleCandidate {
        let mut candidate = SubtitleCandidate::new(index, provider);
        candidate.title = filename.to_string();
        candidate.target = single_file(url, filename);
        candidate
    }

    /// Candidate with several named files.
    pub fn multi_file_candidate(
        index: usize,
        provider: &str,
        files: &[(&str, &str)],
    ) -> SubtitleCandidate {
        let mut candidate = SubtitleCandidate::new(index, provider);
        candidate.title = format!("{} files", files.len());
        candidate.target = multi_file(files);
        candidate
    }

    pub fn single_file(url: &str, filename: &str) -> PayloadTarget {
        PayloadTarget::SingleFile {
            file: RemoteFile::named(url, filename),
        }
    }

    pub fn multi_file(files: &[(&str, &str)]) -> PayloadTarget {
        PayloadTarget::MultiFile {
            files: files
                .iter()
                .map(|(url, name)| RemoteFile::named(*url, *name))
                .collect(),
        }
    }
}
