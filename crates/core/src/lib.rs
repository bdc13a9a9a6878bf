pub mod config;
pub mod download;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod provider;
pub mod selection;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, AssrtConfig, Config, ConfigError,
    HttpConfig, SanitizedConfig, ShooterConfig, StorageConfig,
};
pub use download::{Downloader, FsTempStorage, TempStorage};
pub use error::{ErrorKind, SubtitleError};
pub use fingerprint::{fingerprint, MediaFingerprint};
pub use pipeline::{
    create_pipelines, CandidateOutcome, PipelineError, PipelineProgress, PipelineReport,
    PipelineStage, SubtitlePipeline,
};
pub use provider::{
    create_providers, search_providers, AssrtProvider, AssrtStatus, CredentialProvider,
    PayloadTarget, ProviderResults, RemoteFile, SearchCriteria, ShooterProvider,
    StaticCredential, SubtitleCandidate, SubtitleProvider,
};
pub use selection::{ChoiceResponder, Chooser, SelectionGate};
