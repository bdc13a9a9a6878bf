//! Download orchestration for resolved subtitle candidates.
//!
//! # Features
//!
//! - Concurrent fetch of multi-file candidates with an all-or-nothing result
//! - Local names prefixed with the candidate index (`[3]movie.srt`) so
//!   candidates sharing a directory never collide
//! - File names from `Content-Disposition` for providers that only give links
//! - Pluggable [`TempStorage`] for where bytes end up

mod downloader;
mod filename;
mod storage;

pub use downloader::Downloader;
pub use filename::{indexed_file_name, local_file_name, parse_content_disposition};
pub use storage::{FsTempStorage, TempStorage};
