//! Content fingerprint for media files.
//!
//! The signature samples four 4 KiB windows of the file and joins their MD5
//! digests with `;`. Bytes outside those windows do not contribute, so two
//! files that only differ elsewhere share a signature.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SubtitleError;

/// Size of each sampled window in bytes.
pub const CHUNK_SIZE: u64 = 4096;

/// Smallest file that can be fingerprinted.
pub const MIN_FILE_SIZE: u64 = CHUNK_SIZE * 3;

/// Content signature of a local media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFingerprint {
    /// Four lowercase hex MD5 digests joined with `;`.
    pub signature: String,
    /// File the signature was computed from.
    pub source_path: PathBuf,
}

/// Byte offsets of the sampled windows, in signature order.
pub fn sample_offsets(size: u64) -> [u64; 4] {
    [CHUNK_SIZE, size * 2 / 3, size / 3, size - CHUNK_SIZE * 2]
}

/// Compute the fingerprint of the file at `path`.
///
/// Fails with [`SubtitleError::TooSmall`] before reading any content when the
/// file is shorter than [`MIN_FILE_SIZE`].
pub fn fingerprint(path: &Path) -> Result<MediaFingerprint, SubtitleError> {
    let mut file = File::open(path).map_err(|e| SubtitleError::local_io(path, e))?;
    let size = file
        .seek(SeekFrom::End(0))
        .map_err(|e| SubtitleError::local_io(path, e))?;

    if size < MIN_FILE_SIZE {
        return Err(SubtitleError::TooSmall {
            size,
            minimum: MIN_FILE_SIZE,
        });
    }

    let mut buffer = vec![0u8; CHUNK_SIZE as usize];
    let mut digests = Vec::with_capacity(4);

    for offset in sample_offsets(size) {
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| SubtitleError::local_io(path, e))?;
        // read_exact refuses short reads with UnexpectedEof
        file.read_exact(&mut buffer)
            .map_err(|e| SubtitleError::local_io(path, e))?;
        digests.push(format!("{:x}", md5::compute(&buffer)));
    }

    let signature = digests.join(";");
    debug!(path = %path.display(), size, "Computed media fingerprint");

    Ok(MediaFingerprint {
        signature,
        source_path: path.to_path_buf(),
    })
}
