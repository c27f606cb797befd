//! # File Input
//!
//! Path and size validation for every file the CLI reads.

use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum knowledge file size (16 MB).
pub const MAX_KNOWLEDGE_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum configuration file size (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolve `path` and make sure it names a regular file.
pub fn validate_file_path(path: &Path) -> AppResult<PathBuf> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if !canonical.is_file() {
        return Err(AppError::NotAFile(path.to_path_buf()));
    }
    Ok(canonical)
}

/// Reject files larger than `max` bytes before reading them.
pub fn validate_file_size(path: &Path, max: u64) -> AppResult<()> {
    let metadata = std::fs::metadata(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.len() > max {
        return Err(AppError::FileTooLarge {
            size: metadata.len(),
            max,
        });
    }
    Ok(())
}

/// Validate and read a UTF-8 file.
pub fn read_text_file(path: &Path, max: u64) -> AppResult<String> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, max)?;
    std::fs::read_to_string(&validated).map_err(|source| AppError::Io {
        path: validated,
        source,
    })
}

// =============================================================================
// TESTS
// =============================================================================
