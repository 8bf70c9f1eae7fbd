//! Whole-file reading for the transform pipeline
//!
//! Handles the cases that must not reach the rule engine:
//! - Empty files (ignored)
//! - Non-UTF-8 or binary files (passed through unchanged)
//! - Oversized files (passed through unchanged)

use std::fs;
use std::path::Path;

/// Default maximum file size in bytes (64 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Why a file is not transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    Binary,
    NotUtf8,
    TooLarge,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Empty => "EMPTY_FILE",
            SkipReason::Binary => "BINARY_FILE",
            SkipReason::NotUtf8 => "FILE_SKIPPED_ENCODING",
            SkipReason::TooLarge => "FILE_SKIPPED_SIZE",
        }
    }
}

/// Result of reading a file
#[derive(Debug, Clone)]
pub enum FileContent {
    /// UTF-8 text ready for transformation
    Text(String),
    /// Raw bytes that must be passed through untouched
    Skipped { reason: SkipReason, bytes: Vec<u8> },
}

impl FileContent {
    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(text) => text.len(),
            FileContent::Skipped { bytes, .. } => bytes.len(),
        }
    }
}

/// Classify raw bytes
pub fn classify(bytes: Vec<u8>, max_file_size: u64) -> FileContent {
    if bytes.is_empty() {
        return FileContent::Skipped {
            reason: SkipReason::Empty,
            bytes,
        };
    }

    if bytes.len() as u64 > max_file_size {
        return FileContent::Skipped {
            reason: SkipReason::TooLarge,
            bytes,
        };
    }

    // Binary if null bytes appear in the first 8KB
    let check_len = std::cmp::min(8192, bytes.len());
    if bytes[..check_len].contains(&0) {
        return FileContent::Skipped {
            reason: SkipReason::Binary,
            bytes,
        };
    }

    match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(e) => FileContent::Skipped {
            reason: SkipReason::NotUtf8,
            bytes: e.into_bytes(),
        },
    }
}

/// Read and classify a file
pub fn read_document(path: &Path, max_file_size: u64) -> std::io::Result<FileContent> {
    let bytes = fs::read(path)?;
    Ok(classify(bytes, max_file_size))
}
