//! # Error Module
//!
//! Error types for the duplicate browser core.
//!
//! Nothing here is fatal. A failed scan becomes an empty list, a failed
//! thumbnail stays uncached, a failed trash lands in the delete report and
//! an undecodable preview becomes a placeholder. Variants carry the path
//! they concern.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),

    #[error("File operation error: {0}")]
    FileOp(#[from] FileOpError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while looking for duplicates in a directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan worker stopped before reporting a result")]
    Disconnected,
}

/// Errors that occur while generating a thumbnail
///
/// Cloneable because a single failed generation is delivered to every
/// request that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to extract a video frame from {path}: {reason}")]
    FrameExtraction { path: PathBuf, reason: String },

    #[error("No preview image can be generated for {path}")]
    Unsupported { path: PathBuf },

    #[error("Thumbnail generation for {path} was abandoned")]
    Abandoned { path: PathBuf },
}

/// Errors that occur while preparing a preview
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Failed to start playback of {path}: {reason}")]
    Playback { path: PathBuf, reason: String },

    #[error("No text encoding could decode {path}")]
    Undecodable { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by file-system collaborators
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("Failed to move {path} to the trash: {reason}")]
    Trash { path: PathBuf, reason: String },

    #[error("Failed to open {path}: {reason}")]
    Open { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn thumbnail_error_includes_reason() {
        let error = ThumbnailError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn file_op_error_converts_to_browser_error() {
        let error: BrowserError = FileOpError::Trash {
            path: PathBuf::from("/photos/a.jpg"),
            reason: "read-only volume".to_string(),
        }
        .into();
        assert!(matches!(error, BrowserError::FileOp(_)));
        assert!(error.to_string().contains("read-only volume"));
    }
}
