//! # Detector Module
//!
//! The duplicate-detection collaborator consumed by the scan session.
//!
//! The browser core only needs ordered groups of `{path, content type}`;
//! how files are judged equal is up to the implementation. The default
//! [`ContentHashDetector`] groups byte-identical files.
//!
//! ## Example
//! ```rust,ignore
//! use dupe_browser::core::detector::{ContentHashDetector, DuplicateDetector};
//!
//! let detector = ContentHashDetector::default();
//! let groups = detector.find_duplicates(Path::new("/Users/me/Downloads"))?;
//! ```

mod content_hash;

pub use content_hash::{ContentHashDetector, DetectorConfig};

use crate::core::model::DuplicateGroup;
use crate::error::ScanError;
use std::path::Path;

/// Trait for duplicate detectors
///
/// Implement this trait to plug in another notion of "duplicate"
/// (perceptual similarity, external services, fixtures for testing).
pub trait DuplicateDetector: Send + Sync {
    /// Find groups of duplicates under a directory.
    ///
    /// Groups and the files inside them are returned in display order.
    /// A directory without duplicates yields an empty vector.
    fn find_duplicates(&self, directory: &Path) -> Result<Vec<DuplicateGroup>, ScanError>;
}

impl<F> DuplicateDetector for F
where
    F: Fn(&Path) -> Result<Vec<DuplicateGroup>, ScanError> + Send + Sync,
{
    fn find_duplicates(&self, directory: &Path) -> Result<Vec<DuplicateGroup>, ScanError> {
        self(directory)
    }
}
