//! # Model Module
//!
//! Entries shown by the browser and the duplicate groups they come from.
//!
//! The detection collaborator hands over ordered [`DuplicateGroup`]s;
//! [`flatten_groups`] concatenates them into the row list, deriving the
//! group boundary flags. Entries are immutable: a new scan replaces the
//! whole list.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a file can be previewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Image,
    Video,
    Unpreviewable,
}

impl ContentType {
    /// Classify from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "tif" | "webp" | "heic" | "heif"
            | "ico" => ContentType::Image,
            "mp4" | "m4v" | "mov" | "avi" | "mkv" | "webm" | "wmv" | "flv" | "mpg" | "mpeg"
            | "3gp" => ContentType::Video,
            _ => ContentType::Unpreviewable,
        }
    }

    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(ContentType::Unpreviewable)
    }

    /// Whether a thumbnail can be generated for this content
    pub fn has_thumbnail(&self) -> bool {
        !matches!(self, ContentType::Unpreviewable)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Image => write!(f, "image"),
            ContentType::Video => write!(f, "video"),
            ContentType::Unpreviewable => write!(f, "unpreviewable"),
        }
    }
}

/// A file reported by the detection collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundFile {
    pub path: PathBuf,
    pub content_type: ContentType,
}

impl FoundFile {
    /// Create a file record, classifying it by extension
    pub fn classify(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = ContentType::from_path(&path);
        Self { path, content_type }
    }
}

/// Files sharing one fingerprint, in the order the detector reported them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub files: Vec<FoundFile>,
}

impl DuplicateGroup {
    pub fn new(files: Vec<FoundFile>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One row of the browser list.
///
/// Boundary flags are only ever derived by [`flatten_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    path: PathBuf,
    content_type: ContentType,
    group_index: usize,
    is_first_in_group: bool,
    is_last_in_group: bool,
}

impl Entry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn is_first_in_group(&self) -> bool {
        self.is_first_in_group
    }

    pub fn is_last_in_group(&self) -> bool {
        self.is_last_in_group
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Concatenate groups into a flat row list with derived boundary flags.
///
/// Empty groups are skipped and do not consume a group index.
pub fn flatten_groups(groups: &[DuplicateGroup]) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(groups.iter().map(DuplicateGroup::len).sum());

    for (group_index, group) in groups.iter().filter(|g| !g.is_empty()).enumerate() {
        let last = group.files.len() - 1;
        entries.extend(group.files.iter().enumerate().map(|(i, file)| Entry {
            path: file.path.clone(),
            content_type: file.content_type,
            group_index,
            is_first_in_group: i == 0,
            is_last_in_group: i == last,
        }));
    }

    entries
}
