//! Byte-identical duplicate detection.
//!
//! Three filters, cheapest first:
//! 1. **Size**: files with a unique size cannot be duplicates
//! 2. **Prefix**: xxh3 of the first 4KB
//! 3. **Content**: xxh3-128 of the whole file (memory-mapped when large)

use super::DuplicateDetector;
use crate::core::model::{DuplicateGroup, FoundFile};
use crate::error::ScanError;
use memmap2::Mmap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use xxhash_rust::xxh3::{xxh3_128, xxh3_64};

/// Size of prefix to hash for preliminary filtering (4KB)
const PREFIX_SIZE: usize = 4096;

/// Minimum file size to use memory-mapped I/O
const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1MB

/// Configuration for the content hash detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Files smaller than this are ignored (empty files are all "equal")
    pub min_size: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
            min_size: 1,
        }
    }
}

/// Detector that groups files with identical contents
#[derive(Debug, Clone, Default)]
pub struct ContentHashDetector {
    config: DetectorConfig,
}

#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    size: u64,
}

impl ContentHashDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
    }

    fn collect_files(&self, root: &Path) -> Result<Vec<Candidate>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let mut files = Vec::new();

        for entry_result in walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !Self::is_hidden(e.path()))
        {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    match entry.metadata() {
                        Ok(metadata) if metadata.len() >= self.config.min_size => {
                            files.push(Candidate {
                                path: entry.into_path(),
                                size: metadata.len(),
                            });
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
                    }
                }
                Err(e) => {
                    if e.depth() == 0 {
                        let path = root.to_path_buf();
                        return Err(match e.io_error().map(|io| io.kind()) {
                            Some(std::io::ErrorKind::PermissionDenied) => {
                                ScanError::PermissionDenied { path }
                            }
                            _ => ScanError::Read {
                                path,
                                source: std::io::Error::other(e.to_string()),
                            },
                        });
                    }
                    warn!("Skipping unreadable entry: {}", e);
                }
            }
        }

        Ok(files)
    }
}

/// Keep only buckets with two or more members.
fn multi_member<K: std::hash::Hash + Eq>(
    items: impl IntoIterator<Item = (K, Candidate)>,
) -> Vec<Vec<Candidate>> {
    let mut buckets: HashMap<K, Vec<Candidate>> = HashMap::new();
    for (key, item) in items {
        buckets.entry(key).or_default().push(item);
    }
    buckets.into_values().filter(|b| b.len() >= 2).collect()
}

fn prefix_hash(path: &Path) -> Option<u64> {
    let mut file = File::open(path).ok()?;
    let mut buffer = [0u8; PREFIX_SIZE];
    let mut filled = 0;
    while filled < PREFIX_SIZE {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return None,
        }
    }
    Some(xxh3_64(&buffer[..filled]))
}

fn content_hash(path: &Path, size: u64) -> Option<u128> {
    if size >= MMAP_THRESHOLD {
        let file = File::open(path).ok()?;
        // SAFETY: the map is read-only and dropped before returning; a file
        // truncated underneath us yields a wrong hash, not undefined reads
        // through safe code we hand out.
        let map = unsafe { Mmap::map(&file) }.ok()?;
        Some(xxh3_128(&map))
    } else {
        fs::read(path).ok().map(|bytes| xxh3_128(&bytes))
    }
}

impl DuplicateDetector for ContentHashDetector {
    fn find_duplicates(&self, directory: &Path) -> Result<Vec<DuplicateGroup>, ScanError> {
        let files = self.collect_files(directory)?;
        let total = files.len();

        let by_size = multi_member(files.into_iter().map(|c| (c.size, c)));

        let by_prefix: Vec<Vec<Candidate>> = by_size
            .into_par_iter()
            .flat_map_iter(|bucket| {
                let hashed: Vec<_> = bucket
                    .into_iter()
                    .filter_map(|c| prefix_hash(&c.path).map(|h| (h, c)))
                    .collect();
                multi_member(hashed)
            })
            .collect();

        let mut groups: Vec<Vec<PathBuf>> = by_prefix
            .into_par_iter()
            .flat_map_iter(|bucket| {
                let hashed: Vec<_> = bucket
                    .into_iter()
                    .filter_map(|c| content_hash(&c.path, c.size).map(|h| (h, c)))
                    .collect();
                multi_member(hashed)
                    .into_iter()
                    .map(|group| {
                        let mut paths: Vec<PathBuf> = group.into_iter().map(|c| c.path).collect();
                        paths.sort();
                        paths
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        groups.sort();

        debug!(
            "{} files under {}, {} duplicate groups",
            total,
            directory.display(),
            groups.len()
        );

        Ok(groups
            .into_iter()
            .map(|paths| DuplicateGroup::new(paths.into_iter().map(FoundFile::classify).collect()))
            .collect())
    }
}
