//! # Thumbnail Module
//!
//! Generates row thumbnails off the foreground path and memoizes them.
//!
//! ## Pieces
//! - [`ThumbnailCache`] - get-or-create with one shared generation per key
//! - [`ThumbnailStore`] - the injected, best-effort key -> image store
//! - [`ThumbnailGenerator`] - image decode / video frame extraction
//! - [`ThumbnailSlots`] - foreground slot table that refuses stale deliveries
//!
//! ## Key lifecycle
//! `uncached -> generating -> cached` on success, back to `uncached` on
//! failure so that the next request retries.

mod cache;
mod decode;
mod generator;
mod slots;
mod store;

pub use cache::ThumbnailCache;
pub use decode::decode_image;
pub use generator::{
    DefaultThumbnailGenerator, FfmpegFrameExtractor, ThumbnailGenerator, VideoFrameExtractor,
    DEFAULT_FRAME_OFFSET,
};
pub use slots::{SlotBinding, SlotId, SlotImage, ThumbnailSlots};
pub use store::{InMemoryThumbnailStore, ThumbnailStore};

use crate::error::ThumbnailError;
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Resource key of a thumbnail: the file it was generated from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThumbnailKey(PathBuf);

impl ThumbnailKey {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<&Path> for ThumbnailKey {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// A decoded preview image
#[derive(Debug)]
pub struct Thumbnail {
    key: ThumbnailKey,
    image: DynamicImage,
}

impl Thumbnail {
    pub fn new(key: ThumbnailKey, image: DynamicImage) -> Self {
        Self { key, image }
    }

    pub fn key(&self) -> &ThumbnailKey {
        &self.key
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Decoded size in bytes
    pub fn byte_size(&self) -> usize {
        self.image.as_bytes().len()
    }
}

/// Outcome of one generation, shared by every request that waited on it
pub type ThumbnailResult = Result<Arc<Thumbnail>, ThumbnailError>;

/// Answer to [`ThumbnailCache::get_or_create`]
#[derive(Debug)]
pub enum ThumbnailFetch {
    /// Already stored
    Ready(Arc<Thumbnail>),
    /// Being generated; the result arrives through the handle
    Pending(PendingThumbnail),
    /// No thumbnail exists for this content type
    Unsupported,
}

/// Handle to a thumbnail that is being generated.
///
/// Dropping the handle does not cancel anything; the generation still
/// completes and fills the store.
#[derive(Debug)]
pub struct PendingThumbnail {
    key: ThumbnailKey,
    receiver: Receiver<ThumbnailResult>,
}

impl PendingThumbnail {
    pub(crate) fn new(key: ThumbnailKey, receiver: Receiver<ThumbnailResult>) -> Self {
        Self { key, receiver }
    }

    pub fn key(&self) -> &ThumbnailKey {
        &self.key
    }

    fn abandoned(&self) -> ThumbnailResult {
        Err(ThumbnailError::Abandoned {
            path: self.key.path().to_path_buf(),
        })
    }

    /// Take the result if it has arrived
    pub fn try_take(&self) -> Option<ThumbnailResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.abandoned()),
        }
    }

    /// Block until the result arrives
    pub fn wait(self) -> ThumbnailResult {
        self.receiver.recv().unwrap_or_else(|_| self.abandoned())
    }

    /// Block for at most `timeout`; `None` if the result is still pending
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ThumbnailResult> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.abandoned()),
        }
    }
}
