//! Browser configuration and wiring.

use super::view::{DetachedView, PreviewView, StatusView};
use super::SelectionCoordinator;
use crate::core::detector::{ContentHashDetector, DetectorConfig, DuplicateDetector};
use crate::core::fileops::{FileOperations, SystemFileOperations};
use crate::core::preview::{
    ChainedTextDecoder, HeadlessPlaybackBackend, PlaybackBackend, PreviewDispatcher, TextDecoder,
};
use crate::core::scan::DirectoryScanSession;
use crate::core::thumbnail::{
    DefaultThumbnailGenerator, FfmpegFrameExtractor, InMemoryThumbnailStore, ThumbnailCache,
    ThumbnailGenerator, ThumbnailStore, DEFAULT_FRAME_OFFSET,
};
use crate::error::Result;
use crate::events::{null_sender, EventSender};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the default collaborators
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Thumbnail worker threads (0 = rayon's global pool)
    pub thumbnail_workers: usize,
    /// Where video thumbnails are taken from
    pub frame_offset: Duration,
    /// Downscale stored thumbnails to this edge length (None = full size)
    pub thumbnail_max_edge: Option<u32>,
    /// ffmpeg binary used for video frames
    pub ffmpeg_program: PathBuf,
    /// Directory traversal of the default detector
    pub detector: DetectorConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            thumbnail_workers: 0,
            frame_offset: DEFAULT_FRAME_OFFSET,
            thumbnail_max_edge: None,
            ffmpeg_program: PathBuf::from("ffmpeg"),
            detector: DetectorConfig::default(),
        }
    }
}

/// Builder for a [`SelectionCoordinator`]
///
/// Every collaborator defaults to the crate's own adapter; inject your own
/// to replace it.
pub struct BrowserBuilder {
    config: BrowserConfig,
    events: EventSender,
    detector: Option<Arc<dyn DuplicateDetector>>,
    file_ops: Option<Arc<dyn FileOperations>>,
    generator: Option<Arc<dyn ThumbnailGenerator>>,
    store: Option<Arc<dyn ThumbnailStore>>,
    playback: Option<Box<dyn PlaybackBackend>>,
    text: Option<Box<dyn TextDecoder>>,
    preview_view: Option<Box<dyn PreviewView>>,
    status_view: Option<Box<dyn StatusView>>,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
            events: null_sender(),
            detector: None,
            file_ops: None,
            generator: None,
            store: None,
            playback: None,
            text: None,
            preview_view: None,
            status_view: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: BrowserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn thumbnail_workers(mut self, workers: usize) -> Self {
        self.config.thumbnail_workers = workers;
        self
    }

    pub fn frame_offset(mut self, offset: Duration) -> Self {
        self.config.frame_offset = offset;
        self
    }

    pub fn thumbnail_max_edge(mut self, edge: Option<u32>) -> Self {
        self.config.thumbnail_max_edge = edge;
        self
    }

    pub fn ffmpeg_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_program = program.into();
        self
    }

    /// Report activity through an event channel
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn detector(mut self, detector: Arc<dyn DuplicateDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn file_operations(mut self, file_ops: Arc<dyn FileOperations>) -> Self {
        self.file_ops = Some(file_ops);
        self
    }

    pub fn thumbnail_generator(mut self, generator: Arc<dyn ThumbnailGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn thumbnail_store(mut self, store: Arc<dyn ThumbnailStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn playback(mut self, playback: Box<dyn PlaybackBackend>) -> Self {
        self.playback = Some(playback);
        self
    }

    pub fn text_decoder(mut self, text: Box<dyn TextDecoder>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn preview_view(mut self, view: impl PreviewView + 'static) -> Self {
        self.preview_view = Some(Box::new(view));
        self
    }

    pub fn status_view(mut self, view: impl StatusView + 'static) -> Self {
        self.status_view = Some(Box::new(view));
        self
    }

    /// Wire everything up
    pub fn build(self) -> Result<SelectionCoordinator> {
        let config = self.config;

        let detector = self
            .detector
            .unwrap_or_else(|| Arc::new(ContentHashDetector::new(config.detector.clone())));
        let generator = self.generator.unwrap_or_else(|| {
            Arc::new(
                DefaultThumbnailGenerator::new(Box::new(FfmpegFrameExtractor::new(
                    config.ffmpeg_program.clone(),
                )))
                .frame_offset(config.frame_offset)
                .max_edge(config.thumbnail_max_edge),
            )
        });
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryThumbnailStore::new()));

        let mut thumbnails = ThumbnailCache::new(generator, store).with_events(self.events.clone());
        if config.thumbnail_workers > 0 {
            thumbnails = thumbnails.with_workers(config.thumbnail_workers)?;
        }

        let preview = PreviewDispatcher::new(
            self.playback
                .unwrap_or_else(|| Box::new(HeadlessPlaybackBackend::new())),
            self.text.unwrap_or_else(|| Box::new(ChainedTextDecoder)),
        );

        Ok(SelectionCoordinator::assemble(
            DirectoryScanSession::new(detector).with_events(self.events.clone()),
            thumbnails,
            preview,
            self.file_ops
                .unwrap_or_else(|| Arc::new(SystemFileOperations)),
            self.preview_view
                .unwrap_or_else(|| Box::new(DetachedView)),
            self.status_view
                .unwrap_or_else(|| Box::new(DetachedView)),
            self.events,
        ))
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
