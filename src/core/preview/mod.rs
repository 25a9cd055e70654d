//! # Preview Module
//!
//! Turns "show this entry" (or "show nothing") into something the preview
//! region can render, chosen by content type:
//!
//! | Content        | Preview                                  |
//! |----------------|------------------------------------------|
//! | Image          | decoded image                            |
//! | Video          | auto-started playback                    |
//! | Unpreviewable  | decoded text, or an "unavailable" notice |
//!
//! The dispatcher owns at most one playback resource. Every transition
//! stops the current one before anything else happens.

mod text;

pub use text::{ChainedTextDecoder, DecodedText, TextDecoder, TextEncoding};

use crate::core::model::{ContentType, Entry};
use crate::core::thumbnail::decode_image;
use crate::error::PreviewError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A live playback resource
pub trait Playback: Send {
    /// The file being played
    fn path(&self) -> &Path;

    /// Stop playback and release the underlying resource
    fn stop(&mut self);
}

/// Starts playback for video previews
pub trait PlaybackBackend: Send + Sync {
    /// Start playing immediately
    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, PreviewError>;
}

/// Playback backend with no output device.
///
/// Tracks how many of its resources are alive, which is all a headless
/// shell (or a test) can observe about playback.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlaybackBackend {
    live: Arc<AtomicUsize>,
}

impl HeadlessPlaybackBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of started and not yet stopped playbacks
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

struct HeadlessPlayback {
    path: PathBuf,
    live: Option<Arc<AtomicUsize>>,
}

impl Playback for HeadlessPlayback {
    fn path(&self) -> &Path {
        &self.path
    }

    fn stop(&mut self) {
        if let Some(live) = self.live.take() {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for HeadlessPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PlaybackBackend for HeadlessPlaybackBackend {
    fn start(&self, path: &Path) -> Result<Box<dyn Playback>, PreviewError> {
        if !path.exists() {
            return Err(PreviewError::Playback {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(HeadlessPlayback {
            path: path.to_path_buf(),
            live: Some(Arc::clone(&self.live)),
        }))
    }
}

/// What the preview region should render
#[derive(Debug, Clone, Default)]
pub enum Preview {
    /// Nothing selected, or several entries selected
    #[default]
    Empty,
    Image {
        path: PathBuf,
        image: Arc<DynamicImage>,
    },
    /// Playback has been started by the dispatcher
    Video { path: PathBuf },
    Text {
        path: PathBuf,
        content: String,
        encoding: TextEncoding,
    },
    /// Nothing could be decoded; offer to open the file externally
    Unavailable { path: PathBuf },
}

impl Preview {
    /// Path of the previewed file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Preview::Empty => None,
            Preview::Image { path, .. }
            | Preview::Video { path }
            | Preview::Text { path, .. }
            | Preview::Unavailable { path } => Some(path),
        }
    }

    /// Short name of the render mode
    pub fn kind(&self) -> &'static str {
        match self {
            Preview::Empty => "empty",
            Preview::Image { .. } => "image",
            Preview::Video { .. } => "video",
            Preview::Text { .. } => "text",
            Preview::Unavailable { .. } => "unavailable",
        }
    }
}

/// Dispatches previews and owns the single playback slot
pub struct PreviewDispatcher {
    playback: Box<dyn PlaybackBackend>,
    text: Box<dyn TextDecoder>,
    active: Option<Box<dyn Playback>>,
    current: Preview,
}

impl PreviewDispatcher {
    pub fn new(playback: Box<dyn PlaybackBackend>, text: Box<dyn TextDecoder>) -> Self {
        Self {
            playback,
            text,
            active: None,
            current: Preview::Empty,
        }
    }

    /// Show an entry, or nothing
    pub fn show(&mut self, entry: Option<&Entry>) -> &Preview {
        self.release_playback();

        self.current = match entry {
            None => Preview::Empty,
            Some(entry) => self.load(entry),
        };
        &self.current
    }

    /// The preview region disappeared; stop playback but keep the preview
    pub fn hide(&mut self) {
        self.release_playback();
    }

    /// The preview currently shown
    pub fn current(&self) -> &Preview {
        &self.current
    }

    /// Path bound to the "open externally" action of an unavailable preview
    pub fn external_target(&self) -> Option<&Path> {
        match &self.current {
            Preview::Unavailable { path } => Some(path),
            _ => None,
        }
    }

    /// Whether a playback resource is alive
    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    fn release_playback(&mut self) {
        if let Some(mut playback) = self.active.take() {
            debug!("Stopping playback of {}", playback.path().display());
            playback.stop();
        }
    }

    fn load(&mut self, entry: &Entry) -> Preview {
        let path = entry.path().to_path_buf();
        match entry.content_type() {
            ContentType::Image => match decode_image(&path) {
                Ok(image) => Preview::Image {
                    path,
                    image: Arc::new(image),
                },
                Err(e) => {
                    warn!("Image preview failed: {}", e);
                    Preview::Unavailable { path }
                }
            },
            ContentType::Video => match self.playback.start(&path) {
                Ok(playback) => {
                    self.active = Some(playback);
                    Preview::Video { path }
                }
                Err(e) => {
                    warn!("Video preview failed: {}", e);
                    Preview::Unavailable { path }
                }
            },
            ContentType::Unpreviewable => match self.text.decode(&path) {
                Ok(DecodedText { content, encoding }) => Preview::Text {
                    path,
                    content,
                    encoding,
                },
                Err(e) => {
                    debug!("Text preview failed: {}", e);
                    Preview::Unavailable { path }
                }
            },
        }
    }
}

impl Default for PreviewDispatcher {
    fn default() -> Self {
        Self::new(
            Box::new(HeadlessPlaybackBackend::new()),
            Box::new(ChainedTextDecoder),
        )
    }
}
