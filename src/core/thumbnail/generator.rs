//! Content-type specific thumbnail generators.

use super::decode::decode_image;
use crate::core::model::ContentType;
use crate::error::ThumbnailError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Where in a video the representative frame is taken from
pub const DEFAULT_FRAME_OFFSET: Duration = Duration::from_secs(1);

/// Produces the image stored for a key.
///
/// Runs on worker threads, never on the foreground.
pub trait ThumbnailGenerator: Send + Sync {
    fn generate(
        &self,
        path: &Path,
        content_type: ContentType,
    ) -> Result<DynamicImage, ThumbnailError>;
}

/// Extracts a single frame from a video file
pub trait VideoFrameExtractor: Send + Sync {
    /// Extract the frame at exactly `offset` (no seek tolerance)
    fn extract_frame(&self, path: &Path, offset: Duration) -> Result<DynamicImage, ThumbnailError>;
}

/// Frame extraction through the `ffmpeg` command line tool.
///
/// `-ss` is placed after `-i` so ffmpeg decodes up to the exact timestamp
/// instead of snapping to the previous keyframe.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    program: PathBuf,
}

impl FfmpegFrameExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn failure(path: &Path, reason: impl Into<String>) -> ThumbnailError {
        ThumbnailError::FrameExtraction {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl VideoFrameExtractor for FfmpegFrameExtractor {
    fn extract_frame(&self, path: &Path, offset: Duration) -> Result<DynamicImage, ThumbnailError> {
        let frame_file = tempfile::Builder::new()
            .prefix("dupe-browser-frame-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Self::failure(path, format!("no temp file: {}", e)))?;

        let output = Command::new(&self.program)
            .args(["-v", "error", "-nostdin", "-y", "-i"])
            .arg(path)
            .args(["-ss", &format!("{:.3}", offset.as_secs_f64())])
            .args(["-frames:v", "1", "-f", "image2", "-c:v", "png"])
            .arg(frame_file.path())
            .output()
            .map_err(|e| {
                Self::failure(
                    path,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::failure(path, stderr.trim().to_string()));
        }

        // A clip shorter than the offset exits cleanly without writing a frame.
        image::open(frame_file.path())
            .map_err(|e| Self::failure(path, format!("no frame at {:?}: {}", offset, e)))
    }
}

/// Default generator: full decode for images, one frame for videos
pub struct DefaultThumbnailGenerator {
    frames: Box<dyn VideoFrameExtractor>,
    frame_offset: Duration,
    max_edge: Option<u32>,
}

impl DefaultThumbnailGenerator {
    pub fn new(frames: Box<dyn VideoFrameExtractor>) -> Self {
        Self {
            frames,
            frame_offset: DEFAULT_FRAME_OFFSET,
            max_edge: None,
        }
    }

    /// Take video frames at a different offset
    pub fn frame_offset(mut self, offset: Duration) -> Self {
        self.frame_offset = offset;
        self
    }

    /// Downscale stored thumbnails so neither side exceeds `max_edge`
    pub fn max_edge(mut self, max_edge: Option<u32>) -> Self {
        self.max_edge = max_edge.filter(|edge| *edge > 0);
        self
    }

    fn fit(&self, image: DynamicImage) -> DynamicImage {
        match self.max_edge {
            Some(edge) if image.width() > edge || image.height() > edge => {
                image.thumbnail(edge, edge)
            }
            _ => image,
        }
    }
}

impl Default for DefaultThumbnailGenerator {
    fn default() -> Self {
        Self::new(Box::new(FfmpegFrameExtractor::default()))
    }
}

impl ThumbnailGenerator for DefaultThumbnailGenerator {
    fn generate(
        &self,
        path: &Path,
        content_type: ContentType,
    ) -> Result<DynamicImage, ThumbnailError> {
        let image = match content_type {
            ContentType::Image => decode_image(path)?,
            ContentType::Video => self.frames.extract_frame(path, self.frame_offset)?,
            ContentType::Unpreviewable => {
                return Err(ThumbnailError::Unsupported {
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(self.fit(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct RecordingExtractor {
        offsets: Arc<Mutex<Vec<Duration>>>,
    }

    impl VideoFrameExtractor for RecordingExtractor {
        fn extract_frame(&self, _path: &Path, offset: Duration) -> Result<DynamicImage, ThumbnailError> {
            self.offsets.lock().unwrap().push(offset);
            Ok(DynamicImage::new_rgb8(64, 32))
        }
    }

    #[test]
    fn video_frames_are_taken_one_second_in() {
        let offsets = Arc::new(Mutex::new(Vec::new()));
        let generator = DefaultThumbnailGenerator::new(Box::new(RecordingExtractor {
            offsets: offsets.clone(),
        }));

        let frame = generator
            .generate(Path::new("/clips/b1.mp4"), ContentType::Video)
            .unwrap();

        assert_eq!(frame.width(), 64);
        assert_eq!(offsets.lock().unwrap().as_slice(), &[Duration::from_secs(1)]);
    }

    #[test]
    fn unpreviewable_content_is_unsupported() {
        let generator = DefaultThumbnailGenerator::default();
        let result = generator.generate(Path::new("/docs/notes.txt"), ContentType::Unpreviewable);
        assert!(matches!(result, Err(ThumbnailError::Unsupported { .. })));
    }

    #[test]
    fn max_edge_downscales_large_images() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::from_pixel(40, 20, Rgb([1, 2, 3])).save(&path).unwrap();

        let generator = DefaultThumbnailGenerator::default().max_edge(Some(10));
        let image = generator.generate(&path, ContentType::Image).unwrap();
        assert_eq!((image.width(), image.height()), (10, 5));

        let untouched = DefaultThumbnailGenerator::default()
            .generate(&path, ContentType::Image)
            .unwrap();
        assert_eq!(untouched.width(), 40);
    }

    #[test]
    fn missing_ffmpeg_reports_frame_extraction_failure() {
        let extractor = FfmpegFrameExtractor::new("/nonexistent/bin/ffmpeg-missing");
        let result = extractor.extract_frame(Path::new("/clips/b1.mp4"), DEFAULT_FRAME_OFFSET);
        assert!(matches!(result, Err(ThumbnailError::FrameExtraction { .. })));
    }
}
