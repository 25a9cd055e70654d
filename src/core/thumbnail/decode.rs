//! Full-file image decoding.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than the image crate),
//! falls back to the image crate for everything else or when zune fails.

use crate::error::ThumbnailError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}

fn decode_error(path: &Path, reason: impl Into<String>) -> ThumbnailError {
    ThumbnailError::Decode {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Decode an image file completely
pub fn decode_image(path: &Path) -> Result<DynamicImage, ThumbnailError> {
    if is_jpeg(path) {
        decode_jpeg(path).or_else(|_| decode_fallback(path))
    } else {
        decode_fallback(path)
    }
}

fn decode_jpeg(path: &Path) -> Result<DynamicImage, ThumbnailError> {
    let file_bytes = fs::read(path).map_err(|e| decode_error(path, e.to_string()))?;

    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
    let mut decoder = JpegDecoder::new_with_options(&file_bytes, options);

    let pixels = decoder
        .decode()
        .map_err(|e| decode_error(path, format!("zune-jpeg decode failed: {:?}", e)))?;

    let info = decoder
        .info()
        .ok_or_else(|| decode_error(path, "missing JPEG header info"))?;
    let (width, height) = (info.width as u32, info.height as u32);

    let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
        ColorSpace::RGB => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8),
        ColorSpace::RGBA => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8),
        ColorSpace::Luma => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, pixels)
            .map(DynamicImage::ImageLuma8),
        other => {
            return Err(decode_error(
                path,
                format!("unsupported colorspace {:?}", other),
            ))
        }
    };

    image.ok_or_else(|| decode_error(path, "pixel buffer does not match dimensions"))
}

fn decode_fallback(path: &Path) -> Result<DynamicImage, ThumbnailError> {
    image::open(path).map_err(|e| decode_error(path, e.to_string()))
}
