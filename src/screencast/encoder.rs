//! Per-frame encoding into scratch storage
//!
//! Frames are stored at the profile's color depth and still-image format,
//! then decoded again when the animation is assembled.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, RgbaImage};

use crate::config::{CaptureMode, ColorMode, FrameFormat};
use crate::error::RecordError;

/// File extension for frames stored in `format`
pub fn frame_extension(format: FrameFormat) -> &'static str {
    match format {
        FrameFormat::Png { .. } => "png",
        FrameFormat::Jpeg { .. } => "jpg",
    }
}

/// PNG compression matching a zlib level
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode `frame` for `mode` and write it to `path`
pub fn write_frame(frame: &RgbaImage, mode: &CaptureMode, path: &Path) -> Result<(), RecordError> {
    let file = File::create(path).map_err(RecordError::Scratch)?;
    let writer = BufWriter::new(file);

    // JPEG carries no alpha, whatever the profile says
    let keep_alpha = mode.color == ColorMode::Rgba && matches!(mode.format, FrameFormat::Png { .. });

    match mode.format {
        FrameFormat::Png { compression } => {
            let encoder = PngEncoder::new_with_quality(
                writer,
                png_compression(compression),
                FilterType::Adaptive,
            );
            if keep_alpha {
                encoder.write_image(
                    frame.as_raw(),
                    frame.width(),
                    frame.height(),
                    image::ExtendedColorType::Rgba8,
                )?;
            } else {
                let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
                encoder.write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )?;
            }
        }
        FrameFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
            encoder.write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(())
}

/// Decode a stored frame back to RGBA
pub fn read_frame(path: &Path) -> Result<RgbaImage, RecordError> {
    Ok(image::open(path)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frame() -> RgbaImage {
        RgbaImage::from_fn(8, 6, |x, y| Rgba([(x * 30) as u8, (y * 40) as u8, 90, 255]))
    }

    #[test]
    fn test_every_profile_writes_a_decodable_frame() {
        let dir = tempfile::tempdir().unwrap();
        for mode in CaptureMode::ALL {
            let path = dir
                .path()
                .join(format!("frame.{}", frame_extension(mode.format)));
            write_frame(&frame(), &mode, &path).unwrap();
            let decoded = read_frame(&path).unwrap();
            assert_eq!(decoded.dimensions(), (8, 6), "{}", mode.name);
        }
    }

    #[test]
    fn test_png_profiles_are_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_frame(&frame(), &CaptureMode::NORMAL, &path).unwrap();
        assert_eq!(read_frame(&path).unwrap(), frame());
    }

    #[test]
    fn test_missing_scratch_dir_is_scratch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("frame.png");
        let result = write_frame(&frame(), &CaptureMode::NORMAL, &path);
        assert!(matches!(result, Err(RecordError::Scratch(_))));
    }
}
