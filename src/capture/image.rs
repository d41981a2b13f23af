//! Still image export

use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::SessionError;

/// File name for a still exported now
pub fn still_file_name() -> String {
    chrono::Local::now()
        .format("Screenshot_%Y-%m-%d_%H-%M-%S.png")
        .to_string()
}

/// Destination for a still exported into `dir`, which is created if needed
pub fn get_img_path(dir: &Path) -> Result<PathBuf, SessionError> {
    std::fs::create_dir_all(dir).map_err(|e| SessionError::io(dir, e))?;
    Ok(dir.join(still_file_name()))
}

/// Write `img` as PNG to `path`
pub fn save_rgba(img: &RgbaImage, path: &Path) -> Result<(), SessionError> {
    let file = std::fs::File::create(path).map_err(|e| SessionError::io(path, e))?;
    write_png(io::BufWriter::new(file), img).map_err(|e| match e {
        png::EncodingError::IoError(source) => SessionError::io(path, source),
        other => SessionError::io(path, io::Error::other(other)),
    })?;
    log::info!("Saved still to {}", path.display());
    Ok(())
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_file_name_format() {
        let name = still_file_name();
        assert!(name.starts_with("Screenshot_"));
        assert!(name.ends_with(".png"));
        // Screenshot_YYYY-MM-DD_HH-MM-SS.png
        assert_eq!(name.len(), "Screenshot_2024-01-01_00-00-00.png".len());
    }

    #[test]
    fn test_save_rgba_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_img_path(&dir.path().join("nested")).unwrap();
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]));
        save_rgba(&img, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(2, 1), &image::Rgba([1, 2, 3, 255]));
    }
}
