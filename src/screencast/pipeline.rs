//! GIF assembly from recorded frames

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use tempfile::NamedTempFile;

use super::encoder::read_frame;
use super::state::RecorderStatus;
use crate::error::RecordError;

/// Uniform per-frame duration derived from the achieved rate
pub fn frame_delay_ms(elapsed: Duration, frame_count: usize) -> u32 {
    if frame_count == 0 {
        return 0;
    }
    (elapsed.as_millis() / frame_count as u128).min(u32::MAX as u128) as u32
}

/// Stream `frames` into a looping GIF at `dest`.
///
/// The animation is written to a temporary file beside `dest` and moved into
/// place only once complete, so a failure leaves nothing at `dest`.
pub fn assemble_gif(
    frames: &[PathBuf],
    elapsed: Duration,
    dest: &Path,
    status: &RecorderStatus,
) -> Result<(), RecordError> {
    if frames.is_empty() {
        return Err(RecordError::NoFrames);
    }
    let save_err = |source: std::io::Error| RecordError::Save {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(save_err)?;

    let delay_ms = frame_delay_ms(elapsed, frames.len());
    log::info!(
        "Assembling {} frames into {} ({} ms per frame)",
        frames.len(),
        dest.display(),
        delay_ms
    );

    {
        let mut encoder = GifEncoder::new(BufWriter::new(tmp.as_file_mut()));
        encoder.set_repeat(Repeat::Infinite)?;

        for (index, path) in frames.iter().enumerate() {
            status.set_progress((index * 100 / frames.len()) as u8);

            let rgba = read_frame(path)?;
            let frame = Frame::from_parts(rgba, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
            encoder.encode_frame(frame)?;
        }
    }

    tmp.as_file().sync_all().map_err(save_err)?;
    tmp.persist(dest).map_err(|e| save_err(e.error))?;
    status.set_progress(100);
    log::info!("Saved animation to {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureMode;
    use crate::screencast::encoder::write_frame;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba, RgbaImage};
    use std::fs::File;
    use std::io::BufReader;

    fn write_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let img = RgbaImage::from_pixel(10, 8, Rgba([(i * 40) as u8, 0, 0, 255]));
                let path = dir.join(format!("{i:06}.png"));
                write_frame(&img, &CaptureMode::NORMAL, &path).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_frame_delay_uses_achieved_rate() {
        assert_eq!(frame_delay_ms(Duration::from_secs(4), 40), 100);
        assert_eq!(frame_delay_ms(Duration::from_millis(1000), 3), 333);
        assert_eq!(frame_delay_ms(Duration::from_secs(1), 0), 0);
    }

    #[test]
    fn test_assembles_looping_gif() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let frames = write_frames(scratch.path(), 4);
        let dest = out.path().join("capture.gif");
        let status = RecorderStatus::new();

        assemble_gif(&frames, Duration::from_millis(800), &dest, &status).unwrap();

        assert_eq!(status.snapshot().progress, 100);
        let decoder = GifDecoder::new(BufReader::new(File::open(&dest).unwrap())).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 4);
        for frame in &decoded {
            let (numer, denom) = frame.delay().numer_denom_ms();
            assert_eq!(numer / denom, 200);
            assert_eq!(frame.buffer().dimensions(), (10, 8));
        }
    }

    #[test]
    fn test_failed_save_leaves_no_file() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut frames = write_frames(scratch.path(), 2);
        frames.push(scratch.path().join("missing.png"));
        let dest = out.path().join("capture.gif");

        let result = assemble_gif(&frames, Duration::from_secs(1), &dest, &RecorderStatus::new());
        assert!(result.is_err());
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_frames_is_an_error() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("capture.gif");
        let result = assemble_gif(&[], Duration::from_secs(1), &dest, &RecorderStatus::new());
        assert!(matches!(result, Err(RecordError::NoFrames)));
        assert!(!dest.exists());
    }
}
