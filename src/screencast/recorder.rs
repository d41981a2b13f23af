//! Calibration and the frame-paced recording loop

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::encoder::{frame_extension, write_frame};
use super::state::RecorderStatus;
use crate::capture::{ScreenGrabber, capture_region};
use crate::config::CaptureMode;
use crate::domain::Rect;
use crate::error::RecordError;
use crate::render::image::draw_pointer_marker;

/// Idle time between captures so the average rate approaches `target_fps`.
///
/// `None` when the trial captured nothing, which counts as a failed
/// calibration.
pub fn frame_sleep_ms(target_fps: u32, trial: Duration, frames_captured: usize) -> Option<f64> {
    if frames_captured == 0 {
        return None;
    }
    let target_interval = 1000.0 / target_fps.max(1) as f64;
    let achieved_interval = 1000.0 * trial.as_secs_f64() / frames_captured as f64;
    Some((target_interval - achieved_interval).max(0.0))
}

/// Result of a calibration trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub frames_captured: usize,
    pub trial: Duration,
    pub frame_sleep_ms: f64,
}

/// One captured frame in scratch storage
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub index: usize,
    /// Time since recording started
    pub timestamp_ms: u64,
    pub path: PathBuf,
}

/// What a finished record loop produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutput {
    pub frame_count: usize,
    pub elapsed: Duration,
}

/// Fresh scratch directory under `root`, or under the system temp dir
fn scratch_dir(prefix: &str, root: Option<&Path>) -> Result<TempDir, RecordError> {
    match root {
        Some(root) => TempDir::with_prefix_in(prefix, root),
        None => TempDir::with_prefix(prefix),
    }
    .map_err(RecordError::Scratch)
}

/// Capture `region` as fast as possible for `trial` and derive the frame
/// sleep. Trial frames go to their own scratch directory under
/// `scratch_root` and are discarded.
pub fn calibrate(
    grabber: &dyn ScreenGrabber,
    region: &Rect,
    mode: &CaptureMode,
    trial: Duration,
    status: &RecorderStatus,
    scratch_root: Option<&Path>,
) -> Result<Calibration, RecordError> {
    let scratch = scratch_dir("snipcast-calibrate-", scratch_root)?;
    let extension = frame_extension(mode.format);

    let started = Instant::now();
    let mut frames_captured = 0usize;
    while started.elapsed() < trial {
        if status.should_halt() {
            break;
        }
        let frame = capture_region(grabber, region)?;
        let path = scratch
            .path()
            .join(format!("{frames_captured:06}.{extension}"));
        write_frame(&frame, mode, &path)?;
        frames_captured += 1;
    }

    let frame_sleep_ms = frame_sleep_ms(mode.target_fps, trial, frames_captured).ok_or_else(|| {
        RecordError::CaptureInitFailed("calibration captured no frames".into())
    })?;
    log::info!(
        "Calibrated {}: {} frames in {:?}, sleeping {:.1} ms per frame",
        mode.name,
        frames_captured,
        trial,
        frame_sleep_ms
    );

    if let Err(e) = scratch.close() {
        log::warn!("Failed to remove calibration scratch: {}", e);
    }
    Ok(Calibration {
        frames_captured,
        trial,
        frame_sleep_ms,
    })
}

/// A single recording run over a fixed region
#[derive(Debug)]
pub struct RecordingSession {
    region: Rect,
    mode: CaptureMode,
    frame_sleep_ms: Option<f64>,
    started: Option<Instant>,
    scratch: TempDir,
    frames: Vec<FrameRecord>,
}

impl RecordingSession {
    pub fn new(region: Rect, mode: CaptureMode) -> Result<Self, RecordError> {
        Self::new_in(region, mode, None)
    }

    /// Like [`new`](Self::new), with scratch storage under `scratch_root`
    pub fn new_in(
        region: Rect,
        mode: CaptureMode,
        scratch_root: Option<&Path>,
    ) -> Result<Self, RecordError> {
        let scratch = scratch_dir("snipcast-frames-", scratch_root)?;
        log::debug!("Recording scratch at {}", scratch.path().display());
        Ok(Self {
            region,
            mode,
            frame_sleep_ms: None,
            started: None,
            scratch,
            frames: Vec::new(),
        })
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn mode(&self) -> &CaptureMode {
        &self.mode
    }

    pub fn frame_sleep_ms(&self) -> Option<f64> {
        self.frame_sleep_ms
    }

    pub fn set_calibration(&mut self, calibration: &Calibration) {
        self.frame_sleep_ms = Some(calibration.frame_sleep_ms);
    }

    pub fn is_calibrated(&self) -> bool {
        self.frame_sleep_ms.is_some()
    }

    pub fn started(&self) -> Option<Instant> {
        self.started
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame_paths(&self) -> Vec<PathBuf> {
        self.frames.iter().map(|f| f.path.clone()).collect()
    }

    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Capture frames until stopped, cancelled, or past `limit`.
    ///
    /// A zero `limit` means the mode's maximum duration. Each frame gets the
    /// pointer marker when the pointer is known, then goes to scratch
    /// storage.
    pub fn record(
        &mut self,
        grabber: &dyn ScreenGrabber,
        status: &RecorderStatus,
        limit: Duration,
    ) -> Result<RecordOutput, RecordError> {
        let frame_sleep = self
            .frame_sleep_ms
            .map(|ms| Duration::from_secs_f64(ms / 1000.0))
            .ok_or_else(|| RecordError::CaptureInitFailed("recorder was not calibrated".into()))?;
        let limit = if limit.is_zero() {
            self.mode.max_duration
        } else {
            limit
        };
        let extension = frame_extension(self.mode.format);

        log::info!(
            "Recording {:?} in {} mode for at most {:?}",
            self.region,
            self.mode.name,
            limit
        );

        let started = Instant::now();
        self.started = Some(started);
        let mut elapsed = Duration::ZERO;

        while !status.should_halt() && elapsed <= limit {
            let mut frame = capture_region(grabber, &self.region)?;
            if let Some((px, py)) = grabber.pointer_position() {
                draw_pointer_marker(
                    &mut frame,
                    (px - self.region.left) as f32,
                    (py - self.region.top) as f32,
                );
            }

            let index = self.frames.len();
            let path = self.scratch.path().join(format!("{index:06}.{extension}"));
            write_frame(&frame, &self.mode, &path)?;
            self.frames.push(FrameRecord {
                index,
                timestamp_ms: started.elapsed().as_millis() as u64,
                path,
            });

            elapsed = started.elapsed();
            status.set_elapsed(elapsed, self.frames.len() as u64);
            log::debug!("Frame {} at {:?}", index, elapsed);

            if !frame_sleep.is_zero() {
                // Never sleep past the limit
                let remaining = (limit + Duration::from_millis(1)).saturating_sub(elapsed);
                std::thread::sleep(frame_sleep.min(remaining));
                elapsed = started.elapsed();
            }
        }

        log::info!(
            "Recording ended after {:?} with {} frames",
            elapsed,
            self.frames.len()
        );
        Ok(RecordOutput {
            frame_count: self.frames.len(),
            elapsed,
        })
    }

    /// Remove scratch storage and every frame in it
    pub fn discard(self) {
        let path = self.scratch.path().to_path_buf();
        if let Err(e) = self.scratch.close() {
            log::error!("Failed to remove scratch {}: {}", path.display(), e);
        } else {
            log::debug!("Removed scratch {}", path.display());
        }
    }
}
