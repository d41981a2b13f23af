//! Recording lifecycle on a background thread
//!
//! Arming a controller runs calibration concurrently with the countdown,
//! records until stopped, cancelled, or out of time, then prompts for a
//! destination and assembles the GIF. The owning thread only flips the stop
//! and cancel flags and reads the shared status.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::pipeline::assemble_gif;
use super::recorder::{RecordingSession, calibrate};
use super::state::{RecorderPhase, RecorderStatus, StatusSnapshot};
use crate::capture::ScreenGrabber;
use crate::config::{CALIBRATION_TRIAL, CaptureMode, RECORD_BORDER_THICKNESS, RECORD_COUNTDOWN};
use crate::domain::{BorderStrips, Rect};
use crate::error::RecordError;
use crate::surface::{OverlaySurface, SaveDestination, SaveOutcome};

/// Parameters of one recording attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRequest {
    pub region: Rect,
    pub mode: CaptureMode,
    /// Zero means the mode's maximum duration
    pub duration_limit: Duration,
    pub countdown: Duration,
    pub calibration_trial: Duration,
    /// Parent of the scratch directories; the system temp dir when unset
    pub scratch_root: Option<PathBuf>,
}

impl RecordRequest {
    pub fn new(region: Rect, mode: CaptureMode) -> Self {
        Self {
            region,
            mode,
            duration_limit: Duration::ZERO,
            countdown: RECORD_COUNTDOWN,
            calibration_trial: CALIBRATION_TRIAL,
            scratch_root: None,
        }
    }

    pub fn with_duration_limit(mut self, limit: Duration) -> Self {
        self.duration_limit = limit;
        self
    }

    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = countdown;
        self
    }

    pub fn with_calibration_trial(mut self, trial: Duration) -> Self {
        self.calibration_trial = trial;
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Effective recording limit
    pub fn limit(&self) -> Duration {
        if self.duration_limit.is_zero() {
            self.mode.max_duration
        } else {
            self.duration_limit
        }
    }
}

/// How a recording attempt ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    Saved(PathBuf),
    /// The user dismissed the save prompt; frames were discarded
    SaveCancelled,
    /// Cancelled before or during recording; nothing was written
    Cancelled,
}

/// Collaborators the recorder thread takes ownership of
pub struct RecorderIo {
    pub grabber: Arc<dyn ScreenGrabber>,
    pub overlay: Box<dyn OverlaySurface>,
    pub destination: Box<dyn SaveDestination>,
}

/// Owner-side handle of the recorder thread
#[derive(Debug, Default)]
pub struct RecorderController {
    status: Arc<RecorderStatus>,
    handle: Option<JoinHandle<Result<RecordingOutcome, RecordError>>>,
    limit: Duration,
}

impl RecorderController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a recording attempt on a background thread
    pub fn arm(&mut self, request: RecordRequest, io: RecorderIo) -> Result<(), RecordError> {
        if self.is_active() {
            return Err(RecordError::AlreadyRecording);
        }
        // Reap a finished attempt nobody joined
        if self.handle.is_some() {
            match self.join() {
                Ok(outcome) => log::info!("Previous recording ended unjoined: {:?}", outcome),
                Err(e) => log::error!("Previous recording failed unjoined: {}", e),
            }
        }

        self.status.reset();
        self.limit = request.limit();
        let status = Arc::clone(&self.status);
        log::info!(
            "Arming recorder for {:?} ({} mode, countdown {:?})",
            request.region,
            request.mode.name,
            request.countdown
        );
        self.handle = Some(std::thread::spawn(move || run(request, io, &status)));
        Ok(())
    }

    /// Finish recording and proceed to save
    pub fn stop(&self) {
        self.status.request_stop();
    }

    /// Finish recording and discard everything
    pub fn cancel(&self) {
        self.status.request_cancel();
    }

    /// Whether an attempt is running and not yet finished
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn status(&self) -> Arc<RecorderStatus> {
        Arc::clone(&self.status)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// `"mm:ss/mm:ss"` progress against the armed limit
    pub fn elapsed_label(&self) -> String {
        self.status.snapshot().elapsed_label(self.limit)
    }

    /// Wait for the attempt to end and return how it ended
    pub fn join(&mut self) -> Result<RecordingOutcome, RecordError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RecordError::ThreadPanicked)?,
            None => Ok(RecordingOutcome::Cancelled),
        }
    }
}

impl Drop for RecorderController {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                log::warn!("Recorder dropped while running, cancelling");
                self.status.request_cancel();
            }
            let _ = handle.join();
        }
    }
}

/// Whole attempt, run on the recorder thread
fn run(
    request: RecordRequest,
    mut io: RecorderIo,
    status: &RecorderStatus,
) -> Result<RecordingOutcome, RecordError> {
    io.overlay
        .show_border(&BorderStrips::around(&request.region, RECORD_BORDER_THICKNESS));
    let result = record_and_save(&request, &mut io, status);
    io.overlay.hide_border();
    status.set_recording(false);
    status.set_asking(false);
    status.set_saving(false);

    let phase = match &result {
        Ok(RecordingOutcome::Saved(_)) => RecorderPhase::Done,
        Ok(_) => RecorderPhase::Cancelled,
        Err(e) => {
            log::error!("Recording failed: {}", e);
            RecorderPhase::Failed
        }
    };
    status.set_phase(phase);
    result
}

fn record_and_save(
    request: &RecordRequest,
    io: &mut RecorderIo,
    status: &RecorderStatus,
) -> Result<RecordingOutcome, RecordError> {
    let scratch_root = request.scratch_root.as_deref();
    let mut session = RecordingSession::new_in(request.region, request.mode, scratch_root)?;
    let grabber = io.grabber.as_ref();

    status.set_phase(RecorderPhase::Calibrating);
    let first = std::thread::scope(|scope| {
        let calibration = scope.spawn(|| {
            calibrate(
                grabber,
                &request.region,
                &request.mode,
                request.calibration_trial,
                status,
                scratch_root,
            )
        });
        countdown(request.countdown, status);
        calibration.join()
    })
    .map_err(|_| RecordError::ThreadPanicked)?;

    if status.should_halt() {
        // Stopping before any frame exists abandons the attempt
        log::info!("Recording abandoned before it started");
        session.discard();
        return Ok(RecordingOutcome::Cancelled);
    }

    let calibration = match first {
        Ok(calibration) => calibration,
        Err(e) => {
            log::warn!("Calibration failed ({}), retrying once", e);
            let retry = calibrate(
                grabber,
                &request.region,
                &request.mode,
                request.calibration_trial,
                status,
                scratch_root,
            );
            match retry {
                Ok(calibration) => calibration,
                Err(e) => {
                    session.discard();
                    return Err(RecordError::CaptureInitFailed(e.to_string()));
                }
            }
        }
    };
    session.set_calibration(&calibration);
    status.set_phase(RecorderPhase::Ready);

    status.set_phase(RecorderPhase::Recording);
    status.set_recording(true);
    let recorded = session.record(grabber, status, request.duration_limit);
    status.set_recording(false);
    let output = match recorded {
        Ok(output) => output,
        Err(e) => {
            session.discard();
            return Err(e);
        }
    };

    if status.cancel_requested() {
        log::info!("Recording cancelled, discarding {} frames", output.frame_count);
        session.discard();
        return Ok(RecordingOutcome::Cancelled);
    }

    status.set_asking(true);
    let choice = io.destination.choose(&default_file_name());
    status.set_asking(false);

    let dest = match choice {
        SaveOutcome::Path(path) => path,
        SaveOutcome::Cancelled => {
            log::info!("Save prompt dismissed, discarding frames");
            session.discard();
            return Ok(RecordingOutcome::SaveCancelled);
        }
    };

    status.set_phase(RecorderPhase::Saving);
    status.set_saving(true);
    let saved = assemble_gif(&session.frame_paths(), output.elapsed, &dest, status);
    status.set_saving(false);
    session.discard();
    saved.map(|()| RecordingOutcome::Saved(dest))
}

/// Publish whole seconds left until `length` has passed or the attempt halts
fn countdown(length: Duration, status: &RecorderStatus) {
    let deadline = Instant::now() + length;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || status.should_halt() {
            break;
        }
        status.set_countdown(remaining.as_secs_f64().ceil() as u32);
        std::thread::sleep(remaining.min(Duration::from_millis(100)));
    }
    status.set_countdown(0);
}

/// Name offered by the save prompt
pub fn default_file_name() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S.gif").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::FakeScreen;
    use crate::surface::{FixedDestination, NoOverlay};
    use std::sync::Mutex;

    struct OverlayLog(Arc<Mutex<Vec<&'static str>>>);

    impl OverlaySurface for OverlayLog {
        fn show_border(&mut self, _strips: &BorderStrips) {
            self.0.lock().unwrap().push("show");
        }

        fn hide_border(&mut self) {
            self.0.lock().unwrap().push("hide");
        }
    }

    struct Dismiss;

    impl SaveDestination for Dismiss {
        fn choose(&mut self, _suggested_name: &str) -> SaveOutcome {
            SaveOutcome::Cancelled
        }
    }

    fn request() -> RecordRequest {
        RecordRequest::new(Rect::new(10, 10, 70, 50), CaptureMode::NORMAL)
            .with_countdown(Duration::ZERO)
            .with_calibration_trial(Duration::from_millis(50))
    }

    fn io(screen: FakeScreen, destination: Box<dyn SaveDestination>) -> RecorderIo {
        RecorderIo {
            grabber: Arc::new(screen),
            overlay: Box::new(NoOverlay),
            destination,
        }
    }

    fn assert_empty(dir: &std::path::Path) {
        let left: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
        assert!(left.is_empty(), "scratch left behind: {left:?}");
    }

    fn wait_for(status: &RecorderStatus, cond: impl Fn(&StatusSnapshot) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond(&status.snapshot()) {
            assert!(Instant::now() < deadline, "timed out waiting for status");
            status.wait_for_change(Duration::from_millis(50));
        }
    }

    #[test]
    fn test_stop_saves_gif() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("capture.gif");
        let mut controller = RecorderController::new();
        controller
            .arm(
                request(),
                io(
                    FakeScreen::new(100, 80).with_latency(Duration::from_millis(2)),
                    Box::new(FixedDestination(dest.clone())),
                ),
            )
            .unwrap();

        let status = controller.status();
        wait_for(&status, |s| s.frames >= 3);
        assert!(matches!(
            controller.arm(request(), io(FakeScreen::new(1, 1), Box::new(Dismiss))),
            Err(RecordError::AlreadyRecording)
        ));
        controller.stop();

        let outcome = controller.join().unwrap();
        assert_eq!(outcome, RecordingOutcome::Saved(dest.clone()));
        assert!(dest.exists());
        let snap = controller.snapshot();
        assert_eq!(snap.phase, RecorderPhase::Done);
        assert_eq!(snap.progress, 100);
        assert!(!snap.is_recording && !snap.is_saving && !snap.is_asking);
    }

    #[test]
    fn test_cancel_persists_nothing() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("capture.gif");
        let scratch = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut controller = RecorderController::new();
        controller
            .arm(
                request().with_scratch_root(scratch.path()),
                RecorderIo {
                    grabber: Arc::new(FakeScreen::new(100, 80)),
                    overlay: Box::new(OverlayLog(Arc::clone(&log))),
                    destination: Box::new(FixedDestination(dest.clone())),
                },
            )
            .unwrap();

        let status = controller.status();
        wait_for(&status, |s| s.is_recording && s.frames >= 2);
        controller.cancel();

        assert_eq!(controller.join().unwrap(), RecordingOutcome::Cancelled);
        assert!(!dest.exists());
        assert_empty(out.path());
        assert_empty(scratch.path());
        assert_eq!(*log.lock().unwrap(), vec!["show", "hide"]);
        assert_eq!(controller.snapshot().phase, RecorderPhase::Cancelled);
    }

    #[test]
    fn test_calibration_failure_is_init_error() {
        let scratch = tempfile::tempdir().unwrap();
        let mut controller = RecorderController::new();
        controller
            .arm(
                request().with_scratch_root(scratch.path()),
                io(FakeScreen::new(100, 80).failing_after(0), Box::new(Dismiss)),
            )
            .unwrap();

        let result = controller.join();
        assert!(matches!(result, Err(RecordError::CaptureInitFailed(_))));
        assert_eq!(controller.snapshot().phase, RecorderPhase::Failed);
        assert_empty(scratch.path());
    }

    #[test]
    fn test_dismissed_prompt_discards_frames() {
        let scratch = tempfile::tempdir().unwrap();
        let mut controller = RecorderController::new();
        controller
            .arm(
                request()
                    .with_duration_limit(Duration::from_millis(100))
                    .with_scratch_root(scratch.path()),
                io(FakeScreen::new(100, 80), Box::new(Dismiss)),
            )
            .unwrap();
        assert_eq!(controller.join().unwrap(), RecordingOutcome::SaveCancelled);
        assert!(controller.snapshot().frames > 0);
        assert_empty(scratch.path());
    }

    #[test]
    fn test_device_error_while_recording_removes_scratch() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut controller = RecorderController::new();
        // Calibration takes a handful of grabs; the record loop then fails
        let screen = FakeScreen::new(100, 80)
            .with_latency(Duration::from_millis(20))
            .failing_after(4);
        controller
            .arm(
                request()
                    .with_calibration_trial(Duration::from_millis(30))
                    .with_scratch_root(scratch.path()),
                io(screen, Box::new(FixedDestination(out.path().join("capture.gif")))),
            )
            .unwrap();

        let result = controller.join();
        assert!(result.is_err(), "expected a failure, got {result:?}");
        assert_eq!(controller.snapshot().phase, RecorderPhase::Failed);
        assert_empty(scratch.path());
        assert_empty(out.path());
    }

    #[test]
    fn test_successful_save_removes_scratch() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("capture.gif");
        let mut controller = RecorderController::new();
        controller
            .arm(
                request()
                    .with_duration_limit(Duration::from_millis(100))
                    .with_scratch_root(scratch.path()),
                io(FakeScreen::new(100, 80), Box::new(FixedDestination(dest.clone()))),
            )
            .unwrap();
        assert_eq!(controller.join().unwrap(), RecordingOutcome::Saved(dest));
        assert_empty(scratch.path());
    }

    #[test]
    fn test_rearm_reaps_finished_attempt() {
        let mut controller = RecorderController::new();
        let short = || request().with_duration_limit(Duration::from_millis(50));
        controller
            .arm(short(), io(FakeScreen::new(100, 80), Box::new(Dismiss)))
            .unwrap();
        let status = controller.status();
        wait_for(&status, |s| s.phase.is_finished());
        while controller.is_active() {
            std::thread::sleep(Duration::from_millis(5));
        }

        controller
            .arm(short(), io(FakeScreen::new(100, 80), Box::new(Dismiss)))
            .unwrap();
        assert_eq!(controller.join().unwrap(), RecordingOutcome::SaveCancelled);
        // Nothing left to join
        assert_eq!(controller.join().unwrap(), RecordingOutcome::Cancelled);
    }

    #[test]
    fn test_countdown_publishes_seconds() {
        let status = RecorderStatus::new();
        status.request_cancel();
        countdown(Duration::from_secs(5), &status);
        assert_eq!(status.snapshot().countdown, 0);

        let status = Arc::new(RecorderStatus::new());
        let observer = Arc::clone(&status);
        let handle = std::thread::spawn(move || countdown(Duration::from_millis(1500), &observer));
        wait_for(&status, |s| s.countdown == 2);
        handle.join().unwrap();
        assert_eq!(status.snapshot().countdown, 0);
    }

    #[test]
    fn test_default_file_name() {
        let name = default_file_name();
        assert!(name.ends_with(".gif"));
        assert_eq!(name.len(), "20240101000000.gif".len());
    }
}
