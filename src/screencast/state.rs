//! Recorder status shared between the recorder thread and observers
//!
//! Every value is a single atomic with one writer. Observers read a
//! consistent-enough snapshot and may block on `wait_for_change` instead of
//! polling on a fixed cadence.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Lifecycle of one recording attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RecorderPhase {
    #[default]
    Uninitialized = 0,
    Calibrating = 1,
    Ready = 2,
    Recording = 3,
    Saving = 4,
    Cancelled = 5,
    Done = 6,
    Failed = 7,
}

impl RecorderPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RecorderPhase::Calibrating,
            2 => RecorderPhase::Ready,
            3 => RecorderPhase::Recording,
            4 => RecorderPhase::Saving,
            5 => RecorderPhase::Cancelled,
            6 => RecorderPhase::Done,
            7 => RecorderPhase::Failed,
            _ => RecorderPhase::Uninitialized,
        }
    }

    /// Whether the attempt has ended one way or another
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            RecorderPhase::Cancelled | RecorderPhase::Done | RecorderPhase::Failed
        )
    }
}

/// Shared flags and counters of a recorder
#[derive(Debug)]
pub struct RecorderStatus {
    stop: AtomicBool,
    cancel: AtomicBool,
    recording: AtomicBool,
    asking: AtomicBool,
    saving: AtomicBool,
    progress: AtomicU8,
    elapsed_ms: AtomicU64,
    frames: AtomicU64,
    countdown: AtomicU32,
    phase: AtomicU8,
    notify_tx: Sender<()>,
    notify_rx: Receiver<()>,
}

impl Default for RecorderStatus {
    fn default() -> Self {
        let (notify_tx, notify_rx) = bounded(1);
        Self {
            stop: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            asking: AtomicBool::new(false),
            saving: AtomicBool::new(false),
            progress: AtomicU8::new(0),
            elapsed_ms: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            countdown: AtomicU32::new(0),
            phase: AtomicU8::new(RecorderPhase::Uninitialized as u8),
            notify_tx,
            notify_rx,
        }
    }
}

impl RecorderStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake one waiter; publishes coalesce while nobody is waiting
    fn publish(&self) {
        let _ = self.notify_tx.try_send(());
    }

    /// Clear everything for a new attempt
    pub(crate) fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
        self.cancel.store(false, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        self.asking.store(false, Ordering::SeqCst);
        self.saving.store(false, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);
        self.elapsed_ms.store(0, Ordering::SeqCst);
        self.frames.store(0, Ordering::SeqCst);
        self.countdown.store(0, Ordering::SeqCst);
        self.phase
            .store(RecorderPhase::Uninitialized as u8, Ordering::SeqCst);
        self.publish();
    }

    /// Ask the recorder to finish and save. Idempotent.
    pub fn request_stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            log::info!("Recording stop requested");
            self.publish();
        }
    }

    /// Ask the recorder to finish and discard everything. Idempotent.
    pub fn request_cancel(&self) {
        if !self.cancel.swap(true, Ordering::SeqCst) {
            log::info!("Recording cancel requested");
            self.publish();
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Whether the record loop should end
    pub fn should_halt(&self) -> bool {
        self.stop_requested() || self.cancel_requested()
    }

    pub(crate) fn set_phase(&self, phase: RecorderPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_recording(&self, value: bool) {
        self.recording.store(value, Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_asking(&self, value: bool) {
        self.asking.store(value, Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_saving(&self, value: bool) {
        self.saving.store(value, Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_elapsed(&self, elapsed: Duration, frames: u64) {
        self.elapsed_ms
            .store(elapsed.as_millis() as u64, Ordering::SeqCst);
        self.frames.store(frames, Ordering::SeqCst);
        self.publish();
    }

    pub(crate) fn set_countdown(&self, remaining_secs: u32) {
        if self.countdown.swap(remaining_secs, Ordering::SeqCst) != remaining_secs {
            self.publish();
        }
    }

    pub fn phase(&self) -> RecorderPhase {
        RecorderPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.phase(),
            is_recording: self.recording.load(Ordering::SeqCst),
            is_asking: self.asking.load(Ordering::SeqCst),
            is_saving: self.saving.load(Ordering::SeqCst),
            progress: self.progress.load(Ordering::SeqCst),
            elapsed: Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst)),
            frames: self.frames.load(Ordering::SeqCst),
            countdown: self.countdown.load(Ordering::SeqCst),
            stop_requested: self.stop_requested(),
            cancel_requested: self.cancel_requested(),
        }
    }

    /// Block until something is published or `timeout` passes.
    ///
    /// Returns true when woken by a publish.
    pub fn wait_for_change(&self, timeout: Duration) -> bool {
        self.notify_rx.recv_timeout(timeout).is_ok()
    }
}

/// Point-in-time copy of the recorder status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub phase: RecorderPhase,
    pub is_recording: bool,
    pub is_asking: bool,
    pub is_saving: bool,
    /// Save progress in percent
    pub progress: u8,
    pub elapsed: Duration,
    pub frames: u64,
    /// Seconds left before recording starts
    pub countdown: u32,
    pub stop_requested: bool,
    pub cancel_requested: bool,
}

impl StatusSnapshot {
    /// `"mm:ss/mm:ss"` against `limit`, or `"-/mm:ss"` before recording
    pub fn elapsed_label(&self, limit: Duration) -> String {
        let limit = format_mm_ss(limit);
        if self.is_recording || self.elapsed > Duration::ZERO {
            format!("{}/{}", format_mm_ss(self.elapsed), limit)
        } else {
            format!("-/{}", limit)
        }
    }
}

fn format_mm_ss(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
