//! Frame-paced GIF recording
//!
//! Calibration measures the achievable capture rate, the record loop paces
//! captures to the profile's target, and the pipeline assembles the stored
//! frames into a looping GIF. Everything runs off the owning thread, which
//! only reads the shared status.

pub mod controller;
pub mod encoder;
pub mod pipeline;
pub mod recorder;
pub mod state;

pub use controller::{RecordRequest, RecorderController, RecorderIo, RecordingOutcome};
pub use recorder::{Calibration, RecordingSession, calibrate, frame_sleep_ms};
pub use state::{RecorderPhase, RecorderStatus, StatusSnapshot};
