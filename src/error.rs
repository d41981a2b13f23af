//! Error types surfaced by capture sessions and the recorder

use std::path::PathBuf;

use crate::domain::Rect;

/// Failure of a single grab from the screen
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture region {region:?} has zero width or height")]
    EmptyRegion { region: Rect },

    #[error(
        "Capture region ({},{})-({},{}) exceeds screen bounds ({}x{})",
        region.left, region.top, region.right, region.bottom, screen.0, screen.1
    )]
    OutOfBounds { region: Rect, screen: (u32, u32) },

    #[error("Screen capture device error: {0}")]
    Device(String),
}

/// Failure of a session-level operation
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No committed region to operate on")]
    NoRegion,

    #[error("Session was cancelled")]
    Cancelled,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No export directory available")]
    NoExportDir,

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Failure of the frame-paced recorder
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Screen record initialization failed: {0}")]
    CaptureInitFailed(String),

    #[error("Capture device error while recording: {0}")]
    CaptureDevice(#[from] CaptureError),

    #[error("Recording is already running")]
    AlreadyRecording,

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Scratch storage error: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Failed to write animation to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No frames were recorded")]
    NoFrames,

    #[error("Recorder thread panicked")]
    ThreadPanicked,
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SessionError::Io {
            path: path.into(),
            source,
        }
    }
}
