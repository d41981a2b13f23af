//! Region screen capture with annotation, still export and GIF recording.
//!
//! The UI layer drives a [`session::CaptureSession`] with pointer and key
//! events; screen access goes through [`capture::ScreenGrabber`] and the
//! recording border and save prompt through the traits in [`surface`].

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod screencast;
pub mod session;
pub mod surface;

pub use config::{CaptureMode, Settings, ToolSettings};
pub use domain::{Mark, MarkKind, Rect};
pub use error::{CaptureError, RecordError, SessionError};
pub use session::{CaptureSession, SessionEvent};
