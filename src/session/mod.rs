//! Capture session management
//!
//! This module contains:
//! - Pointer, key and draw message types
//! - The region selection state machine
//! - The session controller tying selection, annotation, capture and recording

pub mod messages;
pub mod selection;
pub mod state;

pub use messages::{DrawMsg, KeyInput, PointerEvent, SpecialKey};
pub use selection::{SelectionMachine, SelectionOutcome};
pub use state::{CaptureSession, SessionEvent};
