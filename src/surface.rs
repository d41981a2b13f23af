//! Seams to the UI layer: the recording border overlay and the save prompt

use std::path::PathBuf;

use crate::domain::BorderStrips;

/// Window surface that frames the region being recorded
pub trait OverlaySurface: Send {
    /// Show four strips around the region, leaving the region itself clear
    fn show_border(&mut self, strips: &BorderStrips);
    fn hide_border(&mut self);
}

/// Overlay for headless use, draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverlay;

impl OverlaySurface for NoOverlay {
    fn show_border(&mut self, strips: &BorderStrips) {
        log::debug!("Recording border: {:?}", strips);
    }

    fn hide_border(&mut self) {}
}

/// Result of asking the user where to save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Path(PathBuf),
    /// The user dismissed the prompt; not an error
    Cancelled,
}

/// Prompt for a save destination
pub trait SaveDestination: Send {
    fn choose(&mut self, suggested_name: &str) -> SaveOutcome;
}

/// Destination decided up front, without prompting
#[derive(Debug, Clone)]
pub struct FixedDestination(pub PathBuf);

impl SaveDestination for FixedDestination {
    fn choose(&mut self, _suggested_name: &str) -> SaveOutcome {
        SaveOutcome::Path(self.0.clone())
    }
}

/// Native "save as" dialog filtered to GIF files
#[cfg(feature = "desktop")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GifSaveDialog;

#[cfg(feature = "desktop")]
impl SaveDestination for GifSaveDialog {
    fn choose(&mut self, suggested_name: &str) -> SaveOutcome {
        match rfd::FileDialog::new()
            .add_filter("GIF", &["gif"])
            .set_file_name(suggested_name)
            .save_file()
        {
            Some(path) => SaveOutcome::Path(path),
            None => SaveOutcome::Cancelled,
        }
    }
}
