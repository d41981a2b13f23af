//! Screen grabbing through the `xcap` crate.
//!
//! Only the primary monitor is captured. Monitors are enumerated per call so
//! the grabber holds no platform handles and can move to the recorder thread.

use image::RgbaImage;
use xcap::Monitor;

use super::ScreenGrabber;
use crate::error::CaptureError;

/// Primary-monitor grabber. xcap exposes no pointer position, so recorded
/// frames carry no pointer marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapGrabber;

impl XcapGrabber {
    pub fn new() -> Self {
        Self
    }

    fn primary_monitor() -> Result<Monitor, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Device(e.to_string()))?;
        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(monitor);
            }
            fallback.get_or_insert(monitor);
        }
        // No monitor reported as primary: use the first one
        fallback.ok_or_else(|| CaptureError::Device("no monitor found".into()))
    }
}

impl ScreenGrabber for XcapGrabber {
    fn screen_size(&self) -> Result<(u32, u32), CaptureError> {
        let monitor = Self::primary_monitor()?;
        let width = monitor
            .width()
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        let height = monitor
            .height()
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        Ok((width, height))
    }

    fn grab_screen(&self) -> Result<RgbaImage, CaptureError> {
        Self::primary_monitor()?
            .capture_image()
            .map_err(|e| CaptureError::Device(e.to_string()))
    }
}
