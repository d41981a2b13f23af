//! Screen grabbing and still export
//!
//! This module consolidates:
//! - The grab facility seam (`ScreenGrabber`) and region capture
//! - PNG writing and export paths (image.rs)
//! - The xcap-backed grabber for real desktops (xcap.rs)

pub mod image;
#[cfg(feature = "desktop")]
pub mod xcap;

#[cfg(test)]
pub(crate) mod fake;

use ::image::RgbaImage;

use crate::domain::Rect;
use crate::error::CaptureError;

/// Platform screen-grab facility.
///
/// Calls are synchronous and block the calling thread until the pixels are
/// available. Implementations must be shareable with the recorder thread.
pub trait ScreenGrabber: Send + Sync {
    /// Size of the capturable screen in pixels
    fn screen_size(&self) -> Result<(u32, u32), CaptureError>;

    /// Grab the whole screen
    fn grab_screen(&self) -> Result<RgbaImage, CaptureError>;

    /// Grab `region`, already validated against the screen bounds
    fn grab(&self, region: &Rect) -> Result<RgbaImage, CaptureError> {
        let full = self.grab_screen()?;
        crop(&full, region)
    }

    /// Current pointer position in screen coordinates, when the platform
    /// exposes it
    fn pointer_position(&self) -> Option<(i32, i32)> {
        None
    }
}

/// Grab `region` from the screen. Failures propagate, nothing is retried.
pub fn capture_region(grabber: &dyn ScreenGrabber, region: &Rect) -> Result<RgbaImage, CaptureError> {
    let screen = grabber.screen_size()?;
    validate(region, screen)?;
    let image = grabber.grab(region)?;
    log::debug!(
        "Captured region ({},{})-({},{}): {}x{}",
        region.left,
        region.top,
        region.right,
        region.bottom,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Grab the full screen, used as the session backdrop
pub fn capture_screen(grabber: &dyn ScreenGrabber) -> Result<RgbaImage, CaptureError> {
    let image = grabber.grab_screen()?;
    log::debug!("Captured screen: {}x{}", image.width(), image.height());
    Ok(image)
}

fn validate(region: &Rect, screen: (u32, u32)) -> Result<(), CaptureError> {
    if region.left >= region.right || region.top >= region.bottom {
        return Err(CaptureError::EmptyRegion { region: *region });
    }
    if !region.within(&Rect::screen(screen.0, screen.1)) {
        return Err(CaptureError::OutOfBounds {
            region: *region,
            screen,
        });
    }
    Ok(())
}

/// Crop `region` out of a full-screen image
pub fn crop(full: &RgbaImage, region: &Rect) -> Result<RgbaImage, CaptureError> {
    let screen = (full.width(), full.height());
    validate(region, screen)?;
    let Some(dims) = region.dimensions() else {
        return Err(CaptureError::EmptyRegion { region: *region });
    };
    let cropped = ::image::imageops::crop_imm(
        full,
        region.left as u32,
        region.top as u32,
        dims.width(),
        dims.height(),
    );
    Ok(cropped.to_image())
}
