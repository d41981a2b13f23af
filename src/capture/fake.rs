//! Scripted screen for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use super::ScreenGrabber;
use crate::error::CaptureError;

/// Deterministic gradient screen with optional latency and failures
#[derive(Debug)]
pub struct FakeScreen {
    width: u32,
    height: u32,
    latency: Duration,
    /// Grabs beyond this count fail with a device error
    fail_after: Option<usize>,
    pointer: Option<(i32, i32)>,
    grabs: AtomicUsize,
}

impl FakeScreen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            latency: Duration::ZERO,
            fail_after: None,
            pointer: None,
            grabs: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing_after(mut self, grabs: usize) -> Self {
        self.fail_after = Some(grabs);
        self
    }

    pub fn with_pointer(mut self, x: i32, y: i32) -> Self {
        self.pointer = Some((x, y));
        self
    }

    pub fn grab_count(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }

    pub fn pixel_at(x: u32, y: u32) -> Rgba<u8> {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }
}

impl ScreenGrabber for FakeScreen {
    fn screen_size(&self) -> Result<(u32, u32), CaptureError> {
        Ok((self.width, self.height))
    }

    fn grab_screen(&self) -> Result<RgbaImage, CaptureError> {
        let count = self.grabs.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.fail_after.is_some_and(|limit| count >= limit) {
            return Err(CaptureError::Device("scripted failure".into()));
        }
        Ok(RgbaImage::from_fn(self.width, self.height, Self::pixel_at))
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        self.pointer
    }
}
