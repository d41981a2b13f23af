//! Shared geometry calculations for marks
//!
//! Math used by the rasterizer and by tests; no drawing happens here.

/// Arrow geometry constants
pub mod arrow {
    /// Arrowhead length relative to the stroke width
    pub const HEAD_SCALE: f32 = 4.0;
    /// Smallest arrowhead drawn, in pixels
    pub const MIN_HEAD_SIZE: f32 = 10.0;
    /// Arrowhead angle from shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
    /// Minimum arrow length to get a head
    pub const MIN_LENGTH: f32 = 5.0;

    /// Head size for a given stroke width
    pub fn head_size(stroke_width: f32) -> f32 {
        (stroke_width * HEAD_SCALE).max(MIN_HEAD_SIZE)
    }

    /// Calculate arrow head points given start, end, and head size
    /// Returns (head1_x, head1_y, head2_x, head2_y) for the two head lines
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        head_size: f32,
    ) -> Option<(f32, f32, f32, f32)> {
        let dx = end_x - start_x;
        let dy = end_y - start_y;
        let length = dx.hypot(dy);
        if length < MIN_LENGTH {
            return None;
        }

        // Unit vector pointing back along the shaft
        let bx = -dx / length;
        let by = -dy / length;
        let (sin_a, cos_a) = HEAD_ANGLE.sin_cos();

        let head1_x = end_x + (bx * cos_a - by * sin_a) * head_size;
        let head1_y = end_y + (bx * sin_a + by * cos_a) * head_size;
        let head2_x = end_x + (bx * cos_a + by * sin_a) * head_size;
        let head2_y = end_y + (-bx * sin_a + by * cos_a) * head_size;

        Some((head1_x, head1_y, head2_x, head2_y))
    }
}

/// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
pub const BEZIER_K: f32 = 0.552_284_8;

/// Smallest pixelation block for blur marks
pub const MIN_BLUR_BLOCK: u32 = 8;

/// Pixelation block size for a blur mark of the given stroke width
pub fn blur_block_size(stroke_width: f32) -> u32 {
    ((stroke_width * 2.0).round() as u32).max(MIN_BLUR_BLOCK)
}

/// Pointer marker polygon drawn into recorded frames
pub mod pointer {
    pub const FILL: [u8; 4] = [0, 0, 0, 150];
    pub const OUTLINE: [u8; 4] = [200, 200, 200, 255];
    pub const OUTLINE_WIDTH: f32 = 2.0;

    /// Triangle vertices for a pointer tip at `(px, py)`
    pub fn polygon(px: f32, py: f32) -> [(f32, f32); 3] {
        [(px, py), (px, py + 18.0), (px + 13.0, py + 13.0)]
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    (x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}
