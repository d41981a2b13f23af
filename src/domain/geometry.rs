//! Geometric types for capture regions and screen coordinates

use std::num::NonZeroU32;

/// Screen-space rectangle in pixels, `left`/`top` inclusive and `right`/`bottom` exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounding box of two arbitrary points (anchor and pointer)
    pub fn from_points(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self {
            left: ax.min(bx),
            top: ay.min(by),
            right: ax.max(bx),
            bottom: ay.max(by),
        }
    }

    /// Full screen bounds `[0, width] x [0, height]`
    pub fn screen(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, x: i32, y: i32) -> Rect {
        Rect {
            left: self.left + x,
            top: self.top + y,
            right: self.right + x,
            bottom: self.bottom + y,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Center point, rounded toward the top-left
    pub fn center(&self) -> (i32, i32) {
        (
            (self.left + self.right).div_euclid(2),
            (self.top + self.bottom).div_euclid(2),
        )
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new((self.width()).unsigned_abs())?;
        let height = NonZeroU32::new((self.height()).unsigned_abs())?;
        Some(RectDimension { width, height })
    }

    /// Check if this rectangle contains a point
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Strict interior test, edges excluded
    pub fn contains_point_strict(&self, x: i32, y: i32) -> bool {
        x > self.left && x < self.right && y > self.top && y < self.bottom
    }

    /// Closed-interval test, edges included
    pub fn contains_point_closed(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Whether both corners lie inside `bounds` (closed interval)
    pub fn within(&self, bounds: &Rect) -> bool {
        bounds.contains_point_closed(self.left, self.top)
            && bounds.contains_point_closed(self.right, self.bottom)
    }

    /// Clamp a point into the closed interval of this rectangle
    pub fn clamp_point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(self.left, self.right),
            y.clamp(self.top, self.bottom),
        )
    }

    /// Whether the rectangle is normalized and both sides reach `min_size`
    pub fn meets_min_size(&self, min_size: i32) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && self.width() >= min_size
            && self.height() >= min_size
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// The four translucent rectangles covering everything outside a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskRects {
    /// Full screen width, from the top edge down to the selection
    pub top: Rect,
    /// Full screen width, from the selection down to the bottom edge
    pub bottom: Rect,
    /// Between `top` and `bottom`, left of the selection
    pub left: Rect,
    /// Between `top` and `bottom`, right of the selection
    pub right: Rect,
}

impl MaskRects {
    /// Compute the mask around `selection` on a screen of `screen` bounds.
    ///
    /// Every rectangle is clipped to non-negative dimensions, so a selection
    /// touching a screen edge yields an empty strip on that side.
    pub fn around(selection: &Rect, screen: &Rect) -> Self {
        let top_edge = selection.top.clamp(screen.top, screen.bottom);
        let bottom_edge = selection.bottom.clamp(top_edge, screen.bottom);
        let left_edge = selection.left.clamp(screen.left, screen.right);
        let right_edge = selection.right.clamp(left_edge, screen.right);

        Self {
            top: Rect::new(screen.left, screen.top, screen.right, top_edge),
            bottom: Rect::new(screen.left, bottom_edge, screen.right, screen.bottom),
            left: Rect::new(screen.left, top_edge, left_edge, bottom_edge),
            right: Rect::new(right_edge, top_edge, screen.right, bottom_edge),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        [&self.top, &self.bottom, &self.left, &self.right].into_iter()
    }
}

/// Thin frame drawn around a recording region, made of four strips that
/// sit outside the region so the recorded pixels are never covered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderStrips {
    pub left: Rect,
    pub right: Rect,
    pub top: Rect,
    pub bottom: Rect,
}

impl BorderStrips {
    pub fn around(region: &Rect, thickness: i32) -> Self {
        let Rect {
            left: x1,
            top: y1,
            right: x2,
            bottom: y2,
        } = *region;
        let bd = thickness;

        Self {
            left: Rect::new(x1 - bd, y1, x1, y2 + bd),
            right: Rect::new(x2, y1 - bd, x2 + bd, y2),
            top: Rect::new(x1 - bd, y1 - bd, x2, y1),
            bottom: Rect::new(x1, y2, x2 + bd, y2 + bd),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        [&self.left, &self.right, &self.top, &self.bottom].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let r = Rect::from_points(400, 300, 100, 100);
        assert_eq!(r, Rect::new(100, 100, 400, 300));
        assert_eq!(r.width(), 300);
        assert_eq!(r.height(), 200);
    }

    #[test]
    fn test_mask_leaves_selection_uncovered() {
        let screen = Rect::screen(1920, 1080);
        let sel = Rect::new(100, 100, 400, 300);
        let mask = MaskRects::around(&sel, &screen);

        assert_eq!(mask.top, Rect::new(0, 0, 1920, 100));
        assert_eq!(mask.bottom, Rect::new(0, 300, 1920, 1080));
        assert_eq!(mask.left, Rect::new(0, 100, 100, 300));
        assert_eq!(mask.right, Rect::new(400, 100, 1920, 300));
        for m in mask.iter() {
            assert!(m.intersect(sel).is_none());
        }
    }

    #[test]
    fn test_mask_clips_to_non_negative() {
        let screen = Rect::screen(800, 600);
        let sel = Rect::new(0, 0, 800, 600);
        let mask = MaskRects::around(&sel, &screen);
        for m in mask.iter() {
            assert!(m.width() >= 0 && m.height() >= 0);
            assert!(m.dimensions().is_none());
        }
    }

    #[test]
    fn test_border_strips_do_not_overlap_region() {
        let region = Rect::new(10, 20, 110, 220);
        let strips = BorderStrips::around(&region, 2);
        for s in strips.iter() {
            assert!(s.intersect(region).is_none());
            assert!(s.dimensions().is_some());
        }
        assert!(strips.left.intersect(strips.right).is_none());
        assert!(strips.top.intersect(strips.bottom).is_none());
    }

    #[test]
    fn test_within_closed_bounds() {
        let screen = Rect::screen(100, 100);
        assert!(Rect::new(0, 0, 100, 100).within(&screen));
        assert!(!Rect::new(-1, 0, 50, 50).within(&screen));
        assert!(!Rect::new(10, 10, 101, 50).within(&screen));
    }
}
