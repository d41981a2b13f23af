//! Handle topology for an adjustable selection

use super::geometry::Rect;

/// Draggable hotspot of a committed region
///
/// Declared in hit-test priority: corners first, then edges, and the region
/// body last so a handle is never shadowed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Top-left corner
    TopLeft,
    /// Top-right corner
    TopRight,
    /// Bottom-left corner
    BottomLeft,
    /// Bottom-right corner
    BottomRight,
    /// Left edge midpoint
    Left,
    /// Right edge midpoint
    Right,
    /// Top edge midpoint
    Top,
    /// Bottom edge midpoint
    Bottom,
    /// Region interior
    Move,
}

impl Handle {
    /// The eight resize handles in hit-test priority order
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Left,
        Handle::Right,
        Handle::Top,
        Handle::Bottom,
    ];

    /// Cursor glyph shown while hovering this handle
    pub fn cursor(self) -> CursorGlyph {
        match self {
            Handle::TopLeft => CursorGlyph::TopLeftCorner,
            Handle::TopRight => CursorGlyph::TopRightCorner,
            Handle::BottomLeft => CursorGlyph::BottomLeftCorner,
            Handle::BottomRight => CursorGlyph::BottomRightCorner,
            Handle::Left | Handle::Right => CursorGlyph::HorizontalResize,
            Handle::Top | Handle::Bottom => CursorGlyph::VerticalResize,
            Handle::Move => CursorGlyph::Move,
        }
    }

    /// Center of this handle's hotspot on `region`
    pub fn anchor(self, region: &Rect) -> (i32, i32) {
        let (cx, cy) = region.center();
        match self {
            Handle::TopLeft => (region.left, region.top),
            Handle::TopRight => (region.right, region.top),
            Handle::BottomLeft => (region.left, region.bottom),
            Handle::BottomRight => (region.right, region.bottom),
            Handle::Left => (region.left, cy),
            Handle::Right => (region.right, cy),
            Handle::Top => (cx, region.top),
            Handle::Bottom => (cx, region.bottom),
            Handle::Move => (cx, cy),
        }
    }

    /// Square hotspot of side `2 * radius` centered on the handle anchor
    pub fn hotspot(self, region: &Rect, radius: i32) -> Rect {
        let (x, y) = self.anchor(region);
        Rect::new(x - radius, y - radius, x + radius, y + radius)
    }
}

/// Pointer glyph requested from the UI layer
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorGlyph {
    #[default]
    Arrow,
    Crosshair,
    TopLeftCorner,
    TopRightCorner,
    BottomLeftCorner,
    BottomRightCorner,
    HorizontalResize,
    VerticalResize,
    Move,
}

/// A handle hotspot ready for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleDot {
    pub handle: Handle,
    pub bounds: Rect,
}

/// Compute the eight resize dots for `region`, in hit-test priority order
pub fn handle_dots(region: &Rect, radius: i32) -> [HandleDot; 8] {
    Handle::RESIZE.map(|handle| HandleDot {
        handle,
        bounds: handle.hotspot(region, radius),
    })
}

/// Hit-test `(x, y)` against the handles of `region`.
///
/// Resize dots are tested first in priority order, then the region interior.
pub fn hit_test(region: &Rect, radius: i32, x: i32, y: i32) -> Option<Handle> {
    handle_dots(region, radius)
        .iter()
        .find(|dot| dot.bounds.contains_point_strict(x, y))
        .map(|dot| dot.handle)
        .or_else(|| region.contains_point_strict(x, y).then_some(Handle::Move))
}
