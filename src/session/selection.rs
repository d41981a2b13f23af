//! Region selection state machine
//!
//! Owns the selection rectangle from the first pointer press until the
//! region is frozen for annotation or handed to the recorder.
//!
//! ```text
//! Idle --down--> Drawing --up(ok)--> Adjusting --freeze--> Frozen
//!   ^               |                   |
//!   +---up(small)---+                   +--drag(handle)--> Adjusting
//! any --right click--> Cancelled
//! ```

use crate::config::{HANDLE_DOT_RADIUS, MIN_REGION_SIZE};
use crate::domain::{CursorGlyph, Handle, HandleDot, MaskRects, Rect, handle_dots, hit_test};

use super::messages::PointerEvent;

/// An in-flight handle drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragOp {
    handle: Handle,
    /// Last pointer position a move was applied from
    last: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle {
        /// Pointer position for the reference lines
        pointer: Option<(i32, i32)>,
    },
    Drawing {
        anchor: (i32, i32),
        region: Option<Rect>,
    },
    Adjusting {
        region: Rect,
        hover: Option<Handle>,
        drag: Option<DragOp>,
    },
    Frozen {
        region: Rect,
    },
    Cancelled,
}

/// What a pointer event did to the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Event had no effect in the current state
    Unchanged,
    /// Reference lines moved (idle hover)
    Guides,
    /// Draft rectangle changed while drawing
    Drawing(Rect),
    /// Region committed; handles are live
    Committed(Rect),
    /// Hover feedback over the committed region
    Hover(Option<Handle>),
    /// A handle drag was applied
    Adjusted(Rect),
    /// Draft discarded for being under the minimum size
    TooSmall,
    /// A move or resize was rejected; the region is unchanged
    Rejected,
    /// Double click on the region asks for a still export
    ExportRequested(Rect),
    /// Session cancelled by right click
    Cancelled,
}

/// Selection state machine for one capture session
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    screen: Rect,
    min_size: i32,
    dot_radius: i32,
    mask_enabled: bool,
    state: State,
}

impl SelectionMachine {
    pub fn new(screen_width: u32, screen_height: u32, mask_enabled: bool) -> Self {
        Self {
            screen: Rect::screen(screen_width, screen_height),
            min_size: MIN_REGION_SIZE,
            dot_radius: HANDLE_DOT_RADIUS,
            mask_enabled,
            state: State::Idle { pointer: None },
        }
    }

    pub fn with_min_size(mut self, min_size: i32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn set_mask_enabled(&mut self, enabled: bool) {
        self.mask_enabled = enabled;
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Route a pointer event through the machine
    pub fn handle(&mut self, event: PointerEvent) -> SelectionOutcome {
        if let PointerEvent::RightDown { .. } = event {
            return self.cancel();
        }

        match (self.state, event) {
            (State::Idle { .. }, PointerEvent::Move { x, y }) => {
                self.state = State::Idle {
                    pointer: Some((x, y)),
                };
                SelectionOutcome::Guides
            }
            (State::Idle { .. }, PointerEvent::Down { x, y }) => {
                let anchor = self.screen.clamp_point(x, y);
                self.state = State::Drawing {
                    anchor,
                    region: None,
                };
                SelectionOutcome::Unchanged
            }
            (State::Drawing { anchor, .. }, PointerEvent::Drag { x, y }) => {
                let (x, y) = self.screen.clamp_point(x, y);
                let region = Rect::from_points(anchor.0, anchor.1, x, y);
                self.state = State::Drawing {
                    anchor,
                    region: Some(region),
                };
                SelectionOutcome::Drawing(region)
            }
            (State::Drawing { region, .. }, PointerEvent::Up { .. }) => self.commit(region),
            (State::Adjusting { region, drag, .. }, PointerEvent::Move { x, y }) => {
                let hover = hit_test(&region, self.dot_radius, x, y);
                self.state = State::Adjusting {
                    region,
                    hover,
                    drag,
                };
                SelectionOutcome::Hover(hover)
            }
            (State::Adjusting { region, .. }, PointerEvent::Down { x, y }) => {
                let hover = hit_test(&region, self.dot_radius, x, y);
                let drag = hover.map(|handle| DragOp {
                    handle,
                    last: (x, y),
                });
                self.state = State::Adjusting {
                    region,
                    hover,
                    drag,
                };
                SelectionOutcome::Hover(hover)
            }
            (
                State::Adjusting {
                    region,
                    hover,
                    drag: Some(op),
                },
                PointerEvent::Drag { x, y },
            ) => self.apply_drag(region, hover, op, x, y),
            (State::Adjusting { region, hover, .. }, PointerEvent::Up { .. }) => {
                self.state = State::Adjusting {
                    region,
                    hover,
                    drag: None,
                };
                SelectionOutcome::Unchanged
            }
            (State::Adjusting { region, .. }, PointerEvent::DoubleClick { x, y })
                if region.contains_point_strict(x, y) =>
            {
                SelectionOutcome::ExportRequested(region)
            }
            _ => SelectionOutcome::Unchanged,
        }
    }

    /// Right click: terminal, discards everything
    pub fn cancel(&mut self) -> SelectionOutcome {
        log::debug!("Selection cancelled");
        self.state = State::Cancelled;
        SelectionOutcome::Cancelled
    }

    /// Lock the committed region for annotation; handles go away
    pub fn freeze(&mut self) -> Option<Rect> {
        match self.state {
            State::Adjusting { region, .. } => {
                self.state = State::Frozen { region };
                Some(region)
            }
            State::Frozen { region } => Some(region),
            _ => None,
        }
    }

    fn commit(&mut self, draft: Option<Rect>) -> SelectionOutcome {
        match draft {
            Some(region) if region.meets_min_size(self.min_size) => {
                log::debug!("Region committed: {:?}", region);
                self.state = State::Adjusting {
                    region,
                    hover: None,
                    drag: None,
                };
                SelectionOutcome::Committed(region)
            }
            _ => {
                log::debug!("Region {:?} too small, discarded", draft);
                self.state = State::Idle { pointer: None };
                SelectionOutcome::TooSmall
            }
        }
    }

    fn apply_drag(
        &mut self,
        region: Rect,
        hover: Option<Handle>,
        op: DragOp,
        x: i32,
        y: i32,
    ) -> SelectionOutcome {
        let (candidate, handle) = match op.handle {
            Handle::Move => {
                let moved = region.translate(x - op.last.0, y - op.last.1);
                if !moved.within(&self.screen) {
                    log::debug!("Move to {:?} rejected, outside screen", moved);
                    return SelectionOutcome::Rejected;
                }
                (moved, Handle::Move)
            }
            handle => {
                let (x, y) = self.screen.clamp_point(x, y);
                resize(&region, handle, x, y)
            }
        };

        if !candidate.meets_min_size(self.min_size) {
            log::debug!("Resize to {:?} rejected, below minimum size", candidate);
            return SelectionOutcome::Rejected;
        }

        self.state = State::Adjusting {
            region: candidate,
            hover: if hover.is_some() { Some(handle) } else { hover },
            drag: Some(DragOp {
                handle,
                last: (x, y),
            }),
        };
        SelectionOutcome::Adjusted(candidate)
    }

    /// Region being drawn, committed or frozen
    pub fn region(&self) -> Option<Rect> {
        match self.state {
            State::Drawing { region, .. } => region,
            State::Adjusting { region, .. } | State::Frozen { region } => Some(region),
            State::Idle { .. } | State::Cancelled => None,
        }
    }

    /// Committed region (adjustable or frozen)
    pub fn committed(&self) -> Option<Rect> {
        match self.state {
            State::Adjusting { region, .. } | State::Frozen { region } => Some(region),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle { .. })
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, State::Drawing { .. })
    }

    pub fn is_adjusting(&self) -> bool {
        matches!(self.state, State::Adjusting { .. })
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, State::Frozen { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, State::Cancelled)
    }

    /// Handle currently under the pointer (or being dragged)
    pub fn active_handle(&self) -> Option<Handle> {
        match self.state {
            State::Adjusting {
                drag: Some(op), ..
            } => Some(op.handle),
            State::Adjusting { hover, .. } => hover,
            _ => None,
        }
    }

    /// Cursor glyph the UI should show
    pub fn cursor(&self) -> CursorGlyph {
        match self.state {
            State::Idle { .. } | State::Drawing { .. } | State::Frozen { .. } => {
                CursorGlyph::Crosshair
            }
            State::Adjusting { .. } => self
                .active_handle()
                .map(Handle::cursor)
                .unwrap_or_default(),
            State::Cancelled => CursorGlyph::Arrow,
        }
    }

    /// Resize dots, only while the region is adjustable
    pub fn handle_dots(&self) -> Option<[HandleDot; 8]> {
        match self.state {
            State::Adjusting { region, .. } => Some(handle_dots(&region, self.dot_radius)),
            _ => None,
        }
    }

    /// Mask rectangles around the region, when masking is enabled
    pub fn mask(&self) -> Option<MaskRects> {
        if !self.mask_enabled {
            return None;
        }
        self.region()
            .map(|region| MaskRects::around(&region, &self.screen))
    }

    /// Reference lines through the pointer before drawing starts, as
    /// `(x0, y0, x1, y1)` segments: vertical first, then horizontal
    pub fn guide_lines(&self) -> Option<[(i32, i32, i32, i32); 2]> {
        match self.state {
            State::Idle {
                pointer: Some((x, y)),
            } => Some([
                (x, self.screen.top, x, self.screen.bottom),
                (self.screen.left, y, self.screen.right, y),
            ]),
            _ => None,
        }
    }

    /// Live size display, e.g. `300*200`
    pub fn size_label(&self) -> Option<String> {
        self.region()
            .map(|region| format!("{}*{}", region.width(), region.height()))
    }
}

/// Apply a resize handle rule: the opposite corner or edge stays pinned
/// and the dragged coordinates follow the pointer. Crossing the pinned side
/// reflects the handle so the drag continues from the other side.
fn resize(region: &Rect, handle: Handle, x: i32, y: i32) -> (Rect, Handle) {
    let prev = *region;
    match handle {
        Handle::TopLeft | Handle::TopRight | Handle::BottomLeft | Handle::BottomRight => {
            let pinned = match handle {
                Handle::TopLeft => (prev.right, prev.bottom),
                Handle::TopRight => (prev.left, prev.bottom),
                Handle::BottomLeft => (prev.right, prev.top),
                _ => (prev.left, prev.top),
            };
            let reflected = if x < pinned.0 && y < pinned.1 {
                Handle::TopLeft
            } else if x > pinned.0 && y > pinned.1 {
                Handle::BottomRight
            } else if x > pinned.0 && y < pinned.1 {
                Handle::TopRight
            } else if x < pinned.0 && y > pinned.1 {
                Handle::BottomLeft
            } else {
                handle
            };
            (Rect::from_points(pinned.0, pinned.1, x, y), reflected)
        }
        Handle::Left | Handle::Right => {
            let pinned = if handle == Handle::Left {
                prev.right
            } else {
                prev.left
            };
            let reflected = if x > pinned {
                Handle::Right
            } else if x < pinned {
                Handle::Left
            } else {
                handle
            };
            (Rect::from_points(pinned, prev.top, x, prev.bottom), reflected)
        }
        Handle::Top | Handle::Bottom => {
            let pinned = if handle == Handle::Top {
                prev.bottom
            } else {
                prev.top
            };
            let reflected = if y > pinned {
                Handle::Bottom
            } else if y < pinned {
                Handle::Top
            } else {
                handle
            };
            (Rect::from_points(prev.left, pinned, prev.right, y), reflected)
        }
        Handle::Move => (prev, handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(x0: i32, y0: i32, x1: i32, y1: i32) -> SelectionMachine {
        let mut sm = SelectionMachine::new(1920, 1080, true);
        sm.handle(PointerEvent::Down { x: x0, y: y0 });
        sm.handle(PointerEvent::Drag { x: x1, y: y1 });
        assert!(matches!(
            sm.handle(PointerEvent::Up { x: x1, y: y1 }),
            SelectionOutcome::Committed(_)
        ));
        sm
    }

    fn drag(sm: &mut SelectionMachine, from: (i32, i32), to: (i32, i32)) -> SelectionOutcome {
        sm.handle(PointerEvent::Down { x: from.0, y: from.1 });
        let outcome = sm.handle(PointerEvent::Drag { x: to.0, y: to.1 });
        sm.handle(PointerEvent::Up { x: to.0, y: to.1 });
        outcome
    }

    #[test]
    fn test_draw_and_commit() {
        let sm = committed(100, 100, 400, 300);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
        assert!(sm.is_adjusting());
        assert_eq!(sm.size_label().as_deref(), Some("300*200"));
        assert!(sm.handle_dots().is_some());
        assert!(sm.guide_lines().is_none());
    }

    #[test]
    fn test_draw_backwards_normalizes() {
        let sm = committed(400, 300, 100, 100);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
    }

    #[test]
    fn test_too_small_returns_to_idle() {
        let mut sm = SelectionMachine::new(1920, 1080, true);
        sm.handle(PointerEvent::Down { x: 100, y: 100 });
        sm.handle(PointerEvent::Drag { x: 400, y: 110 });
        assert_eq!(
            sm.handle(PointerEvent::Up { x: 400, y: 110 }),
            SelectionOutcome::TooSmall
        );
        assert!(sm.is_idle());
        assert!(sm.region().is_none());
    }

    #[test]
    fn test_click_without_drag_is_too_small() {
        let mut sm = SelectionMachine::new(1920, 1080, true);
        sm.handle(PointerEvent::Down { x: 100, y: 100 });
        assert_eq!(
            sm.handle(PointerEvent::Up { x: 100, y: 100 }),
            SelectionOutcome::TooSmall
        );
    }

    #[test]
    fn test_committed_region_invariant_over_drag_grid() {
        for dx in [-200, -31, -30, -29, 0, 29, 30, 31, 200] {
            for dy in [-200, -30, -10, 0, 10, 30, 200] {
                let mut sm = SelectionMachine::new(1920, 1080, false);
                sm.handle(PointerEvent::Down { x: 500, y: 500 });
                sm.handle(PointerEvent::Drag { x: 500 + dx, y: 500 + dy });
                match sm.handle(PointerEvent::Up { x: 500 + dx, y: 500 + dy }) {
                    SelectionOutcome::Committed(r) => {
                        assert!(r.left < r.right && r.top < r.bottom);
                        assert!(r.width() >= MIN_REGION_SIZE && r.height() >= MIN_REGION_SIZE);
                    }
                    SelectionOutcome::TooSmall => {
                        assert!(dx.abs() < MIN_REGION_SIZE || dy.abs() < MIN_REGION_SIZE)
                    }
                    other => panic!("unexpected outcome {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_mask_follows_draft() {
        let mut sm = SelectionMachine::new(800, 600, true);
        sm.handle(PointerEvent::Down { x: 100, y: 100 });
        sm.handle(PointerEvent::Drag { x: 300, y: 200 });
        let mask = sm.mask().unwrap();
        assert_eq!(mask.top, Rect::new(0, 0, 800, 100));
        assert_eq!(mask.right, Rect::new(300, 100, 800, 200));

        sm.set_mask_enabled(false);
        assert!(sm.mask().is_none());
    }

    #[test]
    fn test_idle_hover_produces_guides() {
        let mut sm = SelectionMachine::new(800, 600, true);
        assert_eq!(sm.handle(PointerEvent::Move { x: 10, y: 20 }), SelectionOutcome::Guides);
        assert_eq!(
            sm.guide_lines(),
            Some([(10, 0, 10, 600), (0, 20, 800, 20)])
        );
    }

    #[test]
    fn test_hover_sets_cursor_without_state_change() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(
            sm.handle(PointerEvent::Move { x: 100, y: 100 }),
            SelectionOutcome::Hover(Some(Handle::TopLeft))
        );
        assert_eq!(sm.cursor(), CursorGlyph::TopLeftCorner);
        sm.handle(PointerEvent::Move { x: 250, y: 200 });
        assert_eq!(sm.cursor(), CursorGlyph::Move);
        sm.handle(PointerEvent::Move { x: 10, y: 10 });
        assert_eq!(sm.cursor(), CursorGlyph::Arrow);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
    }

    #[test]
    fn test_corner_resize_pins_opposite_corner() {
        let mut sm = committed(100, 100, 400, 300);
        drag(&mut sm, (400, 300), (500, 350));
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 500, 350)));
        drag(&mut sm, (100, 100), (50, 80));
        assert_eq!(sm.committed(), Some(Rect::new(50, 80, 500, 350)));
    }

    #[test]
    fn test_edge_resize_moves_one_coordinate() {
        let mut sm = committed(100, 100, 400, 300);
        let (_, cy) = Rect::new(100, 100, 400, 300).center();
        drag(&mut sm, (100, cy), (60, cy + 40));
        assert_eq!(sm.committed(), Some(Rect::new(60, 100, 400, 300)));
        drag(&mut sm, (230, 300), (230 + 25, 420));
        assert_eq!(sm.committed(), Some(Rect::new(60, 100, 400, 420)));
    }

    #[test]
    fn test_corner_drag_across_pinned_corner_reflects() {
        let mut sm = committed(100, 100, 400, 300);
        sm.handle(PointerEvent::Down { x: 400, y: 300 });
        sm.handle(PointerEvent::Drag { x: 50, y: 40 });
        assert_eq!(sm.committed(), Some(Rect::new(50, 40, 100, 100)));
        assert_eq!(sm.active_handle(), Some(Handle::TopLeft));
    }

    #[test]
    fn test_resize_below_min_size_rejected() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(drag(&mut sm, (400, 300), (110, 300)), SelectionOutcome::Rejected);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
    }

    #[test]
    fn test_resize_clamped_to_screen() {
        let mut sm = committed(100, 100, 400, 300);
        drag(&mut sm, (400, 300), (5000, -50));
        let r = sm.committed().unwrap();
        assert!(r.within(&sm.screen()));
        assert_eq!(r, Rect::new(100, 0, 1920, 100));
    }

    #[test]
    fn test_move_translates_by_delta() {
        let mut sm = committed(100, 100, 400, 300);
        drag(&mut sm, (250, 200), (260, 190));
        assert_eq!(sm.committed(), Some(Rect::new(110, 90, 410, 290)));
    }

    #[test]
    fn test_move_zero_delta_is_identity() {
        let mut sm = committed(100, 100, 400, 300);
        drag(&mut sm, (250, 200), (250, 200));
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
    }

    #[test]
    fn test_move_out_of_screen_rejected() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(drag(&mut sm, (250, 200), (100, 200)), SelectionOutcome::Rejected);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
        // Flush against the edge is still inside
        drag(&mut sm, (250, 200), (150, 100));
        assert_eq!(sm.committed(), Some(Rect::new(0, 0, 300, 200)));
    }

    #[test]
    fn test_right_click_cancels_from_any_state() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(
            sm.handle(PointerEvent::RightDown { x: 0, y: 0 }),
            SelectionOutcome::Cancelled
        );
        assert!(sm.is_cancelled());
        assert!(sm.region().is_none());
        assert_eq!(sm.handle(PointerEvent::Down { x: 1, y: 1 }), SelectionOutcome::Unchanged);
    }

    #[test]
    fn test_double_click_requests_export() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(
            sm.handle(PointerEvent::DoubleClick { x: 200, y: 200 }),
            SelectionOutcome::ExportRequested(Rect::new(100, 100, 400, 300))
        );
        assert_eq!(
            sm.handle(PointerEvent::DoubleClick { x: 10, y: 10 }),
            SelectionOutcome::Unchanged
        );
    }

    #[test]
    fn test_freeze_removes_handles() {
        let mut sm = committed(100, 100, 400, 300);
        assert_eq!(sm.freeze(), Some(Rect::new(100, 100, 400, 300)));
        assert!(sm.is_frozen());
        assert!(sm.handle_dots().is_none());
        assert_eq!(drag(&mut sm, (400, 300), (500, 500)), SelectionOutcome::Unchanged);
        assert_eq!(sm.committed(), Some(Rect::new(100, 100, 400, 300)));
    }
}
