//! Annotation engine: typed mark creation, update, commit and undo
//!
//! This module provides:
//! - The engine owning the current draft and the undo history
//! - The live text buffer for text marks (text.rs)
//! - Message dispatch for draw actions (handlers.rs)

pub mod handlers;
pub mod text;

use crate::config::ToolSettings;
use crate::domain::{FreehandMark, Mark, MarkKind, Rect, ShapeMark};
use crate::session::messages::KeyInput;

pub use text::TextBuffer;

/// Marks layered over a committed region
#[derive(Debug, Clone)]
pub struct AnnotationEngine {
    region: Rect,
    settings: ToolSettings,
    /// Mark being dragged out, not yet in history
    draft: Option<Mark>,
    /// Whether the draft received at least one drag update
    draft_moved: bool,
    text: Option<TextBuffer>,
    history: Vec<Mark>,
}

impl AnnotationEngine {
    pub fn new(region: Rect, settings: ToolSettings) -> Self {
        Self {
            region,
            settings,
            draft: None,
            draft_moved: false,
            text: None,
            history: Vec::new(),
        }
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Replace the current tool settings; committed marks keep theirs
    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings;
    }

    /// Start a mark of `kind` at `(x, y)`.
    ///
    /// A text mark in edit is finalized first. Non-text anchors are clamped
    /// into the region.
    pub fn begin_mark(&mut self, kind: MarkKind, x: f32, y: f32) {
        self.finalize_text();
        self.draft = None;
        self.draft_moved = false;

        let color = self.settings.color;
        let stroke_width = self.settings.stroke_width as f32;

        if kind == MarkKind::Text {
            log::debug!("Text mark started at ({x}, {y})");
            self.text = Some(TextBuffer::new(x, y, color, self.settings.font_size));
            return;
        }

        let (x, y) = clamp_to(&self.region, 0.0, x, y);
        self.draft = match kind {
            MarkKind::Freehand => Some(Mark::Freehand(FreehandMark {
                points: vec![(x, y)],
                color,
                stroke_width,
            })),
            kind => Mark::from_shape(kind, ShapeMark::anchored(x, y, color, stroke_width)),
        };
    }

    /// Drag the current mark to `(x, y)`, kept inside the region shrunk by
    /// half the stroke width. Freehand appends; text ignores drags.
    pub fn update_mark(&mut self, x: f32, y: f32) {
        let region = self.region;
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        match draft {
            Mark::Freehand(path) => {
                let point = clamp_to(&region, path.stroke_width / 2.0, x, y);
                path.points.push(point);
            }
            Mark::Text(_) => return,
            shape_mark => {
                let Some(shape) = shape_mark.as_shape_mut() else {
                    return;
                };
                let (x, y) = clamp_to(&region, shape.stroke_width / 2.0, x, y);
                shape.end_x = x;
                shape.end_y = y;
            }
        }
        self.draft_moved = true;
    }

    /// Push the current mark onto the undo history.
    ///
    /// A draft that was never dragged is dropped. Text marks are committed
    /// only through [`finalize_text`](Self::finalize_text).
    pub fn commit_mark(&mut self) -> Option<&Mark> {
        let draft = self.draft.take()?;
        if !std::mem::take(&mut self.draft_moved) {
            log::debug!("Discarding mark that was never dragged");
            return None;
        }
        self.history.push(draft);
        self.history.last()
    }

    /// Route a keystroke to the text mark in edit; false when none is
    pub fn key_input(&mut self, key: KeyInput) -> bool {
        match self.text.as_mut() {
            Some(text) => {
                text.input(key);
                true
            }
            None => false,
        }
    }

    /// End text editing: commit non-blank content, discard otherwise
    pub fn finalize_text(&mut self) -> Option<&Mark> {
        let text = self.text.take()?;
        match text.finish() {
            Some(mark) => {
                self.history.push(Mark::Text(mark));
                self.history.last()
            }
            None => {
                log::debug!("Discarding empty text mark");
                None
            }
        }
    }

    /// Remove the most recently committed mark
    pub fn undo(&mut self) -> Option<Mark> {
        self.history.pop()
    }

    /// Drop everything, at session end
    pub fn clear(&mut self) {
        self.draft = None;
        self.draft_moved = false;
        self.text = None;
        self.history.clear();
    }

    /// Committed marks, oldest first
    pub fn marks(&self) -> &[Mark] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Preview of the mark being dragged
    pub fn current_mark(&self) -> Option<Mark> {
        self.draft.clone()
    }

    /// Text mark in edit, if any
    pub fn text_in_edit(&self) -> Option<&TextBuffer> {
        self.text.as_ref()
    }
}

/// Clamp a point into `region` shrunk by `inset` on every side
fn clamp_to(region: &Rect, inset: f32, x: f32, y: f32) -> (f32, f32) {
    let (left, right) = (region.left as f32 + inset, region.right as f32 - inset);
    let (top, bottom) = (region.top as f32 + inset, region.bottom as f32 - inset);
    // A stroke wider than the region collapses onto its center line
    let cx = if left <= right { x.clamp(left, right) } else { (left + right) / 2.0 };
    let cy = if top <= bottom { y.clamp(top, bottom) } else { (top + bottom) / 2.0 };
    (cx, cy)
}
