//! Annotation types layered over a captured region
//!
//! All marks store coordinates in global screen pixels.

use crate::config::ShapeColor;

/// Kind of mark a tool produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkKind {
    #[default]
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Freehand,
    Text,
    Blur,
}

impl MarkKind {
    /// Kinds shaped by a two-point drag (anchor and moving endpoint)
    pub fn is_two_point(self) -> bool {
        matches!(
            self,
            MarkKind::Rectangle
                | MarkKind::Ellipse
                | MarkKind::Line
                | MarkKind::Arrow
                | MarkKind::Blur
        )
    }
}

/// Two-point mark: rectangle, ellipse, line, arrow or blur area
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeMark {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

impl ShapeMark {
    pub fn anchored(x: f32, y: f32, color: ShapeColor, stroke_width: f32) -> Self {
        Self {
            start_x: x,
            start_y: y,
            end_x: x,
            end_y: y,
            color,
            stroke_width,
        }
    }
}

/// Freehand stroke, points kept in capture order
#[derive(Clone, Debug, PartialEq)]
pub struct FreehandMark {
    pub points: Vec<(f32, f32)>,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Text mark anchored at its top-left corner
#[derive(Clone, Debug, PartialEq)]
pub struct TextMark {
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub color: ShapeColor,
    pub font_size: u32,
}

/// A user-drawn annotation
#[derive(Clone, Debug, PartialEq)]
pub enum Mark {
    Rectangle(ShapeMark),
    Ellipse(ShapeMark),
    Line(ShapeMark),
    Arrow(ShapeMark),
    Freehand(FreehandMark),
    Text(TextMark),
    Blur(ShapeMark),
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Rectangle(_) => MarkKind::Rectangle,
            Mark::Ellipse(_) => MarkKind::Ellipse,
            Mark::Line(_) => MarkKind::Line,
            Mark::Arrow(_) => MarkKind::Arrow,
            Mark::Freehand(_) => MarkKind::Freehand,
            Mark::Text(_) => MarkKind::Text,
            Mark::Blur(_) => MarkKind::Blur,
        }
    }

    /// Wrap a two-point shape as the mark of `kind`, if `kind` is two-point
    pub fn from_shape(kind: MarkKind, shape: ShapeMark) -> Option<Mark> {
        match kind {
            MarkKind::Rectangle => Some(Mark::Rectangle(shape)),
            MarkKind::Ellipse => Some(Mark::Ellipse(shape)),
            MarkKind::Line => Some(Mark::Line(shape)),
            MarkKind::Arrow => Some(Mark::Arrow(shape)),
            MarkKind::Blur => Some(Mark::Blur(shape)),
            MarkKind::Freehand | MarkKind::Text => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeMark> {
        match self {
            Mark::Rectangle(s) | Mark::Ellipse(s) | Mark::Line(s) | Mark::Arrow(s) | Mark::Blur(s) => {
                Some(s)
            }
            Mark::Freehand(_) | Mark::Text(_) => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeMark> {
        match self {
            Mark::Rectangle(s) | Mark::Ellipse(s) | Mark::Line(s) | Mark::Arrow(s) | Mark::Blur(s) => {
                Some(s)
            }
            Mark::Freehand(_) | Mark::Text(_) => None,
        }
    }
}
