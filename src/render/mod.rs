//! Mark rendering module
//!
//! This module contains:
//! - Geometry calculations shared by the rasterizer and its tests
//! - Image rendering using tiny-skia
//! - The single dispatch point that draws any mark kind

pub mod geometry;
pub mod image;

use ::image::RgbaImage;
use std::time::Instant;

use crate::annotations::TextBuffer;
use crate::annotations::text::TEXT_INSET;
use crate::config::ShapeColor;
use crate::domain::{Mark, Rect};

/// Glyph drawing supplied by the UI layer, which owns the fonts
pub trait TextPainter {
    /// Draw `text` with its top-left corner at `(x, y)` in image coordinates
    fn draw_text(
        &self,
        img: &mut RgbaImage,
        x: f32,
        y: f32,
        text: &str,
        color: ShapeColor,
        font_size: u32,
    );
}

/// Painter that leaves text out, for frames where no fonts are loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct NoText;

impl TextPainter for NoText {
    fn draw_text(&self, _: &mut RgbaImage, _: f32, _: f32, _: &str, _: ShapeColor, _: u32) {}
}

/// Draw one mark onto an image whose top-left corner is `origin`
pub fn draw_mark(img: &mut RgbaImage, mark: &Mark, origin: &Rect, text: &dyn TextPainter) {
    match mark {
        Mark::Rectangle(shape) => image::draw_rectangle(img, shape, origin),
        Mark::Ellipse(shape) => image::draw_ellipse(img, shape, origin),
        Mark::Line(shape) => image::draw_line(img, shape, origin),
        Mark::Arrow(shape) => image::draw_arrow(img, shape, origin),
        Mark::Freehand(path) => image::draw_freehand(img, path, origin),
        Mark::Blur(shape) => image::draw_blur(img, shape, origin),
        Mark::Text(mark) => text.draw_text(
            img,
            mark.x - origin.left as f32 + TEXT_INSET,
            mark.y - origin.top as f32,
            &mark.content,
            mark.color,
            mark.font_size,
        ),
    }
}

/// Draw marks in commit order, so later marks layer over earlier ones
pub fn draw_marks(img: &mut RgbaImage, marks: &[Mark], origin: &Rect, text: &dyn TextPainter) {
    for mark in marks {
        draw_mark(img, mark, origin, text);
    }
}

/// Draw a text mark in edit: content, dashed box, and the caret when it is lit
pub fn draw_text_edit(
    img: &mut RgbaImage,
    buffer: &TextBuffer,
    origin: &Rect,
    now: Instant,
    text: &dyn TextPainter,
) {
    let (x, y) = buffer.origin();
    text.draw_text(
        img,
        x - origin.left as f32 + TEXT_INSET,
        y - origin.top as f32,
        buffer.content(),
        buffer.color(),
        buffer.font_size(),
    );
    image::draw_dashed_box(img, buffer.edit_box(), buffer.color(), origin);
    if buffer.caret_visible(now) {
        image::draw_caret(img, buffer.caret_line(), buffer.color(), origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FreehandMark, ShapeMark, TextMark};
    use ::image::Rgba;
    use std::cell::RefCell;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    fn shape(x0: f32, y0: f32, x1: f32, y1: f32, width: f32) -> ShapeMark {
        ShapeMark {
            start_x: x0,
            start_y: y0,
            end_x: x1,
            end_y: y1,
            color: ShapeColor::RED,
            stroke_width: width,
        }
    }

    fn is_reddish(p: &Rgba<u8>) -> bool {
        p[0] > 200 && p[1] < 80 && p[2] < 80
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(f32, f32, String)>>,
    }

    impl TextPainter for Recorder {
        fn draw_text(&self, _: &mut RgbaImage, x: f32, y: f32, text: &str, _: ShapeColor, _: u32) {
            self.calls.borrow_mut().push((x, y, text.to_string()));
        }
    }

    #[test]
    fn test_rectangle_outline_respects_origin() {
        let mut img = canvas(100, 100);
        let origin = Rect::new(100, 100, 200, 200);
        let marks = [Mark::Rectangle(shape(120.0, 120.0, 180.0, 180.0, 4.0))];
        draw_marks(&mut img, &marks, &origin, &NoText);

        assert!(is_reddish(img.get_pixel(20, 50)));
        assert!(is_reddish(img.get_pixel(50, 80)));
        // Interior stays untouched
        assert_eq!(*img.get_pixel(50, 50), WHITE);
    }

    #[test]
    fn test_line_and_freehand_draw_strokes() {
        let mut img = canvas(60, 60);
        let origin = Rect::new(0, 0, 60, 60);
        let path = FreehandMark {
            points: vec![(10.0, 50.0), (30.0, 50.0), (50.0, 50.0)],
            color: ShapeColor::RED,
            stroke_width: 3.0,
        };
        let marks = [
            Mark::Line(shape(10.0, 10.0, 50.0, 10.0, 3.0)),
            Mark::Freehand(path),
        ];
        draw_marks(&mut img, &marks, &origin, &NoText);

        assert!(is_reddish(img.get_pixel(30, 10)));
        assert!(is_reddish(img.get_pixel(40, 50)));
        assert_eq!(*img.get_pixel(30, 30), WHITE);
    }

    #[test]
    fn test_blur_averages_blocks() {
        let mut img = RgbaImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                WHITE
            }
        });
        let origin = Rect::new(0, 0, 16, 16);
        draw_marks(&mut img, &[Mark::Blur(shape(0.0, 0.0, 7.0, 7.0, 1.0))], &origin, &NoText);

        let first = *img.get_pixel(0, 0);
        assert!(first[0] > 100 && first[0] < 150);
        assert_eq!(*img.get_pixel(7, 7), first);
        // Outside the mark nothing changed
        assert_eq!(*img.get_pixel(9, 8), WHITE);
    }

    #[test]
    fn test_text_delegated_with_local_coordinates() {
        let mut img = canvas(50, 50);
        let origin = Rect::new(10, 20, 60, 70);
        let painter = Recorder::default();
        let mark = Mark::Text(TextMark {
            x: 15.0,
            y: 30.0,
            content: "note".into(),
            color: ShapeColor::RED,
            font_size: 18,
        });
        draw_marks(&mut img, &[mark], &origin, &painter);

        let calls = painter.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (5.0 + TEXT_INSET, 10.0, "note".to_string()));
    }

    #[test]
    fn test_text_edit_draws_dashed_box() {
        let mut img = canvas(120, 60);
        let origin = Rect::new(0, 0, 120, 60);
        let start = Instant::now();
        let buffer = TextBuffer::started_at(10.0, 10.0, ShapeColor::RED, 18, start);
        draw_text_edit(&mut img, &buffer, &origin, start, &NoText);

        assert!(img.pixels().any(|p| *p != WHITE));
        // Left edge of the box lies on x = 10
        let touched = (10..30).any(|y| *img.get_pixel(10, y) != WHITE);
        assert!(touched);
    }

    #[test]
    fn test_pointer_marker_darkens_tip_area() {
        let mut img = canvas(40, 40);
        image::draw_pointer_marker(&mut img, 10.0, 10.0);
        let inside = img.get_pixel(13, 20);
        assert!(inside[0] < 200);
        assert_eq!(*img.get_pixel(35, 5), WHITE);
    }
}
