//! Image rendering for marks using tiny-skia
//!
//! These functions draw marks onto an RgbaImage whose top-left pixel sits at
//! `origin` in screen coordinates.

use image::RgbaImage;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use super::geometry::{self, arrow, pointer};
use crate::config::ShapeColor;
use crate::domain::{FreehandMark, Rect, ShapeMark};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(size) = tiny_skia::IntSize::from_wh(img.width(), img.height()) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn paint_for(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(width: f32) -> Stroke {
    Stroke {
        width: width.max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn stroke_path(img: &mut RgbaImage, path: &Path, color: ShapeColor, width: f32) {
    let paint = paint_for(color);
    let stroke = stroke_for(width);
    with_pixmap(img, |pixmap| {
        pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
    });
}

/// Shape endpoints translated into image coordinates
fn local(shape: &ShapeMark, origin: &Rect) -> (f32, f32, f32, f32) {
    let (ox, oy) = (origin.left as f32, origin.top as f32);
    (
        shape.start_x - ox,
        shape.start_y - oy,
        shape.end_x - ox,
        shape.end_y - oy,
    )
}

fn build_rect_path(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(min_x, min_y);
    pb.line_to(max_x, min_y);
    pb.line_to(max_x, max_y);
    pb.line_to(min_x, max_y);
    pb.close();
    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let kx = rx * geometry::BEZIER_K;
    let ky = ry * geometry::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.close();
    pb.finish()
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(
    start_x: f32,
    start_y: f32,
    end_x: f32,
    end_y: f32,
    head_size: f32,
) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(start_x, start_y);
    pb.line_to(end_x, end_y);

    if let Some((head1_x, head1_y, head2_x, head2_y)) =
        arrow::head_points(start_x, start_y, end_x, end_y, head_size)
    {
        pb.move_to(end_x, end_y);
        pb.line_to(head1_x, head1_y);
        pb.move_to(end_x, end_y);
        pb.line_to(head2_x, head2_y);
    }

    pb.finish()
}

pub fn draw_rectangle(img: &mut RgbaImage, shape: &ShapeMark, origin: &Rect) {
    let (x1, y1, x2, y2) = local(shape, origin);
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(x1, y1, x2, y2);
    if let Some(path) = build_rect_path(min_x, min_y, max_x, max_y) {
        stroke_path(img, &path, shape.color, shape.stroke_width);
    }
}

pub fn draw_ellipse(img: &mut RgbaImage, shape: &ShapeMark, origin: &Rect) {
    let (x1, y1, x2, y2) = local(shape, origin);
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(x1, y1, x2, y2);
    let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(min_x, min_y, max_x, max_y);
    if let Some(path) = build_ellipse_path(cx, cy, rx, ry) {
        stroke_path(img, &path, shape.color, shape.stroke_width);
    }
}

pub fn draw_line(img: &mut RgbaImage, shape: &ShapeMark, origin: &Rect) {
    let (x1, y1, x2, y2) = local(shape, origin);
    let mut pb = PathBuilder::new();
    pb.move_to(x1, y1);
    pb.line_to(x2, y2);
    if let Some(path) = pb.finish() {
        stroke_path(img, &path, shape.color, shape.stroke_width);
    }
}

pub fn draw_arrow(img: &mut RgbaImage, shape: &ShapeMark, origin: &Rect) {
    let (x1, y1, x2, y2) = local(shape, origin);
    let head_size = arrow::head_size(shape.stroke_width);
    if let Some(path) = build_arrow_path(x1, y1, x2, y2, head_size) {
        stroke_path(img, &path, shape.color, shape.stroke_width);
    }
}

/// Stroke a freehand path as one polyline through its points in order
pub fn draw_freehand(img: &mut RgbaImage, mark: &FreehandMark, origin: &Rect) {
    let (ox, oy) = (origin.left as f32, origin.top as f32);
    let mut points = mark.points.iter().map(|&(x, y)| (x - ox, y - oy));
    let Some((first_x, first_y)) = points.next() else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(first_x, first_y);
    let mut segments = 0;
    for (x, y) in points {
        pb.line_to(x, y);
        segments += 1;
    }
    if segments == 0 {
        // A single point still leaves a round dot
        pb.line_to(first_x, first_y + 0.01);
    }
    if let Some(path) = pb.finish() {
        stroke_path(img, &path, mark.color, mark.stroke_width);
    }
}

/// Pixelate the area covered by a blur mark
pub fn draw_blur(img: &mut RgbaImage, shape: &ShapeMark, origin: &Rect) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let block_size = geometry::blur_block_size(shape.stroke_width);
    let (x1, y1, x2, y2) = local(shape, origin);
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(x1, y1, x2, y2);

    let min_x = (min_x.round().max(0.0) as u32).min(img.width() - 1);
    let min_y = (min_y.round().max(0.0) as u32).min(img.height() - 1);
    let max_x = (max_x.round().max(0.0) as u32).min(img.width() - 1);
    let max_y = (max_y.round().max(0.0) as u32).min(img.height() - 1);

    let mut block_y = min_y;
    while block_y <= max_y {
        let block_end_y = (block_y + block_size - 1).min(max_y);

        let mut block_x = min_x;
        while block_x <= max_x {
            let block_end_x = (block_x + block_size - 1).min(max_x);

            let mut total = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..=block_end_y {
                for px in block_x..=block_end_x {
                    let pixel = img.get_pixel(px, py);
                    for (sum, channel) in total.iter_mut().zip(pixel.0) {
                        *sum += channel as u64;
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let avg_color = image::Rgba(total.map(|sum| (sum / pixel_count) as u8));
                for py in block_y..=block_end_y {
                    for px in block_x..=block_end_x {
                        img.put_pixel(px, py, avg_color);
                    }
                }
            }

            block_x += block_size;
        }
        block_y += block_size;
    }
}

/// Dashed outline of a text edit box, given in screen coordinates
pub fn draw_dashed_box(img: &mut RgbaImage, bounds: (f32, f32, f32, f32), color: ShapeColor, origin: &Rect) {
    let (ox, oy) = (origin.left as f32, origin.top as f32);
    let (x0, y0, x1, y1) = bounds;
    let Some(path) = build_rect_path(x0 - ox, y0 - oy, x1 - ox, y1 - oy) else {
        return;
    };
    let paint = paint_for(color);
    let stroke = Stroke {
        width: 1.0,
        dash: StrokeDash::new(vec![5.0, 2.0], 0.0),
        ..Default::default()
    };
    with_pixmap(img, |pixmap| {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    });
}

/// Vertical caret segment `(x, top, bottom)` in screen coordinates
pub fn draw_caret(img: &mut RgbaImage, caret: (f32, f32, f32), color: ShapeColor, origin: &Rect) {
    let (ox, oy) = (origin.left as f32, origin.top as f32);
    let (x, top, bottom) = caret;
    let mut pb = PathBuilder::new();
    pb.move_to(x - ox, top - oy);
    pb.line_to(x - ox, bottom - oy);
    if let Some(path) = pb.finish() {
        stroke_path(img, &path, color, 1.0);
    }
}

/// Draw the pointer marker with its tip at `(px, py)`, relative to the image
pub fn draw_pointer_marker(img: &mut RgbaImage, px: f32, py: f32) {
    let [(ax, ay), (bx, by), (cx, cy)] = pointer::polygon(px, py);
    let mut pb = PathBuilder::new();
    pb.move_to(ax, ay);
    pb.line_to(bx, by);
    pb.line_to(cx, cy);
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };

    let mut fill = Paint::default();
    let [r, g, b, a] = pointer::FILL;
    fill.set_color_rgba8(r, g, b, a);
    fill.anti_alias = true;

    let mut outline = Paint::default();
    let [r, g, b, a] = pointer::OUTLINE;
    outline.set_color_rgba8(r, g, b, a);
    outline.anti_alias = true;

    let stroke = Stroke {
        width: pointer::OUTLINE_WIDTH,
        line_join: LineJoin::Round,
        ..Default::default()
    };

    with_pixmap(img, |pixmap| {
        pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
    });
}
