use crate::diagram::composite::RgbaBuffer;
use crate::diagram::model::{Color, Point, Stroke};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_points(a: (i32, i32), b: (i32, i32), pad: i32) -> Self {
        let min_x = bound(i64::from(a.0.min(b.0)) - i64::from(pad));
        let max_x = bound(i64::from(a.0.max(b.0)) + i64::from(pad));
        let min_y = bound(i64::from(a.1.min(b.1)) - i64::from(pad));
        let max_y = bound(i64::from(a.1.max(b.1)) + i64::from(pad));
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1).max(1),
            height: (max_y - min_y + 1).max(1),
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        DirtyRect {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).max(1),
            height: max_y.saturating_sub(min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.right().clamp(0, max_w);
        let y1 = self.bottom().clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Far-off pointer positions are pulled in so a rect's width and far edge
/// always fit in an `i32`.
fn bound(value: i64) -> i32 {
    const LIMIT: i64 = (i32::MAX / 2) as i64;
    value.clamp(-LIMIT, LIMIT) as i32
}

pub fn segment_dirty_bounds(start: (i32, i32), end: (i32, i32), stroke_width: u32) -> DirtyRect {
    let radius = (stroke_width.max(1) as f32 / 2.0).ceil() as i32;
    DirtyRect::from_points(start, end, radius + 1)
}

/// Stamps one brush disk; used as pointer-down feedback.
pub fn draw_dot(
    buffer: &mut RgbaBuffer,
    point: Point,
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    let center = point.to_pixel();
    draw_capsule(buffer, center, center, color, stroke_width)
}

/// Draws the segment `from -> to` with round caps. This is the incremental
/// path used while a stroke is in progress.
pub fn draw_segment(
    buffer: &mut RgbaBuffer,
    from: Point,
    to: Point,
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    draw_capsule(buffer, from.to_pixel(), to.to_pixel(), color, stroke_width)
}

/// Draws a whole stroke as a connected polyline with its own brush.
pub fn draw_stroke(buffer: &mut RgbaBuffer, stroke: &Stroke) -> Option<DirtyRect> {
    let points = stroke.points();
    match points {
        [] => None,
        [only] => draw_dot(buffer, *only, stroke.color(), stroke.width()),
        _ => points
            .windows(2)
            .filter_map(|segment| {
                draw_segment(
                    buffer,
                    segment[0],
                    segment[1],
                    stroke.color(),
                    stroke.width(),
                )
            })
            .reduce(DirtyRect::union),
    }
}

/// Full repaint: the composited floor, then every stroke in commit order.
pub fn repaint<'a>(floor: &RgbaBuffer, strokes: impl IntoIterator<Item = &'a Stroke>) -> RgbaBuffer {
    let mut surface = floor.clone();
    for stroke in strokes {
        draw_stroke(&mut surface, stroke);
    }
    surface
}

fn draw_capsule(
    buffer: &mut RgbaBuffer,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    let clip = segment_dirty_bounds(start, end, stroke_width).clamp(buffer.width, buffer.height)?;
    let radius = stroke_width.max(1) as f32 / 2.0;
    let radius_sq = radius * radius;
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            if point_segment_distance_sq((x, y), start, end) <= radius_sq {
                buffer.set_pixel(x, y, color);
            }
        }
    }
    Some(clip)
}

fn point_segment_distance_sq(point: (i32, i32), start: (i32, i32), end: (i32, i32)) -> f32 {
    let px = point.0 as f32;
    let py = point.1 as f32;
    let sx = start.0 as f32;
    let sy = start.1 as f32;
    let ex = end.0 as f32;
    let ey = end.1 as f32;

    let dx = ex - sx;
    let dy = ey - sy;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        let ddx = px - sx;
        let ddy = py - sy;
        return ddx * ddx + ddy * ddy;
    }

    let t = (((px - sx) * dx + (py - sy) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = sx + t * dx;
    let cy = sy + t * dy;
    let ddx = px - cx;
    let ddy = py - cy;
    ddx * ddx + ddy * ddy
}
