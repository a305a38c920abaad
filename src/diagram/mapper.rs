use crate::diagram::model::{Point, SurfaceSize};

/// Pointer position as reported by the host, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where the surface is currently displayed, in the same space as
/// [`PointerPosition`]. Hosts must re-read this on every event since a
/// responsive layout can rescale the surface between events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rect displaying `size` at `scale`, anchored at the origin.
    pub fn scaled(size: SurfaceSize, scale: f32) -> Self {
        Self::new(0.0, 0.0, size.width as f32 * scale, size.height as f32 * scale)
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Maps a display position into logical surface space. Each axis is scaled
/// independently. Returns `None` when the displayed surface has no area or
/// the position is not a finite number.
pub fn map_to_logical(
    position: PointerPosition,
    rect: SurfaceRect,
    logical: SurfaceSize,
) -> Option<Point> {
    if !(position.x.is_finite() && position.y.is_finite()) {
        return None;
    }
    if rect.is_degenerate() || logical.is_empty() {
        return None;
    }
    let scale_x = logical.width as f32 / rect.width;
    let scale_y = logical.height as f32 / rect.height;
    Some(Point::new(
        (position.x - rect.left) * scale_x,
        (position.y - rect.top) * scale_y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGICAL: SurfaceSize = SurfaceSize::new(500, 400);

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-4, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_scale_subtracts_offset() {
        let rect = SurfaceRect::new(10.0, 20.0, 500.0, 400.0);
        let mapped = map_to_logical(PointerPosition::new(110.0, 70.0), rect, LOGICAL);
        assert_eq!(mapped, Some(Point::new(100.0, 50.0)));
    }

    #[test]
    fn double_size_display_maps_to_same_logical_point() {
        let at_1x = map_to_logical(
            PointerPosition::new(125.0, 80.0),
            SurfaceRect::scaled(LOGICAL, 1.0),
            LOGICAL,
        )
        .expect("1x");
        let at_2x = map_to_logical(
            PointerPosition::new(250.0, 160.0),
            SurfaceRect::scaled(LOGICAL, 2.0),
            LOGICAL,
        )
        .expect("2x");
        assert_close(at_1x, at_2x);
    }

    #[test]
    fn axes_scale_independently() {
        let rect = SurfaceRect::new(0.0, 0.0, 250.0, 800.0);
        let mapped = map_to_logical(PointerPosition::new(250.0, 800.0), rect, LOGICAL)
            .expect("mapped");
        assert_close(mapped, Point::new(500.0, 400.0));
    }

    #[test]
    fn zero_sized_display_is_skipped() {
        let rect = SurfaceRect::new(0.0, 0.0, 0.0, 400.0);
        assert_eq!(map_to_logical(PointerPosition::new(1.0, 1.0), rect, LOGICAL), None);
        let rect = SurfaceRect::new(0.0, 0.0, f32::NAN, 400.0);
        assert_eq!(map_to_logical(PointerPosition::new(1.0, 1.0), rect, LOGICAL), None);
    }

    #[test]
    fn non_finite_position_is_skipped() {
        let rect = SurfaceRect::scaled(LOGICAL, 1.0);
        for position in [
            PointerPosition::new(f32::NAN, 1.0),
            PointerPosition::new(1.0, f32::INFINITY),
            PointerPosition::new(f32::NEG_INFINITY, f32::NAN),
        ] {
            assert_eq!(map_to_logical(position, rect, LOGICAL), None);
        }
    }
}
