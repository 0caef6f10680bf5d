use crate::draw::model::{Point, StrokeStyle};
use crate::draw::raster::RgbaBuffer;

/// Half-open pixel region `[x0, x1) x [y0, y1)`, always inside the raster it
/// was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl DirtyRect {
    pub fn full(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        })
    }

    /// Pixels a segment of the given pen width can touch, clipped to a
    /// `width` x `height` raster. `None` when nothing is visible.
    pub fn around_segment(
        start: Point,
        end: Point,
        stroke_width: u32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        // i64 keeps huge pens and far-off points from overflowing.
        let pad = (i64::from(stroke_width) + 1) / 2 + 1;
        let clip = |lo: i32, hi: i32, limit: u32| {
            let lo = (i64::from(lo) - pad).clamp(0, i64::from(limit));
            let hi = (i64::from(hi) + pad + 1).clamp(0, i64::from(limit));
            (hi > lo).then_some((lo as u32, hi as u32))
        };
        let (x0, x1) = clip(start.x.min(end.x), start.x.max(end.x), width)?;
        let (y0, y1) = clip(start.y.min(end.y), start.y.max(end.y), height)?;
        Some(Self { x0, y0, x1, y1 })
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        DirtyRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Rasterizes one stroke segment as a capsule: every pixel whose centre lies
/// within `width / 2` of the segment is painted, which gives round caps and
/// round joins between consecutive segments. Returns the touched region, or
/// `None` when the segment lies entirely off the raster.
pub fn draw_segment(
    buffer: &mut RgbaBuffer,
    start: Point,
    end: Point,
    style: StrokeStyle,
) -> Option<DirtyRect> {
    let bounds =
        DirtyRect::around_segment(start, end, style.width, buffer.width, buffer.height)?;
    let radius = (style.width.max(1) as f32) / 2.0;
    let radius_sq = radius * radius;
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let centre = Point::new(x as i32, y as i32);
            if point_segment_distance_sq(centre, start, end) <= radius_sq {
                buffer.put_pixel(x, y, style.color);
            }
        }
    }
    Some(bounds)
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let px = point.x as f32;
    let py = point.y as f32;
    let x0 = start.x as f32;
    let y0 = start.y as f32;
    let vx = end.x as f32 - x0;
    let vy = end.y as f32 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;

    fn style(width: u32) -> StrokeStyle {
        StrokeStyle {
            width,
            color: Color::rgb(10, 20, 30),
        }
    }

    #[test]
    fn segment_region_is_padded_and_clipped() {
        let rect = DirtyRect::around_segment(Point::new(5, 5), Point::new(10, 7), 3, 100, 100)
            .expect("visible");
        assert_eq!((rect.x0, rect.y0, rect.x1, rect.y1), (2, 2, 14, 11));

        let edge = DirtyRect::around_segment(Point::new(-3, 1), Point::new(2, 1), 1, 4, 4)
            .expect("visible");
        assert_eq!((edge.x0, edge.y0), (0, 0));
        assert!(edge.x1 <= 4 && edge.y1 <= 4);
    }

    #[test]
    fn union_covers_both_regions() {
        let a = DirtyRect::around_segment(Point::new(1, 1), Point::new(1, 1), 1, 50, 50)
            .expect("a");
        let b = DirtyRect::around_segment(Point::new(30, 20), Point::new(30, 20), 1, 50, 50)
            .expect("b");
        let u = a.union(b);
        assert_eq!((u.x0, u.y0, u.x1, u.y1), (a.x0, a.y0, b.x1, b.y1));
        assert_eq!(u.width(), b.x1 - a.x0);
    }

    #[test]
    fn offscreen_region_is_none() {
        assert_eq!(
            DirtyRect::around_segment(Point::new(-50, -50), Point::new(-40, -40), 3, 8, 8),
            None
        );
        assert_eq!(DirtyRect::full(0, 10), None);
    }

    #[test]
    fn enormous_pen_covers_raster_without_overflow() {
        let mut buffer = RgbaBuffer::transparent(6, 4);
        let touched = draw_segment(
            &mut buffer,
            Point::new(i32::MAX, 2),
            Point::new(1, 2),
            StrokeStyle {
                width: u32::MAX,
                color: Color::rgb(10, 20, 30),
            },
        )
        .expect("visible");

        assert_eq!(Some(touched), DirtyRect::full(6, 4));
        assert_eq!(buffer.opaque_pixel_count(), 24);
    }

    #[test]
    fn single_point_segment_draws_a_round_dot() {
        let mut buffer = RgbaBuffer::transparent(9, 9);
        draw_segment(&mut buffer, Point::new(4, 4), Point::new(4, 4), style(5));

        assert_eq!(buffer.pixel(4, 4), Color::rgb(10, 20, 30));
        assert_eq!(buffer.pixel(6, 4), Color::rgb(10, 20, 30));
        assert_eq!(buffer.pixel(6, 5).a, 255);
        // Corners of the 5x5 square fall outside the radius.
        assert_eq!(buffer.pixel(6, 6).a, 0);
        assert_eq!(buffer.pixel(7, 4).a, 0);
    }

    #[test]
    fn horizontal_segment_paints_full_span_and_caps() {
        let mut buffer = RgbaBuffer::transparent(20, 5);
        draw_segment(&mut buffer, Point::new(3, 2), Point::new(15, 2), style(3));

        for x in 2..=16 {
            assert_eq!(buffer.pixel(x, 2).a, 255, "x = {x}");
        }
        assert_eq!(buffer.pixel(1, 2).a, 0);
        assert_eq!(buffer.pixel(17, 2).a, 0);
        assert_eq!(buffer.pixel(8, 0).a, 0);
    }

    #[test]
    fn offscreen_segment_is_clipped_without_panicking() {
        let mut buffer = RgbaBuffer::transparent(4, 4);
        assert_eq!(
            draw_segment(&mut buffer, Point::new(-50, -50), Point::new(-40, -40), style(3)),
            None
        );
        let touched = draw_segment(&mut buffer, Point::new(-5, 1), Point::new(10, 1), style(1))
            .expect("partially visible");
        assert_eq!(touched.x0, 0);
        assert_eq!(touched.x1, 4);
        assert_eq!(buffer.pixel(0, 1).a, 255);
        assert_eq!(buffer.pixel(3, 1).a, 255);
    }
}
