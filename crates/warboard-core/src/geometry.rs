//! Point-to-primitive proximity tests used for shape selection.
//!
//! All tests work in canvas pixel space and take a tolerance band so that
//! pointer selection is forgiving without exact analytic edge math.

use kurbo::{Point, Rect};

/// Distance from a point to a line segment (a→b).
///
/// A degenerate segment (`a == b`) is treated as the single point `a`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Axis-aligned box spanned by two anchor points, regardless of their order.
pub fn anchor_box(start: Point, end: Point) -> Rect {
    Rect::from_points(start, end)
}

/// True if `point` is within `tolerance` of the segment `[start, end]`.
pub fn near_segment(point: Point, start: Point, end: Point, tolerance: f64) -> bool {
    point_to_segment_dist(point, start, end) <= tolerance
}

/// True if `point` lies in the border band of the box spanned by the anchors.
///
/// The band is the tolerance-expanded box (inclusive) minus the strict
/// interior of the tolerance-shrunk box. When the shrunk box is empty every
/// point of the expanded box counts as a border hit.
pub fn near_rect_border(point: Point, start: Point, end: Point, tolerance: f64) -> bool {
    let rect = anchor_box(start, end);
    if !inflated_contains(rect, point, tolerance) {
        return false;
    }

    let inner = Rect::new(
        rect.x0 + tolerance,
        rect.y0 + tolerance,
        rect.x1 - tolerance,
        rect.y1 - tolerance,
    );
    if inner.x0 >= inner.x1 || inner.y0 >= inner.y1 {
        return true;
    }

    let inside_inner =
        point.x > inner.x0 && point.x < inner.x1 && point.y > inner.y0 && point.y < inner.y1;
    !inside_inner
}

/// True if `point` is within `tolerance` of the circle centred on `center`
/// passing through `rim`, or within `tolerance` of the centre anchor itself.
pub fn near_circle(point: Point, center: Point, rim: Point, tolerance: f64) -> bool {
    let radius = center.distance(rim);
    let from_center = point.distance(center);
    (from_center - radius).abs() <= tolerance || from_center <= tolerance
}

/// Bounding-box approximation used for polygon markers: the interior counts.
pub fn near_box(point: Point, start: Point, end: Point, tolerance: f64) -> bool {
    inflated_contains(anchor_box(start, end), point, tolerance)
}

/// Inclusive containment test against a rect grown by `tolerance` on all sides.
fn inflated_contains(rect: Rect, point: Point, tolerance: f64) -> bool {
    point.x >= rect.x0 - tolerance
        && point.x <= rect.x1 + tolerance
        && point.y >= rect.y0 - tolerance
        && point.y <= rect.y1 + tolerance
}
