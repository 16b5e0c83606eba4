//! Stroke outlines for each shape kind.

use super::{Shape, ShapeKind};
use kurbo::{BezPath, Circle, Point, Shape as KurboShape, Vec2};
use std::f64::consts::PI;

/// Length of each arrow head stroke.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Vertical offset of the label below the anchor-box centre.
const LABEL_OFFSET_Y: f64 = 20.0;

/// Inner radius of a star relative to its outer radius.
const STAR_INNER_RATIO: f64 = 0.4;

/// Build the stroke outline of a shape in canvas space.
///
/// Open kinds (line, arrow) produce open subpaths; the rest are closed.
pub fn outline(kind: ShapeKind, start: Point, end: Point) -> BezPath {
    match kind {
        ShapeKind::Line => {
            let mut path = BezPath::new();
            path.move_to(start);
            path.line_to(end);
            path
        }
        ShapeKind::Arrow => arrow(start, end),
        ShapeKind::Rectangle => {
            let mut path = BezPath::new();
            path.move_to(start);
            path.line_to(Point::new(end.x, start.y));
            path.line_to(end);
            path.line_to(Point::new(start.x, end.y));
            path.close_path();
            path
        }
        ShapeKind::Circle => Circle::new(start, start.distance(end)).to_path(0.1),
        ShapeKind::Triangle => {
            let center_x = (start.x + end.x) / 2.0;
            polygon(&[
                Point::new(center_x, start.y),
                Point::new(start.x, end.y),
                end,
            ])
        }
        ShapeKind::Diamond => {
            let c = start.midpoint(end);
            polygon(&[
                Point::new(c.x, start.y),
                Point::new(end.x, c.y),
                Point::new(c.x, end.y),
                Point::new(start.x, c.y),
            ])
        }
        ShapeKind::Hexagon => {
            let c = start.midpoint(end);
            let r = inscribed_radius(start, end);
            let vertices: Vec<Point> = (0..6)
                .map(|i| {
                    let angle = f64::from(i) * PI / 3.0;
                    c + Vec2::from_angle(angle) * r
                })
                .collect();
            polygon(&vertices)
        }
        ShapeKind::Star => {
            let c = start.midpoint(end);
            let outer = inscribed_radius(start, end);
            let inner = outer * STAR_INNER_RATIO;
            let vertices: Vec<Point> = (0..10)
                .map(|i| {
                    let angle = f64::from(i) * PI / 5.0 - PI / 2.0;
                    let r = if i % 2 == 0 { outer } else { inner };
                    c + Vec2::from_angle(angle) * r
                })
                .collect();
            polygon(&vertices)
        }
    }
}

/// Where a shape's label is centred.
pub fn label_anchor(shape: &Shape) -> Point {
    let c = shape.center();
    Point::new(c.x, c.y + LABEL_OFFSET_Y)
}

fn arrow(start: Point, end: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);

    let angle = (end.y - start.y).atan2(end.x - start.x);
    for side in [-1.0, 1.0] {
        let barb = end - Vec2::from_angle(angle + side * PI / 6.0) * ARROW_HEAD_LENGTH;
        path.move_to(end);
        path.line_to(barb);
    }
    path
}

fn polygon(vertices: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = vertices.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    path
}

fn inscribed_radius(start: Point, end: Point) -> f64 {
    (end.x - start.x).abs().min((end.y - start.y).abs()) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn points(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_arrow_has_two_barbs() {
        let path = outline(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let pts = points(&path);
        assert_eq!(pts.len(), 6);
        for barb in [pts[3], pts[5]] {
            assert!((barb.distance(Point::new(100.0, 0.0)) - ARROW_HEAD_LENGTH).abs() < 1e-9);
            assert!(barb.x < 100.0);
        }
    }

    #[test]
    fn test_triangle_vertices() {
        let pts = points(&outline(
            ShapeKind::Triangle,
            Point::new(0.0, 0.0),
            Point::new(40.0, 30.0),
        ));
        assert_eq!(
            pts,
            vec![Point::new(20.0, 0.0), Point::new(0.0, 30.0), Point::new(40.0, 30.0)]
        );
    }

    #[test]
    fn test_hexagon_fits_smaller_side() {
        let pts = points(&outline(
            ShapeKind::Hexagon,
            Point::new(175.0, 175.0),
            Point::new(225.0, 225.0),
        ));
        assert_eq!(pts.len(), 6);
        let c = Point::new(200.0, 200.0);
        for p in pts {
            assert!((p.distance(c) - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_starts_straight_up() {
        let pts = points(&outline(ShapeKind::Star, Point::new(0.0, 0.0), Point::new(100.0, 100.0)));
        assert_eq!(pts.len(), 10);
        assert!((pts[0].x - 50.0).abs() < 1e-9);
        assert!(pts[0].y.abs() < 1e-9);
        assert!((pts[1].distance(Point::new(50.0, 50.0)) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_label_anchor_below_center() {
        let shape = Shape::new(
            0,
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Default::default(),
            2.0,
        );
        assert_eq!(label_anchor(&shape), Point::new(50.0, 45.0));
    }
}
