use scan_common::Point2D;

use crate::types::{OrderedQuad, Quadrilateral};

/// Assign canonical roles to four unordered corners.
///
/// * top-left: smallest `x + y`
/// * bottom-right: largest `x + y`
/// * top-right: smallest `y - x`
/// * bottom-left: largest `y - x`
///
/// Reliable for convex quads under moderate perspective. Strong rotation or
/// self-intersecting input can map one point to two roles, as can ties on
/// either key; ties resolve to the earliest input point. Nothing here rejects such
/// input, check [`OrderedQuad::has_coincident_roles`] if it matters.
pub fn order_corners(quad: &Quadrilateral) -> OrderedQuad {
    let points = quad.points();

    OrderedQuad {
        top_left: points[argmin(points, Point2D::sum)],
        top_right: points[argmin(points, Point2D::diff)],
        bottom_right: points[argmax(points, Point2D::sum)],
        bottom_left: points[argmax(points, Point2D::diff)],
    }
}

fn argmin(points: &[Point2D; 4], key: fn(Point2D) -> f64) -> usize {
    (1..points.len()).fold(0, |best, i| if key(points[i]) < key(points[best]) { i } else { best })
}

fn argmax(points: &[Point2D; 4], key: fn(Point2D) -> f64) -> usize {
    (1..points.len()).fold(0, |best, i| if key(points[i]) > key(points[best]) { i } else { best })
}
