use geo_types::LineString;
use scan_common::Point2D;

use super::geometry::to_coords;
use crate::{error::Result, traits::PolygonApproximator, types::Contour};

/// Closed-curve Douglas-Peucker approximation using geo crate's implementation.
///
/// The ring is split at two extreme points (the point farthest from the
/// trace start, then the point farthest from that one) and each arc is
/// simplified on its own, so where the contour trace began has no effect
/// on the result.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerApproximator;

impl PolygonApproximator for DouglasPeuckerApproximator {
    fn approximate(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2D>> {
        let points = &contour.points;
        if points.len() < 3 {
            return Ok(points.clone());
        }

        let a = farthest_from(points, points[0]);
        let b = farthest_from(points, points[a]);
        if a == b {
            return Ok(vec![points[a]]);
        }
        let (first, second) = (a.min(b), a.max(b));

        let forward = simplify_arc(&points[first..=second], epsilon);
        let wrapped: Vec<Point2D> = points[second..]
            .iter()
            .chain(&points[..=first])
            .copied()
            .collect();
        let backward = simplify_arc(&wrapped, epsilon);

        // Each arc ends where the other starts
        let mut vertices = Vec::with_capacity(forward.len() + backward.len());
        vertices.extend_from_slice(&forward[..forward.len() - 1]);
        vertices.extend_from_slice(&backward[..backward.len() - 1]);
        Ok(vertices)
    }
}

/// Index of the point farthest from `origin`; the first one wins ties
fn farthest_from(points: &[Point2D], origin: Point2D) -> usize {
    (1..points.len()).fold(0, |best, i| {
        if points[i].distance_to(origin) > points[best].distance_to(origin) {
            i
        } else {
            best
        }
    })
}

/// Open-polyline simplification; both end points are always kept
fn simplify_arc(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    use geo::Simplify;

    LineString::new(to_coords(points))
        .simplify(&epsilon)
        .coords()
        .map(|coord| Point2D::new(coord.x, coord.y))
        .collect()
}
