use geo_types::{Coord, LineString, Polygon};
use scan_common::Point2D;

pub(crate) fn to_coords(points: &[Point2D]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

/// Absolute area enclosed by a closed point sequence (shoelace formula)
pub fn contour_area(points: &[Point2D]) -> f64 {
    use geo::Area;

    if points.len() < 3 {
        return 0.0;
    }
    Polygon::new(LineString::new(to_coords(points)), vec![]).unsigned_area()
}

/// Length of a polyline, including the closing segment when `closed`
pub fn arc_length(points: &[Point2D], closed: bool) -> f64 {
    use geo::EuclideanLength;

    let mut coords = to_coords(points);
    if closed && coords.len() > 1 {
        coords.push(coords[0]);
    }
    LineString::new(coords).euclidean_length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(side, 0.0),
            Point2D::new(side, side),
            Point2D::new(0.0, side),
        ]
    }

    #[test]
    fn area_is_orientation_independent() {
        let mut points = square(10.0);
        assert!((contour_area(&points) - 100.0).abs() < 1e-9);
        points.reverse();
        assert!((contour_area(&points) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_have_no_area() {
        assert_eq!(contour_area(&[]), 0.0);
        assert_eq!(contour_area(&square(4.0)[..2]), 0.0);
    }

    #[test]
    fn arc_length_open_and_closed() {
        let points = square(10.0);
        assert!((arc_length(&points, false) - 30.0).abs() < 1e-9);
        assert!((arc_length(&points, true) - 40.0).abs() < 1e-9);
        assert_eq!(arc_length(&points[..1], true), 0.0);
    }
}
