use image::GrayImage;
use tracing::{debug, instrument};

use crate::{
    algorithms::{DouglasPeuckerApproximator, ImageprocContourExtractor},
    error::Result,
    traits::{ContourExtractor, PolygonApproximator},
    types::{Contour, Quadrilateral},
};

/// Default approximation tolerance as a fraction of the contour perimeter
pub const DEFAULT_EPSILON_RATIO: f64 = 0.02;

/// Picks the document outline from an edge map.
///
/// Contours are visited from the largest enclosed area to the smallest and
/// the first one whose polygon approximation has exactly four vertices wins.
/// Later candidates are never inspected, even if they would fit better.
#[derive(Debug, Clone)]
pub struct QuadSelector<C = ImageprocContourExtractor, A = DouglasPeuckerApproximator>
where
    C: ContourExtractor,
    A: PolygonApproximator,
{
    pub contour_extractor: C,
    pub approximator: A,
    pub epsilon_ratio: f64,
}

impl<C, A> QuadSelector<C, A>
where
    C: ContourExtractor,
    A: PolygonApproximator,
{
    pub fn new(contour_extractor: C, approximator: A) -> Self {
        Self {
            contour_extractor,
            approximator,
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
        }
    }

    pub fn with_epsilon_ratio(mut self, epsilon_ratio: f64) -> Self {
        self.epsilon_ratio = epsilon_ratio;
        self
    }

    /// Returns `Ok(None)` when no contour approximates to four vertices.
    #[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
    pub fn select_quad(&self, edges: &GrayImage) -> Result<Option<Quadrilateral>> {
        let contours = self.contour_extractor.extract_contours(edges)?;
        debug!(contour_count = contours.len(), "Contours extracted");

        for (rank, (contour, area)) in rank_by_area(contours).into_iter().enumerate() {
            let perimeter = contour.perimeter();
            let approx = self
                .approximator
                .approximate(&contour, self.epsilon_ratio * perimeter)?;
            debug!(rank, area, perimeter, vertices = approx.len(), "Candidate inspected");

            if approx.len() == 4 {
                return Quadrilateral::try_from(approx).map(Some);
            }
        }

        Ok(None)
    }
}

impl Default for QuadSelector {
    fn default() -> Self {
        Self::new(ImageprocContourExtractor, DouglasPeuckerApproximator)
    }
}

/// Pair each contour with its area, largest first.
///
/// The sort is stable, so equal areas keep extraction order.
pub fn rank_by_area(contours: Vec<Contour>) -> Vec<(Contour, f64)> {
    let mut ranked: Vec<(Contour, f64)> = contours
        .into_iter()
        .map(|contour| {
            let area = contour.area();
            (contour, area)
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use scan_common::Point2D;
    use std::sync::Mutex;

    /// Hands back a fixed set of contours regardless of the image
    struct FixedContours(Vec<Contour>);

    impl ContourExtractor for FixedContours {
        fn extract_contours(&self, _image: &GrayImage) -> Result<Vec<Contour>> {
            Ok(self.0.clone())
        }
    }

    /// Returns each contour's own points and records the visiting order by area
    #[derive(Default)]
    struct RecordingApproximator {
        visited: Mutex<Vec<f64>>,
    }

    impl PolygonApproximator for RecordingApproximator {
        fn approximate(&self, contour: &Contour, _epsilon: f64) -> Result<Vec<Point2D>> {
            self.visited.lock().unwrap().push(contour.area());
            Ok(contour.points.clone())
        }
    }

    fn square_at(x: f64, y: f64, side: f64) -> Contour {
        Contour::new(vec![
            Point2D::new(x, y),
            Point2D::new(x + side, y),
            Point2D::new(x + side, y + side),
            Point2D::new(x, y + side),
        ])
    }

    fn pentagon(scale: f64) -> Contour {
        Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0 * scale, 0.0),
            Point2D::new(3.0 * scale, 2.0 * scale),
            Point2D::new(1.0 * scale, 3.0 * scale),
            Point2D::new(-1.0 * scale, 2.0 * scale),
        ])
    }

    fn triangle(scale: f64) -> Contour {
        Contour::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(scale, 0.0),
            Point2D::new(0.0, scale),
        ])
    }

    #[test]
    fn inspects_in_descending_area_and_stops_at_first_quad() {
        let contours = vec![
            square_at(0.0, 0.0, 5.0),   // area 25
            pentagon(20.0),             // area 3200
            square_at(10.0, 10.0, 30.0), // area 900
            triangle(100.0),            // area 5000
            square_at(50.0, 50.0, 40.0), // area 1600
        ];
        let selector = QuadSelector::new(FixedContours(contours), RecordingApproximator::default());

        let quad = selector
            .select_quad(&GrayImage::new(1, 1))
            .expect("selection")
            .expect("a quad is present");

        assert_eq!(quad.points()[0], Point2D::new(50.0, 50.0));
        let visited = selector.approximator.visited.lock().unwrap().clone();
        assert_eq!(visited, vec![5000.0, 3200.0, 1600.0]);
    }

    #[test]
    fn absence_of_quads_yields_none() {
        let contours = vec![triangle(10.0), pentagon(4.0), triangle(3.0)];
        let selector = QuadSelector::new(FixedContours(contours), RecordingApproximator::default());

        let result = selector.select_quad(&GrayImage::new(1, 1)).expect("selection");
        assert!(result.is_none());
        assert_eq!(selector.approximator.visited.lock().unwrap().len(), 3);
    }

    #[test]
    fn no_contours_yields_none() {
        let selector = QuadSelector::new(FixedContours(vec![]), RecordingApproximator::default());
        assert!(selector.select_quad(&GrayImage::new(4, 4)).expect("selection").is_none());
        assert!(selector.approximator.visited.lock().unwrap().is_empty());
    }

    #[test]
    fn equal_areas_keep_extraction_order() {
        let first = square_at(0.0, 0.0, 10.0);
        let second = square_at(100.0, 100.0, 10.0);
        let ranked = rank_by_area(vec![triangle(2.0), first.clone(), second.clone()]);

        assert_eq!(ranked[0].0, first);
        assert_eq!(ranked[1].0, second);
        assert_eq!(ranked[2].1, 2.0);
    }

    #[test]
    fn finds_corners_of_blurred_page_through_canny() {
        use crate::{
            algorithms::{CannyEdgeDetector, GaussianBlurPreprocessor, order_corners},
            traits::{EdgeDetector, ImagePreprocessor},
        };

        let photo = GrayImage::from_fn(160, 130, |x, y| {
            if (30..=129).contains(&x) && (25..=104).contains(&y) {
                Luma([220u8])
            } else {
                Luma([40u8])
            }
        });
        // Blurring rounds the corners, so the trace starts off-corner
        let blurred = GaussianBlurPreprocessor { sigma: 2.0 }
            .preprocess(&photo)
            .expect("blur");
        let edges = CannyEdgeDetector { low_threshold: 20.0, high_threshold: 60.0 }
            .detect_edges(&blurred)
            .expect("edges");

        let quad = QuadSelector::default()
            .select_quad(&edges)
            .expect("selection")
            .expect("rounded outline still approximates to a quad");

        let ordered = order_corners(&quad);
        let expected = [(30.0, 25.0), (129.0, 25.0), (129.0, 104.0), (30.0, 104.0)];
        for (found, corner) in ordered.corners().iter().zip(expected) {
            assert!(
                found.distance_to(Point2D::from(corner)) < 5.0,
                "corner {found:?} too far from {corner:?}"
            );
        }
    }

    #[test]
    fn finds_drawn_document_outline_in_real_edge_map() {
        let mut edges = GrayImage::new(120, 100);
        for x in 10..=110 {
            edges.put_pixel(x, 15, Luma([255u8]));
            edges.put_pixel(x, 85, Luma([255u8]));
        }
        for y in 15..=85 {
            edges.put_pixel(10, y, Luma([255u8]));
            edges.put_pixel(110, y, Luma([255u8]));
        }
        let before = edges.clone();

        let quad = QuadSelector::default()
            .select_quad(&edges)
            .expect("selection")
            .expect("outline is a quad");

        let mut points = quad.points().to_vec();
        points.sort_by(|a, b| (a.y, a.x).partial_cmp(&(b.y, b.x)).unwrap());
        assert_eq!(
            points,
            vec![
                Point2D::new(10.0, 15.0),
                Point2D::new(110.0, 15.0),
                Point2D::new(10.0, 85.0),
                Point2D::new(110.0, 85.0),
            ]
        );
        assert_eq!(edges, before, "edge map must not be modified");
    }
}
