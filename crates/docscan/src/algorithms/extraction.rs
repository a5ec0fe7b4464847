use image::GrayImage;
use imageproc::point::Point;
use scan_common::Point2D;

use crate::{error::Result, traits::ContourExtractor, types::Contour};

/// Imageproc-based contour extractor.
///
/// Returns every border found in the image as a flat list (nesting is
/// dropped) and keeps only the points where the chain changes direction.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<Contour>> {
        let contours = imageproc::contours::find_contours::<i32>(binary_image);

        let result: Vec<Contour> = contours
            .into_iter()
            .map(|contour| {
                compress_chain(&contour.points)
                    .into_iter()
                    .map(|p| Point2D::new(p.x as f64, p.y as f64))
                    .collect::<Vec<Point2D>>()
                    .into()
            })
            .collect();

        Ok(result)
    }
}

/// Drop every point that continues the previous step in the same direction,
/// so horizontal, vertical and diagonal runs collapse to their end points.
fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur.x - prev.x, cur.y - prev.y) != (next.x - cur.x, next.y - cur.y)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() { points.to_vec() } else { kept }
}
