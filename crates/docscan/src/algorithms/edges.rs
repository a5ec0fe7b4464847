use image::GrayImage;

use crate::{error::Result, traits::EdgeDetector};

/// Two-threshold Canny edge detector
#[derive(Debug, Clone)]
pub struct CannyEdgeDetector {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for CannyEdgeDetector {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 200.0,
        }
    }
}

impl EdgeDetector for CannyEdgeDetector {
    fn detect_edges(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::edges::canny(image, self.low_threshold, self.high_threshold))
    }
}
