use image::GrayImage;
use scan_common::Point2D;

use crate::{error::Result, types::Contour};

/// Trait for image conditioning steps (e.g., resize, blur)
pub trait ImagePreprocessor: Send + Sync {
    /// Produce a new image; the input is left untouched
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for edge detectors producing a binary edge map
pub trait EdgeDetector: Send + Sync {
    /// Nonzero pixels of the returned map are edges
    fn detect_edges(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract every contour of a binary image, without nesting information
    fn extract_contours(&self, image: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for polygon approximation of closed contours
pub trait PolygonApproximator: Send + Sync {
    /// Reduce the contour to the vertices of a polygon within `epsilon` pixels.
    /// The closing vertex is not repeated.
    fn approximate(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2D>>;
}

/// Trait for final binarization of the rectified page
pub trait Binarizer: Send + Sync {
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage>;
}

impl<T: ImagePreprocessor + ?Sized> ImagePreprocessor for Box<T> {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        (**self).preprocess(image)
    }
}

impl<T: EdgeDetector + ?Sized> EdgeDetector for Box<T> {
    fn detect_edges(&self, image: &GrayImage) -> Result<GrayImage> {
        (**self).detect_edges(image)
    }
}

impl<T: ContourExtractor + ?Sized> ContourExtractor for Box<T> {
    fn extract_contours(&self, image: &GrayImage) -> Result<Vec<Contour>> {
        (**self).extract_contours(image)
    }
}

impl<T: PolygonApproximator + ?Sized> PolygonApproximator for Box<T> {
    fn approximate(&self, contour: &Contour, epsilon: f64) -> Result<Vec<Point2D>> {
        (**self).approximate(contour, epsilon)
    }
}

impl<T: Binarizer + ?Sized> Binarizer for Box<T> {
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
        (**self).binarize(image)
    }
}
