use image::Luma;
use imageproc::geometric_transformations::Interpolation;

use crate::{
    algorithms::{
        AdaptiveThreshold, CannyEdgeDetector, DEFAULT_EPSILON_RATIO, DouglasPeuckerApproximator,
        GaussianBlurPreprocessor, ImageprocContourExtractor, QuadSelector, Rectifier, Resize,
    },
    pipeline::ScanPipeline,
    traits::{Binarizer, ContourExtractor, EdgeDetector, ImagePreprocessor, PolygonApproximator},
};

/// Builder for creating scan pipelines with a fluent API
pub struct ScanPipelineBuilder {
    downsample: Resize,
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    edge_detector: Option<Box<dyn EdgeDetector>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    approximator: Option<Box<dyn PolygonApproximator>>,
    epsilon_ratio: f64,
    rectifier: Rectifier,
    binarizer: Option<Box<dyn Binarizer>>,
    binarize: bool,
}

impl ScanPipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            downsample: Resize::default(),
            preprocessors: Vec::new(),
            edge_detector: None,
            contour_extractor: None,
            approximator: None,
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
            rectifier: Rectifier::default(),
            binarizer: None,
            binarize: true,
        }
    }

    /// Working resolution as a percentage of the input size
    pub fn scale_percent(mut self, scale_percent: u32) -> Self {
        self.downsample.scale_percent = scale_percent;
        self
    }

    /// Add a preprocessor that runs on the working image before edge detection
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Blur the working image before edge detection
    pub fn with_blur(self, sigma: f32) -> Self {
        self.add_preprocessor(GaussianBlurPreprocessor { sigma })
    }

    /// Set the edge detector (replaces any existing one)
    pub fn set_edge_detector<E>(mut self, detector: E) -> Self
    where
        E: EdgeDetector + 'static,
    {
        self.edge_detector = Some(Box::new(detector));
        self
    }

    /// Canny edge detection with the given hysteresis thresholds
    pub fn with_canny(self, low_threshold: f32, high_threshold: f32) -> Self {
        self.set_edge_detector(CannyEdgeDetector {
            low_threshold,
            high_threshold,
        })
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<C>(mut self, extractor: C) -> Self
    where
        C: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polygon approximator (replaces any existing one)
    pub fn set_approximator<A>(mut self, approximator: A) -> Self
    where
        A: PolygonApproximator + 'static,
    {
        self.approximator = Some(Box::new(approximator));
        self
    }

    /// Approximation tolerance as a fraction of each contour's perimeter
    pub fn epsilon_ratio(mut self, epsilon_ratio: f64) -> Self {
        self.epsilon_ratio = epsilon_ratio;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.rectifier.interpolation = interpolation;
        self
    }

    /// Value for rectified pixels that map outside the source image
    pub fn fill(mut self, value: u8) -> Self {
        self.rectifier.fill = Luma([value]);
        self
    }

    /// Set the binarizer (replaces any existing one and re-enables binarization)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self.binarize = true;
        self
    }

    /// Stop after rectification
    pub fn without_binarization(mut self) -> Self {
        self.binarize = false;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> ScanPipeline {
        let edge_detector = self
            .edge_detector
            .unwrap_or_else(|| Box::new(CannyEdgeDetector::default()));

        let contour_extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor));

        let approximator = self
            .approximator
            .unwrap_or_else(|| Box::new(DouglasPeuckerApproximator));

        let binarizer = if self.binarize {
            Some(
                self.binarizer
                    .unwrap_or_else(|| Box::new(AdaptiveThreshold::default())),
            )
        } else {
            None
        };

        ScanPipeline::new(
            self.downsample,
            self.preprocessors,
            edge_detector,
            QuadSelector::new(contour_extractor, approximator).with_epsilon_ratio(self.epsilon_ratio),
            self.rectifier,
            binarizer,
        )
    }
}

impl Default for ScanPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result, types::Contour};
    use image::GrayImage;
    use scan_common::Point2D;

    struct Invert;

    impl Binarizer for Invert {
        fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
            let mut out = image.clone();
            image::imageops::invert(&mut out);
            Ok(out)
        }
    }

    struct OneSquare;

    impl ContourExtractor for OneSquare {
        fn extract_contours(&self, _image: &GrayImage) -> Result<Vec<Contour>> {
            Ok(vec![Contour::new(
                [(5.0, 5.0), (25.0, 5.0), (25.0, 15.0), (5.0, 15.0)]
                    .map(Point2D::from)
                    .to_vec(),
            )])
        }
    }

    #[test]
    fn defaults_describe_standard_pipeline() {
        let info = ScanPipelineBuilder::new().build().info();
        assert!(info.contains("50% working scale"), "{info}");
        assert!(info.contains("0 preprocessors"), "{info}");
        assert!(info.contains("binarization on"), "{info}");
    }

    #[test]
    fn options_are_applied() {
        let info = ScanPipelineBuilder::new()
            .scale_percent(75)
            .with_blur(1.5)
            .epsilon_ratio(0.05)
            .without_binarization()
            .build()
            .info();
        assert!(info.contains("75% working scale"), "{info}");
        assert!(info.contains("1 preprocessors"), "{info}");
        assert!(info.contains("epsilon ratio 0.05"), "{info}");
        assert!(info.contains("binarization off"), "{info}");
    }

    #[test]
    fn custom_components_are_used() {
        let image = GrayImage::new(40, 30);
        let result = ScanPipelineBuilder::new()
            .scale_percent(100)
            .set_contour_extractor(OneSquare)
            .set_binarizer(Invert)
            .build()
            .process(&image)
            .expect("pipeline runs")
            .expect("fixed contour is a quad");

        assert_eq!(result.detection.quad.top_left, Point2D::new(5.0, 5.0));
        assert_eq!(result.warped.dimensions(), (20, 10));
        let scan = result.scan.expect("custom binarizer runs");
        assert!(scan.pixels().all(|p| p.0[0] == 255));
    }
}
