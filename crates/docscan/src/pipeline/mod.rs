pub mod builder;

use image::GrayImage;
use scan_common::{ImageDimensions, Point2D};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    algorithms::{QuadSelector, Rectifier, Resize, order_corners, target_rectangle},
    error::{Result, ScanError},
    traits::{Binarizer, ContourExtractor, EdgeDetector, ImagePreprocessor, PolygonApproximator},
    types::{OrderedQuad, Quadrilateral, TargetRectangle},
};

/// Selector over boxed contour and approximation primitives
pub type DynQuadSelector = QuadSelector<Box<dyn ContourExtractor>, Box<dyn PolygonApproximator>>;

/// Where the document was found, in working-resolution pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub quad: OrderedQuad,
    pub target: TargetRectangle,
    /// Size of the downsampled image the corners refer to
    pub working: ImageDimensions,
}

impl Detection {
    pub fn new(quad: OrderedQuad, working: ImageDimensions) -> Self {
        Self {
            quad,
            target: target_rectangle(&quad),
            working,
        }
    }

    /// Map the corners onto a working image of another size.
    ///
    /// Each axis is scaled by `working / self.working`; the target size is
    /// recomputed from the moved corners.
    pub fn rescaled(&self, working: ImageDimensions) -> Result<Self> {
        if self.working.is_empty() {
            return Err(ScanError::EmptyImage {
                width: self.working.width,
                height: self.working.height,
            });
        }
        if working == self.working {
            return Ok(*self);
        }

        let sx = working.width as f64 / self.working.width as f64;
        let sy = working.height as f64 / self.working.height as f64;
        let scale = |p: Point2D| Point2D::new(p.x * sx, p.y * sy);
        let quad = OrderedQuad {
            top_left: scale(self.quad.top_left),
            top_right: scale(self.quad.top_right),
            bottom_right: scale(self.quad.bottom_right),
            bottom_left: scale(self.quad.bottom_left),
        };
        Ok(Self::new(quad, working))
    }
}

/// Result of a successful scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub detection: Detection,
    /// Top-down view of the document, before binarization
    pub warped: GrayImage,
    /// Binarized page, absent when binarization is disabled
    pub scan: Option<GrayImage>,
}

impl ScanResult {
    /// The final page: binarized if available, otherwise the warped view
    pub fn output(&self) -> &GrayImage {
        self.scan.as_ref().unwrap_or(&self.warped)
    }
}

/// Document scanning pipeline: downsample, find edges, select the page
/// outline, rectify it and binarize the result.
pub struct ScanPipeline {
    downsample: Resize,
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    edge_detector: Box<dyn EdgeDetector>,
    selector: DynQuadSelector,
    rectifier: Rectifier,
    binarizer: Option<Box<dyn Binarizer>>,
}

impl ScanPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::ScanPipelineBuilder {
        builder::ScanPipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        downsample: Resize,
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        edge_detector: Box<dyn EdgeDetector>,
        selector: DynQuadSelector,
        rectifier: Rectifier,
        binarizer: Option<Box<dyn Binarizer>>,
    ) -> Self {
        Self {
            downsample,
            preprocessors,
            edge_detector,
            selector,
            rectifier,
            binarizer,
        }
    }

    /// Downsample `image` to the resolution detection runs at
    pub fn working_image(&self, image: &GrayImage) -> Result<GrayImage> {
        self.downsample.preprocess(image)
    }

    /// Locate the document without warping it.
    ///
    /// `Ok(None)` means no contour approximated to a quadrilateral.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &GrayImage) -> Result<Option<Detection>> {
        let working = self.working_image(image)?;
        self.detect_in_working(&working)
    }

    /// Run the full pipeline. `Ok(None)` means no document was found.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &GrayImage) -> Result<Option<ScanResult>> {
        let working = self.working_image(image)?;
        match self.detect_in_working(&working)? {
            Some(detection) => self.finish(&working, detection).map(Some),
            None => Ok(None),
        }
    }

    /// Skip detection and rectify a caller-supplied quad.
    ///
    /// Corners are in working-resolution coordinates, as reported by
    /// [`ScanPipeline::detect`].
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process_with_quad(&self, image: &GrayImage, quad: Quadrilateral) -> Result<ScanResult> {
        let working = self.working_image(image)?;
        let detection = Detection::new(order_checked(&quad), dimensions_of(&working));
        self.finish(&working, detection)
    }

    /// Rectify a detection made earlier, possibly at another working scale.
    ///
    /// Corners are rescaled from `detection.working` to this pipeline's
    /// working image before warping.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process_detection(&self, image: &GrayImage, detection: &Detection) -> Result<ScanResult> {
        let working = self.working_image(image)?;
        let current = dimensions_of(&working);
        if current != detection.working {
            info!(
                from_width = detection.working.width,
                from_height = detection.working.height,
                to_width = current.width,
                to_height = current.height,
                "Rescaling detection to working image"
            );
        }

        let rescaled = detection.rescaled(current)?;
        let detection = Detection::new(order_checked(&rescaled.quad.into()), current);
        self.finish(&working, detection)
    }

    fn detect_in_working(&self, working: &GrayImage) -> Result<Option<Detection>> {
        let mut edge_input = working.clone();
        for preprocessor in &self.preprocessors {
            edge_input = preprocessor.preprocess(&edge_input)?;
        }

        let edges = self.edge_detector.detect_edges(&edge_input)?;
        debug!(
            edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count(),
            "Edges detected"
        );

        let Some(quad) = self.selector.select_quad(&edges)? else {
            warn!("No quadrilateral contour found; no document in image");
            return Ok(None);
        };

        let ordered = order_checked(&quad);
        let detection = Detection::new(ordered, dimensions_of(working));
        info!(
            top_left = ?ordered.top_left,
            bottom_right = ?ordered.bottom_right,
            target_width = detection.target.max_width,
            target_height = detection.target.max_height,
            "Document detected"
        );
        Ok(Some(detection))
    }

    fn finish(&self, working: &GrayImage, detection: Detection) -> Result<ScanResult> {
        let warped = self.rectifier.rectify_ordered(working, &detection.quad)?;

        let scan = match &self.binarizer {
            Some(binarizer) => Some(binarizer.binarize(&warped)?),
            None => None,
        };

        info!(
            width = warped.width(),
            height = warped.height(),
            binarized = scan.is_some(),
            "Scan complete"
        );
        Ok(ScanResult {
            detection,
            warped,
            scan,
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "ScanPipeline: {}% working scale, {} preprocessors, epsilon ratio {}, binarization {}",
            self.downsample.scale_percent,
            self.preprocessors.len(),
            self.selector.epsilon_ratio,
            if self.binarizer.is_some() { "on" } else { "off" }
        )
    }
}

fn order_checked(quad: &Quadrilateral) -> OrderedQuad {
    let ordered = order_corners(quad);
    if ordered.has_coincident_roles() {
        warn!(?quad, "Corner roles coincide; the ordering heuristic hit a tie");
    }
    ordered
}

fn dimensions_of(image: &GrayImage) -> ImageDimensions {
    ImageDimensions::new(image.width(), image.height())
}
