//! # Document Scanning Library
//!
//! Turns a photograph of a flat rectangular document into a top-down,
//! binarized scan of the page.
//!
//! ## Stages
//!
//! - **Downsampling**: detection runs on a uniformly resized working image
//! - **Edge detection**: Canny edge map of the working image
//! - **Quadrilateral selection**: contours ranked by enclosed area, the first
//!   one approximating to four vertices is the page
//! - **Corner ordering**: sum/difference heuristic assigning TL, TR, BR, BL
//! - **Rectification**: perspective warp onto an upright rectangle sized by
//!   the longer edge of each opposite pair
//! - **Binarization**: local adaptive threshold of the warped page
//!
//! Each vision primitive sits behind a trait in [`traits`] so it can be
//! swapped out through the [`ScanPipelineBuilder`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docscan::{ScanPipeline, io::load_grayscale};
//!
//! let pipeline = ScanPipeline::builder().build();
//!
//! let image = load_grayscale("receipt.jpg")?;
//! match pipeline.process(&image)? {
//!     Some(result) => result.output().save("receipt_scan.png")?,
//!     None => eprintln!("no document found"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use docscan::{ScanPipeline, algorithms::*};
//!
//! let pipeline = ScanPipeline::builder()
//!     .scale_percent(25)
//!     .add_preprocessor(GaussianBlurPreprocessor { sigma: 1.5 })
//!     .with_canny(30.0, 120.0)
//!     .epsilon_ratio(0.03)
//!     .set_binarizer(AdaptiveThreshold { block_size: 21, ..Default::default() })
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;

pub use error::{Result, ScanError};
pub use types::{Contour, Corner, OrderedQuad, Quadrilateral, TargetRectangle};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Detection, ScanPipeline, ScanResult, builder::ScanPipelineBuilder};
pub use scan_common::{ImageDimensions, Point2D};

/// Detect, order and rectify in one call, without binarization.
///
/// `Ok(None)` when no quadrilateral outline is found.
pub fn scan_image(image: &image::GrayImage, scale_percent: u32) -> Result<Option<image::GrayImage>> {
    let pipeline = ScanPipeline::builder()
        .scale_percent(scale_percent)
        .without_binarization()
        .build();
    Ok(pipeline.process(image)?.map(|result| result.warped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::{drawing::draw_polygon_mut, point::Point};

    /// Dark desk with a bright, perspective-distorted page drawn on it
    fn create_test_photo() -> GrayImage {
        let mut img = GrayImage::from_pixel(300, 240, Luma([30u8]));
        let page = [
            Point::new(60, 40),
            Point::new(240, 52),
            Point::new(228, 200),
            Point::new(70, 190),
        ];
        draw_polygon_mut(&mut img, &page, Luma([230u8]));
        img
    }

    #[test]
    fn test_scan_perspective_page() {
        let image = create_test_photo();
        let result = ScanPipeline::builder()
            .scale_percent(100)
            .build()
            .process(&image)
            .expect("Should process successfully")
            .expect("Should find the page");

        let quad = result.detection.quad;
        for (found, expected) in quad.corners().iter().zip([(60.0, 40.0), (240.0, 52.0), (228.0, 200.0), (70.0, 190.0)]) {
            assert!(
                found.distance_to(Point2D::from(expected)) < 5.0,
                "corner {found:?} too far from {expected:?}"
            );
        }
        assert!(!quad.has_coincident_roles());

        let target = result.detection.target;
        assert_eq!(result.output().dimensions(), (target.max_width, target.max_height));
    }

    #[test]
    fn test_scan_image_convenience() {
        let image = create_test_photo();
        let warped = scan_image(&image, 100)
            .expect("Should process successfully")
            .expect("Should find the page");

        // The page interior is uniformly bright
        let (w, h) = warped.dimensions();
        assert!(warped.get_pixel(w / 2, h / 2).0[0] > 200);
    }

    #[test]
    fn test_detection_drives_manual_rectification() {
        let image = create_test_photo();
        let pipeline = ScanPipeline::builder().scale_percent(100).build();

        let detection = pipeline
            .detect(&image)
            .expect("Should process successfully")
            .expect("Should find the page");
        let reloaded = Detection::from_geojson_str(&detection.to_geojson_string().expect("serialize"))
            .expect("parse");

        let manual = pipeline
            .process_detection(&image, &reloaded)
            .expect("Should rectify");
        assert_eq!(manual.detection, detection);
    }

    #[test]
    fn test_no_document() {
        let image = GrayImage::from_pixel(100, 100, Luma([90u8]));
        assert!(scan_image(&image, 50).expect("Should process").is_none());
    }
}
