use image::{GrayImage, imageops::FilterType};
use scan_common::ImageDimensions;
use tracing::debug;

use crate::{
    error::{Result, ScanError},
    traits::ImagePreprocessor,
};

/// Uniform downsampling to a working resolution
#[derive(Debug, Clone)]
pub struct Resize {
    pub scale_percent: u32,
    pub filter: FilterType,
}

impl Resize {
    pub fn new(scale_percent: u32) -> Self {
        Self {
            scale_percent,
            ..Self::default()
        }
    }
}

impl Default for Resize {
    fn default() -> Self {
        Self {
            scale_percent: 50,
            filter: FilterType::Triangle,
        }
    }
}

impl ImagePreprocessor for Resize {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        resize_with_filter(image, self.scale_percent, self.filter)
    }
}

/// Resize to `floor(w * p / 100) x floor(h * p / 100)` with bilinear filtering
pub fn resize(image: &GrayImage, scale_percent: u32) -> Result<GrayImage> {
    resize_with_filter(image, scale_percent, FilterType::Triangle)
}

fn resize_with_filter(image: &GrayImage, scale_percent: u32, filter: FilterType) -> Result<GrayImage> {
    if scale_percent == 0 {
        return Err(ScanError::InvalidScalePercent(scale_percent));
    }

    let (width, height) = image.dimensions();
    let target = ImageDimensions::new(width, height).scaled(scale_percent);
    if target.is_empty() {
        return Err(ScanError::EmptyImage {
            width: target.width,
            height: target.height,
        });
    }

    debug!(width, height, target_width = target.width, target_height = target.height, "Resizing");

    // Same-size resampling is a no-op; skip the filter pass.
    if target.width == width && target.height == height {
        return Ok(image.clone());
    }
    Ok(image::imageops::resize(image, target.width, target.height, filter))
}

/// Gaussian blur preprocessor for noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.sigma <= 0.0 {
            return Ok(image.clone());
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}
