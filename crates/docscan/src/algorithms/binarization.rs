use image::{GrayImage, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    error::{Result, ScanError},
    traits::Binarizer,
};

/// How the local threshold neighbourhood is weighted
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdaptiveMethod {
    /// Plain box mean over the block
    Mean,
    /// Gaussian-weighted mean over the block
    #[default]
    Gaussian,
}

/// Per-pixel binarization against a local mean.
///
/// A pixel becomes `max_value` when it is brighter than its neighbourhood
/// mean minus `c`, and 0 otherwise.
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold {
    pub max_value: u8,
    pub method: AdaptiveMethod,
    /// Odd neighbourhood side length, at least 3
    pub block_size: u32,
    pub c: f64,
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            max_value: 225,
            method: AdaptiveMethod::Gaussian,
            block_size: 11,
            c: 2.0,
        }
    }
}

impl AdaptiveThreshold {
    /// Gaussian sigma matching a `block_size` kernel
    pub fn sigma(&self) -> f32 {
        0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    fn local_mean(&self, image: &GrayImage) -> GrayImage {
        match self.method {
            AdaptiveMethod::Gaussian => imageproc::filter::gaussian_blur_f32(image, self.sigma()),
            AdaptiveMethod::Mean => {
                let radius = self.block_size / 2;
                imageproc::filter::box_filter(image, radius, radius)
            }
        }
    }
}

impl Binarizer for AdaptiveThreshold {
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(ScanError::InvalidBlockSize(self.block_size));
        }

        let mean = self.local_mean(image);
        Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let value = image.get_pixel(x, y).0[0] as f64;
            let threshold = mean.get_pixel(x, y).0[0] as f64 - self.c;
            if value > threshold {
                Luma([self.max_value])
            } else {
                Luma([0u8])
            }
        }))
    }
}
