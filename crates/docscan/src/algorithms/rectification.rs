use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::debug;

use super::order_corners;
use crate::{
    error::{Result, ScanError},
    types::{OrderedQuad, Quadrilateral, TargetRectangle},
};

/// Output size for a rectified quad.
///
/// Each side is the longer of its two opposite edges, rounded to the
/// nearest pixel, so foreshortened edges are stretched rather than the
/// near edges cropped.
pub fn target_rectangle(quad: &OrderedQuad) -> TargetRectangle {
    let width_bottom = quad.bottom_right.distance_to(quad.bottom_left);
    let width_top = quad.top_right.distance_to(quad.top_left);
    let height_right = quad.top_right.distance_to(quad.bottom_right);
    let height_left = quad.top_left.distance_to(quad.bottom_left);

    TargetRectangle {
        max_width: width_bottom.max(width_top).round() as u32,
        max_height: height_right.max(height_left).round() as u32,
    }
}

/// Projective mapping of `quad` onto the target rectangle, role to role.
pub fn perspective_transform(quad: &OrderedQuad, target: &TargetRectangle) -> Result<Projection> {
    let src = quad.corners().map(|p| (p.x as f32, p.y as f32));
    let dst = target.corners().map(|p| (p.x as f32, p.y as f32));

    Projection::from_control_points(src, dst).ok_or_else(|| {
        ScanError::Projection(format!(
            "no projective mapping from {:?} onto a {}x{} rectangle",
            src, target.max_width, target.max_height
        ))
    })
}

/// Warps a quadrilateral region onto an axis-aligned image
#[derive(Debug, Clone, Copy)]
pub struct Rectifier {
    pub interpolation: Interpolation,
    /// Value for output pixels whose pre-image falls outside the source
    pub fill: Luma<u8>,
}

impl Default for Rectifier {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
            fill: Luma([0u8]),
        }
    }
}

impl Rectifier {
    /// Order the corners, then warp. See [`Rectifier::rectify_ordered`].
    pub fn rectify(&self, source: &GrayImage, quad: &Quadrilateral) -> Result<GrayImage> {
        self.rectify_ordered(source, &order_corners(quad))
    }

    /// Output has exactly the [`target_rectangle`] dimensions of `quad`.
    pub fn rectify_ordered(&self, source: &GrayImage, quad: &OrderedQuad) -> Result<GrayImage> {
        let target = target_rectangle(quad);
        let projection = perspective_transform(quad, &target)?;

        let mut output = GrayImage::new(target.max_width, target.max_height);
        warp_into(source, &projection, self.interpolation, self.fill, &mut output);

        debug!(
            width = target.max_width,
            height = target.max_height,
            "Quadrilateral rectified"
        );
        Ok(output)
    }
}

/// Rectify with bilinear interpolation and black fill
pub fn rectify(source: &GrayImage, quad: &Quadrilateral) -> Result<GrayImage> {
    Rectifier::default().rectify(source, quad)
}
