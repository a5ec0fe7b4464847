pub mod geojson;

use std::path::Path;

use image::GrayImage;
use tracing::debug;

use crate::error::Result;

/// Open any supported image file as 8-bit grayscale
pub fn load_grayscale(path: impl AsRef<Path>) -> Result<GrayImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_luma8();
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Image loaded");
    Ok(image)
}

/// Write a grayscale image; the format follows the file extension
pub fn save_grayscale(image: &GrayImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image.save(path)?;
    debug!(path = %path.display(), "Image saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::tempdir;

    #[test]
    fn png_round_trip_is_lossless() {
        let dir = tempdir().expect("scratch dir");
        let path = dir.path().join("page.png");
        let image = GrayImage::from_fn(8, 6, |x, y| Luma([(x * 30 + y) as u8]));

        save_grayscale(&image, &path).expect("save");
        let loaded = load_grayscale(&path).expect("load");

        assert_eq!(loaded, image);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let dir = tempdir().expect("scratch dir");
        let err = load_grayscale(dir.path().join("missing.png")).expect_err("missing");
        assert!(matches!(err, crate::error::ScanError::ImageLoad(_)));
    }
}
