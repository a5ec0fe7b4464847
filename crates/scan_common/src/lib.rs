//! # Scan Common - Shared Types and Utilities
//!
//! Value types and file helpers shared by the document scanner crates.
//!
//! ## Example
//!
//! ```rust
//! use scan_common::{ImageDimensions, Point2D};
//!
//! let a = Point2D::new(0.0, 0.0);
//! let b = Point2D::new(3.0, 4.0);
//! assert_eq!(a.distance_to(b), 5.0);
//!
//! let working = ImageDimensions::new(1001, 751).scaled(50);
//! assert_eq!((working.width, working.height), (500, 375));
//! ```

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;

/// Result type for shared scanner utilities
pub type Result<T> = std::result::Result<T, CommonError>;

/// Error type for shared scanner utilities
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Path has no file name: {path}")]
    MissingFileName { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 2D point in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate this point by the given offsets
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Calculate distance to another point
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// `x + y`, smallest at the top-left of an image
    pub fn sum(self) -> f64 {
        self.x + self.y
    }

    /// `y - x`, smallest at the top-right of an image
    pub fn diff(self) -> f64 {
        self.y - self.x
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i32, i32)> for Point2D {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// Create new dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Uniformly scale both axes by an integer percentage, rounding down.
    pub fn scaled(self, percent: u32) -> Self {
        let scale = |v: u32| (v as u64 * percent as u64 / 100) as u32;
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }

    /// Number of pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Utility functions for scanner file handling
pub mod utils {
    use super::*;
    use std::path::{Path, PathBuf};

    /// Suffix appended to the input file stem for scan outputs
    pub const SCAN_SUFFIX: &str = "_scan";

    /// Check if a file extension indicates a raster image the scanner can decode
    pub fn is_image_file(filename: &str) -> bool {
        matches!(
            get_file_extension(filename).as_deref(),
            Some("jpg" | "jpeg" | "png" | "bmp" | "tif" | "tiff" | "webp" | "gif")
        )
    }

    /// Get file extension from filename
    pub fn get_file_extension(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Ensure output directory exists
    pub fn ensure_output_dir(path: impl AsRef<Path>) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    /// Derive `<stem>_scan.png`, placed in `output_dir` or next to the input.
    pub fn scan_output_path(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| CommonError::MissingFileName {
                path: input.display().to_string(),
            })?;

        let file_name = format!("{stem}{SCAN_SUFFIX}.png");
        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Ok(dir.join(file_name))
    }

    /// List the image files directly inside `dir`, sorted by path.
    pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(CommonError::FileNotFound {
                path: dir.display().to_string(),
            });
        }
        if !dir.is_dir() {
            return Err(CommonError::NotADirectory {
                path: dir.display().to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_image_file);
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_point_operations() {
        let point = Point2D::new(10.0, 20.0);
        let translated = point.translate(5.0, -3.0);

        assert_eq!(translated.x, 15.0);
        assert_eq!(translated.y, 17.0);

        let distance = point.distance_to(Point2D::new(13.0, 24.0));
        assert!((distance - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_point_sum_and_diff() {
        let point = Point2D::new(90.0, 60.0);
        assert_eq!(point.sum(), 150.0);
        assert_eq!(point.diff(), -30.0);
        assert_eq!(Point2D::from((3, -4)), Point2D::new(3.0, -4.0));
    }

    #[test]
    fn test_dimensions_scaled_rounds_down() {
        let dims = ImageDimensions::new(1001, 751);
        assert_eq!(dims.scaled(50), ImageDimensions::new(500, 375));
        assert_eq!(dims.scaled(100), dims);
        assert_eq!(dims.scaled(33), ImageDimensions::new(330, 247));
        assert!(ImageDimensions::new(1, 1).scaled(50).is_empty());
    }

    #[test]
    fn test_dimensions_scaled_does_not_overflow() {
        let dims = ImageDimensions::new(u32::MAX, 10);
        assert_eq!(dims.scaled(100).width, u32::MAX);
        assert_eq!(dims.area(), u32::MAX as u64 * 10);
    }

    #[test]
    fn test_file_utilities() {
        assert!(utils::is_image_file("page.JPG"));
        assert!(utils::is_image_file("page.png"));
        assert!(!utils::is_image_file("notes.txt"));
        assert!(!utils::is_image_file("README"));
        assert_eq!(utils::get_file_extension("page.Tiff"), Some("tiff".to_string()));
    }

    #[test]
    fn test_scan_output_path() {
        let input = Path::new("photos/receipt.jpg");
        assert_eq!(
            utils::scan_output_path(input, None).unwrap(),
            Path::new("photos/receipt_scan.png")
        );
        assert_eq!(
            utils::scan_output_path(input, Some(Path::new("out"))).unwrap(),
            Path::new("out/receipt_scan.png")
        );
    }

    #[test]
    fn test_list_image_files_missing_dir() {
        let result = utils::list_image_files(Path::new("definitely/not/here"));
        assert!(matches!(result, Err(CommonError::FileNotFound { .. })));
    }
}
