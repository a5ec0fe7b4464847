use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Scale percentage must be positive, got {0}")]
    InvalidScalePercent(u32),

    #[error("Image of {width}x{height} pixels is empty")]
    EmptyImage { width: u32, height: u32 },

    #[error("Expected exactly 4 corner points, got {count}")]
    NotAQuadrilateral { count: usize },

    #[error("Adaptive threshold block size must be odd and at least 3, got {0}")]
    InvalidBlockSize(u32),

    #[error("Perspective transform failed: {0}")]
    Projection(String),

    #[error("Geometric computation error: {0}")]
    GeometricComputation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
