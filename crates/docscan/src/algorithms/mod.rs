pub mod preprocessing;
pub mod edges;
pub mod extraction;
pub mod geometry;
pub mod simplification;
pub mod selection;
pub mod ordering;
pub mod rectification;
pub mod binarization;

pub use preprocessing::*;
pub use edges::*;
pub use extraction::*;
pub use geometry::{arc_length, contour_area};
pub use simplification::*;
pub use selection::*;
pub use ordering::*;
pub use rectification::*;
pub use binarization::*;
