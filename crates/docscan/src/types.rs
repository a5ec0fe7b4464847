use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use scan_common::Point2D;

use crate::error::{Result, ScanError};

/// Closed boundary of a connected region, as traced from an edge map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2D>,
}

impl Contour {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Absolute enclosed area of the closed curve
    pub fn area(&self) -> f64 {
        crate::algorithms::contour_area(&self.points)
    }

    /// Length of the closed curve
    pub fn perimeter(&self) -> f64 {
        crate::algorithms::arc_length(&self.points, true)
    }
}

impl From<Vec<Point2D>> for Contour {
    fn from(points: Vec<Point2D>) -> Self {
        Self::new(points)
    }
}

/// Exactly four points in whatever order the polygon approximation produced them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral(pub [Point2D; 4]);

impl Quadrilateral {
    pub fn new(points: [Point2D; 4]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point2D; 4] {
        &self.0
    }
}

impl TryFrom<Vec<Point2D>> for Quadrilateral {
    type Error = ScanError;

    fn try_from(points: Vec<Point2D>) -> Result<Self> {
        let count = points.len();
        let points: [Point2D; 4] = points
            .try_into()
            .map_err(|_| ScanError::NotAQuadrilateral { count })?;
        Ok(Self(points))
    }
}

/// Semantic role of a document corner, in canonical order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// Four corners tagged by role.
///
/// Built by [`crate::algorithms::order_corners`], which does not guarantee
/// that the four roles refer to four distinct points: see
/// [`OrderedQuad::has_coincident_roles`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuad {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

impl OrderedQuad {
    pub fn get(&self, corner: Corner) -> Point2D {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    /// Corners in `[TL, TR, BR, BL]` order
    pub fn corners(&self) -> [Point2D; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Iterate `(role, point)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Corner, Point2D)> + '_ {
        Corner::iter().map(move |corner| (corner, self.get(corner)))
    }

    /// True when the ordering heuristic assigned the same point to two roles.
    ///
    /// Happens when input points tie on `x + y` or `y - x`.
    pub fn has_coincident_roles(&self) -> bool {
        let corners = self.corners();
        (0..corners.len()).any(|i| (i + 1..corners.len()).any(|j| corners[i] == corners[j]))
    }
}

impl From<OrderedQuad> for Quadrilateral {
    fn from(quad: OrderedQuad) -> Self {
        Self(quad.corners())
    }
}

/// Output size of the rectified document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRectangle {
    pub max_width: u32,
    pub max_height: u32,
}

impl TargetRectangle {
    /// Destination corners `(0,0), (w-1,0), (w-1,h-1), (0,h-1)` in role order
    pub fn corners(&self) -> [Point2D; 4] {
        let right = self.max_width as f64 - 1.0;
        let bottom = self.max_height as f64 - 1.0;
        [
            Point2D::new(0.0, 0.0),
            Point2D::new(right, 0.0),
            Point2D::new(right, bottom),
            Point2D::new(0.0, bottom),
        ]
    }
}
