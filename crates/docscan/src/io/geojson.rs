use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, Value, feature::Id};
use scan_common::{ImageDimensions, Point2D};
use serde_json::{Map, Value as JsonValue, json};

use crate::{
    error::{Result, ScanError},
    pipeline::Detection,
    types::{OrderedQuad, Quadrilateral},
};

const WORKING_WIDTH: &str = "working_width";
const WORKING_HEIGHT: &str = "working_height";

impl Detection {
    /// Export as a FeatureCollection holding one closed Polygon whose ring
    /// follows corner role order.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut ring: Vec<Vec<f64>> = self.quad.corners().iter().map(|p| vec![p.x, p.y]).collect();
        ring.push(ring[0].clone());

        let mut properties = Map::new();
        properties.insert(
            "corners".to_string(),
            json!(self.quad.iter().map(|(corner, _)| corner.to_string()).collect::<Vec<_>>()),
        );
        properties.insert("target_width".to_string(), json!(self.target.max_width));
        properties.insert("target_height".to_string(), json!(self.target.max_height));

        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: Some(Id::String("document".to_string())),
            properties: Some(properties),
            foreign_members: None,
        };

        let mut foreign_members = Map::new();
        foreign_members.insert(WORKING_WIDTH.to_string(), json!(self.working.width));
        foreign_members.insert(WORKING_HEIGHT.to_string(), json!(self.working.height));

        FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: Some(foreign_members),
        }
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson())?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Load a detection from GeoJSON file
    pub fn from_geojson_file(path: impl AsRef<Path>) -> Result<Self> {
        let geojson_str = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&geojson_str)
    }

    /// Load a detection from a GeoJSON string.
    ///
    /// Ring positions are taken as TL, TR, BR, BL; the target size is
    /// recomputed from them.
    pub fn from_geojson_str(geojson_str: &str) -> Result<Self> {
        let collection: FeatureCollection = geojson_str.parse()?;

        let foreign_members = collection
            .foreign_members
            .as_ref()
            .ok_or_else(|| malformed("missing working image size"))?;
        let working = ImageDimensions::new(
            dimension(foreign_members, WORKING_WIDTH)?,
            dimension(foreign_members, WORKING_HEIGHT)?,
        );

        let ring = collection
            .features
            .into_iter()
            .find_map(|feature| match feature.geometry?.value {
                Value::Polygon(mut rings) if !rings.is_empty() => Some(rings.swap_remove(0)),
                _ => None,
            })
            .ok_or_else(|| malformed("no polygon feature"))?;

        if ring.len() < 4 {
            return Err(malformed(&format!("ring has {} positions, need 4", ring.len())));
        }

        let corners = ring
            .iter()
            .take(4)
            .map(|position| match position.as_slice() {
                &[x, y] => Ok(Point2D::new(x, y)),
                _ => Err(malformed("positions must be [x, y]")),
            })
            .collect::<Result<Vec<_>>>()?;
        let [top_left, top_right, bottom_right, bottom_left] = Quadrilateral::try_from(corners)?.0;

        Ok(Self::new(
            OrderedQuad {
                top_left,
                top_right,
                bottom_right,
                bottom_left,
            },
            working,
        ))
    }
}

fn dimension(members: &Map<String, JsonValue>, key: &str) -> Result<u32> {
    members
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| malformed(&format!("missing or invalid {key}")))
}

fn malformed(reason: &str) -> ScanError {
    ScanError::GeometricComputation(format!("Malformed detection GeoJSON: {reason}"))
}
