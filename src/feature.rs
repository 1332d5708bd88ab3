//! Geometry and feature data model
//!
//! This module defines the crate's view of a fetched transit path: a
//! `Path` is an ordered set of `PathFeature`s, each pairing a polyline
//! geometry with its GeoJSON properties. Conversions to and from the
//! `geojson` crate's types live here so the rest of the crate works with
//! `geo` primitives only.

use crate::{OverlayError, Result};
use geo::{Coord, Line, LineString, MultiLineString};
use geojson::JsonObject;

/// Polyline geometry of a single path feature
///
/// Mirrors the GeoJSON `LineString` / `MultiLineString` split as a tagged
/// sum type. Every line part must hold at least 2 coordinates; a shorter
/// line has no segments and is rejected as invalid input.
#[derive(Clone, Debug, PartialEq)]
pub enum PathGeometry {
    /// A single polyline
    Line(LineString<f64>),
    /// Several disjoint polylines sharing one logical feature
    MultiLine(MultiLineString<f64>),
}

impl PathGeometry {
    /// Iterate over all line parts (one for `Line`, all for `MultiLine`)
    pub fn lines(&self) -> std::slice::Iter<'_, LineString<f64>> {
        match self {
            PathGeometry::Line(line) => std::slice::from_ref(line).iter(),
            PathGeometry::MultiLine(multi) => multi.0.iter(),
        }
    }

    /// Total number of candidate segments: for a line of N points, N - 1,
    /// summed over all parts
    pub fn segment_count(&self) -> usize {
        self.lines()
            .map(|line| line.0.len().saturating_sub(1))
            .sum()
    }

    /// The consecutive coordinate pair at (`line_index`, `segment_index`)
    pub fn segment_at(&self, line_index: usize, segment_index: usize) -> Option<Line<f64>> {
        let line = self.lines().nth(line_index)?;
        let start = *line.0.get(segment_index)?;
        let end = *line.0.get(segment_index + 1)?;
        Some(Line::new(start, end))
    }

    /// Check the ≥2-points-per-line invariant
    ///
    /// A geometry with no line parts at all is also invalid: it has no
    /// segments to select from.
    pub fn validate(&self) -> Result<()> {
        let mut parts = 0;
        for (index, line) in self.lines().enumerate() {
            if line.0.len() < 2 {
                return Err(OverlayError::InvalidGeometry(format!(
                    "line part {} has {} points, need at least 2",
                    index,
                    line.0.len()
                )));
            }
            parts += 1;
        }
        if parts == 0 {
            return Err(OverlayError::InvalidGeometry(
                "geometry has no line parts".to_string(),
            ));
        }
        Ok(())
    }
}

/// One feature of a path: polyline geometry plus its GeoJSON properties
#[derive(Clone, Debug, PartialEq)]
pub struct PathFeature {
    geometry: PathGeometry,
    properties: JsonObject,
}

impl PathFeature {
    /// Create a feature, validating the geometry invariant
    pub fn new(geometry: PathGeometry, properties: JsonObject) -> Result<Self> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            properties,
        })
    }

    #[inline]
    pub fn geometry(&self) -> &PathGeometry {
        &self.geometry
    }

    #[inline]
    pub fn properties(&self) -> &JsonObject {
        &self.properties
    }
}

impl TryFrom<geojson::Feature> for PathFeature {
    type Error = OverlayError;

    fn try_from(feature: geojson::Feature) -> Result<Self> {
        let geometry = feature
            .geometry
            .ok_or_else(|| OverlayError::InvalidGeometry("feature has no geometry".to_string()))?;
        let properties = feature.properties.unwrap_or_default();

        let geometry = match geometry.value {
            value @ geojson::Value::LineString(_) => PathGeometry::Line(
                LineString::try_from(value)
                    .map_err(|e| OverlayError::InvalidGeometry(e.to_string()))?,
            ),
            value @ geojson::Value::MultiLineString(_) => PathGeometry::MultiLine(
                MultiLineString::try_from(value)
                    .map_err(|e| OverlayError::InvalidGeometry(e.to_string()))?,
            ),
            other => {
                return Err(OverlayError::InvalidGeometry(format!(
                    "unsupported geometry type {}",
                    other.type_name()
                )));
            }
        };

        PathFeature::new(geometry, properties)
    }
}

impl From<&PathFeature> for geojson::Feature {
    fn from(feature: &PathFeature) -> Self {
        let value = match &feature.geometry {
            PathGeometry::Line(line) => geojson::Value::from(line),
            PathGeometry::MultiLine(multi) => geojson::Value::from(multi),
        };
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        }
    }
}

/// A named base overlay: the feature collection fetched for one path,
/// immutable once added to the registry
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    features: Vec<PathFeature>,
}

impl Path {
    pub fn new(features: Vec<PathFeature>) -> Self {
        Self { features }
    }

    #[inline]
    pub fn features(&self) -> &[PathFeature] {
        &self.features
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize back to a GeoJSON feature collection (for draw signals)
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.features.iter().map(geojson::Feature::from).collect(),
            foreign_members: None,
        }
    }
}

impl TryFrom<geojson::FeatureCollection> for Path {
    type Error = OverlayError;

    fn try_from(collection: geojson::FeatureCollection) -> Result<Self> {
        let features = collection
            .features
            .into_iter()
            .map(PathFeature::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Path::new(features))
    }
}

/// A single selected segment, materialized as an independent feature
///
/// Holds exactly the two adjacent coordinates of the winning segment plus a
/// copy of the source feature's properties. Always serializes as a GeoJSON
/// `LineString`, regardless of the source geometry variant.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentFeature {
    line: LineString<f64>,
    properties: JsonObject,
}

impl SegmentFeature {
    pub fn new(segment: Line<f64>, properties: JsonObject) -> Self {
        Self {
            line: LineString::new(vec![segment.start, segment.end]),
            properties,
        }
    }

    #[inline]
    pub fn start(&self) -> Coord<f64> {
        self.line.0[0]
    }

    #[inline]
    pub fn end(&self) -> Coord<f64> {
        self.line.0[1]
    }

    #[inline]
    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    #[inline]
    pub fn properties(&self) -> &JsonObject {
        &self.properties
    }
}

impl From<&SegmentFeature> for geojson::Feature {
    fn from(segment: &SegmentFeature) -> Self {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&segment.line))),
            id: None,
            properties: Some(segment.properties.clone()),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Coord};

    fn props(route: &str) -> JsonObject {
        let mut map = JsonObject::new();
        map.insert("Route".to_string(), serde_json::json!(route));
        map
    }

    #[test]
    fn test_line_geometry_counts() {
        let geometry = PathGeometry::Line(line_string![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
        ]);
        assert_eq!(geometry.segment_count(), 2);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_multi_line_geometry_counts() {
        let geometry = PathGeometry::MultiLine(MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 0.0, y: 5.0), (x: 1.0, y: 5.0), (x: 2.0, y: 5.0)],
        ]));
        assert_eq!(geometry.segment_count(), 3);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_short_line_is_invalid() {
        let geometry = PathGeometry::Line(LineString::new(vec![Coord { x: 0.0, y: 0.0 }]));
        assert!(matches!(
            geometry.validate(),
            Err(OverlayError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_empty_multi_line_is_invalid() {
        let geometry = PathGeometry::MultiLine(MultiLineString::new(Vec::new()));
        assert!(matches!(
            geometry.validate(),
            Err(OverlayError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_segment_at() {
        let geometry = PathGeometry::MultiLine(MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 0.0, y: 5.0), (x: 1.0, y: 5.0), (x: 2.0, y: 5.0)],
        ]));

        let segment = geometry.segment_at(1, 1).unwrap();
        assert_eq!(segment.start, Coord { x: 1.0, y: 5.0 });
        assert_eq!(segment.end, Coord { x: 2.0, y: 5.0 });

        assert!(geometry.segment_at(0, 1).is_none());
        assert!(geometry.segment_at(2, 0).is_none());
    }

    #[test]
    fn test_feature_from_geojson() {
        let geojson_feature = geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![0.0, 0.0],
                vec![10.0, 0.0],
            ]))),
            id: None,
            properties: Some(props("M15")),
            foreign_members: None,
        };

        let feature = PathFeature::try_from(geojson_feature).unwrap();
        assert_eq!(feature.geometry().segment_count(), 1);
        assert_eq!(feature.properties()["Route"], serde_json::json!("M15"));
    }

    #[test]
    fn test_feature_rejects_point_geometry() {
        let geojson_feature = geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                0.0, 0.0,
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        };

        assert!(matches!(
            PathFeature::try_from(geojson_feature),
            Err(OverlayError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_feature_rejects_missing_geometry() {
        let geojson_feature = geojson::Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };

        assert!(matches!(
            PathFeature::try_from(geojson_feature),
            Err(OverlayError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_segment_feature_serializes_as_line_string() {
        let segment = SegmentFeature::new(
            Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }),
            props("M15"),
        );

        let feature = geojson::Feature::from(&segment);
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "LineString");
        assert_eq!(
            json["geometry"]["coordinates"],
            serde_json::json!([[0.0, 0.0], [10.0, 0.0]])
        );
        assert_eq!(json["properties"]["Route"], "M15");
    }

    #[test]
    fn test_path_round_trip() {
        let collection = geojson::FeatureCollection {
            bbox: None,
            features: vec![geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::MultiLineString(
                    vec![
                        vec![vec![0.0, 0.0], vec![1.0, 1.0]],
                        vec![vec![2.0, 2.0], vec![3.0, 3.0]],
                    ],
                ))),
                id: None,
                properties: Some(props("B62")),
                foreign_members: None,
            }],
            foreign_members: None,
        };

        let path = Path::try_from(collection).unwrap();
        assert_eq!(path.features().len(), 1);

        let exported = path.to_geojson();
        let json = serde_json::to_value(&exported).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "MultiLineString");
    }
}
