//! Nearest-segment selection against a path geometry
//!
//! Given a click's query point, the selector scans every consecutive
//! coordinate pair of a path geometry and picks the closest one. Distances
//! are compared in projected space: comparing raw geographic degrees would
//! skew results, since a degree of longitude shrinks with latitude while the
//! rendered pixels do not.

use crate::feature::{PathFeature, PathGeometry, SegmentFeature};
use crate::{utils, OverlayError, Result};
use geo::Point;

/// Coordinate transform applied before distance comparison
///
/// Must match the projection the render surface uses internally so that
/// "nearest segment" agrees with on-screen proximity.
pub trait Projection {
    fn project(&self, point: Point<f64>) -> Point<f64>;
}

/// Web Mercator (EPSG:3857) forward transform, the projection used by
/// slippy-map render surfaces. Input points are (lon, lat) in degrees.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    #[inline]
    fn project(&self, point: Point<f64>) -> Point<f64> {
        utils::wgs84_to_mercator(point.y(), point.x())
    }
}

/// Pass-through for inputs already expressed in the surface's projected
/// (screen-space) coordinates
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Projection for Identity {
    #[inline]
    fn project(&self, point: Point<f64>) -> Point<f64> {
        point
    }
}

/// The winning segment of a nearest-segment scan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestSegment {
    /// Index of the line part within the geometry (always 0 for `Line`)
    pub line_index: usize,
    /// Index of the first of the two adjacent coordinates within the part
    pub segment_index: usize,
    /// Distance from the query point in projected units
    pub distance: f64,
}

/// Pure nearest-segment search over path geometries
#[derive(Clone, Copy, Debug)]
pub struct SegmentSelector<P: Projection> {
    projection: P,
}

impl SegmentSelector<WebMercator> {
    /// Selector for geographic (lon, lat) inputs rendered on a Web Mercator
    /// surface
    pub fn web_mercator() -> Self {
        Self::new(WebMercator)
    }
}

impl<P: Projection> SegmentSelector<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }

    #[inline]
    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Find the segment of `geometry` closest to `query`
    ///
    /// Scans all N-1 consecutive pairs of every line part in order,
    /// comparing projected point-to-segment distances. The minimum is
    /// updated on strict `<` only, so the first segment encountered wins
    /// exact ties: results are deterministic in (line, segment) index order.
    pub fn nearest(&self, geometry: &PathGeometry, query: Point<f64>) -> Result<NearestSegment> {
        let projected_query = self.projection.project(query);

        let mut best: Option<NearestSegment> = None;

        for (line_index, line) in geometry.lines().enumerate() {
            if line.0.len() < 2 {
                return Err(OverlayError::InvalidGeometry(format!(
                    "line part {} has {} points, need at least 2",
                    line_index,
                    line.0.len()
                )));
            }

            let mut projected_end = self.projection.project(line.0[0].into());
            for (segment_index, pair) in line.0.windows(2).enumerate() {
                let projected_start = projected_end;
                projected_end = self.projection.project(pair[1].into());

                let distance = utils::point_to_segment_distance(
                    projected_query,
                    projected_start,
                    projected_end,
                );
                // Strict `<`: the first segment encountered keeps exact ties
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(NearestSegment {
                        line_index,
                        segment_index,
                        distance,
                    });
                }
            }
        }

        // Every accepted line part has >= 2 points, so `best` is only empty
        // when the geometry had no parts at all
        best.ok_or_else(|| {
            OverlayError::InvalidGeometry("geometry has no line parts".to_string())
        })
    }

    /// Find the nearest segment of `feature` and materialize it as an
    /// independent `SegmentFeature` carrying the feature's properties
    pub fn select(&self, feature: &PathFeature, query: Point<f64>) -> Result<SegmentFeature> {
        let nearest = self.nearest(feature.geometry(), query)?;
        let segment = feature
            .geometry()
            .segment_at(nearest.line_index, nearest.segment_index)
            .ok_or_else(|| {
                OverlayError::InvalidGeometry("winning segment out of bounds".to_string())
            })?;
        Ok(SegmentFeature::new(segment, feature.properties().clone()))
    }
}
