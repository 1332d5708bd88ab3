//! PathRegistry - overlay state for base paths and highlighted selections
//!
//! The registry owns the set of displayed base paths plus the highlighted
//! single-segment and whole-line overlays derived from them. It reacts to
//! typed events from the render surface (path added/removed, segment click)
//! and answers with fire-and-forget draw/remove signals; it never reads
//! anything back from the surface.

use crate::feature::{Path, PathFeature, SegmentFeature};
use crate::selector::{Projection, SegmentSelector, WebMercator};
use crate::{OverlayError, OverlayKey, Result};

use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Key assigned to a highlighted segment, monotonically increasing and
/// never reused within a session
pub type SegmentKey = u64;

/// Typed handle for one overlay on the render surface
///
/// The three namespaces are independent: a base path, a highlighted line
/// and a highlighted segment never collide even under the same name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverlayId {
    Path(String),
    Segment(SegmentKey),
    Line(String),
}

/// Z-order hint attached to a draw signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOrder {
    /// Behind everything already drawn (base paths)
    Back,
    /// On top of everything already drawn (highlights)
    Front,
}

/// Styling attached to a draw signal; unset fields fall back to the
/// surface's defaults
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl OverlayStyle {
    /// Default styling for base paths: wide and faint
    pub fn base() -> Self {
        Self {
            color: None,
            weight: Some(8.0),
            opacity: Some(0.2),
        }
    }

    /// Emphasis styling for highlighted segments and lines
    pub fn highlight() -> Self {
        Self {
            color: Some("#ff0000".to_string()),
            weight: None,
            opacity: None,
        }
    }
}

/// Render collaborator contract
///
/// Signals are fire-and-forget: the registry does not wait on them and the
/// surface must not fail them. Line-name filtering of highlighted lines is
/// a surface capability and is not part of this contract.
pub trait RenderSurface {
    fn draw_overlay(
        &mut self,
        id: OverlayId,
        features: geojson::FeatureCollection,
        style: OverlayStyle,
        order: DrawOrder,
    );

    fn remove_overlay(&mut self, id: OverlayId);
}

/// Surface that drops every signal, for headless sessions that only need
/// the selection state (e.g. loading a comparison dataset without drawing)
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSurface;

impl RenderSurface for NoopSurface {
    fn draw_overlay(
        &mut self,
        _id: OverlayId,
        _features: geojson::FeatureCollection,
        _style: OverlayStyle,
        _order: DrawOrder,
    ) {
    }

    fn remove_overlay(&mut self, _id: OverlayId) {}
}

/// Owned overlay state: base paths by name, highlighted segments by key,
/// highlighted lines by name
///
/// All operations run to completion synchronously; a failed operation
/// leaves the registry in its prior state. Highlighted segments are
/// already-materialized copies, so removing a base path does not remove
/// them from the registry (only their visuals are swept along).
pub struct PathRegistry<S: RenderSurface, P: Projection = WebMercator> {
    paths: HashMap<String, Path>,
    highlighted_segments: BTreeMap<SegmentKey, SegmentFeature>,
    highlighted_lines: BTreeMap<String, Path>,
    next_key: SegmentKey,
    surface: S,
    selector: SegmentSelector<P>,
}

impl<S: RenderSurface> PathRegistry<S, WebMercator> {
    /// Registry for geographic (lon, lat) data on a Web Mercator surface
    pub fn new(surface: S) -> Self {
        Self::with_projection(surface, WebMercator)
    }
}

impl<S: RenderSurface, P: Projection> PathRegistry<S, P> {
    /// Registry with an explicit projection, which must match the one the
    /// render surface uses internally
    pub fn with_projection(surface: S, projection: P) -> Self {
        Self {
            paths: HashMap::new(),
            highlighted_segments: BTreeMap::new(),
            highlighted_lines: BTreeMap::new(),
            next_key: 0,
            surface,
            selector: SegmentSelector::new(projection),
        }
    }

    /// Store a base path and signal it drawn behind existing overlays
    ///
    /// Re-adding a name overwrites the stored path (last write wins); the
    /// superseded overlay is removed from the surface first.
    pub fn add_path(&mut self, name: &str, path: Path, style: Option<OverlayStyle>) {
        if self.paths.contains_key(name) {
            tracing::debug!("replacing path {:?}", name);
            self.surface.remove_overlay(OverlayId::Path(name.to_string()));
        }

        let features = path.to_geojson();
        self.paths.insert(name.to_string(), path);
        self.surface.draw_overlay(
            OverlayId::Path(name.to_string()),
            features,
            style.unwrap_or_else(OverlayStyle::base),
            DrawOrder::Back,
        );
    }

    /// Remove a base path and its rendering
    ///
    /// Also sweeps every highlighted-segment and highlighted-line overlay
    /// off the surface while keeping their registry entries: highlights are
    /// independent copies and survive base-path removal/redraw cycles.
    pub fn remove_path(&mut self, name: &str) -> Result<()> {
        if self.paths.remove(name).is_none() {
            return Err(OverlayError::PathNotFound(name.to_string()));
        }
        self.surface.remove_overlay(OverlayId::Path(name.to_string()));

        for key in self.highlighted_segments.keys() {
            self.surface.remove_overlay(OverlayId::Segment(*key));
        }
        for line_name in self.highlighted_lines.keys() {
            self.surface
                .remove_overlay(OverlayId::Line(line_name.clone()));
        }
        Ok(())
    }

    /// Handle a click on a base path: select the nearest segment across all
    /// of the path's features, store it under a fresh key, and signal it
    /// drawn with emphasis on top of existing overlays
    ///
    /// Returns the assigned key. Selection is pure, so clicking the same
    /// spot twice yields two keys mapping to equal segment features.
    pub fn on_segment_click(&mut self, path_name: &str, query: Point<f64>) -> Result<SegmentKey> {
        let path = self
            .paths
            .get(path_name)
            .ok_or_else(|| OverlayError::PathNotFound(path_name.to_string()))?;

        // Scan every feature of the path; strict `<` keeps the earliest
        // feature on exact ties, matching the per-geometry tie-break
        let mut best: Option<(f64, &PathFeature)> = None;
        for feature in path.features() {
            let nearest = self.selector.nearest(feature.geometry(), query)?;
            if best.map_or(true, |(distance, _)| nearest.distance < distance) {
                best = Some((nearest.distance, feature));
            }
        }
        let (_, feature) = best.ok_or_else(|| {
            OverlayError::InvalidGeometry(format!("path {:?} has no features", path_name))
        })?;

        let segment = self.selector.select(feature, query)?;

        let key = self.next_key;
        self.next_key += 1;
        tracing::debug!("highlighting segment {} of path {:?}", key, path_name);

        let features = geojson::FeatureCollection {
            bbox: None,
            features: vec![geojson::Feature::from(&segment)],
            foreign_members: None,
        };
        self.highlighted_segments.insert(key, segment);
        self.surface.draw_overlay(
            OverlayId::Segment(key),
            features,
            OverlayStyle::highlight(),
            DrawOrder::Front,
        );
        Ok(key)
    }

    /// Remove one highlighted segment, state and rendering
    pub fn remove_segment(&mut self, key: SegmentKey) -> Result<()> {
        if self.highlighted_segments.remove(&key).is_none() {
            return Err(OverlayError::KeyNotFound(OverlayKey::Segment(key)));
        }
        self.surface.remove_overlay(OverlayId::Segment(key));
        Ok(())
    }

    /// Highlight a whole path under a caller-supplied line name, drawn with
    /// emphasis in front of existing overlays
    ///
    /// At most one highlighted line per name: a previous entry is removed
    /// (state and rendering) before the new one is drawn.
    pub fn add_line(&mut self, line_name: &str, path: Path) {
        if self.highlighted_lines.remove(line_name).is_some() {
            tracing::debug!("replacing highlighted line {:?}", line_name);
            self.surface
                .remove_overlay(OverlayId::Line(line_name.to_string()));
        }

        let features = path.to_geojson();
        self.highlighted_lines.insert(line_name.to_string(), path);
        self.surface.draw_overlay(
            OverlayId::Line(line_name.to_string()),
            features,
            OverlayStyle::highlight(),
            DrawOrder::Front,
        );
    }

    /// Remove one highlighted line, state and rendering
    pub fn remove_line(&mut self, line_name: &str) -> Result<()> {
        if self.highlighted_lines.remove(line_name).is_none() {
            return Err(OverlayError::KeyNotFound(OverlayKey::Line(
                line_name.to_string(),
            )));
        }
        self.surface
            .remove_overlay(OverlayId::Line(line_name.to_string()));
        Ok(())
    }

    /// Remove every path, highlighted segment and highlighted line, state
    /// and rendering, returning to the initial empty state
    ///
    /// The key counter is not reset: keys stay unique for the whole session.
    pub fn clear_all(&mut self) {
        tracing::debug!(
            "clearing {} paths, {} segments, {} lines",
            self.paths.len(),
            self.highlighted_segments.len(),
            self.highlighted_lines.len()
        );

        for name in self.paths.keys() {
            self.surface.remove_overlay(OverlayId::Path(name.clone()));
        }
        for key in self.highlighted_segments.keys() {
            self.surface.remove_overlay(OverlayId::Segment(*key));
        }
        for name in self.highlighted_lines.keys() {
            self.surface.remove_overlay(OverlayId::Line(name.clone()));
        }

        self.paths.clear();
        self.highlighted_segments.clear();
        self.highlighted_lines.clear();
    }

    /// Merge every highlighted segment and highlighted line into one
    /// feature collection for export
    ///
    /// Pure: no rendering side effects. Segments come first in ascending
    /// key order, then lines in name order, each contributing its features
    /// in stored order.
    pub fn export_highlighted(&self) -> geojson::FeatureCollection {
        let mut features = Vec::new();
        for segment in self.highlighted_segments.values() {
            features.push(geojson::Feature::from(segment));
        }
        for path in self.highlighted_lines.values() {
            features.extend(path.features().iter().map(geojson::Feature::from));
        }
        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[inline]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn contains_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    #[inline]
    pub fn highlighted_segment_count(&self) -> usize {
        self.highlighted_segments.len()
    }

    #[inline]
    pub fn highlighted_line_count(&self) -> usize {
        self.highlighted_lines.len()
    }

    #[inline]
    pub fn get_segment(&self, key: SegmentKey) -> Option<&SegmentFeature> {
        self.highlighted_segments.get(&key)
    }

    /// True when no paths and no highlights are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.highlighted_segments.is_empty()
            && self.highlighted_lines.is_empty()
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }
}
