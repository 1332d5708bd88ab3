//! Transit Overlay Library - Spatial Selection and Overlay State
//!
//! This library is the core of a transit path visualization tool: it
//! identifies the line segment nearest to a map click, materializes it as an
//! independent highlighted overlay, and keeps a consistent, removable,
//! exportable set of such overlays across multiple named path layers.
//!
//! # Architecture
//!
//! - **[`Path`] / [`PathFeature`] / [`PathGeometry`]**: GeoJSON-backed data
//!   model for fetched path feature collections
//! - **[`SegmentSelector`]**: pure nearest-segment search in projected space
//! - **[`PathRegistry`]**: owned overlay state, driven by typed events and
//!   signaling a [`RenderSurface`] collaborator
//! - **[`SpeedComparison`]**: per-segment aggregation for the grouped bar
//!   comparison chart
//!
//! Rendering, tile serving, data transport and image export are external
//! collaborators; this crate only defines the contracts they consume.

mod chart;
mod feature;
mod registry;
mod selector;
pub mod utils;

// Public API exports
pub use chart::{SpeedComparison, SpeedRecord};
pub use feature::{Path, PathFeature, PathGeometry, SegmentFeature};
pub use registry::{
    DrawOrder, NoopSurface, OverlayId, OverlayStyle, PathRegistry, RenderSurface, SegmentKey,
};
pub use selector::{Identity, NearestSegment, Projection, SegmentSelector, WebMercator};

/// Key of a highlighted overlay, for error reporting across the two
/// highlight namespaces
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayKey {
    /// Auto-assigned key of a highlighted segment
    Segment(SegmentKey),
    /// Caller-supplied name of a highlighted line
    Line(String),
}

impl std::fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayKey::Segment(key) => write!(f, "segment {key}"),
            OverlayKey::Line(name) => write!(f, "line {name:?}"),
        }
    }
}

/// Error types for overlay selection and registry operations
///
/// All failures are local, synchronous and recoverable: the registry stays
/// in its prior valid state after any failed operation.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("no path named {0:?}")]
    PathNotFound(String),

    #[error("no highlighted overlay for {0}")]
    KeyNotFound(OverlayKey),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
