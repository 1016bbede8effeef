#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planning-area geometry for the map view.
//!
//! Parses the OneMap planning-area layer, computes the center and zoom
//! that frame a clicked area inside the current viewport, and resolves
//! a clicked point back to the area that contains it.

pub mod fit;
pub mod index;
pub mod planning_area;

pub use fit::{
    DEFAULT_FILL_FRACTION, bounds_of, centroid, centroid_or_default, compute_centroid_and_zoom,
    zoom_for_bounds,
};
pub use index::PlanningAreaIndex;
pub use planning_area::{find_area, parse_planning_areas, planning_areas_from_value};

use thiserror::Error;

/// Errors that can occur while ingesting planning-area geometry.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// The payload could not be decoded as `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The payload was valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}
