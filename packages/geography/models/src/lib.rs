#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, bounding box, and viewport types for planning-area fitting.
//!
//! Everything inside the explorer works in `[lat, lng]` order. `GeoJSON`
//! and `geo` both store `[lng, lat]` (x = longitude), so the only way in
//! from those formats is through [`LatLng::from_lng_lat`] or the
//! [`From<geo::Coord<f64>>`] impl. No call site should index into a raw
//! coordinate pair.

use serde::{Deserialize, Serialize};

/// Default map center (central Singapore), used whenever a polygon is
/// missing or empty.
pub const SINGAPORE_CENTER: LatLng = LatLng {
    lat: 1.3521,
    lng: 103.8198,
};

/// Smallest longitude span used in zoom math. Keeps single-point and
/// vertical-line polygons from dividing by zero.
pub const MIN_LNG_DELTA: f64 = 1e-5;

/// A geographic coordinate in `[lat, lng]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate from a `GeoJSON`-ordered `[lng, lat]` pair.
    #[must_use]
    pub const fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns the coordinate as a `[lat, lng]` array.
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl From<geo::Coord<f64>> for LatLng {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::from_lng_lat(coord.x, coord.y)
    }
}

impl From<LatLng> for geo::Coord<f64> {
    fn from(value: LatLng) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

/// Axis-aligned bounds of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub lat_min: f64,
    /// Northern latitude boundary.
    pub lat_max: f64,
    /// Western longitude boundary.
    pub lng_min: f64,
    /// Eastern longitude boundary.
    pub lng_max: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given extents.
    #[must_use]
    pub const fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    /// Longitude span, floored at [`MIN_LNG_DELTA`].
    #[must_use]
    pub fn lng_delta(&self) -> f64 {
        (self.lng_max - self.lng_min).max(MIN_LNG_DELTA)
    }

    /// Raw latitude span (may be zero).
    #[must_use]
    pub fn lat_delta(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            f64::midpoint(self.lat_min, self.lat_max),
            f64::midpoint(self.lng_min, self.lng_max),
        )
    }
}

/// Size of the map container in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
}

impl ViewportSize {
    /// Creates a viewport of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Integer zoom bounds plus the zoom to use when there is nothing to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    /// Lowest zoom the fit may return.
    pub min: u8,
    /// Highest zoom the fit may return.
    pub max: u8,
    /// Zoom returned for empty input.
    pub fallback: u8,
}

impl ZoomRange {
    /// Range used for general map navigation.
    pub const GENERAL: Self = Self {
        min: 2,
        max: 18,
        fallback: 13,
    };

    /// Range used when the map is zoomed in on a single selected area.
    pub const SELECTED_AREA: Self = Self {
        min: 12,
        max: 18,
        fallback: 14,
    };

    /// Clamps `zoom` into `[min, max]`.
    #[must_use]
    pub fn clamp(&self, zoom: f64) -> u8 {
        if zoom.is_nan() {
            return self.fallback;
        }
        let clamped = zoom.clamp(f64::from(self.min), f64::from(self.max));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let zoom = clamped as u8;
        zoom
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::GENERAL
    }
}

/// Center and zoom that fit a polygon inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Map center.
    pub center: LatLng,
    /// Integer tile zoom level.
    pub zoom: u8,
}

/// Everything needed to fit one polygon. `fill_fraction` and `range`
/// default to the general-navigation values when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomRequest {
    /// Polygon vertices.
    pub coords: Vec<LatLng>,
    /// Map container size.
    pub viewport: ViewportSize,
    /// Share of the padded viewport the polygon should fill.
    #[serde(default = "default_fill_fraction")]
    pub fill_fraction: f64,
    /// Allowed zoom range.
    #[serde(default)]
    pub range: ZoomRange,
}

const fn default_fill_fraction() -> f64 {
    0.8
}

/// A named planning area with its outer ring in `[lat, lng]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningArea {
    /// Planning area name as published by URA (e.g. `"BEDOK"`).
    pub name: String,
    /// Outer ring of the first polygon.
    pub ring: Vec<LatLng>,
}
