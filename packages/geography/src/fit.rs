//! Center and zoom fitting for planning-area polygons.
//!
//! Zoom levels follow the standard slippy-map tile pyramid: at zoom `z`
//! the world is `256 · 2^z` pixels wide, so the zoom that makes a span
//! fill `n` pixels is `log2(n · world_span / (256 · span))`. Longitude is
//! linear in that projection; latitude goes through the Web-Mercator `y`
//! transform first. The smaller of the two zooms wins so the polygon fits
//! on the more constraining axis.

use std::f64::consts::{FRAC_PI_4, PI};

use sg_explorer_geography_models::{
    BoundingBox, FitResult, LatLng, SINGAPORE_CENTER, ViewportSize, ZoomRange,
};

/// Pixel width of one map tile.
pub const TILE_SIZE: f64 = 256.0;

/// Fixed padding kept clear on every side of the viewport.
pub const VIEWPORT_PADDING: f64 = 32.0;

/// Fill fraction used when the caller has no preference.
pub const DEFAULT_FILL_FRACTION: f64 = 0.8;

/// Smallest Mercator `y` span used in zoom math.
const MIN_MERCATOR_DELTA: f64 = 1e-8;

const MIN_FILL_FRACTION: f64 = 0.5;
const MAX_FILL_FRACTION: f64 = 0.95;

/// Computes min/max per axis.
///
/// Returns `None` for an empty coordinate list.
#[must_use]
pub fn bounds_of(coords: &[LatLng]) -> Option<BoundingBox> {
    let first = coords.first()?;
    let init = BoundingBox::new(first.lat, first.lat, first.lng, first.lng);

    Some(coords.iter().skip(1).fold(init, |bbox, c| {
        BoundingBox::new(
            bbox.lat_min.min(c.lat),
            bbox.lat_max.max(c.lat),
            bbox.lng_min.min(c.lng),
            bbox.lng_max.max(c.lng),
        )
    }))
}

/// Midpoint of the bounding box of `coords`.
///
/// Not the area-weighted polygon centroid: the map only needs a point
/// that centers the polygon's extent.
#[must_use]
pub fn centroid(coords: &[LatLng]) -> Option<LatLng> {
    bounds_of(coords).map(|bbox| bbox.center())
}

/// [`centroid`], substituting [`SINGAPORE_CENTER`] for empty input.
#[must_use]
pub fn centroid_or_default(coords: &[LatLng]) -> LatLng {
    centroid(coords).unwrap_or(SINGAPORE_CENTER)
}

/// Web-Mercator `y` for a latitude in degrees.
#[must_use]
pub fn mercator_y(lat_deg: f64) -> f64 {
    (FRAC_PI_4 + lat_deg.to_radians() / 2.0).tan().ln()
}

/// Clamps a caller-supplied fill fraction into the supported range.
#[must_use]
pub fn clamp_fill_fraction(fill_fraction: f64) -> f64 {
    if fill_fraction.is_nan() {
        return DEFAULT_FILL_FRACTION;
    }
    fill_fraction.clamp(MIN_FILL_FRACTION, MAX_FILL_FRACTION)
}

/// Integer zoom at which `coords` fills `fill_fraction` of the padded
/// viewport.
///
/// Empty input returns `range.fallback`.
#[must_use]
pub fn zoom_for_bounds(
    coords: &[LatLng],
    viewport: ViewportSize,
    fill_fraction: f64,
    range: ZoomRange,
) -> u8 {
    let Some(bbox) = bounds_of(coords) else {
        log::debug!("zoom_for_bounds called with no coordinates, using fallback zoom");
        return range.fallback;
    };

    zoom_for_bbox(&bbox, viewport, fill_fraction, range)
}

/// Same as [`zoom_for_bounds`] for an already computed bounding box.
///
/// The clamped fill fraction scales the padded width and height once.
/// It is not applied again to the box extent or to the resulting zoom.
#[must_use]
pub fn zoom_for_bbox(
    bbox: &BoundingBox,
    viewport: ViewportSize,
    fill_fraction: f64,
    range: ZoomRange,
) -> u8 {
    let frac = clamp_fill_fraction(fill_fraction);
    let available_w = (viewport.width - 2.0 * VIEWPORT_PADDING).max(1.0);
    let available_h = (viewport.height - 2.0 * VIEWPORT_PADDING).max(1.0);

    let lng_delta = bbox.lng_delta();
    let zoom_lng = (360.0 * available_w * frac / (TILE_SIZE * lng_delta)).log2();

    let merc_delta = (mercator_y(bbox.lat_max) - mercator_y(bbox.lat_min))
        .abs()
        .max(MIN_MERCATOR_DELTA);
    let zoom_lat = (2.0 * PI * available_h * frac / (TILE_SIZE * merc_delta)).log2();

    range.clamp(zoom_lng.min(zoom_lat).round())
}

/// Center and zoom for a polygon, the operation the map calls when a
/// planning area is clicked.
#[must_use]
pub fn compute_centroid_and_zoom(
    coords: &[LatLng],
    viewport: ViewportSize,
    fill_fraction: f64,
    range: ZoomRange,
) -> FitResult {
    FitResult {
        center: centroid_or_default(coords),
        zoom: zoom_for_bounds(coords, viewport, fill_fraction, range),
    }
}
