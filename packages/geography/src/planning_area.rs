//! Planning-area `GeoJSON` ingestion.
//!
//! The backend proxies OneMap's planning-area layer as a `GeoJSON`
//! `FeatureCollection`. Each feature carries the area name in
//! `properties.pln_area_n` and a `Polygon` or `MultiPolygon` geometry in
//! `[lng, lat]` order. Only the outer ring of the first polygon is kept;
//! that is all the fit engine and the highlight layer need.

use geojson::GeoJson;
use sg_explorer_geography_models::{LatLng, PlanningArea};

use crate::GeographyError;

/// Property holding the planning area name.
pub const NAME_PROPERTY: &str = "pln_area_n";

/// Parses a planning-area `FeatureCollection` from its JSON text.
///
/// Features without a name or a polygonal geometry are skipped with a
/// warning.
///
/// # Errors
///
/// Returns [`GeographyError`] if the text is not valid `GeoJSON` or is
/// not a `FeatureCollection`.
pub fn parse_planning_areas(text: &str) -> Result<Vec<PlanningArea>, GeographyError> {
    let geojson: GeoJson = text.parse()?;
    planning_areas_from_geojson(geojson)
}

/// Same as [`parse_planning_areas`] for an already decoded JSON value.
///
/// # Errors
///
/// Returns [`GeographyError`] if the value is not a `FeatureCollection`.
pub fn planning_areas_from_value(
    value: serde_json::Value,
) -> Result<Vec<PlanningArea>, GeographyError> {
    let geojson = GeoJson::from_json_value(value)?;
    planning_areas_from_geojson(geojson)
}

fn planning_areas_from_geojson(geojson: GeoJson) -> Result<Vec<PlanningArea>, GeographyError> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(GeographyError::NotFeatureCollection);
    };

    let total = collection.features.len();
    let areas: Vec<PlanningArea> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let name = feature_name(&feature)?;
            let Some(geometry) = feature.geometry else {
                log::warn!("Planning area {name} has no geometry, skipping");
                return None;
            };
            let Some(ring) = outer_ring(geometry) else {
                log::warn!("Planning area {name} has no polygon ring, skipping");
                return None;
            };
            Some(PlanningArea { name, ring })
        })
        .collect();

    log::info!("Parsed {}/{total} planning areas", areas.len());

    Ok(areas)
}

fn feature_name(feature: &geojson::Feature) -> Option<String> {
    feature
        .property(NAME_PROPERTY)
        .or_else(|| feature.property(&NAME_PROPERTY.to_uppercase()))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Extracts the outer ring of the first polygon as `[lat, lng]`
/// coordinates.
fn outer_ring(geometry: geojson::Geometry) -> Option<Vec<LatLng>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    let polygon = match geo_geom {
        geo::Geometry::Polygon(p) => p,
        geo::Geometry::MultiPolygon(mp) => mp.0.into_iter().next()?,
        _ => return None,
    };

    let ring: Vec<LatLng> = polygon
        .exterior()
        .coords()
        .copied()
        .map(LatLng::from)
        .collect();

    if ring.is_empty() { None } else { Some(ring) }
}

/// Finds an area by name, ignoring case.
#[must_use]
pub fn find_area<'a>(areas: &'a [PlanningArea], name: &str) -> Option<&'a PlanningArea> {
    let name = name.trim();
    areas.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}
