#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the explorer backend.
//!
//! The backend owns all of this data; the explorer only reads it. Field
//! names follow the backend's `snake_case` JSON but also accept
//! `camelCase`, since the search and shortlist endpoints have shipped
//! both at different times.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sg_explorer_trend_models::TrendPoint;
use strum_macros::{AsRefStr, Display, EnumString};

/// A residential location returned by search and shortlist endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Backend identifier.
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: String,
    /// Street name.
    #[serde(default)]
    pub street: String,
    /// Planning area name.
    #[serde(default)]
    pub area: String,
    /// Postal district.
    #[serde(default)]
    pub district: Option<String>,
    /// Human-readable price band (e.g. `"$800K - $1.2M"`).
    #[serde(default, alias = "priceRange")]
    pub price_range: Option<String>,
    /// Average transacted price.
    #[serde(default, alias = "avgPrice")]
    pub avg_price: Option<f64>,
    /// Year-on-year price growth, in percent.
    #[serde(default)]
    pub growth: Option<f64>,
    /// Facility tags (`"mrt"`, `"school"`, ...).
    #[serde(default)]
    pub facilities: Vec<String>,
    /// Transit access score, 0-100.
    #[serde(default, alias = "transitScore")]
    pub transit_score: Option<f64>,
    /// Amenity density score, 0-100.
    #[serde(default, alias = "amenityScore", alias = "amenitiesScore")]
    pub amenity_score: Option<f64>,
    /// School access score, 0-100.
    #[serde(default, alias = "schoolScore")]
    pub school_score: Option<f64>,
}

impl Location {
    /// Name used to address this location in `/details/{name}/...`
    /// routes: the street when present, otherwise the area.
    #[must_use]
    pub fn detail_key(&self) -> &str {
        if self.street.trim().is_empty() {
            &self.area
        } else {
            &self.street
        }
    }

    /// Label shown in legends.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.street.trim(), self.area.trim()) {
            ("", area) => area.to_string(),
            (street, "") => street.to_string(),
            (street, area) => format!("{street}, {area}"),
        }
    }
}

/// The backend emits ids as either numbers or strings.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Per-category suitability scores in `0..=1`, keyed as the backend
/// sends them.
///
/// Accepts a flat object (`{"Affordability": 0.5}`) or one nested under
/// `"scores"` or `"breakdown"`. Non-numeric entries are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct Breakdown(pub BTreeMap<String, f64>);

impl Breakdown {
    /// Score for `key`, ignoring case and `_`/`-`/space separators.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        let wanted = normalize_key(key);
        self.0
            .iter()
            .find(|(k, _)| normalize_key(k) == wanted)
            .map(|(_, v)| *v)
    }

    /// Whether no scores were present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Value> for Breakdown {
    fn from(value: serde_json::Value) -> Self {
        let object = ["scores", "breakdown"]
            .iter()
            .find_map(|k| value.get(*k).and_then(serde_json::Value::as_object))
            .or_else(|| value.as_object());

        let scores = object
            .map(|o| {
                o.iter()
                    .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
                    .collect()
            })
            .unwrap_or_default();

        Self(scores)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// `GET /details/{id}/price-trend` response: either `{ "points": [...] }`
/// or a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceTrendResponse {
    /// Wrapped form.
    Wrapped {
        /// Monthly points.
        points: Vec<TrendPoint>,
    },
    /// Bare array form.
    Bare(Vec<TrendPoint>),
}

impl PriceTrendResponse {
    /// The points regardless of envelope.
    #[must_use]
    pub fn into_points(self) -> Vec<TrendPoint> {
        match self {
            Self::Wrapped { points } | Self::Bare(points) => points,
        }
    }
}

/// A facility near a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Facility name.
    pub name: String,
    /// Latitude.
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude.
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
}

/// `GET /details/{name}/facilities-locations` response, keyed by
/// facility type.
pub type FacilityLocations = BTreeMap<String, Vec<Facility>>;

/// `POST /search/filter` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Free-text query matched against street and area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Planning areas to include.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<String>,
    /// Postal districts to include.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub districts: Vec<String>,
    /// Lower price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    /// Upper price bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Facility tags every result must have.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facilities: Vec<String>,
}

/// `POST /search/filter` response. Some deployments wrap the list in
/// `{ "results": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    /// Wrapped form.
    Wrapped {
        /// Matching locations.
        results: Vec<Location>,
    },
    /// Bare array form.
    Bare(Vec<Location>),
}

impl SearchResponse {
    /// The locations regardless of envelope.
    #[must_use]
    pub fn into_locations(self) -> Vec<Location> {
        match self {
            Self::Wrapped { results } | Self::Bare(results) => results,
        }
    }
}

/// One ranked preference category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Category name (e.g. `"Affordability"`).
    pub category: String,
    /// 1-based rank.
    pub rank: u32,
}

/// `POST /ranks` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRequest {
    /// Categories in preference order.
    pub ranks: Vec<RankEntry>,
}

/// `POST /shortlist/saved-locations` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveLocationRequest {
    /// Location to bookmark.
    pub location_id: String,
}

/// Export format for `GET /settings/export/{format}`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// JSON document.
    Json,
    /// CSV table.
    Csv,
}
