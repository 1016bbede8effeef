#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the explorer JSON service.
//!
//! These wrap the core types with the extra knobs an HTTP caller needs
//! (viewport size, hover position, SVG output) and keep the wire
//! contract separate from the core crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sg_explorer_api_models::{Breakdown, Location};
use sg_explorer_geography_models::FitResult;
use sg_explorer_radar_models::{RadarLabel, RadarScoreSet};
use sg_explorer_trend_models::{NamedSeries, ScaledChart, Tooltip};
use strum_macros::{AsRefStr, Display, EnumString};

/// Chart size used when a request does not give one.
pub const DEFAULT_CHART_WIDTH: f64 = 640.0;

/// Chart height used when a request does not give one.
pub const DEFAULT_CHART_HEIGHT: f64 = 320.0;

/// Map viewport width used when a request does not give one.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;

/// Map viewport height used when a request does not give one.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}

/// Kind of pointer that produced a hover position.
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
pub enum PointerKind {
    /// Mouse move.
    Mouse,
    /// Touch start or move.
    Touch,
}

/// Pointer position over the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiPointer {
    /// Input kind.
    pub kind: PointerKind,
    /// Offset from the chart container's left edge.
    pub x: f64,
}

/// `POST /api/series` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    /// One price series per location.
    pub series: Vec<NamedSeries>,
    /// Chart width; defaults to [`DEFAULT_CHART_WIDTH`].
    #[serde(default)]
    pub width: Option<f64>,
    /// Chart height; defaults to [`DEFAULT_CHART_HEIGHT`].
    #[serde(default)]
    pub height: Option<f64>,
    /// Hovered month index. Ignored when `pointer` is given.
    #[serde(default)]
    pub hover: Option<usize>,
    /// Pointer position to resolve into a hovered month.
    #[serde(default)]
    pub pointer: Option<ApiPointer>,
    /// Whether to include rendered SVG.
    #[serde(default)]
    pub svg: bool,
}

/// `POST /api/series` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    /// Merged and scaled chart.
    pub chart: ScaledChart,
    /// Resolved hover index, if any.
    pub hover: Option<usize>,
    /// Tooltip for the hovered month.
    pub tooltip: Option<Tooltip>,
    /// Rendered chart, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

/// `POST /api/radar` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarRequest {
    /// The compared set.
    pub locations: Vec<Location>,
    /// Breakdowns keyed by location id. Locations without one use the
    /// derived fallback.
    #[serde(default)]
    pub breakdowns: BTreeMap<String, Breakdown>,
}

/// `POST /api/radar` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarResponse {
    /// Axis labels in score order.
    pub labels: Vec<RadarLabel>,
    /// One score set per requested location.
    pub scores: Vec<RadarScoreSet>,
}

/// Query for `GET /api/planning-areas/{name}/fit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningAreaFitParams {
    /// Boundary edition; the server default when omitted.
    pub year: Option<u16>,
    /// Viewport width; defaults to [`DEFAULT_VIEWPORT_WIDTH`].
    pub width: Option<f64>,
    /// Viewport height; defaults to [`DEFAULT_VIEWPORT_HEIGHT`].
    pub height: Option<f64>,
}

/// `GET /api/planning-areas/{name}/fit` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningAreaFit {
    /// Area name as published.
    pub name: String,
    /// Center and zoom.
    #[serde(flatten)]
    pub fit: FitResult,
}

/// Query for `GET /api/planning-areas/lookup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningAreaLookupParams {
    /// Boundary edition; the server default when omitted.
    pub year: Option<u16>,
    /// Latitude of the clicked point.
    pub lat: f64,
    /// Longitude of the clicked point.
    pub lng: f64,
}

/// `GET /api/planning-areas/lookup` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningAreaLookup {
    /// Containing area, if the point is inside one.
    pub name: Option<String>,
}
