#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the neighborhood explorer backend.
//!
//! Every backend call the explorer makes goes through the [`ExplorerApi`]
//! trait so the comparison session and the JSON service can be driven by
//! an in-memory implementation in tests. [`HttpExplorerApi`] is the real
//! implementation over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use sg_explorer_api_models::{
    Breakdown, ExportFormat, FacilityLocations, Location, PriceTrendResponse, RankRequest,
    SaveLocationRequest, SearchFilter, SearchResponse,
};
use sg_explorer_geography::{GeographyError, planning_areas_from_value};
use sg_explorer_geography_models::PlanningArea;
use sg_explorer_trend_models::TrendPoint;
use thiserror::Error;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "SG_EXPLORER_API_URL";

/// Environment variable holding the request timeout in seconds.
pub const API_TIMEOUT_ENV: &str = "SG_EXPLORER_API_TIMEOUT_SECS";

/// Base URL used when [`API_URL_ENV`] is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Timeout used when [`API_TIMEOUT_ENV`] is unset or invalid.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Planning-area payload was not usable geometry.
    #[error("Geography error: {0}")]
    Geography(#[from] GeographyError),

    /// Backend answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The base URL or a path built from it was invalid.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// What went wrong.
        message: String,
    },
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash requirement.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Creates a config for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads [`API_URL_ENV`] and [`API_TIMEOUT_ENV`], falling back to the
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(API_TIMEOUT_ENV).ok(),
        )
    }

    fn from_values(url: Option<String>, timeout: Option<String>) -> Self {
        let base_url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let secs = match timeout.as_deref().map(str::parse::<u64>) {
            Some(Ok(secs)) if secs > 0 => secs,
            Some(_) => {
                log::warn!("Ignoring invalid {API_TIMEOUT_ENV}, using {DEFAULT_TIMEOUT_SECS}s");
                DEFAULT_TIMEOUT_SECS
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            base_url,
            timeout: Duration::from_secs(secs),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// One method per backend endpoint the explorer uses.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// `GET /onemap/planning-areas?year={year}`.
    async fn planning_areas(&self, year: u16) -> Result<Vec<PlanningArea>, ApiError>;

    /// `GET /details/{id}/price-trend`.
    async fn price_trend(&self, location_id: &str) -> Result<Vec<TrendPoint>, ApiError>;

    /// `GET /details/{name}/breakdown`.
    async fn breakdown(&self, name: &str) -> Result<Breakdown, ApiError>;

    /// `GET /details/{name}/facilities-locations?types=...`.
    async fn facility_locations(
        &self,
        name: &str,
        types: &[String],
    ) -> Result<FacilityLocations, ApiError>;

    /// `POST /search/filter`.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Location>, ApiError>;

    /// `POST /ranks`.
    async fn save_ranks(&self, ranks: &RankRequest) -> Result<(), ApiError>;

    /// `POST /ranks/reset`.
    async fn reset_ranks(&self) -> Result<(), ApiError>;

    /// `GET /shortlist/saved-locations`.
    async fn saved_locations(&self) -> Result<Vec<Location>, ApiError>;

    /// `POST /shortlist/saved-locations`.
    async fn save_location(&self, location_id: &str) -> Result<(), ApiError>;

    /// `DELETE /shortlist/saved-locations/{id}`.
    async fn delete_saved_location(&self, location_id: &str) -> Result<(), ApiError>;

    /// `POST /settings/import`.
    async fn import_settings(&self, payload: &serde_json::Value) -> Result<(), ApiError>;

    /// `GET /settings/export/{format}`, returned as raw text.
    async fn export_settings(&self, format: ExportFormat) -> Result<String, ApiError>;
}

/// [`ExplorerApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpExplorerApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpExplorerApi {
    /// Builds a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the base URL cannot be parsed or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidUrl {
            message: format!("{}: {e}", config.base_url),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                message: format!("{} cannot be a base URL", config.base_url),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        log::info!("Explorer API client targeting {base_url}");

        Ok(Self { client, base_url })
    }

    /// Base URL requests are built from.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot take path
    /// segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        log::debug!("{method} {url}");
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let text = self.send(Method::GET, url, None).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ExplorerApi for HttpExplorerApi {
    async fn planning_areas(&self, year: u16) -> Result<Vec<PlanningArea>, ApiError> {
        let mut url = self.endpoint(&["onemap", "planning-areas"])?;
        url.query_pairs_mut()
            .append_pair("year", &year.to_string());

        let value: serde_json::Value = self.get_json(url).await?;
        let areas = planning_areas_from_value(value)?;
        log::info!("Loaded {} planning areas for {year}", areas.len());
        Ok(areas)
    }

    async fn price_trend(&self, location_id: &str) -> Result<Vec<TrendPoint>, ApiError> {
        let url = self.endpoint(&["details", location_id, "price-trend"])?;
        let resp: PriceTrendResponse = self.get_json(url).await?;
        Ok(resp.into_points())
    }

    async fn breakdown(&self, name: &str) -> Result<Breakdown, ApiError> {
        let url = self.endpoint(&["details", name, "breakdown"])?;
        self.get_json(url).await
    }

    async fn facility_locations(
        &self,
        name: &str,
        types: &[String],
    ) -> Result<FacilityLocations, ApiError> {
        let mut url = self.endpoint(&["details", name, "facilities-locations"])?;
        if !types.is_empty() {
            url.query_pairs_mut().append_pair("types", &types.join(","));
        }
        self.get_json(url).await
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Location>, ApiError> {
        let url = self.endpoint(&["search", "filter"])?;
        let body = serde_json::to_value(filter)?;
        let text = self
            .send(Method::POST, url, Some(&body))
            .await?
            .text()
            .await?;
        let resp: SearchResponse = serde_json::from_str(&text)?;
        Ok(resp.into_locations())
    }

    async fn save_ranks(&self, ranks: &RankRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["ranks"])?;
        let body = serde_json::to_value(ranks)?;
        self.send(Method::POST, url, Some(&body)).await?;
        Ok(())
    }

    async fn reset_ranks(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["ranks", "reset"])?;
        self.send(Method::POST, url, None).await?;
        Ok(())
    }

    async fn saved_locations(&self) -> Result<Vec<Location>, ApiError> {
        let url = self.endpoint(&["shortlist", "saved-locations"])?;
        self.get_json(url).await
    }

    async fn save_location(&self, location_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["shortlist", "saved-locations"])?;
        let body = serde_json::to_value(SaveLocationRequest {
            location_id: location_id.to_string(),
        })?;
        self.send(Method::POST, url, Some(&body)).await?;
        Ok(())
    }

    async fn delete_saved_location(&self, location_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["shortlist", "saved-locations", location_id])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn import_settings(&self, payload: &serde_json::Value) -> Result<(), ApiError> {
        let url = self.endpoint(&["settings", "import"])?;
        self.send(Method::POST, url, Some(payload)).await?;
        Ok(())
    }

    async fn export_settings(&self, format: ExportFormat) -> Result<String, ApiError> {
        let url = self.endpoint(&["settings", "export", format.as_ref()])?;
        Ok(self.send(Method::GET, url, None).await?.text().await?)
    }
}
