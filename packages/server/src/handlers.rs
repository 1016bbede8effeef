//! HTTP handler functions for the explorer API.

use actix_web::{HttpResponse, web};
use sg_explorer_geography::{
    DEFAULT_FILL_FRACTION, PlanningAreaIndex, compute_centroid_and_zoom, find_area,
};
use sg_explorer_geography_models::{LatLng, ViewportSize, ZoomRange, ZoomRequest};
use sg_explorer_radar::{ComparedSetStats, radar_score_set};
use sg_explorer_radar_models::RadarLabel;
use sg_explorer_server_models::{
    ApiHealth, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH, PlanningAreaFit, PlanningAreaFitParams, PlanningAreaLookup,
    PlanningAreaLookupParams, PointerKind, RadarRequest, RadarResponse, SeriesRequest,
    SeriesResponse,
};
use sg_explorer_trend::{
    PointerInput, hover_index, merge_and_scale_series, render_svg, tooltip_at,
};
use sg_explorer_trend_models::ChartLayout;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/fit`
///
/// Center and zoom for an arbitrary polygon.
pub async fn fit(body: web::Json<ZoomRequest>) -> HttpResponse {
    let req = body.into_inner();
    HttpResponse::Ok().json(compute_centroid_and_zoom(
        &req.coords,
        req.viewport,
        req.fill_fraction,
        req.range,
    ))
}

/// `POST /api/series`
///
/// Merges and scales price series, resolving the hovered month from a
/// pointer position when one is given.
pub async fn series(body: web::Json<SeriesRequest>) -> HttpResponse {
    let req = body.into_inner();
    let layout = ChartLayout::new(
        req.width.unwrap_or(DEFAULT_CHART_WIDTH),
        req.height.unwrap_or(DEFAULT_CHART_HEIGHT),
    );
    let chart = merge_and_scale_series(&req.series, layout);

    let hover = match req.pointer {
        Some(pointer) => {
            let input = match pointer.kind {
                PointerKind::Mouse => PointerInput::Mouse { x: pointer.x },
                PointerKind::Touch => PointerInput::Touch { x: pointer.x },
            };
            hover_index(input, layout.width, chart.months.len())
        }
        None => req.hover,
    };

    let tooltip = hover.and_then(|index| tooltip_at(&chart, index));
    let svg = req.svg.then(|| render_svg(&chart, hover));

    HttpResponse::Ok().json(SeriesResponse {
        chart,
        hover,
        tooltip,
        svg,
    })
}

/// `POST /api/radar`
///
/// Radar scores for a compared set.
pub async fn radar(body: web::Json<RadarRequest>) -> HttpResponse {
    let req = body.into_inner();
    let stats = ComparedSetStats::from_locations(&req.locations);

    let scores = req
        .locations
        .iter()
        .map(|location| radar_score_set(location, req.breakdowns.get(&location.id), &stats))
        .collect();

    HttpResponse::Ok().json(RadarResponse {
        labels: RadarLabel::ALL.to_vec(),
        scores,
    })
}

/// `GET /api/planning-areas/{name}/fit`
///
/// Fits the named planning area with the selected-area zoom range.
pub async fn planning_area_fit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PlanningAreaFitParams>,
) -> HttpResponse {
    let name = path.into_inner();
    let year = params.year.unwrap_or(state.default_year);

    let areas = match state.api.planning_areas(year).await {
        Ok(areas) => areas,
        Err(e) => {
            log::error!("Failed to load planning areas for {year}: {e}");
            return HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Failed to load planning areas"
            }));
        }
    };

    let Some(area) = find_area(&areas, &name) else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Unknown planning area: {name}")
        }));
    };

    let viewport = ViewportSize::new(
        params.width.unwrap_or(DEFAULT_VIEWPORT_WIDTH),
        params.height.unwrap_or(DEFAULT_VIEWPORT_HEIGHT),
    );

    HttpResponse::Ok().json(PlanningAreaFit {
        name: area.name.clone(),
        fit: compute_centroid_and_zoom(
            &area.ring,
            viewport,
            DEFAULT_FILL_FRACTION,
            ZoomRange::SELECTED_AREA,
        ),
    })
}

/// `GET /api/planning-areas/lookup`
///
/// Name of the planning area containing a clicked point.
pub async fn planning_area_lookup(
    state: web::Data<AppState>,
    params: web::Query<PlanningAreaLookupParams>,
) -> HttpResponse {
    let year = params.year.unwrap_or(state.default_year);

    match state.api.planning_areas(year).await {
        Ok(areas) => {
            let index = PlanningAreaIndex::new(&areas);
            let name = index
                .lookup(LatLng::new(params.lat, params.lng))
                .map(ToString::to_string);
            HttpResponse::Ok().json(PlanningAreaLookup { name })
        }
        Err(e) => {
            log::error!("Failed to load planning areas for {year}: {e}");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Failed to load planning areas"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use sg_explorer_api::{ApiError, ExplorerApi};
    use sg_explorer_api_models::{
        Breakdown, ExportFormat, FacilityLocations, Location, RankRequest, SearchFilter,
    };
    use sg_explorer_geography_models::{FitResult, LatLng, PlanningArea};
    use sg_explorer_server_models::{ApiHealth, PlanningAreaLookup, RadarResponse, SeriesResponse};
    use sg_explorer_trend_models::TrendPoint;

    use crate::{AppState, configure};

    struct StubApi {
        areas: Option<Vec<PlanningArea>>,
    }

    #[async_trait]
    impl ExplorerApi for StubApi {
        async fn planning_areas(&self, _year: u16) -> Result<Vec<PlanningArea>, ApiError> {
            self.areas.clone().ok_or_else(|| ApiError::Status {
                status: 500,
                url: "http://backend/onemap/planning-areas".to_string(),
            })
        }

        async fn price_trend(&self, _location_id: &str) -> Result<Vec<TrendPoint>, ApiError> {
            Ok(Vec::new())
        }

        async fn breakdown(&self, _name: &str) -> Result<Breakdown, ApiError> {
            Ok(Breakdown::default())
        }

        async fn facility_locations(
            &self,
            _name: &str,
            _types: &[String],
        ) -> Result<FacilityLocations, ApiError> {
            Ok(FacilityLocations::new())
        }

        async fn search(&self, _filter: &SearchFilter) -> Result<Vec<Location>, ApiError> {
            Ok(Vec::new())
        }

        async fn save_ranks(&self, _ranks: &RankRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn reset_ranks(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn saved_locations(&self) -> Result<Vec<Location>, ApiError> {
            Ok(Vec::new())
        }

        async fn save_location(&self, _location_id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_saved_location(&self, _location_id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn import_settings(&self, _payload: &serde_json::Value) -> Result<(), ApiError> {
            Ok(())
        }

        async fn export_settings(&self, _format: ExportFormat) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    fn bedok() -> PlanningArea {
        PlanningArea {
            name: "BEDOK".to_string(),
            ring: vec![
                LatLng::new(1.31, 103.90),
                LatLng::new(1.31, 103.95),
                LatLng::new(1.35, 103.95),
                LatLng::new(1.35, 103.90),
                LatLng::new(1.31, 103.90),
            ],
        }
    }

    fn state(areas: Option<Vec<PlanningArea>>) -> actix_web::web::Data<AppState> {
        actix_web::web::Data::new(AppState::new(Arc::new(StubApi { areas })))
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(body.healthy);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn fit_uses_request_range() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/fit")
            .set_json(serde_json::json!({
                "coords": [],
                "viewport": {"width": 800, "height": 600},
                "range": {"min": 12, "max": 18, "fallback": 14}
            }))
            .to_request();
        let body: FitResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.zoom, 14);
        assert!((body.center.lat - 1.3521).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn series_resolves_pointer_and_renders_svg() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/series")
            .set_json(serde_json::json!({
                "series": [
                    {"label": "Bedok", "points": [
                        {"month": "2023-01", "median": 500000.0},
                        {"month": "2023-02", "median": 510000.0},
                        {"month": "2023-03", "median": 520000.0}
                    ]}
                ],
                "width": 400,
                "pointer": {"kind": "touch", "x": 390},
                "svg": true
            }))
            .to_request();
        let body: SeriesResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.hover, Some(2));
        assert_eq!(body.tooltip.unwrap().entries[0].value, Some(520_000.0));
        assert!(body.svg.unwrap().starts_with("<svg"));
    }

    #[actix_web::test]
    async fn radar_returns_five_scores_per_location() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/radar")
            .set_json(serde_json::json!({
                "locations": [
                    {"id": "1", "street": "A", "area": "Bedok", "avg_price": 400000, "growth": 1.0},
                    {"id": "2", "street": "B", "area": "Bedok", "avg_price": 800000, "growth": 3.0}
                ],
                "breakdowns": {"2": {"Affordability": 0.25}}
            }))
            .to_request();
        let body: RadarResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.labels.len(), 5);
        assert_eq!(body.scores.len(), 2);
        assert_eq!(body.scores[0].scores[0], 100);
        assert_eq!(body.scores[1].scores[0], 25);
    }

    #[actix_web::test]
    async fn fits_named_planning_area() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some(vec![bedok()])))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/planning-areas/bedok/fit?width=1024&height=768")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "BEDOK");
        let zoom = body["zoom"].as_u64().unwrap();
        assert!((12..=18).contains(&zoom));
        assert!((body["center"]["lat"].as_f64().unwrap() - 1.33).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn unknown_planning_area_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some(vec![bedok()])))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/planning-areas/atlantis/fit")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn backend_failure_is_bad_gateway() {
        let app =
            test::init_service(App::new().app_data(state(None)).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/planning-areas/bedok/fit")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn looks_up_containing_area() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some(vec![bedok()])))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/planning-areas/lookup?lat=1.33&lng=103.92")
            .to_request();
        let body: PlanningAreaLookup = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.name.as_deref(), Some("BEDOK"));

        let req = test::TestRequest::get()
            .uri("/api/planning-areas/lookup?lat=1.40&lng=103.70")
            .to_request();
        let body: PlanningAreaLookup = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.name, None);
    }
}
