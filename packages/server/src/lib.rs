#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web JSON service for the neighborhood explorer.
//!
//! Exposes the geo-fit, chart, and radar engines over HTTP so the
//! frontend (served from the same origin) can call them, and resolves
//! planning areas through the backend API.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use sg_explorer_api::ExplorerApi;

/// Planning-area edition requested when a call does not name one.
pub const DEFAULT_PLANNING_AREA_YEAR: u16 = 2019;

/// Shared application state.
pub struct AppState {
    /// Backend used for planning-area geometry.
    pub api: Arc<dyn ExplorerApi>,
    /// Planning-area edition used when a request omits `year`.
    pub default_year: u16,
}

impl AppState {
    /// State using `api` and [`DEFAULT_PLANNING_AREA_YEAR`].
    #[must_use]
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self {
            api,
            default_year: DEFAULT_PLANNING_AREA_YEAR,
        }
    }
}

/// Where the server listens and what it serves statically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: String,
    /// Port.
    pub port: u16,
    /// Frontend build directory served at `/`.
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, and `STATIC_DIR`, defaulting to
    /// `127.0.0.1:8080` and `app/dist`.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let static_dir =
            std::env::var("STATIC_DIR").map_or_else(|_| PathBuf::from("app/dist"), PathBuf::from);

        Self {
            bind_addr,
            port,
            static_dir,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/fit", web::post().to(handlers::fit))
            .route("/series", web::post().to(handlers::series))
            .route("/radar", web::post().to(handlers::radar))
            .route(
                "/planning-areas/lookup",
                web::get().to(handlers::planning_area_lookup),
            )
            .route(
                "/planning-areas/{name}/fit",
                web::get().to(handlers::planning_area_fit),
            ),
    );
}

/// Starts the explorer JSON service.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState, config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(state);
    let static_dir = config.static_dir.exists().then_some(config.static_dir);
    if static_dir.is_none() {
        log::warn!("No frontend build found, serving the API only");
    }

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure);

        // Serve frontend static files (production)
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
