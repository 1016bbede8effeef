#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web JSON service for the neighborhood explorer.
//!
//! Reads the backend location from `SG_EXPLORER_API_URL` and the listen
//! address from `BIND_ADDR` / `PORT`.

use std::sync::Arc;

use sg_explorer_api::{ApiConfig, HttpExplorerApi};
use sg_explorer_server::{AppState, ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let api = HttpExplorerApi::new(&ApiConfig::from_env()).map_err(std::io::Error::other)?;

    run_server(AppState::new(Arc::new(api)), ServerConfig::from_env()).await
}
