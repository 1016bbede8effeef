#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood explorer command-line tool.
//!
//! Runs the JSON service, or drives the geo-fit, chart, and comparison
//! engines directly against the backend API from a terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sg_explorer_api::{ApiConfig, ExplorerApi, HttpExplorerApi};
use sg_explorer_api_models::ExportFormat;
use sg_explorer_compare::{ComparisonSession, LoadOutcome};
use sg_explorer_geography::{PlanningAreaIndex, compute_centroid_and_zoom, find_area};
use sg_explorer_geography_models::{LatLng, PlanningArea, ViewportSize, ZoomRange};
use sg_explorer_preferences::{
    RankList, Settings, TomlFileStore, load_rank_list, load_settings, save_rank_list,
};
use sg_explorer_server::{AppState, ServerConfig};
use sg_explorer_trend::{merge_and_scale_series, render_svg, tooltip_at};
use sg_explorer_trend_models::{ChartLayout, NamedSeries};

#[derive(Parser)]
#[command(name = "sg_explorer", about = "Singapore neighborhood explorer")]
struct Cli {
    /// Preferences file
    #[arg(long, global = true, default_value = "sg_explorer_prefs.toml")]
    prefs: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON service
    Serve,

    /// Print the center and zoom that frame a planning area
    Fit {
        /// Planning area name
        area: String,

        /// Read boundaries from a local `GeoJSON` file instead of the API
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Boundary edition (defaults to the saved setting)
        #[arg(long)]
        year: Option<u16>,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },

    /// Print the planning area containing a point
    Lookup {
        /// Latitude
        lat: f64,

        /// Longitude
        lng: f64,

        /// Read boundaries from a local `GeoJSON` file instead of the API
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Boundary edition (defaults to the saved setting)
        #[arg(long)]
        year: Option<u16>,
    },

    /// Chart the price trends of one or more locations
    Trend {
        /// Location ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Hovered month index to report a tooltip for
        #[arg(long)]
        hover: Option<usize>,

        /// Write the rendered chart to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Chart width in pixels
        #[arg(long, default_value_t = 640.0)]
        width: f64,

        /// Chart height in pixels
        #[arg(long, default_value_t = 320.0)]
        height: f64,
    },

    /// Compare saved locations side by side
    Compare {
        /// Location ids to compare (all saved locations when omitted)
        ids: Vec<String>,

        /// Write the price chart to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Show or reorder the ranked categories
    Ranks {
        /// Move the category at this position (0-based)
        #[arg(long, requires = "to")]
        from: Option<usize>,

        /// Destination position (0-based)
        #[arg(long, requires = "from")]
        to: Option<usize>,

        /// Restore the default order
        #[arg(long, conflicts_with = "from")]
        reset: bool,

        /// Send the resulting order to the backend
        #[arg(long)]
        push: bool,
    },

    /// Export the backend settings
    Export {
        /// Output format
        #[arg(long, default_value = "json")]
        format: ExportFormat,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let mut store = TomlFileStore::open(&cli.prefs)?;
    let settings = load_settings(&store);
    let api = HttpExplorerApi::new(&ApiConfig::from_env())?;

    match cli.command {
        Commands::Serve => serve(api, &settings).await?,
        Commands::Fit {
            area,
            geojson,
            year,
            width,
            height,
        } => {
            let year = year.unwrap_or(settings.planning_area_year);
            let areas = planning_areas(&api, geojson.as_deref(), year).await?;
            let found = find_area(&areas, &area)
                .ok_or_else(|| format!("Unknown planning area: {area}"))?;
            let fit = compute_centroid_and_zoom(
                &found.ring,
                ViewportSize::new(width, height),
                settings.default_zoom_fill,
                ZoomRange::SELECTED_AREA,
            );
            println!("{}", serde_json::to_string_pretty(&fit)?);
        }
        Commands::Lookup {
            lat,
            lng,
            geojson,
            year,
        } => {
            let year = year.unwrap_or(settings.planning_area_year);
            let areas = planning_areas(&api, geojson.as_deref(), year).await?;
            let index = PlanningAreaIndex::new(&areas);
            match index.lookup(LatLng::new(lat, lng)) {
                Some(name) => println!("{name}"),
                None => println!("No planning area contains ({lat}, {lng})"),
            }
        }
        Commands::Trend {
            ids,
            hover,
            svg,
            width,
            height,
        } => {
            let mut series = Vec::with_capacity(ids.len());
            for id in ids {
                let points = api.price_trend(&id).await?;
                log::info!("{id}: {} month(s)", points.len());
                series.push(NamedSeries { label: id, points });
            }

            let chart = merge_and_scale_series(&series, ChartLayout::new(width, height));
            let metrics: Vec<_> = chart
                .series
                .iter()
                .map(|s| serde_json::json!({"label": s.label, "metrics": s.metrics}))
                .collect();
            let tooltip = hover.and_then(|i| tooltip_at(&chart, i));
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "months": chart.months.len(),
                    "series": metrics,
                    "tooltip": tooltip,
                }))?
            );

            if let Some(path) = svg {
                write_svg(&path, &render_svg(&chart, hover))?;
            }
        }
        Commands::Compare { ids, svg } => {
            let mut locations = api.saved_locations().await?;
            if !ids.is_empty() {
                locations.retain(|l| ids.contains(&l.id));
            }
            if locations.is_empty() {
                return Err("No saved locations to compare".into());
            }

            let session = ComparisonSession::with_locations(locations);
            match session.load(&api).await {
                LoadOutcome::Completed { failed, .. } if failed > 0 => {
                    log::warn!("{failed} request(s) failed");
                }
                LoadOutcome::Completed { .. } => {}
                LoadOutcome::Superseded { cycle } => {
                    log::warn!("Comparison cycle {cycle} was superseded");
                }
            }

            let view = session.snapshot(ChartLayout::new(640.0, 320.0));
            println!("{}", serde_json::to_string_pretty(&view)?);

            if let Some(path) = svg {
                write_svg(&path, &render_svg(&view.chart, None))?;
            }
        }
        Commands::Ranks {
            from,
            to,
            reset,
            push,
        } => {
            let mut ranks = if reset {
                RankList::default()
            } else {
                load_rank_list(&store)
            };
            if let (Some(from), Some(to)) = (from, to) {
                ranks.move_item(from, to);
            }
            if reset || from.is_some() {
                save_rank_list(&mut store, &ranks)?;
                log::info!("Saved ranks to {}", store.path().display());
            }

            for (i, category) in ranks.categories().iter().enumerate() {
                println!("{}. {category}", i + 1);
            }

            if push {
                if reset {
                    api.reset_ranks().await?;
                } else {
                    api.save_ranks(&ranks.to_rank_request()).await?;
                }
                log::info!("Sent ranks to the backend");
            }
        }
        Commands::Export { format } => {
            println!("{}", api.export_settings(format).await?);
        }
    }

    Ok(())
}

/// Runs the JSON service on a dedicated actix system.
async fn serve(
    api: HttpExplorerApi,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::new(Arc::new(api));
    state.default_year = settings.planning_area_year;
    let config = ServerConfig::from_env();

    // actix-web's runtime is !Send, so it gets its own thread
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(sg_explorer_server::run_server(state, config))
    })
    .await??;

    Ok(())
}

async fn planning_areas(
    api: &dyn ExplorerApi,
    geojson: Option<&Path>,
    year: u16,
) -> Result<Vec<PlanningArea>, Box<dyn std::error::Error>> {
    let areas = match geojson {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            sg_explorer_geography::parse_planning_areas(&text)?
        }
        None => api.planning_areas(year).await?,
    };
    log::debug!("Loaded {} planning area(s)", areas.len());
    Ok(areas)
}

fn write_svg(path: &Path, svg: &str) -> std::io::Result<()> {
    std::fs::write(path, svg)?;
    println!("Wrote {}", path.display());
    Ok(())
}
