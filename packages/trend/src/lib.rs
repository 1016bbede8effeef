#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Price-trend chart engine for the comparison view.
//!
//! Each compared location's price trend is fetched independently and
//! may cover a different set of months. This crate merges them onto one
//! month axis, scales values into pixel space, resolves pointer
//! positions to a hovered month, classifies each series' trend, and
//! renders the result as SVG.

pub mod chart;
pub mod metrics;
pub mod months;
pub mod scale;
pub mod svg;

pub use chart::{merge_and_scale_series, tooltip_at};
pub use metrics::compute_trend_metrics;
pub use months::{merge_months, should_label_month, sort_points};
pub use scale::{PointerInput, hover_index, hover_index_from_pointer_x, scale_x, scale_y};
pub use svg::render_svg;
