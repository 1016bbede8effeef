#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Price-trend series and chart geometry types.
//!
//! A [`TrendPoint`] is what the backend returns for one month of one
//! location. The chart engine merges several named series onto a shared
//! month axis ([`MonthKey`]) and produces a [`ScaledChart`] in pixel
//! space.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One month of median price data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Date-parseable month (`"2023-01"`, `"2023-01-01"`, RFC 3339).
    pub month: String,
    /// Median transacted price for the month.
    pub median: f64,
}

impl TrendPoint {
    /// Creates a point.
    #[must_use]
    pub fn new(month: impl Into<String>, median: f64) -> Self {
        Self {
            month: month.into(),
            median,
        }
    }
}

/// A price-trend series with the label it is plotted under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    /// Legend label (usually the location's street or area).
    pub label: String,
    /// Points in any order.
    pub points: Vec<TrendPoint>,
}

/// A calendar month, the unit of the chart's x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a key. Returns `None` unless `month` is `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Parses a month from the date formats the backend emits.
    ///
    /// Accepts `YYYY-MM`, `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS` and
    /// RFC 3339 timestamps.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|d| d.date())
            })?;

        Self::new(date.year(), date.month())
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, `1..=12`.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Whether the month starts a calendar quarter (Jan, Apr, Jul, Oct).
    #[must_use]
    pub const fn is_quarter_start(self) -> bool {
        (self.month - 1) % 3 == 0
    }

    /// Short axis label, e.g. `"Jan 2023"`.
    #[must_use]
    pub fn label(self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map_or_else(|| self.to_string(), |d| d.format("%b %Y").to_string())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = InvalidMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidMonthError { value })
    }
}

/// Error returned when a string is not a recognizable month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid month: {}", self.value)
    }
}

impl std::error::Error for InvalidMonthError {}

/// Sign of the recent price slope.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum TrendDirection {
    /// Average recent change above the upward threshold.
    Up,
    /// Average recent change below the downward threshold.
    Down,
    /// Neither.
    #[default]
    Stable,
}

/// Magnitude of the recent price slope relative to recent volatility.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum TrendStrength {
    /// Change exceeds 10% of the recent range.
    Strong,
    /// Change exceeds 5% of the recent range.
    Moderate,
    /// Anything smaller.
    #[default]
    Weak,
}

/// Summary of a price-trend series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetrics {
    /// Growth from first to last point, in percent.
    pub total_growth_percent: f64,
    /// Growth across the last six points, in percent.
    pub recent_growth_percent: f64,
    /// Direction of the last three points.
    pub trend_direction: TrendDirection,
    /// Strength of the last three points.
    pub trend_strength: TrendStrength,
    /// Latest median price.
    pub current_price: f64,
    /// Absolute change from first to last point.
    pub price_change: f64,
}

/// Padding around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPadding {
    /// Left padding (room for y-axis labels).
    pub left: f64,
    /// Right padding.
    pub right: f64,
    /// Top padding.
    pub top: f64,
    /// Bottom padding (room for x-axis labels).
    pub bottom: f64,
}

/// Pixel dimensions of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Total width.
    pub width: f64,
    /// Total height.
    pub height: f64,
    /// Padding around the plot area.
    pub padding: ChartPadding,
}

impl ChartLayout {
    /// Creates a layout with the default padding.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: ChartPadding {
                left: 56.0,
                right: 16.0,
                top: 16.0,
                bottom: 32.0,
            },
        }
    }

    /// Width of the plot area.
    #[must_use]
    pub fn plot_width(&self) -> f64 {
        (self.width - self.padding.left - self.padding.right).max(0.0)
    }

    /// Height of the plot area.
    #[must_use]
    pub fn plot_height(&self) -> f64 {
        (self.height - self.padding.top - self.padding.bottom).max(0.0)
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new(640.0, 320.0)
    }
}

/// A data point placed in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Horizontal pixel position.
    pub x: f64,
    /// Vertical pixel position.
    pub y: f64,
    /// Original median value.
    pub value: f64,
}

/// One series mapped onto the shared month axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledSeries {
    /// Legend label.
    pub label: String,
    /// One slot per merged month; `None` where the series has no data.
    pub points: Vec<Option<ChartPoint>>,
    /// Metrics computed from the series' own points.
    pub metrics: TrendMetrics,
}

/// A labelled axis position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Pixel position along the axis.
    pub position: f64,
    /// Display text.
    pub label: String,
}

/// All series merged and scaled into one coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledChart {
    /// Layout the chart was scaled for.
    pub layout: ChartLayout,
    /// Merged month axis, ascending.
    pub months: Vec<MonthKey>,
    /// Scaled series, in input order.
    pub series: Vec<ScaledSeries>,
    /// Bottom of the y axis.
    pub y_min: f64,
    /// Top of the y axis.
    pub y_max: f64,
    /// Y-axis ticks.
    pub y_ticks: Vec<AxisTick>,
    /// Thinned x-axis labels.
    pub x_labels: Vec<AxisTick>,
}

impl ScaledChart {
    /// Whether there is nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty() || self.series.iter().all(|s| s.points.iter().all(Option::is_none))
    }
}

/// One line in a hover tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipEntry {
    /// Series label.
    pub label: String,
    /// Value at the hovered month, `None` for a gap.
    pub value: Option<f64>,
    /// Pixel y of the value marker.
    pub y: Option<f64>,
}

/// Tooltip content for the hovered month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    /// Index into [`ScaledChart::months`].
    pub index: usize,
    /// Hovered month.
    pub month: MonthKey,
    /// Pixel x of the hover guide line.
    pub x: f64,
    /// One entry per series.
    pub entries: Vec<TooltipEntry>,
}
