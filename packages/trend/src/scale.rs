//! Value-to-pixel mapping and pointer hit testing.

use sg_explorer_trend_models::{AxisTick, ChartLayout};

/// A pointer position relative to the chart container's left edge.
///
/// Mouse and touch input resolve to the same hover index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Mouse move.
    Mouse {
        /// Offset from the container's left edge.
        x: f64,
    },
    /// Touch start or move.
    Touch {
        /// Offset of the first touch point from the container's left edge.
        x: f64,
    },
}

impl PointerInput {
    /// Horizontal offset regardless of input kind.
    #[must_use]
    pub const fn x(self) -> f64 {
        match self {
            Self::Mouse { x } | Self::Touch { x } => x,
        }
    }
}

/// Number of y-axis ticks, including both ends.
pub const Y_TICK_COUNT: usize = 5;

/// Fraction of the value span added above and below the data.
const Y_PADDING_FRACTION: f64 = 0.1;

/// Horizontal pixel position of month `index` out of `month_count`.
///
/// Months are spread evenly across the plot area. A single month sits
/// in the middle.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scale_x(index: usize, month_count: usize, layout: &ChartLayout) -> f64 {
    let left = layout.padding.left;
    let plot_width = layout.plot_width();
    if month_count <= 1 {
        return left + plot_width / 2.0;
    }
    left + (index as f64 / (month_count - 1) as f64) * plot_width
}

/// Vertical pixel position of `value` on an axis from `min` to `max`.
///
/// Larger values sit higher (smaller y). A flat axis maps everything to
/// the vertical middle.
#[must_use]
pub fn scale_y(value: f64, min: f64, max: f64, layout: &ChartLayout) -> f64 {
    let top = layout.padding.top;
    let plot_height = layout.plot_height();
    let span = max - min;
    if span.abs() < f64::EPSILON || !span.is_finite() {
        return top + plot_height / 2.0;
    }
    top + (1.0 - (value - min) / span) * plot_height
}

/// Y-axis bounds for a set of values, padded so lines do not touch the
/// plot edges.
///
/// Returns `(0.0, 1.0)` when there are no finite values. A flat series
/// is padded by 10% of its value. The lower bound never drops below zero
/// for non-negative data.
#[must_use]
pub fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * Y_PADDING_FRACTION
    } else if max.abs() > 0.0 {
        max.abs() * Y_PADDING_FRACTION
    } else {
        1.0
    };

    let lower = if min >= 0.0 { (min - pad).max(0.0) } else { min - pad };
    (lower, max + pad)
}

/// Evenly spaced y-axis ticks from `min` (bottom) to `max` (top).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn y_ticks(min: f64, max: f64, layout: &ChartLayout) -> Vec<AxisTick> {
    (0..Y_TICK_COUNT)
        .map(|i| {
            let value = min + (max - min) * (i as f64 / (Y_TICK_COUNT - 1) as f64);
            AxisTick {
                position: scale_y(value, min, max, layout),
                label: format_price(value),
            }
        })
        .collect()
}

/// Month index under a pointer at `pointer_x` within a container of
/// `container_width` pixels.
///
/// Returns `None` when there are no months. Positions outside the
/// container clamp to the first or last month.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn hover_index_from_pointer_x(
    pointer_x: f64,
    container_width: f64,
    month_count: usize,
) -> Option<usize> {
    if month_count == 0 {
        return None;
    }
    if container_width <= 0.0 || !pointer_x.is_finite() {
        return Some(0);
    }

    let last = (month_count - 1) as f64;
    let raw = (pointer_x / container_width * last).round();
    Some(raw.clamp(0.0, last) as usize)
}

/// [`hover_index_from_pointer_x`] for any pointer kind.
#[must_use]
pub fn hover_index(input: PointerInput, container_width: f64, month_count: usize) -> Option<usize> {
    hover_index_from_pointer_x(input.x(), container_width, month_count)
}

/// Compact price label: `$1.25M`, `$850K`, `$920`.
#[must_use]
pub fn format_price(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}${:.2}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}${:.0}K", abs / 1_000.0)
    } else {
        format!("{sign}${abs:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ChartLayout {
        ChartLayout::new(640.0, 320.0)
    }

    #[test]
    fn scale_x_spans_plot_area() {
        let l = layout();
        assert!((scale_x(0, 5, &l) - 56.0).abs() < 1e-9);
        assert!((scale_x(4, 5, &l) - (640.0 - 16.0)).abs() < 1e-9);
        assert!((scale_x(2, 5, &l) - (56.0 + 284.0)).abs() < 1e-9);
    }

    #[test]
    fn scale_x_centers_single_month() {
        let l = layout();
        assert!((scale_x(0, 1, &l) - (56.0 + 284.0)).abs() < 1e-9);
        assert!((scale_x(0, 0, &l) - (56.0 + 284.0)).abs() < 1e-9);
    }

    #[test]
    fn scale_y_is_inverted() {
        let l = layout();
        let top = scale_y(200.0, 100.0, 200.0, &l);
        let bottom = scale_y(100.0, 100.0, 200.0, &l);
        assert!((top - 16.0).abs() < 1e-9);
        assert!((bottom - (320.0 - 32.0)).abs() < 1e-9);
        assert!(scale_y(150.0, 100.0, 200.0, &l) < bottom);
    }

    #[test]
    fn scale_y_flat_axis_is_finite() {
        let l = layout();
        let y = scale_y(5.0, 5.0, 5.0, &l);
        assert!(y.is_finite());
        assert!((y - (16.0 + 136.0)).abs() < 1e-9);
    }

    #[test]
    fn value_range_pads_and_floors_at_zero() {
        let (lo, hi) = value_range([1000.0, 2000.0]);
        assert!((lo - 900.0).abs() < 1e-9);
        assert!((hi - 2100.0).abs() < 1e-9);

        let (lo, _) = value_range([10.0, 1000.0]);
        assert!(lo.abs() < f64::EPSILON);
    }

    #[test]
    fn value_range_handles_flat_and_empty() {
        let (lo, hi) = value_range([500.0, 500.0]);
        assert!((lo - 450.0).abs() < 1e-9);
        assert!((hi - 550.0).abs() < 1e-9);
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(value_range([f64::NAN]), (0.0, 1.0));
        let (lo, hi) = value_range([0.0]);
        assert!(lo.abs() < f64::EPSILON && (hi - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hover_index_rounds_and_clamps() {
        assert_eq!(hover_index_from_pointer_x(0.0, 600.0, 13), Some(0));
        assert_eq!(hover_index_from_pointer_x(600.0, 600.0, 13), Some(12));
        assert_eq!(hover_index_from_pointer_x(290.0, 600.0, 13), Some(6));
        assert_eq!(hover_index_from_pointer_x(-50.0, 600.0, 13), Some(0));
        assert_eq!(hover_index_from_pointer_x(9000.0, 600.0, 13), Some(12));
    }

    #[test]
    fn hover_index_degenerate_inputs() {
        assert_eq!(hover_index_from_pointer_x(10.0, 600.0, 0), None);
        assert_eq!(hover_index_from_pointer_x(10.0, 0.0, 4), Some(0));
        assert_eq!(hover_index_from_pointer_x(f64::NAN, 600.0, 4), Some(0));
        assert_eq!(hover_index_from_pointer_x(300.0, 600.0, 1), Some(0));
    }

    #[test]
    fn mouse_and_touch_resolve_identically() {
        let mouse = hover_index(PointerInput::Mouse { x: 410.0 }, 600.0, 7);
        let touch = hover_index(PointerInput::Touch { x: 410.0 }, 600.0, 7);
        assert_eq!(mouse, touch);
        assert_eq!(mouse, Some(4));
    }

    #[test]
    fn y_ticks_run_bottom_to_top() {
        let ticks = y_ticks(0.0, 1_000_000.0, &layout());
        assert_eq!(ticks.len(), Y_TICK_COUNT);
        assert_eq!(ticks[0].label, "$0");
        assert_eq!(ticks[4].label, "$1.00M");
        assert!(ticks[0].position > ticks[4].position);
    }

    #[test]
    fn formats_prices() {
        assert_eq!(format_price(1_250_000.0), "$1.25M");
        assert_eq!(format_price(850_400.0), "$850K");
        assert_eq!(format_price(920.0), "$920");
        assert_eq!(format_price(-2_000.0), "-$2K");
    }
}
