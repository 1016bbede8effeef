//! Merging named series into one scaled chart and resolving tooltips.

use sg_explorer_trend_models::{
    AxisTick, ChartLayout, ChartPoint, NamedSeries, ScaledChart, ScaledSeries, Tooltip,
    TooltipEntry,
};

use crate::metrics::compute_trend_metrics;
use crate::months::{merge_months, should_label_month, values_by_month};
use crate::scale::{scale_x, scale_y, value_range, y_ticks};

/// Merges every series onto a shared month axis and maps values into
/// pixel space for `layout`.
///
/// Series keep their input order. Months a series has no data for are
/// `None` in its `points`, so the renderer draws a gap rather than a
/// drop to zero. Metrics are computed per series from its own sorted
/// points.
#[must_use]
pub fn merge_and_scale_series(series: &[NamedSeries], layout: ChartLayout) -> ScaledChart {
    let raw: Vec<Vec<_>> = series.iter().map(|s| s.points.clone()).collect();
    let months = merge_months(&raw);
    let count = months.len();

    let by_month: Vec<_> = series.iter().map(|s| values_by_month(&s.points)).collect();
    let (y_min, y_max) = value_range(by_month.iter().flat_map(|m| m.values().copied()));

    let scaled = series
        .iter()
        .zip(&by_month)
        .map(|(s, values)| {
            let points = months
                .iter()
                .enumerate()
                .map(|(i, month)| {
                    values.get(month).map(|value| ChartPoint {
                        x: scale_x(i, count, &layout),
                        y: scale_y(*value, y_min, y_max, &layout),
                        value: *value,
                    })
                })
                .collect();

            ScaledSeries {
                label: s.label.clone(),
                points,
                metrics: compute_trend_metrics(&s.points),
            }
        })
        .collect();

    let x_labels = months
        .iter()
        .enumerate()
        .filter(|(i, month)| should_label_month(*i, count, **month))
        .map(|(i, month)| AxisTick {
            position: scale_x(i, count, &layout),
            label: month.label(),
        })
        .collect();

    ScaledChart {
        layout,
        y_ticks: y_ticks(y_min, y_max, &layout),
        months,
        series: scaled,
        y_min,
        y_max,
        x_labels,
    }
}

/// Tooltip content for month `index`, or `None` when the index is out
/// of range.
#[must_use]
pub fn tooltip_at(chart: &ScaledChart, index: usize) -> Option<Tooltip> {
    let month = *chart.months.get(index)?;

    let entries = chart
        .series
        .iter()
        .map(|s| {
            let point = s.points.get(index).copied().flatten();
            TooltipEntry {
                label: s.label.clone(),
                value: point.map(|p| p.value),
                y: point.map(|p| p.y),
            }
        })
        .collect();

    Some(Tooltip {
        index,
        month,
        x: scale_x(index, chart.months.len(), &chart.layout),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_explorer_trend_models::{TrendDirection, TrendPoint};

    fn named(label: &str, points: &[(&str, f64)]) -> NamedSeries {
        NamedSeries {
            label: label.to_string(),
            points: points.iter().map(|(m, v)| TrendPoint::new(*m, *v)).collect(),
        }
    }

    fn sample() -> Vec<NamedSeries> {
        vec![
            named(
                "Bedok",
                &[("2023-01", 500_000.0), ("2023-02", 510_000.0), ("2023-03", 520_000.0)],
            ),
            named(
                "Tampines",
                &[
                    ("2023-03", 600_000.0),
                    ("2023-04", 610_000.0),
                    ("2023-05", 600_000.0),
                    ("2023-06", 620_000.0),
                ],
            ),
        ]
    }

    #[test]
    fn merges_months_and_leaves_gaps() {
        let chart = merge_and_scale_series(&sample(), ChartLayout::default());
        assert_eq!(chart.months.len(), 6);
        assert_eq!(chart.series.len(), 2);

        let bedok = &chart.series[0];
        assert_eq!(bedok.points.len(), 6);
        assert!(bedok.points[0].is_some());
        assert!(bedok.points[3].is_none());

        let tampines = &chart.series[1];
        assert!(tampines.points[0].is_none());
        assert!(tampines.points[2].is_some());
    }

    #[test]
    fn shared_axis_places_higher_prices_higher() {
        let chart = merge_and_scale_series(&sample(), ChartLayout::default());
        let bedok_mar = chart.series[0].points[2].unwrap();
        let tampines_mar = chart.series[1].points[2].unwrap();
        assert!((bedok_mar.x - tampines_mar.x).abs() < f64::EPSILON);
        assert!(tampines_mar.y < bedok_mar.y);
        assert!(chart.y_min <= 500_000.0 && chart.y_max >= 620_000.0);
    }

    #[test]
    fn computes_metrics_per_series() {
        let chart = merge_and_scale_series(&sample(), ChartLayout::default());
        let bedok = chart.series[0].metrics;
        assert!((bedok.total_growth_percent - 4.0).abs() < 1e-9);
        assert_eq!(bedok.trend_direction, TrendDirection::Up);
        assert!((bedok.current_price - 520_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn thins_x_labels() {
        let chart = merge_and_scale_series(&sample(), ChartLayout::default());
        let labels: Vec<&str> = chart.x_labels.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 2023", "Apr 2023", "Jun 2023"]);
    }

    #[test]
    fn tooltip_reports_gaps() {
        let chart = merge_and_scale_series(&sample(), ChartLayout::default());
        let tip = tooltip_at(&chart, 0).unwrap();
        assert_eq!(tip.month.to_string(), "2023-01");
        assert_eq!(tip.entries[0].value, Some(500_000.0));
        assert_eq!(tip.entries[1].value, None);
        assert!(tooltip_at(&chart, 6).is_none());
    }

    #[test]
    fn empty_input_is_empty_chart() {
        let chart = merge_and_scale_series(&[], ChartLayout::default());
        assert!(chart.is_empty());
        assert!(chart.x_labels.is_empty());
        assert!(tooltip_at(&chart, 0).is_none());

        let chart = merge_and_scale_series(&[named("Empty", &[])], ChartLayout::default());
        assert!(chart.is_empty());
        assert_eq!(chart.series.len(), 1);
    }
}
