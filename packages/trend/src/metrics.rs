//! Growth and trend classification for a single price series.
//!
//! The thresholds are product heuristics:
//! direction compares the average month-on-month change against a fixed
//! currency amount, not a percentage.

use sg_explorer_trend_models::{TrendDirection, TrendMetrics, TrendPoint, TrendStrength};

use crate::months::sort_points;

/// Average monthly change (in currency units) above which a series is
/// trending up, or below the negative of which it is trending down.
pub const TREND_DIRECTION_THRESHOLD: f64 = 500.0;

/// Share of the recent price range the average change must exceed to
/// count as a strong trend.
pub const STRONG_TREND_FRACTION: f64 = 0.10;

/// Share of the recent price range the average change must exceed to
/// count as a moderate trend.
pub const MODERATE_TREND_FRACTION: f64 = 0.05;

/// Points considered for recent growth.
const RECENT_WINDOW: usize = 6;

/// Points considered for direction and strength.
const SLOPE_WINDOW: usize = 3;

/// Computes [`TrendMetrics`] for a series in any order.
///
/// Points are ordered by month first, and points whose month does not
/// parse are ignored. Fewer than two usable points yields the all-zero,
/// stable, weak default.
#[must_use]
pub fn compute_trend_metrics(points: &[TrendPoint]) -> TrendMetrics {
    let points = sort_points(points);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return TrendMetrics::default();
    };
    if points.len() < 2 {
        return TrendMetrics::default();
    }

    let recent = tail(&points, RECENT_WINDOW);
    let slope = tail(&points, SLOPE_WINDOW);
    let avg_change = average_change(slope);

    TrendMetrics {
        total_growth_percent: growth_percent(first.median, last.median),
        recent_growth_percent: growth_percent(recent[0].median, last.median),
        trend_direction: direction(avg_change),
        trend_strength: strength(avg_change, slope),
        current_price: last.median,
        price_change: last.median - first.median,
    }
}

fn tail(points: &[TrendPoint], max: usize) -> &[TrendPoint] {
    &points[points.len().saturating_sub(max)..]
}

fn growth_percent(from: f64, to: f64) -> f64 {
    if from == 0.0 || !from.is_finite() {
        return 0.0;
    }
    (to - from) / from * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn average_change(points: &[TrendPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let total: f64 = points.windows(2).map(|w| w[1].median - w[0].median).sum();
    total / (points.len() - 1) as f64
}

fn direction(avg_change: f64) -> TrendDirection {
    if avg_change > TREND_DIRECTION_THRESHOLD {
        TrendDirection::Up
    } else if avg_change < -TREND_DIRECTION_THRESHOLD {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

fn strength(avg_change: f64, points: &[TrendPoint]) -> TrendStrength {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.median), hi.max(p.median))
        });
    let range = max - min;
    let magnitude = avg_change.abs();

    if magnitude > range * STRONG_TREND_FRACTION {
        TrendStrength::Strong
    } else if magnitude > range * MODERATE_TREND_FRACTION {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<TrendPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TrendPoint::new(format!("2023-{:02}", i + 1), *v))
            .collect()
    }

    #[test]
    fn two_point_series() {
        let m = compute_trend_metrics(&[
            TrendPoint::new("2023-01", 1000.0),
            TrendPoint::new("2023-02", 1100.0),
        ]);
        assert!((m.total_growth_percent - 10.0).abs() < 1e-9);
        assert!((m.recent_growth_percent - 10.0).abs() < 1e-9);
        assert_eq!(m.trend_direction, TrendDirection::Stable);
        assert!((m.current_price - 1100.0).abs() < f64::EPSILON);
        assert!((m.price_change - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unordered_input_is_measured_by_month() {
        let m = compute_trend_metrics(&[
            TrendPoint::new("2023-03", 1200.0),
            TrendPoint::new("2023-01", 1000.0),
            TrendPoint::new("2023-02", 1100.0),
        ]);
        assert!((m.total_growth_percent - 20.0).abs() < 1e-9);
        assert!((m.current_price - 1200.0).abs() < f64::EPSILON);
        assert!((m.price_change - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unparseable_months_are_ignored() {
        let m = compute_trend_metrics(&[
            TrendPoint::new("2023-01", 1000.0),
            TrendPoint::new("bogus", 9000.0),
            TrendPoint::new("2023-02", 1100.0),
        ]);
        assert!((m.current_price - 1100.0).abs() < f64::EPSILON);
        assert!((m.price_change - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_input_is_default() {
        assert_eq!(compute_trend_metrics(&[]), TrendMetrics::default());
        let single = compute_trend_metrics(&points(&[750_000.0]));
        assert_eq!(single, TrendMetrics::default());
        assert_eq!(single.trend_direction, TrendDirection::Stable);
        assert_eq!(single.trend_strength, TrendStrength::Weak);
        assert!(single.current_price.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_first_median_has_zero_growth() {
        let m = compute_trend_metrics(&points(&[0.0, 1000.0]));
        assert!(m.total_growth_percent.abs() < f64::EPSILON);
        assert!((m.price_change - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recent_growth_uses_last_six_points() {
        let m = compute_trend_metrics(&points(&[
            100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0,
        ]));
        assert!((m.total_growth_percent - 700.0).abs() < 1e-9);
        // last six start at 300
        assert!((m.recent_growth_percent - (800.0 - 300.0) / 300.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn rising_series_trends_up_strongly() {
        let m = compute_trend_metrics(&points(&[500_000.0, 501_000.0, 502_000.0, 503_000.0]));
        assert_eq!(m.trend_direction, TrendDirection::Up);
        assert_eq!(m.trend_strength, TrendStrength::Strong);
    }

    #[test]
    fn falling_series_trends_down() {
        let m = compute_trend_metrics(&points(&[503_000.0, 502_000.0, 501_000.0]));
        assert_eq!(m.trend_direction, TrendDirection::Down);
    }

    #[test]
    fn direction_uses_last_three_points_only() {
        // big early jump, flat tail
        let m = compute_trend_metrics(&points(&[100_000.0, 900_000.0, 900_100.0, 900_200.0]));
        assert_eq!(m.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn oscillating_tail_strength() {
        // deltas +8000, -7000: avg 500 (not above the threshold), range 8000
        let m = compute_trend_metrics(&points(&[600_000.0, 608_000.0, 601_000.0]));
        assert_eq!(m.trend_direction, TrendDirection::Stable);
        assert_eq!(m.trend_strength, TrendStrength::Moderate);

        // deltas +10000, -10000: avg 0
        let m = compute_trend_metrics(&points(&[600_000.0, 610_000.0, 600_000.0]));
        assert_eq!(m.trend_strength, TrendStrength::Weak);
    }

    #[test]
    fn flat_series_is_stable_and_weak() {
        let m = compute_trend_metrics(&points(&[700_000.0, 700_000.0, 700_000.0]));
        assert_eq!(m.trend_direction, TrendDirection::Stable);
        assert_eq!(m.trend_strength, TrendStrength::Weak);
        assert!(m.total_growth_percent.abs() < f64::EPSILON);
    }
}
