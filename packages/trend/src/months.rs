//! Month-axis construction shared by every series on a chart.

use std::collections::{BTreeMap, BTreeSet};

use sg_explorer_trend_models::{MonthKey, TrendPoint};

/// Union of all months across `series`, ascending.
///
/// Months that cannot be parsed are skipped with a warning. A series
/// missing some of the merged months is not padded; those slots become
/// gaps when the series is scaled.
#[must_use]
pub fn merge_months(series: &[Vec<TrendPoint>]) -> Vec<MonthKey> {
    series
        .iter()
        .flatten()
        .filter_map(parse_month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorts points by parsed month, dropping unparseable ones.
///
/// Duplicate months are kept in their original relative order.
#[must_use]
pub fn sort_points(points: &[TrendPoint]) -> Vec<TrendPoint> {
    let mut keyed: Vec<(MonthKey, &TrendPoint)> = points
        .iter()
        .filter_map(|p| parse_month(p).map(|key| (key, p)))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Median per month for one series. A later point for the same month
/// overwrites an earlier one.
#[must_use]
pub fn values_by_month(points: &[TrendPoint]) -> BTreeMap<MonthKey, f64> {
    points
        .iter()
        .filter(|p| p.median.is_finite())
        .filter_map(|p| parse_month(p).map(|key| (key, p.median)))
        .collect()
}

/// Whether the x-axis label for `months[index]` should be drawn.
///
/// The first and last months are always labelled; in between only
/// quarter starts are, which keeps long ranges readable.
#[must_use]
pub fn should_label_month(index: usize, count: usize, month: MonthKey) -> bool {
    index == 0 || index + 1 == count || month.is_quarter_start()
}

fn parse_month(point: &TrendPoint) -> Option<MonthKey> {
    let key = MonthKey::parse(&point.month);
    if key.is_none() {
        log::warn!("Skipping trend point with unparseable month {:?}", point.month);
    }
    key
}
