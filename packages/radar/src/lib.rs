#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Radar score normalization.
//!
//! Turns a backend breakdown (category scores in `0..=1`) into five
//! `0..=100` integers. When no breakdown is available the scores are
//! derived from the location's own metrics, normalized against the rest
//! of the compared set so that the cheapest location scores highest on
//! affordability.

use sg_explorer_api_models::{Breakdown, Location};
use sg_explorer_radar_models::{
    MAX_SCORE, RADAR_DIMENSIONS, RadarLabel, RadarScoreSet, ScoreSource,
};

/// Score returned by [`norm`] when every location in the set has the
/// same value.
pub const FLAT_SET_SCORE: f64 = 50.0;

/// Rounds `value` and clamps it into `0..=100`. `NaN` maps to zero.
#[must_use]
pub fn clamp100(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, f64::from(MAX_SCORE));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = clamped as u8;
    score
}

/// Position of `value` within `[min, max]` on a 0-100 scale.
///
/// A flat range (`max == min`) yields [`FLAT_SET_SCORE`].
#[must_use]
pub fn norm(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return FLAT_SET_SCORE;
    }
    (value - min) / span * 100.0
}

/// Price and growth extents across the compared locations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComparedSetStats {
    /// `(min, max)` average price, if any location has one.
    pub price: Option<(f64, f64)>,
    /// `(min, max)` growth, if any location has one.
    pub growth: Option<(f64, f64)>,
}

impl ComparedSetStats {
    /// Collects extents over `locations`, ignoring missing and
    /// non-finite values.
    #[must_use]
    pub fn from_locations(locations: &[Location]) -> Self {
        Self {
            price: extent(locations.iter().filter_map(|l| l.avg_price)),
            growth: extent(locations.iter().filter_map(|l| l.growth)),
        }
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Scores straight from a backend breakdown.
///
/// Each axis takes the first of its [`RadarLabel::breakdown_keys`]
/// present in the breakdown, scaled by 100. Missing axes score zero.
#[must_use]
pub fn from_breakdown(breakdown: &Breakdown) -> [u8; RADAR_DIMENSIONS] {
    RadarLabel::ALL.map(|label| {
        label
            .breakdown_keys()
            .iter()
            .find_map(|key| breakdown.get(key))
            .map_or_else(
                || {
                    log::debug!("Breakdown has no {label} score, using 0");
                    0
                },
                |value| clamp100(value * 100.0),
            )
    })
}

/// Scores derived from `location`'s metrics relative to `stats`.
///
/// Affordability and environment are inverted against the compared set
/// (lowest price and lowest growth score highest); the other axes use
/// the location's 0-100 scores directly.
#[must_use]
pub fn derive_fallback(location: &Location, stats: &ComparedSetStats) -> [u8; RADAR_DIMENSIONS] {
    let inverted = |value: Option<f64>, range: Option<(f64, f64)>, label: RadarLabel| {
        match (value.filter(|v| v.is_finite()), range) {
            (Some(v), Some((min, max))) => clamp100(100.0 - norm(v, min, max)),
            _ => {
                log::debug!("Location {} has no value for {label}, using 0", location.id);
                0
            }
        }
    };
    let direct = |value: Option<f64>, label: RadarLabel| {
        value.map_or_else(
            || {
                log::debug!("Location {} has no value for {label}, using 0", location.id);
                0
            },
            clamp100,
        )
    };

    let mut scores = [0; RADAR_DIMENSIONS];
    scores[RadarLabel::Affordability.index()] =
        inverted(location.avg_price, stats.price, RadarLabel::Affordability);
    scores[RadarLabel::Accessibility.index()] =
        direct(location.transit_score, RadarLabel::Accessibility);
    scores[RadarLabel::Amenities.index()] = direct(location.amenity_score, RadarLabel::Amenities);
    scores[RadarLabel::Environment.index()] =
        inverted(location.growth, stats.growth, RadarLabel::Environment);
    scores[RadarLabel::Community.index()] = direct(location.school_score, RadarLabel::Community);
    scores
}

/// Radar scores for one location: the breakdown when one with at least
/// one score is available, the derived fallback otherwise.
#[must_use]
pub fn normalize_radar_scores(
    location: &Location,
    breakdown: Option<&Breakdown>,
    stats: &ComparedSetStats,
) -> [u8; RADAR_DIMENSIONS] {
    radar_score_set(location, breakdown, stats).scores
}

/// Same as [`normalize_radar_scores`], tagged with the location and the
/// score source.
#[must_use]
pub fn radar_score_set(
    location: &Location,
    breakdown: Option<&Breakdown>,
    stats: &ComparedSetStats,
) -> RadarScoreSet {
    let (scores, source) = match breakdown.filter(|b| !b.is_empty()) {
        Some(breakdown) => (from_breakdown(breakdown), ScoreSource::Breakdown),
        None => (derive_fallback(location, stats), ScoreSource::Fallback),
    };

    RadarScoreSet {
        location_id: location.id.clone(),
        scores,
        source,
    }
}
