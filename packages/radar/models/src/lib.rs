#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Radar chart types for the location comparison view.
//!
//! A radar chart always has the same five axes in the same order, so a
//! score vector is a fixed `[u8; 5]` indexed by [`RadarLabel::index`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of radar axes.
pub const RADAR_DIMENSIONS: usize = 5;

/// Highest score on any axis.
pub const MAX_SCORE: u8 = 100;

/// One radar axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RadarLabel {
    /// Cheaper relative to the compared set scores higher.
    Affordability,
    /// Public transport access.
    Accessibility,
    /// Shops, food, and healthcare nearby.
    Amenities,
    /// Green space and surroundings.
    Environment,
    /// Schools and community facilities.
    Community,
}

impl RadarLabel {
    /// Every axis in display order.
    pub const ALL: [Self; RADAR_DIMENSIONS] = [
        Self::Affordability,
        Self::Accessibility,
        Self::Amenities,
        Self::Environment,
        Self::Community,
    ];

    /// Position of this axis in a score vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Breakdown keys that feed this axis, tried in order. Matching
    /// ignores case and separators.
    #[must_use]
    pub const fn breakdown_keys(self) -> &'static [&'static str] {
        match self {
            Self::Affordability => &["Affordability", "price"],
            Self::Accessibility => &["Accessibility", "public_transport", "transport"],
            Self::Amenities => &["Amenities", "amenity"],
            Self::Environment => &["Environment", "green_space"],
            Self::Community => &["Community", "schools", "education"],
        }
    }
}

/// Where a score vector came from.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum ScoreSource {
    /// Backend breakdown.
    Breakdown,
    /// Derived from the location's own metrics.
    Fallback,
}

/// Five radar scores for one compared location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarScoreSet {
    /// Location the scores belong to.
    pub location_id: String,
    /// Scores in [`RadarLabel::ALL`] order, each in `0..=100`.
    pub scores: [u8; RADAR_DIMENSIONS],
    /// Whether the breakdown or the fallback produced the scores.
    pub source: ScoreSource,
}

impl RadarScoreSet {
    /// Score on `label`'s axis.
    #[must_use]
    pub const fn score(&self, label: RadarLabel) -> u8 {
        self.scores[label.index()]
    }

    /// Scores paired with their axis.
    pub fn labelled(&self) -> impl Iterator<Item = (RadarLabel, u8)> + '_ {
        RadarLabel::ALL.into_iter().zip(self.scores)
    }
}
