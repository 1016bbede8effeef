//! Ranked preference categories.
//!
//! The ranking screen lets users drag categories into order. The gesture
//! layer only reports a `(from, to)` pair; [`reorder`] does the rest.

use serde::{Deserialize, Serialize};
use sg_explorer_api_models::{RankEntry, RankRequest};
use sg_explorer_radar_models::RadarLabel;

use crate::{PreferenceError, PreferenceStore};

/// Key the rank list is stored under.
pub const RANKS_KEY: &str = "ranks";

/// Returns `list` with the item at `from` moved to `to`.
///
/// Out-of-range indices leave the list unchanged.
#[must_use]
pub fn reorder<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
    let mut items = list.to_vec();
    if from >= items.len() || to >= items.len() {
        log::warn!(
            "Ignoring reorder {from} -> {to} on a list of {}",
            items.len()
        );
        return items;
    }

    let item = items.remove(from);
    items.insert(to, item);
    items
}

/// Categories in the user's order of importance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankList {
    categories: Vec<String>,
}

impl RankList {
    /// Creates a list with the given order.
    #[must_use]
    pub const fn new(categories: Vec<String>) -> Self {
        Self { categories }
    }

    /// Categories, most important first.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Moves the category at `from` to `to`.
    pub fn move_item(&mut self, from: usize, to: usize) {
        self.categories = reorder(&self.categories, from, to);
    }

    /// Body for `POST /ranks`, with 1-based ranks.
    #[must_use]
    pub fn to_rank_request(&self) -> RankRequest {
        RankRequest {
            ranks: (1..)
                .zip(&self.categories)
                .map(|(rank, category)| RankEntry {
                    category: category.clone(),
                    rank,
                })
                .collect(),
        }
    }
}

impl Default for RankList {
    /// The radar axes in display order.
    fn default() -> Self {
        Self::new(RadarLabel::ALL.iter().map(ToString::to_string).collect())
    }
}

/// Saved rank list, or the default order when none is stored or the
/// stored value is unreadable.
#[must_use]
pub fn load_rank_list(store: &dyn PreferenceStore) -> RankList {
    let Some(raw) = store.get(RANKS_KEY) else {
        return RankList::default();
    };

    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Ignoring unreadable saved ranks: {e}");
            RankList::default()
        }
    }
}

/// Stores `list` as JSON under [`RANKS_KEY`].
///
/// # Errors
///
/// Returns [`PreferenceError`] if the store cannot persist the value.
pub fn save_rank_list(
    store: &mut dyn PreferenceStore,
    list: &RankList,
) -> Result<(), PreferenceError> {
    store.set(RANKS_KEY, &serde_json::to_string(list)?)
}
