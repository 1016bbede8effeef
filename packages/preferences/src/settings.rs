//! Onboarding flag and display settings.

use serde::{Deserialize, Serialize};

use crate::{PreferenceError, PreferenceStore};

/// Key holding the onboarding flag.
pub const ONBOARDING_KEY: &str = "onboarding_completed";

/// Key holding [`Settings`] as JSON.
pub const SETTINGS_KEY: &str = "settings";

/// Whether the user has finished onboarding.
#[must_use]
pub fn onboarding_completed(store: &dyn PreferenceStore) -> bool {
    store
        .get(ONBOARDING_KEY)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Records that onboarding is finished.
///
/// # Errors
///
/// Returns [`PreferenceError`] if the store cannot persist the flag.
pub fn mark_onboarding_completed(store: &mut dyn PreferenceStore) -> Result<(), PreferenceError> {
    store.set(ONBOARDING_KEY, "true")
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Share of the map a selected planning area should fill.
    pub default_zoom_fill: f64,
    /// Planning-area boundary edition to request (URA publishes 1998,
    /// 2008, 2014, and 2019).
    pub planning_area_year: u16,
    /// Currency label shown next to prices.
    pub price_unit: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_zoom_fill: 0.8,
            planning_area_year: 2019,
            price_unit: "SGD".to_string(),
        }
    }
}

/// Saved settings, or the defaults when none are stored or the stored
/// value is unreadable. Fields missing from an older saved value take
/// their defaults.
#[must_use]
pub fn load_settings(store: &dyn PreferenceStore) -> Settings {
    let Some(raw) = store.get(SETTINGS_KEY) else {
        return Settings::default();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable saved settings: {e}");
        Settings::default()
    })
}

/// Stores `settings` as JSON under [`SETTINGS_KEY`].
///
/// # Errors
///
/// Returns [`PreferenceError`] if the store cannot persist the value.
pub fn save_settings(
    store: &mut dyn PreferenceStore,
    settings: &Settings,
) -> Result<(), PreferenceError> {
    store.set(SETTINGS_KEY, &serde_json::to_string(settings)?)
}
