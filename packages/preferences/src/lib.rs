#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! User preferences: the ranked category list, onboarding state, and
//! display settings.
//!
//! Nothing here touches global storage. Callers hand in a
//! [`PreferenceStore`], which is a [`MemoryStore`] in tests and a
//! [`TomlFileStore`] for the CLI.

pub mod rank;
pub mod settings;
pub mod store;

pub use rank::{RANKS_KEY, RankList, load_rank_list, reorder, save_rank_list};
pub use settings::{
    ONBOARDING_KEY, SETTINGS_KEY, Settings, load_settings, mark_onboarding_completed,
    onboarding_completed, save_settings,
};
pub use store::{MemoryStore, PreferenceStore, TomlFileStore};

use thiserror::Error;

/// Errors that can occur while reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preferences file is not valid TOML.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Preferences could not be written as TOML.
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A stored value could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
