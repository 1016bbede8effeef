#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location comparison: concurrent per-location fetches with
//! cancellation, and the view built from whatever has arrived.
//!
//! A [`ComparisonSession`] fans out one breakdown and one price-trend
//! request per compared location. Results land in completion order.
//! Changing the compared set, cancelling, or starting another load
//! advances the session's [`CycleClock`], and any result from an older
//! [`FetchCycle`] is thrown away instead of overwriting newer state.

pub mod cycle;
pub mod session;

pub use cycle::{CycleClock, FetchCycle};
pub use session::{
    ComparisonSession, ComparisonView, FetchError, FetchKind, FetchState, LoadOutcome,
    LocationEntry,
};
