//! Comparison session: the compared location set, its per-location fetch
//! state, and the fan-out load that fills it in.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::StreamExt as _;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use sg_explorer_api::{ApiError, ExplorerApi};
use sg_explorer_api_models::{Breakdown, Location};
use sg_explorer_radar::{ComparedSetStats, radar_score_set};
use sg_explorer_radar_models::RadarScoreSet;
use sg_explorer_trend::merge_and_scale_series;
use sg_explorer_trend_models::{ChartLayout, NamedSeries, ScaledChart, TrendPoint};
use strum_macros::{AsRefStr, Display};

use crate::cycle::{CycleClock, FetchCycle};

/// State of one fetch for one location.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Not requested in the current cycle.
    Idle,
    /// Request in flight.
    Pending,
    /// Response applied.
    Loaded(T),
    /// Request failed with this message.
    Failed(String),
}

impl<T> FetchState<T> {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Loaded value, if any.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

/// Which of a location's two fetches a result or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FetchKind {
    /// `GET /details/{name}/breakdown`.
    Breakdown,
    /// `GET /details/{id}/price-trend`.
    PriceTrend,
}

/// A compared location and its fetch state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEntry {
    /// The location as selected.
    pub location: Location,
    /// Radar breakdown.
    pub breakdown: FetchState<Breakdown>,
    /// Monthly price trend.
    pub trend: FetchState<Vec<TrendPoint>>,
}

impl LocationEntry {
    fn new(location: Location) -> Self {
        Self {
            location,
            breakdown: FetchState::Idle,
            trend: FetchState::Idle,
        }
    }
}

/// A fetch failure shown next to the retry control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchError {
    /// Location the fetch was for.
    pub location_id: String,
    /// Which fetch failed.
    pub kind: FetchKind,
    /// Error message.
    pub message: String,
}

/// Everything the comparison view renders, built from whatever has
/// arrived so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    /// Compared locations in selection order.
    pub locations: Vec<Location>,
    /// One radar score set per location, same order.
    pub radar: Vec<RadarScoreSet>,
    /// Price-trend chart over the series that have loaded.
    pub chart: ScaledChart,
    /// Whether any fetch is still in flight.
    pub loading: bool,
    /// Failed fetches.
    pub errors: Vec<FetchError>,
}

/// How a [`ComparisonSession::load`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every fetch resolved and was applied.
    Completed {
        /// Cycle that ran.
        cycle: u64,
        /// Fetches that failed.
        failed: usize,
    },
    /// The cycle was cancelled before it finished. Results that arrived
    /// afterwards were dropped.
    Superseded {
        /// Cycle that was cancelled.
        cycle: u64,
    },
}

/// One request, addressed to an entry by its position in the compared
/// set. Positions stay valid for the whole cycle because changing the set
/// invalidates the cycle first.
enum FetchTask {
    Breakdown {
        entry: usize,
        location_id: String,
        name: String,
    },
    PriceTrend {
        entry: usize,
        location_id: String,
    },
}

enum Fetched {
    Breakdown {
        entry: usize,
        location_id: String,
        result: Result<Breakdown, ApiError>,
    },
    PriceTrend {
        entry: usize,
        location_id: String,
        result: Result<Vec<TrendPoint>, ApiError>,
    },
}

impl Fetched {
    const fn kind(&self) -> FetchKind {
        match self {
            Self::Breakdown { .. } => FetchKind::Breakdown,
            Self::PriceTrend { .. } => FetchKind::PriceTrend,
        }
    }

    fn location_id(&self) -> &str {
        match self {
            Self::Breakdown { location_id, .. } | Self::PriceTrend { location_id, .. } => {
                location_id
            }
        }
    }

    const fn entry(&self) -> usize {
        match self {
            Self::Breakdown { entry, .. } | Self::PriceTrend { entry, .. } => *entry,
        }
    }
}

enum Applied {
    Loaded,
    Failed,
    Stale,
}

async fn run_task<A: ExplorerApi + ?Sized>(api: &A, task: FetchTask) -> Fetched {
    match task {
        FetchTask::Breakdown {
            entry,
            location_id,
            name,
        } => {
            let result = api.breakdown(&name).await;
            Fetched::Breakdown {
                entry,
                location_id,
                result,
            }
        }
        FetchTask::PriceTrend { entry, location_id } => {
            let result = api.price_trend(&location_id).await;
            Fetched::PriceTrend {
                entry,
                location_id,
                result,
            }
        }
    }
}

fn store<T>(
    state: &mut FetchState<T>,
    result: Result<T, ApiError>,
    kind: FetchKind,
    id: &str,
) -> Applied {
    match result {
        Ok(value) => {
            *state = FetchState::Loaded(value);
            Applied::Loaded
        }
        Err(e) => {
            log::warn!("Failed to fetch {kind} for location {id}: {e}");
            *state = FetchState::Failed(e.to_string());
            Applied::Failed
        }
    }
}

/// The set of locations being compared and their fetched data.
///
/// All methods take `&self`, so a session can be shared behind an `Arc`
/// and reloaded while an earlier load is still running. Only the most
/// recent cycle's results are ever applied.
#[derive(Debug, Default)]
pub struct ComparisonSession {
    clock: CycleClock,
    entries: Mutex<Vec<LocationEntry>>,
}

impl ComparisonSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session comparing `locations`.
    #[must_use]
    pub fn with_locations(locations: Vec<Location>) -> Self {
        let session = Self::new();
        session.set_locations(locations);
        session
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LocationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the compared set. In-flight fetches for the old set are
    /// cancelled and all state is reset to idle.
    pub fn set_locations(&self, locations: Vec<Location>) {
        let mut entries = self.lock();
        self.clock.invalidate();
        *entries = locations.into_iter().map(LocationEntry::new).collect();
        log::info!("Comparing {} locations", entries.len());
    }

    /// Compared locations in selection order.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.lock().iter().map(|e| e.location.clone()).collect()
    }

    /// Copy of every location's fetch state.
    #[must_use]
    pub fn entries(&self) -> Vec<LocationEntry> {
        self.lock().clone()
    }

    /// Current cycle generation.
    #[must_use]
    pub fn current_cycle(&self) -> u64 {
        self.clock.current()
    }

    /// Cancels in-flight fetches. Anything still pending goes back to
    /// idle; loaded data and errors are kept.
    pub fn cancel(&self) {
        let mut entries = self.lock();
        let generation = self.clock.invalidate();
        for entry in entries.iter_mut() {
            if entry.breakdown.is_pending() {
                entry.breakdown = FetchState::Idle;
            }
            if entry.trend.is_pending() {
                entry.trend = FetchState::Idle;
            }
        }
        log::info!("Cancelled fetches, now at cycle {generation}");
    }

    /// Fetches the breakdown and price trend for every compared
    /// location concurrently.
    ///
    /// Results are applied in completion order as they arrive. If the
    /// session is reloaded, cancelled, or given a new location set while
    /// this runs, the next result to arrive is discarded and the
    /// remaining fetches are dropped.
    pub async fn load<A: ExplorerApi + ?Sized>(&self, api: &A) -> LoadOutcome {
        let (cycle, tasks) = self.begin_cycle();
        log::info!(
            "Fetch cycle {} started with {} requests",
            cycle.id(),
            tasks.len()
        );

        let mut pending: FuturesUnordered<_> =
            tasks.into_iter().map(|task| run_task(api, task)).collect();
        let mut failed = 0;

        while let Some(fetched) = pending.next().await {
            match self.apply(&cycle, fetched) {
                Applied::Loaded => {}
                Applied::Failed => failed += 1,
                Applied::Stale => {
                    log::debug!(
                        "Fetch cycle {} superseded, dropping {} outstanding requests",
                        cycle.id(),
                        pending.len()
                    );
                    return LoadOutcome::Superseded { cycle: cycle.id() };
                }
            }
        }

        log::info!("Fetch cycle {} finished, {failed} failed", cycle.id());
        LoadOutcome::Completed {
            cycle: cycle.id(),
            failed,
        }
    }

    /// Re-runs [`Self::load`]. There is no automatic retry; this is the
    /// manual retry action.
    pub async fn retry<A: ExplorerApi + ?Sized>(&self, api: &A) -> LoadOutcome {
        log::info!("Retrying comparison fetches");
        self.load(api).await
    }

    fn begin_cycle(&self) -> (FetchCycle, Vec<FetchTask>) {
        let mut entries = self.lock();
        let cycle = self.clock.begin();

        let mut tasks = Vec::with_capacity(entries.len() * 2);
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.breakdown = FetchState::Pending;
            entry.trend = FetchState::Pending;
            tasks.push(FetchTask::Breakdown {
                entry: index,
                location_id: entry.location.id.clone(),
                name: entry.location.detail_key().to_string(),
            });
            tasks.push(FetchTask::PriceTrend {
                entry: index,
                location_id: entry.location.id.clone(),
            });
        }

        (cycle, tasks)
    }

    fn apply(&self, cycle: &FetchCycle, fetched: Fetched) -> Applied {
        let mut entries = self.lock();
        if cycle.is_cancelled() {
            log::debug!(
                "Discarding stale {} for location {} from cycle {}",
                fetched.kind(),
                fetched.location_id(),
                cycle.id()
            );
            return Applied::Stale;
        }

        let Some(entry) = entries.get_mut(fetched.entry()) else {
            log::warn!(
                "Received {} for missing entry {} (location {})",
                fetched.kind(),
                fetched.entry(),
                fetched.location_id()
            );
            return Applied::Loaded;
        };

        match fetched {
            Fetched::Breakdown {
                location_id,
                result,
                ..
            } => store(
                &mut entry.breakdown,
                result,
                FetchKind::Breakdown,
                &location_id,
            ),
            Fetched::PriceTrend {
                location_id,
                result,
                ..
            } => store(
                &mut entry.trend,
                result,
                FetchKind::PriceTrend,
                &location_id,
            ),
        }
    }

    /// Builds the view from the current state.
    ///
    /// Radar scores use the breakdown where it has loaded and the
    /// derived fallback elsewhere. The chart contains only the series
    /// that have loaded.
    #[must_use]
    pub fn snapshot(&self, layout: ChartLayout) -> ComparisonView {
        let entries = self.entries();
        let locations: Vec<Location> = entries.iter().map(|e| e.location.clone()).collect();
        let stats = ComparedSetStats::from_locations(&locations);

        let radar = entries
            .iter()
            .map(|e| radar_score_set(&e.location, e.breakdown.loaded(), &stats))
            .collect();

        let series: Vec<NamedSeries> = entries
            .iter()
            .filter_map(|e| {
                e.trend.loaded().map(|points| NamedSeries {
                    label: e.location.display_name(),
                    points: points.clone(),
                })
            })
            .collect();

        let loading = entries
            .iter()
            .any(|e| e.breakdown.is_pending() || e.trend.is_pending());

        let errors = entries
            .iter()
            .flat_map(|e| {
                [
                    (FetchKind::Breakdown, e.breakdown.error()),
                    (FetchKind::PriceTrend, e.trend.error()),
                ]
                .into_iter()
                .filter_map(move |(kind, message)| {
                    message.map(|m| FetchError {
                        location_id: e.location.id.clone(),
                        kind,
                        message: m.to_string(),
                    })
                })
            })
            .collect();

        ComparisonView {
            locations,
            radar,
            chart: merge_and_scale_series(&series, layout),
            loading,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use sg_explorer_api_models::{ExportFormat, FacilityLocations, RankRequest, SearchFilter};
    use sg_explorer_geography_models::PlanningArea;
    use sg_explorer_radar_models::ScoreSource;
    use tokio::sync::Notify;

    use super::*;

    /// In-memory backend. Price-trend requests for gated ids wait until
    /// the gate is opened.
    #[derive(Default)]
    struct MockApi {
        gates: BTreeMap<String, Arc<Notify>>,
        started: BTreeMap<String, Arc<Notify>>,
        failing_breakdowns: BTreeMap<String, AtomicBool>,
    }

    impl MockApi {
        fn gate(mut self, id: &str) -> Self {
            self.gates.insert(id.to_string(), Arc::new(Notify::new()));
            self.started.insert(id.to_string(), Arc::new(Notify::new()));
            self
        }

        fn failing(mut self, name: &str) -> Self {
            self.failing_breakdowns
                .insert(name.to_string(), AtomicBool::new(true));
            self
        }

        fn open(&self, id: &str) {
            self.gates[id].notify_one();
        }

        async fn wait_started(&self, id: &str) {
            self.started[id].notified().await;
        }

        fn recover(&self, name: &str) {
            self.failing_breakdowns[name].store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ExplorerApi for MockApi {
        async fn planning_areas(&self, _year: u16) -> Result<Vec<PlanningArea>, ApiError> {
            Ok(Vec::new())
        }

        async fn price_trend(&self, location_id: &str) -> Result<Vec<TrendPoint>, ApiError> {
            if let Some(started) = self.started.get(location_id) {
                started.notify_one();
            }
            if let Some(gate) = self.gates.get(location_id) {
                gate.notified().await;
            }
            Ok(vec![
                TrendPoint::new("2023-01", 500_000.0),
                TrendPoint::new("2023-02", 501_000.0),
            ])
        }

        async fn breakdown(&self, name: &str) -> Result<Breakdown, ApiError> {
            if self
                .failing_breakdowns
                .get(name)
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                return Err(ApiError::Status {
                    status: 503,
                    url: format!("http://backend/details/{name}/breakdown"),
                });
            }
            Ok(serde_json::from_str(r#"{"Affordability": 0.6}"#).unwrap())
        }

        async fn facility_locations(
            &self,
            _name: &str,
            _types: &[String],
        ) -> Result<FacilityLocations, ApiError> {
            Ok(FacilityLocations::new())
        }

        async fn search(&self, _filter: &SearchFilter) -> Result<Vec<Location>, ApiError> {
            Ok(Vec::new())
        }

        async fn save_ranks(&self, _ranks: &RankRequest) -> Result<(), ApiError> {
            Ok(())
        }

        async fn reset_ranks(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn saved_locations(&self) -> Result<Vec<Location>, ApiError> {
            Ok(Vec::new())
        }

        async fn save_location(&self, _location_id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_saved_location(&self, _location_id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn import_settings(&self, _payload: &serde_json::Value) -> Result<(), ApiError> {
            Ok(())
        }

        async fn export_settings(&self, _format: ExportFormat) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    fn location(id: &str, street: &str) -> Location {
        Location {
            id: id.to_string(),
            street: street.to_string(),
            area: "Bedok".to_string(),
            avg_price: Some(500_000.0),
            growth: Some(2.0),
            ..Location::default()
        }
    }

    async fn wait_until(session: &ComparisonSession, done: impl Fn(&ComparisonView) -> bool) {
        for _ in 0..200 {
            if done(&session.snapshot(ChartLayout::default())) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn loads_every_location() {
        let api = MockApi::default();
        let session = ComparisonSession::with_locations(vec![
            location("a", "Street A"),
            location("bb", "Street B"),
        ]);

        let outcome = session.load(&api).await;
        assert!(matches!(outcome, LoadOutcome::Completed { failed: 0, .. }));

        let view = session.snapshot(ChartLayout::default());
        assert!(!view.loading);
        assert!(view.errors.is_empty());
        assert_eq!(view.chart.series.len(), 2);
        assert_eq!(view.chart.months.len(), 2);
        assert_eq!(view.radar.len(), 2);
        assert!(view.radar.iter().all(|r| r.source == ScoreSource::Breakdown));
        assert_eq!(view.radar[0].scores[0], 60);
    }

    #[tokio::test]
    async fn locations_sharing_an_id_all_finish_loading() {
        let api = MockApi::default();
        let session = ComparisonSession::with_locations(vec![
            location("", "First St"),
            location("", "Second St"),
        ]);

        let outcome = session.load(&api).await;
        assert!(matches!(outcome, LoadOutcome::Completed { failed: 0, .. }));

        let view = session.snapshot(ChartLayout::default());
        assert!(!view.loading);
        assert_eq!(view.chart.series.len(), 2);
        assert_eq!(view.chart.series[0].label, "First St, Bedok");
        assert_eq!(view.chart.series[1].label, "Second St, Bedok");
        assert!(view.radar.iter().all(|r| r.source == ScoreSource::Breakdown));
    }

    #[tokio::test]
    async fn renders_partial_arrival() {
        let api = Arc::new(MockApi::default().gate("slow"));
        let session = Arc::new(ComparisonSession::with_locations(vec![
            location("slow", "Slow St"),
            location("fast", "Fast St"),
        ]));

        let task = {
            let (api, session) = (Arc::clone(&api), Arc::clone(&session));
            tokio::spawn(async move { session.load(api.as_ref()).await })
        };

        wait_until(&session, |v| v.chart.series.len() == 1).await;
        let view = session.snapshot(ChartLayout::default());
        assert!(view.loading);
        assert_eq!(view.chart.series[0].label, "Fast St, Bedok");
        assert_eq!(view.radar.len(), 2);

        api.open("slow");
        let outcome = task.await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Completed { .. }));
        let view = session.snapshot(ChartLayout::default());
        assert!(!view.loading);
        assert_eq!(view.chart.series.len(), 2);
        // series keep selection order, not completion order
        assert_eq!(view.chart.series[0].label, "Slow St, Bedok");
    }

    #[tokio::test]
    async fn discards_results_after_location_change() {
        let api = Arc::new(MockApi::default().gate("old"));
        let session = Arc::new(ComparisonSession::with_locations(vec![location(
            "old", "Old St",
        )]));

        let task = {
            let (api, session) = (Arc::clone(&api), Arc::clone(&session));
            tokio::spawn(async move { session.load(api.as_ref()).await })
        };

        api.wait_started("old").await;
        session.set_locations(vec![location("new", "New St")]);
        api.open("old");

        let outcome = task.await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Superseded { .. }));

        let entries = session.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location.id, "new");
        assert_eq!(entries[0].trend, FetchState::Idle);
        assert_eq!(entries[0].breakdown, FetchState::Idle);

        assert!(matches!(
            session.load(api.as_ref()).await,
            LoadOutcome::Completed { failed: 0, .. }
        ));
        let view = session.snapshot(ChartLayout::default());
        assert_eq!(view.chart.series.len(), 1);
        assert_eq!(view.chart.series[0].label, "New St, Bedok");
    }

    #[tokio::test]
    async fn newer_load_supersedes_older() {
        let api = Arc::new(MockApi::default().gate("a"));
        let session = Arc::new(ComparisonSession::with_locations(vec![location("a", "A St")]));

        let first = {
            let (api, session) = (Arc::clone(&api), Arc::clone(&session));
            tokio::spawn(async move { session.load(api.as_ref()).await })
        };
        api.wait_started("a").await;

        let second = {
            let (api, session) = (Arc::clone(&api), Arc::clone(&session));
            tokio::spawn(async move { session.load(api.as_ref()).await })
        };
        api.wait_started("a").await;

        // one permit per waiting request
        api.open("a");
        api.open("a");

        let outcomes = (first.await.unwrap(), second.await.unwrap());
        assert!(matches!(outcomes.0, LoadOutcome::Superseded { cycle: 2 }));
        assert!(matches!(outcomes.1, LoadOutcome::Completed { cycle: 3, .. }));
        assert!(session.entries()[0].trend.loaded().is_some());
    }

    #[tokio::test]
    async fn cancel_resets_pending_state() {
        let api = Arc::new(MockApi::default().gate("a"));
        let session = Arc::new(ComparisonSession::with_locations(vec![location("a", "A St")]));

        let task = {
            let (api, session) = (Arc::clone(&api), Arc::clone(&session));
            tokio::spawn(async move { session.load(api.as_ref()).await })
        };
        api.wait_started("a").await;

        session.cancel();
        api.open("a");
        assert!(matches!(
            task.await.unwrap(),
            LoadOutcome::Superseded { .. }
        ));

        let entry = &session.entries()[0];
        assert_eq!(entry.trend, FetchState::Idle);
        assert!(!session.snapshot(ChartLayout::default()).loading);
    }

    #[tokio::test]
    async fn failures_surface_and_retry_recovers() {
        let api = MockApi::default().failing("Broken St");
        let session = ComparisonSession::with_locations(vec![
            location("a", "Broken St"),
            location("b", "Fine St"),
        ]);

        let outcome = session.load(&api).await;
        assert!(matches!(outcome, LoadOutcome::Completed { failed: 1, .. }));

        let view = session.snapshot(ChartLayout::default());
        assert_eq!(view.errors.len(), 1);
        assert_eq!(view.errors[0].location_id, "a");
        assert_eq!(view.errors[0].kind, FetchKind::Breakdown);
        assert!(view.errors[0].message.contains("503"));
        assert_eq!(view.radar[0].source, ScoreSource::Fallback);
        assert_eq!(view.radar[1].source, ScoreSource::Breakdown);
        // chart still renders both trends
        assert_eq!(view.chart.series.len(), 2);

        api.recover("Broken St");
        session.retry(&api).await;
        let view = session.snapshot(ChartLayout::default());
        assert!(view.errors.is_empty());
        assert_eq!(view.radar[0].source, ScoreSource::Breakdown);
    }

    #[tokio::test]
    async fn empty_session_loads_trivially() {
        let session = ComparisonSession::new();
        let outcome = session.load(&MockApi::default()).await;
        assert_eq!(outcome, LoadOutcome::Completed { cycle: 1, failed: 0 });

        let view = session.snapshot(ChartLayout::default());
        assert!(view.chart.is_empty());
        assert!(view.radar.is_empty());
        assert!(!view.loading);
    }
}
