//! Fetch-cycle tokens.
//!
//! Each load mints a [`FetchCycle`] from a shared [`CycleClock`]. Anything
//! that invalidates in-flight work (a new location set, teardown, another
//! load) advances the clock, after which every older token reports
//! itself cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared generation counter that fetch cycles are minted from.
#[derive(Debug, Clone, Default)]
pub struct CycleClock {
    generation: Arc<AtomicU64>,
}

impl CycleClock {
    /// Creates a clock at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Advances the clock and returns a token for the new generation.
    #[must_use]
    pub fn begin(&self) -> FetchCycle {
        let id = self.invalidate();
        FetchCycle {
            id,
            generation: Arc::clone(&self.generation),
        }
    }

    /// Advances the clock without starting a cycle, cancelling every
    /// outstanding token. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Token for one fetch cycle.
#[derive(Debug, Clone)]
pub struct FetchCycle {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl FetchCycle {
    /// Generation this cycle was minted at.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether the clock has moved past this cycle.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.id
    }
}
