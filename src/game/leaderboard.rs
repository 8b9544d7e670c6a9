//! Leaderboard - Top-3 best finish times
//!
//! Times are kept ascending. Empty slots hold a 30 s sentinel, so a finish
//! only qualifies when it is strictly faster than the current third place.

use serde::{Deserialize, Serialize};

use crate::game::store::KeyValueStore;

/// Number of ranked slots
pub const LEADERBOARD_SIZE: usize = 3;
/// Time seeded into empty slots (seconds)
pub const DEFAULT_TIME: f64 = 30.0;
/// Key the times are persisted under
pub const TOP_TIMES_KEY: &str = "TopTimes";

/// Best times, fastest first
pub type TopTimes = [f64; LEADERBOARD_SIZE];

/// A qualifying finish
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// 0 is the best slot
    pub rank: usize,
    pub times: TopTimes,
}

/// Ranks finish times and persists them through a [`KeyValueStore`]
#[derive(Debug)]
pub struct LeaderboardStore<S> {
    store: S,
    times: TopTimes,
}

impl<S: KeyValueStore> LeaderboardStore<S> {
    /// Open the leaderboard, loading whatever the store holds
    pub fn new(store: S) -> Self {
        let mut leaderboard = Self {
            store,
            times: [DEFAULT_TIME; LEADERBOARD_SIZE],
        };
        leaderboard.times = leaderboard.load();
        leaderboard
    }

    /// Persisted times, or the sentinel list if missing or malformed
    pub fn load(&self) -> TopTimes {
        match self.store.get(TOP_TIMES_KEY) {
            Ok(Some(values)) => Self::parse(&values).unwrap_or_else(|| {
                log::warn!("discarding malformed leaderboard {:?}", values);
                [DEFAULT_TIME; LEADERBOARD_SIZE]
            }),
            Ok(None) => [DEFAULT_TIME; LEADERBOARD_SIZE],
            Err(e) => {
                log::warn!("failed to load leaderboard, using defaults: {}", e);
                [DEFAULT_TIME; LEADERBOARD_SIZE]
            }
        }
    }

    fn parse(values: &[f64]) -> Option<TopTimes> {
        let mut times: TopTimes = values.try_into().ok()?;
        if times.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return None;
        }
        times.sort_by(f64::total_cmp);
        Some(times)
    }

    /// Where `time` would land, without changing anything
    pub fn consider_finish(&self, time: f64) -> Option<Placement> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        if time >= self.times[LEADERBOARD_SIZE - 1] {
            return None;
        }
        // Equal times keep the earlier entry ahead.
        let rank = self.times.iter().position(|t| time < *t)?;
        let mut times = self.times;
        times.copy_within(rank..LEADERBOARD_SIZE - 1, rank + 1);
        times[rank] = time;
        Some(Placement { rank, times })
    }

    /// Full overwrite of the persisted list
    pub fn save(&mut self, times: &TopTimes) -> Result<(), crate::game::store::StoreError> {
        self.store.set(TOP_TIMES_KEY, times)
    }

    /// Insert a qualifying time and persist the new list. A failed save is
    /// logged; the in-memory list is updated either way.
    pub fn record_finish(&mut self, time: f64) -> Option<Placement> {
        let placement = self.consider_finish(time)?;
        if let Err(e) = self.save(&placement.times) {
            log::warn!("failed to persist leaderboard: {}", e);
        }
        self.times = placement.times;
        log::info!("New best time {:.2} s at rank {}", time, placement.rank + 1);
        Some(placement)
    }

    /// Get current best times
    pub fn times(&self) -> TopTimes {
        self.times
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }
}
