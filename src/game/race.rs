//! Race - Target distance, elapsed time and finish detection

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Running,
    Finished,
}

/// Race timing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    /// Finish line (meters)
    pub target_distance: f64,
    /// Seconds since the first stride, frozen at the finish
    pub elapsed_time: f64,
    /// Clock reading of the first stride
    pub started_at: Option<Duration>,
    pub completed: bool,
}

/// Drives a single race from the first stride to the finish line
#[derive(Debug, Clone)]
pub struct RaceController {
    status: RaceStatus,
    state: RaceState,
}

impl RaceController {
    /// Create a race that has not started
    pub fn new(target_distance: f64) -> Self {
        Self {
            status: RaceStatus::NotStarted,
            state: RaceState {
                target_distance,
                elapsed_time: 0.0,
                started_at: None,
                completed: false,
            },
        }
    }

    /// Start the clock. Only valid from `NotStarted`.
    pub fn start(&mut self, at: Duration) -> bool {
        if self.status != RaceStatus::NotStarted {
            return false;
        }
        self.status = RaceStatus::Running;
        self.state.started_at = Some(at);
        self.state.elapsed_time = 0.0;
        log::info!("Race started");
        true
    }

    /// Resample elapsed time while running
    pub fn tick(&mut self, now: Duration) {
        if self.status != RaceStatus::Running {
            return;
        }
        if let Some(started_at) = self.state.started_at {
            self.state.elapsed_time = now.saturating_sub(started_at).as_secs_f64();
        }
    }

    /// Check the finish line. Returns true on the Running -> Finished transition,
    /// freezing elapsed time at `at`.
    pub fn observe_distance(&mut self, distance: f64, at: Duration) -> bool {
        if self.status != RaceStatus::Running || distance < self.state.target_distance {
            return false;
        }
        self.tick(at);
        self.status = RaceStatus::Finished;
        self.state.completed = true;
        log::info!(
            "Race finished: {:.2} m in {:.2} s",
            distance,
            self.state.elapsed_time
        );
        true
    }

    /// Reset to `NotStarted`
    pub fn restart(&mut self) {
        self.status = RaceStatus::NotStarted;
        self.state.elapsed_time = 0.0;
        self.state.started_at = None;
        self.state.completed = false;
    }

    /// Distance left to the finish line, never negative
    pub fn remaining_distance(&self, distance: f64) -> f64 {
        (self.state.target_distance - distance).max(0.0)
    }

    /// Get current race status
    pub fn status(&self) -> RaceStatus {
        self.status
    }

    /// Get race timing state
    pub fn state(&self) -> &RaceState {
        &self.state
    }

    /// Elapsed race time (seconds)
    pub fn elapsed_time(&self) -> f64 {
        self.state.elapsed_time
    }

    /// Final time, once finished
    pub fn finish_time(&self) -> Option<f64> {
        (self.status == RaceStatus::Finished).then_some(self.state.elapsed_time)
    }
}
