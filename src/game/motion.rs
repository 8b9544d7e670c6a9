//! Motion - Speed and distance of the runner
//!
//! Each stride is an instantaneous speed sample taken from the time since
//! the previous stride. Between strides the motion tick keeps moving the
//! runner at that speed while bleeding it off linearly toward rest.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::stride::{FootSide, StrideEvent};

/// What a stride did to the speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedSample {
    /// No earlier stride to time against; speed set to zero
    First,
    /// New speed from the inter-stride interval
    Measured(f64),
    /// Non-positive interval; speed left as it was
    Skipped,
}

/// Compact motion state for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub distance_traveled: f64,
    pub speed: f64,
    pub last_foot_moved: Option<FootSide>,
    pub active_foot: Option<FootSide>,
}

/// Runner momentum
#[derive(Debug, Clone)]
pub struct MotionModel {
    /// Distance traveled (meters)
    distance: f64,
    /// Current speed (m/s)
    speed: f64,
    /// Speed lost per second of ticking
    decay: f64,
    /// Timestamp of the previous stride
    last_stride_at: Option<Duration>,
}

impl MotionModel {
    /// Create a runner at rest
    pub fn new(decay: f64) -> Self {
        Self {
            distance: 0.0,
            speed: 0.0,
            decay,
            last_stride_at: None,
        }
    }

    /// Add a stride's distance and resample speed from the stride interval
    pub fn apply_stride(&mut self, event: &StrideEvent, at: Duration) -> SpeedSample {
        let sample = match self.last_stride_at {
            None => {
                self.speed = 0.0;
                SpeedSample::First
            }
            Some(previous) => {
                let interval = at.as_secs_f64() - previous.as_secs_f64();
                if interval > 0.0 {
                    self.speed = event.length / interval;
                    SpeedSample::Measured(self.speed)
                } else {
                    log::debug!("stride interval {interval}s is not positive, keeping speed");
                    SpeedSample::Skipped
                }
            }
        };
        self.last_stride_at = Some(at);
        self.distance += event.length;
        sample
    }

    /// Advance by momentum, then decay speed
    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 || self.speed <= 0.0 {
            return;
        }
        self.distance += self.speed * dt;
        self.speed = (self.speed - self.decay * dt).max(0.0);
    }

    /// Distance traveled (meters)
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Current speed (m/s)
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Back to rest at the start line
    pub fn reset(&mut self) {
        self.distance = 0.0;
        self.speed = 0.0;
        self.last_stride_at = None;
    }
}
