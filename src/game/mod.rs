//! Game Module
//!
//! Stride physics, race timing and the leaderboard for the two-foot sprint.
//! Everything here is presentation-agnostic; the desktop shell only forwards
//! gestures and reads snapshots.

pub mod clock;
pub mod config;
pub mod leaderboard;
pub mod motion;
pub mod race;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod stride;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use leaderboard::{LeaderboardStore, Placement, TopTimes, DEFAULT_TIME, TOP_TIMES_KEY};
pub use motion::{MotionModel, MotionState, SpeedSample};
pub use race::{RaceController, RaceState, RaceStatus};
pub use scheduler::{Firing, Scheduler, TickKind, TimerId};
pub use session::{FinishRecord, GameEvent, GameSession, SessionSnapshot};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use stride::{FootOffsets, FootSide, StrideEvent, StrideTracker};
