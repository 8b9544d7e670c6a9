//! Session - One player's game: gestures in, ticks pumped, snapshots out
//!
//! Gesture handlers apply immediately. A completed stride first catches up on
//! ticks that fell due strictly before it, so totals do not depend on how
//! often the host pumps. Ticks at or after the stride's instant run inside
//! [`GameSession::pump`], which gives a fixed "gestures, then ticks" order
//! within one frame.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::clock::Clock;
use crate::game::config::GameConfig;
use crate::game::leaderboard::{LeaderboardStore, Placement, TopTimes};
use crate::game::motion::{MotionModel, MotionState, SpeedSample};
use crate::game::race::{RaceController, RaceState, RaceStatus};
use crate::game::scheduler::{Scheduler, TickKind, TimerId};
use crate::game::store::KeyValueStore;
use crate::game::stride::{FootOffsets, FootSide, StrideEvent, StrideTracker};

/// State-change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    StrideAccepted {
        foot: FootSide,
        distance: f64,
        speed: f64,
    },
    RaceStarted,
    RaceFinished {
        time: f64,
        /// Leaderboard slot, if the time qualified
        rank: Option<usize>,
    },
    Restarted,
}

/// Outcome of the last finished race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub time: f64,
    pub placement: Option<Placement>,
}

/// Foot rendering state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetSnapshot {
    pub offsets: FootOffsets,
    pub left_ready: bool,
    pub right_ready: bool,
}

/// Race view with derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    #[serde(flatten)]
    pub state: RaceState,
    pub remaining_distance: f64,
}

/// Everything the presentation layer needs for one redraw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub motion: MotionState,
    pub race: RaceSnapshot,
    pub feet: FeetSnapshot,
    pub leaderboard: TopTimes,
    pub last_finish: Option<FinishRecord>,
}

/// Game session
pub struct GameSession<C, S> {
    config: GameConfig,
    clock: C,
    stride: StrideTracker,
    motion: MotionModel,
    race: RaceController,
    leaderboard: LeaderboardStore<S>,
    scheduler: Scheduler,
    motion_timer: Option<TimerId>,
    clock_timer: Option<TimerId>,
    last_finish: Option<FinishRecord>,
    events: Vec<GameEvent>,
}

impl<C: Clock, S: KeyValueStore> GameSession<C, S> {
    /// Create a session and load the leaderboard from `store`
    pub fn new(config: GameConfig, clock: C, store: S) -> Self {
        Self {
            stride: StrideTracker::new(config.stride_length),
            motion: MotionModel::new(config.speed_decay),
            race: RaceController::new(config.target_distance),
            leaderboard: LeaderboardStore::new(store),
            scheduler: Scheduler::new(),
            motion_timer: None,
            clock_timer: None,
            last_finish: None,
            events: Vec::new(),
            config,
            clock,
        }
    }

    /// Start dragging a foot
    pub fn begin_stride(&mut self, foot: FootSide) -> bool {
        if self.race.status() == RaceStatus::Finished {
            log::trace!("race finished, ignoring stride start");
            return false;
        }
        self.stride.begin_stride(foot)
    }

    /// Drag progress of the active foot
    pub fn update_stride_offset(&mut self, foot: FootSide, downward_delta: f64) -> bool {
        self.stride.update_offset(foot, downward_delta)
    }

    /// Release the dragged foot. The first accepted stride starts the race.
    ///
    /// Ticks due strictly before the stride run first, at the speed they
    /// would have seen; a tick at the same instant waits for the next pump.
    pub fn complete_stride(&mut self, foot: FootSide) -> Option<StrideEvent> {
        let event = self.stride.complete_stride(foot)?;
        let now = self.clock.now();
        self.run_due(now, false);
        if self.race.status() == RaceStatus::Finished {
            // Foot released, but the distance is frozen.
            return None;
        }

        if self.race.start(now) {
            self.start_timers(now);
            self.events.push(GameEvent::RaceStarted);
        }

        match self.motion.apply_stride(&event, now) {
            SpeedSample::First => log::debug!("first stride by {:?}", foot),
            SpeedSample::Measured(speed) => {
                log::debug!("stride by {:?}, speed {:.2} m/s", foot, speed)
            }
            SpeedSample::Skipped => log::debug!("stride by {:?} without speed sample", foot),
        }
        self.events.push(GameEvent::StrideAccepted {
            foot,
            distance: self.motion.distance(),
            speed: self.motion.speed(),
        });

        self.check_finish(now);
        Some(event)
    }

    /// Run every tick due by now
    pub fn pump(&mut self) -> SessionSnapshot {
        let now = self.clock.now();
        self.run_due(now, true);
        self.snapshot()
    }

    /// Process firings up to `until`. Motion ticks are replayed one by one;
    /// clock ticks collapse to the latest due instant.
    fn run_due(&mut self, until: Duration, inclusive: bool) {
        let dt = self.config.motion_tick_secs;
        loop {
            let firing = if inclusive {
                self.scheduler.pop_due(until)
            } else {
                self.scheduler.pop_due_before(until)
            };
            let Some(firing) = firing else { break };
            match firing.kind {
                TickKind::Motion => {
                    if self.race.status() == RaceStatus::Running {
                        self.motion.tick(dt);
                        self.check_finish(firing.at);
                    }
                }
                TickKind::Clock => {
                    let latest = self
                        .scheduler
                        .skip_missed(firing.timer, until, inclusive)
                        .unwrap_or(firing.at);
                    self.race.tick(latest);
                }
            }
        }
    }

    /// Back to a fresh race. The leaderboard is kept.
    pub fn restart(&mut self) {
        self.stop_timers();
        self.stride.reset();
        self.motion.reset();
        self.race.restart();
        self.last_finish = None;
        self.events.push(GameEvent::Restarted);
        log::info!("Race reset");
    }

    fn start_timers(&mut self, now: Duration) {
        self.stop_timers();
        self.motion_timer = Some(self.scheduler.schedule_repeating(
            TickKind::Motion,
            self.config.motion_tick(),
            now,
        ));
        self.clock_timer = Some(self.scheduler.schedule_repeating(
            TickKind::Clock,
            self.config.clock_tick(),
            now,
        ));
    }

    fn stop_timers(&mut self) {
        for timer in [self.motion_timer.take(), self.clock_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(timer);
        }
    }

    fn check_finish(&mut self, at: Duration) {
        if !self.race.observe_distance(self.motion.distance(), at) {
            return;
        }
        self.stop_timers();

        let time = self.race.elapsed_time();
        let placement = self.leaderboard.record_finish(time);
        self.last_finish = Some(FinishRecord { time, placement });
        self.events.push(GameEvent::RaceFinished {
            time,
            rank: placement.map(|p| p.rank),
        });
    }

    /// Get current snapshot without running ticks
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            motion: self.motion_state(),
            race: RaceSnapshot {
                status: self.race.status(),
                state: self.race.state().clone(),
                remaining_distance: self.race.remaining_distance(self.motion.distance()),
            },
            feet: FeetSnapshot {
                offsets: self.stride.offsets(),
                left_ready: self.can_start(FootSide::Left),
                right_ready: self.can_start(FootSide::Right),
            },
            leaderboard: self.leaderboard.times(),
            last_finish: self.last_finish,
        }
    }

    /// Whether `foot` may start a stride right now
    pub fn can_start(&self, foot: FootSide) -> bool {
        self.race.status() != RaceStatus::Finished && self.stride.can_start(foot)
    }

    /// Get current motion state
    pub fn motion_state(&self) -> MotionState {
        MotionState {
            distance_traveled: self.motion.distance(),
            speed: self.motion.speed(),
            last_foot_moved: self.stride.last_foot_moved(),
            active_foot: self.stride.active_foot(),
        }
    }

    /// Get race timing state
    pub fn race_state(&self) -> &RaceState {
        self.race.state()
    }

    /// Get current race status
    pub fn status(&self) -> RaceStatus {
        self.race.status()
    }

    /// Get best times, fastest first
    pub fn leaderboard(&self) -> TopTimes {
        self.leaderboard.times()
    }

    /// Result of the finished race, if any
    pub fn last_finish(&self) -> Option<FinishRecord> {
        self.last_finish
    }

    /// Number of live timers (0 when idle or finished, 2 while racing)
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Take the notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get session configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Backing store of the leaderboard
    pub fn store(&self) -> &S {
        self.leaderboard.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;
    use crate::game::store::MemoryStore;

    fn session() -> (GameSession<ManualClock, MemoryStore>, ManualClock) {
        let clock = ManualClock::new();
        let session = GameSession::new(GameConfig::default(), clock.clone(), MemoryStore::new());
        (session, clock)
    }

    fn stride(session: &mut GameSession<ManualClock, MemoryStore>, foot: FootSide) -> bool {
        session.begin_stride(foot) && session.complete_stride(foot).is_some()
    }

    #[test]
    fn idle_session_has_no_timers() {
        let (mut session, clock) = session();
        clock.set_secs(5.0);
        let snapshot = session.pump();
        assert_eq!(snapshot.race.status, RaceStatus::NotStarted);
        assert_eq!(session.active_timers(), 0);
        assert_eq!(snapshot.leaderboard, [30.0, 30.0, 30.0]);
        assert!(snapshot.feet.left_ready && snapshot.feet.right_ready);
    }

    #[test]
    fn first_stride_starts_the_race() {
        let (mut session, clock) = session();
        clock.set_secs(2.0);
        assert!(stride(&mut session, FootSide::Left));
        assert_eq!(session.status(), RaceStatus::Running);
        assert_eq!(session.race_state().started_at, Some(Duration::from_secs(2)));
        assert_eq!(session.active_timers(), 2);

        let events = session.drain_events();
        assert_eq!(events[0], GameEvent::RaceStarted);
        assert!(matches!(
            events[1],
            GameEvent::StrideAccepted { foot: FootSide::Left, .. }
        ));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn rejected_gestures_leave_state_untouched() {
        let (mut session, clock) = session();
        stride(&mut session, FootSide::Left);
        clock.set_secs(0.5);
        let before = session.snapshot();

        assert!(!session.begin_stride(FootSide::Left));
        assert!(!session.update_stride_offset(FootSide::Left, 20.0));
        assert!(session.complete_stride(FootSide::Left).is_none());
        assert!(session.complete_stride(FootSide::Right).is_none());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn offsets_reach_the_snapshot() {
        let (mut session, _clock) = session();
        session.begin_stride(FootSide::Right);
        session.update_stride_offset(FootSide::Right, 64.0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.feet.offsets.right, 64.0);
        assert_eq!(snapshot.motion.active_foot, Some(FootSide::Right));
        assert!(!snapshot.feet.left_ready);
    }

    #[test]
    fn clock_tick_updates_elapsed_time() {
        let (mut session, clock) = session();
        stride(&mut session, FootSide::Left);
        clock.set(Duration::from_millis(1234));
        let snapshot = session.pump();
        assert!((snapshot.race.state.elapsed_time - 1.23).abs() < 1e-9);
    }

    #[test]
    fn long_stall_collapses_clock_ticks() {
        let (mut session, clock) = session();
        stride(&mut session, FootSide::Left);
        clock.set(Duration::from_secs(3600));
        let snapshot = session.pump();
        assert_eq!(snapshot.race.state.elapsed_time, 3600.0);
        assert_eq!(session.active_timers(), 2);

        clock.set(Duration::from_millis(3_600_015));
        let snapshot = session.pump();
        assert!((snapshot.race.state.elapsed_time - 3600.01).abs() < 1e-9);
    }

    #[test]
    fn restart_cancels_timers_and_keeps_records() {
        let (mut session, clock) = session();
        stride(&mut session, FootSide::Left);
        clock.set_secs(0.4);
        stride(&mut session, FootSide::Right);
        clock.set_secs(1.0);
        session.pump();

        session.restart();
        assert_eq!(session.active_timers(), 0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.motion.distance_traveled, 0.0);
        assert_eq!(snapshot.motion.speed, 0.0);
        assert_eq!(snapshot.motion.last_foot_moved, None);
        assert_eq!(snapshot.race.status, RaceStatus::NotStarted);
        assert_eq!(snapshot.race.state.elapsed_time, 0.0);
        assert_eq!(snapshot.race.remaining_distance, 10.0);
        assert_eq!(session.drain_events().last(), Some(&GameEvent::Restarted));
    }
}
