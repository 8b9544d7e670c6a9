//! Scheduler - Cancellable repeating timers
//!
//! Nothing runs on its own: the owner asks for due firings with
//! [`Scheduler::pop_due`] and handles them in order. Missed periods are
//! replayed one by one, so the tick sequence does not depend on how often
//! the host polls. Timers that only need the newest instant can jump ahead
//! with [`Scheduler::skip_missed`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// What a timer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickKind {
    /// Momentum and speed decay
    Motion,
    /// Elapsed race time
    Clock,
}

/// One due firing of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub timer: TimerId,
    pub kind: TickKind,
    /// Scheduled instant, which may be earlier than the poll time
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    kind: TickKind,
    period: Duration,
    next_fire: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every `period`, first at `now + period`. Zero periods are
    /// stretched to one millisecond.
    pub fn schedule_repeating(&mut self, kind: TickKind, period: Duration, now: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            period,
            next_fire: now + period,
        });
        id
    }

    /// Stop a timer. Returns false if it was not active.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Stop every timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Check if a timer is still scheduled
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of scheduled timers
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Earliest firing due at or before `now`. Ties go to the timer scheduled first.
    pub fn pop_due(&mut self, now: Duration) -> Option<Firing> {
        self.pop_where(|at| at <= now)
    }

    /// Earliest firing due strictly before `now`
    pub fn pop_due_before(&mut self, now: Duration) -> Option<Firing> {
        self.pop_where(|at| at < now)
    }

    fn pop_where(&mut self, due: impl Fn(Duration) -> bool) -> Option<Firing> {
        // Timers are kept in scheduling order, so min_by_key keeps the first on ties.
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| due(t.next_fire))
            .min_by_key(|t| t.next_fire)?;
        let firing = Firing {
            timer: timer.id,
            kind: timer.kind,
            at: timer.next_fire,
        };
        timer.next_fire += timer.period;
        Some(firing)
    }

    /// Drop every further missed period of `id` up to `until` (inclusive or not)
    /// and return the latest dropped instant, if any.
    pub fn skip_missed(&mut self, id: TimerId, until: Duration, inclusive: bool) -> Option<Duration> {
        let timer = self.timers.iter_mut().find(|t| t.id == id)?;
        let due = if inclusive {
            timer.next_fire <= until
        } else {
            timer.next_fire < until
        };
        if !due {
            return None;
        }
        let span = (until - timer.next_fire).as_nanos();
        let period = timer.period.as_nanos();
        let mut periods = span / period;
        if !inclusive && periods > 0 && span % period == 0 {
            periods -= 1;
        }
        let offset = u64::try_from(periods * period).unwrap_or(u64::MAX);
        let last = timer.next_fire + Duration::from_nanos(offset);
        timer.next_fire = last + timer.period;
        Some(last)
    }
}
