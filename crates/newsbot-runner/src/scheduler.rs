//! Fixed-interval cycle scheduler.
//!
//! The caller drives the loop:
//!
//! ```ignore
//! while let Some(cycle) = scheduler.next_cycle().await {
//!     run(cycle).await;
//!     scheduler.cycle_finished();
//! }
//! ```
//!
//! so a cycle can never start while another is still running.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    max_cycles: Option<u64>,
    state: SchedulerState,
    cycles_started: u64,
    last_fire: Option<Instant>,
    next_fire: Option<Instant>,
}

impl Scheduler {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
            state: SchedulerState::Idle,
            cycles_started: 0,
            last_fire: None,
            next_fire: None,
        }
    }

    /// Stop after `max` cycles instead of running forever.
    #[must_use]
    pub fn with_max_cycles(mut self, max: u64) -> Self {
        self.max_cycles = Some(max);
        self
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Waits for the next fire time and marks the scheduler running.
    ///
    /// The first cycle fires immediately. Returns the 1-based cycle number,
    /// or `None` once the cycle limit has been reached.
    pub async fn next_cycle(&mut self) -> Option<u64> {
        if self
            .max_cycles
            .is_some_and(|max| self.cycles_started >= max)
        {
            return None;
        }

        if let Some(next_fire) = self.next_fire {
            tokio::time::sleep_until(next_fire).await;
        }

        self.last_fire = Some(Instant::now());
        self.state = SchedulerState::Running;
        self.cycles_started += 1;
        Some(self.cycles_started)
    }

    /// Marks the current cycle done and schedules the next one at
    /// `last_fire + interval`.
    ///
    /// An overrun is logged and the next cycle fires as soon as it is asked
    /// for; missed fire times are not made up.
    pub fn cycle_finished(&mut self) {
        self.state = SchedulerState::Idle;
        let Some(last_fire) = self.last_fire else {
            return;
        };

        let next_fire = last_fire + self.interval;
        let now = Instant::now();
        if now > next_fire {
            let overrun_ms = u64::try_from((now - next_fire).as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                cycle = self.cycles_started,
                overrun_ms,
                interval_secs = self.interval.as_secs(),
                "cycle overran the schedule interval; next cycle starts immediately"
            );
        }
        self.next_fire = Some(next_fire);
    }
}
