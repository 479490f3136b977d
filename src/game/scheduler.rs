//! Cooperative timers for a single-threaded game loop
//!
//! Time is a `Duration` since the session began. The scheduler never sleeps:
//! the caller asks for the next deadline, waits however it likes, then pops
//! whatever has come due. Every (re)arm or cancel bumps the timer's
//! generation, so a token handed out earlier stops matching and its firing
//! is dropped.

use std::time::Duration;

/// The three independent timers a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Periodic snake movement
    Movement,
    /// Periodic hazard spawn attempt
    HazardSpawn,
    /// One-shot removal of the current hazard
    HazardExpiry,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::Movement,
        TimerKind::HazardSpawn,
        TimerKind::HazardExpiry,
    ];

    fn index(self) -> usize {
        match self {
            TimerKind::Movement => 0,
            TimerKind::HazardSpawn => 1,
            TimerKind::HazardExpiry => 2,
        }
    }
}

/// Identifies one arming of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub kind: TimerKind,
    /// When this arming was due to fire
    pub due: Duration,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
struct Timer {
    deadline: Option<Duration>,
    /// Set for periodic timers
    period: Option<Duration>,
    /// Time left when the timer was suspended
    remaining: Option<Duration>,
    generation: u64,
}

impl Timer {
    fn rearm(&mut self, deadline: Option<Duration>, period: Option<Duration>) {
        self.generation += 1;
        self.deadline = deadline;
        self.period = period;
        self.remaining = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: [Timer; 3],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn timer(&self, kind: TimerKind) -> &Timer {
        &self.timers[kind.index()]
    }

    fn timer_mut(&mut self, kind: TimerKind) -> &mut Timer {
        &mut self.timers[kind.index()]
    }

    /// Fire every `period`, first at `now + period`
    pub fn arm_periodic(&mut self, kind: TimerKind, now: Duration, period: Duration) {
        self.timer_mut(kind).rearm(Some(now + period), Some(period));
    }

    /// Fire once at `now + delay`
    pub fn arm_once(&mut self, kind: TimerKind, now: Duration, delay: Duration) {
        self.timer_mut(kind).rearm(Some(now + delay), None);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timer_mut(kind).rearm(None, None);
    }

    pub fn cancel_all(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
    }

    /// Stop the timer but remember how long it had left
    pub fn suspend(&mut self, kind: TimerKind, now: Duration) {
        let timer = self.timer_mut(kind);
        if let Some(deadline) = timer.deadline.take() {
            timer.remaining = Some(deadline.saturating_sub(now));
            timer.generation += 1;
        }
    }

    /// Restart a suspended timer with the time it had left
    pub fn resume(&mut self, kind: TimerKind, now: Duration) {
        let timer = self.timer_mut(kind);
        if let Some(remaining) = timer.remaining.take() {
            timer.deadline = Some(now + remaining);
            timer.generation += 1;
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timer(kind).deadline.is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.timer(kind).deadline
    }

    /// Token for the current arming, if the timer is armed
    pub fn token(&self, kind: TimerKind) -> Option<TimerToken> {
        let timer = self.timer(kind);
        timer.deadline.map(|due| TimerToken {
            kind,
            due,
            generation: timer.generation,
        })
    }

    /// Whether a token still refers to the live arming of its timer
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.timer(token.kind).generation == token.generation
    }

    /// Earliest armed deadline across all timers
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().filter_map(|timer| timer.deadline).min()
    }

    /// Take the earliest timer due at or before `now`
    ///
    /// Periodic timers are pushed forward by one period, one-shots are
    /// disarmed. Ties go to the timer listed first in [`TimerKind`].
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerToken> {
        let (deadline, kind) = TimerKind::ALL
            .into_iter()
            .filter_map(|kind| self.timer(kind).deadline.map(|deadline| (deadline, kind)))
            .filter(|&(deadline, _)| deadline <= now)
            .min()?;

        let timer = self.timer_mut(kind);
        timer.deadline = timer.period.map(|period| deadline + period);

        Some(TimerToken {
            kind,
            due: deadline,
            generation: timer.generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_periodic_timer_reschedules() {
        let mut scheduler = Scheduler::new();
        scheduler.arm_periodic(TimerKind::Movement, ms(0), ms(100));

        assert_eq!(scheduler.next_deadline(), Some(ms(100)));
        assert_eq!(scheduler.pop_due(ms(99)), None);

        let token = scheduler.pop_due(ms(100)).unwrap();
        assert_eq!(token.kind, TimerKind::Movement);
        assert_eq!(token.due, ms(100));
        assert!(scheduler.is_current(token));
        assert_eq!(scheduler.next_deadline(), Some(ms(200)));
    }

    #[test]
    fn test_one_shot_disarms() {
        let mut scheduler = Scheduler::new();
        scheduler.arm_once(TimerKind::HazardExpiry, ms(8000), ms(5000));

        assert!(scheduler.pop_due(ms(12_999)).is_none());
        let token = scheduler.pop_due(ms(13_000)).unwrap();
        assert_eq!(token.kind, TimerKind::HazardExpiry);
        assert!(!scheduler.is_armed(TimerKind::HazardExpiry));
        assert!(scheduler.pop_due(ms(20_000)).is_none());
    }

    #[test]
    fn test_catch_up_fires_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.arm_periodic(TimerKind::Movement, ms(0), ms(300));
        scheduler.arm_periodic(TimerKind::HazardSpawn, ms(0), ms(600));

        let mut fired = Vec::new();
        while let Some(token) = scheduler.pop_due(ms(600)) {
            fired.push(token.kind);
        }

        assert_eq!(
            fired,
            vec![TimerKind::Movement, TimerKind::Movement, TimerKind::HazardSpawn]
        );
    }

    #[test]
    fn test_cancel_invalidates_token() {
        let mut scheduler = Scheduler::new();
        scheduler.arm_once(TimerKind::HazardExpiry, ms(0), ms(5000));
        let token = scheduler.token(TimerKind::HazardExpiry).unwrap();

        scheduler.cancel(TimerKind::HazardExpiry);
        assert!(!scheduler.is_current(token));

        // Re-arming does not revive the old token either
        scheduler.arm_once(TimerKind::HazardExpiry, ms(6000), ms(5000));
        assert!(!scheduler.is_current(token));
        assert!(scheduler.is_current(scheduler.token(TimerKind::HazardExpiry).unwrap()));
    }

    #[test]
    fn test_suspend_and_resume_keep_remaining_time() {
        let mut scheduler = Scheduler::new();
        scheduler.arm_periodic(TimerKind::HazardSpawn, ms(0), ms(8000));

        scheduler.suspend(TimerKind::HazardSpawn, ms(3000));
        assert!(!scheduler.is_armed(TimerKind::HazardSpawn));
        assert!(scheduler.pop_due(ms(50_000)).is_none());

        scheduler.resume(TimerKind::HazardSpawn, ms(10_000));
        assert_eq!(scheduler.deadline(TimerKind::HazardSpawn), Some(ms(15_000)));

        scheduler.pop_due(ms(15_000)).unwrap();
        assert_eq!(scheduler.deadline(TimerKind::HazardSpawn), Some(ms(23_000)));
    }

    #[test]
    fn test_resume_without_suspend_is_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.resume(TimerKind::Movement, ms(100));
        assert!(!scheduler.is_armed(TimerKind::Movement));
    }
}
