use std::time::Duration;

use crate::game::GameEvent;

/// Per-process play statistics shown in the header
///
/// Driven by session events and the session clock, so paused time is simply
/// left out of the run timer.
#[derive(Debug, Clone, Default)]
pub struct GameMetrics {
    run_started: Option<Duration>,
    paused_since: Option<Duration>,
    paused_total: Duration,
    finished_at: Option<Duration>,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &GameEvent, now: Duration) {
        match event {
            GameEvent::RunStarted => {
                self.run_started = Some(now);
                self.paused_since = None;
                self.paused_total = Duration::ZERO;
                self.finished_at = None;
            }
            GameEvent::GamePaused => self.paused_since = Some(now),
            GameEvent::GameResumed => {
                if let Some(since) = self.paused_since.take() {
                    self.paused_total += now.saturating_sub(since);
                }
            }
            GameEvent::GameOver { .. } => {
                self.games_played += 1;
                self.finished_at = Some(now);
            }
            _ => {}
        }
    }

    /// Time spent actually playing the current (or last) run
    pub fn elapsed(&self, now: Duration) -> Duration {
        let Some(started) = self.run_started else {
            return Duration::ZERO;
        };
        let end = self.finished_at.or(self.paused_since).unwrap_or(now);
        end.saturating_sub(started).saturating_sub(self.paused_total)
    }

    pub fn format_time(&self, now: Duration) -> String {
        let total_secs = self.elapsed(now).as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CollisionKind;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        assert_eq!(metrics.format_time(secs(30)), "00:00");

        metrics.observe(&GameEvent::RunStarted, secs(0));
        assert_eq!(metrics.format_time(secs(125)), "02:05");
        assert_eq!(metrics.format_time(secs(3661)), "61:01");
    }

    #[test]
    fn test_paused_time_is_excluded() {
        let mut metrics = GameMetrics::new();
        metrics.observe(&GameEvent::RunStarted, secs(10));
        metrics.observe(&GameEvent::GamePaused, secs(20));
        assert_eq!(metrics.elapsed(secs(100)), secs(10));

        metrics.observe(&GameEvent::GameResumed, secs(100));
        assert_eq!(metrics.elapsed(secs(105)), secs(15));
    }

    #[test]
    fn test_game_over_stops_clock_and_counts() {
        let mut metrics = GameMetrics::new();
        metrics.observe(&GameEvent::RunStarted, secs(0));
        metrics.observe(
            &GameEvent::GameOver {
                kind: CollisionKind::Wall,
                score: 4,
            },
            secs(42),
        );

        assert_eq!(metrics.elapsed(secs(500)), secs(42));
        assert_eq!(metrics.games_played, 1);

        metrics.observe(&GameEvent::RunStarted, secs(600));
        assert_eq!(metrics.elapsed(secs(601)), secs(1));
        assert_eq!(metrics.games_played, 1);
    }
}
