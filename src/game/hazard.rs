use super::{
    config::GameConfig,
    engine::GameEngine,
    scheduler::{Scheduler, TimerKind},
    state::{GameState, Position, RunMode},
};
use log::debug;
use rand::Rng;
use std::time::Duration;

/// Spawns a transient hazard on a fixed cadence and clears it after its lifetime
///
/// Runs on its own timers, independent of the movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardScheduler {
    enabled: bool,
    period: Duration,
    lifetime: Duration,
}

impl HazardScheduler {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            enabled: config.hazards_enabled,
            period: config.hazard_period(),
            lifetime: config.hazard_lifetime(),
        }
    }

    /// Start the spawn cadence for a fresh run
    pub fn start(&self, scheduler: &mut Scheduler, now: Duration) {
        scheduler.cancel(TimerKind::HazardExpiry);
        if self.enabled {
            scheduler.arm_periodic(TimerKind::HazardSpawn, now, self.period);
        } else {
            scheduler.cancel(TimerKind::HazardSpawn);
        }
    }

    /// Place a hazard if the run is live and none is on the board
    pub fn try_spawn<R: Rng>(
        &self,
        engine: &mut GameEngine<R>,
        state: &mut GameState,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Option<Position> {
        if state.mode != RunMode::Running || state.hazard.is_some() {
            return None;
        }

        let cell = engine.spawn_hazard(state)?;
        state.hazard = Some(cell);
        scheduler.arm_once(TimerKind::HazardExpiry, now, self.lifetime);
        debug!("hazard spawned at ({}, {})", cell.x, cell.y);
        Some(cell)
    }

    /// Clear the hazard whatever the run mode; true if one was removed
    pub fn expire(&self, state: &mut GameState) -> bool {
        let cleared = state.hazard.take().is_some();
        if cleared {
            debug!("hazard expired");
        }
        cleared
    }
}
